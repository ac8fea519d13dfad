//! Parameter binding.
//!
//! Raw user input (`--param` text, param-file JSON/YAML) is matched to the
//! operation's `ParamSpec`s, coerced to the declared type, and frozen into an
//! `Invocation`. The request map is built from the invocation on demand and
//! only ever contains fields whose parameter was bound.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use super::error::{BindError, BindWarning};
use super::selector::{self, ResolvedSelector, SelectOptions};
use crate::catalog::{OperationDescriptor, ParamSpec, ParamType};

/// Literal that binds a parameter to null on the command line.
pub const NULL_LITERAL: &str = "$null";

/// Unprocessed parameter value as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Text from `--param KEY=VALUE`.
    Text(String),
    /// Structured value from a param file.
    Json(Value),
    /// `KEY=$null` or a JSON/YAML null.
    Null,
}

/// What a parameter is bound to for one invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Binding {
    #[default]
    NotSupplied,
    ExplicitlyNull,
    Value(Value),
}

/// Whether a paged operation follows continuation tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagingMode {
    #[default]
    Auto,
    /// Exactly one request, tokens are reported but not followed.
    Manual,
}

/// Bound parameters, resolved selector and warnings for one call sequence.
#[derive(Debug, Clone)]
pub struct Invocation {
    op: &'static OperationDescriptor,
    bindings: Vec<(&'static ParamSpec, Binding)>,
    selector: ResolvedSelector,
    paging: PagingMode,
    warnings: Vec<BindWarning>,
}

impl Invocation {
    pub fn operation(&self) -> &'static OperationDescriptor {
        self.op
    }

    pub fn binding(&self, name: &str) -> Binding {
        self.bindings
            .iter()
            .find(|(spec, _)| spec.name.eq_ignore_ascii_case(name))
            .map(|(_, b)| b.clone())
            .unwrap_or_default()
    }

    pub fn selector(&self) -> &ResolvedSelector {
        &self.selector
    }

    pub fn paging(&self) -> PagingMode {
        self.paging
    }

    pub fn warnings(&self) -> &[BindWarning] {
        &self.warnings
    }

    /// Request body for the first call. Unbound parameters are left out;
    /// parameters bound to null are sent as JSON null.
    pub fn build_request(&self) -> Map<String, Value> {
        let mut request = Map::new();
        for (spec, binding) in &self.bindings {
            match binding {
                Binding::NotSupplied => {}
                Binding::ExplicitlyNull => set_path(&mut request, spec.field, Value::Null),
                Binding::Value(v) => set_path(&mut request, spec.field, v.clone()),
            }
        }
        request
    }
}

/// Bind raw input to `op`.
///
/// Missing required parameters only produce warnings: the request still goes
/// out and the service decides. Callers have relied on that permissive
/// behaviour, so it is kept rather than turned into a hard error.
pub fn bind(
    op: &'static OperationDescriptor,
    raw: &HashMap<String, RawValue>,
    select: &SelectOptions,
    paging: PagingMode,
) -> Result<Invocation, BindError> {
    let mut bound: HashMap<&'static str, Binding> = HashMap::new();
    for (name, value) in raw {
        let spec = op.param(name).ok_or_else(|| BindError::UnknownParameter {
            operation: op.name,
            name: name.clone(),
        })?;
        if bound.contains_key(spec.name) {
            return Err(BindError::DuplicateParameter(spec.name));
        }
        bound.insert(spec.name, coerce(spec, value)?);
    }

    let mut warnings = Vec::new();
    let bindings: Vec<(&'static ParamSpec, Binding)> = op
        .params
        .iter()
        .map(|spec| {
            let binding = bound.remove(spec.name).unwrap_or_default();
            if spec.required {
                match binding {
                    Binding::NotSupplied => warnings.push(BindWarning::MissingRequired { param: spec.name }),
                    Binding::ExplicitlyNull => {
                        warnings.push(BindWarning::RequiredBoundToNull { param: spec.name })
                    }
                    Binding::Value(_) => {}
                }
            }
            (spec, binding)
        })
        .collect();

    for w in &warnings {
        tracing::warn!(operation = op.name, "{w}");
    }

    let selector = selector::resolve(op, select, |name| {
        bindings
            .iter()
            .find(|(spec, _)| spec.name == name)
            .map(|(_, b)| b.clone())
            .unwrap_or_default()
    })?;

    Ok(Invocation {
        op,
        bindings,
        selector,
        paging,
        warnings,
    })
}

/// Write `value` at a dot-separated path, creating intermediate objects.
pub(crate) fn set_path(map: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            map.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let child = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(inner) = child {
                set_path(inner, rest, value);
            }
        }
    }
}

/* ---- Coercion ---- */

fn coerce(spec: &'static ParamSpec, raw: &RawValue) -> Result<Binding, BindError> {
    match raw {
        RawValue::Null | RawValue::Json(Value::Null) => Ok(Binding::ExplicitlyNull),
        RawValue::Text(text) if text.trim() == NULL_LITERAL => Ok(Binding::ExplicitlyNull),
        RawValue::Text(text) => coerce_text(spec, spec.ty, text).map(Binding::Value),
        RawValue::Json(value) => coerce_json(spec, value).map(Binding::Value),
    }
}

fn coerce_text(spec: &'static ParamSpec, ty: ParamType, raw: &str) -> Result<Value, BindError> {
    let invalid = || BindError::InvalidValue {
        param: spec.name,
        expected: ty.label(),
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    match ty {
        ParamType::String => Ok(Value::String(raw.to_string())),
        ParamType::Integer => trimmed
            .parse::<i64>()
            .map(|n| Value::Number(n.into()))
            .map_err(|_| invalid()),
        ParamType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
            "false" | "0" | "no" | "n" => Ok(Value::Bool(false)),
            _ => Err(invalid()),
        },
        ParamType::Enum(allowed) => allowed
            .iter()
            .find(|v| v.eq_ignore_ascii_case(trimmed))
            .map(|v| Value::String((*v).to_string()))
            .ok_or_else(invalid),
        ParamType::StringList => Ok(Value::Array(
            split_list(raw)
                .map(|s| Value::String(s.to_string()))
                .collect(),
        )),
        ParamType::IntegerList => split_list(raw)
            .map(|s| coerce_text(spec, ParamType::Integer, s))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
    }
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn element_type(ty: ParamType) -> Option<ParamType> {
    match ty {
        ParamType::StringList => Some(ParamType::String),
        ParamType::IntegerList => Some(ParamType::Integer),
        _ => None,
    }
}

fn coerce_json(spec: &'static ParamSpec, value: &Value) -> Result<Value, BindError> {
    let invalid = || BindError::InvalidValue {
        param: spec.name,
        expected: spec.ty.label(),
        value: value.to_string(),
    };
    match (spec.ty, value) {
        (ParamType::Integer, Value::Number(n)) => n
            .as_i64()
            .map(|i| Value::Number(Number::from(i)))
            .ok_or_else(invalid),
        (ParamType::Boolean, Value::Bool(b)) => Ok(Value::Bool(*b)),
        (ty, Value::Array(items)) => {
            let elem = element_type(ty).ok_or_else(invalid)?;
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => coerce_text(spec, elem, s),
                    Value::Number(_) | Value::Bool(_) => coerce_text(spec, elem, &item.to_string()),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        (ty, Value::String(s)) => coerce_text(spec, ty, s),
        (ty, Value::Number(_) | Value::Bool(_)) => coerce_text(spec, ty, &value.to_string()),
        _ => Err(invalid()),
    }
}
