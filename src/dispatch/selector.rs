//! Output selection.
//!
//! `--select` accepts three forms:
//!   `*`       the whole response
//!   `Field`   one top-level response field (case-insensitive)
//!   `^Param`  echo the value bound to a parameter
//!
//! The expression is parsed and checked against the operation once, at bind
//! time, and turned into a plain closure over the response.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::binding::Binding;
use super::error::BindError;
use crate::catalog::OperationDescriptor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    WholeResponse,
    NamedField(String),
    EchoParameter(String),
}

impl Selector {
    pub fn parse(expr: &str) -> Result<Self, BindError> {
        let trimmed = expr.trim();
        let invalid = |reason| BindError::InvalidSelector {
            expr: expr.to_string(),
            reason,
        };
        if trimmed.is_empty() {
            return Err(invalid("expression is empty"));
        }
        if trimmed == "*" {
            return Ok(Selector::WholeResponse);
        }
        let (echo, name) = match trimmed.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        if name.is_empty() {
            return Err(invalid("'^' must be followed by a parameter name"));
        }
        if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("names must start with a letter"));
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(invalid("names may only contain letters, digits and '_'"));
        }
        Ok(if echo {
            Selector::EchoParameter(name.to_string())
        } else {
            Selector::NamedField(name.to_string())
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::WholeResponse => f.write_str("*"),
            Selector::NamedField(n) => f.write_str(n),
            Selector::EchoParameter(n) => write!(f, "^{n}"),
        }
    }
}

/// Selection wired to one invocation.
#[derive(Clone)]
pub struct ResolvedSelector {
    selector: Selector,
    apply: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl ResolvedSelector {
    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn apply(&self, response: &Value) -> Value {
        (self.apply)(response)
    }
}

impl fmt::Debug for ResolvedSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ResolvedSelector").field(&self.selector).finish()
    }
}

/// Selector-related command line options.
#[derive(Debug, Clone, Default)]
pub struct SelectOptions {
    pub select: Option<String>,
    pub pass_thru: bool,
}

/// Parse the options, validate against the operation, and build the closure.
///
/// `lookup_binding` returns what a parameter was bound to; it is only
/// consulted for echo selectors.
pub fn resolve(
    op: &'static OperationDescriptor,
    options: &SelectOptions,
    lookup_binding: impl Fn(&str) -> Binding,
) -> Result<ResolvedSelector, BindError> {
    let selector = match (&options.select, options.pass_thru) {
        (Some(_), true) => return Err(BindError::ConflictingSelector),
        (Some(expr), false) => Selector::parse(expr)?,
        (None, true) => {
            let primary = op
                .primary_param()
                .ok_or(BindError::NothingToEcho { operation: op.name })?;
            Selector::EchoParameter(primary.name.to_string())
        }
        (None, false) => Selector::NamedField(op.default_field.to_string()),
    };

    let apply: Arc<dyn Fn(&Value) -> Value + Send + Sync> = match &selector {
        Selector::WholeResponse => Arc::new(|response: &Value| response.clone()),
        Selector::NamedField(name) => {
            let field = op.response_field(name).ok_or_else(|| BindError::UnknownField {
                operation: op.name,
                field: name.clone(),
            })?;
            Arc::new(move |response: &Value| response.get(field).cloned().unwrap_or(Value::Null))
        }
        Selector::EchoParameter(name) => {
            let spec = op.param(name).ok_or_else(|| BindError::UnknownParameter {
                operation: op.name,
                name: name.clone(),
            })?;
            let echoed = match lookup_binding(spec.name) {
                Binding::Value(v) => v,
                Binding::ExplicitlyNull | Binding::NotSupplied => Value::Null,
            };
            Arc::new(move |_: &Value| echoed.clone())
        }
    };

    Ok(ResolvedSelector { selector, apply })
}
