//! Operation catalog.
//!
//! Every remote operation the CLI can dispatch is described by a static
//! `OperationDescriptor`. The dispatcher never needs per-operation code: it
//! reads the descriptor to bind parameters, build the request, pick the
//! default output field and decide whether to paginate or gate.
//!
//! lookup(name) -> &'static OperationDescriptor (case-insensitive)
//! operations() -> whole table, `ops.rs` order

mod ops;

use serde::Serialize;
use std::fmt;

/// Side-effect classification of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    /// Read-only.
    None,
    /// Creates something new; nothing existing is touched.
    Low,
    /// Changes existing state.
    Medium,
    /// Destroys, rejects or disables existing state.
    High,
}

impl Impact {
    /// Medium and high impact operations must pass the confirmation gate.
    pub fn requires_confirmation(self) -> bool {
        self >= Impact::Medium
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Impact::None => "none",
            Impact::Low => "low",
            Impact::Medium => "medium",
            Impact::High => "high",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared type of a parameter; drives coercion of raw CLI text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    /// String restricted to the listed values (matched case-insensitively,
    /// sent in the canonical casing given here).
    Enum(&'static [&'static str]),
    StringList,
    IntegerList,
}

impl ParamType {
    pub fn label(&self) -> String {
        match self {
            ParamType::String => "string".into(),
            ParamType::Integer => "integer".into(),
            ParamType::Boolean => "boolean".into(),
            ParamType::Enum(values) => format!("enum({})", values.join("|")),
            ParamType::StringList => "string[]".into(),
            ParamType::IntegerList => "integer[]".into(),
        }
    }
}

/// One named input of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// User-facing name (PascalCase).
    pub name: &'static str,
    /// Dot-separated path of the request field this parameter fills.
    pub field: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub description: &'static str,
}

/// Continuation-token wiring of a paged operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    /// Parameter that carries the token into the request.
    pub token_param: &'static str,
    /// Response field holding the next token.
    pub token_field: &'static str,
}

/// Immutable description of one remote operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub service: &'static str,
    pub name: &'static str,
    pub summary: &'static str,
    pub params: &'static [ParamSpec],
    /// Response field that receives the decoded body.
    pub body_field: &'static str,
    /// Every top-level field a response of this operation can carry.
    pub response_fields: &'static [&'static str],
    /// Field emitted when the caller does not pick a selector.
    pub default_field: &'static str,
    pub impact: Impact,
    pub paging: Option<Paging>,
}

impl OperationDescriptor {
    /// Find a parameter by name, ignoring ASCII case.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Canonical spelling of a response field, ignoring ASCII case.
    pub fn response_field(&self, name: &str) -> Option<&'static str> {
        self.response_fields
            .iter()
            .copied()
            .find(|f| f.eq_ignore_ascii_case(name))
    }

    /// The parameter echoed by `--pass-thru`: the first required one.
    pub fn primary_param(&self) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.required)
    }

    pub fn is_paged(&self) -> bool {
        self.paging.is_some()
    }
}

/// All known operations.
pub fn operations() -> &'static [OperationDescriptor] {
    ops::OPERATIONS
}

/// Look up an operation by name (case-insensitive).
pub fn lookup(name: &str) -> Option<&'static OperationDescriptor> {
    let name = name.trim();
    operations()
        .iter()
        .find(|op| op.name.eq_ignore_ascii_case(name))
}

/// Distinct service names in table order.
pub fn services() -> Vec<&'static str> {
    let mut out: Vec<&'static str> = Vec::new();
    for op in operations() {
        if !out.contains(&op.service) {
            out.push(op.service);
        }
    }
    out
}
