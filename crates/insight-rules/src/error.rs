//! Errors raised while applying rules.

use serde_json::Value;

/// Structural failures that stop normalization of one descriptor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// The raw descriptor is not a JSON object.
    #[error("descriptor must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    /// A rule tried to descend through a non-object value.
    #[error("cannot write into '{path}': existing value is not an object")]
    TargetNotObject { path: String },

    /// A rule tried to unshift into a non-array value.
    #[error("cannot unshift into '{path}': existing value is not an array")]
    TargetNotArray { path: String },

    /// A transform rejected the value it was given.
    #[error("invalid value for '{key}': {reason}")]
    InvalidValue { key: String, reason: String },
}

/// JSON type name of a value, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
