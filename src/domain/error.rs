//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::PartnerId;

/// Domain errors represent violations of the partner network's structure
/// or of the calculation preconditions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("expected {expected}, got {actual}")]
    InvalidType { expected: String, actual: String },

    #[error("invalid partner data: {0}")]
    Validation(String),

    #[error("duplicate partner id {id} at index {index}")]
    DuplicateId { id: PartnerId, index: usize },

    #[error("parent {parent_id} not found for partner {partner_id}")]
    ParentNotFound {
        parent_id: PartnerId,
        partner_id: PartnerId,
    },

    #[error("cycle detected involving partner {0}")]
    CycleDetected(PartnerId),

    #[error("no root partners found")]
    NoRoot,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("no partners loaded, load a partner network first")]
    NotLoaded,
}

impl DomainError {
    pub(crate) fn invalid_type(expected: &str, actual: &serde_json::Value) -> Self {
        Self::InvalidType {
            expected: expected.to_string(),
            actual: json_type_name(actual).to_string(),
        }
    }
}

/// JSON type name used in error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        serde_json::Value::Number(_) => "float",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
