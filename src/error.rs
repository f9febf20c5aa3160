use crate::model::AssignmentStatus;
use serde_json::json;
use thiserror::Error;

/// A write that cannot be stored as-is. Always names the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        ValidationError::MissingField { field }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field } => field,
            ValidationError::InvalidValue { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("cannot {action} an assignment that is {from}")]
pub struct TransitionError {
    pub from: AssignmentStatus,
    pub action: &'static str,
}

/// Failures reported by a persistence adapter.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("backend unavailable: {0}")]
    Backend(String),

    #[error("stored row could not be encoded: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for RepoError {
    fn from(err: rusqlite::Error) -> Self {
        RepoError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(err: serde_json::Error) -> Self {
        RepoError::Serialization(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("request cancelled")]
    Cancelled,
}

impl ServiceError {
    /// Stable error code carried in the IPC envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_failed",
            ServiceError::Transition(_) => "invalid_transition",
            ServiceError::Repo(_) => "backend_unavailable",
            ServiceError::NotFound { .. } => "not_found",
            ServiceError::Cancelled => "cancelled",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServiceError::Validation(e) => Some(json!({ "field": e.field() })),
            ServiceError::Transition(e) => Some(json!({
                "from": e.from.as_str(),
                "action": e.action,
            })),
            ServiceError::NotFound { kind, id } => Some(json!({ "kind": kind, "id": id })),
            _ => None,
        }
    }
}
