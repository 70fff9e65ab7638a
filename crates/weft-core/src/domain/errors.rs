//! Errors - エラー型と分類
//!
//! `CoreError` は境界層（api）まで `Result` で返す。HTTP status への
//! 変換とログ・詳細の公開範囲は api 側だけが決める。
//!
//! Per-candidate outcomes of dependency batches (cycle / duplicate /
//! self-reference) are not errors; see `graph::EdgeRejection`.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::ports::StoreError;

/// Field name -> messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A task (or dependency task) code did not resolve.
    #[error("{message}")]
    NotFound {
        resource: &'static str,
        message: String,
    },

    /// The actor lacks the capability for the requested action.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed input, with field-level detail.
    #[error("{message}")]
    ValidationFailed { message: String, fields: FieldErrors },

    /// Completion attempted while dependencies are incomplete.
    #[error("{0}")]
    BusinessRuleViolation(String),

    /// Storage or internal fault.
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl CoreError {
    pub fn task_not_found() -> Self {
        Self::NotFound {
            resource: "Task",
            message: "Task not found".to_string(),
        }
    }

    pub fn not_found(resource: &'static str, message: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            message: message.into(),
        }
    }

    /// Validation failure on a single field.
    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::ValidationFailed {
            message: "Validation failed".to_string(),
            fields,
        }
    }

    /// Fold several field errors into one failure; `None` when `fields` is empty.
    pub fn from_fields(fields: FieldErrors) -> Option<Self> {
        (!fields.is_empty()).then(|| Self::ValidationFailed {
            message: "Validation failed".to_string(),
            fields,
        })
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        CoreError::Unexpected(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_field_carries_detail() {
        let err = CoreError::invalid_field("status", "bad status");
        match err {
            CoreError::ValidationFailed { fields, .. } => {
                assert_eq!(fields["status"], vec!["bad status".to_string()]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn no_fields_means_no_error() {
        assert!(CoreError::from_fields(FieldErrors::new()).is_none());
    }

    #[test]
    fn store_errors_become_unexpected() {
        let err: CoreError = StoreError::Unavailable("disk on fire".into()).into();
        assert!(matches!(err, CoreError::Unexpected(msg) if msg.contains("disk on fire")));
    }
}
