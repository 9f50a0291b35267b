use thiserror::Error;

use crate::validation::ValidationIssues;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValuationError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ValuationError {
    /// Wire name of the offending field, if the error is a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValuationError::InvalidInput { field, .. } => Some(field),
            ValuationError::SerializationError(_) => None,
        }
    }
}

impl From<serde_json::Error> for ValuationError {
    fn from(e: serde_json::Error) -> Self {
        ValuationError::SerializationError(e.to_string())
    }
}

/// Collapses an aggregated report to its first issue, which is the one the
/// fail-fast path would have raised.
impl From<ValidationIssues> for ValuationError {
    fn from(report: ValidationIssues) -> Self {
        match report.issues.into_iter().next() {
            Some(issue) => ValuationError::InvalidInput {
                field: issue.path,
                reason: issue.msg,
            },
            None => ValuationError::InvalidInput {
                field: String::new(),
                reason: "Invalid input".into(),
            },
        }
    }
}
