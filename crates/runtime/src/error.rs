use crate::options::Operation;
use deepr_types::TargetError;
use thiserror::Error;

/// A failure while walking an expression tree against a target.
#[derive(Error, Debug, Clone)]
pub enum EvaluationError {
    #[error("Couldn't find a member matching the key '{key}'")]
    MissingMember { key: String },

    #[error("Type mismatch for key '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Cannot execute a query on an absent value (key: '{key}')")]
    UndefinedContinuation { key: String },

    #[error("Operation '{operation}' is not allowed (name: '{key}')")]
    Authorization { key: String, operation: Operation },

    /// Raised by the target itself and passed through unchanged.
    #[error(transparent)]
    Target(#[from] TargetError),
}

impl EvaluationError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::MissingMember { key: key.to_string() }
    }

    pub(crate) fn mismatch(key: &str, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.to_string(),
            expected,
            found,
        }
    }

    pub(crate) fn undefined(key: &str) -> Self {
        Self::UndefinedContinuation { key: key.to_string() }
    }

    pub(crate) fn denied(key: &str, operation: Operation) -> Self {
        Self::Authorization {
            key: key.to_string(),
            operation,
        }
    }
}
