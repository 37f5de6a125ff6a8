use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// A failure raised by the target itself, for example by an invoked method.
///
/// The engine never inspects these; they travel up to the caller unchanged
/// unless an error handler replaces them.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct TargetError {
    message: String,
    #[source]
    source: Option<Arc<dyn Error + Send + Sync>>,
}

impl TargetError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an underlying error, keeping it reachable through `source()`.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Arc::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for TargetError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for TargetError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
