//! Caller-supplied hooks and data for an evaluation.
use crate::error::EvaluationError;
use deepr_sequencer::Eventual;
use deepr_types::{Context, TargetError};
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// What the interpreter is about to do with a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read an attribute.
    Get,
    /// Invoke a method.
    Call,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("get"),
            Self::Call => f.write_str("call"),
        }
    }
}

/// An authorizer's answer, possibly arriving later.
pub type Decision = Eventual<'static, bool, TargetError>;

/// Approves or denies every attribute read and method call.
///
/// Plain closures `Fn(&str, Operation, Option<&[Json]>) -> bool` implement
/// this trait. Implement it directly to answer asynchronously.
pub trait Authorizer: Send + Sync {
    /// `params` is `Some` for calls and `None` for reads.
    fn authorize(&self, key: &str, operation: Operation, params: Option<&[Json]>) -> Decision;
}

impl<F> Authorizer for F
where
    F: Fn(&str, Operation, Option<&[Json]>) -> bool + Send + Sync,
{
    fn authorize(&self, key: &str, operation: Operation, params: Option<&[Json]>) -> Decision {
        Eventual::ready(self(key, operation, params))
    }
}

/// Turns a failed branch into a substitute value, or rethrows.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, error: EvaluationError) -> Result<Json, EvaluationError>;
}

impl<F> ErrorHandler for F
where
    F: Fn(EvaluationError) -> Result<Json, EvaluationError> + Send + Sync,
{
    fn handle(&self, error: EvaluationError) -> Result<Json, EvaluationError> {
        self(error)
    }
}

/// Everything an evaluation needs besides the target and the expression.
#[derive(Clone, Default)]
pub struct EvaluationOptions {
    pub context: Context,
    pub authorizer: Option<Arc<dyn Authorizer>>,
    pub error_handler: Option<Arc<dyn ErrorHandler>>,
}

impl EvaluationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    pub fn error_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for EvaluationOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationOptions")
            .field("context", &self.context)
            .field("authorizer", &self.authorizer.is_some())
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}
