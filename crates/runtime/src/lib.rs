//! Evaluates compiled deep-query expressions against live targets.
//!
//! For every node of an [`Expression`](deepr_expression::Expression) tree the
//! interpreter resolves the source key on the current target (reading an
//! attribute or invoking a method, after asking the [`Authorizer`]), applies
//! a literal override, then either stops or continues into the node's
//! sub-expressions, fanning out over collections when asked to.
//!
//! Evaluation is sequential and stays synchronous until the first deferred
//! step. Failures propagate to the caller unless the failing node is optional
//! or an [`ErrorHandler`] substitutes a value for the failed branch.

mod error;
mod interpreter;
mod options;

pub use error::EvaluationError;
pub use interpreter::{Evaluation, Interpreter, evaluate};
pub use options::{Authorizer, Decision, ErrorHandler, EvaluationOptions, Operation};
