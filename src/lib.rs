//! # deepr
//!
//! Run a declarative deep query against a live object graph in one pass.
//!
//! A query document mirrors the shape of the result it asks for:
//!
//! ```text
//! {
//!   "movies=>actionMovies": {          // read `movies`, store it as `actionMovies`
//!     "()": [{"genre": "action"}],     // ...by calling it with these arguments
//!     "=>": [{"title": true}]          // then, for each element, keep `title`
//!   },
//!   "director?": {"name": true}        // tolerate a missing director
//! }
//! ```
//!
//! The document is compiled into an expression tree, then interpreted
//! against the target. Every step may answer immediately or later; the
//! result is an [`Eventual`] that stays synchronous until the first deferred
//! step and can otherwise be awaited.
//!
//! ## Crates
//!
//! - `deepr-sequencer`: the eager-or-deferred [`Eventual`] and its helpers
//! - `deepr-types`: [`Node`], [`Target`], [`Record`], [`Context`]
//! - `deepr-expression`: the compiled [`Expression`] tree
//! - `deepr-compiler`: query documents to expressions, key filtering
//! - `deepr-runtime`: the interpreter, authorizer and error handler hooks

mod error;
mod options;
mod query;

pub use error::DeeprError;
pub use options::InvokeOptions;
pub use query::Query;

pub use deepr_compiler::{
    CompileOptions, KeyPattern, PatternError, QueryDocument, QueryPath, QuerySyntaxError,
};
pub use deepr_expression::{Continuation, Expression};
pub use deepr_runtime::{
    Authorizer, Decision, ErrorHandler, Evaluation, EvaluationError, EvaluationOptions,
    Interpreter, Operation,
};
pub use deepr_sequencer::Eventual;
pub use deepr_types::{Context, Member, Method, Node, Record, Target, TargetError};

use deepr_sequencer::map_seq;
use log::debug;
use serde_json::Value as Json;

/// The outcome of [`invoke`] and its variants.
pub type Outcome = Eventual<'static, Json, DeeprError>;

/// Compiles `document` and evaluates it against `target`.
pub fn invoke(target: impl Into<Node>, document: &Json, options: &InvokeOptions) -> Outcome {
    match Query::compile(document, options.compile()) {
        Ok(query) => run(&query, target.into(), options),
        Err(error) => Eventual::failed(error.into()),
    }
}

/// Like [`invoke`], for a query written as JSON text.
pub fn invoke_str(target: impl Into<Node>, text: &str, options: &InvokeOptions) -> Outcome {
    match Query::parse(text, options.compile()) {
        Ok(query) => run(&query, target.into(), options),
        Err(error) => Eventual::failed(error),
    }
}

/// Evaluates several documents against the same target, one after another.
///
/// Every document is compiled before any of them runs, so a malformed
/// document fails the batch without touching the target. Results come back
/// as an array in document order.
pub fn invoke_batch(target: impl Into<Node>, documents: &[Json], options: &InvokeOptions) -> Outcome {
    let queries = match documents
        .iter()
        .map(|document| Query::compile(document, options.compile()))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(queries) => queries,
        Err(error) => return Eventual::failed(error.into()),
    };
    debug!("Invoking a batch of {} queries", queries.len());

    let target = target.into();
    let interpreter = Interpreter::new(options.evaluation().clone());
    map_seq(queries, move |query| {
        query
            .evaluate_with(target.clone(), &interpreter)
            .map_err(DeeprError::from)
    })
    .map(Json::Array)
}

fn run(query: &Query, target: Node, options: &InvokeOptions) -> Outcome {
    query
        .evaluate(target, options.evaluation())
        .map_err(DeeprError::from)
}
