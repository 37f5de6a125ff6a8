//! Compiles deep-query documents into [`Expression`] trees.
//!
//! ```text
//! {                                        {
//!   "getMovies=>actionMovies": {             "nestedExpressions": {
//!     "()": [{"genre": "action"}],             "actionMovies": {
//!     "reverse=>": {               ==>           "sourceKey": "getMovies",
//!       "()": [],                                "params": [...],
//!       "=>": [{"title": true}]                  "nextExpression": {...}
//!     }                                        }
//!   }                                        }
//! }                                        }
//! ```
//!
//! Plain `serde_json::Value` documents are accepted directly. Documents read
//! from text should go through [`QueryDocument`] so that duplicate reserved
//! keys are reported instead of silently collapsed.

mod compiler;
pub mod document;
pub mod error;
pub mod filter;
pub mod key;

pub use compiler::Compiler;
pub use document::QueryDocument;
pub use error::{PatternError, QueryPath, QuerySyntaxError};
pub use filter::{CompileOptions, KeyPattern};

use deepr_expression::Expression;
use serde_json::Value as Json;

/// Compiles a JSON query document.
pub fn compile(document: &Json, options: &CompileOptions) -> Result<Expression, QuerySyntaxError> {
    compile_document(&QueryDocument::from(document), options)
}

/// Compiles a query document that may carry duplicate keys.
pub fn compile_document(
    document: &QueryDocument,
    options: &CompileOptions,
) -> Result<Expression, QuerySyntaxError> {
    Compiler::new(options).compile(document)
}
