use deepr_compiler::{PatternError, QuerySyntaxError};
use deepr_runtime::EvaluationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeeprError {
    #[error("Query syntax error: {0}")]
    Syntax(#[from] QuerySyntaxError),

    #[error("Configuration error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}
