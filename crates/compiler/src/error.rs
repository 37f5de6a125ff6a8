//! Diagnostics produced while compiling a query document.
use std::fmt;
use thiserror::Error;

/// The chain of document keys leading to the level where a problem was found.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryPath(Vec<String>);

impl QueryPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

/// A structural problem in a query document. Compilation stops at the first
/// one found, depth-first and left-to-right.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuerySyntaxError {
    #[error("Invalid key '{key}' at {path}: a key may contain at most one '=>' separator")]
    InvalidKey { key: String, path: QueryPath },

    #[error("Invalid array at {path}: an array should contain exactly one item, found {len}")]
    ArrayWrapper { len: usize, path: QueryPath },

    #[error("Invalid query at {path}: expected `true`, an object or a single-item array, found {found}")]
    InvalidQueryValue { found: String, path: QueryPath },

    #[error("Invalid parameters at {path}: parameters must be specified in an array, found {found}")]
    ParamsNotArray { found: String, path: QueryPath },

    #[error("Multiple parameters found at the same level ({path})")]
    MultipleParams { path: QueryPath },

    #[error("Multiple source values found at the same level ({path})")]
    MultipleSourceValues { path: QueryPath },

    #[error("Empty and non-empty targets found at the same level ({path})")]
    MixedContinuations { path: QueryPath },

    #[error("Multiple empty targets found at the same level ({path})")]
    MultiplePassThrough { path: QueryPath },
}

impl QuerySyntaxError {
    /// Where in the document the problem was found.
    pub fn path(&self) -> &QueryPath {
        match self {
            Self::InvalidKey { path, .. }
            | Self::ArrayWrapper { path, .. }
            | Self::InvalidQueryValue { path, .. }
            | Self::ParamsNotArray { path, .. }
            | Self::MultipleParams { path }
            | Self::MultipleSourceValues { path }
            | Self::MixedContinuations { path }
            | Self::MultiplePassThrough { path } => path,
        }
    }
}

/// A key pattern that could not be built.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid key pattern '{pattern}': {message}")]
pub struct PatternError {
    pub pattern: String,
    pub message: String,
}
