use crate::error::DeeprError;
use deepr_compiler::{CompileOptions, QueryDocument, QuerySyntaxError};
use deepr_expression::Expression;
use deepr_runtime::{Evaluation, EvaluationOptions, Interpreter};
use deepr_types::Node;
use serde_json::Value as Json;
use std::sync::Arc;

/// A compiled query, ready to be evaluated against any number of targets.
///
/// Compilation happens once; the resulting tree is shared and never mutated,
/// so a `Query` can be cloned cheaply and evaluated concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    expression: Arc<Expression>,
}

impl Query {
    pub fn compile(document: &Json, options: &CompileOptions) -> Result<Self, QuerySyntaxError> {
        deepr_compiler::compile(document, options).map(Self::from)
    }

    pub fn compile_document(
        document: &QueryDocument,
        options: &CompileOptions,
    ) -> Result<Self, QuerySyntaxError> {
        deepr_compiler::compile_document(document, options).map(Self::from)
    }

    /// Parses and compiles a query written as JSON text.
    pub fn parse(text: &str, options: &CompileOptions) -> Result<Self, DeeprError> {
        let document: QueryDocument = text.parse()?;
        Ok(Self::compile_document(&document, options)?)
    }

    pub fn expression(&self) -> &Arc<Expression> {
        &self.expression
    }

    pub fn evaluate(&self, target: impl Into<Node>, options: &EvaluationOptions) -> Evaluation {
        deepr_runtime::evaluate(target, &self.expression, options)
    }

    /// Evaluates with an interpreter that is reused across calls.
    pub fn evaluate_with(&self, target: impl Into<Node>, interpreter: &Interpreter) -> Evaluation {
        interpreter.evaluate(target, &self.expression)
    }
}

impl From<Expression> for Query {
    fn from(expression: Expression) -> Self {
        Self {
            expression: Arc::new(expression),
        }
    }
}
