//! Implements the compilation phase: a query document becomes an [`Expression`] tree.
use crate::document::QueryDocument;
use crate::error::{QueryPath, QuerySyntaxError};
use crate::filter::CompileOptions;
use crate::key::{PARAMS_KEY, SOURCE_VALUE_KEY, TargetKey, parse_key};
use deepr_expression::{Continuation, Expression, Fields};
use log::debug;
use serde_json::Value as Json;
use std::sync::Arc;

/// A compiler that walks a query document depth-first, left to right, and
/// stops at the first structural problem.
pub struct Compiler<'a> {
    options: &'a CompileOptions,
}

impl<'a> Compiler<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile(&self, document: &QueryDocument) -> Result<Expression, QuerySyntaxError> {
        let expression = self.compile_level(document, "", false, &QueryPath::root())?;
        debug!("Compiled query into {} expression nodes", expression.node_count());
        Ok(expression)
    }

    fn compile_level(
        &self,
        document: &QueryDocument,
        source_key: &str,
        is_optional: bool,
        path: &QueryPath,
    ) -> Result<Expression, QuerySyntaxError> {
        let mut expression = Expression::new(source_key).optional(is_optional);

        let document = match document {
            QueryDocument::Array(items) => match items.as_slice() {
                [item] => {
                    expression.use_collection_elements = true;
                    item
                }
                _ => {
                    return Err(QuerySyntaxError::ArrayWrapper {
                        len: items.len(),
                        path: path.clone(),
                    });
                }
            },
            other => other,
        };

        let entries = match document {
            QueryDocument::Scalar(Json::Bool(true)) => return Ok(expression),
            QueryDocument::Object(entries) => entries,
            other => {
                return Err(QuerySyntaxError::InvalidQueryValue {
                    found: other.describe(),
                    path: path.clone(),
                });
            }
        };

        let mut params: Option<Vec<Json>> = None;
        let mut source_value: Option<Json> = None;
        let mut nested = Fields::new();
        let mut next: Option<Arc<Expression>> = None;
        let mut dropped_any = false;

        for (key, value) in entries {
            if key == PARAMS_KEY {
                if params.is_some() {
                    return Err(QuerySyntaxError::MultipleParams { path: path.clone() });
                }
                match value.to_json() {
                    Json::Array(items) => params = Some(items),
                    other => {
                        return Err(QuerySyntaxError::ParamsNotArray {
                            found: other.to_string(),
                            path: path.clone(),
                        });
                    }
                }
                continue;
            }

            if key == SOURCE_VALUE_KEY {
                if source_value.is_some() {
                    return Err(QuerySyntaxError::MultipleSourceValues { path: path.clone() });
                }
                source_value = Some(value.to_json());
                continue;
            }

            let parsed = parse_key(key).ok_or_else(|| QuerySyntaxError::InvalidKey {
                key: key.clone(),
                path: path.clone(),
            })?;

            if !self.options.accepts(&parsed.source_key) {
                debug!("Ignoring key '{key}' at {path}");
                dropped_any = true;
                continue;
            }

            let child = self.compile_level(
                value,
                &parsed.source_key,
                parsed.is_optional,
                &path.child(key),
            )?;

            match parsed.target {
                TargetKey::Named(name) => {
                    nested.insert(name, Arc::new(child));
                }
                TargetKey::PassThrough => {
                    if next.is_some() {
                        return Err(QuerySyntaxError::MultiplePassThrough { path: path.clone() });
                    }
                    next = Some(Arc::new(child));
                }
            }
        }

        expression.params = params;
        expression.source_value = source_value;
        expression.continuation = match next {
            Some(_) if !nested.is_empty() => {
                return Err(QuerySyntaxError::MixedContinuations { path: path.clone() });
            }
            Some(next) => Continuation::Next(next),
            None if !nested.is_empty() || dropped_any => Continuation::Nested(nested),
            None => Continuation::Leaf,
        };

        Ok(expression)
    }
}
