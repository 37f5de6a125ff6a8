//! The compiled form of a deep-query document.
//!
//! A query document is terse and ambiguous (keys carry renames, optionality
//! and pass-through markers). The compiler turns it into this tree, where
//! every node says exactly what to resolve and what to do with the result.
//! Trees are immutable once built; children are shared through `Arc`, so one
//! tree can be evaluated concurrently against any number of targets.
//!
//! Serialized, a tree looks like this:
//!
//! ```text
//! {
//!   "nestedExpressions": {
//!     "actionMovies": {
//!       "sourceKey": "getMovies",
//!       "params": [{"genre": "action"}],
//!       "nextExpression": {
//!         "sourceKey": "reverse",
//!         "params": [],
//!         "useCollectionElements": true,
//!         "nestedExpressions": {
//!           "title": {"sourceKey": "title"},
//!           "year": {"sourceKey": "year"}
//!         }
//!       }
//!     }
//!   }
//! }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use std::sync::Arc;

/// Named sub-expressions, in declaration order.
pub type Fields = IndexMap<String, Arc<Expression>>;

/// What happens with a node's value once it has been resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Continuation {
    /// Stop here; the resolved value is the result.
    #[default]
    Leaf,
    /// Continue with a single unnamed expression whose result replaces this
    /// node's result.
    Next(Arc<Expression>),
    /// Build an object, one field per named expression.
    Nested(Fields),
}

impl Continuation {
    pub fn next(expression: Expression) -> Self {
        Self::Next(Arc::new(expression))
    }

    pub fn nested<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Expression)>,
        K: Into<String>,
    {
        Self::Nested(
            fields
                .into_iter()
                .map(|(name, expression)| (name.into(), Arc::new(expression)))
                .collect(),
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }
}

/// One node of a compiled query.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(into = "ExpressionRepr", try_from = "ExpressionRepr")]
pub struct Expression {
    /// Member to resolve on the current target. Empty means the target itself.
    pub source_key: String,
    /// A missing member or absent value short-circuits to absent instead of failing.
    pub is_optional: bool,
    /// Positional arguments for a method invocation.
    pub params: Option<Vec<Json>>,
    /// Literal that replaces whatever `source_key` resolved to.
    pub source_value: Option<Json>,
    /// The resolved value is a collection; the continuation applies per element.
    pub use_collection_elements: bool,
    pub continuation: Continuation,
}

impl Expression {
    pub fn new(source_key: impl Into<String>) -> Self {
        Self {
            source_key: source_key.into(),
            ..Self::default()
        }
    }

    pub fn optional(mut self, is_optional: bool) -> Self {
        self.is_optional = is_optional;
        self
    }

    pub fn with_params(mut self, params: Vec<Json>) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_source_value(mut self, value: Json) -> Self {
        self.source_value = Some(value);
        self
    }

    pub fn over_elements(mut self) -> Self {
        self.use_collection_elements = true;
        self
    }

    pub fn with_continuation(mut self, continuation: Continuation) -> Self {
        self.continuation = continuation;
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.continuation.is_leaf()
    }

    /// Number of nodes in the tree rooted here.
    pub fn node_count(&self) -> usize {
        1 + match &self.continuation {
            Continuation::Leaf => 0,
            Continuation::Next(next) => next.node_count(),
            Continuation::Nested(fields) => fields.values().map(|e| e.node_count()).sum(),
        }
    }
}

/// Wire shape of [`Expression`]: flat optional fields, as documented above.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpressionRepr {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    source_key: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    is_optional: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Vec<Json>>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    source_value: Option<Json>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    use_collection_elements: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_expression: Option<Arc<Expression>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    nested_expressions: Option<Fields>,
}

/// Keeps an explicit `null` literal instead of collapsing it to `None`.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Json>, D::Error> {
    Json::deserialize(deserializer).map(Some)
}

impl From<Expression> for ExpressionRepr {
    fn from(expression: Expression) -> Self {
        let (next_expression, nested_expressions) = match expression.continuation {
            Continuation::Leaf => (None, None),
            Continuation::Next(next) => (Some(next), None),
            Continuation::Nested(fields) => (None, Some(fields)),
        };
        Self {
            source_key: expression.source_key,
            is_optional: expression.is_optional,
            params: expression.params,
            source_value: expression.source_value,
            use_collection_elements: expression.use_collection_elements,
            next_expression,
            nested_expressions,
        }
    }
}

impl TryFrom<ExpressionRepr> for Expression {
    type Error = String;

    fn try_from(repr: ExpressionRepr) -> Result<Self, Self::Error> {
        let continuation = match (repr.next_expression, repr.nested_expressions) {
            (None, None) => Continuation::Leaf,
            (Some(next), None) => Continuation::Next(next),
            (None, Some(fields)) => Continuation::Nested(fields),
            (Some(_), Some(_)) => {
                return Err(format!(
                    "expression '{}' has both a nextExpression and nestedExpressions",
                    repr.source_key
                ));
            }
        };
        Ok(Self {
            source_key: repr.source_key,
            is_optional: repr.is_optional,
            params: repr.params,
            source_value: repr.source_value,
            use_collection_elements: repr.use_collection_elements,
            continuation,
        })
    }
}
