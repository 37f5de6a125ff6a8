use crate::builtin;
use crate::TargetError;
use crate::target::{Member, Resolution, Target};
use deepr_sequencer::{Eventual, map_seq};
use serde_json::Value as Json;
use std::sync::Arc;

/// A value flowing through the interpreter.
///
/// Plain JSON data is queryable by itself: object keys behave as attributes
/// and arrays as collections. Live objects are reached through [`Target`].
#[derive(Debug, Clone, Default)]
pub enum Node {
    /// Nothing was found. Omitted from result objects.
    #[default]
    Absent,
    Value(Json),
    Object(Arc<dyn Target>),
    List(Vec<Node>),
}

impl Node {
    pub fn value(value: impl Into<Json>) -> Self {
        Self::Value(value.into())
    }

    pub fn object<T: Target + 'static>(target: T) -> Self {
        Self::Object(Arc::new(target))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// True for nodes a query cannot continue into: absent values and `null`.
    pub fn is_void(&self) -> bool {
        matches!(self, Self::Absent | Self::Value(Json::Null))
    }

    /// True for `null`, booleans, numbers and strings, which have no named members.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Value(Json::Null | Json::Bool(_) | Json::Number(_) | Json::String(_))
        )
    }

    /// Looks up `name`, falling back to the built-in members every node shares.
    pub fn member(&self, name: &str) -> Option<Member> {
        self.own_member(name).or_else(|| builtin::member(self, name))
    }

    /// Looks up `name` among the node's own members only.
    pub fn own_member(&self, name: &str) -> Option<Member> {
        match self {
            Self::Value(Json::Object(map)) => map.get(name).cloned().map(Member::value),
            Self::Object(target) => target.resolve(name),
            _ => None,
        }
    }

    /// The node's elements when it is a collection.
    pub fn elements(&self) -> Option<Vec<Resolution>> {
        match self {
            Self::Value(Json::Array(items)) => Some(
                items
                    .iter()
                    .cloned()
                    .map(|item| Eventual::ready(Self::Value(item)))
                    .collect(),
            ),
            Self::List(items) => Some(items.iter().cloned().map(Eventual::ready).collect()),
            Self::Object(target) => target.elements(),
            _ => None,
        }
    }

    /// A short description of the node's shape, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Value(Json::Null) => "null",
            Self::Value(Json::Bool(_)) => "boolean",
            Self::Value(Json::Number(_)) => "number",
            Self::Value(Json::String(_)) => "string",
            Self::Value(Json::Array(_)) => "array",
            Self::Value(Json::Object(_)) => "object",
            Self::Object(_) => "target",
            Self::List(_) => "list",
        }
    }

    /// Renders the node as plain data. Live objects render through
    /// [`Target::snapshot`] and may take a while to finish.
    pub fn render(self) -> Eventual<'static, Json, TargetError> {
        match self {
            Self::Absent => Eventual::ready(Json::Null),
            Self::Value(value) => Eventual::ready(value),
            Self::Object(target) => target.snapshot(),
            Self::List(items) => map_seq(items, Self::render).map(Json::Array),
        }
    }
}

impl From<Json> for Node {
    fn from(value: Json) -> Self {
        Self::Value(value)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::List(items)
    }
}

impl From<Arc<dyn Target>> for Node {
    fn from(target: Arc<dyn Target>) -> Self {
        Self::Object(target)
    }
}
