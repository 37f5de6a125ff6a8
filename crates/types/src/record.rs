//! A builder-style target for assembling object graphs by hand.
use crate::target::{Member, Method, Resolution, Target};
use crate::{Context, Node, TargetError};
use deepr_sequencer::{Eventual, map_seq, map_values};
use indexmap::IndexMap;
use serde_json::{Map, Value as Json};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type Producer = Arc<dyn Fn() -> Resolution + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Ready(Node),
    Deferred(Producer),
}

impl Slot {
    fn produce(&self) -> Resolution {
        match self {
            Slot::Ready(node) => Eventual::ready(node.clone()),
            Slot::Deferred(producer) => producer(),
        }
    }

    fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, TargetError>> + Send + 'static,
    {
        Slot::Deferred(Arc::new(move || Eventual::deferred(f())))
    }
}

#[derive(Clone)]
enum Entry {
    Value(Slot),
    Method(Method),
}

/// An object made of named attributes, methods, and optional elements.
///
/// Deferred attributes and elements are produced afresh on every read, so a
/// `Record` can be queried any number of times.
///
/// ```ignore
/// let movies = Record::new()
///     .element(json!({ "title": "Inception" }))
///     .method("count", |_, _| Ok(Node::value(1)));
/// ```
#[derive(Clone, Default)]
pub struct Record {
    members: IndexMap<String, Entry>,
    elements: Option<Vec<Slot>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Node>) -> Self {
        self.members
            .insert(name.into(), Entry::Value(Slot::Ready(value.into())));
        self
    }

    /// An attribute whose value only becomes available once `f`'s future resolves.
    pub fn deferred_attr<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, TargetError>> + Send + 'static,
    {
        self.members
            .insert(name.into(), Entry::Value(Slot::deferred(f)));
        self
    }

    /// A method answering immediately.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Json], &Context) -> Result<Node, TargetError> + Send + Sync + 'static,
    {
        let method = Method::new(move |params, context| Eventual::from(f(params, context)));
        self.members.insert(name.into(), Entry::Method(method));
        self
    }

    /// A method answering through a future.
    pub fn async_method<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<Json>, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, TargetError>> + Send + 'static,
    {
        let method = Method::new(move |params, context| {
            Eventual::deferred(f(params.to_vec(), context.clone()))
        });
        self.members.insert(name.into(), Entry::Method(method));
        self
    }

    /// Appends an element, turning the record into an iterable collection.
    pub fn element(mut self, value: impl Into<Node>) -> Self {
        self.elements
            .get_or_insert_with(Vec::new)
            .push(Slot::Ready(value.into()));
        self
    }

    pub fn deferred_element<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Node, TargetError>> + Send + 'static,
    {
        self.elements
            .get_or_insert_with(Vec::new)
            .push(Slot::deferred(f));
        self
    }

    pub fn into_node(self) -> Node {
        Node::object(self)
    }
}

impl Target for Record {
    fn resolve(&self, name: &str) -> Option<Member> {
        self.members.get(name).map(|entry| match entry {
            Entry::Value(slot) => Member::Attribute(slot.produce()),
            Entry::Method(method) => Member::Method(method.clone()),
        })
    }

    fn elements(&self) -> Option<Vec<Resolution>> {
        self.elements
            .as_ref()
            .map(|slots| slots.iter().map(Slot::produce).collect())
    }

    /// Renders attributes as an object, or elements as an array when the
    /// record has elements but no attributes. Deferred slots are produced and
    /// awaited in declaration order. Methods and absent attributes are left out.
    fn snapshot(&self) -> Eventual<'static, Json, TargetError> {
        let has_attributes = self
            .members
            .values()
            .any(|entry| matches!(entry, Entry::Value(_)));
        if !has_attributes
            && let Some(elements) = &self.elements
        {
            return map_seq(elements.clone(), |slot: Slot| slot.produce().and_then(Node::render))
                .map(Json::Array);
        }

        let attributes: Vec<(String, Slot)> = self
            .members
            .iter()
            .filter_map(|(name, entry)| match entry {
                Entry::Value(slot) => Some((name.clone(), slot.clone())),
                Entry::Method(_) => None,
            })
            .collect();

        map_values(attributes, |slot: Slot| {
            slot.produce().and_then(|node| match node {
                Node::Absent => Eventual::ready(None),
                node => node.render().map(Some),
            })
        })
        .map(|fields| {
            Json::Object(
                fields
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|value| (name, value)))
                    .collect::<Map<String, Json>>(),
            )
        })
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Node::object(record)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("members", &self.members.keys().collect::<Vec<_>>())
            .field("elements", &self.elements.as_ref().map(Vec::len))
            .finish()
    }
}
