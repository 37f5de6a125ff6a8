//! The narrow capability interface through which the interpreter sees a target.
use crate::{Context, Node, TargetError};
use deepr_sequencer::Eventual;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

/// The result of reading an attribute, calling a method, or producing an element.
pub type Resolution = Eventual<'static, Node, TargetError>;

/// Signature shared by every invocable member.
pub type MethodFn = dyn Fn(&[Json], &Context) -> Resolution + Send + Sync;

/// A live object whose members can be looked up by name.
///
/// Implementations decide what each name means. The interpreter only ever
/// calls [`Target::resolve`], [`Target::elements`] and [`Target::snapshot`].
pub trait Target: Send + Sync + fmt::Debug {
    /// Looks up a member. `None` means the name does not exist on this target.
    fn resolve(&self, name: &str) -> Option<Member>;

    /// The elements of the target when it can be iterated as a collection.
    fn elements(&self) -> Option<Vec<Resolution>> {
        None
    }

    /// A plain-data rendering used when the target itself ends up in a result.
    /// Deferred parts are awaited before the rendering completes.
    fn snapshot(&self) -> Eventual<'static, Json, TargetError> {
        Eventual::ready(Json::Null)
    }
}

/// What a name resolves to on a target.
#[derive(Debug)]
pub enum Member {
    /// A readable value, possibly not available yet.
    Attribute(Resolution),
    /// Something that has to be invoked to produce a value.
    Method(Method),
}

impl Member {
    pub fn value(node: impl Into<Node>) -> Self {
        Self::Attribute(Eventual::ready(node.into()))
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Self::Method(_))
    }
}

/// A shareable invocable member.
#[derive(Clone)]
pub struct Method(Arc<MethodFn>);

impl Method {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Json], &Context) -> Resolution + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, params: &[Json], context: &Context) -> Resolution {
        (self.0)(params, context)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Method(..)")
    }
}
