//! The base capability set shared by every object and function.
//!
//! Query documents usually mirror the attribute names of the objects they
//! target, so these generic names are reserved: the compiler drops them
//! unless built-in keys are explicitly allowed. A few of them are also
//! answered by every node, so that an allowed query can reach them.
use crate::node::Node;
use crate::target::{Member, Method};
use deepr_sequencer::Eventual;
use serde_json::Value as Json;

/// Names inherited by every object, function, and class.
pub const BUILT_IN_KEYS: &[&str] = &[
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "hasOwnProperty",
    "__lookupGetter__",
    "__lookupSetter__",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toString",
    "valueOf",
    "__proto__",
    "toLocaleString",
    "arguments",
    "caller",
    "apply",
    "bind",
    "call",
    "prototype",
];

pub fn is_built_in_key(key: &str) -> bool {
    BUILT_IN_KEYS.contains(&key)
}

/// Resolves one of the built-in members against `node`. Absent and `null`
/// nodes have none.
pub(crate) fn member(node: &Node, name: &str) -> Option<Member> {
    if node.is_void() {
        return None;
    }
    let node = node.clone();
    let method = match name {
        "hasOwnProperty" => Method::new(move |params, _| {
            let found = params
                .first()
                .and_then(Json::as_str)
                .is_some_and(|key| node.own_member(key).is_some());
            Eventual::ready(Node::value(found))
        }),
        "toString" | "toLocaleString" => Method::new(move |_, _| {
            node.clone().render().map(|rendered| {
                let text = match rendered {
                    Json::String(text) => text,
                    other => other.to_string(),
                };
                Node::value(text)
            })
        }),
        "valueOf" => Method::new(move |_, _| Eventual::ready(node.clone())),
        _ => return None,
    };
    Some(Member::Method(method))
}
