//! Runtime value model for the deepr query engine.
//!
//! The interpreter walks a caller-supplied object graph without knowing its
//! concrete shape. Everything it touches goes through the types here:
//!
//! - **`Node`**: a value in flight (plain JSON, a live [`Target`], a list, or absent)
//! - **`Target`**: the capability trait a live object implements
//! - **`Member`** / **`Method`**: what a name resolves to
//! - **`Record`**: a ready-made target assembled with a builder
//! - **`Context`**: opaque caller data handed to every method call

pub mod builtin;
mod context;
mod error;
mod node;
mod record;
mod target;

pub use builtin::{BUILT_IN_KEYS, is_built_in_key};
pub use context::Context;
pub use error::TargetError;
pub use node::Node;
pub use record::Record;
pub use target::{Member, Method, MethodFn, Resolution, Target};
