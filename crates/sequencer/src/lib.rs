//! Eager-or-deferred sequencing for the deepr query engine.
//!
//! The interpreter never knows in advance whether reading an attribute or
//! calling a method completes immediately or has to be awaited. [`Eventual`]
//! lets it write one code path for both: synchronous steps are chained
//! without any allocation, and the chain only becomes a boxed future once a
//! step actually defers.
//!
//! ## Usage
//!
//! ```ignore
//! use deepr_sequencer::{Eventual, map_seq};
//!
//! let doubled = map_seq(vec![1, 2, 3], |n| Eventual::<_, String>::ready(n * 2));
//! assert_eq!(doubled.into_ready().unwrap(), Ok(vec![2, 4, 6]));
//! ```

mod eventual;
mod seq;

pub use eventual::Eventual;
pub use seq::{for_each_seq, map_seq, map_values, reduce_seq};
