//! Small value types shared by the queue.

pub mod optional;
pub mod set;

pub use optional::{Optional, parse_bool};
pub use set::Set;
