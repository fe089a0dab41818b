//! Row predicates over the leaf columns of a record.
//!
//! A [`Predicate`] is a boolean tree whose leaves test one column each. The scan binds a
//! predicate to the columns it reads and evaluates it per record before anything else is
//! decoded. [`UnboundFilter`]s and the [`FilterRegistry`] let configuration name a predicate by
//! identifier instead of building it in code.

mod column;
mod filter;
mod operator;
mod predicate;
mod registry;

pub use column::*;
pub use filter::*;
pub use operator::*;
pub use predicate::*;
pub use registry::*;
