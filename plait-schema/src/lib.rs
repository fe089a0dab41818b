#![deny(missing_docs)]

//! The schema model for Plait.
//!
//! A [`Schema`] is a tree of [`SchemaNode`]s rooted at a required group. Every node carries a
//! [`Repetition`] marker, and leaves carry a [`PType`]. The flattened view of a schema, one
//! [`ColumnDescriptor`] per leaf, is what the column readers and writers work against: see
//! [`leaves`].

pub use column::*;
pub use field::*;
pub use node::*;
pub use projection::*;
pub use ptype::*;
pub use repetition::*;
pub use schema::*;

mod column;
mod field;
mod node;
mod projection;
mod ptype;
mod repetition;
mod schema;
