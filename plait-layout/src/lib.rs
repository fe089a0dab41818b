//! Column chunks and the record <-> column transformations.
//!
//! A record is shredded into one stream of [`Triple`]s per leaf column of its schema. Each
//! triple carries a repetition level, a definition level and (when fully defined) a value. The
//! [`RecordAssembler`] reverses this using only the levels, so a reader can reconstruct nested
//! optional and repeated structure from independent columns.

mod assemble;
mod buffered;
pub mod codec;
#[cfg(test)]
mod dremel;
mod reader;
mod shred;
mod triple;
mod writer;

pub use assemble::*;
pub use buffered::*;
pub use reader::*;
pub use shred::*;
pub use triple::*;
pub use writer::*;
