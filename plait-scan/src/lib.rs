//! Scans that read records out of column readers.
//!
//! A scan narrows the file schema to the requested projection, binds an optional predicate to
//! the columns it references, and then walks the records in order. The predicate is evaluated
//! first, reading only the columns it needs. Records it rejects are skipped in every column
//! without decoding their values; records it accepts are assembled from the projected columns.

mod filter;
mod metrics;
mod plan;
mod scan;

pub use filter::*;
pub use metrics::*;
pub use plan::*;
pub use scan::*;
