//! Read and write Plait files.
//!
//! A Plait file stores records of a single schema as one region of encoded level triples per
//! leaf column, followed by a footer describing where each region lives.
//!
//! # Writing
//!
//! Records are written through a [`PlaitFileWriter`], created from [`PlaitWriteOptions`]. Each
//! record is shredded into its columns as it arrives; the column regions are laid out when the
//! writer is finished.
//!
//! # Reading
//!
//! Files are opened with [`PlaitOpenOptions`], which reads and validates the footer. A
//! [`PlaitFile`] then reads column regions on demand: a scan only fetches the columns its
//! projection and filter need.
//!
//! # File Format
//!
//! 1. The 4 magic bytes.
//! 2. One contiguous region per leaf column, in schema leaf order, holding that column's triples
//!    in write order (see [`plait_layout::codec`]).
//! 3. The footer: a JSON document with the format version, the schema, the record count and the
//!    offset, length and triple count of every column region.
//! 4. The 10-byte end-of-file marker: the `u16` version, the `u32` footer length and the magic
//!    bytes.
//!
//! All integers are little-endian. A file holds a single group of rows.
//!
//! ```text
//! ┌────────────────────────────┐
//! │        Magic Bytes         │
//! ├────────────────────────────┤
//! │                            │
//! │   Column Regions (triples) │
//! │                            │
//! ├────────────────────────────┤
//! │                            │
//! │        JSON Footer         │
//! │                            │
//! ├────────────────────────────┤
//! │    10-byte End of File     │
//! │ (Version, Footer Length,   │
//! │       Magic Bytes)         │
//! └────────────────────────────┘
//! ```

mod file;
mod footer;
mod open;
mod writer;

pub use file::*;
pub use footer::*;
pub use open::*;
pub use writer::*;

/// The current version of the file format.
pub const VERSION: u16 = 1;
/// The size of the end-of-file marker.
pub const EOF_SIZE: usize = 10;
/// The magic bytes at the start and end of every file.
pub const MAGIC_BYTES: [u8; 4] = *b"PLAT";
/// The largest footer a file may carry.
pub const MAX_FOOTER_SIZE: u32 = 1 << 28;
