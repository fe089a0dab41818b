//! Positional reads over files and in-memory buffers.

mod file;
mod read;

pub use read::*;
