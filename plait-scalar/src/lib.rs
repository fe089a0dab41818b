//! Runtime values for Plait records.
//!
//! A [`Value`] is untyped on its own: it is interpreted against a schema node by the writer and
//! produced from one by the reader. Absent optional fields are [`Value::Null`], repeated fields
//! are [`Value::List`], groups are [`Value::Record`].

mod display;
mod record;
mod value;

pub use record::*;
pub use value::*;
