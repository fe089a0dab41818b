#![deny(missing_docs)]

//! Error handling for Plait.
//!
//! Every failure in the read and write paths is a [`PlaitError`]. The four domain variants map
//! onto the ways a read or write task can go wrong:
//!
//! * [`PlaitError::Schema`]: a projection or schema definition refers to something that does not
//!   exist or is malformed.
//! * [`PlaitError::SchemaMismatch`]: a record handed to the writer does not fit the schema.
//! * [`PlaitError::UnknownColumn`]: a predicate references a column that is not part of the read.
//! * [`PlaitError::ColumnDesync`]: column readers disagree about record boundaries. This is never
//!   the caller's fault and is not recoverable for the task.
//!
//! None of these are retried inside the library.

mod ext;

use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::num::TryFromIntError;
use std::ops::Deref;
use std::{fmt, io};

pub use ext::*;

// Alias so `thiserror` does not auto-detect the field and emit a nightly-only `provide()`.
type CapturedBacktrace = Backtrace;

/// A string that can be used as an error message.
#[derive(Debug)]
pub struct ErrString(Cow<'static, str>);

impl<T> From<T> for ErrString
where
    T: Into<Cow<'static, str>>,
{
    fn from(msg: T) -> Self {
        Self(msg.into())
    }
}

impl AsRef<str> for ErrString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for ErrString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for ErrString {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// The top-level error type for Plait.
#[derive(thiserror::Error)]
#[non_exhaustive]
pub enum PlaitError {
    /// A schema could not be built or projected.
    #[error("schema error: {0}\nBacktrace:\n{1}")]
    Schema(ErrString, CapturedBacktrace),
    /// A record does not conform to the schema it is written with.
    #[error("record does not match schema: {0}\nBacktrace:\n{1}")]
    SchemaMismatch(ErrString, CapturedBacktrace),
    /// A predicate references a column that is not available to the read.
    #[error("unknown column: {0}\nBacktrace:\n{1}")]
    UnknownColumn(ErrString, CapturedBacktrace),
    /// Column readers disagree about where records start and end.
    #[error("column readers out of sync: {0}\nBacktrace:\n{1}")]
    ColumnDesync(ErrString, CapturedBacktrace),
    /// An invalid argument was provided.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidArgument(ErrString, CapturedBacktrace),
    /// Bytes on disk could not be decoded.
    #[error("{0}\nBacktrace:\n{1}")]
    InvalidSerde(ErrString, CapturedBacktrace),
    /// A wrapper for other errors, carrying additional context.
    #[error("{0}: {1}")]
    Context(ErrString, #[source] Box<PlaitError>),
    /// A wrapper for IO errors.
    #[error("{0}\nBacktrace:\n{1}")]
    IOError(#[source] io::Error, CapturedBacktrace),
    /// A wrapper for integer conversion errors.
    #[error("{0}\nBacktrace:\n{1}")]
    TryFromInt(#[source] TryFromIntError, CapturedBacktrace),
    /// A wrapper for JSON (de)serialization errors.
    #[cfg(feature = "serde")]
    #[error("{0}\nBacktrace:\n{1}")]
    JsonError(#[source] serde_json::Error, CapturedBacktrace),
}

impl PlaitError {
    /// Adds additional context to an error.
    pub fn with_context<T: Into<ErrString>>(self, msg: T) -> Self {
        PlaitError::Context(msg.into(), Box::new(self))
    }

    /// The innermost error, looking through any [`PlaitError::Context`] wrappers.
    pub fn root(&self) -> &PlaitError {
        match self {
            PlaitError::Context(_, inner) => inner.root(),
            other => other,
        }
    }
}

impl Debug for PlaitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl From<io::Error> for PlaitError {
    fn from(value: io::Error) -> Self {
        PlaitError::IOError(value, Backtrace::capture())
    }
}

impl From<TryFromIntError> for PlaitError {
    fn from(value: TryFromIntError) -> Self {
        PlaitError::TryFromInt(value, Backtrace::capture())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for PlaitError {
    fn from(value: serde_json::Error) -> Self {
        PlaitError::JsonError(value, Backtrace::capture())
    }
}

impl From<PlaitError> for io::Error {
    fn from(value: PlaitError) -> Self {
        match value {
            PlaitError::IOError(err, _) => err,
            other => io::Error::other(other),
        }
    }
}

/// A type alias for Results that return [`PlaitError`]s as their error type.
pub type PlaitResult<T> = Result<T, PlaitError>;

/// A convenient macro for creating a [`PlaitError`].
///
/// ```
/// use plait_error::{plait_err, PlaitError};
///
/// let err = plait_err!(Schema: "no field named {}", "make");
/// assert!(matches!(err, PlaitError::Schema(..)));
///
/// let err = plait_err!("bad argument");
/// assert!(matches!(err, PlaitError::InvalidArgument(..)));
/// ```
#[macro_export]
macro_rules! plait_err {
    (Context: $msg:literal, $err:expr) => {{
        $crate::__private::must_use(
            $crate::PlaitError::Context($msg.into(), Box::new($err))
        )
    }};
    (IOError: $err:expr) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::PlaitError::IOError($err, Backtrace::capture())
        )
    }};
    ($variant:ident: $fmt:literal $(, $arg:expr)* $(,)?) => {{
        use std::backtrace::Backtrace;
        $crate::__private::must_use(
            $crate::PlaitError::$variant(format!($fmt, $($arg),*).into(), Backtrace::capture())
        )
    }};
    ($fmt:literal $(, $arg:expr)* $(,)?) => {
        $crate::plait_err!(InvalidArgument: $fmt, $($arg),*)
    };
}

/// A convenient macro for returning a [`PlaitError`].
#[macro_export]
macro_rules! plait_bail {
    ($($tt:tt)+) => {
        return Err($crate::plait_err!($($tt)+))
    };
}

#[doc(hidden)]
pub mod __private {
    #[doc(hidden)]
    #[inline]
    #[cold]
    #[must_use]
    pub const fn must_use(error: crate::PlaitError) -> crate::PlaitError {
        error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with_schema_error(name: &str) -> PlaitResult<()> {
        plait_bail!(Schema: "no field named {name}")
    }

    #[test]
    fn bail_builds_variant() {
        let err = fails_with_schema_error("optionalExtra").unwrap_err();
        assert!(matches!(err, PlaitError::Schema(..)));
        assert!(err.to_string().contains("no field named optionalExtra"));
    }

    #[test]
    fn io_roundtrip_keeps_kind() {
        let err: PlaitError = io::Error::new(io::ErrorKind::UnexpectedEof, "short read").into();
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::UnexpectedEof);

        let back: io::Error = plait_err!(ColumnDesync: "boom").into();
        assert_eq!(back.kind(), io::ErrorKind::Other);
    }
}
