//! Paths to fields in a (possibly nested) schema.
//!
//! A [`FieldPath`] is a sequence of field names from the record root down to some node. A path
//! that ends at a primitive leaf identifies one column.

use core::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use itertools::Itertools;
use plait_error::{PlaitError, PlaitResult, plait_bail};

/// A name for a field in a group.
pub type FieldName = Arc<str>;

/// The separator used by the textual form of a [`FieldPath`].
pub const PATH_SEPARATOR: char = '.';

/// A path through a (possibly nested) schema, composed of a sequence of field names.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct FieldPath(Vec<FieldName>);

impl FieldPath {
    /// The path of the record root itself.
    pub fn root() -> Self {
        Self(vec![])
    }

    /// Constructs a new `FieldPath` from a single top-level field name.
    pub fn from_name<F: Into<FieldName>>(name: F) -> Self {
        Self(vec![name.into()])
    }

    /// Returns the sequence of names that make up this path.
    pub fn parts(&self) -> &[FieldName] {
        &self.0
    }

    /// The number of names in this path.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if this path addresses the root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last name of the path, if any.
    pub fn leaf_name(&self) -> Option<&FieldName> {
        self.0.last()
    }

    /// Returns true if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &FieldPath) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Pushes a new name to the end of this path.
    pub fn push<F: Into<FieldName>>(&mut self, name: F) {
        self.0.push(name.into());
    }

    /// Removes the last name of this path.
    pub fn pop(&mut self) -> Option<FieldName> {
        self.0.pop()
    }

    /// Returns a new path extended by `name`.
    pub fn join<F: Into<FieldName>>(&self, name: F) -> Self {
        let mut path = self.clone();
        path.push(name);
        path
    }
}

impl FromIterator<FieldName> for FieldPath {
    fn from_iter<T: IntoIterator<Item = FieldName>>(iter: T) -> Self {
        FieldPath(iter.into_iter().collect())
    }
}

impl From<Vec<FieldName>> for FieldPath {
    fn from(value: Vec<FieldName>) -> Self {
        FieldPath(value)
    }
}

/// Parses the dotted form, so `"engine.type"` becomes `[engine, type]`.
impl FromStr for FieldPath {
    type Err = PlaitError;

    fn from_str(s: &str) -> PlaitResult<Self> {
        if s.is_empty() {
            return Ok(FieldPath::root());
        }
        let parts = s.split(PATH_SEPARATOR).collect_vec();
        if parts.iter().any(|p| p.is_empty()) {
            plait_bail!(Schema: "malformed field path {s:?}")
        }
        Ok(parts.into_iter().map(FieldName::from).collect())
    }
}

impl From<&str> for FieldPath {
    /// Infallible conversion for literals; a malformed path becomes a path that matches nothing.
    fn from(value: &str) -> Self {
        value
            .parse()
            .unwrap_or_else(|_| FieldPath::from_name(value))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PlaitError;

    fn try_from(value: String) -> PlaitResult<Self> {
        value.parse()
    }
}

impl From<FieldPath> for String {
    fn from(value: FieldPath) -> Self {
        value.to_string()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0.iter().format("."), f)
    }
}
