use std::fmt::{Display, Formatter};
use std::sync::Arc;

use itertools::Itertools;
use plait_error::{PlaitError, PlaitResult, plait_bail};

use crate::{FieldName, PATH_SEPARATOR, PType, Repetition};

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SchemaNode {
    name: FieldName,
    repetition: Repetition,
    kind: NodeKind,
}

/// The shape of a [`SchemaNode`]: either a primitive leaf or a group of named children.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum NodeKind {
    /// A leaf holding values of the given type.
    Primitive(PType),
    /// An ordered list of uniquely named children.
    Group(GroupFields),
}

impl SchemaNode {
    /// Create a primitive leaf.
    pub fn primitive<N: Into<FieldName>>(name: N, repetition: Repetition, ptype: PType) -> Self {
        Self {
            name: name.into(),
            repetition,
            kind: NodeKind::Primitive(ptype),
        }
    }

    /// Create a group from its children, validating their names.
    pub fn group<N, I>(name: N, repetition: Repetition, fields: I) -> PlaitResult<Self>
    where
        N: Into<FieldName>,
        I: IntoIterator<Item = SchemaNode>,
    {
        Ok(Self::from_fields(
            name,
            repetition,
            GroupFields::try_new(fields.into_iter().collect())?,
        ))
    }

    /// Create a group from already validated children.
    pub fn from_fields<N: Into<FieldName>>(
        name: N,
        repetition: Repetition,
        fields: GroupFields,
    ) -> Self {
        Self {
            name: name.into(),
            repetition,
            kind: NodeKind::Group(fields),
        }
    }

    /// A required primitive leaf.
    pub fn required<N: Into<FieldName>>(name: N, ptype: PType) -> Self {
        Self::primitive(name, Repetition::Required, ptype)
    }

    /// An optional primitive leaf.
    pub fn optional<N: Into<FieldName>>(name: N, ptype: PType) -> Self {
        Self::primitive(name, Repetition::Optional, ptype)
    }

    /// A repeated primitive leaf.
    pub fn repeated<N: Into<FieldName>>(name: N, ptype: PType) -> Self {
        Self::primitive(name, Repetition::Repeated, ptype)
    }

    /// The name of this node within its parent.
    pub fn name(&self) -> &FieldName {
        &self.name
    }

    /// The repetition marker of this node.
    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// The shape of this node.
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Get the [`PType`] if this is a primitive leaf, otherwise `None`.
    pub fn as_primitive(&self) -> Option<PType> {
        match &self.kind {
            NodeKind::Primitive(ptype) => Some(*ptype),
            NodeKind::Group(_) => None,
        }
    }

    /// Get the children if this is a group, otherwise `None`.
    pub fn as_group(&self) -> Option<&GroupFields> {
        match &self.kind {
            NodeKind::Group(fields) => Some(fields),
            NodeKind::Primitive(_) => None,
        }
    }

    /// The number of primitive leaves at or below this node.
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Primitive(_) => 1,
            NodeKind::Group(fields) => fields.iter().map(SchemaNode::leaf_count).sum(),
        }
    }

    /// A copy of this group node with its children replaced.
    pub(crate) fn with_fields(&self, fields: GroupFields) -> Self {
        Self::from_fields(self.name.clone(), self.repetition, fields)
    }

    pub(crate) fn fmt_indented(&self, f: &mut Formatter<'_>, depth: usize) -> std::fmt::Result {
        let indent = "  ".repeat(depth);
        match &self.kind {
            NodeKind::Primitive(ptype) => {
                writeln!(f, "{indent}{} {} {};", self.repetition, ptype, self.name)
            }
            NodeKind::Group(fields) => {
                writeln!(f, "{indent}{} group {} {{", self.repetition, self.name)?;
                for field in fields.iter() {
                    field.fmt_indented(f, depth + 1)?;
                }
                writeln!(f, "{indent}}}")
            }
        }
    }
}

impl Display for SchemaNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_indented(f, 0)
    }
}

/// The ordered children of a group node. Names are unique, non-empty and free of the path
/// separator, and a group always has at least one child.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<SchemaNode>", into = "Vec<SchemaNode>")
)]
pub struct GroupFields(Arc<[SchemaNode]>);

impl GroupFields {
    /// Validate and wrap a list of children.
    pub fn try_new(fields: Vec<SchemaNode>) -> PlaitResult<Self> {
        if fields.is_empty() {
            plait_bail!(Schema: "a group must have at least one field")
        }
        for field in fields.iter() {
            if field.name().is_empty() {
                plait_bail!(Schema: "field names must not be empty")
            }
            if field.name().contains(PATH_SEPARATOR) {
                plait_bail!(Schema: "field name {:?} contains {PATH_SEPARATOR:?}", field.name())
            }
        }
        if let Some(dup) = fields.iter().map(SchemaNode::name).duplicates().next() {
            plait_bail!(Schema: "duplicate field name {dup} in group")
        }
        Ok(Self(fields.into()))
    }

    /// The number of children.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false: groups are never empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the children in declaration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &SchemaNode> + '_ {
        self.0.iter()
    }

    /// The names of the children in declaration order.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &FieldName> + '_ {
        self.0.iter().map(SchemaNode::name)
    }

    /// Find the index of a field by name.
    /// Returns `None` if the field is not found.
    pub fn find_name(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|n| n.name().as_ref() == name)
    }

    /// Get the child with the given name.
    pub fn field(&self, name: &str) -> Option<&SchemaNode> {
        self.find_name(name).map(|idx| &self.0[idx])
    }
}

impl TryFrom<Vec<SchemaNode>> for GroupFields {
    type Error = PlaitError;

    fn try_from(value: Vec<SchemaNode>) -> PlaitResult<Self> {
        Self::try_new(value)
    }
}

impl From<GroupFields> for Vec<SchemaNode> {
    fn from(value: GroupFields) -> Self {
        value.0.to_vec()
    }
}
