use std::fmt::{Display, Formatter};

use itertools::Itertools;
use plait_error::{PlaitError, PlaitResult, plait_bail};

use crate::{
    ColumnDescriptor, FieldName, FieldPath, GroupFields, NodeKind, Projection, Repetition,
    SchemaNode, leaves,
};

/// The schema of a record: a tree of [`SchemaNode`]s whose root is a required group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "SchemaNode", into = "SchemaNode"))]
pub struct Schema {
    root: SchemaNode,
}

impl Schema {
    /// Create a schema named `name` with the given top-level fields.
    pub fn try_new<N, I>(name: N, fields: I) -> PlaitResult<Self>
    where
        N: Into<FieldName>,
        I: IntoIterator<Item = SchemaNode>,
    {
        Self::try_from_root(SchemaNode::group(name, Repetition::Required, fields)?)
    }

    /// Wrap a root node, which must be a required group.
    pub fn try_from_root(root: SchemaNode) -> PlaitResult<Self> {
        if root.repetition() != Repetition::Required {
            plait_bail!(Schema: "record root {} must be required, found {}", root.name(), root.repetition())
        }
        if root.as_group().is_none() {
            plait_bail!(Schema: "record root {} must be a group", root.name())
        }
        Ok(Self { root })
    }

    /// The name of the record type.
    pub fn name(&self) -> &FieldName {
        self.root.name()
    }

    /// The root group node.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    /// The top-level fields.
    pub fn fields(&self) -> &GroupFields {
        match self.root.kind() {
            NodeKind::Group(fields) => fields,
            NodeKind::Primitive(_) => unreachable!("schema root is always a group"),
        }
    }

    /// The leaf columns of this schema, see [`leaves`].
    pub fn leaves(&self) -> Vec<ColumnDescriptor> {
        leaves(self)
    }

    /// The descriptor of the leaf column at `path`, if there is one.
    pub fn column(&self, path: &FieldPath) -> Option<ColumnDescriptor> {
        self.leaves().into_iter().find(|c| c.path() == path)
    }

    /// Find the node at `path`. The root path yields the root node.
    pub fn find(&self, path: &FieldPath) -> Option<&SchemaNode> {
        path.parts()
            .iter()
            .try_fold(&self.root, |node, name| node.as_group()?.field(name))
    }

    /// Keep only the fields named by `keep`, see [`Projection`].
    pub fn project(&self, keep: &[FieldPath]) -> PlaitResult<Schema> {
        Projection::new(keep.iter().cloned()).apply(self)
    }

    /// Project onto the fields of a requested (sub-)schema.
    ///
    /// Every leaf of `requested` must exist in this schema with the same type and the same
    /// definition and repetition depth.
    pub fn project_to(&self, requested: &Schema) -> PlaitResult<Schema> {
        let projected = Projection::from_schema(requested).apply(self)?;
        let available = projected.leaves();
        for wanted in requested.leaves() {
            let Some(found) = available.iter().find(|c| c.path() == wanted.path()) else {
                plait_bail!(Schema: "requested column {} not found", wanted.path())
            };
            if found != &wanted {
                plait_bail!(Schema: "requested column {wanted} does not match file column {found}")
            }
        }
        Ok(projected)
    }
}

impl TryFrom<SchemaNode> for Schema {
    type Error = PlaitError;

    fn try_from(value: SchemaNode) -> PlaitResult<Self> {
        Self::try_from_root(value)
    }
}

impl From<Schema> for SchemaNode {
    fn from(value: Schema) -> Self {
        value.root
    }
}

/// Renders a schema in the familiar `message` notation.
impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "message {} {{", self.name())?;
        for field in self.fields().iter() {
            field.fmt_indented(f, 1)?;
        }
        write!(f, "}}")
    }
}

/// A short single-line summary of a schema's columns, used in log messages.
pub fn column_summary(schema: &Schema) -> String {
    schema.leaves().iter().map(|c| c.path().to_string()).join(", ")
}
