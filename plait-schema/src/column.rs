//! The flattened, per-leaf view of a schema.

use std::fmt::{Display, Formatter};

use crate::{FieldPath, GroupFields, NodeKind, PType, Repetition, Schema};

/// Describes one leaf column of a schema: its path, type, and the maximum definition and
/// repetition levels a value occurrence in that column can have.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnDescriptor {
    path: FieldPath,
    ptype: PType,
    repetition: Repetition,
    max_def: u16,
    max_rep: u16,
}

impl ColumnDescriptor {
    /// Create a descriptor. Normally obtained from [`leaves`] instead.
    pub fn new(
        path: FieldPath,
        ptype: PType,
        repetition: Repetition,
        max_def: u16,
        max_rep: u16,
    ) -> Self {
        Self {
            path,
            ptype,
            repetition,
            max_def,
            max_rep,
        }
    }

    /// The path from the record root to this leaf.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    /// The type of the values in this column.
    pub fn ptype(&self) -> PType {
        self.ptype
    }

    /// The repetition marker of the leaf node itself.
    pub fn repetition(&self) -> Repetition {
        self.repetition
    }

    /// The number of optional or repeated nodes on the path, i.e. the definition level of a
    /// present value.
    pub fn max_def(&self) -> u16 {
        self.max_def
    }

    /// The number of repeated nodes on the path.
    pub fn max_rep(&self) -> u16 {
        self.max_rep
    }
}

impl Display for ColumnDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} (d={}, r={})",
            self.path, self.ptype, self.max_def, self.max_rep
        )
    }
}

/// Resolve the leaf columns of `schema`, depth-first and left-to-right.
///
/// Two schemas with the same structure always resolve to the same sequence, which is what lets
/// the writer and the reader agree on column order without any extra bookkeeping.
pub fn leaves(schema: &Schema) -> Vec<ColumnDescriptor> {
    let mut columns = Vec::with_capacity(schema.root().leaf_count());
    let mut path = FieldPath::root();
    collect_leaves(schema.fields(), &mut path, 0, 0, &mut columns);
    columns
}

fn collect_leaves(
    fields: &GroupFields,
    path: &mut FieldPath,
    def: u16,
    rep: u16,
    columns: &mut Vec<ColumnDescriptor>,
) {
    for field in fields.iter() {
        let (def_inc, rep_inc) = field.repetition().level_increments();
        let (def, rep) = (def + def_inc, rep + rep_inc);
        path.push(field.name().clone());
        match field.kind() {
            NodeKind::Primitive(ptype) => columns.push(ColumnDescriptor::new(
                path.clone(),
                *ptype,
                field.repetition(),
                def,
                rep,
            )),
            NodeKind::Group(children) => collect_leaves(children, path, def, rep, columns),
        }
        path.pop();
    }
}
