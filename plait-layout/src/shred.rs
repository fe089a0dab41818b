use plait_error::{PlaitResult, plait_bail};
use plait_scalar::{Record, Value};
use plait_schema::{
    ColumnDescriptor, FieldPath, GroupFields, NodeKind, Repetition, Schema, SchemaNode,
};

use crate::{ColumnWriter, Triple};

/// Shreds records into per-column triples.
///
/// The writers passed to [`RecordShredder::shred`] must be in the leaf order of the schema, as
/// returned by [`RecordShredder::columns`].
#[derive(Debug, Clone)]
pub struct RecordShredder {
    schema: Schema,
    columns: Vec<ColumnDescriptor>,
}

impl RecordShredder {
    pub fn new(schema: Schema) -> Self {
        let columns = schema.leaves();
        Self { schema, columns }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// One empty writer per leaf column.
    pub fn writers(&self) -> Vec<ColumnWriter> {
        self.columns.iter().cloned().map(ColumnWriter::new).collect()
    }

    /// Shred `record` into the triples of each leaf column, without writing them anywhere.
    pub fn stage(&self, record: &Record) -> PlaitResult<Vec<Vec<Triple>>> {
        let mut staged = vec![Vec::new(); self.columns.len()];
        let mut path = FieldPath::root();
        let mut shred = Shred {
            staged: &mut staged,
            path: &mut path,
        };
        shred.present_fields(self.schema.fields(), record, 0, 0, 0, 0)?;
        Ok(staged)
    }

    /// Shred `record` and append its triples to `writers`.
    ///
    /// Nothing is written unless the whole record conforms to the schema.
    pub fn shred(&self, record: &Record, writers: &mut [ColumnWriter]) -> PlaitResult<()> {
        if writers.len() != self.columns.len()
            || writers
                .iter()
                .zip(self.columns.iter())
                .any(|(w, c)| w.column() != c)
        {
            plait_bail!(
                "expected {} writers in schema leaf order, got {}",
                self.columns.len(),
                writers.len()
            )
        }
        let staged = self.stage(record)?;
        for (writer, triples) in writers.iter_mut().zip(staged) {
            for triple in triples.iter() {
                writer.push(triple)?;
            }
        }
        Ok(())
    }
}

struct Shred<'a> {
    staged: &'a mut [Vec<Triple>],
    path: &'a mut FieldPath,
}

impl Shred<'_> {
    /// Write the children of a present group. `leaf` is the index of the group's first leaf.
    fn present_fields(
        &mut self,
        fields: &GroupFields,
        record: &Record,
        leaf: usize,
        rep: u16,
        def: u16,
        depth: u16,
    ) -> PlaitResult<()> {
        if let Some(unknown) = record.names().find(|name| fields.find_name(name).is_none()) {
            plait_bail!(
                SchemaMismatch: "record field {} is not in the schema",
                self.path.join(unknown.clone())
            )
        }
        let mut leaf = leaf;
        for field in fields.iter() {
            self.path.push(field.name().clone());
            match record.get(field.name()) {
                Some(value) => self.node(field, value, leaf, rep, def, depth)?,
                None if field.repetition().is_definable() => self.absent(field, leaf, rep, def),
                None => plait_bail!(SchemaMismatch: "required field {} is missing", self.path),
            }
            self.path.pop();
            leaf += field.leaf_count();
        }
        Ok(())
    }

    /// Write one field. `rep` is the repetition level of the first triple written for each leaf,
    /// `def` and `depth` are the definition level and repeated depth of the enclosing group.
    fn node(
        &mut self,
        node: &SchemaNode,
        value: &Value,
        leaf: usize,
        rep: u16,
        def: u16,
        depth: u16,
    ) -> PlaitResult<()> {
        match node.repetition() {
            Repetition::Required => {
                if value.is_null() {
                    plait_bail!(SchemaMismatch: "required field {} is missing", self.path)
                }
                self.present(node, value, leaf, rep, def, depth)
            }
            Repetition::Optional => {
                if value.is_null() {
                    self.absent(node, leaf, rep, def);
                    Ok(())
                } else {
                    self.present(node, value, leaf, rep, def + 1, depth)
                }
            }
            Repetition::Repeated => {
                let elements = match value {
                    Value::List(elements) => elements.as_slice(),
                    other => plait_bail!(
                        SchemaMismatch: "repeated field {} expects a list, found {}",
                        self.path,
                        other.type_name()
                    ),
                };
                if elements.is_empty() {
                    self.absent(node, leaf, rep, def);
                    return Ok(());
                }
                for (i, element) in elements.iter().enumerate() {
                    if element.is_null() {
                        plait_bail!(SchemaMismatch: "repeated field {} has a null element at {i}", self.path)
                    }
                    let rep = if i == 0 { rep } else { depth + 1 };
                    self.present(node, element, leaf, rep, def + 1, depth + 1)?;
                }
                Ok(())
            }
        }
    }

    fn present(
        &mut self,
        node: &SchemaNode,
        value: &Value,
        leaf: usize,
        rep: u16,
        def: u16,
        depth: u16,
    ) -> PlaitResult<()> {
        match node.kind() {
            NodeKind::Primitive(ptype) => {
                if value.ptype() != Some(*ptype) {
                    plait_bail!(
                        SchemaMismatch: "field {} expects {ptype}, found {}",
                        self.path,
                        value.type_name()
                    )
                }
                self.staged[leaf].push(Triple::new(rep, def, value.clone()));
                Ok(())
            }
            NodeKind::Group(fields) => match value {
                Value::Record(record) => self.present_fields(fields, record, leaf, rep, def, depth),
                other => plait_bail!(
                    SchemaMismatch: "group {} expects a record, found {}",
                    self.path,
                    other.type_name()
                ),
            },
        }
    }

    /// A placeholder in every leaf below an absent or empty node.
    fn absent(&mut self, node: &SchemaNode, leaf: usize, rep: u16, def: u16) {
        for column in &mut self.staged[leaf..leaf + node.leaf_count()] {
            column.push(Triple::null(rep, def));
        }
    }
}
