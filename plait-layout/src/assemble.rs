use itertools::Itertools;
use plait_error::{PlaitResult, plait_bail, plait_err};
use plait_scalar::{Record, Value};
use plait_schema::{ColumnDescriptor, GroupFields, NodeKind, Repetition, Schema, SchemaNode};

use crate::{ColumnReader, Levels};

/// Reconstructs records from the column readers of a schema's leaves.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    schema: Schema,
    columns: Vec<ColumnDescriptor>,
}

impl RecordAssembler {
    /// `schema` may be a projection of the schema the columns were written with.
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

    /// Assemble the next record, given one reader per leaf in schema leaf order.
    ///
    /// Returns `Ok(None)` once every reader is exhausted.
    pub fn assemble<R: ColumnReader>(&self, readers: &mut [R]) -> PlaitResult<Option<Record>> {
        if readers.len() != self.columns.len() {
            plait_bail!(
                "expected {} column readers, got {}",
                self.columns.len(),
                readers.len()
            )
        }
        if !at_record_start(readers)? {
            return Ok(None);
        }
        read_fields(self.schema.fields(), readers, 0, 0).map(Some)
    }
}

/// Check that every reader is positioned at the start of a record. Returns false if all of them
/// are exhausted.
pub fn at_record_start<R: ColumnReader>(readers: &mut [R]) -> PlaitResult<bool> {
    let mut exhausted = Vec::new();
    let mut live = 0;
    for reader in readers.iter_mut() {
        match reader.peek()? {
            None => exhausted.push(reader.column().path().clone()),
            Some(levels) if !levels.starts_record() => plait_bail!(
                ColumnDesync: "column {} is not at a record boundary (r={})",
                reader.column().path(),
                levels.rep
            ),
            Some(_) => live += 1,
        }
    }
    match (live, exhausted.len()) {
        (0, _) => Ok(false),
        (_, 0) => Ok(true),
        (_, _) => plait_bail!(
            ColumnDesync: "columns {} ended while {live} other columns have more records",
            exhausted.iter().join(", ")
        ),
    }
}

/// Read the children of a present group whose definition level is `def` and whose repeated
/// depth is `depth`.
fn read_fields<R: ColumnReader>(
    fields: &GroupFields,
    readers: &mut [R],
    def: u16,
    depth: u16,
) -> PlaitResult<Record> {
    let mut record = Record::with_capacity(fields.len());
    let mut offset = 0;
    for field in fields.iter() {
        let end = offset + field.leaf_count();
        let value = read_node(field, &mut readers[offset..end], def, depth)?;
        record.insert(field.name().clone(), value);
        offset = end;
    }
    Ok(record)
}

fn read_node<R: ColumnReader>(
    node: &SchemaNode,
    readers: &mut [R],
    def: u16,
    depth: u16,
) -> PlaitResult<Value> {
    match node.repetition() {
        Repetition::Required => read_present(node, readers, def, depth),
        Repetition::Optional => {
            if first_levels(readers)?.def > def {
                read_present(node, readers, def + 1, depth)
            } else {
                read_absent(readers, def)?;
                Ok(Value::Null)
            }
        }
        Repetition::Repeated => {
            let mut elements = Vec::new();
            if first_levels(readers)?.def <= def {
                read_absent(readers, def)?;
                return Ok(Value::List(elements));
            }
            let rep = depth + 1;
            loop {
                elements.push(read_present(node, readers, def + 1, rep)?);
                if !continues(readers, rep)? {
                    break;
                }
            }
            Ok(Value::List(elements))
        }
    }
}

fn read_present<R: ColumnReader>(
    node: &SchemaNode,
    readers: &mut [R],
    def: u16,
    depth: u16,
) -> PlaitResult<Value> {
    match node.kind() {
        NodeKind::Group(fields) => read_fields(fields, readers, def, depth).map(Value::Record),
        NodeKind::Primitive(_) => {
            let reader = &mut readers[0];
            let triple = reader.next_triple()?.ok_or_else(|| {
                plait_err!(ColumnDesync: "column {} ended inside a record", reader.column().path())
            })?;
            if triple.def != def || triple.value.is_null() {
                plait_bail!(
                    ColumnDesync: "column {} expected a value at d={def}, found {triple}",
                    reader.column().path()
                )
            }
            Ok(triple.value)
        }
    }
}

/// Consume the placeholder every leaf below an absent node carries.
fn read_absent<R: ColumnReader>(readers: &mut [R], def: u16) -> PlaitResult<()> {
    for reader in readers.iter_mut() {
        let triple = reader.next_triple()?.ok_or_else(|| {
            plait_err!(ColumnDesync: "column {} ended inside a record", reader.column().path())
        })?;
        if triple.def != def {
            plait_bail!(
                ColumnDesync: "column {} expected a placeholder at d={def}, found {triple}",
                reader.column().path()
            )
        }
    }
    Ok(())
}

fn first_levels<R: ColumnReader>(readers: &mut [R]) -> PlaitResult<Levels> {
    let Some(reader) = readers.first_mut() else {
        plait_bail!(Schema: "group without leaves")
    };
    reader.peek()?.ok_or_else(|| {
        plait_err!(ColumnDesync: "column {} ended inside a record", reader.column().path())
    })
}

/// True if every reader continues the list at repetition level `rep`. The readers must agree.
fn continues<R: ColumnReader>(readers: &mut [R], rep: u16) -> PlaitResult<bool> {
    let mut verdict = None;
    for reader in readers.iter_mut() {
        let next = reader.peek()?.is_some_and(|l| l.rep == rep);
        match verdict {
            None => verdict = Some(next),
            Some(v) if v != next => plait_bail!(
                ColumnDesync: "column {} disagrees on the length of a list at r={rep}",
                reader.column().path()
            ),
            Some(_) => {}
        }
    }
    Ok(verdict.unwrap_or(false))
}
