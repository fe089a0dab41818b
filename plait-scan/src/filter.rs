use itertools::Itertools;
use plait_error::{PlaitResult, plait_bail, plait_err};
use plait_expr::{ColumnPredicate, Predicate};
use plait_layout::{BufferedColumnReader, ColumnReader};
use plait_scalar::Value;
use plait_schema::ColumnDescriptor;

/// A predicate whose column references have been resolved to reader positions.
#[derive(Debug, Clone)]
pub struct BoundFilter {
    predicate: Predicate,
    tree: Bound,
    references: Vec<usize>,
    num_columns: usize,
    next_record: u64,
}

#[derive(Debug, Clone)]
enum Bound {
    Column {
        index: usize,
        max_def: u16,
        predicate: ColumnPredicate,
    },
    And(Box<Bound>, Box<Bound>),
    Or(Box<Bound>, Box<Bound>),
    Not(Box<Bound>),
}

impl BoundFilter {
    /// Resolve every column the predicate tests against `columns`, the columns a scan reads in
    /// reader order.
    pub fn bind(predicate: &Predicate, columns: &[ColumnDescriptor]) -> PlaitResult<Self> {
        let tree = bind_node(predicate, columns)?;
        let references = predicate
            .references()
            .into_iter()
            .filter_map(|path| columns.iter().position(|c| c.path() == path))
            .collect::<Vec<_>>();
        log::debug!(
            "Bound filter {} to columns [{}]",
            predicate,
            references.iter().map(|&i| columns[i].path()).join(", ")
        );
        Ok(Self {
            predicate: predicate.clone(),
            tree,
            references,
            num_columns: columns.len(),
            next_record: 0,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Positions of the distinct columns the predicate tests.
    pub fn references(&self) -> &[usize] {
        &self.references
    }

    /// Decide whether the record at `record_index` passes.
    ///
    /// Only the columns actually needed to reach a verdict are loaded; an `and` whose left side
    /// fails never touches the columns of its right side. Loaded records stay buffered in their
    /// reader, so the caller decides whether to drain them or skip them. Records must be offered
    /// in order, starting from zero.
    pub fn accept<R: ColumnReader>(
        &mut self,
        columns: &mut [BufferedColumnReader<R>],
        record_index: u64,
    ) -> PlaitResult<bool> {
        if columns.len() != self.num_columns {
            plait_bail!(
                "filter was bound to {} columns but got {}",
                self.num_columns,
                columns.len()
            )
        }
        if record_index != self.next_record {
            plait_bail!(
                "records must be filtered in order, expected record {} but got {record_index}",
                self.next_record
            )
        }
        self.next_record += 1;
        evaluate(&self.tree, columns)
    }
}

fn bind_node(predicate: &Predicate, columns: &[ColumnDescriptor]) -> PlaitResult<Bound> {
    Ok(match predicate {
        Predicate::Column(path, predicate) => {
            let (index, column) = columns
                .iter()
                .find_position(|c| c.path() == path)
                .ok_or_else(|| {
                    plait_err!(
                        UnknownColumn: "{path}, available columns are [{}]",
                        columns.iter().map(ColumnDescriptor::path).join(", ")
                    )
                })?;
            Bound::Column {
                index,
                max_def: column.max_def(),
                predicate: predicate.clone(),
            }
        }
        Predicate::And(lhs, rhs) => Bound::And(
            Box::new(bind_node(lhs, columns)?),
            Box::new(bind_node(rhs, columns)?),
        ),
        Predicate::Or(lhs, rhs) => Bound::Or(
            Box::new(bind_node(lhs, columns)?),
            Box::new(bind_node(rhs, columns)?),
        ),
        Predicate::Not(child) => Bound::Not(Box::new(bind_node(child, columns)?)),
    })
}

fn evaluate<R: ColumnReader>(
    node: &Bound,
    columns: &mut [BufferedColumnReader<R>],
) -> PlaitResult<bool> {
    Ok(match node {
        Bound::Column {
            index,
            max_def,
            predicate,
        } => {
            let mut present = columns[*index]
                .load_record()?
                .iter()
                .filter(|t| t.def == *max_def)
                .peekable();
            if present.peek().is_none() {
                predicate.evaluate(&Value::Null)
            } else {
                present.any(|t| predicate.evaluate(&t.value))
            }
        }
        Bound::And(lhs, rhs) => evaluate(lhs, columns)? && evaluate(rhs, columns)?,
        Bound::Or(lhs, rhs) => evaluate(lhs, columns)? || evaluate(rhs, columns)?,
        Bound::Not(child) => !evaluate(child, columns)?,
    })
}
