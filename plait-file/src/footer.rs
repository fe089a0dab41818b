use std::ops::Range;

use plait_error::{PlaitResult, plait_bail};
use plait_schema::{ColumnDescriptor, FieldPath, Schema};
use serde::{Deserialize, Serialize};

use crate::{MAGIC_BYTES, VERSION};

/// The metadata at the end of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footer {
    version: u16,
    schema: Schema,
    num_records: u64,
    columns: Vec<ColumnMeta>,
}

/// Where one column's triples live in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    path: FieldPath,
    offset: u64,
    length: u64,
    num_values: u64,
}

impl ColumnMeta {
    pub fn new(path: FieldPath, offset: u64, length: u64, num_values: u64) -> Self {
        Self {
            path,
            offset,
            length,
            num_values,
        }
    }

    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    /// The number of triples in the region.
    pub fn num_values(&self) -> u64 {
        self.num_values
    }

    pub fn byte_range(&self) -> Range<u64> {
        self.offset..self.offset + self.length
    }
}

impl Footer {
    pub fn new(schema: Schema, num_records: u64, columns: Vec<ColumnMeta>) -> Self {
        Self {
            version: VERSION,
            schema,
            num_records,
            columns,
        }
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// One entry per leaf of the schema, in leaf order.
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Check the footer against the schema it carries and the bytes that precede it.
    ///
    /// Every leaf must have exactly one region, and regions must lie between the leading magic
    /// bytes and `data_end` without overlapping.
    pub(crate) fn validate(&self, data_end: u64) -> PlaitResult<Vec<ColumnDescriptor>> {
        if self.version != VERSION {
            plait_bail!(
                InvalidSerde: "footer has version {}, expected {VERSION}",
                self.version
            )
        }
        let leaves = self.schema.leaves();
        if leaves.len() != self.columns.len() {
            plait_bail!(
                InvalidSerde: "schema {} has {} columns but the footer describes {}",
                self.schema.name(),
                leaves.len(),
                self.columns.len()
            )
        }

        let mut previous_end = MAGIC_BYTES.len() as u64;
        for (leaf, meta) in leaves.iter().zip(self.columns.iter()) {
            if leaf.path() != meta.path() {
                plait_bail!(
                    InvalidSerde: "footer column {} does not match schema column {}",
                    meta.path(),
                    leaf.path()
                )
            }
            let Some(end) = meta.offset.checked_add(meta.length) else {
                plait_bail!(InvalidSerde: "column {} region overflows", meta.path())
            };
            if meta.offset < previous_end || end > data_end {
                plait_bail!(
                    InvalidSerde: "column {} region {}..{end} is outside the data section {previous_end}..{data_end}",
                    meta.path(),
                    meta.offset
                )
            }
            previous_end = end;
        }
        Ok(leaves)
    }
}
