use bytes::{Bytes, BytesMut};
use plait_error::{PlaitResult, plait_bail};
use plait_schema::ColumnDescriptor;

use crate::codec::encode_triple;
use crate::{ChunkReader, Triple};

/// Accumulates the encoded triples of one column.
#[derive(Debug)]
pub struct ColumnWriter {
    column: ColumnDescriptor,
    buf: BytesMut,
    num_values: u64,
    num_records: u64,
}

impl ColumnWriter {
    pub fn new(column: ColumnDescriptor) -> Self {
        Self {
            column,
            buf: BytesMut::new(),
            num_values: 0,
            num_records: 0,
        }
    }

    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    /// Append a triple, checking its levels against the column.
    pub fn push(&mut self, triple: &Triple) -> PlaitResult<()> {
        if triple.def > self.column.max_def() || triple.rep > self.column.max_rep() {
            plait_bail!(
                "triple {triple} exceeds the levels of column {}",
                self.column
            )
        }
        if triple.def < self.column.max_def() && !triple.value.is_null() {
            plait_bail!("undefined triple {triple} in column {} carries a value", self.column)
        }
        if self.num_values == 0 && triple.rep != 0 {
            plait_bail!("column {} must start with a new record", self.column.path())
        }
        encode_triple(&mut self.buf, &self.column, triple)?;
        self.num_values += 1;
        if triple.rep == 0 {
            self.num_records += 1;
        }
        Ok(())
    }

    /// The number of bytes written so far.
    pub fn nbytes(&self) -> usize {
        self.buf.len()
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    pub fn finish(self) -> ColumnChunk {
        ColumnChunk {
            column: self.column,
            data: self.buf.freeze(),
            num_values: self.num_values,
            num_records: self.num_records,
        }
    }
}

/// The encoded triples of one column, in write order.
#[derive(Debug, Clone)]
pub struct ColumnChunk {
    column: ColumnDescriptor,
    data: Bytes,
    num_values: u64,
    num_records: u64,
}

impl ColumnChunk {
    /// Wrap encoded bytes read back from storage.
    pub fn new(column: ColumnDescriptor, data: Bytes, num_values: u64, num_records: u64) -> Self {
        Self {
            column,
            data,
            num_values,
            num_records,
        }
    }

    pub fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn num_values(&self) -> u64 {
        self.num_values
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// A fresh reader positioned at the first triple.
    pub fn reader(&self) -> ChunkReader {
        ChunkReader::new(self.column.clone(), self.data.clone(), self.num_values)
    }
}
