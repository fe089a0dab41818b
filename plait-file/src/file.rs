use plait_error::{ContextExt, PlaitResult, plait_err};
use plait_io::ReadAt;
use plait_layout::{ChunkReader, ColumnChunk};
use plait_scalar::Record;
use plait_scan::{RecordScan, ScanBuilder};
use plait_schema::{ColumnDescriptor, Schema};

use crate::Footer;

/// An open Plait file.
///
/// Column regions are only read when a scan or [`PlaitFile::column_chunk`] asks for them.
#[derive(Debug, Clone)]
pub struct PlaitFile<R> {
    read: R,
    footer: Footer,
    footer_len: u32,
    columns: Vec<ColumnDescriptor>,
}

impl<R: ReadAt> PlaitFile<R> {
    pub(crate) fn new(
        read: R,
        footer: Footer,
        footer_len: u32,
        columns: Vec<ColumnDescriptor>,
    ) -> Self {
        Self {
            read,
            footer,
            footer_len,
            columns,
        }
    }

    pub fn schema(&self) -> &Schema {
        self.footer.schema()
    }

    pub fn num_records(&self) -> u64 {
        self.footer.num_records()
    }

    pub fn footer(&self) -> &Footer {
        &self.footer
    }

    /// The serialized length of the footer, needed to reopen the file with a cached footer.
    pub fn footer_len(&self) -> u32 {
        self.footer_len
    }

    /// The leaf columns of the file, in storage order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Read the region of the leaf column at `index`.
    pub fn column_chunk(&self, index: usize) -> PlaitResult<ColumnChunk> {
        let (column, meta) = self
            .columns
            .get(index)
            .zip(self.footer.columns().get(index))
            .ok_or_else(|| {
                plait_err!(
                    "column index {index} out of bounds for {} columns",
                    self.columns.len()
                )
            })?;
        let data = self
            .read
            .read_byte_range(meta.byte_range())
            .map_err(|e| plait_err!(IOError: e))
            .with_context(|| format!("reading column {column}"))?;
        log::trace!("Read {} bytes of column {column}", data.len());
        Ok(ColumnChunk::new(
            column.clone(),
            data,
            meta.num_values(),
            self.footer.num_records(),
        ))
    }

    /// Start configuring a scan of this file.
    pub fn scan_builder(&self) -> ScanBuilder {
        ScanBuilder::new(self.schema().clone())
    }

    /// Run a scan configured by `builder`, reading only the columns it plans to use.
    pub fn scan(&self, builder: ScanBuilder) -> PlaitResult<RecordScan<ChunkReader>> {
        if builder.schema() != self.schema() {
            return Err(plait_err!(
                Schema: "scan was configured for {} but the file holds {}",
                builder.schema().name(),
                self.schema().name()
            ));
        }
        builder.build(|source, _| self.column_chunk(source).map(|chunk| chunk.reader()))
    }

    /// Read every record of the file.
    pub fn read_all(&self) -> PlaitResult<Vec<Record>> {
        self.scan(self.scan_builder())?.matching().collect()
    }
}
