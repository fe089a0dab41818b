use std::io::Write;

use plait_error::{PlaitResult, plait_bail};
use plait_layout::{ColumnChunk, ColumnWriter, RecordShredder};
use plait_scalar::Record;
use plait_schema::Schema;

use crate::{ColumnMeta, EOF_SIZE, Footer, MAGIC_BYTES, MAX_FOOTER_SIZE, VERSION};

/// Options for writing a Plait file.
#[derive(Debug, Clone)]
pub struct PlaitWriteOptions {
    schema: Schema,
}

impl PlaitWriteOptions {
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Start a file on `write`. Nothing is written until [`PlaitFileWriter::finish`].
    pub fn open<W: Write>(self, write: W) -> PlaitFileWriter<W> {
        let shredder = RecordShredder::new(self.schema);
        let writers = shredder.writers();
        PlaitFileWriter {
            write,
            shredder,
            writers,
            num_records: 0,
        }
    }

    /// Write all of `records` as one file.
    pub fn write<W, I>(self, write: W, records: I) -> PlaitResult<W>
    where
        W: Write,
        I: IntoIterator<Item = Record>,
    {
        let mut writer = self.open(write);
        for record in records {
            writer.write_record(&record)?;
        }
        writer.finish()
    }
}

/// Shreds records into per-column buffers and lays them out when finished.
pub struct PlaitFileWriter<W> {
    write: W,
    shredder: RecordShredder,
    writers: Vec<ColumnWriter>,
    num_records: u64,
}

impl<W: Write> PlaitFileWriter<W> {
    pub fn schema(&self) -> &Schema {
        self.shredder.schema()
    }

    pub fn num_records(&self) -> u64 {
        self.num_records
    }

    /// Shred one record into the column buffers.
    ///
    /// A record that does not match the schema is rejected without touching any column, so the
    /// writer stays usable.
    pub fn write_record(&mut self, record: &Record) -> PlaitResult<()> {
        self.shredder.shred(record, &mut self.writers)?;
        self.num_records += 1;
        Ok(())
    }

    /// Write the file and hand back the underlying writer.
    pub fn finish(self) -> PlaitResult<W> {
        let Self {
            mut write,
            shredder,
            writers,
            num_records,
        } = self;

        // First we write the magic number
        write.write_all(&MAGIC_BYTES)?;
        let mut position = MAGIC_BYTES.len() as u64;

        // Then one region per column
        let mut columns = Vec::with_capacity(writers.len());
        for chunk in writers.into_iter().map(ColumnWriter::finish) {
            columns.push(write_chunk(&mut write, &chunk, position)?);
            position += chunk.data().len() as u64;
        }

        let schema = shredder.schema().clone();
        let footer = serde_json::to_vec(&Footer::new(schema, num_records, columns))?;
        let Some(footer_len) = u32::try_from(footer.len())
            .ok()
            .filter(|len| *len <= MAX_FOOTER_SIZE)
        else {
            plait_bail!(
                "Footer is too large ({} bytes); max footer size is {MAX_FOOTER_SIZE}",
                footer.len()
            )
        };
        write.write_all(&footer)?;

        // And finally, the EOF marker
        let mut eof = [0u8; EOF_SIZE];
        eof[0..2].copy_from_slice(&VERSION.to_le_bytes());
        eof[2..6].copy_from_slice(&footer_len.to_le_bytes());
        eof[6..10].copy_from_slice(&MAGIC_BYTES);
        write.write_all(&eof)?;
        write.flush()?;

        log::debug!(
            "Wrote {num_records} records of {} in {} data bytes and a {footer_len} byte footer",
            shredder.schema().name(),
            position - MAGIC_BYTES.len() as u64
        );
        Ok(write)
    }
}

fn write_chunk<W: Write>(write: &mut W, chunk: &ColumnChunk, offset: u64) -> PlaitResult<ColumnMeta> {
    write.write_all(chunk.data())?;
    log::trace!(
        "Column {} at {offset}: {} triples in {} bytes",
        chunk.column(),
        chunk.num_values(),
        chunk.data().len()
    );
    Ok(ColumnMeta::new(
        chunk.column().path().clone(),
        offset,
        chunk.data().len() as u64,
        chunk.num_values(),
    ))
}
