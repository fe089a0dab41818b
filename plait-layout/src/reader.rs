use bytes::Bytes;
use plait_error::{PlaitResult, plait_bail, plait_err};
use plait_schema::ColumnDescriptor;

use crate::codec::{LEVELS_SIZE, decode_levels, decode_value, value_size};
use crate::{Levels, Triple};

/// A single-pass, lazily decoded stream of the triples of one column.
pub trait ColumnReader: Send {
    fn column(&self) -> &ColumnDescriptor;

    /// The levels of the next triple, without consuming it or decoding its value.
    fn peek(&mut self) -> PlaitResult<Option<Levels>>;

    /// Consume and decode the next triple.
    fn next_triple(&mut self) -> PlaitResult<Option<Triple>>;

    /// Advance past the whole next record without decoding its values, returning the number of
    /// triples skipped.
    ///
    /// The reader must be positioned at a record boundary.
    fn skip_record(&mut self) -> PlaitResult<usize>;
}

impl<R: ColumnReader + ?Sized> ColumnReader for Box<R> {
    fn column(&self) -> &ColumnDescriptor {
        (**self).column()
    }

    fn peek(&mut self) -> PlaitResult<Option<Levels>> {
        (**self).peek()
    }

    fn next_triple(&mut self) -> PlaitResult<Option<Triple>> {
        (**self).next_triple()
    }

    fn skip_record(&mut self) -> PlaitResult<usize> {
        (**self).skip_record()
    }
}

/// Reads the triples of an encoded [`crate::ColumnChunk`].
#[derive(Debug, Clone)]
pub struct ChunkReader {
    column: ColumnDescriptor,
    data: Bytes,
    pos: usize,
    remaining: u64,
    peeked: Option<Levels>,
}

impl ChunkReader {
    pub fn new(column: ColumnDescriptor, data: Bytes, num_values: u64) -> Self {
        Self {
            column,
            data,
            pos: 0,
            remaining: num_values,
            peeked: None,
        }
    }

    /// The number of triples not yet consumed.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn take_levels(&mut self) -> PlaitResult<Option<Levels>> {
        let levels = self.peek()?;
        if levels.is_some() {
            self.peeked = None;
            self.pos += LEVELS_SIZE;
            self.remaining -= 1;
        }
        Ok(levels)
    }

    fn check_trailing(&self) -> PlaitResult<()> {
        if self.pos != self.data.len() {
            plait_bail!(
                InvalidSerde: "column {} has {} trailing bytes",
                self.column.path(),
                self.data.len() - self.pos
            )
        }
        Ok(())
    }
}

impl ColumnReader for ChunkReader {
    fn column(&self) -> &ColumnDescriptor {
        &self.column
    }

    fn peek(&mut self) -> PlaitResult<Option<Levels>> {
        if self.peeked.is_none() {
            if self.remaining == 0 {
                self.check_trailing()?;
                return Ok(None);
            }
            let levels = decode_levels(&self.data, self.pos)?;
            if levels.def > self.column.max_def() || levels.rep > self.column.max_rep() {
                plait_bail!(
                    InvalidSerde: "levels (r={}, d={}) out of range for column {}",
                    levels.rep,
                    levels.def,
                    self.column
                )
            }
            self.peeked = Some(levels);
        }
        Ok(self.peeked)
    }

    fn next_triple(&mut self) -> PlaitResult<Option<Triple>> {
        let Some(levels) = self.take_levels()? else {
            return Ok(None);
        };
        if levels.def < self.column.max_def() {
            return Ok(Some(Triple::null(levels.rep, levels.def)));
        }
        let (value, size) = decode_value(&self.data, self.pos, self.column.ptype())?;
        self.pos += size;
        Ok(Some(Triple::new(levels.rep, levels.def, value)))
    }

    fn skip_record(&mut self) -> PlaitResult<usize> {
        let mut skipped = 0;
        loop {
            match self.peek()? {
                None if skipped == 0 => plait_bail!(
                    ColumnDesync: "column {} is exhausted, cannot skip a record",
                    self.column.path()
                ),
                None => break,
                Some(levels) if skipped == 0 && !levels.starts_record() => plait_bail!(
                    ColumnDesync: "column {} is not at a record boundary (r={})",
                    self.column.path(),
                    levels.rep
                ),
                Some(levels) if skipped > 0 && levels.starts_record() => break,
                Some(_) => {}
            }
            let levels = self
                .take_levels()?
                .ok_or_else(|| plait_err!(ColumnDesync: "column {} ended early", self.column.path()))?;
            if levels.def == self.column.max_def() {
                self.pos += value_size(&self.data, self.pos, self.column.ptype())?;
            }
            skipped += 1;
        }
        Ok(skipped)
    }
}
