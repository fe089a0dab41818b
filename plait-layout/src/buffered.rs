use std::collections::VecDeque;

use plait_error::{PlaitResult, plait_bail};
use plait_schema::ColumnDescriptor;

use crate::{ColumnReader, Levels, Triple};

/// A [`ColumnReader`] that can load the triples of its next record up front.
///
/// A filter loads the records of the columns it evaluates; whoever reads the column next drains
/// the loaded triples before the reader continues with the underlying stream. Skipping a loaded
/// record just drops the buffer.
#[derive(Debug, Clone)]
pub struct BufferedColumnReader<R> {
    inner: R,
    buffer: VecDeque<Triple>,
}

impl<R: ColumnReader> BufferedColumnReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buffer: VecDeque::new(),
        }
    }

    /// True if the next record has been loaded and not yet consumed.
    pub fn is_loaded(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Load the next record if it is not loaded already, returning its triples.
    pub fn load_record(&mut self) -> PlaitResult<&VecDeque<Triple>> {
        if self.buffer.is_empty() {
            match self.inner.next_triple()? {
                None => plait_bail!(
                    ColumnDesync: "column {} is exhausted, cannot load a record",
                    self.inner.column().path()
                ),
                Some(first) if first.rep != 0 => plait_bail!(
                    ColumnDesync: "column {} is not at a record boundary (r={})",
                    self.inner.column().path(),
                    first.rep
                ),
                Some(first) => self.buffer.push_back(first),
            }
            while self.inner.peek()?.is_some_and(|l| !l.starts_record()) {
                if let Some(triple) = self.inner.next_triple()? {
                    self.buffer.push_back(triple);
                }
            }
        }
        Ok(&self.buffer)
    }
}

impl<R: ColumnReader> ColumnReader for BufferedColumnReader<R> {
    fn column(&self) -> &ColumnDescriptor {
        self.inner.column()
    }

    fn peek(&mut self) -> PlaitResult<Option<Levels>> {
        match self.buffer.front() {
            Some(triple) => Ok(Some(triple.levels())),
            None => self.inner.peek(),
        }
    }

    fn next_triple(&mut self) -> PlaitResult<Option<Triple>> {
        match self.buffer.pop_front() {
            Some(triple) => Ok(Some(triple)),
            None => self.inner.next_triple(),
        }
    }

    fn skip_record(&mut self) -> PlaitResult<usize> {
        if self.buffer.is_empty() {
            return self.inner.skip_record();
        }
        if !self.buffer.front().is_some_and(|t| t.levels().starts_record()) {
            plait_bail!(
                ColumnDesync: "column {} is not at a record boundary",
                self.inner.column().path()
            )
        }
        let skipped = self.buffer.len();
        self.buffer.clear();
        Ok(skipped)
    }
}
