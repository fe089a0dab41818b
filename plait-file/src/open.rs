use plait_error::{PlaitResult, plait_bail, plait_err};
use plait_io::ReadAt;

use crate::{EOF_SIZE, Footer, MAGIC_BYTES, MAX_FOOTER_SIZE, PlaitFile, VERSION};

/// Open options for a Plait file reader.
#[derive(Debug, Clone)]
pub struct PlaitOpenOptions<R> {
    /// The underlying file reader.
    read: R,
    /// An optional, externally provided, file size.
    file_size: Option<u64>,
    /// An optional, externally provided, footer and its serialized length.
    footer: Option<(Footer, u32)>,
}

impl<R: ReadAt> PlaitOpenOptions<R> {
    pub fn new(read: R) -> Self {
        Self {
            read,
            file_size: None,
            footer: None,
        }
    }

    /// Configure a known file size.
    ///
    /// This saves the request to discover the size of the file. All bets are off if the value is
    /// wrong.
    pub fn with_file_size(mut self, file_size: u64) -> Self {
        self.file_size = Some(file_size);
        self
    }

    /// Configure a known footer, for example one cached from an earlier open, together with its
    /// length in bytes as reported by [`PlaitFile::footer_len`].
    ///
    /// The file is then opened without reading its tail.
    pub fn with_footer(mut self, footer: Footer, footer_len: u32) -> Self {
        self.footer = Some((footer, footer_len));
        self
    }

    pub fn open(mut self) -> PlaitResult<PlaitFile<R>> {
        let file_size = match self.file_size {
            None => self.read.size()?,
            Some(file_size) => file_size,
        };
        let min_size = (MAGIC_BYTES.len() + EOF_SIZE) as u64;
        if file_size < min_size {
            plait_bail!(
                InvalidSerde: "Malformed file, {file_size} bytes is smaller than the minimum of {min_size}"
            )
        }

        let (footer, footer_len) = match self.footer.take() {
            Some(known) => known,
            None => self.read_footer(file_size)?,
        };
        let columns = footer.validate(footer_location(file_size, footer_len)?)?;
        log::debug!(
            "Opened file of {} with {} records in {} columns",
            footer.schema().name(),
            footer.num_records(),
            columns.len()
        );
        Ok(PlaitFile::new(self.read, footer, footer_len, columns))
    }

    /// Read the footer from the tail of the file, returning it with its length.
    fn read_footer(&self, file_size: u64) -> PlaitResult<(Footer, u32)> {
        let head = self.read.read_byte_range(0..MAGIC_BYTES.len() as u64)?;
        if head.as_ref() != MAGIC_BYTES {
            plait_bail!(InvalidSerde: "Malformed file, invalid leading magic bytes, got {head:?}")
        }

        let eof_loc = file_size - EOF_SIZE as u64;
        let eof = self.read.read_byte_range(eof_loc..file_size)?;
        let magic_number = &eof[EOF_SIZE - MAGIC_BYTES.len()..];
        if magic_number != MAGIC_BYTES {
            plait_bail!(InvalidSerde: "Malformed file, invalid magic bytes, got {magic_number:?}")
        }

        let version = u16::from_le_bytes(
            eof[0..2]
                .try_into()
                .map_err(|e| plait_err!(InvalidSerde: "Version was not a u16 {e}"))?,
        );
        if version != VERSION {
            plait_bail!(InvalidSerde: "Malformed file, unsupported version {version}")
        }

        let footer_len = u32::from_le_bytes(
            eof[2..6]
                .try_into()
                .map_err(|e| plait_err!(InvalidSerde: "Footer size was not a u32 {e}"))?,
        );
        let footer_loc = footer_location(file_size, footer_len)?;
        let footer = self.read.read_byte_range(footer_loc..eof_loc)?;
        let footer: Footer = serde_json::from_slice(&footer)?;
        Ok((footer, footer_len))
    }
}

/// The offset of a footer of `footer_len` bytes, which is also where the column data ends.
fn footer_location(file_size: u64, footer_len: u32) -> PlaitResult<u64> {
    let eof_loc = file_size - EOF_SIZE as u64;
    let available = eof_loc - MAGIC_BYTES.len() as u64;
    if footer_len > MAX_FOOTER_SIZE || u64::from(footer_len) > available {
        plait_bail!(
            InvalidSerde: "Malformed file, footer of {footer_len} bytes does not fit in {available} bytes"
        )
    }
    Ok(eof_loc - u64::from(footer_len))
}
