use std::io;
use std::ops::Range;
use std::sync::Arc;

use bytes::Bytes;
use plait_error::plait_err;

/// A source of bytes that supports reads at arbitrary offsets.
///
/// Reads take `&self`, so a single source can serve several readers at once.
pub trait ReadAt: Send + Sync {
    /// Read the bytes in `range`.
    ///
    /// If the source does not have the requested number of bytes, the read fails with
    /// [`UnexpectedEof`][std::io::ErrorKind::UnexpectedEof].
    fn read_byte_range(&self, range: Range<u64>) -> io::Result<Bytes>;

    /// The number of bytes readable.
    fn size(&self) -> io::Result<u64>;
}

impl<T: ReadAt + ?Sized> ReadAt for Arc<T> {
    fn read_byte_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        T::read_byte_range(self, range)
    }

    fn size(&self) -> io::Result<u64> {
        T::size(self)
    }
}

impl<T: ReadAt + ?Sized> ReadAt for &T {
    fn read_byte_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        T::read_byte_range(self, range)
    }

    fn size(&self) -> io::Result<u64> {
        T::size(self)
    }
}

impl ReadAt for Bytes {
    fn read_byte_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        let (start, end) = usize_range(&range)?;
        if start > end || end > self.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                plait_err!("read of {range:?} past the end of {} bytes", self.len()),
            ));
        }
        Ok(self.slice(start..end))
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.len() as u64)
    }
}

pub(crate) fn usize_range(range: &Range<u64>) -> io::Result<(usize, usize)> {
    let convert = |v: u64| {
        usize::try_from(v).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
    };
    Ok((convert(range.start)?, convert(range.end)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_ranges() {
        let bytes = Bytes::from_static(b"PLAT0123");
        assert_eq!(bytes.size().unwrap(), 8);
        assert_eq!(bytes.read_byte_range(4..8).unwrap().as_ref(), b"0123");
        assert_eq!(
            bytes.read_byte_range(4..9).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        let shared = Arc::new(bytes);
        assert_eq!(shared.read_byte_range(0..4).unwrap().as_ref(), b"PLAT");
    }
}
