use std::fs::File;
use std::io;
use std::ops::Range;

use bytes::{Bytes, BytesMut};

use crate::ReadAt;
use crate::read::usize_range;

impl ReadAt for File {
    fn read_byte_range(&self, range: Range<u64>) -> io::Result<Bytes> {
        let (start, end) = usize_range(&range)?;
        let mut buffer = BytesMut::zeroed(end.saturating_sub(start));
        read_exact_at(self, &mut buffer, range.start)?;
        Ok(buffer.freeze())
    }

    fn size(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

cfg_if::cfg_if! {
    if #[cfg(unix)] {
        fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
            std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
        }
    } else if #[cfg(windows)] {
        fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
            use std::os::windows::fs::FileExt;

            while !buf.is_empty() {
                match file.seek_read(buf, offset) {
                    Ok(0) => {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            "failed to fill whole buffer",
                        ));
                    }
                    Ok(n) => {
                        buf = &mut buf[n..];
                        offset += n as u64;
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            Ok(())
        }
    } else {
        fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<()> {
            use std::io::{Read, Seek, SeekFrom};

            let mut file = file;
            file.seek(SeekFrom::Start(offset))?;
            file.read_exact(buf)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn file_ranges() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"PLAT0123PLAT").unwrap();
        file.flush().unwrap();
        assert_eq!(file.size().unwrap(), 12);
        assert_eq!(file.read_byte_range(8..12).unwrap().as_ref(), b"PLAT");
        assert_eq!(file.read_byte_range(4..4).unwrap().len(), 0);
        assert_eq!(
            file.read_byte_range(10..14).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
