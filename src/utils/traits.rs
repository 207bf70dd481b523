use std::io::{self, Read, Seek, SeekFrom};

use bincode::{config, Decode};

/// Trait for the raw image read primitive
/// # Note
/// This trait is implemented for all types implementing
/// [Read](std::io::Read) and [Seek](std::io::Seek),
/// like [File](std::fs::File), [Cursor](std::io::Cursor) or
/// [PartitionCursor](crate::partition_cursor::PartitionCursor)
pub trait DiskRead {
    /// fill `buf` with the bytes starting at `offset`,
    /// a short read is an error
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()>;

    /// read exactly `length` bytes starting at `offset`
    fn disk_read(&mut self, offset: u64, length: u32) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; length as usize];
        self.read_exact_at(offset, &mut buf)?;
        Ok(buf)
    }
}

impl<R> DiskRead for R
where
    R: Read + Seek,
{
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        self.seek(SeekFrom::Start(offset))?;
        self.read_exact(buf)
    }
}

/// Trait for a fixed-layout little-endian record stored on disk
/// # Note
/// field order of the implementing type is its on-disk order,
/// integers are fixed width and arrays carry no length prefix
pub trait OnDiskRecord: Decode<()> + Sized {
    /// size of the full in-memory representation, in bytes
    const RECORD_SIZE: usize;

    /// decode from a slice holding at least the decoded fields
    fn decode_record(buf: &[u8]) -> io::Result<Self> {
        let config = config::legacy();
        let (record, _bytes_read): (Self, usize) = bincode::decode_from_slice(buf, config)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        Ok(record)
    }

    /// read `disk_len` bytes at `offset` into a zeroed buffer of
    /// [RECORD_SIZE](OnDiskRecord::RECORD_SIZE) bytes and decode it
    /// # Returns
    /// The decoded record, bytes past `disk_len` are left at zero.
    /// A `disk_len` larger than the record is an
    /// [InvalidInput](io::ErrorKind::InvalidInput) error
    fn read_from<D>(disk: &mut D, offset: u64, disk_len: usize) -> io::Result<Self>
    where
        D: DiskRead + ?Sized,
    {
        if disk_len > Self::RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "on-disk length {disk_len} exceeds record size {}",
                    Self::RECORD_SIZE
                ),
            ));
        }
        let mut buf = vec![0u8; Self::RECORD_SIZE];
        disk.read_exact_at(offset, &mut buf[..disk_len])?;
        Self::decode_record(&buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[derive(Debug, Decode, PartialEq)]
    struct Pair {
        lo: u32,
        hi: u32,
    }

    impl OnDiskRecord for Pair {
        const RECORD_SIZE: usize = 8;
    }

    #[test]
    fn test_disk_read_exact_length() {
        let mut cursor = Cursor::new((0u8..16).collect::<Vec<_>>());
        assert_eq!(cursor.disk_read(4, 3).unwrap(), vec![4, 5, 6]);
    }

    #[test]
    fn test_disk_read_short_is_error() {
        let mut cursor = Cursor::new(vec![0u8; 8]);
        let err = cursor.disk_read(4, 8).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_decode_little_endian() {
        let bytes = [0x01, 0x00, 0x00, 0x00, 0x02, 0x01, 0x00, 0x00];
        assert_eq!(Pair::decode_record(&bytes).unwrap(), Pair { lo: 1, hi: 0x102 });
    }

    // a partial record keeps the remaining fields zeroed
    #[test]
    fn test_read_partial_record() {
        let mut cursor = Cursor::new(vec![0xffu8; 16]);
        let pair = Pair::read_from(&mut cursor, 2, 4).unwrap();
        assert_eq!(
            pair,
            Pair {
                lo: 0xffff_ffff,
                hi: 0
            }
        );
    }

    #[test]
    fn test_read_oversized_record() {
        let mut cursor = Cursor::new(vec![0u8; 16]);
        let err = Pair::read_from(&mut cursor, 0, 12).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(cursor.position(), 0);
    }
}
