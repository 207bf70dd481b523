//! a read-only cursor over one partition of a disk image,
//! so that filesystem offsets can be used as they are.
use std::io::{ErrorKind, IoSliceMut, Read, Seek, SeekFrom};

/// cursor struct
#[derive(Debug, Default, Clone)]
pub struct PartitionCursor<T> {
    inner: T,
    /// where the partition starts in `inner`
    base: u64,
    /// position relative to `base`
    pos: u64,
}
impl<T> PartitionCursor<T> {
    /// creates a new PartitionCursor whose offset 0 is `base` in `inner`
    pub fn new(inner: T, base: u64) -> Self {
        Self {
            inner,
            base,
            pos: 0,
        }
    }
    /// get underlying buffer
    pub fn into_inner(self) -> T {
        self.inner
    }
    /// get read only reference to underlying buffer
    pub const fn get_ref(&self) -> &T {
        &self.inner
    }
    /// start of the partition in the underlying buffer
    pub const fn base(&self) -> u64 {
        self.base
    }
    /// get the current position of the cursor
    pub const fn position(&self) -> u64 {
        self.pos
    }
    /// set the current position of the cursor
    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos;
    }
}

impl<T> PartitionCursor<T>
where
    T: AsRef<[u8]>,
{
    /// the bytes of the partition
    ///
    /// # Examples
    ///
    /// ```
    /// use ext4meta::partition_cursor::PartitionCursor;
    ///
    /// let buff = PartitionCursor::new(vec![1u8, 2, 3, 4, 5], 2);
    /// assert_eq!(buff.partition(), &[3, 4, 5]);
    ///
    /// let buff = PartitionCursor::new(vec![1u8, 2, 3, 4, 5], 7);
    /// assert_eq!(buff.partition(), &[]);
    /// ```
    pub fn partition(&self) -> &[u8] {
        let inner = self.inner.as_ref();
        let start = self.base.min(inner.len() as u64) as usize;
        &inner[start..]
    }

    /// Returns the remaining slice of the partition.
    ///
    /// # Examples
    ///
    /// ```
    /// use ext4meta::partition_cursor::PartitionCursor;
    ///
    /// let mut buff = PartitionCursor::new(vec![0u8, 0, 1, 2, 3, 4, 5], 2);
    ///
    /// assert_eq!(buff.remaining_slice(), &[1, 2, 3, 4, 5]);
    ///
    /// buff.set_position(2);
    /// assert_eq!(buff.remaining_slice(), &[3, 4, 5]);
    ///
    /// buff.set_position(6);
    /// assert_eq!(buff.remaining_slice(), &[]);
    /// ```
    pub fn remaining_slice(&self) -> &[u8] {
        let partition = self.partition();
        let start = self.pos.min(partition.len() as u64) as usize;
        &partition[start..]
    }

    /// Returns `true` if the remaining slice is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use ext4meta::partition_cursor::PartitionCursor;
    ///
    /// let mut buff = PartitionCursor::new(vec![1u8, 2, 3, 4, 5], 1);
    ///
    /// buff.set_position(2);
    /// assert!(!buff.is_empty());
    ///
    /// buff.set_position(4);
    /// assert!(buff.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.remaining_slice().is_empty()
    }
}

impl<T> Seek for PartitionCursor<T>
where
    T: AsRef<[u8]>,
{
    fn seek(&mut self, style: SeekFrom) -> std::io::Result<u64> {
        let (base_pos, offset) = match style {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (self.partition().len() as u64, n),
            SeekFrom::Current(n) => (self.pos, n),
        };
        match base_pos.checked_add_signed(offset) {
            Some(n) => {
                self.pos = n;
                Ok(self.pos)
            }
            None => Err(ErrorKind::InvalidInput.into()),
        }
    }

    fn stream_position(&mut self) -> std::io::Result<u64> {
        Ok(self.pos)
    }
}

impl<T> Read for PartitionCursor<T>
where
    T: AsRef<[u8]>,
{
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let bytes_read = Read::read(&mut self.remaining_slice(), buf)?;
        self.pos += bytes_read as u64;
        Ok(bytes_read)
    }

    fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> std::io::Result<usize> {
        let mut nread = 0;
        for buf in bufs {
            let n = self.read(buf)?;
            nread += n;
            if n < buf.len() {
                break;
            }
        }
        Ok(nread)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        let remaining = self.remaining_slice();
        if buf.len() > remaining.len() {
            return Err(ErrorKind::UnexpectedEof.into());
        }
        buf.copy_from_slice(&remaining[..buf.len()]);
        self.pos += buf.len() as u64;
        Ok(())
    }
}
