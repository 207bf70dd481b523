//! an opened ext4 filesystem, holding the metadata later lookups need

use crate::{partition_cursor::PartitionCursor, utils::traits::DiskRead};

use super::{
    load_group_descriptors, load_superblock, FsResult, GroupDescriptorTable, SuperBlock,
};
use memmap2::{Mmap, MmapOptions};
use std::{
    fs::File,
    io::{self, Seek, SeekFrom},
    path::Path,
};

/// it has the following layout:
/// - superblock
/// - group descriptor table
///
/// both are loaded once when the instance is created and never change,
/// a value of this type only exists if both loaded successfully
#[derive(Debug)]
pub struct Ext4Fs<D> {
    /// the superblock of this filesystem
    superblock: SuperBlock,
    /// one descriptor per block group
    group_descriptors: GroupDescriptorTable,
    /// image handle to read the rest of the filesystem through
    image: D,
}

impl<D> Ext4Fs<D>
where
    D: DiskRead,
{
    /// load the superblock and then the group descriptor table from `image`
    /// # Params
    /// - `image`: the partition holding the filesystem
    /// # Return
    /// an [Ext4Fs] instance, or the first error met while loading
    pub fn new(mut image: D) -> FsResult<Self> {
        let superblock = load_superblock(&mut image)?;
        let group_descriptors = load_group_descriptors(&mut image, &superblock)?;
        Ok(Ext4Fs {
            superblock,
            group_descriptors,
            image,
        })
    }
}

impl Ext4Fs<PartitionCursor<Mmap>> {
    /// open an image file read only
    /// # Params
    /// - `image_path`: the path of the image file,\
    /// or of a block device like **/dev/sda1**
    /// - `partition_offset`: where the filesystem starts in that file,
    /// 0 unless it's a whole disk image
    pub fn open<P>(image_path: P, partition_offset: u64) -> FsResult<Self>
    where
        P: AsRef<Path>,
    {
        let file_mmap_area = map_image(File::open(image_path.as_ref())?)?;
        Self::new(PartitionCursor::new(file_mmap_area, partition_offset))
    }
}

/// map the whole of `file` read only
///
/// the length comes from seeking to the end, block devices
/// report a metadata length of 0
fn map_image(mut file: File) -> io::Result<Mmap> {
    let len = file.seek(SeekFrom::End(0))?;
    let len = usize::try_from(len).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("image of {len} bytes can't be mapped"),
        )
    })?;

    // Safety
    // the map is only ever read, and the image isn't expected
    // to be modified by other processes while it's open
    unsafe { MmapOptions::new().len(len).map(&file) }
}

/// get [SuperBlock], [GroupDescriptorTable] and the image of this filesystem
impl<D> Ext4Fs<D> {
    #[inline]
    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    #[inline]
    pub fn group_descriptors(&self) -> &GroupDescriptorTable {
        &self.group_descriptors
    }

    #[inline]
    pub fn image_mut(&mut self) -> &mut D {
        &mut self.image
    }

    #[inline]
    pub fn into_inner(self) -> D {
        self.image
    }

    /// keep the loaded metadata but read through `image` from now on
    pub fn replace_image<E>(self, image: E) -> Ext4Fs<E> {
        Ext4Fs {
            superblock: self.superblock,
            group_descriptors: self.group_descriptors,
            image,
        }
    }
}

/// queries used by inode and directory lookups
impl<D> Ext4Fs<D> {
    #[inline]
    pub fn block_size(&self) -> u32 {
        self.superblock.block_size()
    }

    #[inline]
    pub fn inode_size(&self) -> u16 {
        self.superblock.inode_size()
    }

    #[inline]
    pub fn inodes_per_group(&self) -> u32 {
        self.superblock.inodes_per_group()
    }

    /// byte offset of the inode table holding `inode_number`
    /// # Panics
    /// if `inode_number` isn't below [SuperBlock::addressable_inodes]
    #[inline]
    pub fn inode_table_offset(&self, inode_number: u32) -> u64 {
        self.group_descriptors
            .inode_table_offset(&self.superblock, inode_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FsError;
    use crate::utils::synthetic_image::SyntheticImage;
    use std::io::{Cursor, Write};

    #[test]
    fn test_new() {
        let fs = Ext4Fs::new(Cursor::new(SyntheticImage::default().build())).unwrap();
        assert_eq!(fs.block_size(), 1024);
        assert_eq!(fs.inode_size(), 256);
        assert_eq!(fs.inodes_per_group(), 512);
        assert_eq!(fs.group_descriptors().len(), 2);
        assert_eq!(fs.inode_table_offset(0), 10 * 1024);
        assert_eq!(fs.inode_table_offset(600), 20 * 1024);
    }

    #[test]
    fn test_new_unrecognized() {
        let image = SyntheticImage {
            magic: 0xef52,
            ..Default::default()
        };
        let result = Ext4Fs::new(Cursor::new(image.build()));
        assert!(matches!(
            result,
            Err(FsError::UnrecognizedFilesystem { .. })
        ));
    }

    // the superblock loads but the descriptor table is cut off
    #[test]
    fn test_new_truncated() {
        let mut bytes = SyntheticImage::default().build();
        bytes.truncate(2048 + 16);
        let result = Ext4Fs::new(Cursor::new(bytes));
        assert!(matches!(result, Err(FsError::Io(_))));
    }

    /// test if a filesystem inside a disk image is found at its offset
    #[test]
    fn test_open_with_partition_offset() {
        let image = SyntheticImage {
            log_block_size: 2,
            blocks_count: 2 * 32768,
            blocks_per_group: 32768,
            inodes_per_group: 8192,
            inode_tables: vec![33, 32801],
            volume_name: "data",
            ..Default::default()
        };
        let partition_offset = 1 << 20;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&image.build_at(partition_offset)).unwrap();
        file.flush().unwrap();

        let fs = Ext4Fs::open(file.path(), partition_offset as u64).unwrap();
        assert_eq!(fs.superblock().volume_name(), "data");
        assert_eq!(fs.block_size(), 4096);
        assert_eq!(fs.inode_table_offset(8191), 33 * 4096);
        assert_eq!(fs.inode_table_offset(8192), 32801 * 4096);
        assert_eq!(fs.into_inner().base(), partition_offset as u64);

        // without the offset there's no superblock to find
        assert!(matches!(
            Ext4Fs::open(file.path(), 0),
            Err(FsError::UnrecognizedFilesystem { .. })
        ));
    }

    // the mapped length is taken from the end of the file, not its metadata
    #[test]
    fn test_map_image_seeks_length() {
        let bytes = SyntheticImage::default().build();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();
        file.flush().unwrap();

        let mut handle = file.reopen().unwrap();
        handle.seek(SeekFrom::Start(100)).unwrap();
        let map = map_image(handle).unwrap();
        assert_eq!(map.len(), bytes.len());
        assert_eq!(&map[..], &bytes[..]);

        let fs = Ext4Fs::new(PartitionCursor::new(map, 0)).unwrap();
        assert_eq!(fs.inode_table_offset(600), 20 * 1024);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Ext4Fs::open(dir.path().join("missing.img"), 0);
        assert!(matches!(result, Err(FsError::Io(_))));
    }

    /// loaded metadata can be shared between threads as is
    #[test]
    fn test_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SuperBlock>();
        assert_send_sync::<GroupDescriptorTable>();
        assert_send_sync::<Ext4Fs<Cursor<Vec<u8>>>>();
        assert_send_sync::<Ext4Fs<PartitionCursor<Mmap>>>();

        let fs = Ext4Fs::new(Cursor::new(SyntheticImage::default().build())).unwrap();
        let fs = &fs;
        std::thread::scope(|s| {
            let readers: Vec<_> = (0..4)
                .map(|i| s.spawn(move || fs.inode_table_offset(i * 300)))
                .collect();
            let offsets: Vec<u64> = readers.into_iter().map(|r| r.join().unwrap()).collect();
            assert_eq!(offsets, vec![10240, 10240, 20480, 20480]);
        });
    }
}
