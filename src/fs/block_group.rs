use bincode::Decode;
use log::debug;

use crate::utils::{
    layout_calculator,
    traits::{DiskRead, OnDiskRecord},
};

use super::{FsResult, SuperBlock};

/// One ext4 block group descriptor, in its full 64 byte form
///
/// When the superblock says descriptors are 32 bytes on disk,
/// everything from `block_bitmap_hi` on stays zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Decode)]
pub struct GroupDescriptor {
    pub block_bitmap_lo: u32,
    pub inode_bitmap_lo: u32,
    /// first block of this group's inode table, low 32 bits
    pub inode_table_lo: u32,
    pub free_blocks_count_lo: u16,
    pub free_inodes_count_lo: u16,
    pub used_dirs_count_lo: u16,
    pub flags: u16,
    pub exclude_bitmap_lo: u32,
    pub block_bitmap_csum_lo: u16,
    pub inode_bitmap_csum_lo: u16,
    pub itable_unused_lo: u16,
    pub checksum: u16,
    pub block_bitmap_hi: u32,
    pub inode_bitmap_hi: u32,
    /// never used, inode tables are located with the low half only
    pub inode_table_hi: u32,
    pub free_blocks_count_hi: u16,
    pub free_inodes_count_hi: u16,
    pub used_dirs_count_hi: u16,
    pub itable_unused_hi: u16,
    pub exclude_bitmap_hi: u32,
    pub block_bitmap_csum_hi: u16,
    pub inode_bitmap_csum_hi: u16,
    pub reserved: u32,
}

impl OnDiskRecord for GroupDescriptor {
    const RECORD_SIZE: usize = 0x40;
}

/// descriptors of every block group, indexed by group number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDescriptorTable {
    descriptors: Vec<GroupDescriptor>,
    /// bytes between two records on disk,
    /// may be smaller than [GroupDescriptorTable::MEMORY_STRIDE]
    disk_stride: u32,
}

impl GroupDescriptorTable {
    /// size of one record in memory
    pub const MEMORY_STRIDE: usize = GroupDescriptor::RECORD_SIZE;

    #[inline]
    pub fn disk_stride(&self) -> u32 {
        self.disk_stride
    }

    #[inline]
    pub fn memory_stride(&self) -> usize {
        Self::MEMORY_STRIDE
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// descriptor of block group `group`, start at 0
    #[inline]
    pub fn get(&self, group: u32) -> Option<&GroupDescriptor> {
        self.descriptors.get(group as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupDescriptor> {
        self.descriptors.iter()
    }

    /// locate the inode table holding `inode_number`
    /// # Params
    /// - `superblock`: the superblock this table was loaded with
    /// - `inode_number`: must be below [SuperBlock::addressable_inodes]
    /// # Return
    /// byte offset of the group's inode table
    /// # Panics
    /// if `inode_number` falls outside every block group
    pub fn inode_table_offset(&self, superblock: &SuperBlock, inode_number: u32) -> u64 {
        let group = inode_number
            .checked_div(superblock.inodes_per_group())
            .unwrap_or(u32::MAX);
        assert!(
            group < superblock.block_group_count(),
            "inode {inode_number} is in group {group}, but there are only {} groups",
            superblock.block_group_count()
        );
        let inode_table = self.descriptors[group as usize].inode_table_lo;
        debug!("Inode table offset: {inode_table:#x}");
        inode_table as u64 * superblock.block_size() as u64
    }
}

/// read one descriptor per block group
/// # Params
/// - `image`: the partition the superblock was read from
/// - `superblock`: a superblock returned by [load_superblock](super::load_superblock)
/// # Return
/// the table, or the first read error, in which case nothing is returned
pub fn load_group_descriptors<D>(
    image: &mut D,
    superblock: &SuperBlock,
) -> FsResult<GroupDescriptorTable>
where
    D: DiskRead + ?Sized,
{
    let block_size = superblock.block_size();
    let group_count = superblock.block_group_count();
    // disk advances `disk_stride`, the table advances a whole `GroupDescriptor`
    let disk_stride = superblock.group_descriptor_record_size();
    debug!(
        "Group descriptor table at {:#x}, {group_count} records of {disk_stride} bytes",
        superblock.group_descriptor_table_offset()
    );

    let descriptors = (0..group_count)
        .map(|group| {
            let offset = layout_calculator::group_descriptor_offset(block_size, disk_stride, group);
            GroupDescriptor::read_from(&mut *image, offset, disk_stride as usize)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(GroupDescriptorTable {
        descriptors,
        disk_stride,
    })
}
