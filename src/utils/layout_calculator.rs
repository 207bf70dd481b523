//! This module contains functions to calculate the on-disk positions of ext4 metadata

use crate::fs::{SUPERBLOCK_OFFSET, SUPERBLOCK_SIZE};

/// calculate block size from the superblock's `s_log_block_size`
/// # Arguments
/// - `log_block_size`: block size exponent, relative to 1 KiB
/// # Return
/// the block size in bytes,
/// or [None] if it can't be represented in 32 bits
/// # Example
/// ```
/// use ext4meta::utils::layout_calculator::block_size;
/// assert_eq!(block_size(0), Some(1024));
/// assert_eq!(block_size(2), Some(4096));
/// assert_eq!(block_size(22), None);
/// ```
pub const fn block_size(log_block_size: u32) -> Option<u32> {
    if log_block_size >= u32::BITS - 10 {
        return None;
    }
    Some(1 << (log_block_size + 10))
}

/// round `offset` up to the next multiple of `align`
/// # Arguments
/// - `offset`: a byte offset
/// - `align`: a non-zero alignment
/// # Example
/// ```
/// use ext4meta::utils::layout_calculator::align_up;
/// assert_eq!(align_up(2048, 1024), 2048);
/// assert_eq!(align_up(2048, 4096), 4096);
/// assert_eq!(align_up(2049, 1024), 3072);
/// ```
pub const fn align_up(offset: u64, align: u64) -> u64 {
    offset.div_ceil(align) * align
}

/// calculate where the group descriptor table starts
/// # Arguments
/// - `block_size`: the block size of the filesystem
/// # Return
/// the first block boundary following the block that holds the superblock
/// # Example
/// ```
/// use ext4meta::utils::layout_calculator::group_descriptor_table_offset;
/// assert_eq!(group_descriptor_table_offset(1024), 2048);
/// assert_eq!(group_descriptor_table_offset(4096), 4096);
/// assert_eq!(group_descriptor_table_offset(65536), 65536);
/// ```
pub const fn group_descriptor_table_offset(block_size: u32) -> u64 {
    align_up(
        SUPERBLOCK_OFFSET + SUPERBLOCK_SIZE as u64,
        block_size as u64,
    )
}

/// calculate the byte offset of a group descriptor record
/// # Arguments
/// - `block_size`: the block size of the filesystem
/// - `disk_stride`: on-disk size of one descriptor record
/// - `group`: block group index, start at 0
/// # Example
/// ```
/// use ext4meta::utils::layout_calculator::group_descriptor_offset;
/// assert_eq!(group_descriptor_offset(1024, 32, 0), 2048);
/// assert_eq!(group_descriptor_offset(1024, 32, 3), 2048 + 96);
/// assert_eq!(group_descriptor_offset(4096, 64, 2), 4096 + 128);
/// ```
pub const fn group_descriptor_offset(block_size: u32, disk_stride: u32, group: u32) -> u64 {
    group_descriptor_table_offset(block_size) + group as u64 * disk_stride as u64
}
