use bincode::Decode;
use log::{error, info};

use crate::utils::{
    layout_calculator,
    traits::{DiskRead, OnDiskRecord},
};

use super::{
    FsError, FsResult, GroupDescriptor, EXT4_MAGIC, GROUP_DESC_MIN_SIZE, SUPERBLOCK_OFFSET,
    SUPERBLOCK_SIZE,
};

/// The superblock of an ext4 filesystem
///
/// Fields are declared in on-disk order, only the leading part of the
/// 1 KiB record is decoded, the rest is never looked at.
#[derive(Debug, Clone, PartialEq, Eq, Decode)]
pub struct SuperBlock {
    pub inodes_count: u32,
    /// total block count, low 32 bits
    pub blocks_count_lo: u32,
    pub r_blocks_count_lo: u32,
    pub free_blocks_count_lo: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    /// block size is `1 << (log_block_size + 10)`
    pub log_block_size: u32,
    pub log_cluster_size: u32,
    pub blocks_per_group: u32,
    pub clusters_per_group: u32,
    pub inodes_per_group: u32,
    /// last mount time, seconds since the epoch
    pub mtime: u32,
    /// last write time, seconds since the epoch
    pub wtime: u32,
    pub mnt_count: u16,
    pub max_mnt_count: u16,
    /// magic number, [EXT4_MAGIC] for ext2/3/4
    pub magic: u16,
    pub state: u16,
    pub errors: u16,
    pub minor_rev_level: u16,
    pub lastcheck: u32,
    pub checkinterval: u32,
    pub creator_os: u32,
    pub rev_level: u32,
    pub def_resuid: u16,
    pub def_resgid: u16,
    pub first_ino: u32,
    /// size of one on-disk inode record
    pub inode_size: u16,
    pub block_group_nr: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub uuid: [u8; 16],
    pub volume_name: [u8; 16],
    pub last_mounted: [u8; 64],
    pub algorithm_usage_bitmap: u32,
    pub prealloc_blocks: u8,
    pub prealloc_dir_blocks: u8,
    pub reserved_gdt_blocks: u16,
    pub journal_uuid: [u8; 16],
    pub journal_inum: u32,
    pub journal_dev: u32,
    pub last_orphan: u32,
    pub hash_seed: [u32; 4],
    pub def_hash_version: u8,
    pub jnl_backup_type: u8,
    /// zero means group descriptors use the 32 byte layout
    pub desc_size: u16,
    pub default_mount_opts: u32,
    pub first_meta_bg: u32,
    pub mkfs_time: u32,
    pub jnl_blocks: [u32; 17],
    pub blocks_count_hi: u32,
    pub r_blocks_count_hi: u32,
    pub free_blocks_count_hi: u32,
    pub min_extra_isize: u16,
    pub want_extra_isize: u16,
    pub flags: u32,
}

impl OnDiskRecord for SuperBlock {
    const RECORD_SIZE: usize = SUPERBLOCK_SIZE;
}

/// derived geometry, always recomputed from the fields above
impl SuperBlock {
    /// block size in bytes, a power of two no smaller than 1024
    ///
    /// only meaningful for a superblock returned by [load_superblock],
    /// which rejects exponents that overflow 32 bits
    #[inline]
    pub fn block_size(&self) -> u32 {
        1 << (self.log_block_size + 10)
    }

    /// size of one block group in bytes
    #[inline]
    pub fn block_group_byte_size(&self) -> u64 {
        self.blocks_per_group as u64 * self.block_size() as u64
    }

    /// number of full block groups
    ///
    /// blocks of a trailing partial group are not counted
    #[inline]
    pub fn block_group_count(&self) -> u32 {
        self.blocks_count_lo
            .checked_div(self.blocks_per_group)
            .unwrap_or(0)
    }

    /// on-disk size of one group descriptor
    #[inline]
    pub fn group_descriptor_record_size(&self) -> u32 {
        if self.desc_size == 0 {
            GROUP_DESC_MIN_SIZE
        } else {
            GroupDescriptor::RECORD_SIZE as u32
        }
    }

    #[inline]
    pub fn group_descriptor_table_offset(&self) -> u64 {
        layout_calculator::group_descriptor_table_offset(self.block_size())
    }

    #[inline]
    pub fn inode_size(&self) -> u16 {
        self.inode_size
    }

    #[inline]
    pub fn inodes_per_group(&self) -> u32 {
        self.inodes_per_group
    }

    /// inode numbers below this bound can be located
    #[inline]
    pub fn addressable_inodes(&self) -> u64 {
        self.block_group_count() as u64 * self.inodes_per_group as u64
    }
}

/// human readable fields
impl SuperBlock {
    /// volume label, up to the first NUL byte
    pub fn volume_name(&self) -> String {
        let end = self
            .volume_name
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(self.volume_name.len());
        String::from_utf8_lossy(&self.volume_name[..end]).into_owned()
    }

    /// filesystem UUID in the usual `8-4-4-4-12` form
    pub fn uuid(&self) -> String {
        let hex: Vec<String> = self.uuid.iter().map(|b| format!("{b:02x}")).collect();
        format!(
            "{}-{}-{}-{}-{}",
            hex[0..4].concat(),
            hex[4..6].concat(),
            hex[6..8].concat(),
            hex[8..10].concat(),
            hex[10..16].concat()
        )
    }
}

/// read and validate the superblock of the filesystem in `image`
/// # Params
/// - `image`: the partition holding the filesystem, offsets are relative to its start
/// # Return
/// the decoded [SuperBlock], or [FsError::UnrecognizedFilesystem]
/// when the image isn't ext2/3/4
pub fn load_superblock<D>(image: &mut D) -> FsResult<SuperBlock>
where
    D: DiskRead + ?Sized,
{
    let superblock = SuperBlock::read_from(image, SUPERBLOCK_OFFSET, SuperBlock::RECORD_SIZE)?;

    if superblock.magic != EXT4_MAGIC {
        error!("Partition doesn't contain an ext4 filesystem");
        return Err(FsError::UnrecognizedFilesystem {
            detail: format!(
                "superblock magic {:#06x}, expected {EXT4_MAGIC:#06x}",
                superblock.magic
            ),
        });
    }
    if layout_calculator::block_size(superblock.log_block_size).is_none() {
        error!(
            "Block size exponent {} is out of range",
            superblock.log_block_size
        );
        return Err(FsError::UnrecognizedFilesystem {
            detail: format!(
                "log block size {} doesn't fit in 32 bits",
                superblock.log_block_size
            ),
        });
    }

    info!("BLOCK SIZE: {}", superblock.block_size());
    info!("BLOCK GROUP SIZE: {}", superblock.block_group_byte_size());
    info!("N BLOCK GROUPS: {}", superblock.block_group_count());
    info!("INODE SIZE: {}", superblock.inode_size());
    info!("INODES PER GROUP: {}", superblock.inodes_per_group());

    Ok(superblock)
}
