//! ext4 metadata that every later lookup depends on
pub mod block_group;
pub mod error;
pub mod fs_layout;
pub mod superblock;
pub use block_group::*;
pub use error::*;
pub use fs_layout::*;
pub use superblock::*;

/// the superblock always starts 1 KiB into the partition, whatever the block size
pub const SUPERBLOCK_OFFSET: u64 = 0x400;
/// on-disk size of the superblock record
pub const SUPERBLOCK_SIZE: usize = 0x400;
pub const EXT4_MAGIC: u16 = 0xEF53;
/// descriptor size when `s_desc_size` is zero
pub const GROUP_DESC_MIN_SIZE: u32 = 0x20;
