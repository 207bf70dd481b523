//! build small ext4 images holding just a superblock and a descriptor table

use crate::fs::{EXT4_MAGIC, SUPERBLOCK_OFFSET};

use super::layout_calculator::{align_up, group_descriptor_table_offset};

#[derive(Debug, Clone)]
pub(crate) struct SyntheticImage {
    pub log_block_size: u32,
    pub blocks_count: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub inode_size: u16,
    pub desc_size: u16,
    pub magic: u16,
    pub volume_name: &'static str,
    /// inode table block of each group, in group order
    pub inode_tables: Vec<u32>,
    /// byte written over each descriptor slot before its fields
    pub descriptor_filler: u8,
}

impl Default for SyntheticImage {
    fn default() -> Self {
        Self {
            log_block_size: 0,
            blocks_count: 2 * 8192,
            blocks_per_group: 8192,
            inodes_per_group: 512,
            inode_size: 256,
            desc_size: 0,
            magic: EXT4_MAGIC,
            volume_name: "",
            inode_tables: vec![10, 20],
            descriptor_filler: 0,
        }
    }
}

impl SyntheticImage {
    pub fn build(&self) -> Vec<u8> {
        let block_size = 1024u32 << self.log_block_size;
        let stride = if self.desc_size == 0 { 32 } else { 64 };
        let table = group_descriptor_table_offset(block_size) as usize;
        let len = align_up(
            (table + stride * self.inode_tables.len()) as u64,
            block_size as u64,
        ) + block_size as u64;
        let mut image = vec![0u8; len as usize];

        let sb = SUPERBLOCK_OFFSET as usize;
        put(&mut image, sb + 0x04, &self.blocks_count.to_le_bytes());
        put(&mut image, sb + 0x18, &self.log_block_size.to_le_bytes());
        put(&mut image, sb + 0x20, &self.blocks_per_group.to_le_bytes());
        put(&mut image, sb + 0x28, &self.inodes_per_group.to_le_bytes());
        put(&mut image, sb + 0x38, &self.magic.to_le_bytes());
        put(&mut image, sb + 0x58, &self.inode_size.to_le_bytes());
        put(&mut image, sb + 0x78, self.volume_name.as_bytes());
        put(&mut image, sb + 0xfe, &self.desc_size.to_le_bytes());

        for (group, inode_table) in self.inode_tables.iter().enumerate() {
            let slot = table + group * stride;
            image[slot..slot + stride].fill(self.descriptor_filler);
            put(&mut image, slot + 0x08, &inode_table.to_le_bytes());
        }
        image
    }

    /// the same image placed `partition_offset` bytes into a disk
    pub fn build_at(&self, partition_offset: usize) -> Vec<u8> {
        let mut disk = vec![0u8; partition_offset];
        disk.extend(self.build());
        disk
    }
}

fn put(image: &mut [u8], offset: usize, bytes: &[u8]) {
    image[offset..offset + bytes.len()].copy_from_slice(bytes);
}
