//! print the metadata of an ext4 image
use crate::{
    fs::{Ext4Fs, GroupDescriptorTable},
    partition_cursor::PartitionCursor,
};
use anyhow::{anyhow, Context};
use byte_unit::Byte;
use memmap2::Mmap;
use std::{
    io::{self, Write},
    path::Path,
};

/// print the superblock summary and one line per block group
/// # Params
/// - `image_file_path`: the path of the image file
/// - `partition_offset`: where the filesystem starts in the image file
///
/// # Return
/// an [anyhow::Result] type to indicate whether the operation is successful
pub fn info<P>(image_file_path: P, partition_offset: u64) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let fs = open(image_file_path.as_ref(), partition_offset)?;
    write_info(&fs, io::stdout().lock())
}

/// print the byte offset of the inode table holding `inode_number`
/// # Params
/// - `image_file_path`: the path of the image file
/// - `partition_offset`: where the filesystem starts in the image file
/// - `inode_number`: the inode to locate
pub fn inode_table<P>(
    image_file_path: P,
    partition_offset: u64,
    inode_number: u32,
) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let fs = open(image_file_path.as_ref(), partition_offset)?;
    write_inode_table(&fs, inode_number, io::stdout().lock())
}

fn open(
    image_file_path: &Path,
    partition_offset: u64,
) -> anyhow::Result<Ext4Fs<PartitionCursor<Mmap>>> {
    Ext4Fs::open(image_file_path, partition_offset).with_context(|| {
        format!(
            "can't load ext4 metadata from {} at offset {partition_offset}",
            image_file_path.display()
        )
    })
}

pub fn write_info<D, W>(fs: &Ext4Fs<D>, mut w: W) -> anyhow::Result<()>
where
    W: Write,
{
    let superblock = fs.superblock();
    let volume_name = superblock.volume_name();
    writeln!(
        w,
        "Filesystem volume name:   {}",
        if volume_name.is_empty() {
            "<none>"
        } else {
            volume_name.as_str()
        }
    )?;
    writeln!(w, "Filesystem UUID:          {}", superblock.uuid())?;
    writeln!(w, "Inode count:              {}", superblock.inodes_count)?;
    writeln!(w, "Block count:              {}", superblock.blocks_count_lo)?;
    writeln!(w, "First block:              {}", superblock.first_data_block)?;
    writeln!(
        w,
        "Block size:               {} ({})",
        superblock.block_size(),
        Byte::from_bytes(superblock.block_size() as _).get_appropriate_unit(true)
    )?;
    writeln!(w, "Blocks per group:         {}", superblock.blocks_per_group)?;
    writeln!(
        w,
        "Block group size:         {}",
        Byte::from_bytes(superblock.block_group_byte_size() as _).get_appropriate_unit(true)
    )?;
    writeln!(w, "Block groups:             {}", superblock.block_group_count())?;
    writeln!(w, "Inodes per group:         {}", superblock.inodes_per_group())?;
    writeln!(w, "Inode size:               {}", superblock.inode_size())?;
    write_table_layout(
        fs.group_descriptors(),
        superblock.group_descriptor_table_offset(),
        &mut w,
    )?;

    let block_size = superblock.block_size() as u64;
    for (group, descriptor) in fs.group_descriptors().iter().enumerate() {
        writeln!(
            w,
            "Group {group}: block bitmap at {}, inode bitmap at {}, inode table at {} ({:#x}), {} free blocks, {} free inodes, {} directories",
            descriptor.block_bitmap_lo,
            descriptor.inode_bitmap_lo,
            descriptor.inode_table_lo,
            descriptor.inode_table_lo as u64 * block_size,
            descriptor.free_blocks_count_lo,
            descriptor.free_inodes_count_lo,
            descriptor.used_dirs_count_lo,
        )?;
    }
    Ok(())
}

fn write_table_layout<W>(table: &GroupDescriptorTable, offset: u64, w: &mut W) -> io::Result<()>
where
    W: Write,
{
    writeln!(w, "Group descriptor table:   {offset:#x}")?;
    writeln!(
        w,
        "Group descriptor size:    {} on disk, {} in memory",
        table.disk_stride(),
        table.memory_stride()
    )
}

pub fn write_inode_table<D, W>(fs: &Ext4Fs<D>, inode_number: u32, mut w: W) -> anyhow::Result<()>
where
    W: Write,
{
    let addressable = fs.superblock().addressable_inodes();
    if inode_number as u64 >= addressable {
        return Err(anyhow!(
            "inode {inode_number} is out of range, this filesystem has {addressable} inodes"
        ));
    }
    let offset = fs.inode_table_offset(inode_number);
    writeln!(
        w,
        "inode {inode_number}: group {}, inode table at {offset:#x}",
        inode_number / fs.inodes_per_group()
    )?;
    Ok(())
}
