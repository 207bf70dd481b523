use clap::Parser;

#[derive(Parser, Debug, PartialEq)]
#[command(author, version, about, long_about)]
pub enum Ext4MetaCli {
    /// print the superblock and the block group descriptors
    Info(InfoArgs),
    /// print where the inode table holding an inode starts
    InodeTable(InodeTableArgs),
}
/// show filesystem metadata subcommand
#[derive(clap::Args, Debug, PartialEq)]
#[command(author, version, about = "print ext4 metadata")]
pub struct InfoArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// byte offset of the file system inside the image
    #[clap(short, long, default_value_t = 0)]
    pub offset: u64,
}

/// locate an inode table subcommand
#[derive(clap::Args, Debug, PartialEq)]
#[command(author, version, about = "locate the inode table of an inode")]
pub struct InodeTableArgs {
    /// the path of the file system image file
    #[clap(short = 'p', long)]
    pub image_file_path: String,
    /// byte offset of the file system inside the image
    #[clap(short, long, default_value_t = 0)]
    pub offset: u64,
    /// the inode number to locate
    #[clap(short, long)]
    pub inode: u32,
}
