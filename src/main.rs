use clap::Parser;
use ext4meta::cli_interface::Ext4MetaCli;
/// a CLI interface to users to look at the metadata of an ext4 image,
/// nothing is ever written to the image.
///
/// Set `RUST_LOG=info` to see what is read while loading.
fn main() -> anyhow::Result<()> {
    env_logger::builder().format_timestamp_nanos().init();
    let args = Ext4MetaCli::parse();
    match args {
        Ext4MetaCli::Info(args) => {
            ext4meta::inspect::info(args.image_file_path, args.offset)?;
        }
        Ext4MetaCli::InodeTable(args) => {
            ext4meta::inspect::inode_table(args.image_file_path, args.offset, args.inode)?;
        }
    }
    Ok(())
}
