pub mod cli_interface;
mod fs;
pub mod inspect;
pub mod partition_cursor;
pub mod utils;
pub use fs::*;
