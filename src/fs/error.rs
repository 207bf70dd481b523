use thiserror::Error;

/// errors raised while loading ext4 metadata
#[derive(Debug, Error)]
pub enum FsError {
    /// the image does not hold a filesystem this crate understands
    #[error("unrecognized filesystem: {detail}")]
    UnrecognizedFilesystem { detail: String },
    /// the underlying image read failed or came back short
    #[error("image read failed: {0}")]
    Io(#[from] std::io::Error),
}

pub type FsResult<T> = Result<T, FsError>;
