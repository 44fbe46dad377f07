//! Filesystem error type.

use std::io;

use tfs_types::{FileHandle, InodeNo};

use crate::inode::InodeType;

/// Everything that can go wrong in a filesystem call.
///
/// All failures are local to the call that produced them; the tables are
/// never left mid-update.
#[derive(Debug, thiserror::Error)]
pub enum TfsError {
    #[error("invalid filesystem parameters")]
    InvalidParams,
    #[error("invalid pathname")]
    InvalidPathName,
    #[error("invalid file name")]
    InvalidFileName,
    #[error("file system entry not found")]
    NotFound,
    #[error("expected a directory, found a {0}")]
    NotADirectory(InodeType),
    #[error("hard links to symbolic links are not allowed")]
    HardLinkToSymlink,
    #[error("symbolic link target longer than a block")]
    SymlinkTargetTooLong,
    #[error("too many levels of symbolic links")]
    TooManyLinks,
    #[error("no free slot in the inode table")]
    OutOfInodes,
    #[error("no free data block")]
    OutOfBlocks,
    #[error("no free slot in the open-file table")]
    OutOfOpenFiles,
    #[error("directory is full")]
    DirectoryFull,
    #[error("bad file handle {0}")]
    BadFileHandle(FileHandle),
    #[error("open file {0} no longer exists (inode {1} was removed)")]
    HandleRevoked(FileHandle, InodeNo),
    #[error("external I/O: {0}")]
    ExternalIo(#[from] io::Error),
}
