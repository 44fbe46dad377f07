//! TFS: an in-memory teaching file system.
//!
//! Four layers, leaf to root:
//!   + Slot vectors: FREE/TAKEN allocation state for each table.
//!   + Blocks: the fixed pool of data blocks, sole storage unit.
//!   + Inodes: allocator, metadata, hard links, the root directory.
//!   + Operations: the POSIX-flavored calls (`open`, `read`, `write`,
//!     `link`, `sym_link`, `unlink`, ...).
//!
//! Every file lives directly under the single root directory and holds
//! at most one block of data. A [`FileSystem`] value owns the inode
//! table, the block pool, and the open-file table; it is safe to share
//! across threads, and independent instances do not interact.
//!
//! ```
//! use tfs::{FileSystem, FsParams, OpenFlags};
//!
//! let fs = FileSystem::new(FsParams::default())?;
//! let fh = fs.open("/greeting", OpenFlags::CREATE)?;
//! fs.write(fh, b"hello")?;
//! fs.close(fh)?;
//!
//! let fh = fs.open("/greeting", OpenFlags::empty())?;
//! let mut buf = [0; 5];
//! fs.read(fh, &mut buf)?;
//! assert_eq!(&buf, b"hello");
//! fs.close(fh)?;
//! # Ok::<(), tfs::TfsError>(())
//! ```

use log::debug;

mod alloc;
mod data_block;
mod delay;
mod error;
mod inode;
mod open_file;
mod ops;
mod path;
mod sync;

pub use tfs_types::{BlockNo, FileHandle, FsParams, InodeNo, MAX_FILE_NAME, OpenFlags};

pub use self::{error::TfsError, inode::InodeType};

use self::{data_block::BlockPool, inode::InodeTable, open_file::OpenFileTable};

/// One filesystem instance: the three tables and their locks.
///
/// Construction replaces `init`, dropping the value replaces `destroy`.
/// All operations take `&self` and may be called from any number of
/// threads.
#[derive(Debug)]
pub struct FileSystem {
    params: FsParams,
    inodes: InodeTable,
    blocks: BlockPool,
    open_files: OpenFileTable,
}

impl FileSystem {
    /// Builds a filesystem with the given capacities and creates the
    /// root directory.
    ///
    /// Fails with [`TfsError::InvalidParams`] when a capacity is zero or
    /// does not fit the directory-entry record, and with an exhaustion
    /// error if the root directory cannot be built (it needs one inode
    /// and one block).
    pub fn new(params: FsParams) -> Result<Self, TfsError> {
        validate(&params)?;

        let fs = Self {
            inodes: InodeTable::new(params.max_inode_count, params.block_size),
            blocks: BlockPool::new(params.max_block_count, params.block_size),
            open_files: OpenFileTable::new(params.max_open_files_count),
            params,
        };

        let root = fs.inodes.create(InodeType::Directory, &fs.blocks)?;
        assert_eq!(root, InodeNo::ROOT, "root directory must land in slot 0");
        debug!(
            "file system up: {} inodes, {} blocks of {} bytes, {} open files",
            params.max_inode_count,
            params.max_block_count,
            params.block_size,
            params.max_open_files_count,
        );
        Ok(fs)
    }

    /// The capacities this instance was built with.
    #[must_use]
    pub fn params(&self) -> &FsParams {
        &self.params
    }
}

fn validate(params: &FsParams) -> Result<(), TfsError> {
    let FsParams {
        max_inode_count,
        max_block_count,
        max_open_files_count,
        block_size,
    } = *params;

    if max_inode_count == 0 || max_block_count == 0 || max_open_files_count == 0 || block_size == 0
    {
        return Err(TfsError::InvalidParams);
    }
    // inumbers and block numbers must fit the directory entry's i32
    if max_inode_count > i32::MAX as usize || max_block_count > i32::MAX as usize {
        return Err(TfsError::InvalidParams);
    }
    Ok(())
}
