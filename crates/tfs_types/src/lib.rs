//! Data types shared by the TFS state layer and its clients.
//!
//! Everything here is plain data: index newtypes for the three allocation
//! spaces, the fixed-width directory entry record stored inside a
//! directory's data block, the open-mode bitmask, and the filesystem
//! parameters.

use core::fmt;

use bitflags::bitflags;
use dataview::Pod;

/// Maximum length of a directory entry name, including the terminator slot.
///
/// Names of up to `MAX_FILE_NAME - 1` bytes are stored zero-padded.
pub const MAX_FILE_NAME: usize = 40;

/// Represents an inode number: a dense index into the inode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct InodeNo(u32);

impl fmt::Display for InodeNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl InodeNo {
    /// The root directory's inode number.
    ///
    /// The root directory is created first, so first-fit allocation pins it
    /// to slot 0.
    pub const ROOT: Self = Self::new(0);

    /// Creates a new `InodeNo` with the given value.
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    /// Returns the value of the inode number.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Converts the inode number to a table index.
    #[must_use]
    pub const fn as_index(&self) -> usize {
        self.0 as usize
    }
}

/// Represents a data block number: a dense index into the block pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct BlockNo(u32);

impl fmt::Display for BlockNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl BlockNo {
    /// Creates a new `BlockNo` with the given value.
    #[must_use]
    pub const fn new(n: u32) -> Self {
        Self(n)
    }

    /// Returns the value of the block number.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Converts the block number to a pool index.
    #[must_use]
    pub const fn as_index(&self) -> usize {
        self.0 as usize
    }
}

/// A handle to an open file: a dense index into the open-file table.
///
/// Handles are valid from `open` until the matching `close`; using one
/// afterwards fails (or observes whichever file re-used the slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct FileHandle(usize);

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FileHandle {
    /// Creates a new `FileHandle` with the given value.
    #[must_use]
    pub const fn new(n: usize) -> Self {
        Self(n)
    }

    /// Converts the handle to an open-file-table index.
    #[must_use]
    pub const fn as_index(&self) -> usize {
        self.0
    }
}

bitflags! {
    /// Open-mode bits accepted by `open`.
    ///
    /// The empty mask opens an existing file read/write from offset 0.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(transparent)]
    pub struct OpenFlags: u32 {
        /// Create the file if the pathname does not resolve.
        const CREATE = 1 << 0;
        /// Discard existing contents, leaving `size = 0` and no data block.
        const TRUNC = 1 << 1;
        /// Position writes at end-of-file.
        const APPEND = 1 << 2;
    }
}

/// A directory entry as laid out inside a directory's data block.
///
/// A directory's block is an array of these records; a slot whose inumber
/// is `-1` is free. The name is zero-padded to `MAX_FILE_NAME` bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod)]
pub struct DirEntry {
    inumber: i32,
    name: [u8; MAX_FILE_NAME],
}

/// Free-slot sentinel for [`DirEntry::inumber`].
const NO_ENTRY: i32 = -1;

impl DirEntry {
    /// An empty entry: free slot, zeroed name.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            inumber: NO_ENTRY,
            name: [0; MAX_FILE_NAME],
        }
    }

    /// Returns the inode number of the entry, or `None` for a free slot.
    #[must_use]
    pub fn ino(&self) -> Option<InodeNo> {
        if self.inumber == NO_ENTRY {
            None
        } else {
            Some(InodeNo::new(self.inumber.cast_unsigned()))
        }
    }

    /// Sets the inode number of the entry; `None` marks the slot free.
    ///
    /// # Panics
    ///
    /// Panics if the provided inumber does not fit the record's `i32`.
    /// `FsParams` validation keeps every legal inumber in range.
    pub fn set_ino(&mut self, ino: Option<InodeNo>) {
        match ino {
            Some(ino) => self.inumber = i32::try_from(ino.value()).unwrap(),
            None => self.inumber = NO_ENTRY,
        }
    }

    /// Returns the stored name, without zero padding.
    #[must_use]
    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(self.name.len());
        &self.name[..len]
    }

    /// Checks whether the stored name equals `name` byte for byte.
    #[must_use]
    pub fn is_same_name(&self, name: &str) -> bool {
        self.name() == name.as_bytes()
    }

    /// Stores `name`, truncated to `MAX_FILE_NAME - 1` bytes and
    /// zero-padded.
    pub fn set_name(&mut self, name: &str) {
        let len = usize::min(name.len(), MAX_FILE_NAME - 1);
        self.name[..len].copy_from_slice(&name.as_bytes()[..len]);
        self.name[len..].fill(0);
    }
}

/// Filesystem capacities, fixed for the lifetime of one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsParams {
    /// Capacity of the inode table.
    pub max_inode_count: usize,
    /// Capacity of the data-block pool.
    pub max_block_count: usize,
    /// Capacity of the open-file table.
    pub max_open_files_count: usize,
    /// Size of each data block in bytes; also bounds directory fan-out and
    /// the maximum file size.
    pub block_size: usize,
}

impl Default for FsParams {
    fn default() -> Self {
        Self {
            max_inode_count: 64,
            max_block_count: 1024,
            max_open_files_count: 16,
            block_size: 1024,
        }
    }
}

impl FsParams {
    /// Number of directory entries one data block can hold.
    #[must_use]
    pub const fn max_dir_entries(&self) -> usize {
        self.block_size / size_of::<DirEntry>()
    }
}
