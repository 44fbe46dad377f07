//! Directories.
//!
//! A directory's single data block is an array of fixed-width
//! [`DirEntry`] records; fan-out is `block_size / size_of::<DirEntry>()`.
//! A free slot holds the `-1` inumber sentinel. All scans run under the
//! directory inode's lock, entries are copied in and out of the raw block
//! by offset.

use dataview::DataView;
use tfs_types::{DirEntry, InodeNo, MAX_FILE_NAME};

use super::{InodeTable, InodeType};
use crate::{data_block::BlockPool, delay::storage_delay, error::TfsError};

impl InodeTable {
    /// Stores `(name, ino)` in the first free entry of directory `dir`.
    ///
    /// Rejects empty names and names that do not leave room for the
    /// terminator; fails when every entry is taken.
    pub(crate) fn add_dir_entry(
        &self,
        dir: InodeNo,
        name: &str,
        ino: InodeNo,
        blocks: &BlockPool,
    ) -> Result<(), TfsError> {
        if name.is_empty() || name.len() > MAX_FILE_NAME - 1 {
            return Err(TfsError::InvalidFileName);
        }
        storage_delay();

        let slot = self.get(dir).write();
        let dir_inode = slot.as_ref().ok_or(TfsError::NotFound)?;
        if dir_inode.ty != InodeType::Directory {
            return Err(TfsError::NotADirectory(dir_inode.ty));
        }
        let bn = dir_inode
            .data_block
            .expect("directory must have a data block");

        let mut block = blocks.get(bn).write();
        let entry_count = block.len() / size_of::<DirEntry>();
        let view = DataView::from_mut(&mut block[..]);
        for i in 0..entry_count {
            let off = i * size_of::<DirEntry>();
            let mut de: DirEntry = view.read(off);
            if de.ino().is_none() {
                de.set_ino(Some(ino));
                de.set_name(name);
                view.write(off, &de);
                return Ok(());
            }
        }

        Err(TfsError::DirectoryFull)
    }

    /// Returns the inumber stored under `name` in directory `dir`, if any.
    pub(crate) fn find_in_dir(
        &self,
        dir: InodeNo,
        name: &str,
        blocks: &BlockPool,
    ) -> Result<Option<InodeNo>, TfsError> {
        storage_delay();

        let slot = self.get(dir).read();
        let dir_inode = slot.as_ref().ok_or(TfsError::NotFound)?;
        if dir_inode.ty != InodeType::Directory {
            return Err(TfsError::NotADirectory(dir_inode.ty));
        }
        let bn = dir_inode
            .data_block
            .expect("directory must have a data block");

        let block = blocks.get(bn).read();
        let entry_count = block.len() / size_of::<DirEntry>();
        let view = DataView::from(&block[..]);
        for i in 0..entry_count {
            let de: DirEntry = view.read(i * size_of::<DirEntry>());
            let Some(entry_ino) = de.ino() else { continue };
            if de.is_same_name(name) {
                return Ok(Some(entry_ino));
            }
        }

        Ok(None)
    }

    /// Removes the entry for `name` from directory `dir`.
    pub(crate) fn clear_dir_entry(
        &self,
        dir: InodeNo,
        name: &str,
        blocks: &BlockPool,
    ) -> Result<(), TfsError> {
        storage_delay();

        let slot = self.get(dir).write();
        let dir_inode = slot.as_ref().ok_or(TfsError::NotFound)?;
        if dir_inode.ty != InodeType::Directory {
            return Err(TfsError::NotADirectory(dir_inode.ty));
        }
        let bn = dir_inode
            .data_block
            .expect("directory must have a data block");

        let mut block = blocks.get(bn).write();
        let entry_count = block.len() / size_of::<DirEntry>();
        let view = DataView::from_mut(&mut block[..]);
        for i in 0..entry_count {
            let off = i * size_of::<DirEntry>();
            let de: DirEntry = view.read(off);
            if de.is_same_name(name) {
                view.write(off, &DirEntry::empty());
                return Ok(());
            }
        }

        Err(TfsError::NotFound)
    }
}
