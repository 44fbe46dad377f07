//! Open-file table.
//!
//! Volatile state: one `{inumber, offset}` slot per open file, claimed
//! lowest-first, and the handle returned by `open` is the slot index.
//! Each entry carries its own mutex so two threads driving the same
//! handle serialize instead of racing the offset; the entry fields are
//! otherwise only touched under the inode's lock during `read`/`write`.

use tfs_types::{FileHandle, InodeNo};

use crate::{
    alloc::{SlotState, SlotStates},
    error::TfsError,
    sync::Mutex,
};

/// One open file: which inode, and where the next `read`/`write` lands.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenFile {
    pub(crate) ino: InodeNo,
    pub(crate) offset: usize,
    /// Writes through this handle go to end-of-file.
    pub(crate) append: bool,
}

#[derive(Debug)]
pub(crate) struct OpenFileTable {
    entries: Box<[Mutex<OpenFile>]>,
    states: SlotStates,
}

impl OpenFileTable {
    pub(crate) fn new(count: usize) -> Self {
        let entries = (0..count)
            .map(|_| {
                Mutex::new(OpenFile {
                    ino: InodeNo::ROOT,
                    offset: 0,
                    append: false,
                })
            })
            .collect();
        Self {
            entries,
            states: SlotStates::new(count),
        }
    }

    /// Claims the lowest-indexed free slot and records the open file.
    pub(crate) fn add(
        &self,
        ino: InodeNo,
        offset: usize,
        append: bool,
    ) -> Result<FileHandle, TfsError> {
        let Some(index) = self.states.alloc() else {
            return Err(TfsError::OutOfOpenFiles);
        };
        *self.entries[index].lock() = OpenFile {
            ino,
            offset,
            append,
        };
        Ok(FileHandle::new(index))
    }

    /// Releases the slot for `handle`; fails if the handle is out of
    /// range or not open.
    pub(crate) fn remove(&self, handle: FileHandle) -> Result<(), TfsError> {
        let index = handle.as_index();
        if index >= self.entries.len() {
            return Err(TfsError::BadFileHandle(handle));
        }
        let mut states = self.states.lock();
        if states[index] != SlotState::Taken {
            return Err(TfsError::BadFileHandle(handle));
        }
        states[index] = SlotState::Free;
        Ok(())
    }

    /// Returns the entry lock for `handle` after validating range and
    /// allocation state.
    pub(crate) fn get(&self, handle: FileHandle) -> Result<&Mutex<OpenFile>, TfsError> {
        let index = handle.as_index();
        if index >= self.entries.len() || !self.states.is_taken(index) {
            return Err(TfsError::BadFileHandle(handle));
        }
        Ok(&self.entries[index])
    }
}
