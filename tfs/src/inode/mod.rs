//! Inodes and the inode table.
//!
//! An inode describes a single file, the root directory, or a symbolic
//! link: its type, the number of bytes stored, the data block holding
//! them (at most one), and the number of directory entries pointing at
//! it. A symbolic link stores its target path in the inode itself and
//! owns no block.
//!
//! Slots move `FREE -> TAKEN` through the status vector when allocated
//! and back to `FREE` when the hard-link counter falls to zero. Every
//! slot owns a reader/writer lock guarding that inode's metadata and, by
//! extension, the contents of its data block.
//!
//! Lock order: an inode's own lock first, the status-vector lock second.
//! [`InodeTable::delete`] is the only operation that holds both.

use dataview::DataView;
use log::warn;
use tfs_types::{BlockNo, DirEntry, InodeNo};

use crate::{
    alloc::{SlotState, SlotStates},
    data_block::BlockPool,
    delay::storage_delay,
    error::TfsError,
    sync::RwLock,
};

mod directory;

/// What an inode describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum InodeType {
    #[strum(serialize = "regular file")]
    File,
    #[strum(serialize = "directory")]
    Directory,
    #[strum(serialize = "symbolic link")]
    SymLink,
}

/// Metadata record for one allocated inode.
#[derive(Debug)]
pub(crate) struct Inode {
    pub(crate) ty: InodeType,
    /// Bytes currently stored.
    pub(crate) size: usize,
    pub(crate) data_block: Option<BlockNo>,
    /// Directory entries pointing at this inode; the slot is freed when
    /// this reaches zero.
    pub(crate) nlink: usize,
    /// Absolute path this link points at; `SymLink` inodes only.
    pub(crate) target: Option<Box<str>>,
}

impl Inode {
    fn new(ty: InodeType) -> Self {
        Self {
            ty,
            size: 0,
            data_block: None,
            nlink: 1,
            target: None,
        }
    }
}

/// The inode table: one lockable slot per inumber plus the status vector.
#[derive(Debug)]
pub(crate) struct InodeTable {
    slots: Box<[RwLock<Option<Inode>>]>,
    states: SlotStates,
}

impl InodeTable {
    pub(crate) fn new(count: usize, block_size: usize) -> Self {
        let slots = (0..count).map(|_| RwLock::new(None)).collect();
        Self {
            slots,
            states: SlotStates::with_delay(count, block_size),
        }
    }

    /// Claims a free slot, without initializing it.
    fn alloc(&self) -> Result<InodeNo, TfsError> {
        let Some(index) = self.states.alloc() else {
            warn!("out of inodes");
            return Err(TfsError::OutOfInodes);
        };
        Ok(InodeNo::new(index.try_into().unwrap()))
    }

    /// Allocates and initializes a new inode.
    ///
    /// A directory gets one data block pre-filled with empty entries and
    /// `size = block_size`. Files and symbolic links start with `size = 0`
    /// and no block. If the pool is dry while building a directory, the
    /// half-built inode is rolled back through [`Self::delete`].
    pub(crate) fn create(&self, ty: InodeType, blocks: &BlockPool) -> Result<InodeNo, TfsError> {
        let ino = self.alloc()?;
        storage_delay();

        match ty {
            InodeType::Directory => {
                let bn = match blocks.alloc() {
                    Ok(bn) => bn,
                    Err(err) => {
                        *self.slot(ino).write() = Some(Inode::new(ty));
                        self.delete(ino, blocks);
                        return Err(err);
                    }
                };

                let block_size = {
                    let mut block = blocks.get(bn).write();
                    let block_size = block.len();
                    let view = DataView::from_mut(&mut block[..]);
                    for i in 0..block_size / size_of::<DirEntry>() {
                        view.write(i * size_of::<DirEntry>(), &DirEntry::empty());
                    }
                    block_size
                };

                *self.slot(ino).write() = Some(Inode {
                    size: block_size,
                    data_block: Some(bn),
                    ..Inode::new(ty)
                });
            }
            InodeType::File | InodeType::SymLink => {
                *self.slot(ino).write() = Some(Inode::new(ty));
            }
        }

        Ok(ino)
    }

    /// Drops one hard link to `ino`; frees the inode (and its data block)
    /// when no links remain.
    ///
    /// Takes the inode's write lock, then the status-vector lock, in that
    /// order.
    ///
    /// # Panics
    ///
    /// Panics when called on an unallocated inode or when the status
    /// vector disagrees with the slot; both mean a caller bug.
    pub(crate) fn delete(&self, ino: InodeNo, blocks: &BlockPool) {
        storage_delay();
        storage_delay();

        let mut slot = self.slot(ino).write();
        let mut states = self.states.lock();
        let inode = slot.as_mut().expect("delete of an unallocated inode");
        inode.nlink -= 1;
        if inode.nlink > 0 {
            return;
        }

        assert_eq!(
            states[ino.as_index()],
            SlotState::Taken,
            "inode {ino} freed twice",
        );
        states[ino.as_index()] = SlotState::Free;
        let data_block = inode.data_block.take();
        *slot = None;
        if let Some(bn) = data_block {
            blocks.free(bn);
        }
    }

    /// Returns the lock guarding inode `ino`.
    ///
    /// # Panics
    ///
    /// Panics if `ino` is out of range; inumbers only come from
    /// [`Self::create`] and directory entries, so that is always a bug.
    pub(crate) fn get(&self, ino: InodeNo) -> &RwLock<Option<Inode>> {
        storage_delay();
        self.slot(ino)
    }

    fn slot(&self, ino: InodeNo) -> &RwLock<Option<Inode>> {
        &self.slots[ino.as_index()]
    }

    /// Whether the slot for `ino` is currently allocated.
    #[cfg(test)]
    pub(crate) fn is_allocated(&self, ino: InodeNo) -> bool {
        self.states.is_taken(ino.as_index())
    }
}
