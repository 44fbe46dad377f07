//! Data-block pool.
//!
//! A fixed pool of `max_block_count` blocks of `block_size` bytes, the
//! sole storage unit of the filesystem. Blocks are untyped byte regions;
//! a block's contents belong to the inode that owns it, and the owning
//! inode's lock serializes all content access. Each block additionally
//! carries its own reader/writer lock so that discipline holds in safe
//! code.

use log::warn;
use tfs_types::BlockNo;

use crate::{alloc::SlotStates, delay::storage_delay, error::TfsError, sync::RwLock};

#[derive(Debug)]
pub(crate) struct BlockPool {
    blocks: Box<[RwLock<Box<[u8]>>]>,
    states: SlotStates,
}

impl BlockPool {
    pub(crate) fn new(count: usize, block_size: usize) -> Self {
        let blocks = (0..count)
            .map(|_| RwLock::new(vec![0; block_size].into_boxed_slice()))
            .collect();
        Self {
            blocks,
            states: SlotStates::with_delay(count, block_size),
        }
    }

    /// Claims the lowest-numbered free block.
    pub(crate) fn alloc(&self) -> Result<BlockNo, TfsError> {
        let Some(index) = self.states.alloc() else {
            warn!("out of data blocks");
            return Err(TfsError::OutOfBlocks);
        };
        Ok(BlockNo::new(index.try_into().unwrap()))
    }

    /// Releases a block.
    ///
    /// Nothing here stops freeing a block an inode still references;
    /// callers sequence operations so that cannot happen.
    pub(crate) fn free(&self, bn: BlockNo) {
        storage_delay();
        self.states.free(bn.as_index());
    }

    /// Returns the lock guarding the contents of block `bn`.
    ///
    /// # Panics
    ///
    /// Panics if `bn` is outside the pool; block numbers only come from
    /// [`Self::alloc`], so that is always a bug.
    pub(crate) fn get(&self, bn: BlockNo) -> &RwLock<Box<[u8]>> {
        storage_delay();
        &self.blocks[bn.as_index()]
    }
}
