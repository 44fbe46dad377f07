//! The user-facing file operations.
//!
//! Each operation resolves names against the root directory, takes the
//! locks it needs in the fixed order (open-file entry, then inode, then
//! allocator / block), and reports failure through [`TfsError`]. Nothing
//! blocks except lock acquisition and the simulated storage delay.

use std::{
    fs::File,
    io::Read as _,
    path::Path,
};

use tfs_types::{FileHandle, InodeNo, OpenFlags};

use crate::{FileSystem, error::TfsError, inode::InodeType, path};

/// Hop budget for symbolic-link resolution; a chain longer than this (or
/// a cycle) fails with [`TfsError::TooManyLinks`].
const MAX_SYMLINK_HOPS: usize = 8;

impl FileSystem {
    /// Resolves an absolute pathname against the root directory.
    fn lookup(&self, path: &str) -> Result<Option<InodeNo>, TfsError> {
        let name = path::file_name(path)?;
        self.inodes.find_in_dir(InodeNo::ROOT, name, &self.blocks)
    }

    /// Follows symbolic links starting at `ino` until a non-link inode.
    ///
    /// Each hop is one root-directory lookup of the link's target; a
    /// dangling target fails with [`TfsError::NotFound`].
    fn resolve_symlinks(&self, mut ino: InodeNo) -> Result<InodeNo, TfsError> {
        for _ in 0..MAX_SYMLINK_HOPS {
            let target = {
                let slot = self.inodes.get(ino).read();
                let inode = slot.as_ref().ok_or(TfsError::NotFound)?;
                if inode.ty != InodeType::SymLink {
                    return Ok(ino);
                }
                inode
                    .target
                    .clone()
                    .expect("symbolic link must carry a target")
            };
            ino = self.lookup(&target)?.ok_or(TfsError::NotFound)?;
        }
        Err(TfsError::TooManyLinks)
    }

    /// Opens a file in the root directory, returning its handle.
    ///
    /// Symbolic links are followed first. [`OpenFlags::TRUNC`] discards
    /// existing contents; [`OpenFlags::APPEND`] starts the handle at
    /// end-of-file and keeps every write there; [`OpenFlags::CREATE`]
    /// creates the file when the name does not resolve.
    ///
    /// If the open-file table is full right after a fresh create, the
    /// file stays created; only the open fails.
    pub fn open(&self, path: &str, mode: OpenFlags) -> Result<FileHandle, TfsError> {
        let name = path::file_name(path)?;
        let append = mode.contains(OpenFlags::APPEND);

        match self.inodes.find_in_dir(InodeNo::ROOT, name, &self.blocks)? {
            Some(found) => {
                let ino = self.resolve_symlinks(found)?;
                let offset = {
                    let mut slot = self.inodes.get(ino).write();
                    let inode = slot.as_mut().ok_or(TfsError::NotFound)?;
                    if mode.contains(OpenFlags::TRUNC)
                        && let Some(bn) = inode.data_block.take()
                    {
                        self.blocks.free(bn);
                        inode.size = 0;
                    }
                    if append { inode.size } else { 0 }
                };
                self.open_files.add(ino, offset, append)
            }
            None if mode.contains(OpenFlags::CREATE) => {
                let ino = self.inodes.create(InodeType::File, &self.blocks)?;
                if let Err(err) = self.inodes.add_dir_entry(InodeNo::ROOT, name, ino, &self.blocks)
                {
                    self.inodes.delete(ino, &self.blocks);
                    return Err(err);
                }
                self.open_files.add(ino, 0, append)
            }
            None => Err(TfsError::NotFound),
        }
    }

    /// Closes a handle. Fails if the handle is not open.
    pub fn close(&self, handle: FileHandle) -> Result<(), TfsError> {
        self.open_files.remove(handle)
    }

    /// Reads from the handle's position into `buf`, advancing the
    /// position. Returns the number of bytes read, possibly 0 at
    /// end-of-file.
    pub fn read(&self, handle: FileHandle, buf: &mut [u8]) -> Result<usize, TfsError> {
        let entry = self.open_files.get(handle)?;
        let mut file = entry.lock();

        let slot = self.inodes.get(file.ino).read();
        let inode = slot
            .as_ref()
            .ok_or(TfsError::HandleRevoked(handle, file.ino))?;

        let to_read = usize::min(buf.len(), inode.size.saturating_sub(file.offset));
        if to_read > 0 {
            let bn = inode
                .data_block
                .expect("file with contents must have a data block");
            let block = self.blocks.get(bn).read();
            buf[..to_read].copy_from_slice(&block[file.offset..file.offset + to_read]);
            file.offset += to_read;
        }
        Ok(to_read)
    }

    /// Writes `buf` at the handle's position, advancing it. The write is
    /// clamped to the end of the file's single block; the clamped byte
    /// count is returned, 0 once the block is full.
    pub fn write(&self, handle: FileHandle, buf: &[u8]) -> Result<usize, TfsError> {
        let entry = self.open_files.get(handle)?;
        let mut file = entry.lock();

        let mut slot = self.inodes.get(file.ino).write();
        let inode = slot
            .as_mut()
            .ok_or(TfsError::HandleRevoked(handle, file.ino))?;

        if file.append {
            // append handles re-position to end-of-file while the inode
            // write lock pins the size
            file.offset = inode.size;
        }

        let to_write = usize::min(
            buf.len(),
            self.params.block_size.saturating_sub(file.offset),
        );
        if to_write > 0 {
            let bn = match inode.data_block {
                Some(bn) => bn,
                None => {
                    let bn = self.blocks.alloc()?;
                    inode.data_block = Some(bn);
                    bn
                }
            };
            let mut block = self.blocks.get(bn).write();
            block[file.offset..file.offset + to_write].copy_from_slice(&buf[..to_write]);
            file.offset += to_write;
            inode.size = usize::max(inode.size, file.offset);
        }
        Ok(to_write)
    }

    /// Creates a hard link `link_name` to `target`.
    ///
    /// The target must resolve and must not itself be a symbolic link.
    pub fn link(&self, target: &str, link_name: &str) -> Result<(), TfsError> {
        let name = path::file_name(link_name)?;
        let target_ino = self.lookup(target)?.ok_or(TfsError::NotFound)?;

        {
            let slot = self.inodes.get(target_ino).read();
            let inode = slot.as_ref().ok_or(TfsError::NotFound)?;
            if inode.ty == InodeType::SymLink {
                return Err(TfsError::HardLinkToSymlink);
            }
        }

        self.inodes
            .add_dir_entry(InodeNo::ROOT, name, target_ino, &self.blocks)?;

        let mut slot = self.inodes.get(target_ino).write();
        let inode = slot.as_mut().ok_or(TfsError::NotFound)?;
        inode.nlink += 1;
        Ok(())
    }

    /// Creates a symbolic link `link_name` whose target is the pathname
    /// `target`.
    ///
    /// The target must resolve at creation time and fit in one block.
    pub fn sym_link(&self, target: &str, link_name: &str) -> Result<(), TfsError> {
        let name = path::file_name(link_name)?;
        self.lookup(target)?.ok_or(TfsError::NotFound)?;
        if target.len() > self.params.block_size {
            return Err(TfsError::SymlinkTargetTooLong);
        }

        let ino = self.inodes.create(InodeType::SymLink, &self.blocks)?;
        {
            let mut slot = self.inodes.get(ino).write();
            let inode = slot.as_mut().expect("freshly created inode is allocated");
            inode.target = Some(target.into());
        }

        if let Err(err) = self.inodes.add_dir_entry(InodeNo::ROOT, name, ino, &self.blocks) {
            self.inodes.delete(ino, &self.blocks);
            return Err(err);
        }
        Ok(())
    }

    /// Removes the directory entry for `path` and drops its hard link.
    ///
    /// The inode is freed when that was the last link, even while open
    /// handles still reference it; such handles fail on their next
    /// `read`/`write` (or observe whichever file re-uses the slot).
    pub fn unlink(&self, path: &str) -> Result<(), TfsError> {
        let name = path::file_name(path)?;
        let ino = self
            .inodes
            .find_in_dir(InodeNo::ROOT, name, &self.blocks)?
            .ok_or(TfsError::NotFound)?;

        self.inodes.clear_dir_entry(InodeNo::ROOT, name, &self.blocks)?;
        self.inodes.delete(ino, &self.blocks);
        Ok(())
    }

    /// Copies up to one block from an external file into `dst`,
    /// creating it if needed. The copy starts at offset 0, so a repeat
    /// copy overwrites rather than appends. Returns the bytes written.
    pub fn copy_from_external(
        &self,
        src: impl AsRef<Path>,
        dst: &str,
    ) -> Result<usize, TfsError> {
        let handle = self.open(dst, OpenFlags::CREATE)?;
        let result = self.copy_in(src.as_ref(), handle);
        let closed = self.close(handle);
        let written = result?;
        closed?;
        Ok(written)
    }

    fn copy_in(&self, src: &Path, handle: FileHandle) -> Result<usize, TfsError> {
        let block_size = self.params.block_size;
        let mut buf = Vec::with_capacity(block_size);
        File::open(src)?
            .take(block_size.try_into().unwrap())
            .read_to_end(&mut buf)?;
        self.write(handle, &buf)
    }
}
