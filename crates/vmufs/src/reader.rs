//! File contents and attributes.

use crate::dir_entry::DirEntry;
use crate::directory::DirectorySnapshot;
use crate::error::{Error, Result};
use crate::image::{ImageStore, BLOCK_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    RegularFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permissions {
    /// `r--r--r--`
    ReadOnly,
    /// `rwxr-xr-x`, used for the root directory only.
    Traversable,
}

impl Permissions {
    pub fn bits(self) -> u32 {
        match self {
            Permissions::ReadOnly => 0o444,
            Permissions::Traversable => 0o755,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attributes {
    pub kind: FileKind,
    pub size: u64,
    pub permissions: Permissions,
    pub nlink: u32,
}

impl Attributes {
    pub fn root_directory() -> Self {
        Self {
            kind: FileKind::Directory,
            size: 0,
            permissions: Permissions::Traversable,
            nlink: 2,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

fn occupied_entry(snapshot: &DirectorySnapshot, slot: usize) -> Result<&DirEntry> {
    snapshot
        .entry(slot)
        .filter(|entry| entry.is_occupied())
        .ok_or(Error::NotFound)
}

pub fn get_attributes(snapshot: &DirectorySnapshot, slot: usize) -> Result<Attributes> {
    let entry = occupied_entry(snapshot, slot)?;
    Ok(Attributes {
        kind: FileKind::RegularFile,
        size: entry.size_bytes(),
        permissions: Permissions::ReadOnly,
        nlink: 1,
    })
}

/// Returns up to `length` bytes of the file in `slot` starting at `offset`.
///
/// The file is always a whole number of blocks long. Reading at or past the
/// end yields an empty buffer, and ranges running past the end are cut short.
pub fn read_range(
    snapshot: &DirectorySnapshot,
    slot: usize,
    offset: u64,
    length: u64,
) -> Result<Vec<u8>> {
    let entry = occupied_entry(snapshot, slot)?;
    let total = entry.size_bytes();
    if offset >= total {
        return Ok(Vec::new());
    }
    let end = offset + length.min(total - offset);

    let chain = snapshot.chain(slot).ok_or(Error::NotFound)?;

    let mut data = Vec::new();
    data.try_reserve_exact(total as usize)?;
    data.resize(total as usize, 0);

    let mut store = ImageStore::open(snapshot.image_path())?;
    for (block, chunk) in chain.blocks().iter().zip(data.chunks_exact_mut(BLOCK_SIZE)) {
        store.read_block_into(*block, chunk)?;
    }
    drop(store);

    log::trace!(
        "read slot {slot} [{offset}, {end}) of {total} bytes from blocks {:?}",
        chain.blocks()
    );

    data.truncate(end as usize);
    data.drain(..offset as usize);
    Ok(data)
}
