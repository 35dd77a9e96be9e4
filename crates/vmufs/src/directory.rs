//! Loading the directory table and looking entries up.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::dir_entry::{DirEntry, NAME_LEN};
use crate::error::{Error, Result};
use crate::fat::{self, Fat, FatChain};
use crate::image::{ImageStore, DIR_FIRST_BLOCK, DIR_LAST_BLOCK, FAT_BLOCK, USER_BLOCKS};
use crate::layout;

/// Number of addressable directory slots. The 13 directory blocks could hold
/// 208 records; only the first 200 are part of the format.
pub const MAX_SLOTS: usize = 200;

/// A validated, immutable view of an image's directory and FAT.
///
/// Every slot is kept, used or not. Chains for all occupied slots were
/// resolved while loading, so a snapshot only exists for a structurally valid
/// image.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    image_path: PathBuf,
    entries: Vec<DirEntry>,
    fat: Fat,
    chains: Vec<Option<FatChain>>,
}

impl DirectorySnapshot {
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    pub fn entry(&self, slot: usize) -> Option<&DirEntry> {
        self.entries.get(slot)
    }

    pub fn fat(&self) -> &Fat {
        &self.fat
    }

    /// The chain resolved at load time, `None` for unused slots.
    pub fn chain(&self, slot: usize) -> Option<&FatChain> {
        self.chains.get(slot).and_then(Option::as_ref)
    }

    pub fn free_blocks(&self) -> usize {
        self.fat.free_blocks(USER_BLOCKS)
    }
}

/// Reads and validates the directory and FAT of the image at `image_path`.
///
/// The directory is read following its own chain, from block 253 down to block
/// 241. Any structural problem in any occupied slot fails the whole load.
pub fn load(image_path: &Path) -> Result<DirectorySnapshot> {
    let mut store = ImageStore::open(image_path)?;

    let mut entries = Vec::new();
    entries.try_reserve_exact(MAX_SLOTS)?;
    'blocks: for block_index in (DIR_FIRST_BLOCK..=DIR_LAST_BLOCK).rev() {
        let block = store.read_block(block_index)?;
        for record in block.chunks_exact(layout::dir_entry::SIZE) {
            if entries.len() == MAX_SLOTS {
                break 'blocks;
            }
            entries.push(DirEntry::decode(record));
        }
    }

    let fat = Fat::decode(&store.read_block(FAT_BLOCK)?);
    drop(store);

    let mut chains = Vec::new();
    chains.try_reserve_exact(entries.len())?;
    for (slot, entry) in entries.iter().enumerate() {
        let chain = if entry.is_occupied() {
            Some(fat::resolve(&fat, slot, entry).inspect_err(|err| {
                log::debug!("{}: {err}", image_path.display());
            })?)
        } else {
            None
        };
        chains.push(chain);
    }

    log::debug!(
        "{}: loaded {} slots, {} in use",
        image_path.display(),
        entries.len(),
        chains.iter().filter(|chain| chain.is_some()).count()
    );

    Ok(DirectorySnapshot {
        image_path: image_path.to_owned(),
        entries,
        fat,
        chains,
    })
}

/// Finds the first occupied slot whose name equals `segment` byte for byte.
///
/// Segments longer than a directory name can hold are rejected without
/// scanning.
pub fn lookup_by_name<'a>(
    snapshot: &'a DirectorySnapshot,
    segment: &str,
) -> Result<(usize, &'a DirEntry)> {
    let segment = segment.as_bytes();
    if segment.len() > NAME_LEN {
        return Err(Error::NotFound);
    }

    snapshot
        .entries
        .iter()
        .enumerate()
        .find(|(_, entry)| entry.matches_name(segment))
        .ok_or(Error::NotFound)
}

/// Occupied slots in slot order.
pub fn list_occupied(
    snapshot: &DirectorySnapshot,
) -> impl Iterator<Item = (usize, Cow<'_, str>)> + '_ {
    snapshot
        .entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| entry.is_occupied())
        .map(|(slot, entry)| (slot, entry.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fat::END_OF_CHAIN;
    use crate::image::{block_offset, BLOCK_SIZE, IMAGE_SIZE};
    use tempfile::tempdir;

    fn slot_offset(slot: usize) -> usize {
        let block = DIR_LAST_BLOCK - (slot / 16) as u16;
        block_offset(block) as usize + (slot % 16) * layout::dir_entry::SIZE
    }

    fn blank_image() -> Vec<u8> {
        let mut image = vec![0u8; IMAGE_SIZE as usize];
        let fat_start = block_offset(FAT_BLOCK) as usize;
        image[fat_start..fat_start + BLOCK_SIZE].copy_from_slice(&Fat::blank().encode());
        image
    }

    #[test]
    fn slots_follow_directory_chain_and_stop_at_200() {
        let mut image = blank_image();
        for slot in [0usize, 15, 16, 199] {
            let entry = DirEntry::new_file(&format!("S{slot}"), 0, 0);
            let offset = slot_offset(slot);
            image[offset..offset + 32].copy_from_slice(&entry.encode());
        }
        // Record 8 of block 241 would be slot 200; it must be ignored.
        let past_end = block_offset(DIR_FIRST_BLOCK) as usize + 8 * 32;
        let ghost = DirEntry::new_file("GHOST", 0, 0);
        image[past_end..past_end + 32].copy_from_slice(&ghost.encode());

        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("image.bin");
        std::fs::write(&path, image).expect("write image");

        let snapshot = load(&path).expect("load image");
        assert_eq!(snapshot.entries().len(), MAX_SLOTS);
        let listed: Vec<(usize, String)> = list_occupied(&snapshot)
            .map(|(slot, name)| (slot, name.into_owned()))
            .collect();
        assert_eq!(
            listed,
            vec![
                (0, "S0".to_string()),
                (15, "S15".to_string()),
                (16, "S16".to_string()),
                (199, "S199".to_string()),
            ]
        );
        assert!(matches!(lookup_by_name(&snapshot, "GHOST"), Err(Error::NotFound)));
    }

    #[test]
    fn lookup_returns_first_match() {
        let mut image = blank_image();
        for slot in [3usize, 9] {
            let entry = DirEntry::new_file("TWIN", slot as u16, 1);
            let offset = slot_offset(slot);
            image[offset..offset + 32].copy_from_slice(&entry.encode());
        }
        let fat_start = block_offset(FAT_BLOCK) as usize;
        for block in [3usize, 9] {
            image[fat_start + block * 2..fat_start + block * 2 + 2]
                .copy_from_slice(&END_OF_CHAIN.to_le_bytes());
        }

        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("image.bin");
        std::fs::write(&path, image).expect("write image");

        let snapshot = load(&path).expect("load image");
        let (slot, entry) = lookup_by_name(&snapshot, "TWIN").expect("lookup");
        assert_eq!(slot, 3);
        assert_eq!(entry.first_block, 3);
        assert_eq!(snapshot.chain(9).map(FatChain::blocks), Some(&[9u16][..]));
        assert_eq!(snapshot.free_blocks(), 198);
    }

    #[test]
    fn long_segment_is_not_found() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("image.bin");
        std::fs::write(&path, blank_image()).expect("write image");

        let snapshot = load(&path).expect("load image");
        assert!(matches!(
            lookup_by_name(&snapshot, "THIRTEENCHARS"),
            Err(Error::NotFound)
        ));
        assert!(matches!(lookup_by_name(&snapshot, ""), Err(Error::NotFound)));
    }
}
