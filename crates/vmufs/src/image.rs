//! Block geometry and raw block access over an image file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::error::{FormatError, Result};

pub const BLOCK_SIZE: usize = 512;
pub const BLOCK_COUNT: usize = 256;
pub const IMAGE_SIZE: u64 = (BLOCK_SIZE * BLOCK_COUNT) as u64;

pub const USER_BLOCKS: u16 = 200;
/// Highest block index a file chain may point at. Blocks 200..=240 are
/// normally unused but still addressable.
pub const LAST_DATA_BLOCK: u16 = 240;
pub const UNUSED_BLOCKS: u16 = 41;
pub const DIR_FIRST_BLOCK: u16 = 241;
pub const DIR_LAST_BLOCK: u16 = 253;
pub const DIR_BLOCKS: u16 = DIR_LAST_BLOCK - DIR_FIRST_BLOCK + 1;
pub const FAT_BLOCK: u16 = 254;
pub const ROOT_BLOCK: u16 = 255;

pub type Block = [u8; BLOCK_SIZE];

/// An open image whose size has been checked.
///
/// The file handle lives only as long as the store, so each logical operation
/// opens its own store and lets it drop on return.
pub struct ImageStore {
    file: File,
}

impl ImageStore {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        if size != IMAGE_SIZE {
            log::debug!("{} is {size} bytes, rejecting", path.display());
            return Err(FormatError::WrongSize(size).into());
        }
        Ok(Self { file })
    }

    pub fn read_block(&mut self, index: u16) -> Result<Block> {
        let mut block = [0u8; BLOCK_SIZE];
        self.read_block_into(index, &mut block)?;
        Ok(block)
    }

    pub fn read_block_into(&mut self, index: u16, buf: &mut [u8]) -> Result<()> {
        debug_assert!((index as usize) < BLOCK_COUNT);
        debug_assert_eq!(buf.len(), BLOCK_SIZE);
        self.file.seek(SeekFrom::Start(block_offset(index)))?;
        self.file.read_exact(buf)?;
        Ok(())
    }
}

pub fn block_offset(index: u16) -> u64 {
    index as u64 * BLOCK_SIZE as u64
}
