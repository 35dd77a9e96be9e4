//! The file allocation table and chain resolution.

use byteorder::{ByteOrder, LittleEndian};

use crate::dir_entry::DirEntry;
use crate::error::FormatError;
use crate::image::{
    Block, BLOCK_COUNT, BLOCK_SIZE, DIR_FIRST_BLOCK, DIR_LAST_BLOCK, FAT_BLOCK, LAST_DATA_BLOCK,
    ROOT_BLOCK,
};

pub const FREE: u16 = 0xFFFC;
pub const END_OF_CHAIN: u16 = 0xFFFA;

const ENTRY_SIZE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fat {
    entries: [u16; BLOCK_COUNT],
}

impl Fat {
    pub fn decode(block: &Block) -> Self {
        let mut entries = [0u16; BLOCK_COUNT];
        LittleEndian::read_u16_into(&block[..BLOCK_COUNT * ENTRY_SIZE], &mut entries);
        Self { entries }
    }

    /// Encodes the table into a full block. Bytes past the last entry are zero.
    pub fn encode(&self) -> Block {
        let mut block = [0u8; BLOCK_SIZE];
        LittleEndian::write_u16_into(&self.entries, &mut block[..BLOCK_COUNT * ENTRY_SIZE]);
        block
    }

    /// The table of a freshly formatted image: every data block free, the
    /// directory chained from its last block down to its first, and the FAT and
    /// root blocks terminated.
    pub fn blank() -> Self {
        let mut entries = [FREE; BLOCK_COUNT];
        entries[DIR_FIRST_BLOCK as usize] = END_OF_CHAIN;
        for index in DIR_FIRST_BLOCK + 1..=DIR_LAST_BLOCK {
            entries[index as usize] = index - 1;
        }
        entries[FAT_BLOCK as usize] = END_OF_CHAIN;
        entries[ROOT_BLOCK as usize] = END_OF_CHAIN;
        Self { entries }
    }

    pub fn get(&self, block: u16) -> Option<u16> {
        self.entries.get(block as usize).copied()
    }

    pub fn set(&mut self, block: u16, value: u16) {
        self.entries[block as usize] = value;
    }

    /// Number of blocks in `0..user_blocks` marked free.
    pub fn free_blocks(&self, user_blocks: u16) -> usize {
        self.entries[..user_blocks as usize]
            .iter()
            .filter(|value| **value == FREE)
            .count()
    }
}

/// Data blocks owned by one directory slot, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FatChain {
    blocks: Vec<u16>,
}

impl FatChain {
    pub fn blocks(&self) -> &[u16] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Follows the FAT from `entry.first_block` for exactly `entry.size_blocks`
/// blocks. The last block must carry the end-of-chain marker and no earlier
/// one may.
pub fn resolve(fat: &Fat, slot: usize, entry: &DirEntry) -> Result<FatChain, FormatError> {
    let declared = entry.size_blocks;
    if declared == 0 {
        return Ok(FatChain::default());
    }

    let first = check_pointer(slot, entry.first_block)?;
    let mut blocks = Vec::with_capacity((declared as usize).min(BLOCK_COUNT));
    blocks.push(first);

    let mut current = first;
    for step in 1..=declared {
        let value = fat
            .get(current)
            .ok_or(FormatError::InvalidPointer { slot, value: current })?;
        log::trace!("slot {slot}: FAT[{current}] = {value:#06x}");

        current = match value {
            FREE => return Err(FormatError::FreeBlock { slot, block: current }),
            END_OF_CHAIN if step == declared => break,
            END_OF_CHAIN => {
                return Err(FormatError::PrematureEnd {
                    slot,
                    declared,
                    found: step,
                })
            }
            value if step == declared => {
                return Err(FormatError::MissingEnd {
                    slot,
                    declared,
                    value,
                })
            }
            value => check_pointer(slot, value)?,
        };
        blocks.push(current);
    }

    Ok(FatChain { blocks })
}

fn check_pointer(slot: usize, value: u16) -> Result<u16, FormatError> {
    match value {
        0..=LAST_DATA_BLOCK => Ok(value),
        DIR_FIRST_BLOCK..=ROOT_BLOCK => Err(FormatError::ReservedBlock { slot, block: value }),
        value => Err(FormatError::InvalidPointer { slot, value }),
    }
}
