//! The root block (block 255): signature, format timestamp and layout.

use std::path::Path;

use chrono::NaiveDateTime;

use crate::bcd;
use crate::error::{FormatError, Result};
use crate::image::{self, Block, ImageStore, BLOCK_SIZE};
use crate::layout::root::*;

pub const SIGNATURE_BYTE: u8 = 0x55;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootBlock {
    pub timestamp: [u8; bcd::TIMESTAMP_LEN],
    pub fat_block: u16,
    pub fat_size: u16,
    pub dir_block: u16,
    pub dir_size: u16,
    pub icon_shape: u16,
    pub user_blocks: u16,
}

impl RootBlock {
    /// The root block of a freshly formatted image.
    pub fn new(formatted_at: &NaiveDateTime) -> Self {
        Self {
            timestamp: bcd::encode_timestamp(formatted_at),
            fat_block: image::FAT_BLOCK,
            fat_size: 1,
            dir_block: image::DIR_LAST_BLOCK,
            dir_size: image::DIR_BLOCKS,
            icon_shape: 0,
            user_blocks: image::USER_BLOCKS,
        }
    }

    pub fn decode(block: &[u8]) -> std::result::Result<Self, FormatError> {
        if SIGNATURE.bytes(block).iter().any(|b| *b != SIGNATURE_BYTE) {
            return Err(FormatError::BadSignature);
        }
        let mut timestamp = [0u8; bcd::TIMESTAMP_LEN];
        timestamp.copy_from_slice(TIMESTAMP.bytes(block));

        Ok(Self {
            timestamp,
            fat_block: FAT_BLOCK.get_u16(block),
            fat_size: FAT_SIZE.get_u16(block),
            dir_block: DIR_BLOCK.get_u16(block),
            dir_size: DIR_SIZE.get_u16(block),
            icon_shape: ICON_SHAPE.get_u16(block),
            user_blocks: USER_BLOCKS.get_u16(block),
        })
    }

    pub fn encode(&self) -> Block {
        let mut block = [0u8; BLOCK_SIZE];
        SIGNATURE.bytes_mut(&mut block).fill(SIGNATURE_BYTE);
        TIMESTAMP.put_bytes(&mut block, &self.timestamp);
        FAT_BLOCK.put_u16(&mut block, self.fat_block);
        FAT_SIZE.put_u16(&mut block, self.fat_size);
        DIR_BLOCK.put_u16(&mut block, self.dir_block);
        DIR_SIZE.put_u16(&mut block, self.dir_size);
        ICON_SHAPE.put_u16(&mut block, self.icon_shape);
        USER_BLOCKS.put_u16(&mut block, self.user_blocks);
        block
    }

    pub fn formatted_at(&self) -> Option<NaiveDateTime> {
        bcd::decode_timestamp(&self.timestamp)
    }
}

pub fn read_root(image_path: &Path) -> Result<RootBlock> {
    let mut store = ImageStore::open(image_path)?;
    let block = store.read_block(image::ROOT_BLOCK)?;
    Ok(RootBlock::decode(&block)?)
}
