//! On-disk record layouts.
//!
//! Each record is described once as a list of fields. Decoders and encoders go
//! through [`Field::get`], [`Field::put`] and friends so the reader and the
//! formatter can never disagree about an offset.

use byteorder::{ByteOrder, LittleEndian};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(name: &'static str, offset: usize, width: usize) -> Self {
        Self {
            name,
            offset,
            width,
        }
    }

    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    pub fn bytes<'a>(&self, record: &'a [u8]) -> &'a [u8] {
        &record[self.offset..self.end()]
    }

    pub fn bytes_mut<'a>(&self, record: &'a mut [u8]) -> &'a mut [u8] {
        &mut record[self.offset..self.end()]
    }

    pub fn get_u8(&self, record: &[u8]) -> u8 {
        debug_assert_eq!(self.width, 1, "{} is not a byte field", self.name);
        record[self.offset]
    }

    pub fn put_u8(&self, record: &mut [u8], value: u8) {
        debug_assert_eq!(self.width, 1, "{} is not a byte field", self.name);
        record[self.offset] = value;
    }

    pub fn get_u16(&self, record: &[u8]) -> u16 {
        debug_assert_eq!(self.width, 2, "{} is not a u16 field", self.name);
        LittleEndian::read_u16(self.bytes(record))
    }

    pub fn put_u16(&self, record: &mut [u8], value: u16) {
        debug_assert_eq!(self.width, 2, "{} is not a u16 field", self.name);
        LittleEndian::write_u16(self.bytes_mut(record), value);
    }

    pub fn put_bytes(&self, record: &mut [u8], value: &[u8]) {
        let target = self.bytes_mut(record);
        let len = value.len().min(target.len());
        target[..len].copy_from_slice(&value[..len]);
        target[len..].fill(0);
    }
}

pub mod dir_entry {
    use super::Field;

    pub const SIZE: usize = 32;

    pub const FILE_TYPE: Field = Field::new("file_type", 0x00, 1);
    pub const COPY_PROTECT: Field = Field::new("copy_protect", 0x01, 1);
    pub const FIRST_BLOCK: Field = Field::new("first_block", 0x02, 2);
    pub const FILE_NAME: Field = Field::new("file_name", 0x04, 12);
    pub const TIMESTAMP: Field = Field::new("timestamp", 0x10, 8);
    pub const SIZE_BLOCKS: Field = Field::new("size_blocks", 0x18, 2);
    pub const HEADER_OFFSET: Field = Field::new("header_offset", 0x1A, 2);
    pub const RESERVED: Field = Field::new("reserved", 0x1C, 4);
}

pub mod root {
    use super::Field;

    pub const SIZE: usize = crate::image::BLOCK_SIZE;

    pub const SIGNATURE: Field = Field::new("signature", 0x00, 16);
    pub const COLOR: Field = Field::new("color", 0x10, 32);
    pub const TIMESTAMP: Field = Field::new("timestamp", 0x30, 8);
    pub const PADDING: Field = Field::new("padding", 0x38, 14);
    pub const FAT_BLOCK: Field = Field::new("fat_block", 0x46, 2);
    pub const FAT_SIZE: Field = Field::new("fat_size", 0x48, 2);
    pub const DIR_BLOCK: Field = Field::new("dir_block", 0x4A, 2);
    pub const DIR_SIZE: Field = Field::new("dir_size", 0x4C, 2);
    pub const ICON_SHAPE: Field = Field::new("icon_shape", 0x4E, 2);
    pub const USER_BLOCKS: Field = Field::new("user_blocks", 0x50, 2);
}
