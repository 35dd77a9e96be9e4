use std::borrow::Cow;

use chrono::NaiveDateTime;

use crate::bcd;
use crate::image::BLOCK_SIZE;
use crate::layout::dir_entry::*;

pub const NAME_LEN: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    None,
    Data,
    Game,
    Unknown(u8),
}

impl From<u8> for FileType {
    fn from(value: u8) -> Self {
        match value {
            0x00 => FileType::None,
            0x33 => FileType::Data,
            0xCC => FileType::Game,
            other => FileType::Unknown(other),
        }
    }
}

impl From<FileType> for u8 {
    fn from(value: FileType) -> Self {
        match value {
            FileType::None => 0x00,
            FileType::Data => 0x33,
            FileType::Game => 0xCC,
            FileType::Unknown(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyProtection {
    Allowed,
    Protected,
    Unknown(u8),
}

impl From<u8> for CopyProtection {
    fn from(value: u8) -> Self {
        match value {
            0x00 => CopyProtection::Allowed,
            0xFF => CopyProtection::Protected,
            other => CopyProtection::Unknown(other),
        }
    }
}

impl From<CopyProtection> for u8 {
    fn from(value: CopyProtection) -> Self {
        match value {
            CopyProtection::Allowed => 0x00,
            CopyProtection::Protected => 0xFF,
            CopyProtection::Unknown(other) => other,
        }
    }
}

/// One 32-byte directory slot, kept verbatim whether or not it is in use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub file_type: FileType,
    pub copy_protect: CopyProtection,
    pub first_block: u16,
    pub file_name: [u8; NAME_LEN],
    pub timestamp: [u8; bcd::TIMESTAMP_LEN],
    pub size_blocks: u16,
    pub header_offset: u16,
    pub reserved: [u8; 4],
}

impl Default for DirEntry {
    fn default() -> Self {
        Self {
            file_type: FileType::None,
            copy_protect: CopyProtection::Allowed,
            first_block: 0,
            file_name: [0; NAME_LEN],
            timestamp: [0; bcd::TIMESTAMP_LEN],
            size_blocks: 0,
            header_offset: 0,
            reserved: [0; 4],
        }
    }
}

impl DirEntry {
    pub fn decode(record: &[u8]) -> Self {
        let mut file_name = [0u8; NAME_LEN];
        file_name.copy_from_slice(FILE_NAME.bytes(record));
        let mut timestamp = [0u8; bcd::TIMESTAMP_LEN];
        timestamp.copy_from_slice(TIMESTAMP.bytes(record));
        let mut reserved = [0u8; 4];
        reserved.copy_from_slice(RESERVED.bytes(record));

        Self {
            file_type: FILE_TYPE.get_u8(record).into(),
            copy_protect: COPY_PROTECT.get_u8(record).into(),
            first_block: FIRST_BLOCK.get_u16(record),
            file_name,
            timestamp,
            size_blocks: SIZE_BLOCKS.get_u16(record),
            header_offset: HEADER_OFFSET.get_u16(record),
            reserved,
        }
    }

    pub fn encode(&self) -> [u8; SIZE] {
        let mut record = [0u8; SIZE];
        self.encode_into(&mut record);
        record
    }

    pub fn encode_into(&self, record: &mut [u8]) {
        FILE_TYPE.put_u8(record, self.file_type.into());
        COPY_PROTECT.put_u8(record, self.copy_protect.into());
        FIRST_BLOCK.put_u16(record, self.first_block);
        FILE_NAME.put_bytes(record, &self.file_name);
        TIMESTAMP.put_bytes(record, &self.timestamp);
        SIZE_BLOCKS.put_u16(record, self.size_blocks);
        HEADER_OFFSET.put_u16(record, self.header_offset);
        RESERVED.put_bytes(record, &self.reserved);
    }

    /// Builds a data-file entry. Names longer than 12 bytes are truncated.
    pub fn new_file(name: &str, first_block: u16, size_blocks: u16) -> Self {
        let mut file_name = [0u8; NAME_LEN];
        let bytes = name.as_bytes();
        let len = bytes.len().min(NAME_LEN);
        file_name[..len].copy_from_slice(&bytes[..len]);
        Self {
            file_type: FileType::Data,
            first_block,
            file_name,
            size_blocks,
            ..Self::default()
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.file_name[0] != 0
    }

    /// Name bytes up to the first zero byte.
    pub fn name_bytes(&self) -> &[u8] {
        let len = self
            .file_name
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(NAME_LEN);
        &self.file_name[..len]
    }

    pub fn name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name_bytes())
    }

    pub fn matches_name(&self, segment: &[u8]) -> bool {
        self.is_occupied() && self.name_bytes() == segment
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_blocks as u64 * BLOCK_SIZE as u64
    }

    pub fn created(&self) -> Option<NaiveDateTime> {
        bcd::decode_timestamp(&self.timestamp)
    }
}
