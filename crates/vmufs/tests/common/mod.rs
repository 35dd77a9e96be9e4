#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use vmufs::fat::{Fat, END_OF_CHAIN};
use vmufs::format::write_image;
use vmufs::image::{block_offset, BLOCK_SIZE, DIR_LAST_BLOCK, FAT_BLOCK};
use vmufs::DirEntry;

pub fn fixed_timestamp() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap()
}

/// Builds image bytes on top of a blank image.
pub struct ImageBuilder {
    bytes: Vec<u8>,
    fat: Fat,
}

impl ImageBuilder {
    pub fn new() -> Self {
        let mut bytes = Vec::new();
        write_image(&mut bytes, &fixed_timestamp()).expect("write blank image");
        Self {
            bytes,
            fat: Fat::blank(),
        }
    }

    pub fn entry(mut self, slot: usize, entry: DirEntry) -> Self {
        let block = DIR_LAST_BLOCK - (slot / 16) as u16;
        let offset = block_offset(block) as usize + (slot % 16) * 32;
        self.bytes[offset..offset + 32].copy_from_slice(&entry.encode());
        self
    }

    pub fn fat(mut self, block: u16, value: u16) -> Self {
        self.fat.set(block, value);
        self
    }

    /// Links `blocks` into one chain ending with the end marker.
    pub fn chain(mut self, blocks: &[u16]) -> Self {
        for pair in blocks.windows(2) {
            self.fat.set(pair[0], pair[1]);
        }
        if let Some(last) = blocks.last() {
            self.fat.set(*last, END_OF_CHAIN);
        }
        self
    }

    pub fn fill_block(mut self, block: u16, byte: u8) -> Self {
        let offset = block_offset(block) as usize;
        self.bytes[offset..offset + BLOCK_SIZE].fill(byte);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let offset = block_offset(FAT_BLOCK) as usize;
        self.bytes[offset..offset + BLOCK_SIZE].copy_from_slice(&self.fat.encode());
        self.bytes
    }

    pub fn write_to(self, dir: &Path) -> PathBuf {
        let path = dir.join("card.bin");
        fs::write(&path, self.build()).expect("write image");
        path
    }
}

/// The HELLO.TXT layout: slot 5, blocks 10 -> 11 -> 12, each block filled with
/// its own index.
pub fn hello_image() -> ImageBuilder {
    ImageBuilder::new()
        .entry(5, DirEntry::new_file("HELLO.TXT", 10, 3))
        .chain(&[10, 11, 12])
        .fill_block(10, 10)
        .fill_block(11, 11)
        .fill_block(12, 12)
}
