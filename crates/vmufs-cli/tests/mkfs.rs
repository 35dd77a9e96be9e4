use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

fn vmufs(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_vmufs"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("run vmufs")
}

#[test]
fn mkfs_then_ls_shows_an_empty_card() {
    let tempdir = tempdir().expect("temp dir");
    let dir = tempdir.path();

    let output = vmufs(dir, &["mkfs", "--timestamp", "2024-01-02 03:04:05", "card.bin"]);
    assert!(output.status.success(), "mkfs failed: {output:?}");
    assert_eq!(
        fs::metadata(dir.join("card.bin")).expect("image metadata").len(),
        131072
    );

    let output = vmufs(dir, &["ls", "card.bin"]);
    assert!(output.status.success(), "ls failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("200 blocks free"), "unexpected listing: {stdout}");

    let output = vmufs(dir, &["info", "card.bin"]);
    assert!(output.status.success(), "info failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2024-01-02 03:04:05"), "unexpected info: {stdout}");
}

#[test]
fn mkfs_refuses_existing_targets_and_separators() {
    let tempdir = tempdir().expect("temp dir");
    let dir = tempdir.path();
    fs::write(dir.join("taken.bin"), b"keep").expect("write existing file");

    let output = vmufs(dir, &["mkfs", "taken.bin"]);
    assert!(!output.status.success());
    assert_eq!(fs::read(dir.join("taken.bin")).expect("read file"), b"keep");

    let output = vmufs(dir, &["mkfs", "sub/card.bin"]);
    assert!(!output.status.success());
    assert!(!dir.join("sub").exists());
}

#[test]
fn stat_reports_root_directory() {
    let tempdir = tempdir().expect("temp dir");
    let dir = tempdir.path();
    assert!(vmufs(dir, &["mkfs", "card.bin"]).status.success());

    let output = vmufs(dir, &["stat", "card.bin", "/"]);
    assert!(output.status.success(), "stat failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Directory"));
    assert!(stdout.contains("755"));

    let output = vmufs(dir, &["cat", "card.bin", "MISSING"]);
    assert!(!output.status.success());
}

#[test]
fn ls_shows_chain_length_and_creation_time() {
    use chrono::NaiveDateTime;
    use vmufs::fat::{Fat, END_OF_CHAIN};
    use vmufs::image::{block_offset, BLOCK_SIZE, DIR_LAST_BLOCK, FAT_BLOCK};
    use vmufs::{bcd, DirEntry};

    let tempdir = tempdir().expect("temp dir");
    let dir = tempdir.path();
    assert!(vmufs(dir, &["mkfs", "card.bin"]).status.success());

    let path = dir.join("card.bin");
    let mut bytes = fs::read(&path).expect("read image");
    let created = NaiveDateTime::parse_from_str("2023-06-07 08:09:10", "%Y-%m-%d %H:%M:%S")
        .expect("parse timestamp");
    let mut entry = DirEntry::new_file("SAVE.DAT", 20, 2);
    entry.timestamp = bcd::encode_timestamp(&created);
    let offset = block_offset(DIR_LAST_BLOCK) as usize;
    bytes[offset..offset + 32].copy_from_slice(&entry.encode());

    let mut fat = Fat::blank();
    fat.set(20, 21);
    fat.set(21, END_OF_CHAIN);
    let offset = block_offset(FAT_BLOCK) as usize;
    bytes[offset..offset + BLOCK_SIZE].copy_from_slice(&fat.encode());
    fs::write(&path, bytes).expect("write image");

    let output = vmufs(dir, &["ls", "card.bin"]);
    assert!(output.status.success(), "ls failed: {output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|line| line.contains("SAVE.DAT"))
        .unwrap_or_else(|| panic!("missing entry: {stdout}"));
    assert!(line.contains("1024"), "unexpected size: {line}");
    assert!(line.contains("  2 "), "unexpected block count: {line}");
    assert!(line.contains("2023-06-07 08:09:10"), "unexpected timestamp: {line}");
}
