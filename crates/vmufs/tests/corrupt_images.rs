mod common;

use std::fs;

use common::{hello_image, ImageBuilder};
use tempfile::tempdir;
use vmufs::fat::{END_OF_CHAIN, FREE};
use vmufs::{load, DirEntry, Error, FormatError, Volume};

fn load_error(builder: ImageBuilder) -> FormatError {
    let tempdir = tempdir().expect("temp dir");
    let image = builder.write_to(tempdir.path());
    match load(&image) {
        Err(Error::Format(err)) => err,
        Err(other) => panic!("expected a format error, got {other}"),
        Ok(_) => panic!("corrupt image loaded"),
    }
}

#[test]
fn directory_overstating_size_fails_the_load() {
    let err = load_error(
        ImageBuilder::new()
            .entry(5, DirEntry::new_file("HELLO.TXT", 10, 3))
            .chain(&[10, 11]),
    );
    assert_eq!(
        err,
        FormatError::PrematureEnd {
            slot: 5,
            declared: 3,
            found: 2
        }
    );
}

#[test]
fn directory_understating_size_fails_the_load() {
    let err = load_error(
        ImageBuilder::new()
            .entry(5, DirEntry::new_file("HELLO.TXT", 10, 3))
            .chain(&[10, 11, 12, 13]),
    );
    assert_eq!(
        err,
        FormatError::MissingEnd {
            slot: 5,
            declared: 3,
            value: 13
        }
    );
}

#[test]
fn pointer_into_directory_fails_the_load() {
    for reserved in [241u16, 247, 253] {
        let err = load_error(hello_image().fat(11, reserved));
        assert_eq!(
            err,
            FormatError::ReservedBlock {
                slot: 5,
                block: reserved
            }
        );
    }
}

#[test]
fn free_block_in_chain_fails_the_load() {
    let err = load_error(hello_image().fat(11, 12).fat(12, FREE));
    assert_eq!(err, FormatError::FreeBlock { slot: 5, block: 12 });
}

#[test]
fn one_bad_file_hides_every_file() {
    let tempdir = tempdir().expect("temp dir");
    let image = hello_image()
        .entry(150, DirEntry::new_file("BROKEN", 50, 2))
        .fat(50, END_OF_CHAIN)
        .write_to(tempdir.path());

    let volume = Volume::new(&image);
    assert!(matches!(volume.list("/"), Err(Error::Format(_))));
    assert!(matches!(
        volume.read("/HELLO.TXT", 512, 0),
        Err(Error::Format(_))
    ));
    // The root directory itself never needs the image.
    assert!(volume.get_attributes("/").is_ok());
}

#[test]
fn unused_slots_are_not_validated() {
    let tempdir = tempdir().expect("temp dir");
    // A nameless slot pointing into the directory is ignored.
    let mut ghost = DirEntry::new_file("X", 245, 9);
    ghost.file_name = [0; 12];
    let image = hello_image().entry(9, ghost).write_to(tempdir.path());

    assert!(load(&image).is_ok());
}

#[test]
fn wrong_size_is_rejected_at_load() {
    let tempdir = tempdir().expect("temp dir");
    let path = tempdir.path().join("card.bin");

    let mut bytes = ImageBuilder::new().build();
    bytes.push(0);
    fs::write(&path, &bytes).expect("write oversized image");
    assert!(matches!(
        load(&path),
        Err(Error::Format(FormatError::WrongSize(131073)))
    ));

    bytes.truncate(512 * 255);
    fs::write(&path, &bytes).expect("write truncated image");
    assert!(matches!(
        load(&path),
        Err(Error::Format(FormatError::WrongSize(130560)))
    ));
}

#[test]
fn missing_image_is_an_io_error() {
    let tempdir = tempdir().expect("temp dir");
    let volume = Volume::new(tempdir.path().join("absent.bin"));
    let err = volume.list("/").expect_err("missing image");
    assert!(matches!(err, Error::IOError(_)));
    assert_eq!(err.errno(), -vmufs::mount::EIO);
}
