//! Read-only access to Dreamcast VMU memory-card images, plus a formatter that
//! writes byte-exact blank images.
//!
//! An image is a flat 128 KiB file: 200 user blocks, a reserved gap, a
//! 13-block single-level directory, one FAT block and a root block. Reading
//! always starts with [`directory::load`], which validates the whole image and
//! returns an immutable [`DirectorySnapshot`]. Everything else takes that
//! snapshot by reference.
//!
//! The engine never writes to an image it reads. It does assume that nothing
//! else writes to the image while a snapshot is in use; this is not checked.

pub mod bcd;
pub mod dir_entry;
pub mod directory;
pub mod error;
pub mod fat;
pub mod format;
pub mod image;
pub mod layout;
pub mod mount;
pub mod reader;
pub mod root;

pub use dir_entry::{CopyProtection, DirEntry, FileType};
pub use directory::{list_occupied, load, lookup_by_name, DirectorySnapshot};
pub use error::{Error, FormatError};
pub use fat::{resolve, Fat, FatChain};
pub use format::{create, create_with_options, load_options, FormatOptions};
pub use mount::Volume;
pub use reader::{get_attributes, read_range, Attributes, FileKind, Permissions};
pub use root::{read_root, RootBlock};
