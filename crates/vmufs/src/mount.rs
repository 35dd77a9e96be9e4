//! Path-based surface for a host filesystem binding.
//!
//! Paths are absolute and single-level: `/` is the only directory and every
//! file lives directly under it. Each call loads a fresh snapshot, so a
//! `Volume` holds no state besides the image path.

use std::path::{Path, PathBuf};

use crate::directory::{self, DirectorySnapshot};
use crate::error::{Error, Result};
use crate::reader::{self, Attributes};

pub const ROOT: &str = "/";

pub const ENOENT: i32 = 2;
pub const EIO: i32 = 5;
pub const ENOMEM: i32 = 12;
pub const EEXIST: i32 = 17;
pub const EINVAL: i32 = 22;

impl Error {
    /// Negative errno for a host binding. Only this layer deals in errno
    /// values.
    pub fn errno(&self) -> i32 {
        let code = match self {
            Error::NotFound => ENOENT,
            Error::Format(_) | Error::InvalidArgument(_) => EINVAL,
            Error::IOError(_) => EIO,
            Error::OutOfMemory => ENOMEM,
            Error::AlreadyExists => EEXIST,
        };
        -code
    }
}

#[derive(Debug, Clone)]
pub struct Volume {
    image_path: PathBuf,
}

impl Volume {
    pub fn new(image_path: impl Into<PathBuf>) -> Self {
        Self {
            image_path: image_path.into(),
        }
    }

    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    pub fn snapshot(&self) -> Result<DirectorySnapshot> {
        directory::load(&self.image_path)
    }

    pub fn get_attributes(&self, path: &str) -> Result<Attributes> {
        if path == ROOT {
            return Ok(Attributes::root_directory());
        }
        let segment = file_segment(path)?;
        let snapshot = self.snapshot()?;
        let (slot, _) = directory::lookup_by_name(&snapshot, segment)?;
        reader::get_attributes(&snapshot, slot)
    }

    /// Names in the root directory, starting with `.` and `..`.
    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        if path != ROOT {
            return Err(Error::NotFound);
        }
        let snapshot = self.snapshot()?;
        let mut names = vec![".".to_string(), "..".to_string()];
        names.extend(directory::list_occupied(&snapshot).map(|(_, name)| name.into_owned()));
        Ok(names)
    }

    pub fn open(&self, path: &str) -> Result<()> {
        let segment = file_segment(path)?;
        let snapshot = self.snapshot()?;
        directory::lookup_by_name(&snapshot, segment).map(|_| ())
    }

    /// Reads up to `size` bytes at `offset`. Negative offsets read from the
    /// start of the file.
    pub fn read(&self, path: &str, size: usize, offset: i64) -> Result<Vec<u8>> {
        let segment = file_segment(path)?;
        let snapshot = self.snapshot()?;
        let (slot, _) = directory::lookup_by_name(&snapshot, segment)?;
        reader::read_range(&snapshot, slot, offset.max(0) as u64, size as u64)
    }
}

/// Strips the leading separator. Anything nested is not found.
fn file_segment(path: &str) -> Result<&str> {
    match path.strip_prefix('/') {
        Some(segment) if !segment.is_empty() && !segment.contains('/') => Ok(segment),
        _ => Err(Error::NotFound),
    }
}
