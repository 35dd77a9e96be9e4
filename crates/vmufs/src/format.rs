//! Writing blank images.

use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::dir_entry::DirEntry;
use crate::directory::MAX_SLOTS;
use crate::error::{Error, Result};
use crate::fat::Fat;
use crate::image::{BLOCK_SIZE, DIR_BLOCKS, UNUSED_BLOCKS, USER_BLOCKS};
use crate::layout;
use crate::root::RootBlock;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions {
    /// Timestamp recorded in the root block. Defaults to the local time when
    /// the image is written.
    pub timestamp: Option<NaiveDateTime>,
}

mod date_format {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(value) => serializer.serialize_some(&value.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserialize: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserialize)?;
        s.map(|s| NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub use date_format::FORMAT as TIMESTAMP_FORMAT;

#[derive(Debug, Default, Deserialize, Serialize)]
struct OptionsFile {
    #[serde(default)]
    format: FormatSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct FormatSection {
    #[serde(default, with = "date_format", skip_serializing_if = "Option::is_none")]
    timestamp: Option<NaiveDateTime>,
}

impl From<OptionsFile> for FormatOptions {
    fn from(file: OptionsFile) -> Self {
        Self {
            timestamp: file.format.timestamp,
        }
    }
}

impl FormatOptions {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file = toml::from_str::<OptionsFile>(s)
            .map_err(|e| Error::InvalidArgument(e.to_string()))?;
        Ok(file.into())
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        let file = OptionsFile {
            format: FormatSection {
                timestamp: self.timestamp,
            },
        };
        toml::to_string_pretty(&file)
    }
}

pub fn load_options(path: &Path) -> Result<FormatOptions> {
    let str = std::fs::read_to_string(path)?;
    FormatOptions::from_toml_str(&str)
}

/// Rejects names that are empty or that would place the image in another
/// directory.
pub fn validate_target_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidArgument("a filename is required".to_string()));
    }
    if name.chars().any(std::path::is_separator) {
        return Err(Error::InvalidArgument(format!(
            "\"{name}\" is not a valid filename, it should not contain a path separator"
        )));
    }
    Ok(())
}

pub fn create(target: &Path) -> Result<()> {
    create_with_options(target, &FormatOptions::default())
}

/// Writes a blank image to `target`, which must not exist yet.
///
/// The image is assembled in a temporary file next to the target and only
/// moved into place once complete, so a failure never leaves a partial image
/// behind.
pub fn create_with_options(target: &Path, options: &FormatOptions) -> Result<()> {
    if target.try_exists()? {
        return Err(Error::AlreadyExists);
    }

    let timestamp = options
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local());

    write_staged(target, |writer| write_image(writer, &timestamp))?;

    log::info!("formatted {} at {timestamp}", target.display());
    Ok(())
}

/// Runs `fill` against a temporary file in the target's directory and moves
/// the result to `target`. On any error the temporary file is removed.
fn write_staged<F>(target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = staging_file(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        fill(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist_noclobber(target).map_err(|err| {
        if err.error.kind() == ErrorKind::AlreadyExists {
            Error::AlreadyExists
        } else {
            Error::IOError(err.error)
        }
    })?;
    Ok(())
}

/// Temporary files default to 0600; request 0666 so the umask decides, as it
/// would for `File::create`.
#[cfg(unix)]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    tempfile::Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn staging_file(dir: &Path) -> std::io::Result<NamedTempFile> {
    NamedTempFile::new_in(dir)
}

/// Writes the five regions of a blank image in order.
pub fn write_image<W: Write + ?Sized>(writer: &mut W, timestamp: &NaiveDateTime) -> std::io::Result<()> {
    write_zero_blocks(writer, USER_BLOCKS)?;
    write_zero_blocks(writer, UNUSED_BLOCKS)?;
    write_directory(writer)?;
    writer.write_all(&Fat::blank().encode())?;
    writer.write_all(&RootBlock::new(timestamp).encode())?;
    Ok(())
}

fn write_zero_blocks<W: Write + ?Sized>(writer: &mut W, count: u16) -> std::io::Result<()> {
    let block = [0u8; BLOCK_SIZE];
    for _ in 0..count {
        writer.write_all(&block)?;
    }
    Ok(())
}

fn write_directory<W: Write + ?Sized>(writer: &mut W) -> std::io::Result<()> {
    let empty = DirEntry::default();
    let mut slots = 0;
    for _ in 0..DIR_BLOCKS {
        let mut block = [0u8; BLOCK_SIZE];
        for record in block.chunks_exact_mut(layout::dir_entry::SIZE) {
            if slots == MAX_SLOTS {
                break;
            }
            empty.encode_into(record);
            slots += 1;
        }
        writer.write_all(&block)?;
    }
    Ok(())
}
