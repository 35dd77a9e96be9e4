use std::collections::TryReserveError;

/// Structural problems found in an image. Any of these aborts a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    WrongSize(u64),
    ReservedBlock { slot: usize, block: u16 },
    FreeBlock { slot: usize, block: u16 },
    PrematureEnd { slot: usize, declared: u16, found: u16 },
    MissingEnd { slot: usize, declared: u16, value: u16 },
    InvalidPointer { slot: usize, value: u16 },
    BadSignature,
}

#[derive(Debug)]
pub enum Error {
    NotFound,
    Format(FormatError),
    IOError(std::io::Error),
    OutOfMemory,
    AlreadyExists,
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FormatError::WrongSize(size) => {
                write!(f, "image is {size} bytes, expected {}", crate::image::IMAGE_SIZE)
            }
            FormatError::ReservedBlock { slot, block } => {
                write!(f, "slot {slot} references reserved block {block}")
            }
            FormatError::FreeBlock { slot, block } => {
                write!(f, "slot {slot} chains into free block {block}")
            }
            FormatError::PrematureEnd {
                slot,
                declared,
                found,
            } => write!(
                f,
                "slot {slot} declares {declared} blocks but its chain ends after {found}"
            ),
            FormatError::MissingEnd {
                slot,
                declared,
                value,
            } => write!(
                f,
                "slot {slot} declares {declared} blocks but its chain continues (next {value:#06x})"
            ),
            FormatError::InvalidPointer { slot, value } => {
                write!(f, "slot {slot} contains invalid FAT value {value:#06x}")
            }
            FormatError::BadSignature => write!(f, "root block signature is not 0x55"),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::NotFound => write!(f, "No such file"),
            Error::Format(err) => write!(f, "Image is of incorrect format: {err}"),
            Error::IOError(err) => write!(f, "{err:?}"),
            Error::OutOfMemory => write!(f, "Not enough memory"),
            Error::AlreadyExists => write!(f, "Target file already exists"),
            Error::InvalidArgument(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IOError(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Self {
        Error::OutOfMemory
    }
}
