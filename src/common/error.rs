//! Error types for the block tree.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors reported by the block tree.
///
/// Every operation reports failures as a value. None of them leave the
/// engine in an undefined state; see [`crate::BTree`] for the one caveat
/// about partially applied splits.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the backing file or an interchange file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The path given to `open` (or to `load`) does not exist.
    #[error("file '{}' does not exist", .0.display())]
    FileNotFound(PathBuf),

    /// `create` was asked to replace an existing file without confirmation.
    #[error("file '{}' already exists", .0.display())]
    AlreadyExists(PathBuf),

    /// Block 0 does not carry the magic tag, or a block cannot be decoded.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// `search` did not find the key.
    #[error("key {0} not found")]
    KeyNotFound(u64),

    /// `insert` was given a key that is already stored.
    #[error("key {0} already exists")]
    DuplicateKey(u64),

    /// An operation other than create/open was attempted on a closed tree.
    #[error("no file is open")]
    NotOpen,

    /// A bulk-load line is not two comma-separated integers.
    #[error("malformed input on line {line}: {content:?}")]
    MalformedInput { line: usize, content: String },
}

impl Error {
    /// True for both a missing path and a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileNotFound(_) | Error::KeyNotFound(_))
    }
}
