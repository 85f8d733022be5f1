//! Block Store - low-level file I/O for index blocks.
//!
//! The [`BlockStore`] handles all direct file operations:
//! - Creating a file with an initialized header
//! - Opening and validating an existing file
//! - Reading and writing whole blocks

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::common::config::BLOCK_SIZE;
use crate::common::{BlockId, Durability, Error, Result};
use crate::storage::block::{Block, Header};

/// Manages disk I/O for a single index file.
///
/// # File Layout
/// ```text
/// ┌──────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Block 0  │ Block 1 │ Block 2 │  ...    │ Block N │
/// │ (header) │ (node)  │ (node)  │         │ (node)  │
/// └──────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0       512      1024    ...     N×512
/// ```
///
/// Nodes are written in allocation order and never reused.
///
/// # Durability
/// Every write reaches the OS before returning. With [`Durability::Sync`]
/// (the default) it is also followed by `sync_data()`.
pub struct BlockStore {
    file: File,
    path: PathBuf,
    durability: Durability,
}

impl BlockStore {
    /// Create a new index file holding only a fresh header.
    ///
    /// An existing file is truncated only when `overwrite` is true; asking
    /// the user is the caller's business.
    ///
    /// # Errors
    /// Returns `Error::AlreadyExists` if the file exists and `overwrite` is false.
    pub fn create<P: AsRef<Path>>(path: P, overwrite: bool, durability: Durability) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() && !overwrite {
            return Err(Error::AlreadyExists(path.to_path_buf()));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        let mut store = Self {
            file,
            path: path.to_path_buf(),
            durability,
        };
        store.write_header(&Header::new())?;

        info!(path = %path.display(), "block_store.created");
        Ok(store)
    }

    /// Open an existing index file and read its header.
    ///
    /// # Errors
    /// - `Error::FileNotFound` if the path doesn't exist
    /// - `Error::InvalidFormat` if block 0 is short, lacks the magic tag, or
    ///   declares a root or allocation counter outside the allocated range
    pub fn open<P: AsRef<Path>>(path: P, durability: Durability) -> Result<(Self, Header)> {
        let path = path.as_ref();
        let file = match OpenOptions::new().read(true).write(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::FileNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut store = Self {
            file,
            path: path.to_path_buf(),
            durability,
        };

        let header = match store.read_block(BlockId::NONE) {
            Ok(block) => Header::decode(&block),
            Err(Error::Io(e)) if e.kind() == io::ErrorKind::UnexpectedEof => Err(
                Error::InvalidFormat(format!("'{}' is shorter than one block", path.display())),
            ),
            Err(e) => Err(e),
        }?;

        if header.next_block_id.is_none() {
            return Err(Error::InvalidFormat(
                "header allocation counter points at block 0".into(),
            ));
        }
        if header.root_id >= header.next_block_id {
            return Err(Error::InvalidFormat(format!(
                "header root {} is not below the allocation counter {}",
                header.root_id, header.next_block_id
            )));
        }

        info!(
            path = %path.display(),
            root = header.root_id.0,
            next_block = header.next_block_id.0,
            "block_store.opened"
        );
        Ok((store, header))
    }

    /// Read a block from disk.
    ///
    /// # Errors
    /// - I/O error (`UnexpectedEof`) if the block lies past the end of the file
    /// - `Error::InvalidFormat` if the block's offset overflows
    pub fn read_block(&mut self, block_id: BlockId) -> Result<Block> {
        self.seek_to(block_id)?;

        let mut block = Block::new();
        self.file.read_exact(block.as_mut_slice())?;

        Ok(block)
    }

    /// Write a block to disk.
    ///
    /// Writing one block past the current end extends the file.
    pub fn write_block(&mut self, block_id: BlockId, block: &Block) -> Result<()> {
        self.seek_to(block_id)?;
        self.file.write_all(block.as_slice())?;
        self.file.flush()?;

        if self.durability == Durability::Sync {
            self.file.sync_data()?;
        }

        Ok(())
    }

    /// Persist the header into block 0.
    pub fn write_header(&mut self, header: &Header) -> Result<()> {
        self.write_block(BlockId::NONE, &header.encode())
    }

    /// Number of whole blocks in the file, header included.
    pub fn block_count(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len() / BLOCK_SIZE as u64)
    }

    /// Path of the backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub fn durability(&self) -> Durability {
        self.durability
    }

    fn seek_to(&mut self, block_id: BlockId) -> Result<()> {
        let offset = block_id
            .offset()
            .ok_or_else(|| Error::InvalidFormat(format!("{} lies past any file offset", block_id)))?;
        self.file.seek(SeekFrom::Start(offset))?;
        Ok(())
    }
}
