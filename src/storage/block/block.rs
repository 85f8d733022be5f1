//! Block - the fundamental 512-byte unit of storage.
//!
//! A [`Block`] is a raw byte array that serves as the unit of I/O between
//! the [`BlockStore`](crate::storage::BlockStore) and the codecs. Integers
//! are stored big-endian in 8-byte fields.

use crate::common::config::{BLOCK_SIZE, FIELD_SIZE};

/// A block of data (512 bytes).
///
/// # Example
/// ```
/// use blocktree::storage::block::Block;
///
/// let mut block = Block::new();
/// block.put_u64(8, 0xABCD);
/// assert_eq!(block.get_u64(8), 0xABCD);
/// assert_eq!(block.as_slice()[15], 0xCD);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Block {
    data: [u8; BLOCK_SIZE],
}

impl Block {
    /// Create a new zeroed block.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; BLOCK_SIZE],
        }
    }

    /// Get immutable slice of block data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of block data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read the big-endian integer field starting at `offset`.
    ///
    /// # Panics
    /// Panics if the field extends past the end of the block.
    #[inline]
    pub fn get_u64(&self, offset: usize) -> u64 {
        let mut field = [0u8; FIELD_SIZE];
        field.copy_from_slice(&self.data[offset..offset + FIELD_SIZE]);
        u64::from_be_bytes(field)
    }

    /// Write `value` as a big-endian integer field starting at `offset`.
    ///
    /// # Panics
    /// Panics if the field extends past the end of the block.
    #[inline]
    pub fn put_u64(&mut self, offset: usize, value: u64) {
        self.data[offset..offset + FIELD_SIZE].copy_from_slice(&value.to_be_bytes());
    }

    /// Get the size of a block.
    #[inline]
    pub const fn size() -> usize {
        BLOCK_SIZE
    }
}

impl Default for Block {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.data.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        f.debug_struct("Block").field("used_bytes", &used).finish()
    }
}
