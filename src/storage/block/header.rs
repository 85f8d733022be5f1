//! File header stored in block 0.
//!
//! The [`Header`] is the only piece of global engine state: the root
//! pointer and the block allocator counter.

use crate::common::config::MAGIC;
use crate::common::{BlockId, Error, Result};

use super::block::Block;

/// Metadata stored in block 0 of every index file.
///
/// # Layout (24 bytes, zero-padded to the block size)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       8     magic ("4337PRJ3")
/// 8       8     root_id (big-endian)
/// 16      8     next_block_id (big-endian)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Root node, or `BlockId::NONE` while the tree is empty.
    pub root_id: BlockId,
    /// Next block handed out by the allocator. Never reused.
    pub next_block_id: BlockId,
}

impl Header {
    /// Size of the header in bytes.
    pub const SIZE: usize = 24;

    /// Offset of each field within the header.
    pub const OFFSET_MAGIC: usize = 0;
    pub const OFFSET_ROOT_ID: usize = 8;
    pub const OFFSET_NEXT_BLOCK_ID: usize = 16;

    /// Header of a freshly created file: empty tree, block 1 is next.
    pub fn new() -> Self {
        Self {
            root_id: BlockId::NONE,
            next_block_id: BlockId::new(1),
        }
    }

    /// Check if the tree has no root yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root_id.is_none()
    }

    /// Encode into a zero-padded block.
    pub fn encode(&self) -> Block {
        let mut block = Block::new();
        block.as_mut_slice()[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + MAGIC.len()]
            .copy_from_slice(&MAGIC);
        block.put_u64(Self::OFFSET_ROOT_ID, self.root_id.0);
        block.put_u64(Self::OFFSET_NEXT_BLOCK_ID, self.next_block_id.0);
        block
    }

    /// Decode a header block.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if the magic tag does not match.
    pub fn decode(block: &Block) -> Result<Self> {
        let magic = &block.as_slice()[Self::OFFSET_MAGIC..Self::OFFSET_MAGIC + MAGIC.len()];
        if magic != MAGIC {
            return Err(Error::InvalidFormat(format!(
                "bad magic tag {:02x?}",
                magic
            )));
        }

        Ok(Self {
            root_id: BlockId::new(block.get_u64(Self::OFFSET_ROOT_ID)),
            next_block_id: BlockId::new(block.get_u64(Self::OFFSET_NEXT_BLOCK_ID)),
        })
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}
