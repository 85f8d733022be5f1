//! Block identifier type.

use std::fmt;

use crate::common::config::BLOCK_SIZE;

/// Identifies a block in the index file.
///
/// Block 0 always holds the file header, so the value 0 doubles as the
/// "no block" marker in child pointers and in the header's root pointer.
///
/// # Example
/// ```
/// use blocktree::BlockId;
///
/// let id = BlockId::new(3);
/// assert!(!id.is_none());
/// assert_eq!(id.offset(), Some(3 * 512));
/// assert_eq!(BlockId::new(u64::MAX).offset(), None);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u64);

impl BlockId {
    /// The header block, and the "absent" sentinel everywhere else.
    pub const NONE: BlockId = BlockId(0);

    /// Create a new BlockId.
    #[inline]
    pub fn new(id: u64) -> Self {
        BlockId(id)
    }

    /// Check if this is the absent sentinel.
    #[inline]
    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Byte offset of this block in the file, or `None` if it does not fit
    /// in a `u64`.
    #[inline]
    pub fn offset(&self) -> Option<u64> {
        self.0.checked_mul(BLOCK_SIZE as u64)
    }

    /// The id after this one, or `None` at `u64::MAX`.
    #[inline]
    pub fn next(&self) -> Option<BlockId> {
        self.0.checked_add(1).map(BlockId)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "Block(NONE)")
        } else {
            write!(f, "Block({})", self.0)
        }
    }
}
