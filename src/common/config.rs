//! Configuration constants for the block tree file format.

/// Size of a block in bytes.
///
/// Every node and the file header occupy exactly one block. Block N is
/// located at file offset `N × BLOCK_SIZE`.
pub const BLOCK_SIZE: usize = 512;

/// Minimum degree `t` of the B-tree.
///
/// Every non-root node holds between `t - 1` and `2t - 1` keys.
pub const DEGREE: usize = 10;

/// Maximum number of keys in a node (`2t - 1`).
pub const MAX_KEYS: usize = 2 * DEGREE - 1;

/// Maximum number of children of a node.
pub const MAX_CHILDREN: usize = MAX_KEYS + 1;

/// Minimum number of keys in a non-root node (`t - 1`).
pub const MIN_KEYS: usize = DEGREE - 1;

/// Deepest descent the engine follows before declaring the file corrupt.
///
/// Non-root internal nodes have at least `DEGREE` children, so a tree of
/// `u64` keys never gets close to this.
pub const MAX_HEIGHT: usize = 32;

/// Number of decoded nodes kept in memory by the page cache.
pub const CACHE_CAPACITY: usize = 3;

/// Tag stored in the first 8 bytes of block 0.
pub const MAGIC: [u8; 8] = *b"4337PRJ3";

/// Size of each integer field on disk.
pub const FIELD_SIZE: usize = 8;

/// Bytes used by an encoded node before the zero padding.
///
/// block_id + parent_id + num_keys, then keys, values and children.
pub const NODE_ENCODED_SIZE: usize =
    3 * FIELD_SIZE + 2 * FIELD_SIZE * MAX_KEYS + FIELD_SIZE * MAX_CHILDREN;

/// Bytes used by an encoded header before the zero padding.
pub const HEADER_ENCODED_SIZE: usize = MAGIC.len() + 2 * FIELD_SIZE;

const _: () = assert!(NODE_ENCODED_SIZE <= BLOCK_SIZE);
const _: () = assert!(HEADER_ENCODED_SIZE <= BLOCK_SIZE);

/// What a block write waits for before returning.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Durability {
    /// `sync_data()` after every block write.
    #[default]
    Sync,
    /// Hand the bytes to the OS and return. A process crash loses nothing,
    /// a power loss may.
    Buffered,
}
