//! B-tree node and its fixed block encoding.

use crate::common::config::{DEGREE, FIELD_SIZE, MAX_CHILDREN, MAX_KEYS};
use crate::common::{BlockId, Error, Result};

use super::block::Block;

/// One B-tree node, stored in exactly one block.
///
/// Slots `[0, num_keys)` of `keys` and `values` are occupied and strictly
/// ascending by key. A node is a leaf iff `children[0]` is `BlockId::NONE`;
/// an internal node with `k` keys has `k + 1` children.
///
/// # Layout (488 bytes, zero-padded to the block size)
/// ```text
/// Offset  Size      Field
/// ------  --------  -----
/// 0       8         block_id
/// 8       8         parent_id
/// 16      8         num_keys
/// 24      8 × 19    keys
/// 176     8 × 19    values
/// 328     8 × 20    children
/// ```
/// All fields are big-endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub block_id: BlockId,
    /// Informational only. Persisted for format compatibility but never
    /// followed by any algorithm.
    pub parent_id: BlockId,
    pub num_keys: usize,
    pub keys: [u64; MAX_KEYS],
    pub values: [u64; MAX_KEYS],
    pub children: [BlockId; MAX_CHILDREN],
}

impl Node {
    pub const OFFSET_BLOCK_ID: usize = 0;
    pub const OFFSET_PARENT_ID: usize = 8;
    pub const OFFSET_NUM_KEYS: usize = 16;
    pub const OFFSET_KEYS: usize = 24;
    pub const OFFSET_VALUES: usize = Self::OFFSET_KEYS + FIELD_SIZE * MAX_KEYS;
    pub const OFFSET_CHILDREN: usize = Self::OFFSET_KEYS + 2 * FIELD_SIZE * MAX_KEYS;

    /// Create an empty leaf living in `block_id`.
    pub fn new(block_id: BlockId) -> Self {
        Self {
            block_id,
            parent_id: BlockId::NONE,
            num_keys: 0,
            keys: [0; MAX_KEYS],
            values: [0; MAX_KEYS],
            children: [BlockId::NONE; MAX_CHILDREN],
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children[0].is_none()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.num_keys == MAX_KEYS
    }

    /// Occupied key slots.
    #[inline]
    pub fn keys(&self) -> &[u64] {
        &self.keys[..self.num_keys]
    }

    /// Occupied value slots.
    #[inline]
    pub fn values(&self) -> &[u64] {
        &self.values[..self.num_keys]
    }

    /// Child pointers in use: `num_keys + 1` for an internal node, none for a leaf.
    pub fn children(&self) -> &[BlockId] {
        if self.is_leaf() {
            &[]
        } else {
            &self.children[..self.num_keys + 1]
        }
    }

    /// Locate `key` among the occupied slots.
    ///
    /// `Ok(i)` if `keys[i] == key`, otherwise `Err(i)` where `i` is the first
    /// slot whose key is greater, which is also the child subtree that would
    /// contain `key`.
    #[inline]
    pub fn find(&self, key: u64) -> std::result::Result<usize, usize> {
        self.keys().binary_search(&key)
    }

    /// Insert an entry at `pos`, shifting larger entries right.
    ///
    /// # Panics
    /// Panics if the node is full or `pos > num_keys`.
    pub fn insert_entry(&mut self, pos: usize, key: u64, value: u64) {
        assert!(!self.is_full(), "insert into full node {}", self.block_id);
        assert!(pos <= self.num_keys);

        let n = self.num_keys;
        self.keys.copy_within(pos..n, pos + 1);
        self.values.copy_within(pos..n, pos + 1);
        self.keys[pos] = key;
        self.values[pos] = value;
        self.num_keys += 1;
    }

    /// Move the upper half of a full node into `sibling` and return the
    /// median entry, which the caller promotes into the parent.
    ///
    /// Afterwards `self` keeps entries `[0, t-1)` and `sibling` holds the
    /// former entries `[t, 2t-1)` and, for an internal node, the former
    /// children `[t, 2t)`. Vacated slots are zeroed.
    ///
    /// # Panics
    /// Panics if the node is not full or `sibling` is not empty.
    pub fn split_upper_into(&mut self, sibling: &mut Node) -> (u64, u64) {
        assert!(self.is_full(), "split of non-full node {}", self.block_id);
        assert_eq!(sibling.num_keys, 0);

        let upper = DEGREE - 1;
        sibling.keys[..upper].copy_from_slice(&self.keys[DEGREE..MAX_KEYS]);
        sibling.values[..upper].copy_from_slice(&self.values[DEGREE..MAX_KEYS]);
        if !self.is_leaf() {
            sibling.children[..DEGREE].copy_from_slice(&self.children[DEGREE..MAX_CHILDREN]);
            self.children[DEGREE..].fill(BlockId::NONE);
        }
        sibling.num_keys = upper;

        let median = (self.keys[DEGREE - 1], self.values[DEGREE - 1]);
        self.keys[DEGREE - 1..].fill(0);
        self.values[DEGREE - 1..].fill(0);
        self.num_keys = DEGREE - 1;
        median
    }

    /// Install a promoted entry at `index` with `right` as the child
    /// immediately after it.
    ///
    /// Keys and values at positions `>= index` and children at positions
    /// `> index` shift right by one.
    ///
    /// # Panics
    /// Panics if the node is full.
    pub fn insert_separator(&mut self, index: usize, key: u64, value: u64, right: BlockId) {
        let n = self.num_keys;
        self.insert_entry(index, key, value);
        self.children.copy_within(index + 1..n + 1, index + 2);
        self.children[index + 1] = right;
    }

    /// Encode into a zero-padded block.
    pub fn encode(&self) -> Block {
        let mut block = Block::new();
        block.put_u64(Self::OFFSET_BLOCK_ID, self.block_id.0);
        block.put_u64(Self::OFFSET_PARENT_ID, self.parent_id.0);
        block.put_u64(Self::OFFSET_NUM_KEYS, self.num_keys as u64);

        for (i, key) in self.keys.iter().enumerate() {
            block.put_u64(Self::OFFSET_KEYS + i * FIELD_SIZE, *key);
        }
        for (i, value) in self.values.iter().enumerate() {
            block.put_u64(Self::OFFSET_VALUES + i * FIELD_SIZE, *value);
        }
        for (i, child) in self.children.iter().enumerate() {
            block.put_u64(Self::OFFSET_CHILDREN + i * FIELD_SIZE, child.0);
        }
        block
    }

    /// Decode a node block.
    ///
    /// No validation is done on key or value contents.
    ///
    /// # Errors
    /// Returns `Error::InvalidFormat` if `num_keys` claims more slots than
    /// the key array holds.
    pub fn decode(block: &Block) -> Result<Self> {
        let num_keys = block.get_u64(Self::OFFSET_NUM_KEYS);
        if num_keys > MAX_KEYS as u64 {
            return Err(Error::InvalidFormat(format!(
                "node declares {} keys, at most {} fit",
                num_keys, MAX_KEYS
            )));
        }

        let mut node = Node::new(BlockId::new(block.get_u64(Self::OFFSET_BLOCK_ID)));
        node.parent_id = BlockId::new(block.get_u64(Self::OFFSET_PARENT_ID));
        node.num_keys = num_keys as usize;

        for i in 0..MAX_KEYS {
            node.keys[i] = block.get_u64(Self::OFFSET_KEYS + i * FIELD_SIZE);
            node.values[i] = block.get_u64(Self::OFFSET_VALUES + i * FIELD_SIZE);
        }
        for i in 0..MAX_CHILDREN {
            node.children[i] = BlockId::new(block.get_u64(Self::OFFSET_CHILDREN + i * FIELD_SIZE));
        }
        Ok(node)
    }
}
