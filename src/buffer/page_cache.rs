//! Page Cache - the bounded node caching layer.
//!
//! The [`PageCache`] provides:
//! - Read-through caching of decoded nodes
//! - Write-through persistence of every node change
//! - Strict least-recently-used eviction

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::buffer::CacheStats;
use crate::common::{BlockId, Error, Result};
use crate::storage::block::{Header, Node};
use crate::storage::BlockStore;

/// A bounded LRU cache from block id to decoded [`Node`], backed by a
/// [`BlockStore`].
///
/// # Architecture
/// ```text
/// ┌───────────────────────────────────────────────────┐
/// │                     PageCache                     │
/// │  ┌──────────────────────────┐  ┌───────────────┐  │
/// │  │ nodes: LruCache          │  │ store         │  │
/// │  │ BlockId → Node (MRU…LRU) │  │ BlockStore    │  │
/// │  └──────────────────────────┘  └───────────────┘  │
/// └───────────────────────────────────────────────────┘
/// ```
///
/// # Write-through
/// [`put`](Self::put) writes the block before it touches the cache, so the
/// cache never holds a node that exists only in memory and eviction never
/// needs to flush anything.
///
/// # Thread Safety
/// Both halves sit behind a `parking_lot::Mutex` so lookups work through
/// `&self` (a hit still reorders the LRU list). The tree that owns the
/// cache is single-writer; the locks are never held across each other.
pub struct PageCache {
    /// Decoded nodes in recency order.
    nodes: Mutex<LruCache<BlockId, Node>>,

    /// Handles all disk I/O.
    store: Mutex<BlockStore>,

    /// Performance statistics.
    stats: CacheStats,
}

impl PageCache {
    /// Create a cache holding at most `capacity` nodes.
    ///
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(store: BlockStore, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).expect("capacity must be > 0");

        Self {
            nodes: Mutex::new(LruCache::new(capacity)),
            store: Mutex::new(store),
            stats: CacheStats::new(),
        }
    }

    // ========================================================================
    // Public API: Nodes
    // ========================================================================

    /// Fetch a node, reading it from disk on a miss.
    ///
    /// The node becomes the most recently used entry either way.
    ///
    /// # Errors
    /// - `Error::InvalidFormat` for block 0 or an undecodable block
    /// - I/O errors from the disk read
    pub fn get(&self, block_id: BlockId) -> Result<Node> {
        if block_id.is_none() {
            return Err(Error::InvalidFormat(
                "block 0 holds the header, not a node".into(),
            ));
        }

        // Fast path: cache hit
        if let Some(node) = self.nodes.lock().get(&block_id) {
            self.stats.record_hit();
            return Ok(node.clone());
        }

        // Cache miss: load from disk
        self.stats.record_miss();
        let block = self.store.lock().read_block(block_id)?;
        let node = Node::decode(&block)?;

        self.admit(node.clone());
        Ok(node)
    }

    /// Write a node to disk, then make it the most recently used entry.
    ///
    /// # Errors
    /// I/O errors from the disk write. The cache is left untouched then.
    pub fn put(&self, node: &Node) -> Result<()> {
        self.store.lock().write_block(node.block_id, &node.encode())?;
        self.stats.record_write();

        self.admit(node.clone());
        Ok(())
    }

    /// Persist the file header. Headers are never cached.
    pub fn write_header(&self, header: &Header) -> Result<()> {
        self.store.lock().write_header(header)?;
        self.stats.record_write();
        Ok(())
    }

    // ========================================================================
    // Public API: Stats and info
    // ========================================================================

    /// Check residency without touching recency.
    pub fn contains(&self, block_id: BlockId) -> bool {
        self.nodes.lock().contains(&block_id)
    }

    /// Resident block ids, most recently used first.
    pub fn cached_ids(&self) -> Vec<BlockId> {
        self.nodes.lock().iter().map(|(id, _)| *id).collect()
    }

    /// Number of resident nodes.
    pub fn len(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident nodes.
    pub fn capacity(&self) -> usize {
        self.nodes.lock().cap().get()
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of blocks in the backing file, header included.
    pub fn block_count(&self) -> Result<u64> {
        self.store.lock().block_count()
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Insert or refresh a node, evicting the LRU entry when full.
    fn admit(&self, node: Node) {
        let block_id = node.block_id;
        let displaced = self.nodes.lock().push(block_id, node);

        // `push` also hands back the stale copy when refreshing the same key.
        if let Some((evicted, _)) = displaced {
            if evicted != block_id {
                self.stats.record_eviction();
                debug!(evicted = evicted.0, admitted = block_id.0, "page_cache.evict");
            }
        }
    }
}
