//! Node caching.
//!
//! The page cache sits between the B-tree and the block store. It keeps a
//! handful of decoded nodes in memory and writes every change straight
//! through to disk.
//!
//! # Components
//! - [`PageCache`] - Bounded LRU cache of decoded nodes
//! - [`CacheStats`] - Hit/miss/eviction counters

mod page_cache;
mod stats;

pub use page_cache::PageCache;
pub use stats::{CacheStats, StatsSnapshot};
