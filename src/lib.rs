//! blocktree - a single-file, disk-resident B-tree of integer keys and values.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            blocktree                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │               Index Layer (index/btree/)                │   │
//! │  │     BTree: insert · search · print · extract · load     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Page Cache (buffer/)                     │   │
//! │  │     PageCache: 3-node LRU, write-through + CacheStats    │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │     BlockStore + Block + Header / Node codecs            │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (BlockId, Error, config)
//! - [`storage`] - Disk I/O and block formats
//! - [`buffer`] - Node cache and its statistics
//! - [`index`] - The B-tree engine
//!
//! # Quick Start
//! ```no_run
//! use blocktree::{BTree, Error};
//!
//! let mut tree = BTree::new();
//! tree.create("my_index.idx", false)?;
//!
//! tree.insert(1, 10)?;
//! tree.insert(3, 30)?;
//! assert!(matches!(tree.insert(1, 11), Err(Error::DuplicateKey(1))));
//!
//! let mut out = std::io::stdout();
//! tree.print(&mut out)?;
//! # Ok::<(), Error>(())
//! ```

pub mod buffer;
pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::{BLOCK_SIZE, DEGREE, MAX_CHILDREN, MAX_KEYS};
pub use common::{BlockId, Durability, Error, Result};

pub use buffer::{CacheStats, PageCache, StatsSnapshot};
pub use index::btree::{BTree, LoadReport, TreeState};
pub use storage::block::{Block, Header, Node};
pub use storage::BlockStore;
