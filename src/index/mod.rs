//! Index structures.
//!
//! - [`btree`] - Disk-resident B-tree over the page cache

pub mod btree;
