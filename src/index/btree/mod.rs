//! B-tree index over fixed-size disk blocks.
//!
//! - [`BTree`] - The engine: insert, search and in-order traversal
//! - [`interchange`] - The `"key,value"` text format of extract/load
//!
//! Keys are unique. There is no delete; nodes are never merged and blocks
//! are never reclaimed.

pub mod interchange;
mod tree;

pub use interchange::LoadReport;
pub use tree::{BTree, TreeState};
