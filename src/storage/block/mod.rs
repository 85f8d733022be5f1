//! Block formats.
//!
//! This module contains:
//! - [`Block`] - The raw 512-byte data container
//! - [`Header`] - The file header in block 0
//! - [`Node`] - A B-tree node in every other block

#[allow(clippy::module_inception)]
mod block;
mod header;
mod node;

pub use block::Block;
pub use header::Header;
pub use node::Node;
