//! Storage layer - disk I/O and block formats.
//!
//! This module handles persistent storage:
//! - [`BlockStore`] - Low-level file I/O
//! - [`block`] - Block, header and node layouts

pub mod block;
mod block_store;

pub use block_store::BlockStore;
