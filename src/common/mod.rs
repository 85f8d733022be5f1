//! Common types and utilities shared across the crate.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants
//! - Error types
//! - Block identifiers

mod block_id;
pub mod config;
pub mod error;

pub use block_id::BlockId;
pub use config::Durability;
pub use error::{Error, Result};
