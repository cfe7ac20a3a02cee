//! Content-addressed file store for asset bytes
//!
//! Provides:
//! - Atomic writes (temp file then rename)
//! - Collision detection
//! - Sharding by the first two hex chars of the digest

mod atomic;
mod fs_store;
mod sharding;

pub use fs_store::{compute_digest, AssetFileStore};
