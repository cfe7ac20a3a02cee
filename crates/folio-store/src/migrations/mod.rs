//! Migration framework
//!
//! Provides:
//! - Migration runner with checksum verification
//! - Idempotent application
//! - Embedded SQL migrations

mod embedded;
mod runner;

pub use runner::{applied_migrations, apply_migrations};
