//! Folio Store - SQLite persistence and asset file storage
//!
//! Provides:
//! - Connection helpers and embedded, checksummed migrations
//! - Repositories for locales, web directories, pages, custom entities and
//!   image assets
//! - A content-addressed filesystem store for image asset files

pub mod db;
pub mod errors;
pub mod files;
pub mod migrations;
pub mod repo;

pub use errors::Result;
pub use files::AssetFileStore;
