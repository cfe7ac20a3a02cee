//! Filesystem asset file store
//!
//! Files are addressed by the SHA-256 of their content plus the image
//! extension. Writing identical bytes twice is a no-op, so several assets
//! may share one file; files are therefore never removed by asset deletes.

#![allow(clippy::result_large_err)]

use crate::errors::{asset_file_collision, asset_file_missing, io_error, Result};
use crate::files::atomic::atomic_write;
use crate::files::sharding::shard_path;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// SHA-256 of `content` as lower-case hex
pub fn compute_digest(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone)]
pub struct AssetFileStore {
    root: PathBuf,
}

impl AssetFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store `content` and return its digest
    pub fn write(&self, content: &[u8], extension: &str) -> Result<String> {
        let digest = compute_digest(content);
        let target_path = shard_path(&self.root, &digest, extension);

        if target_path.exists() {
            let existing = fs::read(&target_path).map_err(|e| io_error("read_asset_file", e))?;
            if existing == content {
                return Ok(digest);
            }
            return Err(asset_file_collision(&digest));
        }

        atomic_write(&target_path, content)?;
        tracing::debug!(digest = %digest, bytes = content.len(), "asset file written");

        Ok(digest)
    }

    pub fn read(&self, digest: &str, extension: &str) -> Result<Vec<u8>> {
        let path = shard_path(&self.root, digest, extension);
        if !path.exists() {
            return Err(asset_file_missing(digest));
        }
        fs::read(&path).map_err(|e| io_error("read_asset_file", e))
    }

    pub fn exists(&self, digest: &str, extension: &str) -> bool {
        shard_path(&self.root, digest, extension).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::errors::ExErrorKind;
    use tempfile::TempDir;

    fn setup_store() -> (AssetFileStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = AssetFileStore::new(temp_dir.path());
        (store, temp_dir)
    }

    #[test]
    fn test_write_then_read() {
        let (store, _dir) = setup_store();

        let digest = store.write(b"\x89PNG fake", "png").unwrap();

        assert_eq!(store.read(&digest, "png").unwrap(), b"\x89PNG fake");
        assert_eq!(digest.len(), 64);
    }

    #[test]
    fn test_identical_content_shares_digest() {
        let (store, _dir) = setup_store();

        let first = store.write(b"same", "jpg").unwrap();
        let second = store.write(b"same", "jpg").unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (store, _dir) = setup_store();

        let err = store.read(&"0".repeat(64), "png").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}
