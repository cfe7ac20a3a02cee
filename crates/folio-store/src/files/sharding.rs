//! Shard layout for the asset file store
//!
//! Files live under a directory named after the first two hex characters
//! of their digest so no single directory grows too large.

use std::path::{Path, PathBuf};

/// For digest "abc123..." and extension "png", returns "<root>/ab/abc123.png"
pub fn shard_path(root: &Path, digest: &str, extension: &str) -> PathBuf {
    let shard = &digest[..2.min(digest.len())];
    root.join(shard).join(format!("{}.{}", digest, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_path() {
        let path = shard_path(Path::new("/assets"), "abc123def456", "png");
        assert_eq!(path, PathBuf::from("/assets/ab/abc123def456.png"));
    }
}
