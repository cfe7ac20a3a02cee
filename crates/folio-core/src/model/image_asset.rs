use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Image asset record as persisted; the file itself lives in the asset store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub image_asset_id: i64,
    pub title: String,
    pub file_name: String,
    /// Lower-case extension without the dot
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    /// SHA-256 digest of the file content in the asset store
    pub file_digest: String,
    pub tags: Vec<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

impl ImageAsset {
    /// MIME type derived from the extension
    pub fn content_type(&self) -> &'static str {
        content_type_for_extension(&self.extension)
    }
}

pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Cacheable data needed to emit an image tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAssetRenderDetails {
    pub image_asset_id: i64,
    pub title: String,
    pub file_name: String,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    /// Changes whenever the asset changes; hosts use it for cache-busting urls
    pub file_stamp: String,
}

impl From<&ImageAsset> for ImageAssetRenderDetails {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            image_asset_id: asset.image_asset_id,
            title: asset.title.clone(),
            file_name: asset.file_name.clone(),
            extension: asset.extension.clone(),
            width: asset.width,
            height: asset.height,
            file_stamp: format!(
                "{}-{}",
                asset.updated_at.timestamp(),
                &asset.file_digest[..8.min(asset.file_digest.len())]
            ),
        }
    }
}

/// Search result row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAssetSummary {
    pub image_asset_id: i64,
    pub title: String,
    pub file_name: String,
    pub extension: String,
    pub width: u32,
    pub height: u32,
    pub file_size: u64,
    pub tags: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ImageAsset> for ImageAssetSummary {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            image_asset_id: asset.image_asset_id,
            title: asset.title.clone(),
            file_name: asset.file_name.clone(),
            extension: asset.extension.clone(),
            width: asset.width,
            height: asset.height,
            file_size: asset.file_size,
            tags: asset.tags.clone(),
            updated_at: asset.updated_at,
        }
    }
}

/// File content of an image asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAssetFile {
    pub image_asset_id: i64,
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for_extension("jpeg"), "image/jpeg");
        assert_eq!(content_type_for_extension("png"), "image/png");
        assert_eq!(content_type_for_extension("exe"), "application/octet-stream");
    }

    #[test]
    fn test_render_details_stamp_changes_with_digest() {
        let now = Utc::now();
        let mut asset = ImageAsset {
            image_asset_id: 3,
            title: "Logo".to_string(),
            file_name: "logo".to_string(),
            extension: "png".to_string(),
            width: 10,
            height: 10,
            file_size: 100,
            file_digest: "aaaaaaaaaaaa".to_string(),
            tags: vec![],
            is_deleted: false,
            created_at: now,
            updated_at: now,
            creator_id: None,
        };
        let first = ImageAssetRenderDetails::from(&asset).file_stamp;
        asset.file_digest = "bbbbbbbbbbbb".to_string();
        let second = ImageAssetRenderDetails::from(&asset).file_stamp;

        assert_ne!(first, second);
    }
}
