use super::ObjectCache;
use crate::model::ImageAssetRenderDetails;

/// Render details by image asset id
pub struct ImageAssetCache {
    render_details: ObjectCache<i64, ImageAssetRenderDetails>,
}

impl ImageAssetCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            render_details: ObjectCache::new(capacity),
        }
    }

    pub fn get(&self, image_asset_id: i64) -> Option<ImageAssetRenderDetails> {
        self.render_details.get(&image_asset_id)
    }

    pub fn get_or_add<E>(
        &self,
        image_asset_id: i64,
        compute: impl FnOnce() -> Result<ImageAssetRenderDetails, E>,
    ) -> Result<ImageAssetRenderDetails, E> {
        self.render_details.get_or_add(image_asset_id, compute)
    }

    pub fn contains(&self, image_asset_id: i64) -> bool {
        self.render_details.contains(&image_asset_id)
    }

    pub fn clear(&self, image_asset_id: i64) {
        tracing::debug!(image_asset_id, "clear image asset cache");
        self.render_details.clear(&image_asset_id);
    }

    pub fn clear_all(&self) {
        self.render_details.clear_all();
    }
}
