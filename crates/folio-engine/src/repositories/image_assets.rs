use std::collections::HashMap;

use folio_core::model::{
    ImageAsset, ImageAssetFile, ImageAssetRenderDetails, ImageAssetSummary, PagedQueryResult,
};
use folio_store::errors::Result;

use super::{repository_context, Dispatcher};
use crate::commands::image_assets::{
    AddImageAssetCommand, DeleteImageAssetCommand, UpdateImageAssetCommand,
};
use crate::queries::image_assets::{
    GetImageAssetDetailsByIdQuery, GetImageAssetFileByIdQuery,
    GetImageAssetRenderDetailsByIdQuery, GetImageAssetRenderDetailsByIdRangeQuery,
    SearchImageAssetSummariesQuery,
};

pub struct ImageAssetRepository<'a> {
    dispatcher: Dispatcher<'a>,
}

repository_context!(ImageAssetRepository);

impl ImageAssetRepository<'_> {
    pub fn get_details_by_id(&self, image_asset_id: i64) -> Result<Option<ImageAsset>> {
        self.dispatcher
            .query(GetImageAssetDetailsByIdQuery { image_asset_id })
    }

    pub fn get_render_details_by_id(
        &self,
        image_asset_id: i64,
    ) -> Result<Option<ImageAssetRenderDetails>> {
        self.dispatcher
            .query(GetImageAssetRenderDetailsByIdQuery { image_asset_id })
    }

    pub fn get_render_details_by_id_range(
        &self,
        image_asset_ids: Vec<i64>,
    ) -> Result<HashMap<i64, ImageAssetRenderDetails>> {
        self.dispatcher
            .query(GetImageAssetRenderDetailsByIdRangeQuery { image_asset_ids })
    }

    pub fn get_file_by_id(&self, image_asset_id: i64) -> Result<Option<ImageAssetFile>> {
        self.dispatcher
            .query(GetImageAssetFileByIdQuery { image_asset_id })
    }

    pub fn search_summaries(
        &self,
        query: SearchImageAssetSummariesQuery,
    ) -> Result<PagedQueryResult<ImageAssetSummary>> {
        self.dispatcher.query(query)
    }

    pub fn add(&self, command: AddImageAssetCommand) -> Result<i64> {
        self.dispatcher.command(command)
    }

    pub fn update(&self, command: UpdateImageAssetCommand) -> Result<()> {
        self.dispatcher.command(command)
    }

    pub fn delete(&self, image_asset_id: i64) -> Result<()> {
        self.dispatcher
            .command(DeleteImageAssetCommand { image_asset_id })
    }
}
