//! Image asset queries

use std::collections::HashMap;

use folio_core::impl_query;
use folio_core::model::{
    ImageAsset, ImageAssetFile, ImageAssetRenderDetails, ImageAssetSummary, PagedQueryResult,
    PagingParams,
};
use folio_core::permissions::{Permission, PermissionType};
use folio_store::errors::Result;
use folio_store::repo::{ImageAssetFilter, SqliteImageAssetRepo};

use crate::executor::{HandlerContext, HandlerRegistry, QueryHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImageAssetDetailsByIdQuery {
    pub image_asset_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImageAssetRenderDetailsByIdQuery {
    pub image_asset_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImageAssetRenderDetailsByIdRangeQuery {
    pub image_asset_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetImageAssetFileByIdQuery {
    pub image_asset_id: i64,
}

/// Title/file name text search; every listed tag must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchImageAssetSummariesQuery {
    pub text: Option<String>,
    pub tags: Vec<String>,
    pub paging: PagingParams,
}

impl_query!(
    GetImageAssetDetailsByIdQuery => Option<ImageAsset>,
    GetImageAssetRenderDetailsByIdQuery => Option<ImageAssetRenderDetails>,
    GetImageAssetRenderDetailsByIdRangeQuery => HashMap<i64, ImageAssetRenderDetails>,
    GetImageAssetFileByIdQuery => Option<ImageAssetFile>,
    SearchImageAssetSummariesQuery => PagedQueryResult<ImageAssetSummary>,
);

fn read_permission() -> Result<Vec<Permission>> {
    Ok(vec![Permission::image_asset(PermissionType::Read)])
}

struct GetImageAssetDetailsByIdHandler;

impl QueryHandler for GetImageAssetDetailsByIdHandler {
    type Query = GetImageAssetDetailsByIdQuery;

    fn permissions(
        &self,
        _query: &GetImageAssetDetailsByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetImageAssetDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<ImageAsset>> {
        SqliteImageAssetRepo::get(ctx.conn(), query.image_asset_id)
    }
}

struct GetImageAssetRenderDetailsByIdHandler;

impl QueryHandler for GetImageAssetRenderDetailsByIdHandler {
    type Query = GetImageAssetRenderDetailsByIdQuery;

    fn permissions(
        &self,
        _query: &GetImageAssetRenderDetailsByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetImageAssetRenderDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<ImageAssetRenderDetails>> {
        let cache = &ctx.services().image_asset_cache;
        if let Some(details) = cache.get(query.image_asset_id) {
            return Ok(Some(details));
        }
        let Some(asset) = SqliteImageAssetRepo::get(ctx.conn(), query.image_asset_id)? else {
            return Ok(None);
        };
        let details = cache.get_or_add(query.image_asset_id, || {
            Ok::<_, folio_core::errors::ExError>(ImageAssetRenderDetails::from(&asset))
        })?;
        Ok(Some(details))
    }
}

struct GetImageAssetRenderDetailsByIdRangeHandler;

impl QueryHandler for GetImageAssetRenderDetailsByIdRangeHandler {
    type Query = GetImageAssetRenderDetailsByIdRangeQuery;

    fn permissions(
        &self,
        _query: &GetImageAssetRenderDetailsByIdRangeQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetImageAssetRenderDetailsByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<HashMap<i64, ImageAssetRenderDetails>> {
        let cache = &ctx.services().image_asset_cache;
        let mut results = HashMap::with_capacity(query.image_asset_ids.len());
        let mut missing = Vec::new();
        for id in query.image_asset_ids {
            match cache.get(id) {
                Some(details) => {
                    results.insert(id, details);
                }
                None => missing.push(id),
            }
        }

        for asset in SqliteImageAssetRepo::get_many(ctx.conn(), &missing)? {
            let details = cache.get_or_add(asset.image_asset_id, || {
                Ok::<_, folio_core::errors::ExError>(ImageAssetRenderDetails::from(&asset))
            })?;
            results.insert(asset.image_asset_id, details);
        }
        Ok(results)
    }
}

struct GetImageAssetFileByIdHandler;

impl QueryHandler for GetImageAssetFileByIdHandler {
    type Query = GetImageAssetFileByIdQuery;

    fn permissions(
        &self,
        _query: &GetImageAssetFileByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetImageAssetFileByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<ImageAssetFile>> {
        let Some(asset) = SqliteImageAssetRepo::get(ctx.conn(), query.image_asset_id)? else {
            return Ok(None);
        };
        let bytes = ctx
            .services()
            .asset_files
            .read(&asset.file_digest, &asset.extension)?;
        Ok(Some(ImageAssetFile {
            image_asset_id: asset.image_asset_id,
            file_name: format!("{}.{}", asset.file_name, asset.extension),
            content_type: asset.content_type(),
            bytes,
        }))
    }
}

struct SearchImageAssetSummariesHandler;

impl QueryHandler for SearchImageAssetSummariesHandler {
    type Query = SearchImageAssetSummariesQuery;

    fn permissions(
        &self,
        _query: &SearchImageAssetSummariesQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: SearchImageAssetSummariesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<PagedQueryResult<ImageAssetSummary>> {
        let filter = ImageAssetFilter {
            text: query.text.filter(|t| !t.trim().is_empty()),
            tags: folio_core::rules::normalize_tags(&query.tags),
        };
        let found = SqliteImageAssetRepo::search(ctx.conn(), &filter, query.paging)?;
        let assets: HashMap<i64, ImageAsset> = SqliteImageAssetRepo::get_many(ctx.conn(), &found.ids)?
            .into_iter()
            .map(|a| (a.image_asset_id, a))
            .collect();

        let items = found
            .ids
            .iter()
            .filter_map(|id| assets.get(id))
            .map(ImageAssetSummary::from)
            .collect();
        Ok(PagedQueryResult::new(items, found.total, query.paging))
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_query(GetImageAssetDetailsByIdHandler)?;
    registry.register_query(GetImageAssetRenderDetailsByIdHandler)?;
    registry.register_query(GetImageAssetRenderDetailsByIdRangeHandler)?;
    registry.register_query(GetImageAssetFileByIdHandler)?;
    registry.register_query(SearchImageAssetSummariesHandler)?;
    Ok(())
}
