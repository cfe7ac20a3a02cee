//! Page queries

use std::collections::HashMap;
use std::sync::Arc;

use folio_core::errors::FolioError;
use folio_core::impl_query;
use folio_core::model::site::combine_path;
use folio_core::model::{
    Page, PageDetails, PageRenderDetails, PageRoute, PageSummary, PageType, PageVersion,
    PagedQueryResult, PagingParams, WebDirectory, WorkflowStatusQuery,
};
use folio_core::ops::select_version;
use folio_core::permissions::{Permission, PermissionType};
use folio_store::errors::Result;
use folio_store::repo::{PageFilter, SqlitePageRepo, SqliteSiteRepo};
use rusqlite::Connection;

use crate::executor::{HandlerContext, HandlerRegistry, QueryHandler};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPageRouteByIdQuery {
    pub page_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPageRoutesByIdRangeQuery {
    pub page_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAllPageRoutesQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPageDetailsByIdQuery {
    pub page_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPageRenderDetailsByIdQuery {
    pub page_id: i64,
    pub workflow_status: WorkflowStatusQuery,
}

/// Range variant of [`GetPageRenderDetailsByIdQuery`]; a specific version id
/// is meaningless across pages, so `SpecificVersion` is rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetPageRenderDetailsByIdRangeQuery {
    pub page_ids: Vec<i64>,
    pub workflow_status: WorkflowStatusQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsPagePathUniqueQuery {
    /// Page being edited, excluded from the check
    pub page_id: Option<i64>,
    pub web_directory_id: i64,
    pub locale_id: Option<i64>,
    pub url_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPageSummariesQuery {
    pub text: Option<String>,
    pub web_directory_id: Option<i64>,
    pub locale_id: Option<i64>,
    pub page_type: Option<PageType>,
    pub paging: PagingParams,
}

impl_query!(
    GetPageRouteByIdQuery => Option<PageRoute>,
    GetPageRoutesByIdRangeQuery => HashMap<i64, PageRoute>,
    GetAllPageRoutesQuery => Vec<PageRoute>,
    GetPageDetailsByIdQuery => Option<PageDetails>,
    GetPageRenderDetailsByIdQuery => Option<PageRenderDetails>,
    GetPageRenderDetailsByIdRangeQuery => HashMap<i64, PageRenderDetails>,
    IsPagePathUniqueQuery => bool,
    SearchPageSummariesQuery => PagedQueryResult<PageSummary>,
);

/// Resolved absolute paths of directories and locale codes
pub(crate) struct SitePaths {
    directories: HashMap<i64, String>,
    locales: HashMap<i64, String>,
}

impl SitePaths {
    pub(crate) fn load(conn: &Connection) -> Result<Self> {
        let directories: Vec<WebDirectory> = SqliteSiteRepo::list_web_directories(conn)?;
        let locales = SqliteSiteRepo::list_locales(conn)?
            .into_iter()
            .map(|l| (l.locale_id, l.iso_code))
            .collect();
        Ok(Self {
            directories: WebDirectory::resolve_full_paths(&directories),
            locales,
        })
    }

    pub(crate) fn directory_path(&self, web_directory_id: i64) -> &str {
        self.directories
            .get(&web_directory_id)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub(crate) fn full_path(&self, page: &Page) -> String {
        let locale = page
            .locale_id
            .and_then(|id| self.locales.get(&id))
            .map(String::as_str);
        combine_path(locale, self.directory_path(page.web_directory_id), &page.url_path)
    }
}

fn build_route(conn: &Connection, paths: &SitePaths, page: &Page) -> Result<PageRoute> {
    let versions = SqlitePageRepo::get_versions(conn, page.page_id)?;
    Ok(PageRoute::build(page, &versions, paths.full_path(page)))
}

fn read_permission() -> Result<Vec<Permission>> {
    Ok(vec![Permission::page(PermissionType::Read)])
}

fn select_page_version(
    versions: &[PageVersion],
    query: WorkflowStatusQuery,
) -> Option<&PageVersion> {
    let states: Vec<_> = versions.iter().map(PageVersion::state).collect();
    let selected = select_version(&states, query)?;
    versions
        .iter()
        .find(|v| v.page_version_id == selected.version_id)
}

struct GetPageRouteByIdHandler;

impl QueryHandler for GetPageRouteByIdHandler {
    type Query = GetPageRouteByIdQuery;

    fn permissions(
        &self,
        _query: &GetPageRouteByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetPageRouteByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<PageRoute>> {
        let cache = &ctx.services().page_cache;
        if let Some(route) = cache.route(query.page_id) {
            return Ok(Some(route));
        }

        let conn = ctx.conn();
        let Some(page) = SqlitePageRepo::get_page(conn, query.page_id)? else {
            return Ok(None);
        };
        let route = cache.get_or_add_route(query.page_id, || {
            let paths = SitePaths::load(conn)?;
            build_route(conn, &paths, &page)
        })?;
        Ok(Some(route))
    }
}

struct GetPageRoutesByIdRangeHandler;

impl QueryHandler for GetPageRoutesByIdRangeHandler {
    type Query = GetPageRoutesByIdRangeQuery;

    fn permissions(
        &self,
        _query: &GetPageRoutesByIdRangeQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetPageRoutesByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<HashMap<i64, PageRoute>> {
        let mut routes = HashMap::with_capacity(query.page_ids.len());
        for page_id in query.page_ids {
            if routes.contains_key(&page_id) {
                continue;
            }
            if let Some(route) = ctx.query(GetPageRouteByIdQuery { page_id })? {
                routes.insert(page_id, route);
            }
        }
        Ok(routes)
    }
}

struct GetAllPageRoutesHandler;

impl QueryHandler for GetAllPageRoutesHandler {
    type Query = GetAllPageRoutesQuery;

    fn permissions(
        &self,
        _query: &GetAllPageRoutesQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        _query: GetAllPageRoutesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<PageRoute>> {
        let conn = ctx.conn();
        let routes = ctx.services().page_cache.get_or_add_all(|| {
            let paths = SitePaths::load(conn)?;
            let routes = SqlitePageRepo::list_pages(conn)?
                .iter()
                .map(|page| build_route(conn, &paths, page))
                .collect::<Result<Vec<_>>>()?;
            Ok::<_, folio_core::errors::ExError>(Arc::new(routes))
        })?;
        Ok(routes.as_ref().clone())
    }
}

struct GetPageDetailsByIdHandler;

impl QueryHandler for GetPageDetailsByIdHandler {
    type Query = GetPageDetailsByIdQuery;

    fn permissions(
        &self,
        _query: &GetPageDetailsByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetPageDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<PageDetails>> {
        let conn = ctx.conn();
        let Some(page) = SqlitePageRepo::get_page(conn, query.page_id)? else {
            return Ok(None);
        };
        let versions = SqlitePageRepo::get_versions(conn, page.page_id)?;
        let Some(latest) = select_page_version(&versions, WorkflowStatusQuery::Latest).cloned()
        else {
            return Ok(None);
        };
        let route = PageRoute::build(&page, &versions, SitePaths::load(conn)?.full_path(&page));

        Ok(Some(PageDetails {
            page,
            latest_version: latest,
            full_path: route.full_path,
            is_published: route.is_published,
            has_draft: route.has_draft,
        }))
    }
}

fn render_details(
    ctx: &HandlerContext<'_>,
    page_id: i64,
    workflow_status: WorkflowStatusQuery,
) -> Result<Option<PageRenderDetails>> {
    let conn = ctx.conn();
    if SqlitePageRepo::get_page(conn, page_id)?.is_none() {
        return Ok(None);
    }
    let versions = SqlitePageRepo::get_versions(conn, page_id)?;
    let Some(version) = select_page_version(&versions, workflow_status) else {
        return Ok(None);
    };
    let page_route = ctx.query(GetPageRouteByIdQuery { page_id })?;

    Ok(Some(PageRenderDetails {
        page_id,
        page_version_id: version.page_version_id,
        title: version.title.clone(),
        meta_description: version.meta_description.clone(),
        workflow_status: version.workflow_status,
        page_route,
    }))
}

struct GetPageRenderDetailsByIdHandler;

impl QueryHandler for GetPageRenderDetailsByIdHandler {
    type Query = GetPageRenderDetailsByIdQuery;

    fn permissions(
        &self,
        _query: &GetPageRenderDetailsByIdQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetPageRenderDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<PageRenderDetails>> {
        render_details(ctx, query.page_id, query.workflow_status)
    }
}

struct GetPageRenderDetailsByIdRangeHandler;

impl QueryHandler for GetPageRenderDetailsByIdRangeHandler {
    type Query = GetPageRenderDetailsByIdRangeQuery;

    fn permissions(
        &self,
        _query: &GetPageRenderDetailsByIdRangeQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: GetPageRenderDetailsByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<HashMap<i64, PageRenderDetails>> {
        if let WorkflowStatusQuery::SpecificVersion(_) = query.workflow_status {
            return Err(FolioError::UnsupportedQuery {
                reason: "SpecificVersion cannot be used with a range of pages".to_string(),
            }
            .into());
        }

        let mut results = HashMap::with_capacity(query.page_ids.len());
        for page_id in query.page_ids {
            if let Some(details) = render_details(ctx, page_id, query.workflow_status)? {
                results.insert(page_id, details);
            }
        }
        Ok(results)
    }
}

struct IsPagePathUniqueHandler;

impl QueryHandler for IsPagePathUniqueHandler {
    type Query = IsPagePathUniqueQuery;

    fn permissions(
        &self,
        _query: &IsPagePathUniqueQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(&self, query: IsPagePathUniqueQuery, ctx: &HandlerContext<'_>) -> Result<bool> {
        SqlitePageRepo::is_path_unique(
            ctx.conn(),
            query.web_directory_id,
            query.locale_id,
            &query.url_path,
            query.page_id,
        )
    }
}

struct SearchPageSummariesHandler;

impl QueryHandler for SearchPageSummariesHandler {
    type Query = SearchPageSummariesQuery;

    fn permissions(
        &self,
        _query: &SearchPageSummariesQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        read_permission()
    }

    fn execute(
        &self,
        query: SearchPageSummariesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<PagedQueryResult<PageSummary>> {
        let filter = PageFilter {
            text: query.text.filter(|t| !t.trim().is_empty()),
            web_directory_id: query.web_directory_id,
            locale_id: query.locale_id,
            page_type: query.page_type,
        };
        let found = SqlitePageRepo::search(ctx.conn(), &filter, query.paging)?;
        let routes = ctx.query(GetPageRoutesByIdRangeQuery {
            page_ids: found.ids.clone(),
        })?;

        let items = found
            .ids
            .iter()
            .filter_map(|id| routes.get(id))
            .map(PageSummary::from)
            .collect();
        Ok(PagedQueryResult::new(items, found.total, query.paging))
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_query(GetPageRouteByIdHandler)?;
    registry.register_query(GetPageRoutesByIdRangeHandler)?;
    registry.register_query(GetAllPageRoutesHandler)?;
    registry.register_query(GetPageDetailsByIdHandler)?;
    registry.register_query(GetPageRenderDetailsByIdHandler)?;
    registry.register_query(GetPageRenderDetailsByIdRangeHandler)?;
    registry.register_query(IsPagePathUniqueHandler)?;
    registry.register_query(SearchPageSummariesHandler)?;
    Ok(())
}
