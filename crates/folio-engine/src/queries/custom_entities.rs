//! Custom entity queries
//!
//! Read permissions are per definition. Queries that only carry entity ids
//! resolve the definition codes in `permissions()` so the executor still
//! checks them before anything runs.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use folio_core::errors::{ExError, FolioError};
use folio_core::impl_query;
use folio_core::model::custom_entity::select_entity_version;
use folio_core::model::site::combine_path;
use folio_core::model::{
    CustomEntity, CustomEntityDefinitionMicroSummary, CustomEntityDetails,
    CustomEntityRenderSummary, CustomEntityRoute, CustomEntitySummary, CustomEntityVersionSummary,
    PageType, PagedQueryResult, PagingParams, RootEntityMicroSummary, WebDirectory,
    WorkflowStatus, WorkflowStatusQuery,
};
use folio_core::permissions::{Permission, PermissionType, PermissionValidationService};
use folio_core::routing::{summarize, RoutingRuleSummary};
use folio_store::errors::Result;
use folio_store::repo::{
    CustomEntityFilter, SqliteCustomEntityRepo, SqlitePageRepo, SqliteSiteRepo,
};
use rusqlite::Connection;

use crate::executor::{HandlerContext, HandlerRegistry, QueryHandler};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAllCustomEntityDefinitionMicroSummariesQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityDefinitionMicroSummaryByIdQuery {
    pub definition_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetAllCustomEntityRoutingRulesQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRoutingRuleByRouteFormatQuery {
    pub route_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRoutesByDefinitionCodeQuery {
    pub definition_code: String,
}

/// Resolve a request path below a custom entity details page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRouteByPathQuery {
    pub page_id: i64,
    pub path: String,
    /// Also match entities that have no published version
    pub include_unpublished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityDetailsByIdQuery {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRenderSummaryByIdQuery {
    pub custom_entity_id: i64,
    pub workflow_status: WorkflowStatusQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRenderSummariesByIdRangeQuery {
    pub custom_entity_ids: Vec<i64>,
    pub workflow_status: WorkflowStatusQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityRenderSummariesByDefinitionCodeQuery {
    pub definition_code: String,
    pub workflow_status: WorkflowStatusQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityVersionSummariesByCustomEntityIdQuery {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsCustomEntityPathUniqueQuery {
    pub definition_code: String,
    /// Entity being edited, excluded from the check
    pub custom_entity_id: Option<i64>,
    pub locale_id: Option<i64>,
    pub url_slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCustomEntitySummariesQuery {
    pub definition_code: String,
    pub text: Option<String>,
    pub locale_id: Option<i64>,
    pub paging: PagingParams,
}

/// One page of render summaries; entities with no version matching
/// `workflow_status` are left out of both the items and the total
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCustomEntityRenderSummariesQuery {
    pub definition_code: String,
    pub text: Option<String>,
    pub locale_id: Option<i64>,
    pub workflow_status: WorkflowStatusQuery,
    pub paging: PagingParams,
}

/// Minimal summaries for relation pickers; entities may span definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetCustomEntityMicroSummariesByIdRangeQuery {
    pub custom_entity_ids: Vec<i64>,
}

impl_query!(
    GetAllCustomEntityDefinitionMicroSummariesQuery => Vec<CustomEntityDefinitionMicroSummary>,
    GetCustomEntityDefinitionMicroSummaryByIdQuery => Option<CustomEntityDefinitionMicroSummary>,
    GetAllCustomEntityRoutingRulesQuery => Vec<RoutingRuleSummary>,
    GetCustomEntityRoutingRuleByRouteFormatQuery => Option<RoutingRuleSummary>,
    GetCustomEntityRoutesByDefinitionCodeQuery => Vec<CustomEntityRoute>,
    GetCustomEntityRouteByPathQuery => Option<CustomEntityRoute>,
    GetCustomEntityDetailsByIdQuery => Option<CustomEntityDetails>,
    GetCustomEntityRenderSummaryByIdQuery => Option<CustomEntityRenderSummary>,
    GetCustomEntityRenderSummariesByIdRangeQuery => HashMap<i64, CustomEntityRenderSummary>,
    GetCustomEntityRenderSummariesByDefinitionCodeQuery => Vec<CustomEntityRenderSummary>,
    GetCustomEntityVersionSummariesByCustomEntityIdQuery => Vec<CustomEntityVersionSummary>,
    IsCustomEntityPathUniqueQuery => bool,
    SearchCustomEntitySummariesQuery => PagedQueryResult<CustomEntitySummary>,
    SearchCustomEntityRenderSummariesQuery => PagedQueryResult<CustomEntityRenderSummary>,
    GetCustomEntityMicroSummariesByIdRangeQuery => HashMap<i64, RootEntityMicroSummary>,
);

/// Permission of `permission_type` on the definition of one entity
///
/// An unknown entity declares nothing beyond a signed in user, so anonymous
/// callers cannot tell missing ids from existing ones; the handler then
/// reports the entity missing.
pub(crate) fn entity_permissions(
    ctx: &HandlerContext<'_>,
    custom_entity_id: i64,
    permission_type: PermissionType,
) -> Result<Vec<Permission>> {
    match SqliteCustomEntityRepo::get_definition_code(ctx.conn(), custom_entity_id)? {
        Some(code) => Ok(vec![Permission::custom_entity(&code, permission_type)]),
        None => {
            ctx.services()
                .permissions
                .enforce_is_logged_in(ctx.user())?;
            Ok(Vec::new())
        }
    }
}

fn definition_read(definition_code: &str) -> Result<Vec<Permission>> {
    Ok(vec![Permission::custom_entity(
        definition_code,
        PermissionType::Read,
    )])
}

fn definition_codes(conn: &Connection, ids: &[i64]) -> Result<BTreeSet<String>> {
    Ok(SqliteCustomEntityRepo::get_entities(conn, ids)?
        .into_iter()
        .map(|e| e.definition_code)
        .collect())
}

fn render_summary(
    conn: &Connection,
    entity: &CustomEntity,
    workflow_status: WorkflowStatusQuery,
) -> Result<Option<CustomEntityRenderSummary>> {
    let versions = SqliteCustomEntityRepo::get_versions(conn, entity.custom_entity_id)?;
    Ok(select_entity_version(&versions, workflow_status)
        .map(|version| CustomEntityRenderSummary::build(entity, version)))
}

struct GetAllCustomEntityDefinitionMicroSummariesHandler;

impl QueryHandler for GetAllCustomEntityDefinitionMicroSummariesHandler {
    type Query = GetAllCustomEntityDefinitionMicroSummariesQuery;

    fn execute(
        &self,
        _query: GetAllCustomEntityDefinitionMicroSummariesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<CustomEntityDefinitionMicroSummary>> {
        Ok(ctx
            .services()
            .definitions
            .all()
            .into_iter()
            .map(|d| d.micro_summary())
            .collect())
    }
}

struct GetCustomEntityDefinitionMicroSummaryByIdHandler;

impl QueryHandler for GetCustomEntityDefinitionMicroSummaryByIdHandler {
    type Query = GetCustomEntityDefinitionMicroSummaryByIdQuery;

    fn execute(
        &self,
        query: GetCustomEntityDefinitionMicroSummaryByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<CustomEntityDefinitionMicroSummary>> {
        Ok(ctx
            .services()
            .definitions
            .get(&query.definition_code)
            .map(|d| d.micro_summary()))
    }
}

struct GetAllCustomEntityRoutingRulesHandler;

impl QueryHandler for GetAllCustomEntityRoutingRulesHandler {
    type Query = GetAllCustomEntityRoutingRulesQuery;

    fn execute(
        &self,
        _query: GetAllCustomEntityRoutingRulesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<RoutingRuleSummary>> {
        Ok(ctx.services().routing_rules.summaries())
    }
}

struct GetCustomEntityRoutingRuleByRouteFormatHandler;

impl QueryHandler for GetCustomEntityRoutingRuleByRouteFormatHandler {
    type Query = GetCustomEntityRoutingRuleByRouteFormatQuery;

    fn execute(
        &self,
        query: GetCustomEntityRoutingRuleByRouteFormatQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<RoutingRuleSummary>> {
        Ok(ctx
            .services()
            .routing_rules
            .get(&query.route_format)
            .map(|rule| summarize(rule.as_ref())))
    }
}

struct GetCustomEntityRoutesByDefinitionCodeHandler;

impl QueryHandler for GetCustomEntityRoutesByDefinitionCodeHandler {
    type Query = GetCustomEntityRoutesByDefinitionCodeQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityRoutesByDefinitionCodeQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        definition_read(&query.definition_code)
    }

    fn execute(
        &self,
        query: GetCustomEntityRoutesByDefinitionCodeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<CustomEntityRoute>> {
        let conn = ctx.conn();
        let routes = ctx
            .services()
            .custom_entity_cache
            .get_or_add_routes(&query.definition_code, || {
                let routes = SqliteCustomEntityRepo::list_by_definition(conn, &query.definition_code)?
                    .iter()
                    .map(|entity| {
                        let versions =
                            SqliteCustomEntityRepo::get_versions(conn, entity.custom_entity_id)?;
                        Ok(CustomEntityRoute::build(entity, &versions))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok::<_, ExError>(Arc::new(routes))
            })?;
        Ok(routes.as_ref().clone())
    }
}

struct GetCustomEntityRouteByPathHandler;

impl QueryHandler for GetCustomEntityRouteByPathHandler {
    type Query = GetCustomEntityRouteByPathQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityRouteByPathQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        let code = SqlitePageRepo::get_page(ctx.conn(), query.page_id)?
            .and_then(|page| page.custom_entity_definition_code);
        match code {
            Some(code) => definition_read(&code),
            None => Ok(Vec::new()),
        }
    }

    fn execute(
        &self,
        query: GetCustomEntityRouteByPathQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<CustomEntityRoute>> {
        let conn = ctx.conn();
        let Some(page) = SqlitePageRepo::get_page(conn, query.page_id)? else {
            return Ok(None);
        };
        let (PageType::CustomEntityDetails, Some(definition_code)) =
            (page.page_type, page.custom_entity_definition_code.clone())
        else {
            return Ok(None);
        };
        let Some(rule) = ctx.services().routing_rules.get(&page.url_path) else {
            return Ok(None);
        };

        let directories = SqliteSiteRepo::list_web_directories(conn)?;
        let directory_paths = WebDirectory::resolve_full_paths(&directories);
        let locale = match page.locale_id {
            Some(id) => SqliteSiteRepo::get_locale(conn, id)?.map(|l| l.iso_code),
            None => None,
        };
        let prefix = combine_path(
            locale.as_deref(),
            directory_paths
                .get(&page.web_directory_id)
                .map(String::as_str)
                .unwrap_or_default(),
            "",
        );
        let Some(remainder) = query
            .path
            .strip_prefix(prefix.trim_end_matches('/'))
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        else {
            return Ok(None);
        };
        let Some(route_match) = rule.match_path(remainder) else {
            return Ok(None);
        };

        let routes = ctx.query(GetCustomEntityRoutesByDefinitionCodeQuery { definition_code })?;
        Ok(routes.into_iter().find(|route| {
            route.locale_id == page.locale_id
                && (query.include_unpublished || route.is_published)
                && route_match.is_match(route)
        }))
    }
}

struct GetCustomEntityDetailsByIdHandler;

impl QueryHandler for GetCustomEntityDetailsByIdHandler {
    type Query = GetCustomEntityDetailsByIdQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, query.custom_entity_id, PermissionType::Read)
    }

    fn execute(
        &self,
        query: GetCustomEntityDetailsByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<CustomEntityDetails>> {
        let conn = ctx.conn();
        let Some(entity) = SqliteCustomEntityRepo::get_entity(conn, query.custom_entity_id)? else {
            return Ok(None);
        };
        let Some(definition) = ctx.services().definitions.get(&entity.definition_code) else {
            return Ok(None);
        };
        let versions = SqliteCustomEntityRepo::get_versions(conn, entity.custom_entity_id)?;
        let Some(latest) = select_entity_version(&versions, WorkflowStatusQuery::Latest).cloned()
        else {
            return Ok(None);
        };
        let route = CustomEntityRoute::build(&entity, &versions);

        Ok(Some(CustomEntityDetails {
            definition: definition.micro_summary(),
            entity,
            latest_version: latest,
            is_published: route.is_published,
            has_draft: route.has_draft,
        }))
    }
}

struct GetCustomEntityRenderSummaryByIdHandler;

impl QueryHandler for GetCustomEntityRenderSummaryByIdHandler {
    type Query = GetCustomEntityRenderSummaryByIdQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityRenderSummaryByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, query.custom_entity_id, PermissionType::Read)
    }

    fn execute(
        &self,
        query: GetCustomEntityRenderSummaryByIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Option<CustomEntityRenderSummary>> {
        let conn = ctx.conn();
        match SqliteCustomEntityRepo::get_entity(conn, query.custom_entity_id)? {
            Some(entity) => render_summary(conn, &entity, query.workflow_status),
            None => Ok(None),
        }
    }
}

struct GetCustomEntityRenderSummariesByIdRangeHandler;

impl QueryHandler for GetCustomEntityRenderSummariesByIdRangeHandler {
    type Query = GetCustomEntityRenderSummariesByIdRangeQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityRenderSummariesByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(definition_codes(ctx.conn(), &query.custom_entity_ids)?
            .iter()
            .map(|code| Permission::custom_entity(code, PermissionType::Read))
            .collect())
    }

    fn execute(
        &self,
        query: GetCustomEntityRenderSummariesByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<HashMap<i64, CustomEntityRenderSummary>> {
        if let WorkflowStatusQuery::SpecificVersion(_) = query.workflow_status {
            return Err(FolioError::UnsupportedQuery {
                reason: "SpecificVersion cannot be used with a range of custom entities"
                    .to_string(),
            }
            .into());
        }

        let conn = ctx.conn();
        let mut results = HashMap::new();
        for entity in SqliteCustomEntityRepo::get_entities(conn, &query.custom_entity_ids)? {
            if let Some(summary) = render_summary(conn, &entity, query.workflow_status)? {
                results.insert(entity.custom_entity_id, summary);
            }
        }
        Ok(results)
    }
}

struct GetCustomEntityRenderSummariesByDefinitionCodeHandler;

impl QueryHandler for GetCustomEntityRenderSummariesByDefinitionCodeHandler {
    type Query = GetCustomEntityRenderSummariesByDefinitionCodeQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityRenderSummariesByDefinitionCodeQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        definition_read(&query.definition_code)
    }

    fn execute(
        &self,
        query: GetCustomEntityRenderSummariesByDefinitionCodeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<CustomEntityRenderSummary>> {
        let conn = ctx.conn();
        let mut summaries = Vec::new();
        for entity in SqliteCustomEntityRepo::list_by_definition(conn, &query.definition_code)? {
            if let Some(summary) = render_summary(conn, &entity, query.workflow_status)? {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }
}

struct GetCustomEntityVersionSummariesByCustomEntityIdHandler;

impl QueryHandler for GetCustomEntityVersionSummariesByCustomEntityIdHandler {
    type Query = GetCustomEntityVersionSummariesByCustomEntityIdQuery;

    fn permissions(
        &self,
        query: &GetCustomEntityVersionSummariesByCustomEntityIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, query.custom_entity_id, PermissionType::Read)
    }

    fn execute(
        &self,
        query: GetCustomEntityVersionSummariesByCustomEntityIdQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<CustomEntityVersionSummary>> {
        let mut versions =
            SqliteCustomEntityRepo::get_versions(ctx.conn(), query.custom_entity_id)?;
        versions.sort_by(|a, b| {
            (b.created_at, b.custom_entity_version_id)
                .cmp(&(a.created_at, a.custom_entity_version_id))
        });
        Ok(versions.iter().map(CustomEntityVersionSummary::from).collect())
    }
}

struct IsCustomEntityPathUniqueHandler;

impl QueryHandler for IsCustomEntityPathUniqueHandler {
    type Query = IsCustomEntityPathUniqueQuery;

    fn permissions(
        &self,
        query: &IsCustomEntityPathUniqueQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        definition_read(&query.definition_code)
    }

    fn execute(
        &self,
        query: IsCustomEntityPathUniqueQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<bool> {
        SqliteCustomEntityRepo::is_slug_unique(
            ctx.conn(),
            &query.definition_code,
            query.locale_id,
            &query.url_slug,
            query.custom_entity_id,
        )
    }
}

struct SearchCustomEntitySummariesHandler;

impl QueryHandler for SearchCustomEntitySummariesHandler {
    type Query = SearchCustomEntitySummariesQuery;

    fn permissions(
        &self,
        query: &SearchCustomEntitySummariesQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        definition_read(&query.definition_code)
    }

    fn execute(
        &self,
        query: SearchCustomEntitySummariesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<PagedQueryResult<CustomEntitySummary>> {
        let conn = ctx.conn();
        let filter = CustomEntityFilter {
            definition_code: query.definition_code,
            text: query.text.filter(|t| !t.trim().is_empty()),
            locale_id: query.locale_id,
            workflow_status: None,
        };
        let found = SqliteCustomEntityRepo::search(conn, &filter, query.paging)?;
        let entities: HashMap<i64, CustomEntity> =
            SqliteCustomEntityRepo::get_entities(conn, &found.ids)?
                .into_iter()
                .map(|e| (e.custom_entity_id, e))
                .collect();

        let mut items = Vec::with_capacity(found.ids.len());
        for id in &found.ids {
            if let Some(entity) = entities.get(id) {
                let versions = SqliteCustomEntityRepo::get_versions(conn, *id)?;
                items.push(CustomEntitySummary::build(entity, &versions));
            }
        }
        Ok(PagedQueryResult::new(items, found.total, query.paging))
    }
}

struct SearchCustomEntityRenderSummariesHandler;

impl QueryHandler for SearchCustomEntityRenderSummariesHandler {
    type Query = SearchCustomEntityRenderSummariesQuery;

    fn permissions(
        &self,
        query: &SearchCustomEntityRenderSummariesQuery,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        definition_read(&query.definition_code)
    }

    fn execute(
        &self,
        query: SearchCustomEntityRenderSummariesQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<PagedQueryResult<CustomEntityRenderSummary>> {
        // Every entity has a draft or a published version, so only the
        // single-status queries narrow the search
        let required = match query.workflow_status {
            WorkflowStatusQuery::Draft => Some(WorkflowStatus::Draft),
            WorkflowStatusQuery::Published => Some(WorkflowStatus::Published),
            WorkflowStatusQuery::Latest | WorkflowStatusQuery::PreferPublished => None,
            WorkflowStatusQuery::SpecificVersion(_) => {
                return Err(FolioError::UnsupportedQuery {
                    reason: "SpecificVersion cannot be used to search custom entities"
                        .to_string(),
                }
                .into());
            }
        };

        let conn = ctx.conn();
        let filter = CustomEntityFilter {
            definition_code: query.definition_code,
            text: query.text.filter(|t| !t.trim().is_empty()),
            locale_id: query.locale_id,
            workflow_status: required,
        };
        let found = SqliteCustomEntityRepo::search(conn, &filter, query.paging)?;
        let mut entities: HashMap<i64, CustomEntity> =
            SqliteCustomEntityRepo::get_entities(conn, &found.ids)?
                .into_iter()
                .map(|e| (e.custom_entity_id, e))
                .collect();

        let mut items = Vec::with_capacity(found.ids.len());
        for id in &found.ids {
            if let Some(entity) = entities.remove(id) {
                if let Some(summary) = render_summary(conn, &entity, query.workflow_status)? {
                    items.push(summary);
                }
            }
        }
        Ok(PagedQueryResult::new(items, found.total, query.paging))
    }
}

struct GetCustomEntityMicroSummariesByIdRangeHandler;

impl QueryHandler for GetCustomEntityMicroSummariesByIdRangeHandler {
    type Query = GetCustomEntityMicroSummariesByIdRangeQuery;

    fn execute(
        &self,
        query: GetCustomEntityMicroSummariesByIdRangeQuery,
        ctx: &HandlerContext<'_>,
    ) -> Result<HashMap<i64, RootEntityMicroSummary>> {
        let conn = ctx.conn();
        let services = ctx.services();
        let entities = SqliteCustomEntityRepo::get_entities(conn, &query.custom_entity_ids)?;

        let codes: Vec<String> = entities.iter().map(|e| e.definition_code.clone()).collect();
        services.permissions.enforce_custom_entity_permission(
            PermissionType::Read,
            &codes,
            ctx.user(),
        )?;

        let mut results = HashMap::with_capacity(entities.len());
        for entity in entities {
            let Some(definition) = services.definitions.get(&entity.definition_code) else {
                continue;
            };
            let versions = SqliteCustomEntityRepo::get_versions(conn, entity.custom_entity_id)?;
            let title = select_entity_version(&versions, WorkflowStatusQuery::Latest)
                .map(|v| v.title.clone())
                .unwrap_or_default();
            results.insert(
                entity.custom_entity_id,
                RootEntityMicroSummary {
                    root_entity_id: entity.custom_entity_id,
                    root_entity_title: title,
                    entity_definition_name: definition.name.clone(),
                    entity_definition_code: definition.code.clone(),
                },
            );
        }
        Ok(results)
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_query(GetAllCustomEntityDefinitionMicroSummariesHandler)?;
    registry.register_query(GetCustomEntityDefinitionMicroSummaryByIdHandler)?;
    registry.register_query(GetAllCustomEntityRoutingRulesHandler)?;
    registry.register_query(GetCustomEntityRoutingRuleByRouteFormatHandler)?;
    registry.register_query(GetCustomEntityRoutesByDefinitionCodeHandler)?;
    registry.register_query(GetCustomEntityRouteByPathHandler)?;
    registry.register_query(GetCustomEntityDetailsByIdHandler)?;
    registry.register_query(GetCustomEntityRenderSummaryByIdHandler)?;
    registry.register_query(GetCustomEntityRenderSummariesByIdRangeHandler)?;
    registry.register_query(GetCustomEntityRenderSummariesByDefinitionCodeHandler)?;
    registry.register_query(GetCustomEntityVersionSummariesByCustomEntityIdHandler)?;
    registry.register_query(IsCustomEntityPathUniqueHandler)?;
    registry.register_query(SearchCustomEntitySummariesHandler)?;
    registry.register_query(SearchCustomEntityRenderSummariesHandler)?;
    registry.register_query(GetCustomEntityMicroSummariesByIdRangeHandler)?;
    Ok(())
}
