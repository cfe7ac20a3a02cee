//! Page commands
//!
//! Every handler follows the same shape: load and validate, write inside one
//! transaction, then clear the page cache and publish its messages.

use chrono::{DateTime, Utc};
use folio_core::errors::FolioError;
use folio_core::impl_command;
use folio_core::messages::ContentMessage;
use folio_core::model::{Page, PageType, PageVersion, WorkflowStatus};
use folio_core::ops::{plan_add_draft, plan_delete_draft, plan_publish, plan_unpublish};
use folio_core::permissions::{Permission, PermissionType};
use folio_core::rules::{validate_title, validate_url_path};
use folio_store::errors::Result;
use folio_store::repo::{SqlitePageRepo, SqliteSiteRepo};
use rusqlite::Connection;

use crate::executor::{CommandHandler, HandlerContext, HandlerRegistry};
use crate::queries::custom_entities::{
    GetCustomEntityDefinitionMicroSummaryByIdQuery, GetCustomEntityRoutingRuleByRouteFormatQuery,
};
use crate::queries::pages::{IsPagePathUniqueQuery, SitePaths};

const ENTITY: &str = "page";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPageCommand {
    pub web_directory_id: i64,
    pub locale_id: Option<i64>,
    /// Leaf segment for generic pages; ignored for custom entity details pages
    pub url_path: String,
    pub page_type: PageType,
    pub custom_entity_definition_code: Option<String>,
    pub custom_entity_routing_rule: Option<String>,
    pub title: String,
    pub meta_description: String,
    pub exclude_from_sitemap: bool,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePageUrlCommand {
    pub page_id: i64,
    pub web_directory_id: i64,
    pub locale_id: Option<i64>,
    pub url_path: String,
    pub custom_entity_routing_rule: Option<String>,
}

/// Creates a draft copied from the published (or latest) version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPageDraftVersionCommand {
    pub page_id: i64,
}

/// Overwrites the draft, creating it first when the page has none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePageDraftVersionCommand {
    pub page_id: i64,
    pub title: String,
    pub meta_description: String,
    pub exclude_from_sitemap: bool,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePageDraftVersionCommand {
    pub page_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPageCommand {
    pub page_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnPublishPageCommand {
    pub page_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePageCommand {
    pub page_id: i64,
}

impl_command!(
    AddPageCommand => i64,
    UpdatePageUrlCommand => (),
    AddPageDraftVersionCommand => i64,
    UpdatePageDraftVersionCommand => (),
    DeletePageDraftVersionCommand => (),
    PublishPageCommand => (),
    UnPublishPageCommand => (),
    DeletePageCommand => (),
);

fn require_page(conn: &Connection, page_id: i64) -> Result<Page> {
    SqlitePageRepo::get_page(conn, page_id)?
        .ok_or_else(|| FolioError::not_found(ENTITY, page_id).into())
}

fn version_states(conn: &Connection, page_id: i64) -> Result<Vec<PageVersion>> {
    SqlitePageRepo::get_versions(conn, page_id)
}

fn publish_versions(conn: &Connection, page_id: i64) -> Result<()> {
    let versions = version_states(conn, page_id)?;
    let states: Vec<_> = versions.iter().map(PageVersion::state).collect();
    let plan = plan_publish(ENTITY, page_id, &states)?;
    SqlitePageRepo::apply_transitions(conn, &plan)
}

/// Url path and definition code a page will be stored with
struct ResolvedUrl {
    url_path: String,
    definition_code: Option<String>,
}

/// Resolve the stored url path for a page
///
/// Generic pages keep the given path. Custom entity details pages store the
/// routing rule's format, which must suit the definition's slug uniqueness.
fn resolve_url(
    ctx: &HandlerContext<'_>,
    page_type: PageType,
    url_path: &str,
    definition_code: Option<&str>,
    routing_rule: Option<&str>,
) -> Result<ResolvedUrl> {
    if page_type == PageType::Generic {
        validate_url_path("url_path", url_path)?;
        return Ok(ResolvedUrl {
            url_path: url_path.to_string(),
            definition_code: None,
        });
    }

    let route_format = routing_rule.unwrap_or_default();
    let rule = ctx
        .query(GetCustomEntityRoutingRuleByRouteFormatQuery {
            route_format: route_format.to_string(),
        })?
        .ok_or_else(|| FolioError::PropertyValidation {
            property: "custom_entity_routing_rule".to_string(),
            message: "Routing rule not found".to_string(),
            value: Some(route_format.to_string()),
        })?;

    let code = definition_code.ok_or_else(|| {
        FolioError::property(
            "custom_entity_definition_code",
            "A custom entity details page needs a custom entity definition",
        )
    })?;
    let definition = ctx
        .query(GetCustomEntityDefinitionMicroSummaryByIdQuery {
            definition_code: code.to_string(),
        })?
        .ok_or_else(|| FolioError::not_found("custom_entity_definition", code))?;

    if definition.force_url_slug_uniqueness && !rule.requires_unique_url_slug {
        return Err(FolioError::PropertyValidation {
            property: "custom_entity_routing_rule".to_string(),
            message: "This routing rule does not require a unique url slug, but the custom entity \
                      definition forces url slug uniqueness"
                .to_string(),
            value: Some(route_format.to_string()),
        }
        .into());
    }

    Ok(ResolvedUrl {
        url_path: rule.route_format,
        definition_code: Some(definition.code),
    })
}

fn ensure_path_unique(
    ctx: &HandlerContext<'_>,
    page_id: Option<i64>,
    web_directory_id: i64,
    locale_id: Option<i64>,
    url_path: &str,
) -> Result<()> {
    let is_unique = ctx.query(IsPagePathUniqueQuery {
        page_id,
        web_directory_id,
        locale_id,
        url_path: url_path.to_string(),
    })?;
    if is_unique {
        return Ok(());
    }
    Err(FolioError::UniqueConstraintViolation {
        property: "url_path".to_string(),
        value: url_path.to_string(),
        message: format!(
            "A page already exists with the path '{}' in that directory",
            url_path
        ),
    }
    .into())
}

fn validate_location(
    conn: &Connection,
    web_directory_id: i64,
    locale_id: Option<i64>,
) -> Result<()> {
    if SqliteSiteRepo::get_web_directory(conn, web_directory_id)?.is_none() {
        return Err(FolioError::PropertyValidation {
            property: "web_directory_id".to_string(),
            message: "Web directory not found".to_string(),
            value: Some(web_directory_id.to_string()),
        }
        .into());
    }
    if let Some(locale_id) = locale_id {
        if SqliteSiteRepo::get_locale(conn, locale_id)?.is_none() {
            return Err(FolioError::PropertyValidation {
                property: "locale_id".to_string(),
                message: "Locale not found".to_string(),
                value: Some(locale_id.to_string()),
            }
            .into());
        }
    }
    Ok(())
}

fn new_version(
    page_id: i64,
    title: &str,
    meta_description: &str,
    exclude_from_sitemap: bool,
    created_at: DateTime<Utc>,
    creator_id: Option<i64>,
) -> PageVersion {
    PageVersion {
        page_version_id: 0,
        page_id,
        title: title.trim().to_string(),
        meta_description: meta_description.trim().to_string(),
        exclude_from_sitemap,
        workflow_status: WorkflowStatus::Draft,
        created_at,
        creator_id,
    }
}

struct AddPageHandler;

impl CommandHandler for AddPageHandler {
    type Command = AddPageCommand;

    fn permissions(
        &self,
        command: &AddPageCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        let mut required = vec![Permission::page(PermissionType::Create)];
        if command.publish {
            required.push(Permission::page(PermissionType::Publish));
        }
        Ok(required)
    }

    fn execute(&self, command: AddPageCommand, ctx: &HandlerContext<'_>) -> Result<i64> {
        validate_title("title", &command.title)?;
        validate_location(ctx.conn(), command.web_directory_id, command.locale_id)?;
        let url = resolve_url(
            ctx,
            command.page_type,
            &command.url_path,
            command.custom_entity_definition_code.as_deref(),
            command.custom_entity_routing_rule.as_deref(),
        )?;
        let execution = ctx.execution();
        let page_id = ctx.in_transaction(|conn| {
            ensure_path_unique(
                ctx,
                None,
                command.web_directory_id,
                command.locale_id,
                &url.url_path,
            )?;
            let page = Page {
                page_id: 0,
                web_directory_id: command.web_directory_id,
                locale_id: command.locale_id,
                url_path: url.url_path.clone(),
                page_type: command.page_type,
                custom_entity_definition_code: url.definition_code.clone(),
                is_deleted: false,
                created_at: execution.executed_at,
                creator_id: execution.user.user_id,
            };
            let page_id = SqlitePageRepo::insert_page(conn, &page)?;
            SqlitePageRepo::insert_version(
                conn,
                &new_version(
                    page_id,
                    &command.title,
                    &command.meta_description,
                    command.exclude_from_sitemap,
                    execution.executed_at,
                    execution.user.user_id,
                ),
            )?;
            if command.publish {
                publish_versions(conn, page_id)?;
            }
            Ok(page_id)
        })?;

        ctx.services().page_cache.clear(page_id);
        ctx.publish(ContentMessage::PageAdded {
            page_id,
            has_published_version_changed: command.publish,
        })?;
        Ok(page_id)
    }
}

struct UpdatePageUrlHandler;

impl CommandHandler for UpdatePageUrlHandler {
    type Command = UpdatePageUrlCommand;

    fn permissions(
        &self,
        _command: &UpdatePageUrlCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::UpdateUrl)])
    }

    fn execute(&self, command: UpdatePageUrlCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        let page = require_page(ctx.conn(), command.page_id)?;
        validate_location(ctx.conn(), command.web_directory_id, command.locale_id)?;
        let url = resolve_url(
            ctx,
            page.page_type,
            &command.url_path,
            page.custom_entity_definition_code.as_deref(),
            command.custom_entity_routing_rule.as_deref(),
        )?;
        let is_published = ctx.in_transaction(|conn| {
            ensure_path_unique(
                ctx,
                Some(page.page_id),
                command.web_directory_id,
                command.locale_id,
                &url.url_path,
            )?;
            SqlitePageRepo::update_url(
                conn,
                page.page_id,
                command.web_directory_id,
                command.locale_id,
                &url.url_path,
                url.definition_code.as_deref(),
            )?;
            let versions = version_states(conn, page.page_id)?;
            Ok(versions
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Published))
        })?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageUrlChanged {
            page_id: page.page_id,
            has_published_version_changed: is_published,
        })
    }
}

/// Insert a draft copied from the version the workflow picks as its source
fn add_draft(ctx: &HandlerContext<'_>, conn: &Connection, page_id: i64) -> Result<i64> {
    let versions = version_states(conn, page_id)?;
    let states: Vec<_> = versions.iter().map(PageVersion::state).collect();
    let source_id = plan_add_draft(ENTITY, page_id, &states)?;
    let source = versions
        .iter()
        .find(|v| v.page_version_id == source_id)
        .ok_or_else(|| FolioError::not_found("page_version", source_id))?;

    let execution = ctx.execution();
    SqlitePageRepo::insert_version(
        conn,
        &new_version(
            page_id,
            &source.title,
            &source.meta_description,
            source.exclude_from_sitemap,
            execution.executed_at,
            execution.user.user_id,
        ),
    )
}

struct AddPageDraftVersionHandler;

impl CommandHandler for AddPageDraftVersionHandler {
    type Command = AddPageDraftVersionCommand;

    fn permissions(
        &self,
        _command: &AddPageDraftVersionCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::Create)])
    }

    fn execute(
        &self,
        command: AddPageDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<i64> {
        let page = require_page(ctx.conn(), command.page_id)?;
        let page_version_id = ctx.in_transaction(|conn| add_draft(ctx, conn, page.page_id))?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageDraftVersionUpdated {
            page_id: page.page_id,
            page_version_id,
        })?;
        Ok(page_version_id)
    }
}

struct UpdatePageDraftVersionHandler;

impl CommandHandler for UpdatePageDraftVersionHandler {
    type Command = UpdatePageDraftVersionCommand;

    fn permissions(
        &self,
        command: &UpdatePageDraftVersionCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        let mut required = vec![Permission::page(PermissionType::Update)];
        if command.publish {
            required.push(Permission::page(PermissionType::Publish));
        }
        Ok(required)
    }

    fn execute(
        &self,
        command: UpdatePageDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        validate_title("title", &command.title)?;
        let page = require_page(ctx.conn(), command.page_id)?;

        let page_version_id = ctx.in_transaction(|conn| {
            let versions = version_states(conn, page.page_id)?;
            let draft_id = match versions
                .iter()
                .find(|v| v.workflow_status == WorkflowStatus::Draft)
            {
                Some(draft) => draft.page_version_id,
                None => add_draft(ctx, conn, page.page_id)?,
            };

            let mut draft = new_version(
                page.page_id,
                &command.title,
                &command.meta_description,
                command.exclude_from_sitemap,
                ctx.execution().executed_at,
                ctx.user().user_id,
            );
            draft.page_version_id = draft_id;
            SqlitePageRepo::update_draft(conn, &draft)?;

            if command.publish {
                publish_versions(conn, page.page_id)?;
            }
            Ok(draft_id)
        })?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageDraftVersionUpdated {
            page_id: page.page_id,
            page_version_id,
        })?;
        if command.publish {
            ctx.publish(ContentMessage::PagePublished {
                page_id: page.page_id,
            })?;
        }
        Ok(())
    }
}

struct DeletePageDraftVersionHandler;

impl CommandHandler for DeletePageDraftVersionHandler {
    type Command = DeletePageDraftVersionCommand;

    fn permissions(
        &self,
        _command: &DeletePageDraftVersionCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::Update)])
    }

    fn execute(
        &self,
        command: DeletePageDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let page = require_page(ctx.conn(), command.page_id)?;
        let page_version_id = ctx.in_transaction(|conn| {
            let versions = version_states(conn, page.page_id)?;
            let states: Vec<_> = versions.iter().map(PageVersion::state).collect();
            let draft_id = plan_delete_draft(ENTITY, page.page_id, &states)?;
            SqlitePageRepo::delete_version(conn, draft_id)?;
            Ok(draft_id)
        })?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageDraftVersionDeleted {
            page_id: page.page_id,
            page_version_id,
        })
    }
}

struct PublishPageHandler;

impl CommandHandler for PublishPageHandler {
    type Command = PublishPageCommand;

    fn permissions(
        &self,
        _command: &PublishPageCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::Publish)])
    }

    fn execute(&self, command: PublishPageCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        let page = require_page(ctx.conn(), command.page_id)?;
        ctx.in_transaction(|conn| publish_versions(conn, page.page_id))?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PagePublished {
            page_id: page.page_id,
        })
    }
}

struct UnPublishPageHandler;

impl CommandHandler for UnPublishPageHandler {
    type Command = UnPublishPageCommand;

    fn permissions(
        &self,
        _command: &UnPublishPageCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::Publish)])
    }

    fn execute(&self, command: UnPublishPageCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        let page = require_page(ctx.conn(), command.page_id)?;
        ctx.in_transaction(|conn| {
            let versions = version_states(conn, page.page_id)?;
            let states: Vec<_> = versions.iter().map(PageVersion::state).collect();
            let transition = plan_unpublish(ENTITY, page.page_id, &states)?;
            SqlitePageRepo::apply_transitions(conn, &[transition])
        })?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageUnPublished {
            page_id: page.page_id,
        })
    }
}

struct DeletePageHandler;

impl CommandHandler for DeletePageHandler {
    type Command = DeletePageCommand;

    fn permissions(
        &self,
        _command: &DeletePageCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::page(PermissionType::Delete)])
    }

    fn execute(&self, command: DeletePageCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        let page = require_page(ctx.conn(), command.page_id)?;
        let full_path = SitePaths::load(ctx.conn())?.full_path(&page);
        ctx.in_transaction(|conn| SqlitePageRepo::mark_deleted(conn, page.page_id))?;

        ctx.services().page_cache.clear(page.page_id);
        ctx.publish(ContentMessage::PageDeleted {
            page_id: page.page_id,
            full_path,
        })
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_command(AddPageHandler)?;
    registry.register_command(UpdatePageUrlHandler)?;
    registry.register_command(AddPageDraftVersionHandler)?;
    registry.register_command(UpdatePageDraftVersionHandler)?;
    registry.register_command(DeletePageDraftVersionHandler)?;
    registry.register_command(PublishPageHandler)?;
    registry.register_command(UnPublishPageHandler)?;
    registry.register_command(DeletePageHandler)?;
    Ok(())
}
