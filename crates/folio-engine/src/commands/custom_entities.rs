//! Custom entity commands
//!
//! Permissions are declared against the entity's definition code. Commands
//! that carry only an id look the code up before the executor checks them.

use folio_core::definitions::CustomEntityDefinition;
use folio_core::errors::FolioError;
use folio_core::impl_command;
use folio_core::messages::ContentMessage;
use folio_core::model::{CustomEntity, CustomEntityVersion, WorkflowStatus};
use folio_core::ops::{plan_add_draft, plan_delete_draft, plan_publish, plan_unpublish};
use folio_core::permissions::{Permission, PermissionType};
use folio_core::rules::{slugify, validate_title, validate_url_slug};
use folio_store::errors::Result;
use folio_store::repo::{SqliteCustomEntityRepo, SqliteSiteRepo};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::executor::{CommandHandler, HandlerContext, HandlerRegistry};
use crate::queries::custom_entities::{entity_permissions, IsCustomEntityPathUniqueQuery};

const ENTITY: &str = "custom_entity";

/// Registers the definition row the entity tables reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureCustomEntityDefinitionExistsCommand {
    pub definition_code: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddCustomEntityCommand {
    pub definition_code: String,
    pub locale_id: Option<i64>,
    /// Generated from the title when empty and the definition allows it
    pub url_slug: Option<String>,
    pub title: String,
    pub data: serde_json::Value,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCustomEntityDraftVersionCommand {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCustomEntityDraftVersionCommand {
    pub custom_entity_id: i64,
    pub title: String,
    pub data: serde_json::Value,
    pub publish: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCustomEntityDraftVersionCommand {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCustomEntityCommand {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnPublishCustomEntityCommand {
    pub custom_entity_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCustomEntityUrlCommand {
    pub custom_entity_id: i64,
    pub locale_id: Option<i64>,
    pub url_slug: String,
}

/// Where to move an entity within its definition's ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderedItemInsertPosition {
    Start,
    End,
    Before,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCustomEntityOrderingPositionCommand {
    pub custom_entity_id: i64,
    /// Required for `Before` and `After`
    pub relative_to_custom_entity_id: Option<i64>,
    pub position: OrderedItemInsertPosition,
}

/// Replace the ordering of a definition; unlisted entities become unordered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReOrderCustomEntitiesCommand {
    pub definition_code: String,
    pub locale_id: Option<i64>,
    pub ordered_custom_entity_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteCustomEntityCommand {
    pub custom_entity_id: i64,
}

impl_command!(
    EnsureCustomEntityDefinitionExistsCommand => (),
    AddCustomEntityCommand => i64,
    AddCustomEntityDraftVersionCommand => i64,
    UpdateCustomEntityDraftVersionCommand => (),
    DeleteCustomEntityDraftVersionCommand => (),
    PublishCustomEntityCommand => (),
    UnPublishCustomEntityCommand => (),
    UpdateCustomEntityUrlCommand => (),
    UpdateCustomEntityOrderingPositionCommand => (),
    ReOrderCustomEntitiesCommand => (),
    DeleteCustomEntityCommand => (),
);

fn require_entity(conn: &Connection, custom_entity_id: i64) -> Result<CustomEntity> {
    SqliteCustomEntityRepo::get_entity(conn, custom_entity_id)?
        .ok_or_else(|| FolioError::not_found(ENTITY, custom_entity_id).into())
}

fn require_definition<'a>(
    ctx: &HandlerContext<'a>,
    definition_code: &str,
) -> Result<&'a CustomEntityDefinition> {
    Ok(ctx.services().definitions.require(definition_code)?)
}

fn validate_data(data: &serde_json::Value) -> Result<()> {
    if data.is_object() || data.is_null() {
        return Ok(());
    }
    Err(FolioError::property("data", "Data must be a JSON object").into())
}

fn validate_locale(
    conn: &Connection,
    definition: &CustomEntityDefinition,
    locale_id: Option<i64>,
) -> Result<()> {
    let Some(locale_id) = locale_id else {
        return Ok(());
    };
    if !definition.has_locale {
        return Err(FolioError::PropertyValidation {
            property: "locale_id".to_string(),
            message: format!("{} cannot be assigned a locale", definition.name_plural),
            value: Some(locale_id.to_string()),
        }
        .into());
    }
    if SqliteSiteRepo::get_locale(conn, locale_id)?.is_none() {
        return Err(FolioError::PropertyValidation {
            property: "locale_id".to_string(),
            message: "Locale not found".to_string(),
            value: Some(locale_id.to_string()),
        }
        .into());
    }
    Ok(())
}

fn ensure_slug_unique(
    ctx: &HandlerContext<'_>,
    definition: &CustomEntityDefinition,
    custom_entity_id: Option<i64>,
    locale_id: Option<i64>,
    url_slug: &str,
) -> Result<()> {
    if !definition.force_url_slug_uniqueness {
        return Ok(());
    }
    let is_unique = ctx.query(IsCustomEntityPathUniqueQuery {
        definition_code: definition.code.clone(),
        custom_entity_id,
        locale_id,
        url_slug: url_slug.to_string(),
    })?;
    if is_unique {
        return Ok(());
    }
    Err(FolioError::UniqueConstraintViolation {
        property: "url_slug".to_string(),
        value: url_slug.to_string(),
        message: format!(
            "A {} already exists with the url slug '{}'",
            definition.name.to_lowercase(),
            url_slug
        ),
    }
    .into())
}

fn entity_versions(conn: &Connection, custom_entity_id: i64) -> Result<Vec<CustomEntityVersion>> {
    SqliteCustomEntityRepo::get_versions(conn, custom_entity_id)
}

fn publish_versions(conn: &Connection, custom_entity_id: i64) -> Result<()> {
    let versions = entity_versions(conn, custom_entity_id)?;
    let states: Vec<_> = versions.iter().map(CustomEntityVersion::state).collect();
    let plan = plan_publish(ENTITY, custom_entity_id, &states)?;
    SqliteCustomEntityRepo::apply_transitions(conn, &plan)
}

fn add_draft(ctx: &HandlerContext<'_>, conn: &Connection, custom_entity_id: i64) -> Result<i64> {
    let versions = entity_versions(conn, custom_entity_id)?;
    let states: Vec<_> = versions.iter().map(CustomEntityVersion::state).collect();
    let source_id = plan_add_draft(ENTITY, custom_entity_id, &states)?;
    let source = versions
        .iter()
        .find(|v| v.custom_entity_version_id == source_id)
        .ok_or_else(|| FolioError::not_found("custom_entity_version", source_id))?;

    SqliteCustomEntityRepo::insert_version(
        conn,
        &CustomEntityVersion {
            custom_entity_version_id: 0,
            custom_entity_id,
            title: source.title.clone(),
            data: source.data.clone(),
            workflow_status: WorkflowStatus::Draft,
            created_at: ctx.execution().executed_at,
            creator_id: ctx.user().user_id,
        },
    )
}

fn clear_cache(ctx: &HandlerContext<'_>, definition_code: &str, custom_entity_id: i64) {
    ctx.services()
        .custom_entity_cache
        .clear(definition_code, custom_entity_id);
}

struct EnsureCustomEntityDefinitionExistsHandler;

impl CommandHandler for EnsureCustomEntityDefinitionExistsHandler {
    type Command = EnsureCustomEntityDefinitionExistsCommand;

    fn execute(
        &self,
        command: EnsureCustomEntityDefinitionExistsCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let definition = require_definition(ctx, &command.definition_code)?;
        let created = ctx.in_transaction(|conn| {
            SqliteCustomEntityRepo::ensure_definition(conn, definition)
        })?;
        if created {
            tracing::debug!(
                definition_code = definition.code.as_str(),
                "custom entity definition stored"
            );
        }
        Ok(())
    }
}

struct AddCustomEntityHandler;

impl CommandHandler for AddCustomEntityHandler {
    type Command = AddCustomEntityCommand;

    fn permissions(
        &self,
        command: &AddCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        let code = command.definition_code.as_str();
        let auto_publish = ctx
            .services()
            .definitions
            .get(code)
            .is_some_and(|d| d.auto_publish);

        let mut required = vec![Permission::custom_entity(code, PermissionType::Create)];
        if command.publish || auto_publish {
            required.push(Permission::custom_entity(code, PermissionType::Publish));
        }
        Ok(required)
    }

    fn execute(&self, command: AddCustomEntityCommand, ctx: &HandlerContext<'_>) -> Result<i64> {
        let definition = require_definition(ctx, &command.definition_code)?;
        validate_title("title", &command.title)?;
        validate_data(&command.data)?;
        validate_locale(ctx.conn(), definition, command.locale_id)?;

        let url_slug = match command.url_slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ if definition.auto_generate_url_slug => slugify(&command.title),
            _ => String::new(),
        };
        validate_url_slug("url_slug", &url_slug)?;
        let publish = command.publish || definition.auto_publish;
        let execution = ctx.execution();
        let custom_entity_id = ctx.in_transaction(|conn| {
            ensure_slug_unique(ctx, definition, None, command.locale_id, &url_slug)?;
            ctx.command(EnsureCustomEntityDefinitionExistsCommand {
                definition_code: definition.code.clone(),
            })?;
            let custom_entity_id = SqliteCustomEntityRepo::insert_entity(
                conn,
                &CustomEntity {
                    custom_entity_id: 0,
                    definition_code: definition.code.clone(),
                    locale_id: command.locale_id,
                    url_slug: url_slug.clone(),
                    ordering: None,
                    created_at: execution.executed_at,
                    creator_id: execution.user.user_id,
                },
            )?;
            SqliteCustomEntityRepo::insert_version(
                conn,
                &CustomEntityVersion {
                    custom_entity_version_id: 0,
                    custom_entity_id,
                    title: command.title.trim().to_string(),
                    data: command.data.clone(),
                    workflow_status: WorkflowStatus::Draft,
                    created_at: execution.executed_at,
                    creator_id: execution.user.user_id,
                },
            )?;
            if publish {
                publish_versions(conn, custom_entity_id)?;
            }
            Ok(custom_entity_id)
        })?;

        clear_cache(ctx, &definition.code, custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityAdded {
            custom_entity_id,
            definition_code: definition.code.clone(),
            has_published_version_changed: publish,
        })?;
        Ok(custom_entity_id)
    }
}

struct AddCustomEntityDraftVersionHandler;

impl CommandHandler for AddCustomEntityDraftVersionHandler {
    type Command = AddCustomEntityDraftVersionCommand;

    fn permissions(
        &self,
        command: &AddCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Create)
    }

    fn execute(
        &self,
        command: AddCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<i64> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        let version_id =
            ctx.in_transaction(|conn| add_draft(ctx, conn, entity.custom_entity_id))?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityDraftVersionUpdated {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
            custom_entity_version_id: version_id,
        })?;
        Ok(version_id)
    }
}

struct UpdateCustomEntityDraftVersionHandler;

impl CommandHandler for UpdateCustomEntityDraftVersionHandler {
    type Command = UpdateCustomEntityDraftVersionCommand;

    fn permissions(
        &self,
        command: &UpdateCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        let mut required =
            entity_permissions(ctx, command.custom_entity_id, PermissionType::Update)?;
        if command.publish {
            required.extend(entity_permissions(
                ctx,
                command.custom_entity_id,
                PermissionType::Publish,
            )?);
        }
        Ok(required)
    }

    fn execute(
        &self,
        command: UpdateCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        validate_title("title", &command.title)?;
        validate_data(&command.data)?;
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;

        let version_id = ctx.in_transaction(|conn| {
            let versions = entity_versions(conn, entity.custom_entity_id)?;
            let draft_id = match versions
                .iter()
                .find(|v| v.workflow_status == WorkflowStatus::Draft)
            {
                Some(draft) => draft.custom_entity_version_id,
                None => add_draft(ctx, conn, entity.custom_entity_id)?,
            };
            SqliteCustomEntityRepo::update_draft(
                conn,
                &CustomEntityVersion {
                    custom_entity_version_id: draft_id,
                    custom_entity_id: entity.custom_entity_id,
                    title: command.title.trim().to_string(),
                    data: command.data.clone(),
                    workflow_status: WorkflowStatus::Draft,
                    created_at: ctx.execution().executed_at,
                    creator_id: ctx.user().user_id,
                },
            )?;
            if command.publish {
                publish_versions(conn, entity.custom_entity_id)?;
            }
            Ok(draft_id)
        })?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityDraftVersionUpdated {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code.clone(),
            custom_entity_version_id: version_id,
        })?;
        if command.publish {
            ctx.publish(ContentMessage::CustomEntityPublished {
                custom_entity_id: entity.custom_entity_id,
                definition_code: entity.definition_code,
            })?;
        }
        Ok(())
    }
}

struct DeleteCustomEntityDraftVersionHandler;

impl CommandHandler for DeleteCustomEntityDraftVersionHandler {
    type Command = DeleteCustomEntityDraftVersionCommand;

    fn permissions(
        &self,
        command: &DeleteCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Update)
    }

    fn execute(
        &self,
        command: DeleteCustomEntityDraftVersionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        let version_id = ctx.in_transaction(|conn| {
            let versions = entity_versions(conn, entity.custom_entity_id)?;
            let states: Vec<_> = versions.iter().map(CustomEntityVersion::state).collect();
            let draft_id = plan_delete_draft(ENTITY, entity.custom_entity_id, &states)?;
            SqliteCustomEntityRepo::delete_version(conn, draft_id)?;
            Ok(draft_id)
        })?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityDraftVersionDeleted {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
            custom_entity_version_id: version_id,
        })
    }
}

struct PublishCustomEntityHandler;

impl CommandHandler for PublishCustomEntityHandler {
    type Command = PublishCustomEntityCommand;

    fn permissions(
        &self,
        command: &PublishCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Publish)
    }

    fn execute(
        &self,
        command: PublishCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        ctx.in_transaction(|conn| publish_versions(conn, entity.custom_entity_id))?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityPublished {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
        })
    }
}

struct UnPublishCustomEntityHandler;

impl CommandHandler for UnPublishCustomEntityHandler {
    type Command = UnPublishCustomEntityCommand;

    fn permissions(
        &self,
        command: &UnPublishCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Publish)
    }

    fn execute(
        &self,
        command: UnPublishCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        ctx.in_transaction(|conn| {
            let versions = entity_versions(conn, entity.custom_entity_id)?;
            let states: Vec<_> = versions.iter().map(CustomEntityVersion::state).collect();
            let transition = plan_unpublish(ENTITY, entity.custom_entity_id, &states)?;
            SqliteCustomEntityRepo::apply_transitions(conn, &[transition])
        })?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityUnPublished {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
        })
    }
}

struct UpdateCustomEntityUrlHandler;

impl CommandHandler for UpdateCustomEntityUrlHandler {
    type Command = UpdateCustomEntityUrlCommand;

    fn permissions(
        &self,
        command: &UpdateCustomEntityUrlCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Update)
    }

    fn execute(
        &self,
        command: UpdateCustomEntityUrlCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        let definition = require_definition(ctx, &entity.definition_code)?;
        let url_slug = command.url_slug.trim().to_string();
        validate_url_slug("url_slug", &url_slug)?;
        validate_locale(ctx.conn(), definition, command.locale_id)?;
        let is_published = ctx.in_transaction(|conn| {
            ensure_slug_unique(
                ctx,
                definition,
                Some(entity.custom_entity_id),
                command.locale_id,
                &url_slug,
            )?;
            SqliteCustomEntityRepo::update_url(
                conn,
                entity.custom_entity_id,
                command.locale_id,
                &url_slug,
            )?;
            Ok(entity_versions(conn, entity.custom_entity_id)?
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Published))
        })?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityUrlChanged {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
            old_url_slug: entity.url_slug,
            has_published_version_changed: is_published,
        })
    }
}

fn require_ordered(definition: &CustomEntityDefinition) -> Result<()> {
    if definition.is_ordered {
        return Ok(());
    }
    Err(FolioError::PropertyValidation {
        property: "definition_code".to_string(),
        message: format!("{} are not ordered", definition.name_plural),
        value: Some(definition.code.clone()),
    }
    .into())
}

/// Write sequential positions for `ids` and clear everything else in scope
fn write_ordering(conn: &Connection, scope: &[CustomEntity], ids: &[i64]) -> Result<()> {
    for entity in scope {
        let position = ids
            .iter()
            .position(|id| *id == entity.custom_entity_id)
            .map(|index| index as i64 + 1);
        if position != entity.ordering {
            SqliteCustomEntityRepo::update_ordering(conn, entity.custom_entity_id, position)?;
        }
    }
    Ok(())
}

fn entities_in_scope(
    conn: &Connection,
    definition_code: &str,
    locale_id: Option<i64>,
) -> Result<Vec<CustomEntity>> {
    Ok(SqliteCustomEntityRepo::list_by_definition(conn, definition_code)?
        .into_iter()
        .filter(|e| e.locale_id == locale_id)
        .collect())
}

struct UpdateCustomEntityOrderingPositionHandler;

impl CommandHandler for UpdateCustomEntityOrderingPositionHandler {
    type Command = UpdateCustomEntityOrderingPositionCommand;

    fn permissions(
        &self,
        command: &UpdateCustomEntityOrderingPositionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Update)
    }

    fn execute(
        &self,
        command: UpdateCustomEntityOrderingPositionCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        let definition = require_definition(ctx, &entity.definition_code)?;
        require_ordered(definition)?;

        let ordered_ids = ctx.in_transaction(|conn| {
            let scope = entities_in_scope(conn, &entity.definition_code, entity.locale_id)?;
            let mut ids: Vec<i64> = scope
                .iter()
                .filter(|e| e.ordering.is_some() && e.custom_entity_id != entity.custom_entity_id)
                .map(|e| e.custom_entity_id)
                .collect();

            let index = match command.position {
                OrderedItemInsertPosition::Start => 0,
                OrderedItemInsertPosition::End => ids.len(),
                OrderedItemInsertPosition::Before | OrderedItemInsertPosition::After => {
                    let relative_index = command
                        .relative_to_custom_entity_id
                        .and_then(|relative| ids.iter().position(|id| *id == relative))
                        .ok_or_else(|| FolioError::PropertyValidation {
                            property: "relative_to_custom_entity_id".to_string(),
                            message: "The relative entity is not part of the ordering"
                                .to_string(),
                            value: command.relative_to_custom_entity_id.map(|id| id.to_string()),
                        })?;
                    if command.position == OrderedItemInsertPosition::After {
                        relative_index + 1
                    } else {
                        relative_index
                    }
                }
            };
            ids.insert(index, entity.custom_entity_id);
            write_ordering(conn, &scope, &ids)?;
            Ok(ids)
        })?;

        ctx.services()
            .custom_entity_cache
            .clear_definition(&entity.definition_code);
        ctx.publish(ContentMessage::CustomEntityOrderingUpdated {
            definition_code: entity.definition_code,
            custom_entity_ids: ordered_ids,
        })
    }
}

struct ReOrderCustomEntitiesHandler;

impl CommandHandler for ReOrderCustomEntitiesHandler {
    type Command = ReOrderCustomEntitiesCommand;

    fn permissions(
        &self,
        command: &ReOrderCustomEntitiesCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::custom_entity(
            &command.definition_code,
            PermissionType::Update,
        )])
    }

    fn execute(
        &self,
        command: ReOrderCustomEntitiesCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let definition = require_definition(ctx, &command.definition_code)?;
        require_ordered(definition)?;

        let mut ids: Vec<i64> = Vec::with_capacity(command.ordered_custom_entity_ids.len());
        for id in &command.ordered_custom_entity_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        ctx.in_transaction(|conn| {
            let scope = entities_in_scope(conn, &definition.code, command.locale_id)?;
            if let Some(unknown) = ids
                .iter()
                .find(|id| !scope.iter().any(|e| e.custom_entity_id == **id))
            {
                return Err(FolioError::PropertyValidation {
                    property: "ordered_custom_entity_ids".to_string(),
                    message: format!(
                        "Custom entity {} is not a {} in this locale",
                        unknown,
                        definition.name.to_lowercase()
                    ),
                    value: Some(unknown.to_string()),
                }
                .into());
            }
            write_ordering(conn, &scope, &ids)
        })?;

        ctx.services()
            .custom_entity_cache
            .clear_definition(&definition.code);
        ctx.publish(ContentMessage::CustomEntityOrderingUpdated {
            definition_code: definition.code.clone(),
            custom_entity_ids: ids,
        })
    }
}

struct DeleteCustomEntityHandler;

impl CommandHandler for DeleteCustomEntityHandler {
    type Command = DeleteCustomEntityCommand;

    fn permissions(
        &self,
        command: &DeleteCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        entity_permissions(ctx, command.custom_entity_id, PermissionType::Delete)
    }

    fn execute(
        &self,
        command: DeleteCustomEntityCommand,
        ctx: &HandlerContext<'_>,
    ) -> Result<()> {
        let entity = require_entity(ctx.conn(), command.custom_entity_id)?;
        ctx.in_transaction(|conn| {
            SqliteCustomEntityRepo::delete_entity(conn, entity.custom_entity_id)
        })?;

        clear_cache(ctx, &entity.definition_code, entity.custom_entity_id);
        ctx.publish(ContentMessage::CustomEntityDeleted {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code,
        })
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_command(EnsureCustomEntityDefinitionExistsHandler)?;
    registry.register_command(AddCustomEntityHandler)?;
    registry.register_command(AddCustomEntityDraftVersionHandler)?;
    registry.register_command(UpdateCustomEntityDraftVersionHandler)?;
    registry.register_command(DeleteCustomEntityDraftVersionHandler)?;
    registry.register_command(PublishCustomEntityHandler)?;
    registry.register_command(UnPublishCustomEntityHandler)?;
    registry.register_command(UpdateCustomEntityUrlHandler)?;
    registry.register_command(UpdateCustomEntityOrderingPositionHandler)?;
    registry.register_command(ReOrderCustomEntitiesHandler)?;
    registry.register_command(DeleteCustomEntityHandler)?;
    Ok(())
}
