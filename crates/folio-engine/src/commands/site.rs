//! Locale and web directory setup

use folio_core::errors::FolioError;
use folio_core::impl_command;
use folio_core::messages::ContentMessage;
use folio_core::permissions::{Permission, PermissionType};
use folio_core::rules::{validate_iso_code, validate_title, validate_url_slug};
use folio_store::errors::Result;
use folio_store::repo::SqliteSiteRepo;

use crate::executor::{CommandHandler, HandlerContext, HandlerRegistry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddLocaleCommand {
    pub iso_code: String,
    pub name: String,
}

/// Directories hang off a parent; the root directory is seeded by migrations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddWebDirectoryCommand {
    pub parent_web_directory_id: i64,
    pub name: String,
    pub url_path: String,
}

impl_command!(
    AddLocaleCommand => i64,
    AddWebDirectoryCommand => i64,
);

struct AddLocaleHandler;

impl CommandHandler for AddLocaleHandler {
    type Command = AddLocaleCommand;

    fn permissions(
        &self,
        _command: &AddLocaleCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::settings(PermissionType::Update)])
    }

    fn execute(&self, command: AddLocaleCommand, ctx: &HandlerContext<'_>) -> Result<i64> {
        let iso_code = command.iso_code.trim();
        validate_iso_code(iso_code)?;
        validate_title("name", &command.name)?;

        if SqliteSiteRepo::get_locale_by_iso_code(ctx.conn(), iso_code)?.is_some() {
            return Err(FolioError::UniqueConstraintViolation {
                property: "iso_code".to_string(),
                value: iso_code.to_string(),
                message: format!("A locale with the code '{}' already exists", iso_code),
            }
            .into());
        }

        let locale_id = ctx.in_transaction(|conn| {
            SqliteSiteRepo::insert_locale(conn, iso_code, command.name.trim())
        })?;
        ctx.publish(ContentMessage::LocaleAdded { locale_id })?;
        Ok(locale_id)
    }
}

struct AddWebDirectoryHandler;

impl CommandHandler for AddWebDirectoryHandler {
    type Command = AddWebDirectoryCommand;

    fn permissions(
        &self,
        _command: &AddWebDirectoryCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::web_directory(PermissionType::Create)])
    }

    fn execute(&self, command: AddWebDirectoryCommand, ctx: &HandlerContext<'_>) -> Result<i64> {
        validate_title("name", &command.name)?;
        validate_url_slug("url_path", &command.url_path)?;

        if SqliteSiteRepo::get_web_directory(ctx.conn(), command.parent_web_directory_id)?
            .is_none()
        {
            return Err(
                FolioError::not_found("web_directory", command.parent_web_directory_id).into(),
            );
        }
        if SqliteSiteRepo::web_directory_path_exists(
            ctx.conn(),
            command.parent_web_directory_id,
            &command.url_path,
        )? {
            return Err(FolioError::UniqueConstraintViolation {
                property: "url_path".to_string(),
                value: command.url_path.clone(),
                message: format!(
                    "A directory with the path '{}' already exists in that directory",
                    command.url_path
                ),
            }
            .into());
        }

        let created_at = ctx.execution().executed_at;
        let web_directory_id = ctx.in_transaction(|conn| {
            SqliteSiteRepo::insert_web_directory(
                conn,
                command.parent_web_directory_id,
                command.name.trim(),
                &command.url_path,
                created_at,
            )
        })?;

        // Page full paths are derived from directory paths
        ctx.services().page_cache.clear_all();
        ctx.publish(ContentMessage::WebDirectoryAdded { web_directory_id })?;
        Ok(web_directory_id)
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_command(AddLocaleHandler)?;
    registry.register_command(AddWebDirectoryHandler)?;
    Ok(())
}
