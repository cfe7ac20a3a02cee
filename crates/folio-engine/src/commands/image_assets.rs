//! Image asset commands
//!
//! File bytes go to the content-addressed asset store before the record is
//! written. A failed write leaves at most an unreferenced file behind.

use std::path::Path;

use folio_core::errors::FolioError;
use folio_core::impl_command;
use folio_core::messages::ContentMessage;
use folio_core::model::ImageAsset;
use folio_core::permissions::{Permission, PermissionType};
use folio_core::rules::{normalize_tags, slugify, validate_image_extension, validate_title};
use folio_store::errors::Result;
use folio_store::repo::SqliteImageAssetRepo;

use crate::executor::{CommandHandler, HandlerContext, HandlerRegistry};

const ENTITY: &str = "image_asset";

/// An uploaded image; dimensions are measured by the host
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAssetFileUpload {
    /// Original file name including its extension
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAssetFileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAssetFileUpload")
            .field("file_name", &self.file_name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddImageAssetCommand {
    pub title: String,
    pub tags: Vec<String>,
    pub file: ImageAssetFileUpload,
}

/// Update metadata and optionally replace the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateImageAssetCommand {
    pub image_asset_id: i64,
    pub title: String,
    pub tags: Vec<String>,
    pub file: Option<ImageAssetFileUpload>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteImageAssetCommand {
    pub image_asset_id: i64,
}

impl_command!(
    AddImageAssetCommand => i64,
    UpdateImageAssetCommand => (),
    DeleteImageAssetCommand => (),
);

/// File fields of an asset once the upload is stored
struct StoredFile {
    file_name: String,
    extension: String,
    width: u32,
    height: u32,
    file_size: u64,
    file_digest: String,
}

fn store_file(ctx: &HandlerContext<'_>, upload: &ImageAssetFileUpload) -> Result<StoredFile> {
    let path = Path::new(&upload.file_name);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    let extension = validate_image_extension(extension)?;

    if upload.bytes.is_empty() {
        return Err(FolioError::property("file", "The file is empty").into());
    }
    if upload.width == 0 || upload.height == 0 {
        return Err(FolioError::property("file", "Image dimensions must be positive").into());
    }

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .map(slugify)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ENTITY.replace('_', "-"));

    let file_digest = ctx.services().asset_files.write(&upload.bytes, &extension)?;
    Ok(StoredFile {
        file_name: stem,
        extension,
        width: upload.width,
        height: upload.height,
        file_size: upload.bytes.len() as u64,
        file_digest,
    })
}

struct AddImageAssetHandler;

impl CommandHandler for AddImageAssetHandler {
    type Command = AddImageAssetCommand;

    fn permissions(
        &self,
        _command: &AddImageAssetCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::image_asset(PermissionType::Create)])
    }

    fn execute(&self, command: AddImageAssetCommand, ctx: &HandlerContext<'_>) -> Result<i64> {
        validate_title("title", &command.title)?;
        let file = store_file(ctx, &command.file)?;

        let execution = ctx.execution();
        let asset = ImageAsset {
            image_asset_id: 0,
            title: command.title.trim().to_string(),
            file_name: file.file_name,
            extension: file.extension,
            width: file.width,
            height: file.height,
            file_size: file.file_size,
            file_digest: file.file_digest,
            tags: normalize_tags(&command.tags),
            is_deleted: false,
            created_at: execution.executed_at,
            updated_at: execution.executed_at,
            creator_id: execution.user.user_id,
        };
        let image_asset_id = ctx.in_transaction(|conn| SqliteImageAssetRepo::insert(conn, &asset))?;

        ctx.services().image_asset_cache.clear(image_asset_id);
        ctx.publish(ContentMessage::ImageAssetAdded { image_asset_id })?;
        Ok(image_asset_id)
    }
}

struct UpdateImageAssetHandler;

impl CommandHandler for UpdateImageAssetHandler {
    type Command = UpdateImageAssetCommand;

    fn permissions(
        &self,
        _command: &UpdateImageAssetCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::image_asset(PermissionType::Update)])
    }

    fn execute(&self, command: UpdateImageAssetCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        validate_title("title", &command.title)?;
        let mut asset = SqliteImageAssetRepo::get(ctx.conn(), command.image_asset_id)?
            .ok_or_else(|| FolioError::not_found(ENTITY, command.image_asset_id))?;

        let mut has_file_changed = false;
        if let Some(upload) = &command.file {
            let file = store_file(ctx, upload)?;
            has_file_changed =
                file.file_digest != asset.file_digest || file.extension != asset.extension;
            asset.file_name = file.file_name;
            asset.extension = file.extension;
            asset.width = file.width;
            asset.height = file.height;
            asset.file_size = file.file_size;
            asset.file_digest = file.file_digest;
        }
        asset.title = command.title.trim().to_string();
        asset.tags = normalize_tags(&command.tags);
        asset.updated_at = ctx.execution().executed_at;

        ctx.in_transaction(|conn| SqliteImageAssetRepo::update(conn, &asset))?;

        ctx.services().image_asset_cache.clear(asset.image_asset_id);
        ctx.publish(ContentMessage::ImageAssetUpdated {
            image_asset_id: asset.image_asset_id,
            has_file_changed,
        })
    }
}

struct DeleteImageAssetHandler;

impl CommandHandler for DeleteImageAssetHandler {
    type Command = DeleteImageAssetCommand;

    fn permissions(
        &self,
        _command: &DeleteImageAssetCommand,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(vec![Permission::image_asset(PermissionType::Delete)])
    }

    fn execute(&self, command: DeleteImageAssetCommand, ctx: &HandlerContext<'_>) -> Result<()> {
        let asset = SqliteImageAssetRepo::get(ctx.conn(), command.image_asset_id)?
            .ok_or_else(|| FolioError::not_found(ENTITY, command.image_asset_id))?;
        ctx.in_transaction(|conn| SqliteImageAssetRepo::mark_deleted(conn, asset.image_asset_id))?;

        ctx.services().image_asset_cache.clear(asset.image_asset_id);
        ctx.publish(ContentMessage::ImageAssetDeleted {
            image_asset_id: asset.image_asset_id,
        })
    }
}

pub(crate) fn register(registry: &mut HandlerRegistry) -> Result<()> {
    registry.register_command(AddImageAssetHandler)?;
    registry.register_command(UpdateImageAssetHandler)?;
    registry.register_command(DeleteImageAssetHandler)?;
    Ok(())
}
