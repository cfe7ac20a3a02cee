// Integration tests for image asset commands and queries, including the
// file store round trip and render detail caching.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use folio_core::errors::ExErrorKind;
use folio_core::messages::ContentMessage;
use folio_core::model::PagingParams;
use folio_core::permissions::{Permission, PermissionType};
use folio_engine::commands::image_assets::{
    AddImageAssetCommand, ImageAssetFileUpload, UpdateImageAssetCommand,
};
use folio_engine::queries::image_assets::SearchImageAssetSummariesQuery;

use common::{admin, count_rows, setup_engine, user_with, MessageLog};

fn upload(file_name: &str, bytes: &[u8]) -> ImageAssetFileUpload {
    ImageAssetFileUpload {
        file_name: file_name.to_string(),
        width: 800,
        height: 600,
        bytes: bytes.to_vec(),
    }
}

fn add_command(title: &str, tags: &[&str]) -> AddImageAssetCommand {
    AddImageAssetCommand {
        title: title.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        file: upload("Team Photo.PNG", b"\x89PNG fake image bytes"),
    }
}

#[test]
fn test_add_then_read_file() {
    let (tmp, engine) = setup_engine();
    let assets = engine.image_assets(admin());

    let id = assets.add(add_command("Team", &["people"])).unwrap();

    let details = assets.get_details_by_id(id).unwrap().unwrap();
    assert_eq!(details.file_name, "team-photo");
    assert_eq!(details.extension, "png");
    assert_eq!(details.file_size, 21);

    let file = assets.get_file_by_id(id).unwrap().unwrap();
    assert_eq!(file.bytes, b"\x89PNG fake image bytes".to_vec());
    assert_eq!(file.file_name, "team-photo.png");
    assert_eq!(file.content_type, "image/png");
    assert!(tmp.path().join("assets").exists());
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let (_tmp, engine) = setup_engine();
    let err = engine
        .image_assets(admin())
        .add(AddImageAssetCommand {
            file: upload("notes.txt", b"hello"),
            ..add_command("Notes", &[])
        })
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PropertyValidation);
    assert_eq!(err.property(), Some("extension"));
    assert_eq!(count_rows(&engine, "image_assets"), 0);
}

#[test]
fn test_empty_file_is_rejected() {
    let (_tmp, engine) = setup_engine();
    let err = engine
        .image_assets(admin())
        .add(AddImageAssetCommand {
            file: upload("empty.png", b""),
            ..add_command("Empty", &[])
        })
        .unwrap_err();
    assert_eq!(err.property(), Some("file"));
}

#[test]
fn test_add_requires_create_permission() {
    let (_tmp, engine) = setup_engine();
    let reader = user_with([Permission::image_asset(PermissionType::Read)]);

    let err = engine
        .image_assets(reader)
        .add(add_command("Nope", &[]))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
    assert_eq!(count_rows(&engine, "image_assets"), 0);
}

#[test]
fn test_update_with_new_file_clears_cache_and_reports_change() {
    let (_tmp, engine) = setup_engine();
    let log = MessageLog::attach(&engine);
    let assets = engine.image_assets(admin());
    let id = assets.add(add_command("Logo", &["brand"])).unwrap();
    let cache = &engine.services().image_asset_cache;

    let before = assets.get_render_details_by_id(id).unwrap().unwrap();
    assert!(cache.contains(id));

    assets
        .update(UpdateImageAssetCommand {
            image_asset_id: id,
            title: "Logo v2".to_string(),
            tags: vec!["brand".to_string(), "2024".to_string()],
            file: Some(upload("logo.webp", b"new logo bytes")),
        })
        .unwrap();
    assert!(!cache.contains(id));

    let after = assets.get_render_details_by_id(id).unwrap().unwrap();
    assert_eq!(after.title, "Logo v2");
    assert_eq!(after.extension, "webp");
    assert_ne!(before.file_stamp, after.file_stamp);
    assert_eq!(
        log.messages().last(),
        Some(&ContentMessage::ImageAssetUpdated {
            image_asset_id: id,
            has_file_changed: true,
        })
    );
}

#[test]
fn test_metadata_update_keeps_file() {
    let (_tmp, engine) = setup_engine();
    let log = MessageLog::attach(&engine);
    let assets = engine.image_assets(admin());
    let id = assets.add(add_command("Banner", &[])).unwrap();

    assets
        .update(UpdateImageAssetCommand {
            image_asset_id: id,
            title: "Wide banner".to_string(),
            tags: vec![],
            file: None,
        })
        .unwrap();

    let file = assets.get_file_by_id(id).unwrap().unwrap();
    assert_eq!(file.bytes, b"\x89PNG fake image bytes".to_vec());
    assert_eq!(
        log.messages().last(),
        Some(&ContentMessage::ImageAssetUpdated {
            image_asset_id: id,
            has_file_changed: false,
        })
    );
}

#[test]
fn test_search_by_tag_and_text() {
    let (_tmp, engine) = setup_engine();
    let assets = engine.image_assets(admin());
    assets.add(add_command("Office", &["people", "office"])).unwrap();
    assets.add(add_command("Board", &["people"])).unwrap();
    assets.add(add_command("Skyline", &["city"])).unwrap();

    let people = assets
        .search_summaries(SearchImageAssetSummariesQuery {
            tags: vec!["people".to_string()],
            paging: PagingParams::new(1, 10),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(people.total_items, 2);

    let office = assets
        .search_summaries(SearchImageAssetSummariesQuery {
            text: Some("offi".to_string()),
            tags: vec!["people".to_string()],
            paging: PagingParams::new(1, 10),
        })
        .unwrap();
    assert_eq!(office.items.len(), 1);
    assert_eq!(office.items[0].title, "Office");
}

#[test]
fn test_deleted_asset_disappears() {
    let (_tmp, engine) = setup_engine();
    let assets = engine.image_assets(admin());
    let id = assets.add(add_command("Old", &[])).unwrap();
    assets.get_render_details_by_id(id).unwrap();

    assets.delete(id).unwrap();

    assert!(assets.get_render_details_by_id(id).unwrap().is_none());
    assert!(assets.get_details_by_id(id).unwrap().is_none());
    let err = assets.delete(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
