// Every permission-requiring command, run by a user holding every permission
// except the one the command declares, must be refused before it writes.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use folio_core::errors::{ExError, ExErrorKind};
use folio_core::model::PageType;
use folio_core::permissions::{
    ExecutionContext, Permission, PermissionType, IMAGE_ASSET_ENTITY_CODE, PAGE_ENTITY_CODE,
    SETTINGS_ENTITY_CODE, WEB_DIRECTORY_ENTITY_CODE,
};
use folio_core::Command;
use folio_engine::commands::custom_entities::{
    AddCustomEntityCommand, AddCustomEntityDraftVersionCommand, DeleteCustomEntityCommand,
    DeleteCustomEntityDraftVersionCommand, OrderedItemInsertPosition, PublishCustomEntityCommand,
    ReOrderCustomEntitiesCommand, UnPublishCustomEntityCommand,
    UpdateCustomEntityDraftVersionCommand, UpdateCustomEntityOrderingPositionCommand,
    UpdateCustomEntityUrlCommand,
};
use folio_engine::commands::image_assets::{
    AddImageAssetCommand, DeleteImageAssetCommand, ImageAssetFileUpload, UpdateImageAssetCommand,
};
use folio_engine::commands::pages::{
    AddPageCommand, AddPageDraftVersionCommand, DeletePageCommand, DeletePageDraftVersionCommand,
    PublishPageCommand, UnPublishPageCommand, UpdatePageDraftVersionCommand,
    UpdatePageUrlCommand,
};
use folio_engine::commands::site::{AddLocaleCommand, AddWebDirectoryCommand};
use folio_engine::Engine;
use serde_json::json;

use common::{admin, setup_engine, user_with, BLOG_POST, CATEGORY};

const TABLES: [&str; 8] = [
    "locales",
    "web_directories",
    "pages",
    "page_versions",
    "custom_entities",
    "custom_entity_versions",
    "image_assets",
    "image_asset_tags",
];

const ALL_TYPES: [PermissionType; 7] = [
    PermissionType::Read,
    PermissionType::Create,
    PermissionType::Update,
    PermissionType::UpdateUrl,
    PermissionType::Publish,
    PermissionType::Delete,
    PermissionType::AdminModule,
];

/// Ids of the content the commands under test target
struct Fixture {
    page_id: i64,
    unchanged_page_id: i64,
    post_id: i64,
    other_post_id: i64,
    image_asset_id: i64,
}

/// Published generic page in the root directory
fn generic_page() -> AddPageCommand {
    AddPageCommand {
        web_directory_id: 1,
        locale_id: None,
        url_path: String::new(),
        page_type: PageType::Generic,
        custom_entity_definition_code: None,
        custom_entity_routing_rule: None,
        title: String::new(),
        meta_description: String::new(),
        exclude_from_sitemap: false,
        publish: true,
    }
}

/// A page and a post that are both published with a pending draft, a second
/// published page and post without drafts, and an image asset
fn seed(engine: &Engine) -> Fixture {
    let pages = engine.pages(admin());
    let page_id = pages
        .add(AddPageCommand {
            url_path: "about".to_string(),
            title: "About".to_string(),
            ..generic_page()
        })
        .unwrap();
    pages.add_draft_version(page_id).unwrap();
    let unchanged_page_id = pages
        .add(AddPageCommand {
            url_path: "team".to_string(),
            title: "Team".to_string(),
            ..generic_page()
        })
        .unwrap();

    let entities = engine.custom_entities(admin());
    let post = |slug: &str| AddCustomEntityCommand {
        definition_code: BLOG_POST.to_string(),
        locale_id: None,
        url_slug: Some(slug.to_string()),
        title: slug.to_string(),
        data: json!({}),
        publish: true,
    };
    let post_id = entities.add(post("first")).unwrap();
    entities.add_draft_version(post_id).unwrap();
    let other_post_id = entities.add(post("second")).unwrap();

    let image_asset_id = engine
        .image_assets(admin())
        .add(AddImageAssetCommand {
            title: "Logo".to_string(),
            tags: vec!["brand".to_string()],
            file: upload(),
        })
        .unwrap();

    Fixture {
        page_id,
        unchanged_page_id,
        post_id,
        other_post_id,
        image_asset_id,
    }
}

fn upload() -> ImageAssetFileUpload {
    ImageAssetFileUpload {
        file_name: "logo.png".to_string(),
        width: 10,
        height: 10,
        bytes: b"png bytes".to_vec(),
    }
}

/// Every row of every content table, rendered for comparison
fn snapshot(engine: &Engine) -> Vec<String> {
    let conn = engine.connection();
    let mut rows = Vec::new();
    for table in TABLES {
        let mut stmt = conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", table))
            .unwrap();
        let columns = stmt.column_count();
        let mut query = stmt.query([]).unwrap();
        while let Some(row) = query.next().unwrap() {
            let values: Vec<rusqlite::types::Value> =
                (0..columns).map(|i| row.get(i).unwrap()).collect();
            rows.push(format!("{}: {:?}", table, values));
        }
    }
    rows
}

/// A signed in user holding every permission on every known code but `denied`
fn user_without(denied: &Permission) -> ExecutionContext {
    let codes = [
        PAGE_ENTITY_CODE,
        IMAGE_ASSET_ENTITY_CODE,
        WEB_DIRECTORY_ENTITY_CODE,
        SETTINGS_ENTITY_CODE,
        BLOG_POST,
        CATEGORY,
    ];
    let granted = codes
        .iter()
        .flat_map(|code| ALL_TYPES.iter().map(|t| Permission::new(*code, *t)))
        .filter(|p| p != denied);
    user_with(granted)
}

type Run = Box<dyn Fn(&Engine, &ExecutionContext) -> Result<(), ExError>>;

fn run<C>(command: C) -> Run
where
    C: Command + Clone + 'static,
{
    Box::new(move |engine, ctx| engine.execute_command(command.clone(), ctx).map(|_| ()))
}

fn denied_cases(f: &Fixture) -> Vec<(Permission, Run)> {
    let page = |t| Permission::page(t);
    let post = |t| Permission::custom_entity(BLOG_POST, t);
    vec![
        (
            page(PermissionType::Create),
            run(AddPageCommand {
                url_path: "contact".to_string(),
                title: "Contact".to_string(),
                publish: false,
                ..generic_page()
            }),
        ),
        (
            page(PermissionType::UpdateUrl),
            run(UpdatePageUrlCommand {
                page_id: f.page_id,
                web_directory_id: 1,
                locale_id: None,
                url_path: "about-us".to_string(),
                custom_entity_routing_rule: None,
            }),
        ),
        (
            page(PermissionType::Create),
            run(AddPageDraftVersionCommand {
                page_id: f.unchanged_page_id,
            }),
        ),
        (
            page(PermissionType::Update),
            run(UpdatePageDraftVersionCommand {
                page_id: f.page_id,
                title: "Renamed".to_string(),
                meta_description: String::new(),
                exclude_from_sitemap: true,
                publish: false,
            }),
        ),
        (
            page(PermissionType::Update),
            run(DeletePageDraftVersionCommand { page_id: f.page_id }),
        ),
        (
            page(PermissionType::Publish),
            run(PublishPageCommand { page_id: f.page_id }),
        ),
        (
            page(PermissionType::Publish),
            run(UnPublishPageCommand { page_id: f.page_id }),
        ),
        (
            page(PermissionType::Delete),
            run(DeletePageCommand { page_id: f.page_id }),
        ),
        (
            post(PermissionType::Create),
            run(AddCustomEntityCommand {
                definition_code: BLOG_POST.to_string(),
                locale_id: None,
                url_slug: Some("third".to_string()),
                title: "Third".to_string(),
                data: json!({}),
                publish: false,
            }),
        ),
        (
            post(PermissionType::Create),
            run(AddCustomEntityDraftVersionCommand {
                custom_entity_id: f.other_post_id,
            }),
        ),
        (
            post(PermissionType::Update),
            run(UpdateCustomEntityDraftVersionCommand {
                custom_entity_id: f.post_id,
                title: "Renamed".to_string(),
                data: json!({ "body": "changed" }),
                publish: false,
            }),
        ),
        (
            post(PermissionType::Update),
            run(DeleteCustomEntityDraftVersionCommand {
                custom_entity_id: f.post_id,
            }),
        ),
        (
            post(PermissionType::Publish),
            run(PublishCustomEntityCommand {
                custom_entity_id: f.post_id,
            }),
        ),
        (
            post(PermissionType::Publish),
            run(UnPublishCustomEntityCommand {
                custom_entity_id: f.other_post_id,
            }),
        ),
        (
            post(PermissionType::Update),
            run(UpdateCustomEntityUrlCommand {
                custom_entity_id: f.post_id,
                locale_id: None,
                url_slug: "renamed".to_string(),
            }),
        ),
        (
            post(PermissionType::Update),
            run(UpdateCustomEntityOrderingPositionCommand {
                custom_entity_id: f.post_id,
                relative_to_custom_entity_id: None,
                position: OrderedItemInsertPosition::Start,
            }),
        ),
        (
            post(PermissionType::Update),
            run(ReOrderCustomEntitiesCommand {
                definition_code: BLOG_POST.to_string(),
                locale_id: None,
                ordered_custom_entity_ids: vec![f.other_post_id, f.post_id],
            }),
        ),
        (
            post(PermissionType::Delete),
            run(DeleteCustomEntityCommand {
                custom_entity_id: f.post_id,
            }),
        ),
        (
            Permission::image_asset(PermissionType::Create),
            run(AddImageAssetCommand {
                title: "Banner".to_string(),
                tags: vec![],
                file: upload(),
            }),
        ),
        (
            Permission::image_asset(PermissionType::Update),
            run(UpdateImageAssetCommand {
                image_asset_id: f.image_asset_id,
                title: "Renamed".to_string(),
                tags: vec![],
                file: None,
            }),
        ),
        (
            Permission::image_asset(PermissionType::Delete),
            run(DeleteImageAssetCommand {
                image_asset_id: f.image_asset_id,
            }),
        ),
        (
            Permission::settings(PermissionType::Update),
            run(AddLocaleCommand {
                iso_code: "en-GB".to_string(),
                name: "English".to_string(),
            }),
        ),
        (
            Permission::web_directory(PermissionType::Create),
            run(AddWebDirectoryCommand {
                parent_web_directory_id: 1,
                name: "Blog".to_string(),
                url_path: "blog".to_string(),
            }),
        ),
    ]
}

#[test]
fn test_every_command_refuses_without_its_permission() {
    let (_tmp, engine) = setup_engine();
    let fixture = seed(&engine);
    let before = snapshot(&engine);

    for (denied, command) in denied_cases(&fixture) {
        let err = command(&engine, &user_without(&denied)).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Forbidden, "{}: {}", denied, err);
        assert_eq!(err.value(), Some(denied.to_string().as_str()));
        assert_eq!(snapshot(&engine), before, "{} wrote before refusing", denied);
    }
}

#[test]
fn test_every_command_runs_once_its_permission_is_granted() {
    let case_count = {
        let (_tmp, engine) = setup_engine();
        denied_cases(&seed(&engine)).len()
    };

    // Each case on fresh content, so a refusal above can only come from the
    // missing permission
    for index in 0..case_count {
        let (_tmp, engine) = setup_engine();
        let fixture = seed(&engine);
        let (permission, command) = denied_cases(&fixture).swap_remove(index);
        let granted = user_without(&Permission::new("NOTHNG", PermissionType::Read));
        let result = command(&engine, &granted);
        assert!(result.is_ok(), "{}: {:?}", permission, result.err());
    }
}

#[test]
fn test_anonymous_user_is_refused_before_writing() {
    let (_tmp, engine) = setup_engine();
    let fixture = seed(&engine);
    let before = snapshot(&engine);

    for (_, command) in denied_cases(&fixture) {
        let err = command(&engine, &ExecutionContext::anonymous()).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Unauthorised, "{}", err);
    }
    assert_eq!(snapshot(&engine), before);
}
