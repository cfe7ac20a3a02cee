// Integration tests for custom entity commands and queries.
// Covers the publish workflow, per-definition permissions, slug uniqueness,
// routing through details pages, ordering and cache invalidation.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use folio_core::errors::ExErrorKind;
use folio_core::messages::ContentMessage;
use folio_core::model::{PageType, PagingParams, WorkflowStatus, WorkflowStatusQuery};
use folio_core::permissions::{ExecutionContext, Permission, PermissionType};
use folio_engine::commands::custom_entities::{
    AddCustomEntityCommand, DeleteCustomEntityCommand, OrderedItemInsertPosition,
    PublishCustomEntityCommand, ReOrderCustomEntitiesCommand,
    UpdateCustomEntityDraftVersionCommand, UpdateCustomEntityOrderingPositionCommand,
    UpdateCustomEntityUrlCommand,
};
use folio_engine::commands::pages::AddPageCommand;
use folio_engine::queries::custom_entities::{
    GetCustomEntityRouteByPathQuery, SearchCustomEntityRenderSummariesQuery,
};
use folio_engine::repositories::CustomEntityRepository;
use serde_json::json;

use common::{admin, count_rows, setup_engine, user_with, MessageLog, BLOG_POST, CATEGORY};

fn blog_post(title: &str) -> AddCustomEntityCommand {
    AddCustomEntityCommand {
        definition_code: BLOG_POST.to_string(),
        locale_id: None,
        url_slug: None,
        title: title.to_string(),
        data: json!({ "body": format!("{} body", title) }),
        publish: false,
    }
}

fn ordering(repo: &CustomEntityRepository<'_>) -> Vec<(i64, Option<i64>)> {
    let mut routes: Vec<_> = repo
        .get_routes_by_definition_code(BLOG_POST)
        .unwrap()
        .into_iter()
        .map(|r| (r.custom_entity_id, r.ordering))
        .collect();
    routes.sort();
    routes
}

// ---------------------------------------------------------------------------
// Add / workflow
// ---------------------------------------------------------------------------

#[test]
fn test_add_generates_slug_from_title() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());

    let id = entities.add(blog_post("Hello World")).unwrap();

    let details = entities.get_details_by_id(id).unwrap().unwrap();
    assert_eq!(details.entity.url_slug, "hello-world");
    assert_eq!(details.definition.code, BLOG_POST);
    assert!(details.has_draft);
    assert!(!details.is_published);
}

#[test]
fn test_publish_without_draft_fails_then_succeeds_after_new_draft() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    let id = entities
        .add(AddCustomEntityCommand {
            publish: true,
            ..blog_post("Launch")
        })
        .unwrap();

    let err = entities.publish(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidWorkflowTransition);

    entities.add_draft_version(id).unwrap();
    entities
        .update_draft_version(UpdateCustomEntityDraftVersionCommand {
            custom_entity_id: id,
            title: "Launch day".to_string(),
            data: json!({ "body": "updated" }),
            publish: false,
        })
        .unwrap();
    entities.publish(id).unwrap();

    let published = entities
        .get_render_summary_by_id(id, WorkflowStatusQuery::Published)
        .unwrap()
        .unwrap();
    assert_eq!(published.title, "Launch day");
    assert_eq!(published.workflow_status, WorkflowStatus::Published);

    let versions = entities.get_version_summaries(id).unwrap();
    assert_eq!(versions.len(), 2);
    assert_eq!(versions[0].workflow_status, WorkflowStatus::Published);
    assert_eq!(versions[1].workflow_status, WorkflowStatus::Archived);
}

#[test]
fn test_add_draft_when_draft_exists_fails() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    let id = entities.add(blog_post("Drafty")).unwrap();

    let err = entities.add_draft_version(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidWorkflowTransition);
    assert_eq!(count_rows(&engine, "custom_entity_versions"), 1);
}

#[test]
fn test_duplicate_slug_rejected_for_unique_definition() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    entities.add(blog_post("Same title")).unwrap();

    let err = entities.add(blog_post("Same title")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::UniqueViolation);
    assert_eq!(err.property(), Some("url_slug"));
    assert_eq!(count_rows(&engine, "custom_entities"), 1);

    // Categories do not force uniqueness
    let category = |title: &str| AddCustomEntityCommand {
        definition_code: CATEGORY.to_string(),
        ..blog_post(title)
    };
    entities.add(category("Rust")).unwrap();
    entities.add(category("Rust")).unwrap();
}

#[test]
fn test_unknown_definition_is_not_found() {
    let (_tmp, engine) = setup_engine();
    let err = engine
        .custom_entities(admin())
        .add(AddCustomEntityCommand {
            definition_code: "NOPENO".to_string(),
            ..blog_post("Nothing")
        })
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_data_must_be_an_object() {
    let (_tmp, engine) = setup_engine();
    let err = engine
        .custom_entities(admin())
        .add(AddCustomEntityCommand {
            data: json!([1, 2, 3]),
            ..blog_post("Listy")
        })
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PropertyValidation);
    assert_eq!(err.property(), Some("data"));
}

// ---------------------------------------------------------------------------
// Permissions
// ---------------------------------------------------------------------------

#[test]
fn test_permissions_are_per_definition() {
    let (_tmp, engine) = setup_engine();
    let id = engine.custom_entities(admin()).add(blog_post("Secret")).unwrap();

    let category_editor = user_with([
        Permission::custom_entity(CATEGORY, PermissionType::Read),
        Permission::custom_entity(CATEGORY, PermissionType::Publish),
    ]);
    let entities = engine.custom_entities(category_editor);

    let err = entities.publish(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
    assert_eq!(err.value(), Some("BLGPST:publish"));

    let err = entities.get_details_by_id(id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let unchanged = engine
        .custom_entities(admin())
        .get_details_by_id(id)
        .unwrap()
        .unwrap();
    assert!(!unchanged.is_published);
}

#[test]
fn test_micro_summaries_enforce_read_on_every_definition() {
    let (_tmp, engine) = setup_engine();
    let admin_repo = engine.custom_entities(admin());
    let post = admin_repo.add(blog_post("Post")).unwrap();
    let category = admin_repo
        .add(AddCustomEntityCommand {
            definition_code: CATEGORY.to_string(),
            ..blog_post("Cat")
        })
        .unwrap();

    let post_reader = user_with([Permission::custom_entity(BLOG_POST, PermissionType::Read)]);
    let err = engine
        .custom_entities(post_reader.clone())
        .get_micro_summaries_by_id_range(vec![post, category])
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let summaries = engine
        .custom_entities(post_reader)
        .get_micro_summaries_by_id_range(vec![post])
        .unwrap();
    assert_eq!(summaries[&post].root_entity_title, "Post");
    assert_eq!(summaries[&post].entity_definition_name, "Blog Post");
}

#[test]
fn test_elevated_repository_bypasses_permissions() {
    let (_tmp, engine) = setup_engine();
    let id = engine
        .custom_entities(user_with([]))
        .with_elevated_permissions()
        .add(blog_post("Imported"))
        .unwrap();
    assert!(id > 0);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[test]
fn test_route_by_path_resolves_published_entity() {
    let (_tmp, engine) = setup_engine();
    let page_id = engine
        .pages(admin())
        .add(AddPageCommand {
            web_directory_id: 1,
            locale_id: None,
            url_path: String::new(),
            page_type: PageType::CustomEntityDetails,
            custom_entity_definition_code: Some(BLOG_POST.to_string()),
            custom_entity_routing_rule: Some("{UrlSlug}".to_string()),
            title: "Blog post".to_string(),
            meta_description: String::new(),
            exclude_from_sitemap: false,
            publish: true,
        })
        .unwrap();
    let entities = engine.custom_entities(admin());
    let published = entities
        .add(AddCustomEntityCommand {
            publish: true,
            ..blog_post("Going live")
        })
        .unwrap();
    entities.add(blog_post("Not yet")).unwrap();

    let lookup = |path: &str, include_unpublished: bool| {
        entities
            .get_route_by_path(GetCustomEntityRouteByPathQuery {
                page_id,
                path: path.to_string(),
                include_unpublished,
            })
            .unwrap()
    };

    assert_eq!(lookup("/going-live", false).unwrap().custom_entity_id, published);
    assert!(lookup("/not-yet", false).is_none());
    assert!(lookup("/not-yet", true).is_some());
    assert!(lookup("/going-live/extra", false).is_none());
}

// ---------------------------------------------------------------------------
// Url, ordering, delete
// ---------------------------------------------------------------------------

#[test]
fn test_update_url_reports_old_slug() {
    let (_tmp, engine) = setup_engine();
    let log = MessageLog::attach(&engine);
    let entities = engine.custom_entities(admin());
    let id = entities.add(blog_post("Old name")).unwrap();

    entities
        .update_url(UpdateCustomEntityUrlCommand {
            custom_entity_id: id,
            locale_id: None,
            url_slug: "new-name".to_string(),
        })
        .unwrap();

    assert_eq!(
        log.messages().last(),
        Some(&ContentMessage::CustomEntityUrlChanged {
            custom_entity_id: id,
            definition_code: BLOG_POST.to_string(),
            old_url_slug: "old-name".to_string(),
            has_published_version_changed: false,
        })
    );
}

#[test]
fn test_reorder_and_move_positions() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    let a = entities.add(blog_post("A")).unwrap();
    let b = entities.add(blog_post("B")).unwrap();
    let c = entities.add(blog_post("C")).unwrap();

    entities
        .reorder(ReOrderCustomEntitiesCommand {
            definition_code: BLOG_POST.to_string(),
            locale_id: None,
            ordered_custom_entity_ids: vec![b, a],
        })
        .unwrap();
    assert_eq!(ordering(&entities), vec![(a, Some(2)), (b, Some(1)), (c, None)]);

    entities
        .update_ordering_position(UpdateCustomEntityOrderingPositionCommand {
            custom_entity_id: c,
            relative_to_custom_entity_id: Some(b),
            position: OrderedItemInsertPosition::After,
        })
        .unwrap();
    assert_eq!(
        ordering(&entities),
        vec![(a, Some(3)), (b, Some(1)), (c, Some(2))]
    );
}

#[test]
fn test_reorder_unordered_definition_fails() {
    let (_tmp, engine) = setup_engine();
    let err = engine
        .custom_entities(admin())
        .reorder(ReOrderCustomEntitiesCommand {
            definition_code: CATEGORY.to_string(),
            locale_id: None,
            ordered_custom_entity_ids: vec![],
        })
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::PropertyValidation);
}

#[test]
fn test_mutation_clears_cached_routes() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    let id = entities.add(blog_post("Cached")).unwrap();
    let cache = &engine.services().custom_entity_cache;

    entities.get_routes_by_definition_code(BLOG_POST).unwrap();
    assert!(cache.contains(BLOG_POST));

    entities.publish(id).unwrap();
    assert!(!cache.contains(BLOG_POST));

    let routes = entities.get_routes_by_definition_code(BLOG_POST).unwrap();
    assert!(routes[0].is_published);
    assert!(cache.contains(BLOG_POST));
}

#[test]
fn test_delete_removes_entity_and_versions() {
    let (_tmp, engine) = setup_engine();
    let log = MessageLog::attach(&engine);
    let entities = engine.custom_entities(admin());
    let id = entities.add(blog_post("Short lived")).unwrap();

    entities.delete(id).unwrap();

    assert!(entities.get_details_by_id(id).unwrap().is_none());
    assert_eq!(count_rows(&engine, "custom_entity_versions"), 0);
    assert_eq!(
        log.names(),
        vec!["custom_entity_added", "custom_entity_deleted"]
    );
}

// ---------------------------------------------------------------------------
// Render summary search

fn render_search(status: WorkflowStatusQuery) -> SearchCustomEntityRenderSummariesQuery {
    SearchCustomEntityRenderSummariesQuery {
        definition_code: BLOG_POST.to_string(),
        text: None,
        locale_id: None,
        workflow_status: status,
        paging: PagingParams::new(1, 10),
    }
}

#[test]
fn test_search_render_summaries_by_workflow_status() {
    let (_tmp, engine) = setup_engine();
    let entities = engine.custom_entities(admin());
    entities
        .add(AddCustomEntityCommand {
            publish: true,
            ..blog_post("Live")
        })
        .unwrap();
    entities.add(blog_post("Unreleased")).unwrap();
    let edited = entities
        .add(AddCustomEntityCommand {
            publish: true,
            ..blog_post("Edited")
        })
        .unwrap();
    entities.add_draft_version(edited).unwrap();
    entities
        .update_draft_version(UpdateCustomEntityDraftVersionCommand {
            custom_entity_id: edited,
            title: "Edited again".to_string(),
            data: json!({}),
            publish: false,
        })
        .unwrap();

    let titles = |status| {
        let found = entities.search_render_summaries(render_search(status)).unwrap();
        let mut titles: Vec<String> = found.items.into_iter().map(|s| s.title).collect();
        titles.sort();
        (found.total_items, titles)
    };

    assert_eq!(
        titles(WorkflowStatusQuery::Published),
        (2, vec!["Edited".to_string(), "Live".to_string()])
    );
    assert_eq!(
        titles(WorkflowStatusQuery::Draft),
        (2, vec!["Edited again".to_string(), "Unreleased".to_string()])
    );
    assert_eq!(titles(WorkflowStatusQuery::Latest).0, 3);

    let err = entities
        .search_render_summaries(render_search(WorkflowStatusQuery::SpecificVersion(1)))
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_search_render_summaries_needs_definition_read() {
    let (_tmp, engine) = setup_engine();
    let reader = user_with([Permission::custom_entity(CATEGORY, PermissionType::Read)]);

    let err = engine
        .execute_query(render_search(WorkflowStatusQuery::Published), &reader)
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
    assert_eq!(err.value(), Some("BLGPST:read"));
}

#[test]
fn test_unknown_id_is_hidden_from_anonymous_callers() {
    let (_tmp, engine) = setup_engine();

    let err = engine
        .execute_command(
            PublishCustomEntityCommand {
                custom_entity_id: 9999,
            },
            &ExecutionContext::anonymous(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Unauthorised);

    let err = engine
        .execute_command(
            DeleteCustomEntityCommand {
                custom_entity_id: 9999,
            },
            &user_with([]),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
