// Shared setup for engine integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::sync::{Arc, Mutex};

use folio_core::definitions::CustomEntityDefinition;
use folio_core::messages::ContentMessage;
use folio_core::permissions::{ExecutionContext, Permission, PermissionType, Role, UserContext};
use folio_engine::config::{CacheConfig, EngineConfig};
use folio_engine::{Engine, EngineBuilder};
use tempfile::TempDir;

pub const BLOG_POST: &str = "BLGPST";
pub const CATEGORY: &str = "CATGRY";

pub fn blog_post_definition() -> CustomEntityDefinition {
    CustomEntityDefinition::new(BLOG_POST, "Blog Post")
        .force_url_slug_uniqueness()
        .ordered()
}

pub fn category_definition() -> CustomEntityDefinition {
    CustomEntityDefinition::new(CATEGORY, "Category").localized()
}

pub fn test_config(temp_dir: &TempDir) -> EngineConfig {
    EngineConfig {
        database_path: temp_dir.path().join("test.db"),
        asset_root: temp_dir.path().join("assets"),
        cache: CacheConfig::default(),
        ..EngineConfig::default()
    }
}

pub fn builder(temp_dir: &TempDir) -> EngineBuilder {
    Engine::builder(test_config(temp_dir))
        .with_definition(blog_post_definition())
        .with_definition(category_definition())
}

pub fn setup_engine() -> (TempDir, Engine) {
    let temp_dir = TempDir::new().unwrap();
    let engine = builder(&temp_dir).build().unwrap();
    (temp_dir, engine)
}

/// Records every published message
#[derive(Clone, Default)]
pub struct MessageLog {
    messages: Arc<Mutex<Vec<ContentMessage>>>,
}

impl MessageLog {
    pub fn attach(engine: &Engine) -> Self {
        let log = Self::default();
        let sink = log.messages.clone();
        engine
            .services()
            .messages
            .subscribe(Arc::new(move |message: &ContentMessage| -> folio_core::Result<()> {
                sink.lock().unwrap().push(message.clone());
                Ok(())
            }))
            .unwrap();
        log
    }

    pub fn messages(&self) -> Vec<ContentMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.messages().iter().map(ContentMessage::name).collect()
    }
}

pub fn admin() -> ExecutionContext {
    ExecutionContext::system()
}

/// A signed in user holding exactly `permissions`
pub fn user_with(permissions: impl IntoIterator<Item = Permission>) -> ExecutionContext {
    let role = Role::new(2, "Editor").with_permissions(permissions);
    ExecutionContext::new(UserContext::signed_in(42, role))
}

pub fn page_permissions(types: &[PermissionType]) -> Vec<Permission> {
    types.iter().map(|t| Permission::page(*t)).collect()
}

pub fn count_rows(engine: &Engine, table: &str) -> i64 {
    engine
        .connection()
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
        .unwrap()
}
