//! Engine assembly
//!
//! [`EngineBuilder`] collects definitions, routing rules, the permission
//! service and message subscribers, then opens the database, applies
//! migrations and registers every handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use folio_core::cache::{CustomEntityCache, ImageAssetCache, PageCache};
use folio_core::cqs::{Command, Query};
use folio_core::definitions::{CustomEntityDefinition, CustomEntityDefinitionRegistry};
use folio_core::errors::{ExError, ExErrorKind};
use folio_core::messages::{MessageAggregator, MessageSubscriber};
use folio_core::permissions::{
    ExecutionContext, PermissionValidationService, RoleBasedPermissionValidationService,
};
use folio_core::routing::{CustomEntityRoutingRule, RoutingRuleRegistry};
use folio_core::{log_op_end, log_op_error, log_op_start};
use folio_store::errors::Result;
use folio_store::migrations::apply_migrations;
use folio_store::{db, AssetFileStore};
use rusqlite::Connection;

use crate::commands;
use crate::commands::custom_entities::EnsureCustomEntityDefinitionExistsCommand;
use crate::config::EngineConfig;
use crate::executor::{Executor, HandlerRegistry};
use crate::queries;
use crate::repositories::{CustomEntityRepository, ImageAssetRepository, PageRepository};
use crate::services::Services;

pub struct EngineBuilder {
    config: EngineConfig,
    in_memory: bool,
    definitions: Vec<CustomEntityDefinition>,
    routing_rules: Vec<Arc<dyn CustomEntityRoutingRule>>,
    permissions: Arc<dyn PermissionValidationService>,
    subscribers: Vec<Arc<dyn MessageSubscriber>>,
}

impl EngineBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            in_memory: false,
            definitions: Vec::new(),
            routing_rules: Vec::new(),
            permissions: Arc::new(RoleBasedPermissionValidationService),
            subscribers: Vec::new(),
        }
    }

    /// Use a private in-memory database instead of `database_path`
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub fn with_definition(mut self, definition: CustomEntityDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Register a rule next to the built-in `{UrlSlug}` and `{Id}/{UrlSlug}`
    pub fn with_routing_rule(mut self, rule: Arc<dyn CustomEntityRoutingRule>) -> Self {
        self.routing_rules.push(rule);
        self
    }

    pub fn with_permission_service(
        mut self,
        permissions: Arc<dyn PermissionValidationService>,
    ) -> Self {
        self.permissions = permissions;
        self
    }

    /// Subscribers receive messages in the order they were added
    pub fn with_subscriber(mut self, subscriber: Arc<dyn MessageSubscriber>) -> Self {
        self.subscribers.push(subscriber);
        self
    }

    /// # Errors
    /// Duplicate definitions or routing rules, database or migration
    /// failures, or a failure registering a definition row.
    pub fn build(self) -> Result<Engine> {
        let op = "engine_open";
        log_op_start!(op, in_memory = self.in_memory);
        let start = Instant::now();

        match self.assemble() {
            Ok(engine) => {
                log_op_end!(op, duration_ms = start.elapsed().as_millis() as u64);
                Ok(engine)
            }
            Err(err) => {
                log_op_error!(op, err.clone(), duration_ms = start.elapsed().as_millis() as u64);
                Err(err.with_op(op))
            }
        }
    }

    fn assemble(self) -> Result<Engine> {
        let mut definitions = CustomEntityDefinitionRegistry::new();
        for definition in self.definitions {
            definitions.register(definition)?;
        }
        let mut routing_rules = RoutingRuleRegistry::new();
        for rule in self.routing_rules {
            routing_rules.register(rule)?;
        }

        let messages = MessageAggregator::new();
        for subscriber in self.subscribers {
            messages.subscribe(subscriber)?;
        }

        let mut conn = if self.in_memory {
            db::open_in_memory()?
        } else {
            db::open(&self.config.database_path)?
        };
        db::configure(&conn)?;
        apply_migrations(&mut conn)?;

        let cache = &self.config.cache;
        let services = Services {
            permissions: self.permissions,
            messages,
            page_cache: PageCache::new(cache.page_routes),
            custom_entity_cache: CustomEntityCache::new(cache.custom_entity_routes),
            image_asset_cache: ImageAssetCache::new(cache.image_assets),
            definitions,
            routing_rules,
            asset_files: AssetFileStore::new(self.config.asset_root.clone()),
        };

        let mut registry = HandlerRegistry::new();
        commands::register_all(&mut registry)?;
        queries::register_all(&mut registry)?;
        let executor = Executor::new(registry, services);

        let system = ExecutionContext::system();
        let codes: Vec<String> = executor
            .services()
            .definitions
            .all()
            .into_iter()
            .map(|d| d.code.clone())
            .collect();
        for definition_code in codes {
            executor.execute_command(
                &conn,
                EnsureCustomEntityDefinitionExistsCommand { definition_code },
                &system,
            )?;
        }

        let database_path = (!self.in_memory).then(|| self.config.database_path.clone());
        Ok(Engine {
            conn,
            executor,
            database_path,
        })
    }
}

/// An executor bound to its primary connection
pub struct Engine {
    conn: Connection,
    executor: Executor,
    database_path: Option<PathBuf>,
}

impl Engine {
    /// Build with default services from `config`
    ///
    /// # Errors
    /// See [`EngineBuilder::build`].
    pub fn open(config: EngineConfig) -> Result<Self> {
        EngineBuilder::new(config).build()
    }

    pub fn builder(config: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    pub fn services(&self) -> &Services {
        self.executor.services()
    }

    /// Another configured connection to the same database, for use on
    /// another thread with a clone of [`Engine::executor`]
    ///
    /// # Errors
    /// `Configuration` for an in-memory engine, or a database failure.
    pub fn open_connection(&self) -> Result<Connection> {
        let Some(path) = &self.database_path else {
            return Err(ExError::new(ExErrorKind::Configuration)
                .with_message("an in-memory database cannot be shared"));
        };
        let conn = db::open(path)?;
        db::configure(&conn)?;
        Ok(conn)
    }

    /// # Errors
    /// Whatever the dispatch returns; see [`Executor::execute_command`].
    pub fn execute_command<C: Command>(
        &self,
        command: C,
        execution: &ExecutionContext,
    ) -> Result<C::Output> {
        self.executor.execute_command(&self.conn, command, execution)
    }

    /// # Errors
    /// Whatever the dispatch returns; see [`Executor::execute_query`].
    pub fn execute_query<Q: Query>(&self, query: Q, execution: &ExecutionContext) -> Result<Q::Output> {
        self.executor.execute_query(&self.conn, query, execution)
    }

    pub fn pages(&self, execution: ExecutionContext) -> PageRepository<'_> {
        PageRepository::new(&self.executor, &self.conn, execution)
    }

    pub fn custom_entities(&self, execution: ExecutionContext) -> CustomEntityRepository<'_> {
        CustomEntityRepository::new(&self.executor, &self.conn, execution)
    }

    pub fn image_assets(&self, execution: ExecutionContext) -> ImageAssetRepository<'_> {
        ImageAssetRepository::new(&self.executor, &self.conn, execution)
    }
}
