//! Folio Engine - command/query execution for the content layer
//!
//! Commands and queries are plain structs dispatched through an
//! [`Executor`]. Each dispatch resolves the registered handler, enforces the
//! permissions it declares, runs it on the caller's connection and logs the
//! boundary. Mutating handlers commit, clear affected cache entries and then
//! publish [`ContentMessage`](folio_core::ContentMessage)s.
//!
//! ```no_run
//! use folio_core::permissions::ExecutionContext;
//! use folio_engine::config::EngineConfig;
//! use folio_engine::Engine;
//!
//! let engine = Engine::open(EngineConfig::default())?;
//! let routes = engine.pages(ExecutionContext::system()).get_all_routes()?;
//! # Ok::<(), folio_core::ExError>(())
//! ```

pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod executor;
pub mod queries;
pub mod repositories;
pub mod services;

pub use bootstrap::{Engine, EngineBuilder};
pub use config::EngineConfig;
pub use executor::{CommandHandler, Executor, HandlerContext, HandlerRegistry, QueryHandler};
pub use services::Services;
