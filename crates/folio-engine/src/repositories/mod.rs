//! Typed facades over the executor
//!
//! A repository binds an executor, a connection and an execution context.
//! Each method builds one command or query and dispatches it, so permission
//! checks, logging and cache handling stay with the handlers.

pub mod custom_entities;
pub mod image_assets;
pub mod pages;

pub use custom_entities::CustomEntityRepository;
pub use image_assets::ImageAssetRepository;
pub use pages::PageRepository;

use folio_core::cqs::{Command, Query};
use folio_core::permissions::ExecutionContext;
use folio_store::errors::Result;
use rusqlite::Connection;

use crate::executor::Executor;

/// Shared dispatch state of the repository facades
#[derive(Clone)]
pub(crate) struct Dispatcher<'a> {
    executor: &'a Executor,
    conn: &'a Connection,
    execution: ExecutionContext,
}

impl<'a> Dispatcher<'a> {
    pub(crate) fn new(
        executor: &'a Executor,
        conn: &'a Connection,
        execution: ExecutionContext,
    ) -> Self {
        Self {
            executor,
            conn,
            execution,
        }
    }

    pub(crate) fn elevated(mut self) -> Self {
        self.execution = self.execution.elevated();
        self
    }

    pub(crate) fn with_context(mut self, execution: ExecutionContext) -> Self {
        self.execution = execution;
        self
    }

    pub(crate) fn execution(&self) -> &ExecutionContext {
        &self.execution
    }

    pub(crate) fn command<C: Command>(&self, command: C) -> Result<C::Output> {
        self.executor
            .execute_command(self.conn, command, &self.execution)
    }

    pub(crate) fn query<Q: Query>(&self, query: Q) -> Result<Q::Output> {
        self.executor.execute_query(self.conn, query, &self.execution)
    }
}

/// Elevation and context overrides shared by every repository
macro_rules! repository_context {
    ($repo:ident) => {
        impl<'a> $repo<'a> {
            pub fn new(
                executor: &'a $crate::executor::Executor,
                conn: &'a rusqlite::Connection,
                execution: folio_core::permissions::ExecutionContext,
            ) -> Self {
                Self {
                    dispatcher: $crate::repositories::Dispatcher::new(executor, conn, execution),
                }
            }

            /// Same request, run as the system user
            pub fn with_elevated_permissions(self) -> Self {
                Self {
                    dispatcher: self.dispatcher.elevated(),
                }
            }

            /// Run subsequent calls under `execution` instead
            pub fn with_context(self, execution: folio_core::permissions::ExecutionContext) -> Self {
                Self {
                    dispatcher: self.dispatcher.with_context(execution),
                }
            }

            pub fn execution(&self) -> &folio_core::permissions::ExecutionContext {
                self.dispatcher.execution()
            }
        }
    };
}

pub(crate) use repository_context;
