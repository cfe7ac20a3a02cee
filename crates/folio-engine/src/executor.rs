//! Command/query executor
//!
//! Every command and query type has exactly one registered handler. The
//! executor resolves it, checks the permissions the handler declares for the
//! given input and only then runs it. The executor owns the boundary logs of
//! every dispatch.

#![allow(clippy::result_large_err)]

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use folio_core::cqs::{operation_name, Command, Query};
use folio_core::errors::{ExError, FolioError};
use folio_core::messages::ContentMessage;
use folio_core::permissions::{
    ExecutionContext, Permission, PermissionValidationService, UserContext,
};
use folio_core::{log_op_end, log_op_error, log_op_start};
use folio_core_types::schema::{DISPATCH_COMMAND, DISPATCH_QUERY};
use folio_store::errors::{from_rusqlite, Result};
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::services::Services;

/// Handles one command type
pub trait CommandHandler: Send + Sync {
    type Command: Command;

    /// Permissions the user needs for this command; none means no check
    fn permissions(
        &self,
        _command: &Self::Command,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(Vec::new())
    }

    fn execute(
        &self,
        command: Self::Command,
        ctx: &HandlerContext<'_>,
    ) -> Result<<Self::Command as Command>::Output>;
}

/// Handles one query type
pub trait QueryHandler: Send + Sync {
    type Query: Query;

    /// Permissions the user needs for this query; none means no check
    fn permissions(
        &self,
        _query: &Self::Query,
        _ctx: &HandlerContext<'_>,
    ) -> Result<Vec<Permission>> {
        Ok(Vec::new())
    }

    fn execute(
        &self,
        query: Self::Query,
        ctx: &HandlerContext<'_>,
    ) -> Result<<Self::Query as Query>::Output>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum DispatchKind {
    Command,
    Query,
}

/// Handlers keyed by the command or query type they accept
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<(TypeId, DispatchKind), Box<dyn Any + Send + Sync>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(
        &mut self,
        key: (TypeId, DispatchKind),
        operation: &str,
        handler: Box<dyn Any + Send + Sync>,
    ) -> Result<()> {
        if self.handlers.contains_key(&key) {
            return Err(FolioError::HandlerAlreadyRegistered {
                operation: operation.to_string(),
            }
            .into());
        }
        self.handlers.insert(key, handler);
        Ok(())
    }

    /// # Errors
    /// `HandlerAlreadyRegistered` when the command already has a handler.
    pub fn register_command<H>(&mut self, handler: H) -> Result<()>
    where
        H: CommandHandler + 'static,
    {
        let handler: Arc<dyn CommandHandler<Command = H::Command>> = Arc::new(handler);
        self.insert(
            (TypeId::of::<H::Command>(), DispatchKind::Command),
            operation_name::<H::Command>(),
            Box::new(handler),
        )
    }

    /// # Errors
    /// `HandlerAlreadyRegistered` when the query already has a handler.
    pub fn register_query<H>(&mut self, handler: H) -> Result<()>
    where
        H: QueryHandler + 'static,
    {
        let handler: Arc<dyn QueryHandler<Query = H::Query>> = Arc::new(handler);
        self.insert(
            (TypeId::of::<H::Query>(), DispatchKind::Query),
            operation_name::<H::Query>(),
            Box::new(handler),
        )
    }

    fn command_handler<C: Command>(&self) -> Result<Arc<dyn CommandHandler<Command = C>>> {
        self.handlers
            .get(&(TypeId::of::<C>(), DispatchKind::Command))
            .and_then(|h| h.downcast_ref::<Arc<dyn CommandHandler<Command = C>>>())
            .cloned()
            .ok_or_else(not_registered::<C>)
    }

    fn query_handler<Q: Query>(&self) -> Result<Arc<dyn QueryHandler<Query = Q>>> {
        self.handlers
            .get(&(TypeId::of::<Q>(), DispatchKind::Query))
            .and_then(|h| h.downcast_ref::<Arc<dyn QueryHandler<Query = Q>>>())
            .cloned()
            .ok_or_else(not_registered::<Q>)
    }

    pub fn has_command<C: Command>(&self) -> bool {
        self.handlers
            .contains_key(&(TypeId::of::<C>(), DispatchKind::Command))
    }

    pub fn has_query<Q: Query>(&self) -> bool {
        self.handlers
            .contains_key(&(TypeId::of::<Q>(), DispatchKind::Query))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn not_registered<T>() -> ExError {
    FolioError::HandlerNotRegistered {
        operation: operation_name::<T>().to_string(),
    }
    .into()
}

/// What a running handler can reach: the caller's connection, the execution
/// context, shared services and the executor for nested dispatch
pub struct HandlerContext<'a> {
    conn: &'a Connection,
    execution: &'a ExecutionContext,
    executor: &'a Executor,
}

impl<'a> HandlerContext<'a> {
    pub fn conn(&self) -> &'a Connection {
        self.conn
    }

    pub fn execution(&self) -> &'a ExecutionContext {
        self.execution
    }

    pub fn user(&self) -> &'a UserContext {
        &self.execution.user
    }

    pub fn services(&self) -> &'a Services {
        self.executor.services()
    }

    /// Dispatch a nested query as the same user on the same connection
    pub fn query<Q: Query>(&self, query: Q) -> Result<Q::Output> {
        self.executor.execute_query(self.conn, query, self.execution)
    }

    /// Dispatch a nested command as the same user on the same connection
    pub fn command<C: Command>(&self, command: C) -> Result<C::Output> {
        self.executor
            .execute_command(self.conn, command, self.execution)
    }

    /// Run `f` in a transaction that commits when it returns `Ok`
    ///
    /// The transaction takes the write lock up front, so checks made inside
    /// `f` hold until commit. When a transaction is already open (a nested
    /// command), `f` joins it and the outer handler decides the outcome.
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        if !self.conn.is_autocommit() {
            return f(self.conn);
        }
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;
        let value = f(&tx)?;
        tx.commit().map_err(from_rusqlite)?;
        Ok(value)
    }

    /// Publish a message to subscribers; call after commit and cache clears
    pub fn publish(&self, message: ContentMessage) -> Result<()> {
        self.services().messages.publish(&message)?;
        Ok(())
    }
}

/// Dispatches commands and queries to their registered handlers
#[derive(Clone)]
pub struct Executor {
    registry: Arc<HandlerRegistry>,
    services: Arc<Services>,
}

impl Executor {
    pub fn new(registry: HandlerRegistry, services: Services) -> Self {
        Self {
            registry: Arc::new(registry),
            services: Arc::new(services),
        }
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Run a command: resolve its handler, enforce permissions, execute
    ///
    /// # Errors
    /// `HandlerNotRegistered`, an authorization error, or whatever the
    /// handler returns.
    pub fn execute_command<C: Command>(
        &self,
        conn: &Connection,
        command: C,
        execution: &ExecutionContext,
    ) -> Result<C::Output> {
        let op = operation_name::<C>();
        log_op_start!(
            op,
            dispatch_kind = DISPATCH_COMMAND,
            request_id = execution.request.request_id.as_str(),
            user_id = ?execution.user.user_id
        );
        let start = Instant::now();

        let ctx = HandlerContext {
            conn,
            execution,
            executor: self,
        };
        let result = self
            .registry
            .command_handler::<C>()
            .and_then(|handler| {
                let required = handler.permissions(&command, &ctx)?;
                self.enforce(&required, execution)?;
                handler.execute(command, &ctx)
            });

        self.finish(op, start, execution, result)
    }

    /// Run a query: resolve its handler, enforce permissions, execute
    ///
    /// # Errors
    /// `HandlerNotRegistered`, an authorization error, or whatever the
    /// handler returns.
    pub fn execute_query<Q: Query>(
        &self,
        conn: &Connection,
        query: Q,
        execution: &ExecutionContext,
    ) -> Result<Q::Output> {
        let op = operation_name::<Q>();
        log_op_start!(
            op,
            dispatch_kind = DISPATCH_QUERY,
            request_id = execution.request.request_id.as_str(),
            user_id = ?execution.user.user_id
        );
        let start = Instant::now();

        let ctx = HandlerContext {
            conn,
            execution,
            executor: self,
        };
        let result = self.registry.query_handler::<Q>().and_then(|handler| {
            let required = handler.permissions(&query, &ctx)?;
            self.enforce(&required, execution)?;
            handler.execute(query, &ctx)
        });

        self.finish(op, start, execution, result)
    }

    fn enforce(&self, required: &[Permission], execution: &ExecutionContext) -> Result<()> {
        if required.is_empty() {
            return Ok(());
        }
        self.services
            .permissions
            .enforce(required, &execution.user)?;
        Ok(())
    }

    fn finish<T>(
        &self,
        op: &'static str,
        start: Instant,
        execution: &ExecutionContext,
        result: Result<T>,
    ) -> Result<T> {
        let duration_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(value) => {
                log_op_end!(op, duration_ms = duration_ms);
                Ok(value)
            }
            Err(err) => {
                log_op_error!(op, err.clone(), duration_ms = duration_ms);
                let err = if err.op().is_none() { err.with_op(op) } else { err };
                let err = if err.request_id().is_none() {
                    err.with_request_id(execution.request.request_id.clone())
                } else {
                    err
                };
                Err(err)
            }
        }
    }
}
