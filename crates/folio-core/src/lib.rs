//! Folio Core - content domain kernel
//!
//! Pure domain layer shared by the store and the engine:
//! - Page, custom entity, image asset and site models
//! - Version workflow planning (draft, publish, unpublish)
//! - Permission model and validation service
//! - Command/query markers, domain messages and the message aggregator
//! - Read-model caches, custom entity definitions and routing rules
//! - Error and logging facilities
//!
//! Nothing in this crate performs I/O.

pub mod cache;
pub mod cqs;
pub mod definitions;
pub mod errors;
pub mod logging_facility;
pub mod messages;
pub mod model;
pub mod ops;
pub mod permissions;
pub mod routing;
pub mod rules;

// Used by the logging macros
pub use folio_core_types;

pub use cqs::{Command, Query};
pub use errors::{ExError, ExErrorKind, FolioError, Result};
pub use messages::{ContentMessage, MessageAggregator, MessageSubscriber};
pub use permissions::{
    ExecutionContext, Permission, PermissionType, PermissionValidationService, Role, UserContext,
};
