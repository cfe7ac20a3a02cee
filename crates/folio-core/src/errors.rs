use folio_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using FolioError
pub type Result<T> = std::result::Result<T, FolioError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by a command or query maps to exactly one kind,
/// and every kind maps to a stable error code that hosts can translate into
/// HTTP status codes or user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input
    InvalidInput,
    PropertyValidation,
    UniqueViolation,

    // Lookup
    NotFound,
    AlreadyExists,

    // Workflow
    InvalidWorkflowTransition,
    InvariantViolation,

    // Dispatch
    HandlerNotRegistered,

    // Auth
    Unauthorised,
    Forbidden,

    // Integration/IO
    Io,
    Serialization,
    Persistence,
    Configuration,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::PropertyValidation => "ERR_PROPERTY_VALIDATION",
            ExErrorKind::UniqueViolation => "ERR_UNIQUE_VIOLATION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::InvalidWorkflowTransition => "ERR_INVALID_WORKFLOW_TRANSITION",
            ExErrorKind::InvariantViolation => "ERR_INVARIANT_VIOLATION",
            ExErrorKind::HandlerNotRegistered => "ERR_HANDLER_NOT_REGISTERED",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Configuration => "ERR_CONFIGURATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for the two authorization kinds
    pub fn is_authorization(&self) -> bool {
        matches!(self, ExErrorKind::Unauthorised | ExErrorKind::Forbidden)
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// context needed to explain a failure: the operation, the entity, and for
/// validation failures the offending property and value.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    property: Option<String>,
    value: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            property: None,
            value: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add the name of the property that failed validation
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Add the offending value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity ID context, if any
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// Get the property that failed validation, if any
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Get the offending value, if any
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Get the request ID context, if any
    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain error taxonomy raised by Folio operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FolioError {
    // ===== Lookup =====
    /// Entity does not exist (or has been deleted)
    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: String, id: String },

    // ===== Authorization =====
    /// Signed-in user lacks a required permission
    #[error("Permission denied: {permission}")]
    PermissionDenied {
        permission: String,
        user_id: Option<i64>,
    },

    /// Anonymous user attempted an operation that requires a permission
    #[error("Not signed in: {permission} requires an authenticated user")]
    NotSignedIn { permission: String },

    // ===== Validation =====
    /// A single property failed validation
    #[error("{message}")]
    PropertyValidation {
        property: String,
        message: String,
        value: Option<String>,
    },

    /// A value must be unique within its scope but is already used
    #[error("{message}")]
    UniqueConstraintViolation {
        property: String,
        value: String,
        message: String,
    },

    /// Query options that the handler does not support
    #[error("Unsupported query: {reason}")]
    UnsupportedQuery { reason: String },

    // ===== Workflow =====
    /// Publish/unpublish/draft operation not valid in the current state
    #[error("Invalid workflow transition for {entity} {id}: {reason}")]
    InvalidWorkflowTransition {
        entity: String,
        id: i64,
        reason: String,
    },

    /// Stored versions break the one-draft/one-published invariant
    #[error("Workflow invariant broken for {entity} {id}: {reason}")]
    WorkflowInvariantBroken {
        entity: String,
        id: i64,
        reason: String,
    },

    // ===== Dispatch =====
    /// No handler registered for a command or query type
    #[error("No handler registered for {operation}")]
    HandlerNotRegistered { operation: String },

    /// A second handler was registered for the same type
    #[error("A handler is already registered for {operation}")]
    HandlerAlreadyRegistered { operation: String },

    /// A definition or rule was registered twice
    #[error("Already registered: {key}")]
    AlreadyRegistered { key: String },

    // ===== Generic =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FolioError {
    /// Shorthand for [`FolioError::EntityNotFound`]
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        FolioError::EntityNotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Shorthand for [`FolioError::PropertyValidation`]
    pub fn property(property: &str, message: impl Into<String>) -> Self {
        FolioError::PropertyValidation {
            property: property.to_string(),
            message: message.into(),
            value: None,
        }
    }

    /// Shorthand for [`FolioError::InvalidWorkflowTransition`]
    pub fn transition(entity: &str, id: i64, reason: impl Into<String>) -> Self {
        FolioError::InvalidWorkflowTransition {
            entity: entity.to_string(),
            id,
            reason: reason.into(),
        }
    }
}

/// Conversion from FolioError to ExError
impl From<FolioError> for ExError {
    fn from(err: FolioError) -> Self {
        let message = err.to_string();
        match err {
            FolioError::EntityNotFound { id, .. } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(id)
                .with_message(message),

            FolioError::PermissionDenied { permission, .. } => {
                ExError::new(ExErrorKind::Forbidden)
                    .with_value(permission)
                    .with_message(message)
            }

            FolioError::NotSignedIn { permission } => ExError::new(ExErrorKind::Unauthorised)
                .with_value(permission)
                .with_message(message),

            FolioError::PropertyValidation {
                property, value, ..
            } => {
                let err = ExError::new(ExErrorKind::PropertyValidation)
                    .with_property(property)
                    .with_message(message);
                match value {
                    Some(value) => err.with_value(value),
                    None => err,
                }
            }

            FolioError::UniqueConstraintViolation {
                property, value, ..
            } => ExError::new(ExErrorKind::UniqueViolation)
                .with_property(property)
                .with_value(value)
                .with_message(message),

            FolioError::UnsupportedQuery { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }

            FolioError::InvalidWorkflowTransition { id, .. } => {
                ExError::new(ExErrorKind::InvalidWorkflowTransition)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }

            FolioError::WorkflowInvariantBroken { id, .. } => {
                ExError::new(ExErrorKind::InvariantViolation)
                    .with_entity_id(id.to_string())
                    .with_message(message)
            }

            FolioError::HandlerNotRegistered { operation } => {
                ExError::new(ExErrorKind::HandlerNotRegistered)
                    .with_op(operation)
                    .with_message(message)
            }

            FolioError::HandlerAlreadyRegistered { operation } => {
                ExError::new(ExErrorKind::AlreadyExists)
                    .with_op(operation)
                    .with_message(message)
            }

            FolioError::AlreadyRegistered { key } => ExError::new(ExErrorKind::AlreadyExists)
                .with_value(key)
                .with_message(message),

            FolioError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }

            FolioError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to FolioError
impl From<serde_json::Error> for FolioError {
    fn from(err: serde_json::Error) -> Self {
        FolioError::Serialization {
            message: err.to_string(),
        }
    }
}
