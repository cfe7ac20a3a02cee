use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow state of a page or custom entity version
///
/// The stored integer values are part of the schema and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorkflowStatus {
    /// Editable working copy; at most one per entity
    Draft,
    /// Live version; at most one per entity
    Published,
    /// Superseded or unpublished version kept as history
    Archived,
}

impl WorkflowStatus {
    pub fn as_i64(self) -> i64 {
        match self {
            WorkflowStatus::Draft => 1,
            WorkflowStatus::Published => 4,
            WorkflowStatus::Archived => 5,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(WorkflowStatus::Draft),
            4 => Some(WorkflowStatus::Published),
            5 => Some(WorkflowStatus::Archived),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::Published => "published",
            WorkflowStatus::Archived => "archived",
        }
    }
}

/// Which version of an entity a read should resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum WorkflowStatusQuery {
    /// The draft if there is one, otherwise the published version
    Latest,
    /// Only the draft
    Draft,
    /// Only the published version
    Published,
    /// The published version if there is one, otherwise the draft
    #[default]
    PreferPublished,
    /// An exact version id, whatever its status
    SpecificVersion(i64),
}

/// Minimal view of a version used for workflow decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionState {
    pub version_id: i64,
    pub status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
}

impl VersionState {
    pub fn new(version_id: i64, status: WorkflowStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            version_id,
            status,
            created_at,
        }
    }
}
