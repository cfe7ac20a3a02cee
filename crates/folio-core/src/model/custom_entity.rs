use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::workflow::{VersionState, WorkflowStatus, WorkflowStatusQuery};
use crate::ops::workflow::select_version;

/// Custom entity record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntity {
    pub custom_entity_id: i64,
    pub definition_code: String,
    pub locale_id: Option<i64>,
    pub url_slug: String,
    /// Position within the definition; only used by ordered definitions
    pub ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

/// Custom entity version record as persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityVersion {
    pub custom_entity_version_id: i64,
    pub custom_entity_id: i64,
    pub title: String,
    /// Definition-specific data model
    pub data: serde_json::Value,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

impl CustomEntityVersion {
    pub fn state(&self) -> VersionState {
        VersionState::new(
            self.custom_entity_version_id,
            self.workflow_status,
            self.created_at,
        )
    }
}

/// Pick a version from a set by workflow query
pub fn select_entity_version(
    versions: &[CustomEntityVersion],
    query: WorkflowStatusQuery,
) -> Option<&CustomEntityVersion> {
    let states: Vec<VersionState> = versions.iter().map(CustomEntityVersion::state).collect();
    let selected = select_version(&states, query)?;
    versions
        .iter()
        .find(|v| v.custom_entity_version_id == selected.version_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntityDefinitionMicroSummary {
    pub code: String,
    pub name: String,
    pub description: String,
    pub force_url_slug_uniqueness: bool,
    pub has_locale: bool,
    pub is_ordered: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityVersionRoute {
    pub version_id: i64,
    pub title: String,
    pub workflow_status: WorkflowStatus,
}

/// Small, cacheable routing summary of a custom entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityRoute {
    pub custom_entity_id: i64,
    pub definition_code: String,
    pub locale_id: Option<i64>,
    pub url_slug: String,
    pub ordering: Option<i64>,
    pub is_published: bool,
    pub has_draft: bool,
    pub versions: Vec<CustomEntityVersionRoute>,
}

impl CustomEntityRoute {
    pub fn build(entity: &CustomEntity, versions: &[CustomEntityVersion]) -> Self {
        Self {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code.clone(),
            locale_id: entity.locale_id,
            url_slug: entity.url_slug.clone(),
            ordering: entity.ordering,
            is_published: versions
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Published),
            has_draft: versions
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Draft),
            versions: versions
                .iter()
                .filter(|v| v.workflow_status != WorkflowStatus::Archived)
                .map(|v| CustomEntityVersionRoute {
                    version_id: v.custom_entity_version_id,
                    title: v.title.clone(),
                    workflow_status: v.workflow_status,
                })
                .collect(),
        }
    }
}

/// Full editing view of a custom entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityDetails {
    pub entity: CustomEntity,
    pub definition: CustomEntityDefinitionMicroSummary,
    pub latest_version: CustomEntityVersion,
    pub is_published: bool,
    pub has_draft: bool,
}

/// Data needed to render one version of a custom entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityRenderSummary {
    pub custom_entity_id: i64,
    pub custom_entity_version_id: i64,
    pub definition_code: String,
    pub locale_id: Option<i64>,
    pub url_slug: String,
    pub title: String,
    pub data: serde_json::Value,
    pub workflow_status: WorkflowStatus,
    pub ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CustomEntityRenderSummary {
    pub fn build(entity: &CustomEntity, version: &CustomEntityVersion) -> Self {
        Self {
            custom_entity_id: entity.custom_entity_id,
            custom_entity_version_id: version.custom_entity_version_id,
            definition_code: entity.definition_code.clone(),
            locale_id: entity.locale_id,
            url_slug: entity.url_slug.clone(),
            title: version.title.clone(),
            data: version.data.clone(),
            workflow_status: version.workflow_status,
            ordering: entity.ordering,
            created_at: entity.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntityVersionSummary {
    pub custom_entity_version_id: i64,
    pub title: String,
    pub workflow_status: WorkflowStatus,
    pub created_at: DateTime<Utc>,
    pub creator_id: Option<i64>,
}

impl From<&CustomEntityVersion> for CustomEntityVersionSummary {
    fn from(version: &CustomEntityVersion) -> Self {
        Self {
            custom_entity_version_id: version.custom_entity_version_id,
            title: version.title.clone(),
            workflow_status: version.workflow_status,
            created_at: version.created_at,
            creator_id: version.creator_id,
        }
    }
}

/// Search result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEntitySummary {
    pub custom_entity_id: i64,
    pub definition_code: String,
    pub locale_id: Option<i64>,
    pub url_slug: String,
    pub title: String,
    pub is_published: bool,
    pub has_draft: bool,
    pub ordering: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl CustomEntitySummary {
    pub fn build(entity: &CustomEntity, versions: &[CustomEntityVersion]) -> Self {
        Self {
            custom_entity_id: entity.custom_entity_id,
            definition_code: entity.definition_code.clone(),
            locale_id: entity.locale_id,
            url_slug: entity.url_slug.clone(),
            title: select_entity_version(versions, WorkflowStatusQuery::Latest)
                .map(|v| v.title.clone())
                .unwrap_or_default(),
            is_published: versions
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Published),
            has_draft: versions
                .iter()
                .any(|v| v.workflow_status == WorkflowStatus::Draft),
            ordering: entity.ordering,
            created_at: entity.created_at,
        }
    }
}

/// Minimal cross-entity reference used by relation pickers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntityMicroSummary {
    pub root_entity_id: i64,
    pub root_entity_title: String,
    pub entity_definition_name: String,
    pub entity_definition_code: String,
}
