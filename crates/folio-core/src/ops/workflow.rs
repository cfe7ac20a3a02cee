//! Version workflow state machine
//!
//! Pure planning functions: each takes the current version states of one
//! entity and returns the status changes a repository must apply, or an
//! `InvalidWorkflowTransition` error. Nothing here touches storage.

use crate::errors::{FolioError, Result};
use crate::model::{VersionState, WorkflowStatus, WorkflowStatusQuery};

/// A single status change to apply to a stored version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub version_id: i64,
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
}

impl Transition {
    fn new(state: &VersionState, to: WorkflowStatus) -> Self {
        Self {
            version_id: state.version_id,
            from: state.status,
            to,
        }
    }
}

fn find(states: &[VersionState], status: WorkflowStatus) -> Option<&VersionState> {
    states.iter().find(|s| s.status == status)
}

/// Resolve which version a read should use
pub fn select_version(
    states: &[VersionState],
    query: WorkflowStatusQuery,
) -> Option<&VersionState> {
    match query {
        WorkflowStatusQuery::Latest => find(states, WorkflowStatus::Draft)
            .or_else(|| find(states, WorkflowStatus::Published)),
        WorkflowStatusQuery::Draft => find(states, WorkflowStatus::Draft),
        WorkflowStatusQuery::Published => find(states, WorkflowStatus::Published),
        WorkflowStatusQuery::PreferPublished => find(states, WorkflowStatus::Published)
            .or_else(|| find(states, WorkflowStatus::Draft)),
        WorkflowStatusQuery::SpecificVersion(id) => states.iter().find(|s| s.version_id == id),
    }
}

/// Check the one-draft/one-published invariant over stored versions
///
/// # Errors
/// Returns `WorkflowInvariantBroken` when more than one draft or more than
/// one published version exists.
pub fn validate_versions(entity: &str, entity_id: i64, states: &[VersionState]) -> Result<()> {
    for status in [WorkflowStatus::Draft, WorkflowStatus::Published] {
        let count = states.iter().filter(|s| s.status == status).count();
        if count > 1 {
            return Err(FolioError::WorkflowInvariantBroken {
                entity: entity.to_string(),
                id: entity_id,
                reason: format!("{} {} versions", count, status.as_str()),
            });
        }
    }
    Ok(())
}

/// Plan publishing the draft
///
/// The previously published version (if any) is archived before the draft
/// is promoted; apply the transitions in the returned order.
///
/// # Errors
/// Fails when the entity has no draft.
pub fn plan_publish(entity: &str, entity_id: i64, states: &[VersionState]) -> Result<Vec<Transition>> {
    validate_versions(entity, entity_id, states)?;
    let draft = find(states, WorkflowStatus::Draft)
        .ok_or_else(|| FolioError::transition(entity, entity_id, "no draft version to publish"))?;

    let mut plan = Vec::with_capacity(2);
    if let Some(published) = find(states, WorkflowStatus::Published) {
        plan.push(Transition::new(published, WorkflowStatus::Archived));
    }
    plan.push(Transition::new(draft, WorkflowStatus::Published));
    Ok(plan)
}

/// Plan taking the published version offline
///
/// # Errors
/// Fails when the entity is not published.
pub fn plan_unpublish(entity: &str, entity_id: i64, states: &[VersionState]) -> Result<Transition> {
    validate_versions(entity, entity_id, states)?;
    let published = find(states, WorkflowStatus::Published)
        .ok_or_else(|| FolioError::transition(entity, entity_id, "entity is not published"))?;

    let to = if find(states, WorkflowStatus::Draft).is_some() {
        WorkflowStatus::Archived
    } else {
        WorkflowStatus::Draft
    };
    Ok(Transition::new(published, to))
}

/// Plan adding a new draft; returns the version id to copy content from
///
/// # Errors
/// Fails when a draft already exists or there is no version to copy.
pub fn plan_add_draft(entity: &str, entity_id: i64, states: &[VersionState]) -> Result<i64> {
    validate_versions(entity, entity_id, states)?;
    if find(states, WorkflowStatus::Draft).is_some() {
        return Err(FolioError::transition(
            entity,
            entity_id,
            "a draft version already exists",
        ));
    }

    find(states, WorkflowStatus::Published)
        .or_else(|| states.iter().max_by_key(|s| (s.created_at, s.version_id)))
        .map(|s| s.version_id)
        .ok_or_else(|| FolioError::transition(entity, entity_id, "no version to copy"))
}

/// Plan deleting the draft; returns the draft version id
///
/// # Errors
/// Fails when there is no draft, or when the draft is the only version.
pub fn plan_delete_draft(entity: &str, entity_id: i64, states: &[VersionState]) -> Result<i64> {
    validate_versions(entity, entity_id, states)?;
    let draft = find(states, WorkflowStatus::Draft)
        .ok_or_else(|| FolioError::transition(entity, entity_id, "no draft version to delete"))?;

    if states.len() == 1 {
        return Err(FolioError::transition(
            entity,
            entity_id,
            "cannot delete the only version",
        ));
    }
    Ok(draft.version_id)
}
