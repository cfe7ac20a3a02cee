#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Utc;
use folio_core::errors::FolioError;
use folio_core::model::{VersionState, WorkflowStatus, WorkflowStatusQuery};
use folio_core::ops::{plan_add_draft, plan_publish, plan_unpublish, select_version, Transition};

fn apply(states: &mut [VersionState], plan: &[Transition]) {
    for t in plan {
        let state = states
            .iter_mut()
            .find(|s| s.version_id == t.version_id)
            .expect("planned version exists");
        state.status = t.to;
    }
}

#[test]
fn test_full_lifecycle_draft_publish_unpublish_redraft() {
    let mut states = vec![VersionState::new(1, WorkflowStatus::Draft, Utc::now())];

    let plan = plan_publish("page", 1, &states).unwrap();
    apply(&mut states, &plan);
    assert_eq!(
        select_version(&states, WorkflowStatusQuery::Published).map(|s| s.version_id),
        Some(1)
    );

    let source = plan_add_draft("page", 1, &states).unwrap();
    assert_eq!(source, 1);
    states.push(VersionState::new(2, WorkflowStatus::Draft, Utc::now()));

    let plan = plan_publish("page", 1, &states).unwrap();
    apply(&mut states, &plan);
    assert_eq!(states[0].status, WorkflowStatus::Archived);
    assert_eq!(states[1].status, WorkflowStatus::Published);

    let t = plan_unpublish("page", 1, &states).unwrap();
    apply(&mut states, &[t]);
    assert_eq!(states[1].status, WorkflowStatus::Draft);
    assert!(select_version(&states, WorkflowStatusQuery::Published).is_none());
}

#[test]
fn test_double_publish_fails_with_transition_error() {
    let mut states = vec![VersionState::new(1, WorkflowStatus::Draft, Utc::now())];
    let plan = plan_publish("custom_entity", 5, &states).unwrap();
    apply(&mut states, &plan);

    match plan_publish("custom_entity", 5, &states) {
        Err(FolioError::InvalidWorkflowTransition { entity, id, .. }) => {
            assert_eq!(entity, "custom_entity");
            assert_eq!(id, 5);
        }
        other => panic!("expected transition error, got {:?}", other),
    }
}
