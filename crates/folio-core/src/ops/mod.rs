pub mod workflow;

pub use workflow::{
    plan_add_draft, plan_delete_draft, plan_publish, plan_unpublish, select_version,
    validate_versions, Transition,
};
