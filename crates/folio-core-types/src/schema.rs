//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical between the executor's
//! boundary logs, the store's debug events and the test capture layer.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";
pub const FIELD_USER_ID: &str = "user_id";

// Entity identifiers
pub const FIELD_PAGE_ID: &str = "page_id";
pub const FIELD_CUSTOM_ENTITY_ID: &str = "custom_entity_id";
pub const FIELD_IMAGE_ASSET_ID: &str = "image_asset_id";
pub const FIELD_DEFINITION_CODE: &str = "definition_code";

// Dispatch
pub const FIELD_DISPATCH_KIND: &str = "dispatch_kind";
pub const DISPATCH_COMMAND: &str = "command";
pub const DISPATCH_QUERY: &str = "query";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_dispatch_kinds_are_distinct() {
        assert_ne!(DISPATCH_COMMAND, DISPATCH_QUERY);
    }
}
