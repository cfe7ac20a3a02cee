use folio_core::errors::{ExError, ExErrorKind, FolioError};

#[test]
fn test_not_found_verifiable_by_kind() {
    let ex_err: ExError = FolioError::not_found("custom_entity", 9).into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("9"));
}

#[test]
fn test_property_validation_keeps_property() {
    let ex_err: ExError = FolioError::property("custom_entity_routing_rule", "Rule not found").into();

    assert_eq!(ex_err.kind(), ExErrorKind::PropertyValidation);
    assert_eq!(ex_err.property(), Some("custom_entity_routing_rule"));
    assert_eq!(ex_err.message(), "Rule not found");
}

#[test]
fn test_workflow_transition_distinct_from_invalid_input() {
    let ex_err: ExError = FolioError::transition("custom_entity", 4, "no draft version to publish").into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidWorkflowTransition);
    assert_ne!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.entity_id(), Some("4"));
}

#[test]
fn test_unsupported_query_is_invalid_input() {
    let ex_err: ExError = FolioError::UnsupportedQuery {
        reason: "SpecificVersion".to_string(),
    }
    .into();

    assert_eq!(ex_err.code(), "ERR_INVALID_INPUT");
}

#[test]
fn test_dispatch_errors() {
    let missing: ExError = FolioError::HandlerNotRegistered {
        operation: "AddPageCommand".to_string(),
    }
    .into();
    let duplicate: ExError = FolioError::HandlerAlreadyRegistered {
        operation: "AddPageCommand".to_string(),
    }
    .into();

    assert_eq!(missing.kind(), ExErrorKind::HandlerNotRegistered);
    assert_eq!(missing.op(), Some("AddPageCommand"));
    assert_eq!(duplicate.kind(), ExErrorKind::AlreadyExists);
}

#[test]
fn test_serde_error_converts_to_serialization() {
    let err: FolioError = serde_json::from_str::<serde_json::Value>("{not json")
        .unwrap_err()
        .into();
    let ex_err: ExError = err.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Serialization);
}
