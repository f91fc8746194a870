//! End-to-end scenarios over the query surface.

use bpmn_meta::hir::{BuildError, StaticResolutionContext};
use bpmn_meta::host::{Bpmn2DataService, ProcessDataService, ServiceError};
use bpmn_meta::parser::ErrorCode;

use crate::helpers::source_fixtures::{APPROVAL, CALLER, DUPLICATE_REVIEW, UNTERMINATED};

fn approval_context() -> StaticResolutionContext {
    StaticResolutionContext::new()
        .with_deployment("kb-approval")
        .with_types(["java.lang.Integer", "com.example.Notifier"])
}

#[test]
fn test_duplicate_review_is_rejected() {
    let service = ProcessDataService::new();
    let err = service
        .find_process_id(&DUPLICATE_REVIEW, &StaticResolutionContext::new())
        .unwrap_err();
    assert_eq!(
        err,
        ServiceError::Build(BuildError::DuplicateTaskDefinition {
            name: "Review".to_string()
        })
    );
    assert!(err.to_string().contains("Review"));
}

#[test]
fn test_approval_service_tasks_and_mappings() {
    let service = ProcessDataService::new();
    service.deploy("kb", APPROVAL.as_str()).unwrap();

    let services = service.all_service_tasks("approval");
    assert_eq!(services.len(), 1);
    assert_eq!(services["NotifyUser"], "com.example.Notifier");

    let inputs = service.task_input_mappings("approval", "Approve");
    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs["in_amount"], "amount");
}

#[test]
fn test_call_activity_target_is_recorded_unresolved() {
    let service = ProcessDataService::new();
    service.deploy("kb", CALLER.as_str()).unwrap();

    let calls = service.reusable_subprocesses("caller");
    assert_eq!(calls.len(), 1);
    assert!(calls.contains("sub-proc-1"));
    assert!(service.cache().get("sub-proc-1").is_none());
}

#[test]
fn test_unterminated_document_reports_position() {
    let service = ProcessDataService::new();
    let err = service
        .find_process_id(UNTERMINATED, &StaticResolutionContext::new())
        .unwrap_err();

    let ServiceError::Parse(parse) = err else {
        panic!("expected parse error, got {err}");
    };
    assert_eq!(parse.code, ErrorCode::E0201);
    assert!(!parse.position.to_string().is_empty());
    assert!(service.cache().get("broken").is_none());
    assert!(service.cache().is_empty());
}

#[test]
fn test_find_process_id_does_not_touch_cache() {
    let service = ProcessDataService::new();
    let desc = service
        .find_process_id(&APPROVAL, &approval_context())
        .unwrap();
    assert_eq!(desc.id, "approval");
    assert_eq!(desc.deployment_id, "kb-approval");
    assert_eq!(desc.package.as_deref(), Some("com.example"));
    assert!(service.cache().is_empty());
    assert!(service.process_desc("approval").unwrap_err().is_not_found());
}

#[test]
fn test_find_process_id_aggregates_resolution_errors() {
    let service = ProcessDataService::new();
    let err = service
        .find_process_id(&APPROVAL, &StaticResolutionContext::new())
        .unwrap_err();

    let ServiceError::Resolution(errors) = err else {
        panic!("expected resolution errors, got {err}");
    };
    assert_eq!(
        errors.type_names(),
        vec!["java.lang.Integer", "com.example.Notifier"]
    );
    let integer = &errors.errors[0];
    assert_eq!(
        integer.referenced_by,
        vec!["dataObject#amount", "userTask#_approve"]
    );
}
