use fixvis_types::report::{OutcomeStatus, RecordOutcome, RemediationReport};
use fixvis_types::{AbortReason, BuildEvent, FixRecord};
use pretty_assertions::assert_eq;

#[test]
fn aborted_event_parses_from_bep_json() {
    let line = r#"{
        "id": {"targetCompleted": {"label": "//a:a"}},
        "children": [{"progress": {"opaqueCount": 3}}],
        "aborted": {
            "reason": "ANALYSIS_FAILURE",
            "description": "target '//b:b' is not visible from target '//a:a'"
        }
    }"#;

    let event: BuildEvent = serde_json::from_str(line).expect("parse event");
    let aborted = event.get_aborted().expect("aborted payload");
    assert_eq!(aborted.reason, AbortReason::AnalysisFailure);
    assert!(aborted.description.contains("is not visible from target"));
    assert_eq!(event.children.len(), 1);
}

#[test]
fn unrelated_payloads_are_ignored() {
    let line = r#"{"id": {"progress": {"opaqueCount": 1}}, "progress": {"stderr": "Loading..."}}"#;
    let event: BuildEvent = serde_json::from_str(line).expect("parse event");
    assert!(event.get_aborted().is_none());
    assert!(event.id.is_some());
}

#[test]
fn unknown_abort_reason_maps_to_unknown() {
    let line = r#"{"aborted": {"reason": "SOMETHING_NEW", "description": "x"}}"#;
    let event: BuildEvent = serde_json::from_str(line).expect("parse event");
    assert_eq!(event.get_aborted().unwrap().reason, AbortReason::Unknown);
}

#[test]
fn every_known_abort_reason_parses() {
    for (name, reason) in [
        ("USER_INTERRUPTED", AbortReason::UserInterrupted),
        ("LOADING_FAILURE", AbortReason::LoadingFailure),
        ("OUT_OF_MEMORY", AbortReason::OutOfMemory),
        ("UNKNOWN", AbortReason::Unknown),
    ] {
        let parsed: AbortReason = serde_json::from_value(serde_json::json!(name)).expect(name);
        assert_eq!(parsed, reason);
    }
    assert_eq!(AbortReason::default(), AbortReason::Unknown);
}

#[test]
fn missing_abort_fields_default() {
    let event: BuildEvent = serde_json::from_str(r#"{"aborted": {}}"#).expect("parse event");
    let aborted = event.get_aborted().unwrap();
    assert_eq!(aborted.reason, AbortReason::Unknown);
    assert!(aborted.description.is_empty());
}

#[test]
fn abort_reason_serializes_screaming_snake_case() {
    let value = serde_json::to_value(AbortReason::RemoteEnvironmentFailure).expect("serialize");
    assert_eq!(value, serde_json::json!("REMOTE_ENVIRONMENT_FAILURE"));
}

#[test]
fn outcome_status_serializes_snake_case() {
    let applied = serde_json::to_value(OutcomeStatus::Applied).expect("serialize");
    let declined = serde_json::to_value(OutcomeStatus::Declined).expect("serialize");
    assert_eq!(applied, serde_json::json!("applied"));
    assert_eq!(declined, serde_json::json!("declined"));
}

#[test]
fn report_counts_and_flags() {
    let mut report = RemediationReport::new(chrono::Utc::now());
    assert!(!report.has_failures());
    assert!(!report.has_pending_fixes());

    report.records.push(RecordOutcome {
        record: FixRecord::new("//x:x", "//y:y"),
        status: OutcomeStatus::Reported,
        commands: vec!["add visibility //y:__pkg__".to_string()],
        error: None,
    });
    report.records.push(RecordOutcome {
        record: FixRecord::new("//p:p", "//q:q"),
        status: OutcomeStatus::Failed,
        commands: vec![],
        error: Some("boom".to_string()),
    });

    assert_eq!(report.count(OutcomeStatus::Reported), 1);
    assert_eq!(report.count(OutcomeStatus::Applied), 0);
    assert!(report.has_failures());
    assert!(report.has_pending_fixes());

    let value = serde_json::to_value(&report).expect("serialize report");
    assert!(value["records"][0].get("error").is_none());
    assert_eq!(value["records"][1]["status"], "failed");
}
