//! Recovery Integration Tests
//!
//! Model outputs of the shapes seen in practice, run through the public
//! recovery API.

use call_analyzer_recovery::{
    balanced_object_candidates, minimal_fallback_analysis, recover, validate_analysis,
    RecoveryOutcome, RecoveryTier,
};
use serde_json::Value;

use crate::support::analysis_json;

#[test]
fn test_fenced_response_with_trailing_commas() {
    let broken = analysis_json(8).replace(
        "\"Tie the delay to revenue\"]",
        "\"Tie the delay to revenue\",]",
    );
    let raw = format!("Sure! Here's the analysis:\n```json\n{}\n```\nLet me know.", broken);

    match recover(&raw) {
        RecoveryOutcome::Recovered(recovered) => {
            assert_eq!(recovered.tier, RecoveryTier::Repair);
            assert_eq!(recovered.analysis.overall_score, Some(8.0));
            assert!(recovered.citations.compliant);
            assert_eq!(recovered.citations.total_citations, 1);
        }
        other => panic!("expected recovery, got {other:?}"),
    }
}

#[test]
fn test_second_invalid_object_is_cut_away() {
    let raw = format!(
        "{}\n\nCorrection: {{\"overallScore\": 0, \"components\": []}}",
        analysis_json(6)
    );
    match recover(&raw) {
        RecoveryOutcome::Recovered(recovered) => {
            assert_ne!(recovered.tier, RecoveryTier::Extraction);
            assert_eq!(recovered.analysis.overall_score, Some(6.0));
        }
        other => panic!("expected recovery, got {other:?}"),
    }
}

#[test]
fn test_placeholder_speakers_are_reported_not_rejected() {
    let raw = analysis_json(7).replace("\"speaker\": \"Maria\"", "\"speaker\": \"Speaker 1\"");
    match recover(&raw) {
        RecoveryOutcome::Recovered(recovered) => {
            assert_eq!(recovered.tier, RecoveryTier::Extraction);
            assert!(!recovered.citations.compliant);
            assert_eq!(recovered.citations.violations.len(), 1);
            assert!(recovered.citations.violations[0]
                .location
                .starts_with("components[0].subComponents[0].evidence[0]"));
        }
        other => panic!("expected recovery, got {other:?}"),
    }
}

#[test]
fn test_refusal_falls_back_to_minimal_analysis() {
    match recover("I'm sorry, I can't evaluate this call without more context.") {
        RecoveryOutcome::Fallback(analysis) => {
            assert_eq!(analysis.components[0].name, "Analysis Error");
            assert!(analysis.overall_score.is_none());
        }
        other => panic!("expected fallback, got {other:?}"),
    }
}

#[test]
fn test_balanced_truncation_always_yields_json() {
    let texts = [
        "noise {\"a\": 1} more noise".to_string(),
        "{\"a\": {\"b\": [1, 2]}} {\"c\": tru".to_string(),
        format!("prefix {} suffix {{", analysis_json(5)),
        "{\"q\": \"a } inside a string\"} tail".to_string(),
    ];
    for text in &texts {
        let value = balanced_object_candidates(text)
            .into_iter()
            .find_map(|candidate| serde_json::from_str::<Value>(candidate).ok())
            .unwrap_or_else(|| panic!("no candidate in {text:?}"));
        assert!(value.is_object());
    }
}

#[test]
fn test_minimal_fallback_is_schema_valid() {
    let value = serde_json::to_value(minimal_fallback_analysis()).unwrap();
    assert!(validate_analysis(&value).is_ok());
}

fn with_follow_up(planning: &str) -> String {
    analysis_json(8).replace(
        "\"executiveSummary\"",
        &format!("\"followUpCallPlanning\": {},\n  \"executiveSummary\"", planning),
    )
}

#[test]
fn test_loose_follow_up_planning_keeps_the_score() {
    let variants = [
        with_follow_up(
            r#"{"anticipatedObjections": [{"objection": "Price", "suggestedResponse": null}]}"#,
        ),
        with_follow_up(r#"{"stakeholdersToEngage": [{"name": "Dana", "role": "CFO"}]}"#),
        with_follow_up(r#"{"keyQuestions": null, "nextCallObjectives": ["Demo the close"]}"#),
        analysis_json(8).replace(
            "\"keyFindings\": [\"Close process is the core pain\"]",
            "\"keyFindings\": null",
        ),
    ];
    for raw in &variants {
        match recover(raw) {
            RecoveryOutcome::Recovered(recovered) => {
                assert_eq!(recovered.tier, RecoveryTier::Extraction);
                assert_eq!(recovered.analysis.overall_score, Some(8.0));
            }
            other => panic!("expected recovery, got {other:?}"),
        }
    }
}
