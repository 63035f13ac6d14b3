//! File-backed wiring tests.
//!
//! A config pointing at temp directories drives `build_analyzer` end to end:
//! call JSON files in, enhanced prompts for frameworks with resources, basic
//! prompts for the rest.

use std::path::Path;
use std::sync::Arc;

use call_analyzer::{build_analyzer, AppConfig};
use call_analyzer_core::AnalysisStatus;
use call_analyzer_engine::AnalysisRequest;

use crate::support::ScriptedGenerator;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn config_for(root: &Path) -> AppConfig {
    let toml = format!(
        "[calls]\ndata_dir = {:?}\n\n[resources]\nroot = {:?}\n\n[analysis]\nmethodology_chars = 40\n",
        root.join("calls").display().to_string(),
        root.join("resources").display().to_string(),
    );
    AppConfig::from_toml_str(&toml).unwrap()
}

#[tokio::test]
async fn test_file_backed_batch() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("calls/c1.json"),
        r#"{"callId": "c1", "title": "Acme discovery", "date": "2024-06-03T14:00:00Z", "duration": 2400,
            "participants": [
                {"name": "Jordan Park", "title": "Account Executive", "affiliation": "internal"},
                {"name": "Maria Lopez", "affiliation": "external"}
            ]}"#,
    );
    write(
        &root.join("calls/c1.transcript.json"),
        r#"{"hasTranscript": true, "transcript": [
            {"speaker": "Maria Lopez", "topic": "Close process", "sentences": [
                {"start": 95000, "end": 99000, "text": "Month-end close takes us nine days."}
            ]}
        ]}"#,
    );
    write(
        &root.join("resources/great_demo/methodology.md"),
        "Great Demo! starts with the Situation Slide and then shows the last thing first.",
    );

    let generator = Arc::new(ScriptedGenerator::new(7));
    let analyzer = build_analyzer(&config_for(root), generator.clone()).unwrap();

    let mut request = AnalysisRequest::new(
        vec!["c1".to_string()],
        vec!["great_demo".to_string(), "sandler".to_string()],
    );
    request.include_participant_roles = true;
    let report = analyzer.analyze(&request).await.unwrap();

    assert_eq!(report.total_calls, 2);
    assert!(report.call_analyses.iter().all(|a| {
        a.analysis_status == AnalysisStatus::Completed && a.call_title == "Acme discovery"
    }));

    let requests = generator.requests.lock().unwrap();
    let enhanced = &requests[0].user_prompt;
    assert!(enhanced.contains("## Methodology"));
    assert!(enhanced.contains("[...truncated]"));
    assert!(enhanced.contains("Jordan Park (Account Executive, internal)"));
    assert!(enhanced.contains("[1:35] Maria: \"Month-end close takes us nine days.\""));

    let basic = &requests[1].user_prompt;
    assert!(!basic.contains("## Methodology"));
    assert!(!basic.contains("## Framework Definition"));
}

#[tokio::test]
async fn test_missing_call_file_becomes_error_record() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("calls")).unwrap();

    let generator = Arc::new(ScriptedGenerator::new(7));
    let analyzer = build_analyzer(&config_for(dir.path()), generator.clone()).unwrap();
    let report = analyzer
        .analyze(&AnalysisRequest::new(
            vec!["nope".to_string()],
            vec!["value_selling".to_string()],
        ))
        .await
        .unwrap();

    let analysis = &report.call_analyses[0];
    assert_eq!(analysis.analysis_status, AnalysisStatus::Error);
    assert_eq!(analysis.call_title, "Call nope");
    assert!(generator.requests.lock().unwrap().is_empty());
}
