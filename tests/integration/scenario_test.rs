//! Batch Scenario Tests
//!
//! Whole batches through `CallAnalyzer::analyze`:
//! - one call failing to fetch while its sibling is scored
//! - a two-framework comparison with a clear winner
//! - low and high scorers driving the recommendation tiers
//! - status/score consistency across a mixed batch

use std::sync::Arc;

use call_analyzer_core::{AggregateAnalysis, AnalysisStatus, TrendDirection};

use crate::support::{analyzer, request, MockProvider, ScriptedGenerator};

fn assert_status_matches_score(report: &AggregateAnalysis) {
    for analysis in &report.call_analyses {
        assert_eq!(
            analysis.overall_score.is_some(),
            analysis.analysis_status == AnalysisStatus::Completed,
            "{} / {}",
            analysis.call_id,
            analysis.framework_id
        );
    }
}

#[tokio::test]
async fn test_failed_fetch_does_not_sink_the_batch() {
    let provider = MockProvider::default()
        .with_call("c1", "Discovery with Acme", 4)
        .broken("c2");
    let generator = Arc::new(ScriptedGenerator::new(7));
    let analyzer = analyzer(provider, generator.clone());

    let report = analyzer
        .analyze(&request(&["c1", "c2"], &["great_demo"]))
        .await
        .unwrap();

    assert_eq!(report.total_calls, 2);
    assert_eq!(report.scored_calls, 1);
    assert_eq!(report.overall_score, Some(7.0));

    let c1 = &report.call_analyses[0];
    assert_eq!(c1.call_id, "c1");
    assert_eq!(c1.analysis_status, AnalysisStatus::Completed);
    assert_eq!(c1.overall_score, Some(7.0));

    let c2 = &report.call_analyses[1];
    assert_eq!(c2.call_id, "c2");
    assert_eq!(c2.analysis_status, AnalysisStatus::Error);
    assert!(c2.error_reason.as_deref().unwrap().contains("upstream refused c2"));

    assert_eq!(generator.requests.lock().unwrap().len(), 1);
    assert!(report
        .aggregate_insights
        .notes
        .iter()
        .any(|n| n.contains("1 of 2")));
    assert_status_matches_score(&report);
}

#[tokio::test]
async fn test_framework_comparison_names_stronger_framework() {
    let provider = MockProvider::default()
        .with_call("c1", "Intro", 1)
        .with_call("c2", "Demo", 8)
        .with_call("c3", "Pricing", 15);
    let generator = Arc::new(
        ScriptedGenerator::new(5)
            .score("c1", "Command of the Message", 4)
            .score("c2", "Command of the Message", 6)
            .score("c3", "Command of the Message", 4)
            .score("c1", "Great Demo", 8)
            .score("c2", "Great Demo", 9)
            .score("c3", "Great Demo", 8),
    );
    let analyzer = analyzer(provider, generator);

    let report = analyzer
        .analyze(&request(&["c1", "c2", "c3"], &["command_of_the_message", "great_demo"]))
        .await
        .unwrap();

    assert_eq!(report.total_calls, 6);
    assert_eq!(report.scored_calls, 6);
    assert_eq!(report.frameworks, vec!["command_of_the_message", "great_demo"]);

    let comparison = report.aggregate_insights.framework_comparison.as_ref().unwrap();
    assert_eq!(comparison.frameworks.len(), 2);
    assert!(comparison
        .summary
        .iter()
        .any(|s| s.starts_with("Great Demo scores higher than Command of the Message")));
    assert!(comparison
        .summary
        .iter()
        .any(|s| s.contains("more consistent than")));
    assert_status_matches_score(&report);
}

#[tokio::test]
async fn test_recommendations_flag_lowest_and_best_calls() {
    let provider = MockProvider::default()
        .with_call("weak", "Rushed discovery", 2)
        .with_call("mid", "Follow-up", 9)
        .with_call("star", "Executive demo", 16);
    let generator = Arc::new(
        ScriptedGenerator::new(6)
            .score("weak", "Great Demo", 2)
            .score("star", "Great Demo", 9),
    );
    let analyzer = analyzer(provider, generator);

    let report = analyzer
        .analyze(&request(&["weak", "mid", "star"], &["great_demo"]))
        .await
        .unwrap();

    let recs = &report.recommendations;
    assert!(recs.immediate.iter().any(|r| r.contains("Rushed discovery") && r.contains("weak")));
    assert!(recs
        .coaching
        .iter()
        .any(|r| r.contains("Executive demo") && r.contains("exemplar")));
    assert!(recs.coaching.len() >= 2);
    assert!(report
        .aggregate_insights
        .improvement_opportunities
        .iter()
        .any(|o| o.starts_with("Pain Identification")));
}

#[tokio::test]
async fn test_mixed_batch_keeps_status_and_mean_consistent() {
    let provider = MockProvider::default()
        .with_call("c1", "Kickoff", 3)
        .with_call("c2", "Scoping", 10)
        .broken("c3");
    let generator = Arc::new(
        ScriptedGenerator::new(5)
            .score("c1", "Value Selling", 6)
            .score("c2", "Value Selling", 9)
            .score("c1", "Sandler", 3),
    );
    let analyzer = analyzer(provider, generator);

    let mut req = request(&["c1", "c2", "c3"], &["value_selling", "sandler"]);
    req.include_call_sequence = true;
    let report = analyzer.analyze(&req).await.unwrap();

    assert_eq!(report.total_calls, 6);
    assert_status_matches_score(&report);

    let completed: Vec<f64> = report
        .call_analyses
        .iter()
        .filter(|a| a.analysis_status == AnalysisStatus::Completed)
        .filter_map(|a| a.overall_score)
        .collect();
    assert_eq!(completed.len(), report.scored_calls);
    let expected = completed.iter().sum::<f64>() / completed.len() as f64;
    assert!((report.overall_score.unwrap() - expected).abs() < 1e-9);

    let trend = report.aggregate_insights.score_trend.unwrap();
    assert_eq!(trend.first_call_id, "c1");
    assert_eq!(trend.last_call_id, "c2");
    assert_eq!(trend.direction, TrendDirection::Improving);
}

#[tokio::test]
async fn test_all_failures_leave_aggregate_unscored() {
    let provider = MockProvider::default().broken("c1").broken("c2");
    let analyzer = analyzer(provider, Arc::new(ScriptedGenerator::new(8)));

    let report = analyzer
        .analyze(&request(&["c1", "c2"], &["sandler"]))
        .await
        .unwrap();

    assert_eq!(report.total_calls, 2);
    assert_eq!(report.scored_calls, 0);
    assert!(report.overall_score.is_none());
    assert!(report.recommendations.immediate.is_empty());
    assert!(!report.recommendations.strategic.is_empty());
    assert_status_matches_score(&report);
}
