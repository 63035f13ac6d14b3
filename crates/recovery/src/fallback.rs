//! Minimal fallback analysis, used when no tier recovers the model output.

use call_analyzer_core::{
    ComponentAnalysis, CustomerCitation, ExecutiveSummary, FollowUpCallPlanning,
    GeneratedAnalysis, SubComponentScore,
};

/// Component name that marks an analysis as a parsing fallback.
pub const FALLBACK_COMPONENT: &str = "Analysis Error";

/// Placeholder analysis with no scores. Always satisfies the analysis schema.
pub fn minimal_fallback_analysis() -> GeneratedAnalysis {
    GeneratedAnalysis {
        overall_score: None,
        components: vec![ComponentAnalysis {
            name: FALLBACK_COMPONENT.to_string(),
            overall_score: None,
            sub_components: vec![SubComponentScore {
                name: "Response Parsing".to_string(),
                score: None,
                evidence: vec![CustomerCitation::from_legacy(
                    "No evidence could be extracted from the model response",
                )],
                qualitative_assessment:
                    "The model response could not be parsed into a structured analysis."
                        .to_string(),
                improvement_suggestions: vec![
                    "Re-run the analysis for this call".to_string(),
                    "Check that the call transcript is available".to_string(),
                ],
            }],
            key_findings: vec!["Analysis output was not machine-readable".to_string()],
        }],
        executive_summary: ExecutiveSummary {
            strengths: Vec::new(),
            weaknesses: vec!["Analysis could not be completed for this call".to_string()],
            recommendations: vec!["Re-run the analysis".to_string()],
        },
        follow_up_call_planning: FollowUpCallPlanning::default(),
    }
}
