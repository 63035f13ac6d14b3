//! Analysis Data Model
//!
//! Typed shapes for the generated per-call analysis, the analysis record
//! returned for each (call, framework) pair, and the cross-call aggregate.
//!
//! All types serialize with camelCase keys, which is also the shape the
//! generation prompt asks the model to emit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::call::{CallDetails, Participant};
use crate::framework::FrameworkDefinition;

// ============================================================================
// Citations
// ============================================================================

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Literal used when a citation's speaker cannot be resolved to a name.
pub const UNKNOWN_SPEAKER: &str = "Unknown Speaker";

/// One evidentiary reference into a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerCitation {
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub quote: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl CustomerCitation {
    /// Citation for legacy plain-string evidence, which carries no speaker.
    pub fn from_legacy(quote: impl Into<String>) -> Self {
        Self {
            speaker: UNKNOWN_SPEAKER.to_string(),
            timestamp: None,
            quote: quote.into(),
            context: None,
        }
    }
}

// ============================================================================
// Generated Analysis
// ============================================================================

/// Score for a single rubric sub-component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubComponentScore {
    pub name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub evidence: Vec<CustomerCitation>,
    #[serde(default)]
    pub qualitative_assessment: String,
    #[serde(default)]
    pub improvement_suggestions: Vec<String>,
}

/// Score and findings for a rubric component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentAnalysis {
    pub name: String,
    #[serde(default)]
    pub overall_score: Option<f64>,
    pub sub_components: Vec<SubComponentScore>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_findings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

/// An objection the rep should prepare for on the next call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnticipatedObjection {
    pub objection: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_response: String,
    #[serde(default)]
    pub evidence: Vec<CustomerCitation>,
}

/// Next-call strategy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUpCallPlanning {
    #[serde(default, deserialize_with = "null_as_default")]
    pub next_call_objectives: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_questions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stakeholders_to_engage: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub anticipated_objections: Vec<AnticipatedObjection>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub supporting_evidence: Vec<CustomerCitation>,
}

/// The structure the generation model is asked to produce for one call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAnalysis {
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub components: Vec<ComponentAnalysis>,
    #[serde(default)]
    pub executive_summary: ExecutiveSummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub follow_up_call_planning: FollowUpCallPlanning,
}

impl GeneratedAnalysis {
    /// The model's overall score, or the mean of the component scores (then
    /// sub-component scores) when the model left it null.
    pub fn resolved_overall_score(&self) -> Option<f64> {
        if self.overall_score.is_some() {
            return self.overall_score;
        }
        let component_scores: Vec<f64> =
            self.components.iter().filter_map(|c| c.overall_score).collect();
        if let Some(mean) = mean(&component_scores) {
            return Some(mean);
        }
        let sub_scores: Vec<f64> = self
            .components
            .iter()
            .flat_map(|c| c.sub_components.iter())
            .filter_map(|s| s.score)
            .collect();
        mean(&sub_scores)
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

// ============================================================================
// Citation Compliance
// ============================================================================

/// A single citation that breaks the citation contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitationViolation {
    /// JSON-path-like location, e.g. `components[0].subComponents[1].evidence[2]`
    pub location: String,
    pub error: String,
}

/// Advisory report over every citation in an analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitationReport {
    pub total_citations: usize,
    pub compliant: bool,
    pub violations: Vec<CitationViolation>,
    pub warnings: Vec<String>,
}

// ============================================================================
// Call Analysis
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    /// Scored
    Completed,
    /// The system malfunctioned
    Error,
    /// Analysis ran on insufficient input (e.g. no transcript)
    Incomplete,
}

impl std::fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisStatus::Completed => write!(f, "completed"),
            AnalysisStatus::Error => write!(f, "error"),
            AnalysisStatus::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// One evaluation of one call against one framework.
///
/// Construct through [`CallAnalysis::completed`], [`CallAnalysis::incomplete`]
/// or [`CallAnalysis::failed`]; these keep `overall_score` present exactly
/// when the status is `Completed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallAnalysis {
    pub call_id: String,
    pub call_title: String,
    pub call_url: Option<String>,
    pub call_date: Option<DateTime<Utc>>,
    pub participants: Vec<Participant>,
    /// Call length in seconds
    pub duration: u64,
    pub framework_id: String,
    pub framework: String,
    pub overall_score: Option<f64>,
    pub analysis_status: AnalysisStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_reason: Option<String>,
    pub components: Vec<ComponentAnalysis>,
    pub executive_summary: ExecutiveSummary,
    pub follow_up_call_planning: FollowUpCallPlanning,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_compliance: Option<CitationReport>,
}

impl CallAnalysis {
    fn header(
        details: &CallDetails,
        framework: &FrameworkDefinition,
        status: AnalysisStatus,
        error_reason: Option<String>,
    ) -> Self {
        Self {
            call_id: details.call_id.clone(),
            call_title: details.title.clone(),
            call_url: details.call_url.clone(),
            call_date: details.date,
            participants: details.participants.clone(),
            duration: details.duration,
            framework_id: framework.id.clone(),
            framework: framework.name.clone(),
            overall_score: None,
            analysis_status: status,
            error_reason,
            components: Vec::new(),
            executive_summary: ExecutiveSummary::default(),
            follow_up_call_planning: FollowUpCallPlanning::default(),
            citation_compliance: None,
        }
    }

    /// A scored analysis.
    pub fn completed(
        details: &CallDetails,
        framework: &FrameworkDefinition,
        generated: GeneratedAnalysis,
        overall_score: f64,
    ) -> Self {
        let mut analysis = Self::header(details, framework, AnalysisStatus::Completed, None);
        analysis.overall_score = Some(overall_score);
        analysis.components = generated.components;
        analysis.executive_summary = generated.executive_summary;
        analysis.follow_up_call_planning = generated.follow_up_call_planning;
        analysis
    }

    /// An analysis that ran but lacked the input needed for a score. Any
    /// qualitative output is kept; scores are discarded at the top level.
    pub fn incomplete(
        details: &CallDetails,
        framework: &FrameworkDefinition,
        generated: Option<GeneratedAnalysis>,
        reason: impl Into<String>,
    ) -> Self {
        let mut analysis = Self::header(
            details,
            framework,
            AnalysisStatus::Incomplete,
            Some(reason.into()),
        );
        if let Some(generated) = generated {
            analysis.components = generated.components;
            analysis.executive_summary = generated.executive_summary;
            analysis.follow_up_call_planning = generated.follow_up_call_planning;
        }
        analysis
    }

    /// An analysis that failed outright.
    pub fn failed(
        details: &CallDetails,
        framework: &FrameworkDefinition,
        reason: impl Into<String>,
    ) -> Self {
        Self::header(
            details,
            framework,
            AnalysisStatus::Error,
            Some(reason.into()),
        )
    }

    pub fn with_citation_report(mut self, report: CitationReport) -> Self {
        self.citation_compliance = Some(report);
        self
    }

    /// Whether this analysis counts toward aggregate statistics.
    pub fn is_scored(&self) -> bool {
        self.analysis_status == AnalysisStatus::Completed && self.overall_score.is_some()
    }
}

// ============================================================================
// Aggregate Analysis
// ============================================================================

/// Score statistics for one framework across all scored calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkStats {
    pub framework_id: String,
    pub framework: String,
    pub scored_calls: usize,
    pub mean_score: Option<f64>,
    /// Population variance
    pub variance: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameworkComparison {
    pub frameworks: Vec<FrameworkStats>,
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

/// Score movement from the earliest to the latest scored call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTrend {
    pub first_call_id: String,
    pub first_score: f64,
    pub last_call_id: String,
    pub last_score: f64,
    pub change: f64,
    pub direction: TrendDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateInsights {
    pub common_strengths: Vec<String>,
    pub common_weaknesses: Vec<String>,
    pub improvement_opportunities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub framework_comparison: Option<FrameworkComparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_trend: Option<ScoreTrend>,
    #[serde(default)]
    pub notes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendations {
    pub immediate: Vec<String>,
    pub strategic: Vec<String>,
    pub coaching: Vec<String>,
}

/// Cross-call report over every requested (call, framework) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnalysis {
    /// Number of analysis records (one per requested pair)
    pub total_calls: usize,
    pub scored_calls: usize,
    pub frameworks: Vec<String>,
    pub overall_score: Option<f64>,
    pub call_analyses: Vec<CallAnalysis>,
    pub aggregate_insights: AggregateInsights,
    pub recommendations: Recommendations,
}
