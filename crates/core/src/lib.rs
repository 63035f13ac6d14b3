//! Call Analyzer Core
//!
//! Foundational types for the Call Analyzer workspace. This crate has no
//! dependencies on the generation providers, the recovery pipeline or the
//! engine.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `call` - Call metadata, transcripts and the derived transcript summary
//! - `framework` - Scoring framework definitions (components, sub-components)
//! - `analysis` - Per-call analysis records and the cross-call aggregate
//! - `provider` - `CallDataProvider` capability contract

pub mod analysis;
pub mod call;
pub mod error;
pub mod framework;
pub mod provider;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use analysis::{
    mean, AggregateAnalysis, AggregateInsights, AnalysisStatus, AnticipatedObjection,
    CallAnalysis, CitationReport, CitationViolation, ComponentAnalysis, CustomerCitation,
    ExecutiveSummary, FollowUpCallPlanning, FrameworkComparison, FrameworkStats,
    GeneratedAnalysis, Recommendations, ScoreTrend, SubComponentScore, TrendDirection,
    UNKNOWN_SPEAKER,
};
pub use call::{
    summarize_transcript, Affiliation, CallDetails, CallRecord, CallTranscript, Participant,
    SpeakerSummary, TranscriptEntry, TranscriptSentence, TranscriptSummary,
};
pub use framework::{Component, FrameworkDefinition, ScoringBand, SubComponent};

// ── Provider Contracts ─────────────────────────────────────────────────
pub use provider::CallDataProvider;
