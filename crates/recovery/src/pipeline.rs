//! Response Recovery Pipeline
//!
//! Converts raw generator text into a schema-valid analysis. Each tier
//! returns a [`TierOutcome`]; the pipeline folds over the tiers until one
//! succeeds, then falls back to the minimal analysis.
//!
//! | tier | input | strategy |
//! |------|-------|----------|
//! | extraction | raw text | greedy first-`{` to last-`}` span |
//! | repair | extracted span | JSON repair, parse, validate |
//! | balanced truncation | raw text | largest balanced object prefix, then single objects |
//! | minimal fallback | - | canonical "Analysis Error" analysis |
//!
//! Only if the fallback itself cannot be produced does the pipeline hand back
//! the raw text as [`RecoveryOutcome::Unrecoverable`].

use call_analyzer_core::{CitationReport, GeneratedAnalysis};
use serde_json::Value;

use crate::citation::validate_citations;
use crate::extract::{balanced_object_candidates, extract_object_span};
use crate::fallback::minimal_fallback_analysis;
use crate::repair::repair_json;
use crate::schema::{
    normalize_legacy_evidence, normalize_optional_fields, validate_analysis, SchemaViolation,
};

/// Result of a single recovery tier.
#[derive(Debug)]
pub enum TierOutcome<T> {
    Success(T),
    /// Hand this input to the next tier
    Escalate(String),
    /// Nothing left to try
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryTier {
    Extraction,
    Repair,
    BalancedTruncation,
}

impl RecoveryTier {
    const ORDER: [RecoveryTier; 3] = [
        RecoveryTier::Extraction,
        RecoveryTier::Repair,
        RecoveryTier::BalancedTruncation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecoveryTier::Extraction => "extraction",
            RecoveryTier::Repair => "repair",
            RecoveryTier::BalancedTruncation => "balanced_truncation",
        }
    }
}

impl std::fmt::Display for RecoveryTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An analysis accepted by one of the recovery tiers.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoveredAnalysis {
    pub analysis: GeneratedAnalysis,
    pub citations: CitationReport,
    pub tier: RecoveryTier,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryOutcome {
    Recovered(RecoveredAnalysis),
    /// No tier succeeded; carries the minimal fallback analysis
    Fallback(GeneratedAnalysis),
    /// The fallback itself could not be built. Callers treat this as a defect.
    Unrecoverable { raw: String },
}

/// Validated analysis plus its citation report, before the tier is known.
type Accepted = (GeneratedAnalysis, CitationReport);

/// Validate a parsed value and convert it into a typed analysis.
///
/// The citation report is computed on the value as emitted, so legacy
/// string evidence is still visible to it; advisory fields and evidence are
/// normalized only afterwards.
pub fn accept_value(mut value: Value) -> Result<Accepted, SchemaViolation> {
    validate_analysis(&value)?;
    let citations = validate_citations(&value);
    normalize_optional_fields(&mut value);
    normalize_legacy_evidence(&mut value);
    let analysis = serde_json::from_value(value)
        .map_err(|e| SchemaViolation::new("$", e.to_string()))?;
    Ok((analysis, citations))
}

fn accept_text(text: &str) -> Result<Accepted, SchemaViolation> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| SchemaViolation::new("$", format!("not valid JSON: {}", e)))?;
    accept_value(value)
}

fn extraction_tier(input: &str) -> TierOutcome<Accepted> {
    let Some(span) = extract_object_span(input) else {
        tracing::debug!(tier = "extraction", "no object span found");
        return TierOutcome::Escalate(input.to_string());
    };
    match accept_text(span) {
        Ok(accepted) => TierOutcome::Success(accepted),
        Err(violation) => {
            tracing::debug!(tier = "extraction", %violation, "escalating");
            TierOutcome::Escalate(span.to_string())
        }
    }
}

fn repair_tier(input: &str) -> TierOutcome<Accepted> {
    match accept_text(&repair_json(input)) {
        Ok(accepted) => TierOutcome::Success(accepted),
        Err(violation) => {
            tracing::debug!(tier = "repair", %violation, "escalating");
            TierOutcome::Escalate(input.to_string())
        }
    }
}

fn truncation_tier(raw: &str) -> TierOutcome<Accepted> {
    for candidate in balanced_object_candidates(raw) {
        let attempt = accept_text(candidate).or_else(|_| accept_text(&repair_json(candidate)));
        match attempt {
            Ok(accepted) => return TierOutcome::Success(accepted),
            Err(violation) => {
                tracing::debug!(tier = "balanced_truncation", %violation, "candidate rejected");
            }
        }
    }
    TierOutcome::Exhausted
}

/// Run every tier over `raw` and return the first schema-valid analysis.
pub fn recover(raw: &str) -> RecoveryOutcome {
    let mut input = raw.to_string();

    for tier in RecoveryTier::ORDER {
        let outcome = match tier {
            RecoveryTier::Extraction => extraction_tier(&input),
            RecoveryTier::Repair => repair_tier(&input),
            RecoveryTier::BalancedTruncation => truncation_tier(raw),
        };
        match outcome {
            TierOutcome::Success((analysis, citations)) => {
                tracing::debug!(%tier, "analysis recovered");
                return RecoveryOutcome::Recovered(RecoveredAnalysis {
                    analysis,
                    citations,
                    tier,
                });
            }
            TierOutcome::Escalate(next) => input = next,
            TierOutcome::Exhausted => break,
        }
    }

    tracing::warn!(
        response_len = raw.len(),
        "all recovery tiers failed; using minimal fallback analysis"
    );
    match fallback_tier() {
        Ok(analysis) => RecoveryOutcome::Fallback(analysis),
        Err(violation) => {
            tracing::error!(%violation, "minimal fallback analysis failed validation");
            RecoveryOutcome::Unrecoverable {
                raw: raw.to_string(),
            }
        }
    }
}

fn fallback_tier() -> Result<GeneratedAnalysis, SchemaViolation> {
    let value = serde_json::to_value(minimal_fallback_analysis())
        .map_err(|e| SchemaViolation::new("$", e.to_string()))?;
    accept_value(value).map(|(analysis, _)| analysis)
}
