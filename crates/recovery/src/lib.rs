//! Call Analyzer Recovery
//!
//! Turns unreliable generator text into a validated `GeneratedAnalysis`:
//! - `extract` - locating JSON object spans in free-form text
//! - `repair` - rewriting near-JSON into parseable JSON
//! - `schema` - structural validation of parsed analyses
//! - `citation` - advisory citation compliance checks
//! - `fallback` - the minimal "Analysis Error" analysis
//! - `pipeline` - the tiered recovery fold over all of the above

pub mod citation;
pub mod extract;
pub mod fallback;
pub mod pipeline;
pub mod repair;
pub mod schema;

pub use citation::{is_placeholder_speaker, is_valid_timestamp, validate_citations};
pub use extract::{balanced_object_candidates, extract_object_span};
pub use fallback::{minimal_fallback_analysis, FALLBACK_COMPONENT};
pub use pipeline::{
    accept_value, recover, RecoveredAnalysis, RecoveryOutcome, RecoveryTier, TierOutcome,
};
pub use repair::repair_json;
pub use schema::{
    normalize_legacy_evidence, normalize_optional_fields, validate_analysis, SchemaViolation,
};
