//! Citation Compliance
//!
//! Advisory checks over every evidence item in an analysis. Nothing here
//! rejects an analysis; the report is attached to the record for review.

use std::sync::OnceLock;

use call_analyzer_core::{CitationReport, CitationViolation};
use regex::Regex;
use serde_json::Value;

static TIMESTAMP_RE: OnceLock<Option<Regex>> = OnceLock::new();
static PLACEHOLDER_SPEAKER_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn timestamp_re() -> Option<&'static Regex> {
    TIMESTAMP_RE
        .get_or_init(|| Regex::new(r"^\d{1,3}:\d{2}(\s*-\s*\d{1,3}:\d{2})?$").ok())
        .as_ref()
}

fn placeholder_speaker_re() -> Option<&'static Regex> {
    PLACEHOLDER_SPEAKER_RE
        .get_or_init(|| Regex::new(r"(?i)^speaker[\s_#-]*(\d+|\([^)]*\))$").ok())
        .as_ref()
}

/// `m:ss`, or a `m:ss - m:ss` range.
pub fn is_valid_timestamp(timestamp: &str) -> bool {
    timestamp_re().is_some_and(|re| re.is_match(timestamp.trim()))
}

/// Generated speaker labels such as `Speaker 1` or `Speaker(4471)`.
pub fn is_placeholder_speaker(speaker: &str) -> bool {
    placeholder_speaker_re().is_some_and(|re| re.is_match(speaker.trim()))
}

#[derive(Default)]
struct Walk {
    total: usize,
    legacy: usize,
    violations: Vec<CitationViolation>,
}

impl Walk {
    fn violation(&mut self, location: &str, error: impl Into<String>) {
        self.violations.push(CitationViolation {
            location: location.to_string(),
            error: error.into(),
        });
    }

    fn evidence(&mut self, items: Option<&Value>, location: &str) {
        let Some(items) = items.and_then(Value::as_array) else {
            return;
        };
        for (k, item) in items.iter().enumerate() {
            let item_location = format!("{}[{}]", location, k);
            match item {
                Value::Object(_) => {
                    self.total += 1;
                    self.citation(item, &item_location);
                }
                Value::String(_) => self.legacy += 1,
                _ => self.violation(&item_location, "evidence item is not a citation object"),
            }
        }
    }

    fn citation(&mut self, citation: &Value, location: &str) {
        match citation.get("speaker").and_then(Value::as_str).map(str::trim) {
            None | Some("") => self.violation(location, "citation is missing a speaker"),
            Some(speaker) if is_placeholder_speaker(speaker) => self.violation(
                location,
                format!(
                    "speaker '{}' is a generated label; \
                     use the speaker's name or \"Unknown Speaker\"",
                    speaker
                ),
            ),
            Some(_) => {}
        }

        match citation.get("quote").and_then(Value::as_str).map(str::trim) {
            None | Some("") => self.violation(location, "citation is missing a quote"),
            Some(_) => {}
        }

        match citation.get("timestamp") {
            None | Some(Value::Null) => {}
            Some(Value::String(ts)) if is_valid_timestamp(ts) => {}
            Some(other) => self.violation(
                location,
                format!(
                    "timestamp {} is not in m:ss or m:ss - m:ss form",
                    other
                ),
            ),
        }
    }
}

/// Check every citation in a parsed analysis value.
///
/// Covers sub-component evidence, anticipated-objection evidence and
/// supporting evidence. Plain-string evidence is counted as legacy and
/// produces a warning rather than a violation.
pub fn validate_citations(value: &Value) -> CitationReport {
    let mut walk = Walk::default();

    if let Some(components) = value.get("components").and_then(Value::as_array) {
        for (i, component) in components.iter().enumerate() {
            let Some(subs) = component.get("subComponents").and_then(Value::as_array) else {
                continue;
            };
            for (j, sub) in subs.iter().enumerate() {
                walk.evidence(
                    sub.get("evidence"),
                    &format!("components[{}].subComponents[{}].evidence", i, j),
                );
            }
        }
    }

    if let Some(planning) = value.get("followUpCallPlanning") {
        if let Some(objections) = planning.get("anticipatedObjections").and_then(Value::as_array) {
            for (i, objection) in objections.iter().enumerate() {
                walk.evidence(
                    objection.get("evidence"),
                    &format!("followUpCallPlanning.anticipatedObjections[{}].evidence", i),
                );
            }
        }
        walk.evidence(
            planning.get("supportingEvidence"),
            "followUpCallPlanning.supportingEvidence",
        );
    }

    let mut warnings = Vec::new();
    if walk.legacy > 0 {
        warnings.push(format!(
            "{} evidence item(s) use the legacy string format instead of structured citations",
            walk.legacy
        ));
    }
    if walk.total == 0 && walk.legacy == 0 {
        warnings.push("No citations found in analysis".to_string());
    }

    CitationReport {
        total_citations: walk.total,
        compliant: walk.violations.is_empty(),
        violations: walk.violations,
        warnings,
    }
}
