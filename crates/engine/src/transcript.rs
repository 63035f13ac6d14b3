//! Transcript rendering for prompts.
//!
//! Each monologue becomes one `[m:ss] Speaker: "text"` line, with speaker
//! labels reduced to a first name.

use std::sync::OnceLock;

use call_analyzer_core::{TranscriptEntry, UNKNOWN_SPEAKER};
use regex::Regex;

static PARENTHETICAL_RE: OnceLock<Option<Regex>> = OnceLock::new();
static GENERATED_LABEL_RE: OnceLock<Option<Regex>> = OnceLock::new();

fn parenthetical_re() -> Option<&'static Regex> {
    PARENTHETICAL_RE
        .get_or_init(|| Regex::new(r"\s*\([^)]*\)").ok())
        .as_ref()
}

/// Generated labels such as `Speaker 2` or `user_3`.
fn generated_label_re() -> Option<&'static Regex> {
    GENERATED_LABEL_RE
        .get_or_init(|| Regex::new(r"(?i)^(speaker|user|participant)[\s_#-]*\d*$").ok())
        .as_ref()
}

/// Raw provider ids (`4471938`, `a1b2c3d4-e5f6`) or generated labels.
fn is_id_shaped(name: &str) -> bool {
    let raw_id = name.chars().any(|c| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    raw_id || generated_label_re().is_some_and(|re| re.is_match(name))
}

/// Readable first name for a raw speaker label.
pub fn normalize_speaker(raw: &str) -> String {
    let stripped = match parenthetical_re() {
        Some(re) => re.replace_all(raw, "").into_owned(),
        None => raw.to_string(),
    };
    let name = stripped.split(',').next().unwrap_or_default().trim();

    if name.is_empty() || name.eq_ignore_ascii_case(UNKNOWN_SPEAKER) || is_id_shaped(name) {
        return UNKNOWN_SPEAKER.to_string();
    }
    name.split_whitespace()
        .next()
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_SPEAKER.to_string())
}

/// Milliseconds to `m:ss`.
pub fn format_timestamp(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Render monologues as citation-ready lines. Entries without spoken text
/// are skipped.
pub fn render_transcript(entries: &[TranscriptEntry]) -> String {
    let mut lines = Vec::with_capacity(entries.len());
    for entry in entries {
        let text = entry
            .sentences
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if text.is_empty() {
            continue;
        }
        let start = entry.sentences.first().map_or(0, |s| s.start);
        lines.push(format!(
            "[{}] {}: \"{}\"",
            format_timestamp(start),
            normalize_speaker(&entry.speaker),
            text
        ));
    }
    lines.join("\n")
}
