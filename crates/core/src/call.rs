//! Call Data Types
//!
//! Recorded-call metadata and transcript shapes as returned by a
//! `CallDataProvider`, plus the derived transcript summary that is merged into
//! a call before analysis.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Call Metadata
// ============================================================================

/// Which side of the conversation a participant belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affiliation {
    Internal,
    External,
    #[default]
    Unknown,
}

impl std::fmt::Display for Affiliation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Affiliation::Internal => write!(f, "internal"),
            Affiliation::External => write!(f, "external"),
            Affiliation::Unknown => write!(f, "unknown"),
        }
    }
}

/// A person who took part in a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub affiliation: Affiliation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Participant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: None,
            affiliation: Affiliation::Unknown,
            email: None,
        }
    }
}

/// Basic metadata for a recorded call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallDetails {
    pub call_id: String,
    pub title: String,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Call length in seconds
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_url: Option<String>,
}

impl CallDetails {
    /// Placeholder metadata for a call whose details could not be fetched.
    pub fn unknown(call_id: impl Into<String>) -> Self {
        let call_id = call_id.into();
        Self {
            title: format!("Call {}", call_id),
            call_id,
            date: None,
            duration: 0,
            participants: Vec::new(),
            call_url: None,
        }
    }
}

// ============================================================================
// Transcript
// ============================================================================

/// A single sentence in a transcript monologue. Offsets are milliseconds
/// from the start of the recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSentence {
    pub start: u64,
    pub end: u64,
    pub text: String,
}

/// One uninterrupted monologue by a speaker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    /// Speaker name or raw speaker id, as delivered by the provider
    pub speaker: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentences: Vec<TranscriptSentence>,
}

/// Transcript lookup result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTranscript {
    pub has_transcript: bool,
    #[serde(default)]
    pub transcript: Vec<TranscriptEntry>,
}

impl CallTranscript {
    /// A transcript lookup that found nothing.
    pub fn missing() -> Self {
        Self::default()
    }

    /// Whether there is any spoken text to analyze.
    pub fn is_usable(&self) -> bool {
        self.has_transcript
            && self
                .transcript
                .iter()
                .any(|e| e.sentences.iter().any(|s| !s.text.trim().is_empty()))
    }
}

// ============================================================================
// Transcript Summary
// ============================================================================

/// Per-speaker talk statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakerSummary {
    pub speaker: String,
    pub segments: usize,
    pub words: usize,
    pub talk_time_ms: u64,
}

/// Derived overview of a transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSummary {
    pub total_speakers: usize,
    pub key_topics: Vec<String>,
    /// Span from the first sentence start to the last sentence end, in ms
    pub total_duration: u64,
    pub speaker_summary: Vec<SpeakerSummary>,
}

/// Maximum number of topics reported in a summary.
const MAX_KEY_TOPICS: usize = 5;

/// Summarize a transcript: speaker count, most frequent topics, overall span,
/// and a per-speaker breakdown ordered by talk time.
pub fn summarize_transcript(transcript: &[TranscriptEntry]) -> TranscriptSummary {
    let mut speakers: HashMap<&str, SpeakerSummary> = HashMap::new();
    let mut topics: HashMap<&str, usize> = HashMap::new();
    let mut first_start: Option<u64> = None;
    let mut last_end: u64 = 0;

    for entry in transcript {
        let summary = speakers
            .entry(entry.speaker.as_str())
            .or_insert_with(|| SpeakerSummary {
                speaker: entry.speaker.clone(),
                segments: 0,
                words: 0,
                talk_time_ms: 0,
            });
        summary.segments += 1;

        for sentence in &entry.sentences {
            summary.words += sentence.text.split_whitespace().count();
            summary.talk_time_ms += sentence.end.saturating_sub(sentence.start);
            first_start = Some(first_start.map_or(sentence.start, |s| s.min(sentence.start)));
            last_end = last_end.max(sentence.end);
        }

        if let Some(topic) = entry.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            *topics.entry(topic).or_insert(0) += 1;
        }
    }

    let mut ranked_topics: Vec<(&str, usize)> = topics.into_iter().collect();
    ranked_topics.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut speaker_summary: Vec<SpeakerSummary> = speakers.into_values().collect();
    speaker_summary.sort_by(|a, b| {
        b.talk_time_ms
            .cmp(&a.talk_time_ms)
            .then_with(|| a.speaker.cmp(&b.speaker))
    });

    TranscriptSummary {
        total_speakers: speaker_summary.len(),
        key_topics: ranked_topics
            .into_iter()
            .take(MAX_KEY_TOPICS)
            .map(|(t, _)| t.to_string())
            .collect(),
        total_duration: first_start.map_or(0, |start| last_end.saturating_sub(start)),
        speaker_summary,
    }
}

// ============================================================================
// Merged Call Record
// ============================================================================

/// Call metadata merged with its transcript, ready for prompt construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub details: CallDetails,
    pub transcript: Vec<TranscriptEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript_summary: Option<TranscriptSummary>,
}

impl CallRecord {
    /// Whether the record carries a transcript with spoken text.
    pub fn has_transcript(&self) -> bool {
        self.transcript
            .iter()
            .any(|e| e.sentences.iter().any(|s| !s.text.trim().is_empty()))
    }
}
