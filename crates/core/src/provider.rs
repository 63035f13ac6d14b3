//! Call Data Provider
//!
//! Capability contract for the conversation-intelligence backend that supplies
//! call metadata and transcripts. The engine is built against this trait so a
//! REST client, a file-backed store, or a test double all satisfy it.

use async_trait::async_trait;

use crate::call::{
    summarize_transcript, CallDetails, CallTranscript, TranscriptEntry, TranscriptSummary,
};
use crate::error::CoreResult;

/// Source of call metadata and transcripts.
#[async_trait]
pub trait CallDataProvider: Send + Sync {
    /// Fetch basic metadata for a call.
    async fn get_call_details(&self, call_id: &str) -> CoreResult<CallDetails>;

    /// Fetch the transcript for a call. A call without a recording yields
    /// `has_transcript: false` rather than an error.
    async fn get_call_transcript(&self, call_id: &str) -> CoreResult<CallTranscript>;

    /// Derive a summary from a transcript.
    ///
    /// The default counts speakers, ranks topics and measures talk time
    /// locally; providers with server-side summaries can override it.
    fn generate_transcript_summary(&self, transcript: &[TranscriptEntry]) -> TranscriptSummary {
        summarize_transcript(transcript)
    }
}
