//! Test doubles shared by the integration suites.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use call_analyzer_core::{
    CallDataProvider, CallDetails, CallTranscript, CoreError, CoreResult, TranscriptEntry,
    TranscriptSentence,
};
use call_analyzer_engine::{
    AnalysisOptions, AnalysisRequest, CallAnalyzer, FrameworkRegistry, ResourceArtifact,
    ResourceLoader, ResourceStore,
};
use call_analyzer_llm::{CompletionRequest, GenerationClient, LlmResult};
use chrono::{TimeZone, Utc};

/// In-memory calls; ids in `broken` fail every lookup.
#[derive(Default)]
pub struct MockProvider {
    details: HashMap<String, CallDetails>,
    transcripts: HashMap<String, CallTranscript>,
    broken: HashSet<String>,
}

impl MockProvider {
    pub fn with_call(mut self, id: &str, title: &str, day: u32) -> Self {
        let mut details = CallDetails::unknown(id);
        details.title = title.to_string();
        details.date = Utc.with_ymd_and_hms(2024, 3, day, 15, 0, 0).single();
        details.duration = 1800;
        self.details.insert(id.to_string(), details);
        self.transcripts.insert(
            id.to_string(),
            CallTranscript {
                has_transcript: true,
                transcript: vec![TranscriptEntry {
                    speaker: "Maria Lopez (Director of Ops)".to_string(),
                    topic: Some("Pain".to_string()),
                    sentences: vec![TranscriptSentence {
                        start: 95_000,
                        end: 99_000,
                        text: "Month-end close takes us nine days.".to_string(),
                    }],
                }],
            },
        );
        self
    }

    pub fn broken(mut self, id: &str) -> Self {
        self.broken.insert(id.to_string());
        self
    }
}

#[async_trait]
impl CallDataProvider for MockProvider {
    async fn get_call_details(&self, call_id: &str) -> CoreResult<CallDetails> {
        if self.broken.contains(call_id) {
            return Err(CoreError::provider(format!("upstream refused {}", call_id)));
        }
        self.details
            .get(call_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("call {}", call_id)))
    }

    async fn get_call_transcript(&self, call_id: &str) -> CoreResult<CallTranscript> {
        if self.broken.contains(call_id) {
            return Err(CoreError::provider(format!("upstream refused {}", call_id)));
        }
        Ok(self
            .transcripts
            .get(call_id)
            .cloned()
            .unwrap_or_else(CallTranscript::missing))
    }
}

/// Scores keyed by (call id, framework name); unknown pairs get `default`.
pub struct ScriptedGenerator {
    scores: HashMap<(String, String), u32>,
    default: u32,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedGenerator {
    pub fn new(default: u32) -> Self {
        Self {
            scores: HashMap::new(),
            default,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn score(mut self, call_id: &str, framework_name: &str, score: u32) -> Self {
        self.scores
            .insert((call_id.to_string(), framework_name.to_string()), score);
        self
    }

    fn lookup(&self, request: &CompletionRequest) -> u32 {
        let call_id = request
            .user_prompt
            .lines()
            .find_map(|l| l.strip_prefix("- Call ID: "))
            .unwrap_or_default();
        self.scores
            .iter()
            .find(|((id, name), _)| id == call_id && request.system_prompt.contains(name.as_str()))
            .map(|(_, score)| *score)
            .unwrap_or(self.default)
    }
}

#[async_trait]
impl GenerationClient for ScriptedGenerator {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn create_completion(&self, request: CompletionRequest) -> LlmResult<String> {
        let score = self.lookup(&request);
        self.requests.lock().unwrap().push(request);
        Ok(format!(
            "Here is my evaluation.\n```json\n{}\n```",
            analysis_json(score)
        ))
    }
}

/// Resource store with nothing in it; every prompt is built in basic mode.
pub struct EmptyStore;

#[async_trait]
impl ResourceStore for EmptyStore {
    async fn read(&self, _framework_id: &str, artifact: ResourceArtifact) -> CoreResult<String> {
        Err(CoreError::not_found(artifact.file_name()))
    }
}

pub fn analysis_json(score: u32) -> String {
    let strength = if score >= 7 { "Strong discovery" } else { "Rapport building" };
    format!(
        r#"{{
  "overallScore": {score},
  "components": [
    {{
      "name": "Discovery",
      "overallScore": {score},
      "subComponents": [
        {{
          "name": "Pain Identification",
          "score": {score},
          "evidence": [
            {{"speaker": "Maria", "timestamp": "1:35", "quote": "Month-end close takes us nine days.", "context": "Ops pain"}}
          ],
          "qualitativeAssessment": "Pain was surfaced and quantified.",
          "improvementSuggestions": ["Tie the delay to revenue"]
        }}
      ],
      "keyFindings": ["Close process is the core pain"]
    }}
  ],
  "executiveSummary": {{
    "strengths": ["{strength}"],
    "weaknesses": ["Next steps left vague"],
    "recommendations": ["Book a technical deep dive"]
  }}
}}"#
    )
}

pub fn analyzer(provider: MockProvider, generator: Arc<ScriptedGenerator>) -> CallAnalyzer {
    CallAnalyzer::new(
        Arc::new(provider),
        generator,
        Arc::new(ResourceLoader::new(Arc::new(EmptyStore))),
        FrameworkRegistry::builtin().unwrap(),
        AnalysisOptions::default(),
    )
}

pub fn request(calls: &[&str], frameworks: &[&str]) -> AnalysisRequest {
    AnalysisRequest::new(
        calls.iter().map(|s| s.to_string()).collect(),
        frameworks.iter().map(|s| s.to_string()).collect(),
    )
}
