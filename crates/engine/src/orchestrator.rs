//! Call/Framework Orchestrator
//!
//! Drives the batch: validates the request, fetches each call (details and
//! transcript concurrently), analyzes it against every requested framework
//! and aggregates the results.
//!
//! Each (call, framework) pair produces a `Result<CallAnalysis,
//! AnalysisError>` that is folded into a record, so no pair is ever dropped:
//!
//! | condition | record status |
//! |-----------|---------------|
//! | analysis recovered with a score | `completed` |
//! | no transcript, or no scores returned | `incomplete` |
//! | fetch, generation or recovery failure | `error` |
//!
//! Calls and frameworks are processed sequentially to bound the number of
//! in-flight generation requests.

use std::sync::Arc;

use call_analyzer_core::{
    AggregateAnalysis, CallAnalysis, CallDataProvider, CallDetails, CallRecord, CallTranscript,
    FrameworkDefinition,
};
use call_analyzer_llm::{CompletionRequest, GenerationClient};
use call_analyzer_recovery::{recover, RecoveryOutcome};
use serde::{Deserialize, Serialize};

use crate::aggregator::{aggregate, AggregateOptions, FrameworkLabel};
use crate::error::{AnalysisError, AnalysisResult};
use crate::frameworks::FrameworkRegistry;
use crate::prompt::{CallContext, PromptBudget, PromptBuilder};
use crate::request::AnalysisRequest;
use crate::resources::ResourceLoader;

pub const NO_TRANSCRIPT_REASON: &str =
    "No transcript available; analysis is based on call metadata only";
pub const NO_SCORES_REASON: &str = "Model returned no scores for this call";

/// Generation settings applied to every pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    pub budget: PromptBudget,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 4096,
            temperature: None,
            budget: PromptBudget::default(),
        }
    }
}

/// Outcome of fetching one call.
#[derive(Debug)]
enum FetchedCall {
    Ready(CallRecord),
    /// Fetch failed; carries whatever metadata could be recovered
    Degraded { details: CallDetails, reason: String },
}

impl FetchedCall {
    fn details(&self) -> &CallDetails {
        match self {
            FetchedCall::Ready(record) => &record.details,
            FetchedCall::Degraded { details, .. } => details,
        }
    }
}

pub struct CallAnalyzer {
    provider: Arc<dyn CallDataProvider>,
    generator: Arc<dyn GenerationClient>,
    resources: Arc<ResourceLoader>,
    registry: FrameworkRegistry,
    prompts: PromptBuilder,
    options: AnalysisOptions,
}

impl CallAnalyzer {
    pub fn new(
        provider: Arc<dyn CallDataProvider>,
        generator: Arc<dyn GenerationClient>,
        resources: Arc<ResourceLoader>,
        registry: FrameworkRegistry,
        options: AnalysisOptions,
    ) -> Self {
        Self {
            provider,
            generator,
            resources,
            registry,
            prompts: PromptBuilder::new(options.budget),
            options,
        }
    }

    pub fn registry(&self) -> &FrameworkRegistry {
        &self.registry
    }

    /// Analyze every requested call against every requested framework.
    ///
    /// Fails only when the request itself is invalid; per-pair failures
    /// become error or incomplete records.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<AggregateAnalysis> {
        request.validate(&self.registry)?;
        let frameworks: Vec<&FrameworkDefinition> = request
            .frameworks
            .iter()
            .filter_map(|id| self.registry.get(id))
            .collect();

        tracing::info!(
            calls = request.call_ids.len(),
            frameworks = frameworks.len(),
            generator = self.generator.name(),
            "starting call analysis batch"
        );

        let mut fetched = Vec::with_capacity(request.call_ids.len());
        for call_id in &request.call_ids {
            fetched.push(self.fetch_call(call_id).await);
        }
        let sequence = request
            .include_call_sequence
            .then(|| call_sequence(&fetched));

        let mut analyses = Vec::with_capacity(fetched.len() * frameworks.len());
        for (index, call) in fetched.iter().enumerate() {
            let position = sequence.as_ref().and_then(|s| s.get(index).copied());
            for framework in &frameworks {
                let result = match call {
                    FetchedCall::Ready(record) => {
                        let context = CallContext {
                            record,
                            sequence: position,
                            include_participant_roles: request.include_participant_roles,
                        };
                        self.analyze_pair(context, framework).await
                    }
                    FetchedCall::Degraded { details, reason } => {
                        Ok(CallAnalysis::failed(details, framework, reason.clone()))
                    }
                };
                analyses.push(into_record(result, call.details(), framework));
            }
        }

        let labels: Vec<FrameworkLabel> = frameworks
            .iter()
            .map(|f| (f.id.clone(), f.name.clone()))
            .collect();
        Ok(aggregate(
            analyses,
            &labels,
            AggregateOptions {
                include_score_trend: request.include_call_sequence,
            },
        ))
    }

    /// Fetch details and transcript concurrently, degrading to metadata only
    /// and then to the bare call id.
    async fn fetch_call(&self, call_id: &str) -> FetchedCall {
        let (details, transcript) = tokio::join!(
            self.provider.get_call_details(call_id),
            self.provider.get_call_transcript(call_id),
        );

        match (details, transcript) {
            (Ok(details), Ok(transcript)) => FetchedCall::Ready(self.merge(details, transcript)),
            (Ok(details), Err(e)) => {
                let err = AnalysisError::fetch(call_id, e);
                tracing::warn!(call_id, error = %err, "transcript fetch failed");
                FetchedCall::Degraded {
                    details,
                    reason: err.reason(),
                }
            }
            (Err(e), _) => {
                let err = AnalysisError::fetch(call_id, e);
                tracing::warn!(call_id, error = %err, "call fetch failed; retrying metadata only");
                let details = match self.provider.get_call_details(call_id).await {
                    Ok(details) => details,
                    Err(retry_err) => {
                        tracing::warn!(call_id, error = %retry_err, "metadata-only fetch failed");
                        CallDetails::unknown(call_id)
                    }
                };
                FetchedCall::Degraded {
                    details,
                    reason: err.reason(),
                }
            }
        }
    }

    fn merge(&self, details: CallDetails, transcript: CallTranscript) -> CallRecord {
        if !transcript.is_usable() {
            tracing::debug!(call_id = %details.call_id, "call has no usable transcript");
            return CallRecord {
                details,
                transcript: Vec::new(),
                transcript_summary: None,
            };
        }
        let summary = self
            .provider
            .generate_transcript_summary(&transcript.transcript);
        CallRecord {
            details,
            transcript: transcript.transcript,
            transcript_summary: Some(summary),
        }
    }

    async fn analyze_pair(
        &self,
        call: CallContext<'_>,
        framework: &FrameworkDefinition,
    ) -> AnalysisResult<CallAnalysis> {
        let details = &call.record.details;
        let resources = self.resources.load(&framework.id).await;
        let definition = resources
            .definition
            .as_ref()
            .filter(|d| !d.components.is_empty())
            .unwrap_or(framework);

        let prompt = self.prompts.build(definition, &resources, call);
        tracing::debug!(
            call_id = %details.call_id,
            framework_id = %framework.id,
            mode = %prompt.mode,
            prompt_chars = prompt.user_prompt.len(),
            "generating analysis"
        );

        let raw = self
            .generator
            .create_completion(CompletionRequest {
                model: self.options.model.clone(),
                max_tokens: self.options.max_tokens,
                system_prompt: prompt.system_prompt,
                user_prompt: prompt.user_prompt,
                temperature: self.options.temperature,
            })
            .await?;

        match recover(&raw) {
            RecoveryOutcome::Recovered(recovered) => {
                tracing::debug!(
                    call_id = %details.call_id,
                    framework_id = %framework.id,
                    tier = %recovered.tier,
                    "analysis recovered"
                );
                if !recovered.citations.compliant {
                    tracing::warn!(
                        call_id = %details.call_id,
                        framework_id = %framework.id,
                        violations = recovered.citations.violations.len(),
                        "analysis citations are not compliant"
                    );
                }

                let report = recovered.citations;
                let score = recovered.analysis.resolved_overall_score();
                let analysis = if !call.record.has_transcript() {
                    CallAnalysis::incomplete(
                        details,
                        framework,
                        Some(recovered.analysis),
                        NO_TRANSCRIPT_REASON,
                    )
                } else {
                    match score {
                        Some(score) => {
                            CallAnalysis::completed(details, framework, recovered.analysis, score)
                        }
                        None => CallAnalysis::incomplete(
                            details,
                            framework,
                            Some(recovered.analysis),
                            NO_SCORES_REASON,
                        ),
                    }
                };
                Ok(analysis.with_citation_report(report))
            }
            RecoveryOutcome::Fallback(fallback) => {
                tracing::warn!(
                    call_id = %details.call_id,
                    framework_id = %framework.id,
                    "model response unusable; recording minimal fallback analysis"
                );
                let reason = AnalysisError::RecoveryExhausted.reason();
                let mut analysis = CallAnalysis::failed(details, framework, reason);
                analysis.components = fallback.components;
                analysis.executive_summary = fallback.executive_summary;
                Ok(analysis)
            }
            RecoveryOutcome::Unrecoverable { raw } => {
                tracing::error!(
                    call_id = %details.call_id,
                    framework_id = %framework.id,
                    response_len = raw.len(),
                    "recovery pipeline returned raw text"
                );
                Err(AnalysisError::RecoveryExhausted)
            }
        }
    }
}

/// Fold a pair result into its record.
fn into_record(
    result: AnalysisResult<CallAnalysis>,
    details: &CallDetails,
    framework: &FrameworkDefinition,
) -> CallAnalysis {
    result.unwrap_or_else(|err| {
        tracing::warn!(
            call_id = %details.call_id,
            framework_id = %framework.id,
            error = %err,
            "call analysis failed"
        );
        CallAnalysis::failed(details, framework, err.reason())
    })
}

/// 1-based position of each call by date, with undated calls last in
/// request order.
fn call_sequence(fetched: &[FetchedCall]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..fetched.len()).collect();
    order.sort_by_key(|&i| {
        let date = fetched[i].details().date;
        (date.is_none(), date, i)
    });
    let mut positions = vec![(0, fetched.len()); fetched.len()];
    for (rank, index) in order.into_iter().enumerate() {
        positions[index] = (rank + 1, fetched.len());
    }
    positions
}
