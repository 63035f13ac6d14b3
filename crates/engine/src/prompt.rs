//! Analysis Prompt Construction
//!
//! Builds the system and user prompts for one (call, framework) pair. Two
//! modes:
//! - **Enhanced**: framework resources loaded; embeds truncated methodology,
//!   scoring examples, call examples and checklist plus the full framework
//!   definition as JSON
//! - **Basic**: no resources; embeds the component and sub-component
//!   descriptions only
//!
//! Both modes append call metadata, the rendered transcript (or a
//! metadata-only instruction) and the output contract.

use call_analyzer_core::{CallRecord, FrameworkDefinition, UNKNOWN_SPEAKER};
use serde::{Deserialize, Serialize};

use crate::resources::FrameworkResources;
use crate::transcript::render_transcript;

/// Character budgets for embedded resource text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptBudget {
    pub methodology_chars: usize,
    pub scoring_examples_chars: usize,
    pub call_examples_chars: usize,
    pub checklist_chars: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            methodology_chars: 4000,
            scoring_examples_chars: 2000,
            call_examples_chars: 1500,
            checklist_chars: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    Enhanced,
    Basic,
}

impl std::fmt::Display for PromptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PromptMode::Enhanced => write!(f, "enhanced"),
            PromptMode::Basic => write!(f, "basic"),
        }
    }
}

/// Per-call inputs to prompt construction.
#[derive(Debug, Clone, Copy)]
pub struct CallContext<'a> {
    pub record: &'a CallRecord,
    /// 1-based position and total, ordered by call date
    pub sequence: Option<(usize, usize)>,
    pub include_participant_roles: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub mode: PromptMode,
    pub system_prompt: String,
    pub user_prompt: String,
}

/// Text used in place of quotes when a call has no transcript.
pub const NO_TRANSCRIPT_QUOTE: &str = "No transcript available";

#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    budget: PromptBudget,
}

impl PromptBuilder {
    pub fn new(budget: PromptBudget) -> Self {
        Self { budget }
    }

    pub fn build(
        &self,
        framework: &FrameworkDefinition,
        resources: &FrameworkResources,
        call: CallContext<'_>,
    ) -> AnalysisPrompt {
        let mode = if resources.has_content() {
            PromptMode::Enhanced
        } else {
            PromptMode::Basic
        };

        let mut user = String::new();
        match mode {
            PromptMode::Enhanced => self.push_enhanced_framework(&mut user, framework, resources),
            PromptMode::Basic => push_basic_framework(&mut user, framework),
        }
        push_call_metadata(&mut user, call);
        push_transcript(&mut user, call.record);
        push_output_contract(&mut user, framework);

        AnalysisPrompt {
            mode,
            system_prompt: system_prompt(framework),
            user_prompt: user,
        }
    }

    fn push_enhanced_framework(
        &self,
        out: &mut String,
        framework: &FrameworkDefinition,
        resources: &FrameworkResources,
    ) {
        out.push_str(&format!("# Framework: {}\n\n", framework.name));
        if !framework.description.is_empty() {
            out.push_str(&format!("{}\n\n", framework.description));
        }

        let sections = [
            ("Methodology", &resources.methodology, self.budget.methodology_chars),
            ("Scoring Examples", &resources.scoring_examples, self.budget.scoring_examples_chars),
            ("Call Examples", &resources.call_examples, self.budget.call_examples_chars),
            ("Checklist", &resources.checklist, self.budget.checklist_chars),
        ];
        for (title, content, budget) in sections {
            if let Some(content) = content {
                let body = truncate_chars(content.trim(), budget);
                out.push_str(&format!("## {}\n\n{}\n\n", title, body));
            }
        }

        let definition = serde_json::to_string_pretty(framework).unwrap_or_default();
        out.push_str(&format!("## Framework Definition\n\n```json\n{}\n```\n\n", definition));
    }
}

fn system_prompt(framework: &FrameworkDefinition) -> String {
    format!(
        "You are an expert sales coach who evaluates recorded sales calls against the {} \
         methodology. Score only what the call supports, cite the transcript for every judgement, \
         and respond with a single JSON object and no other text.",
        framework.name
    )
}

fn push_basic_framework(out: &mut String, framework: &FrameworkDefinition) {
    out.push_str(&format!("# Framework: {}\n\n", framework.name));
    if !framework.description.is_empty() {
        out.push_str(&format!("{}\n\n", framework.description));
    }
    for component in &framework.components {
        out.push_str(&format!("## {}\n", component.name));
        if !component.description.is_empty() {
            out.push_str(&format!("{}\n", component.description));
        }
        for sub in &component.sub_components {
            out.push_str(&format!("- **{}**: {}\n", sub.name, sub.description));
        }
        out.push('\n');
    }
}

fn push_call_metadata(out: &mut String, call: CallContext<'_>) {
    let details = &call.record.details;
    out.push_str("# Call\n\n");
    out.push_str(&format!("- Title: {}\n", details.title));
    out.push_str(&format!("- Call ID: {}\n", details.call_id));
    if let Some(date) = details.date {
        out.push_str(&format!("- Date: {}\n", date.format("%Y-%m-%d")));
    }
    if details.duration > 0 {
        out.push_str(&format!("- Duration: {} minutes\n", details.duration.div_ceil(60)));
    }
    if let Some((position, total)) = call.sequence {
        out.push_str(&format!(
            "- Sequence: call {} of {} in this deal, ordered by date\n",
            position, total
        ));
    }

    if !details.participants.is_empty() {
        out.push_str("- Participants:\n");
        for participant in &details.participants {
            if call.include_participant_roles {
                let title = participant.title.as_deref().unwrap_or("title unknown");
                out.push_str(&format!(
                    "  - {} ({}, {})\n",
                    participant.name, title, participant.affiliation
                ));
            } else {
                out.push_str(&format!("  - {}\n", participant.name));
            }
        }
    }

    if let Some(summary) = &call.record.transcript_summary {
        out.push_str(&format!("- Speakers: {}\n", summary.total_speakers));
        if !summary.key_topics.is_empty() {
            out.push_str(&format!("- Key topics: {}\n", summary.key_topics.join(", ")));
        }
    }
    out.push('\n');
}

fn push_transcript(out: &mut String, record: &CallRecord) {
    out.push_str("# Transcript\n\n");
    if record.has_transcript() {
        out.push_str(&render_transcript(&record.transcript));
        out.push_str("\n\n");
    } else {
        out.push_str(&format!(
            "No transcript is available for this call. \
             Base the analysis on the call metadata only. Do not invent quotes: where evidence is required, use a citation with speaker \"{}\" \
             and quote \"{}\", and use null for any score the metadata cannot support.\n\n",
            UNKNOWN_SPEAKER, NO_TRANSCRIPT_QUOTE
        ));
    }
}

fn push_output_contract(out: &mut String, framework: &FrameworkDefinition) {
    let components: Vec<serde_json::Value> = framework
        .components
        .iter()
        .map(|component| {
            let subs: Vec<serde_json::Value> = component
                .sub_components
                .iter()
                .map(|sub| {
                    serde_json::json!({
                        "name": sub.name,
                        "score": "<1-10 or null>",
                        "evidence": [{
                            "speaker": "<first name or Unknown Speaker>",
                            "timestamp": "<m:ss>",
                            "quote": "<exact words from the transcript>",
                            "context": "<why this matters>"
                        }],
                        "qualitativeAssessment": "<assessment>",
                        "improvementSuggestions": ["<suggestion>"]
                    })
                })
                .collect();
            serde_json::json!({
                "name": component.name,
                "overallScore": "<1-10 or null>",
                "subComponents": subs,
                "keyFindings": ["<finding>"]
            })
        })
        .collect();

    let skeleton = serde_json::json!({
        "overallScore": "<1-10 or null>",
        "components": components,
        "executiveSummary": {
            "strengths": ["<strength>"],
            "weaknesses": ["<weakness>"],
            "recommendations": ["<recommendation>"]
        },
        "followUpCallPlanning": {
            "nextCallObjectives": ["<objective>"],
            "keyQuestions": ["<question>"],
            "stakeholdersToEngage": ["<stakeholder>"],
            "anticipatedObjections": [{
                "objection": "<objection>",
                "suggestedResponse": "<response>",
                "evidence": []
            }],
            "supportingEvidence": []
        }
    });

    out.push_str("# Output Requirements\n\n");
    out.push_str("Respond with one JSON object in exactly this shape:\n\n```json\n");
    out.push_str(&serde_json::to_string_pretty(&skeleton).unwrap_or_default());
    out.push_str("\n```\n\n");
    out.push_str(&format!(
        "Rules:\n\
         - Scores are numbers from 1 to 10, or null when the call gives no basis for a score. \
         Never use 0.\n\
         - Every evidence item is a citation object with \"speaker\" and \"quote\"; \
         \"timestamp\" uses m:ss (or m:ss - m:ss for a span) taken from the transcript line.\n\
         - Use the speaker's first name as shown in the transcript. \
         If it is not clear, use \"{}\". Never write labels such as \"Speaker 1\".\n\
         - Quote the transcript verbatim; do not paraphrase inside \"quote\".\n",
        UNKNOWN_SPEAKER
    ));
}

/// First `max` characters of `text`, marking the cut.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}\n[...truncated]", &text[..cut]),
        None => text.to_string(),
    }
}
