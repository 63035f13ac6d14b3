//! Call Analyzer Engine
//!
//! Everything between a validated request and the aggregate report:
//!
//! - `frameworks` - Built-in framework registry
//! - `resources` - Cached per-framework resource artifacts
//! - `transcript` - Speaker normalization and citation-ready rendering
//! - `prompt` - Enhanced/basic prompt construction
//! - `request` - Request input and validation
//! - `orchestrator` - Per-pair fetch, generate, recover and record
//! - `aggregator` - Cross-call statistics, insights and recommendations

pub mod aggregator;
pub mod error;
pub mod frameworks;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod resources;
pub mod transcript;

pub use aggregator::{aggregate, empty_aggregate, AggregateOptions, FrameworkLabel};
pub use error::{AnalysisError, AnalysisResult};
pub use frameworks::FrameworkRegistry;
pub use orchestrator::{AnalysisOptions, CallAnalyzer, NO_SCORES_REASON, NO_TRANSCRIPT_REASON};
pub use prompt::{AnalysisPrompt, CallContext, PromptBudget, PromptBuilder, PromptMode};
pub use request::AnalysisRequest;
pub use resources::{
    FrameworkResources, FsResourceStore, ResourceArtifact, ResourceLoader, ResourceStore,
};
pub use transcript::{format_timestamp, normalize_speaker, render_transcript};
