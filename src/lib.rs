//! Call Analyzer
//!
//! Scores recorded sales calls against sales-methodology frameworks and
//! aggregates the results. This crate wires the workspace together:
//! - `config` - TOML configuration with environment overrides
//! - `store` - File-backed `CallDataProvider`
//!
//! The analysis itself lives in `call-analyzer-engine`.

pub mod config;
pub mod store;

use std::sync::Arc;

use call_analyzer_core::CoreResult;
use call_analyzer_engine::{CallAnalyzer, FrameworkRegistry, FsResourceStore, ResourceLoader};
use call_analyzer_llm::GenerationClient;

pub use config::{default_config_path, AppConfig};
pub use store::JsonCallStore;

/// Build an analyzer over the configured call directory and resource root.
pub fn build_analyzer(
    config: &AppConfig,
    generator: Arc<dyn GenerationClient>,
) -> CoreResult<CallAnalyzer> {
    let registry = FrameworkRegistry::builtin()?;
    let provider = Arc::new(JsonCallStore::new(&config.calls.data_dir));
    let resources = Arc::new(ResourceLoader::new(Arc::new(FsResourceStore::new(
        &config.resources.root,
    ))));
    tracing::debug!(
        calls = %config.calls.data_dir.display(),
        resources = %config.resources.root.display(),
        "analyzer configured"
    );
    Ok(CallAnalyzer::new(
        provider,
        generator,
        resources,
        registry,
        config.analysis_options(),
    ))
}
