//! Call Analyzer command-line entry point.
//!
//! Logs go to stderr so the JSON report on stdout stays machine-readable.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use call_analyzer::{build_analyzer, AppConfig};
use call_analyzer_engine::{AnalysisRequest, FrameworkRegistry};
use call_analyzer_llm::AnthropicProvider;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "call-analyzer",
    version,
    about = "Score sales calls against sales-methodology frameworks"
)]
struct Cli {
    /// Config file (defaults to <config_dir>/call-analyzer/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze calls and print the aggregate report as JSON
    Analyze {
        /// Call id (repeatable)
        #[arg(long = "call", required = true)]
        calls: Vec<String>,
        /// Framework id (repeatable)
        #[arg(long = "framework", required = true)]
        frameworks: Vec<String>,
        /// Include participant titles and affiliations in prompts
        #[arg(long)]
        participant_roles: bool,
        /// Give each call its position in the deal and report a score trend
        #[arg(long)]
        call_sequence: bool,
    },
    /// List built-in frameworks
    Frameworks,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Frameworks => {
            let registry =
                FrameworkRegistry::builtin().context("failed to load built-in frameworks")?;
            for framework in registry.iter() {
                println!("{}\t{}", framework.id, framework.name);
            }
        }
        Command::Analyze {
            calls,
            frameworks,
            participant_roles,
            call_sequence,
        } => {
            let config =
                AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
            let generator = AnthropicProvider::new(config.generation.provider.clone())
                .context("failed to create generation provider")?;
            let analyzer =
                build_analyzer(&config, Arc::new(generator)).context("failed to build analyzer")?;

            let mut request = AnalysisRequest::new(calls, frameworks);
            request.include_participant_roles = participant_roles;
            request.include_call_sequence = call_sequence;

            let report = analyzer.analyze(&request).await.context("analysis request rejected")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        }
    }
    Ok(())
}
