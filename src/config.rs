//! TOML Configuration
//!
//! Loads `AppConfig` from `<config_dir>/call-analyzer/config.toml` (or an
//! explicit path), applies environment overrides and validates the result.

use std::path::{Path, PathBuf};

use call_analyzer_core::{CoreError, CoreResult};
use call_analyzer_engine::{AnalysisOptions, PromptBudget};
use call_analyzer_llm::ProviderConfig;
use serde::{Deserialize, Serialize};
use url::Url;

pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const MODEL_ENV: &str = "CALL_ANALYZER_MODEL";

/// Generation provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    #[serde(flatten)]
    pub provider: ProviderConfig,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let defaults = AnalysisOptions::default();
        Self {
            provider: ProviderConfig::default(),
            model: defaults.model,
            max_tokens: defaults.max_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    /// Directory holding one `<framework_id>/` folder per framework
    pub root: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("resources"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallsConfig {
    /// Directory holding `<callId>.json` and `<callId>.transcript.json`
    pub data_dir: PathBuf,
}

impl Default for CallsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("calls"),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub resources: ResourcesConfig,
    pub calls: CallsConfig,
    pub analysis: PromptBudget,
}

/// Get the default config file path (<config_dir>/call-analyzer/config.toml)
pub fn default_config_path() -> CoreResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("call-analyzer").join("config.toml"))
        .ok_or_else(|| CoreError::config("Could not determine config directory"))
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, a missing default file
    /// yields the defaults.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let path = default_config_path()?;
                if path.exists() {
                    Self::load_from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "no config file; using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoreError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::config(format!("Invalid config: {}", e)))
    }

    /// Fill the API key when the file omits it and let the model be
    /// overridden from the environment.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.generation.provider.api_key.is_none() {
            self.generation.provider.api_key = lookup(API_KEY_ENV).filter(|k| !k.is_empty());
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|m| !m.trim().is_empty()) {
            self.generation.model = model;
        }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.generation.model.trim().is_empty() {
            return Err(CoreError::config("generation.model must not be empty"));
        }
        if self.generation.max_tokens == 0 {
            return Err(CoreError::config("generation.max_tokens must be greater than 0"));
        }
        if !(0.0..=1.0).contains(&self.generation.provider.temperature) {
            return Err(CoreError::config("generation.temperature must be between 0.0 and 1.0"));
        }
        if let Some(base_url) = &self.generation.provider.base_url {
            Url::parse(base_url).map_err(|e| {
                CoreError::config(format!("generation.base_url '{}' is invalid: {}", base_url, e))
            })?;
        }
        Ok(())
    }

    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            model: self.generation.model.clone(),
            max_tokens: self.generation.max_tokens,
            temperature: None,
            budget: self.analysis,
        }
    }
}
