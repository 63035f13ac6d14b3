//! Analysis request input and its validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};
use crate::frameworks::FrameworkRegistry;

/// Entry-point input: which calls to analyze against which frameworks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub call_ids: Vec<String>,
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub include_participant_roles: bool,
    #[serde(default)]
    pub include_call_sequence: bool,
}

impl AnalysisRequest {
    pub fn new(call_ids: Vec<String>, frameworks: Vec<String>) -> Self {
        Self {
            call_ids,
            frameworks,
            ..Default::default()
        }
    }

    /// Reject the request before any fetch or generation work.
    pub fn validate(&self, registry: &FrameworkRegistry) -> AnalysisResult<()> {
        validate_ids("callIds", &self.call_ids)?;
        validate_ids("frameworks", &self.frameworks)?;
        match self.frameworks.iter().find(|id| !registry.contains(id)) {
            Some(unknown) => Err(AnalysisError::UnknownFramework(unknown.clone())),
            None => Ok(()),
        }
    }
}

fn validate_ids(field: &str, ids: &[String]) -> AnalysisResult<()> {
    if ids.is_empty() {
        return Err(AnalysisError::validation(format!("{} must not be empty", field)));
    }
    let mut seen = HashSet::new();
    for (i, id) in ids.iter().enumerate() {
        if id.trim().is_empty() {
            return Err(AnalysisError::validation(format!(
                "{}[{}] must be a non-empty string",
                field, i
            )));
        }
        if !seen.insert(id.as_str()) {
            return Err(AnalysisError::validation(format!(
                "{} contains '{}' more than once",
                field, id
            )));
        }
    }
    Ok(())
}
