//! Framework Definitions
//!
//! A framework is a named sales methodology whose components and
//! sub-components form the scoring rubric for a call.

use serde::{Deserialize, Serialize};

/// Description of what a score range means for a sub-component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringBand {
    /// Inclusive score range, e.g. "8-10"
    pub range: String,
    pub description: String,
}

/// Leaf rubric category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubComponent {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub scoring_bands: Vec<ScoringBand>,
}

/// Top-level rubric category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub sub_components: Vec<SubComponent>,
}

/// A complete scoring methodology.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub components: Vec<Component>,
}

impl FrameworkDefinition {
    /// Total number of sub-components across all components.
    pub fn sub_component_count(&self) -> usize {
        self.components.iter().map(|c| c.sub_components.len()).sum()
    }
}
