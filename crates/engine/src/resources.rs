//! Framework Resource Loader
//!
//! Loads per-framework methodology artifacts from a content store and caches
//! them for the lifetime of the loader. Each artifact loads independently: a
//! missing or unreadable artifact leaves its field absent and records a
//! warning.
//!
//! The cache is owned by the `ResourceLoader` instance and uses
//! `mini_moka::sync::Cache`; entries never expire on their own, only through
//! [`ResourceLoader::clear`].

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use call_analyzer_core::{CoreError, CoreResult, FrameworkDefinition};
use mini_moka::sync::{Cache, ConcurrentCacheExt};
use serde::Serialize;

/// Maximum number of frameworks held in the cache.
const MAX_CACHED_FRAMEWORKS: u64 = 64;

/// One supplementary artifact stored for a framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceArtifact {
    Methodology,
    Definition,
    ScoringExamples,
    CallExamples,
    Checklist,
}

impl ResourceArtifact {
    pub const ALL: [ResourceArtifact; 5] = [
        ResourceArtifact::Methodology,
        ResourceArtifact::Definition,
        ResourceArtifact::ScoringExamples,
        ResourceArtifact::CallExamples,
        ResourceArtifact::Checklist,
    ];

    /// File name of the artifact inside the framework's folder.
    pub fn file_name(&self) -> &'static str {
        match self {
            ResourceArtifact::Methodology => "methodology.md",
            ResourceArtifact::Definition => "definition.json",
            ResourceArtifact::ScoringExamples => "scoring_examples.md",
            ResourceArtifact::CallExamples => "call_examples.md",
            ResourceArtifact::Checklist => "checklist.md",
        }
    }
}

/// Supplementary methodology content for one framework. Any field may be
/// absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkResources {
    pub framework_id: String,
    pub methodology: Option<String>,
    pub definition: Option<FrameworkDefinition>,
    pub scoring_examples: Option<String>,
    pub call_examples: Option<String>,
    pub checklist: Option<String>,
    pub warnings: Vec<String>,
}

impl FrameworkResources {
    /// Whether any artifact loaded, which selects the enhanced prompt mode.
    pub fn has_content(&self) -> bool {
        self.methodology.is_some()
            || self.definition.is_some()
            || self.scoring_examples.is_some()
            || self.call_examples.is_some()
            || self.checklist.is_some()
    }
}

/// Storage backend for framework artifacts.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read one artifact. A missing artifact is `CoreError::NotFound`.
    async fn read(&self, framework_id: &str, artifact: ResourceArtifact) -> CoreResult<String>;
}

/// Artifacts stored as `<root>/<framework_id>/<file_name>`.
#[derive(Debug, Clone)]
pub struct FsResourceStore {
    root: PathBuf,
}

impl FsResourceStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ResourceStore for FsResourceStore {
    async fn read(&self, framework_id: &str, artifact: ResourceArtifact) -> CoreResult<String> {
        let path = self.root.join(framework_id).join(artifact.file_name());
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(CoreError::not_found(path.display().to_string()))
            }
            Err(e) => Err(CoreError::Io(e)),
        }
    }
}

/// Caching loader over a [`ResourceStore`].
pub struct ResourceLoader {
    store: Arc<dyn ResourceStore>,
    cache: Cache<String, Arc<FrameworkResources>>,
}

impl ResourceLoader {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self {
            store,
            cache: Cache::builder().max_capacity(MAX_CACHED_FRAMEWORKS).build(),
        }
    }

    /// Resources for a framework, from cache when present.
    pub async fn load(&self, framework_id: &str) -> Arc<FrameworkResources> {
        if let Some(cached) = self.cache.get(&framework_id.to_string()) {
            tracing::debug!(framework_id, "framework resources cache hit");
            return cached;
        }

        let resources = Arc::new(self.load_uncached(framework_id).await);
        self.cache
            .insert(framework_id.to_string(), Arc::clone(&resources));
        resources
    }

    /// Drop every cached entry.
    pub fn clear(&self) {
        self.cache.invalidate_all();
        self.cache.sync();
    }

    pub fn cached_count(&self) -> u64 {
        self.cache.sync();
        self.cache.entry_count()
    }

    async fn load_uncached(&self, framework_id: &str) -> FrameworkResources {
        let (methodology, definition, scoring_examples, call_examples, checklist) = tokio::join!(
            self.store.read(framework_id, ResourceArtifact::Methodology),
            self.store.read(framework_id, ResourceArtifact::Definition),
            self.store.read(framework_id, ResourceArtifact::ScoringExamples),
            self.store.read(framework_id, ResourceArtifact::CallExamples),
            self.store.read(framework_id, ResourceArtifact::Checklist),
        );

        let mut resources = FrameworkResources {
            framework_id: framework_id.to_string(),
            ..Default::default()
        };
        resources.methodology =
            resources.accept(ResourceArtifact::Methodology, methodology);
        resources.scoring_examples =
            resources.accept(ResourceArtifact::ScoringExamples, scoring_examples);
        resources.call_examples =
            resources.accept(ResourceArtifact::CallExamples, call_examples);
        resources.checklist = resources.accept(ResourceArtifact::Checklist, checklist);

        if let Some(raw) = resources.accept(ResourceArtifact::Definition, definition) {
            match serde_json::from_str::<FrameworkDefinition>(&raw) {
                Ok(parsed) => resources.definition = Some(parsed),
                Err(e) => resources.warn(ResourceArtifact::Definition, &e.to_string()),
            }
        }

        tracing::debug!(
            framework_id,
            has_content = resources.has_content(),
            warnings = resources.warnings.len(),
            "framework resources loaded"
        );
        resources
    }
}

impl FrameworkResources {
    fn accept(&mut self, artifact: ResourceArtifact, result: CoreResult<String>) -> Option<String> {
        match result {
            Ok(content) if !content.trim().is_empty() => Some(content),
            Ok(_) => {
                self.warn(artifact, "artifact is empty");
                None
            }
            Err(e) => {
                self.warn(artifact, &e.to_string());
                None
            }
        }
    }

    fn warn(&mut self, artifact: ResourceArtifact, message: &str) {
        tracing::warn!(
            framework_id = %self.framework_id,
            artifact = artifact.file_name(),
            error = message,
            "framework resource unavailable"
        );
        self.warnings
            .push(format!("{}: {}", artifact.file_name(), message));
    }
}
