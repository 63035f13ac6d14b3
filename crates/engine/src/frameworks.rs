//! Framework Registry
//!
//! Built-in scoring frameworks, embedded at compile time. Request framework
//! ids are resolved against this registry.

use std::collections::BTreeMap;

use call_analyzer_core::{CoreError, CoreResult, FrameworkDefinition};

const BUILTIN_DEFINITIONS: [(&str, &str); 4] = [
    (
        "command_of_the_message",
        include_str!("../frameworks/command_of_the_message.json"),
    ),
    ("great_demo", include_str!("../frameworks/great_demo.json")),
    ("value_selling", include_str!("../frameworks/value_selling.json")),
    ("sandler", include_str!("../frameworks/sandler.json")),
];

/// Known frameworks, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct FrameworkRegistry {
    frameworks: BTreeMap<String, FrameworkDefinition>,
}

impl FrameworkRegistry {
    /// Registry holding the built-in frameworks.
    pub fn builtin() -> CoreResult<Self> {
        let mut registry = Self::default();
        for (id, raw) in BUILTIN_DEFINITIONS {
            let definition: FrameworkDefinition = serde_json::from_str(raw)
                .map_err(|e| CoreError::parse(format!("built-in framework '{}': {}", id, e)))?;
            if definition.id != id {
                return Err(CoreError::internal(format!(
                    "built-in framework '{}' declares id '{}'",
                    id, definition.id
                )));
            }
            registry.register(definition);
        }
        Ok(registry)
    }

    /// Add or replace a framework.
    pub fn register(&mut self, definition: FrameworkDefinition) {
        self.frameworks.insert(definition.id.clone(), definition);
    }

    pub fn get(&self, id: &str) -> Option<&FrameworkDefinition> {
        self.frameworks.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.frameworks.contains_key(id)
    }

    /// Framework ids in sorted order.
    pub fn ids(&self) -> Vec<&str> {
        self.frameworks.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FrameworkDefinition> {
        self.frameworks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_frameworks_load() {
        let registry = FrameworkRegistry::builtin().unwrap();
        assert_eq!(
            registry.ids(),
            vec!["command_of_the_message", "great_demo", "sandler", "value_selling"]
        );
        assert_eq!(registry.get("great_demo").unwrap().name, "Great Demo");
        assert_eq!(
            registry.get("command_of_the_message").unwrap().name,
            "Command of the Message"
        );
        assert_eq!(registry.get("value_selling").unwrap().name, "Value Selling");
        assert_eq!(registry.get("sandler").unwrap().name, "Sandler Selling System");
    }

    #[test]
    fn test_every_sub_component_has_scoring_bands() {
        let registry = FrameworkRegistry::builtin().unwrap();
        for framework in registry.iter() {
            assert!(framework.sub_component_count() > 0, "{}", framework.id);
            for component in &framework.components {
                for sub in &component.sub_components {
                    assert!(!sub.scoring_bands.is_empty(), "{} / {}", framework.id, sub.name);
                }
            }
        }
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = FrameworkRegistry::builtin().unwrap();
        let mut custom = registry.get("sandler").unwrap().clone();
        custom.name = "Sandler (custom)".to_string();
        registry.register(custom);
        assert_eq!(registry.get("sandler").unwrap().name, "Sandler (custom)");
        assert!(!registry.contains("spin"));
    }
}
