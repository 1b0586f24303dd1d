//! Registry of settings groups keyed by name.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use thiserror::Error;

use super::Settings;

/// Errors that can occur while reading or writing settings documents.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A settings group that failed its correctness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidSettings {
    /// Name of the offending group.
    pub name: String,
    /// Reason reported by the group.
    pub reason: String,
}

/// Owns every registered settings group.
///
/// Groups are kept in name order, so validation and serialization visit
/// them deterministically.
#[derive(Default)]
pub struct SettingsRegistry {
    entries: BTreeMap<String, Box<dyn Settings>>,
}

impl SettingsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a group under its own name, replacing any previous group
    /// with the same name.
    pub fn register(&mut self, settings: Box<dyn Settings>) {
        let name = settings.name().to_string();
        if self.entries.insert(name.clone(), settings).is_some() {
            tracing::debug!(settings = %name, "replaced settings group");
        }
    }

    /// Returns the group registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Settings> {
        self.entries.get(name).map(|settings| settings.as_ref())
    }

    /// Returns the group registered under `name` if it has type `T`.
    pub fn get_as<T: Settings>(&self, name: &str) -> Option<&T> {
        self.get(name)
            .and_then(|settings| settings.as_any().downcast_ref::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Names of all registered groups, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every registered group.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Fills registered groups from a settings document.
    ///
    /// Every top-level key naming a registered group is merged into that
    /// group. Unknown keys are ignored and a document that is not an object
    /// changes nothing. A group whose sub-object fails to deserialize keeps
    /// its previous values.
    ///
    /// # Returns
    /// The number of groups that were updated.
    pub fn load_from_value(&mut self, config: &Value) -> usize {
        let Some(config) = config.as_object() else {
            tracing::warn!("settings document is not an object, ignoring it");
            return 0;
        };

        let mut applied = 0;
        for (name, sub_config) in config {
            let Some(settings) = self.entries.get_mut(name) else {
                tracing::debug!(settings = %name, "no registered group, skipping");
                continue;
            };
            match settings.merge_value(sub_config) {
                Ok(()) => applied += 1,
                Err(err) => {
                    tracing::warn!(settings = %name, error = %err, "failed to load settings group");
                }
            }
        }
        applied
    }

    /// Parses `text` as JSON and loads it with [`Self::load_from_value`].
    /// Malformed JSON changes nothing.
    pub fn load_from_str(&mut self, text: &str) -> usize {
        match serde_json::from_str::<Value>(text) {
            Ok(config) => self.load_from_value(&config),
            Err(err) => {
                tracing::warn!(error = %err, "malformed settings document, ignoring it");
                0
            }
        }
    }

    /// Serializes every group into one document keyed by group name.
    pub fn save_to_value(&self) -> Result<Value, SettingsError> {
        let mut config = Map::new();
        for (name, settings) in &self.entries {
            config.insert(name.clone(), settings.to_value()?);
        }
        Ok(Value::Object(config))
    }

    /// Serializes every group to a JSON string, indented when `pretty`.
    pub fn to_json_string(&self, pretty: bool) -> Result<String, SettingsError> {
        let config = self.save_to_value()?;
        let text = if pretty {
            serde_json::to_string_pretty(&config)?
        } else {
            serde_json::to_string(&config)?
        };
        Ok(text)
    }

    /// Checks every group and returns all that fail, in name order.
    pub fn validate_all(&self) -> Vec<InvalidSettings> {
        self.entries
            .iter()
            .filter_map(|(name, settings)| {
                settings.validate().err().map(|reason| InvalidSettings {
                    name: name.clone(),
                    reason,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::SettingsGroup;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Basis {
        seed: i32,
        octaves: u8,
    }

    impl Default for Basis {
        fn default() -> Self {
            Self { seed: 0, octaves: 6 }
        }
    }

    impl SettingsGroup for Basis {
        const NAME: &'static str = "basis";

        fn check(&self) -> Result<(), String> {
            if self.octaves == 0 {
                return Err("octaves must be at least 1".into());
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Cliff {
        enabled: bool,
        levels: u32,
    }

    impl SettingsGroup for Cliff {
        const NAME: &'static str = "cliff";

        fn check(&self) -> Result<(), String> {
            if self.levels == 0 {
                return Err("levels must be at least 1".into());
            }
            Ok(())
        }
    }

    fn registry() -> SettingsRegistry {
        let mut registry = SettingsRegistry::new();
        registry.register(Box::new(Basis::default()));
        registry.register(Box::new(Cliff { enabled: false, levels: 4 }));
        registry
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Box::new(Basis { seed: 7, octaves: 2 }));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get_as::<Basis>("basis").unwrap().seed, 7);
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut source = registry();
        source.load_from_value(&json!({
            "basis": { "seed": 5, "octaves": 3 },
            "cliff": { "enabled": true, "levels": 12 },
        }));
        let saved = source.save_to_value().unwrap();

        let mut target = registry();
        assert_eq!(target.load_from_value(&saved), 2);

        assert_eq!(target.get_as::<Basis>("basis"), Some(&Basis { seed: 5, octaves: 3 }));
        assert_eq!(target.get_as::<Cliff>("cliff"), Some(&Cliff { enabled: true, levels: 12 }));
    }

    #[test]
    fn test_compact_and_pretty_are_equivalent() {
        let registry = registry();
        let pretty: Value = serde_json::from_str(&registry.to_json_string(true).unwrap()).unwrap();
        let compact: Value = serde_json::from_str(&registry.to_json_string(false).unwrap()).unwrap();

        assert_eq!(pretty, compact);
        assert!(registry.to_json_string(true).unwrap().contains('\n'));
        assert!(!registry.to_json_string(false).unwrap().contains('\n'));
    }

    #[test]
    fn test_unknown_group_is_ignored() {
        let mut registry = registry();
        let applied = registry.load_from_value(&json!({
            "erosion": { "steps": 10 },
            "basis": { "seed": 11 },
        }));

        assert_eq!(applied, 1);
        assert_eq!(registry.get_as::<Basis>("basis").unwrap().seed, 11);
        assert_eq!(registry.get_as::<Cliff>("cliff").unwrap().levels, 4);
        assert!(!registry.contains("erosion"));
    }

    #[test]
    fn test_non_object_document_is_noop() {
        let mut registry = registry();
        assert_eq!(registry.load_from_value(&json!([1, 2, 3])), 0);
        assert_eq!(registry.load_from_str("{ not json"), 0);
        assert_eq!(registry.get_as::<Basis>("basis"), Some(&Basis::default()));
    }

    #[test]
    fn test_bad_group_keeps_previous_values() {
        let mut registry = registry();
        let applied = registry.load_from_str(r#"{ "basis": { "octaves": -4 }, "cliff": { "levels": 9 } }"#);

        assert_eq!(applied, 1);
        assert_eq!(registry.get_as::<Basis>("basis"), Some(&Basis::default()));
        assert_eq!(registry.get_as::<Cliff>("cliff").unwrap().levels, 9);
    }

    #[test]
    fn test_validate_all_reports_every_invalid_group() {
        let mut registry = registry();
        assert!(registry.validate_all().is_empty());

        registry.load_from_value(&json!({
            "basis": { "octaves": 0 },
            "cliff": { "levels": 0 },
        }));
        let invalid = registry.validate_all();

        let names: Vec<_> = invalid.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["basis", "cliff"]);
        assert!(invalid[0].reason.contains("octaves"));
    }

    #[test]
    fn test_each_name_saved_once() {
        let registry = registry();
        let saved = registry.save_to_value().unwrap();
        let object = saved.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert!(object.contains_key("basis"));
        assert!(object.contains_key("cliff"));
    }
}
