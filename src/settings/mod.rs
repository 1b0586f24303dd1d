//! Named, serializable settings groups and the registry that owns them.
//!
//! Every configuration domain (one per module family) is a settings group
//! stored under a stable name. Groups are serialized to and from JSON
//! sub-objects of a single settings document.

mod registry;

pub use registry::{InvalidSettings, SettingsError, SettingsRegistry};

use std::any::Any;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Object-safe capability set shared by every settings entry.
///
/// Most groups never implement this directly: deriving serde's traits and
/// implementing [`SettingsGroup`] is enough.
pub trait Settings: Any {
    /// Stable name of the group inside the settings document.
    fn name(&self) -> &str;

    /// Serializes the whole group.
    fn to_value(&self) -> Result<Value, serde_json::Error>;

    /// Overlays `config` onto the current values.
    ///
    /// Fields present in `config` overwrite, absent fields keep their
    /// current value. On error the group is left unchanged.
    fn merge_value(&mut self, config: &Value) -> Result<(), serde_json::Error>;

    /// Checks the group for correctness, returning the reason on failure.
    fn validate(&self) -> Result<(), String>;

    /// Gives access to the concrete group for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Typed settings group stored as a JSON object.
pub trait SettingsGroup: Serialize + DeserializeOwned + 'static {
    /// Name of the group inside the settings document.
    const NAME: &'static str;

    /// Correctness predicate for the group's values.
    fn check(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<T: SettingsGroup> Settings for T {
    fn name(&self) -> &str {
        T::NAME
    }

    fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    fn merge_value(&mut self, config: &Value) -> Result<(), serde_json::Error> {
        let mut current = serde_json::to_value(&*self)?;
        merge_json(&mut current, config);
        *self = serde_json::from_value(current)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), String> {
        self.check()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Recursively overlays `patch` onto `base`. Objects merge key by key,
/// everything else is replaced.
fn merge_json(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base), Value::Object(patch)) => {
            for (key, value) in patch {
                match base.get_mut(key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, patch) => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        seed: i32,
        scale: f32,
        label: String,
    }

    impl Default for Sample {
        fn default() -> Self {
            Self { seed: 1, scale: 0.5, label: "sample".into() }
        }
    }

    impl SettingsGroup for Sample {
        const NAME: &'static str = "sample";

        fn check(&self) -> Result<(), String> {
            if self.scale <= 0.0 {
                return Err(format!("scale must be positive, got {}", self.scale));
            }
            Ok(())
        }
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut sample = Sample::default();
        sample.merge_value(&json!({ "seed": 9 })).unwrap();

        assert_eq!(sample.seed, 9);
        assert_eq!(sample.scale, 0.5);
        assert_eq!(sample.label, "sample");
    }

    #[test]
    fn test_merge_error_leaves_group_unchanged() {
        let mut sample = Sample::default();
        let result = sample.merge_value(&json!({ "seed": "not a number" }));

        assert!(result.is_err());
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_validate_uses_check() {
        let mut sample = Sample::default();
        assert!(Settings::validate(&sample).is_ok());

        sample.scale = -1.0;
        let reason = Settings::validate(&sample).unwrap_err();
        assert!(reason.contains("scale"));
    }

    #[test]
    fn test_downcast() {
        let boxed: Box<dyn Settings> = Box::new(Sample::default());
        assert_eq!(boxed.name(), "sample");
        assert!(boxed.as_any().downcast_ref::<Sample>().is_some());
        assert!(boxed.as_any().downcast_ref::<String>().is_none());
    }

    #[test]
    fn test_merge_json_nested() {
        let mut base = json!({ "a": { "x": 1, "y": 2 }, "b": 3 });
        merge_json(&mut base, &json!({ "a": { "y": 5 }, "c": 4 }));
        assert_eq!(base, json!({ "a": { "x": 1, "y": 5 }, "b": 3, "c": 4 }));
    }
}
