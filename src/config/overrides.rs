use crate::utils::error::Result;
use crate::utils::validation::validate_key_value;
use serde_json::{Map, Value};

/// Caller-supplied replacements for top-level profile keys.
///
/// Merging is shallow: an override for `serial` replaces the profile's whole
/// `serial` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    values: Map<String, Value>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Parses `KEY=VALUE` pairs. Values are read as JSON and fall back to a
    /// plain string, so `wait_time=0.5` is a number and `seperator==` is `"="`.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self> {
        let mut overrides = Self::new();
        for pair in pairs {
            let (key, raw) = validate_key_value("--set", pair.as_ref())?;
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            overrides.insert(key, value);
        }
        Ok(overrides)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub(crate) fn apply_to(&self, target: &mut Map<String, Value>) {
        for (key, value) in &self.values {
            target.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_pairs_parses_json_values() {
        let overrides = Overrides::from_pairs(&[
            "wait_time=0.5",
            r#"serial={"port": "/dev/ttyUSB1"}"#,
            "left_surround=*",
            "seperator==",
        ])
        .unwrap();

        let values: Map<String, Value> = overrides.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        assert_eq!(values["wait_time"], json!(0.5));
        assert_eq!(values["serial"], json!({"port": "/dev/ttyUSB1"}));
        assert_eq!(values["left_surround"], json!("*"));
        assert_eq!(values["seperator"], json!("="));
    }

    #[test]
    fn test_from_pairs_rejects_missing_equals() {
        assert!(Overrides::from_pairs(&["wait_time"]).is_err());
    }

    #[test]
    fn test_apply_is_shallow() {
        let mut target = json!({"serial": {"port": "A", "baudrate": 9600}, "wait_time": 1})
            .as_object()
            .cloned()
            .unwrap();
        Overrides::new()
            .with("serial", json!({"port": "B"}))
            .apply_to(&mut target);

        assert_eq!(target["serial"], json!({"port": "B"}));
        assert_eq!(target["wait_time"], json!(1));
    }
}
