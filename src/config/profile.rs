use crate::config::overrides::Overrides;
use crate::domain::model::{CommandSpec, CommandTable};
use crate::utils::error::{ProjectorError, Result};
use crate::utils::validation::Validate;
use serde_json::{Map, Value};
use std::time::Duration;

pub const SERIAL_KEY: &str = "serial";
pub const COMMAND_LIST_KEY: &str = "command_list";
pub const LEFT_SURROUND_KEY: &str = "left_surround";
// Spelling matches existing catalogs.
pub const SEPARATOR_KEY: &str = "seperator";
pub const RIGHT_SURROUND_KEY: &str = "right_surround";
pub const WAIT_TIME_KEY: &str = "wait_time";

/// A device profile as loaded from the catalog, plus any merged overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceProfile {
    device_id: String,
    values: Map<String, Value>,
}

impl DeviceProfile {
    pub fn new(device_id: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            device_id: device_id.into(),
            values,
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if !overrides.is_empty() {
            tracing::debug!(
                "Applying overrides to {}: {:?}",
                self.device_id,
                overrides.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>()
            );
        }
        overrides.apply_to(&mut self.values);
    }

    /// The `serial` block. Only meaningful after [`Validate::validate`] passed.
    pub fn serial_block(&self) -> Result<&Map<String, Value>> {
        self.required_object(SERIAL_KEY)
    }

    pub fn command_table(&self) -> Result<CommandTable> {
        let commands = self.required_object(COMMAND_LIST_KEY)?;
        commands
            .iter()
            .map(|(alias, entry)| -> Result<(String, CommandSpec)> {
                let spec: CommandSpec =
                    serde_json::from_value(entry.clone()).map_err(|e| ProjectorError::InvalidConfig {
                        device_id: self.device_id.clone(),
                        section: COMMAND_LIST_KEY.to_string(),
                        message: format!("entry \"{}\" is malformed: {}", alias, e),
                    })?;
                Ok((alias.clone(), spec))
            })
            .collect()
    }

    /// A templating field as text. Unset and `null` read as "".
    pub fn text_field(&self, key: &str) -> String {
        match self.values.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// `wait_time` in seconds, as a number or a numeric string.
    pub fn wait_time(&self) -> Result<Duration> {
        let invalid = |value: &Value| ProjectorError::InvalidValue {
            field: WAIT_TIME_KEY.to_string(),
            value: value.to_string(),
            reason: "Expected a non-negative number of seconds".to_string(),
        };

        let value = match self.values.get(WAIT_TIME_KEY) {
            None | Some(Value::Null) => {
                return Err(ProjectorError::MissingWaitTime {
                    device_id: self.device_id.clone(),
                })
            }
            Some(value) => value,
        };

        let seconds = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .ok_or_else(|| invalid(value))?;

        Duration::try_from_secs_f64(seconds).map_err(|_| invalid(value))
    }

    fn required_object(&self, key: &str) -> Result<&Map<String, Value>> {
        let missing = |message: &str| ProjectorError::InvalidConfig {
            device_id: self.device_id.clone(),
            section: key.to_string(),
            message: message.to_string(),
        };

        match self.values.get(key) {
            Some(Value::Object(map)) if !map.is_empty() => Ok(map),
            Some(Value::Object(_)) => Err(missing("section is empty")),
            Some(_) => Err(missing("section must be an object")),
            None => Err(missing("section is missing")),
        }
    }
}

impl Validate for DeviceProfile {
    fn validate(&self) -> Result<()> {
        self.serial_block()?;
        self.command_table()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(value: Value) -> DeviceProfile {
        DeviceProfile::new("benq", value.as_object().cloned().unwrap())
    }

    #[test]
    fn test_validate_requires_serial_and_commands() {
        let ok = profile(json!({
            "serial": {"baudrate": 115200},
            "command_list": {"power": {"command": "pow", "actions": {"on": "on"}}}
        }));
        assert!(ok.validate().is_ok());

        let no_serial = profile(json!({
            "command_list": {"power": {"command": "pow"}}
        }));
        match no_serial.validate() {
            Err(ProjectorError::InvalidConfig { section, .. }) => assert_eq!(section, "serial"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }

        let no_commands = profile(json!({
            "serial": {"baudrate": 115200},
            "command_list": {}
        }));
        match no_commands.validate() {
            Err(ProjectorError::InvalidConfig { section, .. }) => assert_eq!(section, "command_list"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_command_entry() {
        let bad = profile(json!({
            "serial": {"baudrate": 115200},
            "command_list": {"power": "pow"}
        }));
        let err = bad.command_table().unwrap_err();
        assert!(err.to_string().contains("power"));
    }

    #[test]
    fn test_wait_time_forms() {
        assert_eq!(
            profile(json!({"wait_time": 1})).wait_time().unwrap(),
            Duration::from_secs(1)
        );
        assert_eq!(
            profile(json!({"wait_time": "0.25"})).wait_time().unwrap(),
            Duration::from_millis(250)
        );
        assert!(matches!(
            profile(json!({})).wait_time(),
            Err(ProjectorError::MissingWaitTime { .. })
        ));
        assert!(matches!(
            profile(json!({"wait_time": -1})).wait_time(),
            Err(ProjectorError::InvalidValue { .. })
        ));
        assert!(matches!(
            profile(json!({"wait_time": "soon"})).wait_time(),
            Err(ProjectorError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_text_field_defaults_to_empty() {
        let p = profile(json!({"left_surround": "\r*", "seperator": null}));
        assert_eq!(p.text_field(LEFT_SURROUND_KEY), "\r*");
        assert_eq!(p.text_field(SEPARATOR_KEY), "");
        assert_eq!(p.text_field(RIGHT_SURROUND_KEY), "");
    }
}
