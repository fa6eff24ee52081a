//! Translation of a profile's `serial` block into [`SerialSettings`].
//!
//! Keys are restricted to a fixed allow-list. Byte size, parity and stop bits
//! go through lookup tables; everything else passes through after a type check.

use crate::config::profile::DeviceProfile;
use crate::domain::model::{DataBits, Parity, SerialSettings, StopBits};
use crate::utils::error::{ProjectorError, Result};
use serde_json::Value;
use std::time::Duration;

static BYTESIZE_TABLE: [(f64, DataBits); 4] = [
    (5.0, DataBits::Five),
    (6.0, DataBits::Six),
    (7.0, DataBits::Seven),
    (8.0, DataBits::Eight),
];

static PARITY_TABLE: [(&str, Parity); 5] = [
    ("none", Parity::None),
    ("even", Parity::Even),
    ("odd", Parity::Odd),
    ("mark", Parity::Mark),
    ("space", Parity::Space),
];

static STOPBITS_TABLE: [(f64, StopBits); 3] = [
    (1.0, StopBits::One),
    (1.5, StopBits::OnePointFive),
    (2.0, StopBits::Two),
];

impl SerialSettings {
    pub fn from_profile(profile: &DeviceProfile) -> Result<Self> {
        let device_id = profile.device_id();
        let mut settings = SerialSettings::default();

        for (key, value) in profile.serial_block()? {
            let unsupported = || ProjectorError::UnsupportedValue {
                device_id: device_id.to_string(),
                key: key.clone(),
                value: display_value(value),
            };

            match key.as_str() {
                "port" => {
                    settings.port = match value {
                        Value::Null => None,
                        Value::String(s) => Some(s.clone()),
                        _ => return Err(unsupported()),
                    }
                }
                "baudrate" => {
                    settings.baudrate = value
                        .as_u64()
                        .filter(|baud| *baud > 0)
                        .and_then(|baud| u32::try_from(baud).ok())
                        .ok_or_else(unsupported)?;
                }
                "bytesize" => {
                    settings.bytesize = lookup_number(&BYTESIZE_TABLE, value).ok_or_else(unsupported)?;
                }
                "parity" => {
                    settings.parity = value
                        .as_str()
                        .and_then(|name| PARITY_TABLE.iter().find(|(n, _)| *n == name))
                        .map(|(_, parity)| *parity)
                        .ok_or_else(unsupported)?;
                }
                "stopbits" => {
                    settings.stopbits = lookup_number(&STOPBITS_TABLE, value).ok_or_else(unsupported)?;
                }
                "timeout" => settings.timeout = seconds(value).ok_or_else(unsupported)?,
                "writeTimeout" => settings.write_timeout = seconds(value).ok_or_else(unsupported)?,
                "InterCharTimeout" => settings.inter_char_timeout = seconds(value).ok_or_else(unsupported)?,
                "xonxoff" => settings.xonxoff = value.as_bool().ok_or_else(unsupported)?,
                "rtscts" => settings.rtscts = value.as_bool().ok_or_else(unsupported)?,
                "dsrdtr" => settings.dsrdtr = value.as_bool().ok_or_else(unsupported)?,
                _ => {
                    return Err(ProjectorError::UnsupportedSetting {
                        device_id: device_id.to_string(),
                        key: key.clone(),
                    })
                }
            }
        }

        tracing::debug!("Serial settings for {}: {}", device_id, settings);
        Ok(settings)
    }
}

fn lookup_number<T: Copy>(table: &[(f64, T)], value: &Value) -> Option<T> {
    let number = value.as_f64()?;
    table
        .iter()
        .find(|(key, _)| *key == number)
        .map(|(_, constant)| *constant)
}

/// `null` means "no timeout"; anything else must be non-negative seconds.
fn seconds(value: &Value) -> Option<Option<Duration>> {
    match value {
        Value::Null => Some(None),
        other => other
            .as_f64()
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
            .map(Some),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
