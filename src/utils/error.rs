use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectorError {
    #[error("Could not read profile catalog at {}: {source}", path.display())]
    CatalogLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse profile {}: {message}", path.display())]
    ProfileParse { path: PathBuf, message: String },

    #[error(
        "Could not find device config with name {device_id}. Check that the file exists in `{}`",
        catalog.display()
    )]
    ProfileNotFound { device_id: String, catalog: PathBuf },

    #[error("Configuration for {device_id} has an invalid `{section}` section: {message}")]
    InvalidConfig {
        device_id: String,
        section: String,
        message: String,
    },

    #[error("Configuration for {device_id} specifies a serial setting \"{key}\" that is not recognized")]
    UnsupportedSetting { device_id: String, key: String },

    #[error("Configuration for {device_id} specifies \"{value}\" for serial setting \"{key}\", which is not supported")]
    UnsupportedValue {
        device_id: String,
        key: String,
        value: String,
    },

    #[error("Device {device_id} has no command named \"{command}\"")]
    UnknownCommand { device_id: String, command: String },

    #[error("Command \"{command}\" of device {device_id} has no action named \"{action}\"")]
    UnknownAction {
        device_id: String,
        command: String,
        action: String,
    },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration for {device_id} does not set `wait_time`")]
    MissingWaitTime { device_id: String },

    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Catalog,
    Config,
    Dispatch,
    Transport,
}

impl ProjectorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CatalogLoad { .. } | Self::ProfileParse { .. } | Self::ProfileNotFound { .. } => {
                ErrorCategory::Catalog
            }
            Self::InvalidConfig { .. }
            | Self::UnsupportedSetting { .. }
            | Self::UnsupportedValue { .. }
            | Self::InvalidValue { .. }
            | Self::MissingWaitTime { .. } => ErrorCategory::Config,
            Self::UnknownCommand { .. } | Self::UnknownAction { .. } => ErrorCategory::Dispatch,
            Self::Transport(_) => ErrorCategory::Transport,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::CatalogLoad { .. } => "Check that the catalog directory exists and is readable (--catalog or PROJECTOR_CATALOG)",
            Self::ProfileParse { .. } => "Fix the syntax of the named profile file",
            Self::ProfileNotFound { .. } => "Run `projector list-devices` to see the available profiles",
            Self::InvalidConfig { .. } => "Add the missing section to the profile or pass it with --set",
            Self::UnsupportedSetting { .. } => {
                "Valid serial settings: port, baudrate, bytesize, parity, stopbits, timeout, xonxoff, rtscts, dsrdtr, writeTimeout, InterCharTimeout"
            }
            Self::UnsupportedValue { .. } => {
                "bytesize must be 5-8, parity one of none/even/odd/mark/space, stopbits one of 1/1.5/2"
            }
            Self::UnknownCommand { .. } | Self::UnknownAction { .. } => {
                "Run `projector list-commands` to see what the device understands"
            }
            Self::InvalidValue { .. } => "Correct the value named above and try again",
            Self::MissingWaitTime { .. } => "Set `wait_time` (seconds) in the profile or pass --set wait_time=1",
            Self::Transport(_) => "Check the cable, the port path and that no other program holds the port",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Catalog => 2,
            ErrorCategory::Config => 3,
            ErrorCategory::Dispatch => 4,
            ErrorCategory::Transport => 5,
        }
    }
}

impl From<serialport::Error> for ProjectorError {
    fn from(err: serialport::Error) -> Self {
        Self::Transport(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ProjectorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_device_and_catalog() {
        let err = ProjectorError::ProfileNotFound {
            device_id: "epson".to_string(),
            catalog: PathBuf::from("projector_configs"),
        };
        let message = err.to_string();
        assert!(message.contains("epson"));
        assert!(message.contains("projector_configs"));
        assert_eq!(err.category(), ErrorCategory::Catalog);
    }

    #[test]
    fn test_exit_codes_follow_category() {
        let config = ProjectorError::MissingWaitTime {
            device_id: "benq".to_string(),
        };
        let transport = ProjectorError::Transport(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "unplugged",
        ));
        assert_eq!(config.exit_code(), 3);
        assert_eq!(transport.exit_code(), 5);
        assert_eq!(transport.category(), ErrorCategory::Transport);
    }
}
