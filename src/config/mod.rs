pub mod catalog;
pub mod overrides;
pub mod profile;
pub mod settings;

#[cfg(feature = "cli")]
use crate::config::catalog::Catalog;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_key_value, validate_non_empty_string, validate_path, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "projector")]
#[command(about = "Control a projector over its serial port")]
pub struct CliConfig {
    /// Directory holding one profile file per device
    #[arg(long, default_value_os_t = Catalog::default_dir())]
    pub catalog: PathBuf,

    /// Device profile to use
    #[arg(short, long, default_value = "benq")]
    pub device: String,

    /// Serial port, replaces the profile's `serial.port`
    #[arg(short, long)]
    pub port: Option<String>,

    /// Override a top-level profile key, e.g. --set wait_time=0.5
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub overrides: Vec<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Write logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Send one command and print the device's answer
    Send { command: String, action: String },
    /// List the device profiles in the catalog
    ListDevices,
    /// List the commands and actions of the selected device
    ListCommands,
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("--catalog", &self.catalog.to_string_lossy())?;
        validate_non_empty_string("--device", &self.device)?;
        if let Some(port) = &self.port {
            validate_path("--port", port)?;
        }
        for pair in &self.overrides {
            validate_key_value("--set", pair)?;
        }
        if let CliCommand::Send { command, action } = &self.command {
            validate_non_empty_string("command", command)?;
            validate_non_empty_string("action", action)?;
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_send() {
        let config = CliConfig::try_parse_from([
            "projector",
            "--catalog",
            "configs",
            "--port",
            "/dev/ttyUSB0",
            "--set",
            "wait_time=0.2",
            "send",
            "power",
            "on",
        ])
        .unwrap();

        assert_eq!(config.catalog, PathBuf::from("configs"));
        assert_eq!(config.device, "benq");
        assert_eq!(config.overrides, vec!["wait_time=0.2".to_string()]);
        assert!(matches!(
            &config.command,
            CliCommand::Send { command, action } if command == "power" && action == "on"
        ));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_override() {
        let config =
            CliConfig::try_parse_from(["projector", "--set", "wait_time", "list-devices"]).unwrap();
        assert!(config.validate().is_err());
    }
}
