use crate::config::profile::{DeviceProfile, LEFT_SURROUND_KEY, RIGHT_SURROUND_KEY, SEPARATOR_KEY};
use crate::domain::model::{CommandSpec, CommandTable};
use crate::domain::ports::{ResponseReader, Transport};
use crate::utils::error::{ProjectorError, Result};
use std::time::Duration;

/// Builds `left + command + separator + action + right`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuilder {
    left: String,
    separator: String,
    right: String,
}

impl CommandBuilder {
    pub fn new(left: impl Into<String>, separator: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            separator: separator.into(),
            right: right.into(),
        }
    }

    pub fn from_profile(profile: &DeviceProfile) -> Self {
        Self::new(
            profile.text_field(LEFT_SURROUND_KEY),
            profile.text_field(SEPARATOR_KEY),
            profile.text_field(RIGHT_SURROUND_KEY),
        )
    }

    pub fn build(&self, command: &str, action: &str) -> String {
        let mut wire = String::with_capacity(
            self.left.len() + command.len() + self.separator.len() + action.len() + self.right.len(),
        );
        wire.push_str(&self.left);
        wire.push_str(command);
        wire.push_str(&self.separator);
        wire.push_str(action);
        wire.push_str(&self.right);
        wire
    }
}

/// Reads whatever the transport has buffered right now. Never waits.
pub fn drain(transport: &mut dyn Transport) -> Result<String> {
    let mut bytes = Vec::new();
    while transport.bytes_available()? > 0 {
        bytes.push(transport.read_byte()?);
    }
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Sleeps for the profile's `wait_time`, then drains the buffer once.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelayReader;

impl ResponseReader for FixedDelayReader {
    fn read_response(&self, transport: &mut dyn Transport, wait: Duration) -> Result<String> {
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
        drain(transport)
    }
}

/// Turns alias/action pairs from a resolved profile into wire strings and
/// runs the write, wait, read cycle on a transport.
#[derive(Debug)]
pub struct CommandDispatcher<R = FixedDelayReader> {
    profile: DeviceProfile,
    commands: CommandTable,
    builder: CommandBuilder,
    reader: R,
}

impl<R: ResponseReader> CommandDispatcher<R> {
    pub fn new(profile: DeviceProfile, reader: R) -> Result<Self> {
        let commands = profile.command_table()?;
        let builder = CommandBuilder::from_profile(&profile);
        Ok(Self {
            profile,
            commands,
            builder,
            reader,
        })
    }

    pub fn profile(&self) -> &DeviceProfile {
        &self.profile
    }

    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    pub fn command(&self, alias: &str) -> Result<&CommandSpec> {
        self.commands
            .get(alias)
            .ok_or_else(|| ProjectorError::UnknownCommand {
                device_id: self.profile.device_id().to_string(),
                command: alias.to_string(),
            })
    }

    /// The string that `send` would write, after checking the aliases.
    ///
    /// The aliases themselves go on the wire; the token values in the
    /// command table are not substituted.
    pub fn wire_string(&self, command: &str, action: &str) -> Result<String> {
        let spec = self.command(command)?;
        if !spec.actions.is_empty() && !spec.actions.contains_key(action) {
            return Err(ProjectorError::UnknownAction {
                device_id: self.profile.device_id().to_string(),
                command: command.to_string(),
                action: action.to_string(),
            });
        }
        Ok(self.builder.build(command, action))
    }

    pub fn send(&self, transport: &mut dyn Transport, command: &str, action: &str) -> Result<String> {
        let wire = self.wire_string(command, action)?;
        let wait = self.profile.wait_time()?;

        tracing::debug!("➡️  {} {} -> {:?}", command, action, wire);
        transport.write(wire.as_bytes())?;

        let response = self.reader.read_response(transport, wait)?;
        tracing::debug!("⬅️  {:?}", response);
        Ok(response)
    }

    pub fn receive(&self, transport: &mut dyn Transport) -> Result<String> {
        drain(transport)
    }
}
