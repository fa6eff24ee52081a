use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// One entry of a profile's `command_list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Raw protocol token for the command.
    pub command: String,
    /// Action alias -> raw protocol token.
    #[serde(default)]
    pub actions: BTreeMap<String, String>,
}

pub type CommandTable = BTreeMap<String, CommandSpec>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    #[default]
    Eight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
    Mark,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopBits {
    #[default]
    One,
    OnePointFive,
    Two,
}

impl fmt::Display for DataBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        };
        write!(f, "{}", bits)
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Parity::None => "none",
            Parity::Even => "even",
            Parity::Odd => "odd",
            Parity::Mark => "mark",
            Parity::Space => "space",
        };
        f.write_str(name)
    }
}

impl fmt::Display for StopBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopBits::One => "1",
            StopBits::OnePointFive => "1.5",
            StopBits::Two => "2",
        };
        f.write_str(name)
    }
}

/// Transport-ready serial settings.
///
/// Fields left out of a profile keep the usual serial defaults (9600 8N1,
/// no flow control, no timeouts).
#[derive(Debug, Clone, PartialEq)]
pub struct SerialSettings {
    pub port: Option<String>,
    pub baudrate: u32,
    pub bytesize: DataBits,
    pub parity: Parity,
    pub stopbits: StopBits,
    pub timeout: Option<Duration>,
    pub xonxoff: bool,
    pub rtscts: bool,
    pub dsrdtr: bool,
    pub write_timeout: Option<Duration>,
    pub inter_char_timeout: Option<Duration>,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: None,
            baudrate: 9600,
            bytesize: DataBits::default(),
            parity: Parity::default(),
            stopbits: StopBits::default(),
            timeout: None,
            xonxoff: false,
            rtscts: false,
            dsrdtr: false,
            write_timeout: None,
            inter_char_timeout: None,
        }
    }
}

impl fmt::Display for SerialSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {} {}{}{}",
            self.port.as_deref().unwrap_or("<no port>"),
            self.baudrate,
            self.bytesize,
            self.parity.to_string().to_uppercase().chars().next().unwrap_or('N'),
            self.stopbits
        )
    }
}
