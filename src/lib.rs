pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliCommand, CliConfig};

pub use adapters::{MockOpener, SerialOpener};
pub use config::{catalog::Catalog, overrides::Overrides, profile::DeviceProfile};
pub use crate::core::{
    device::Projector,
    dispatcher::{CommandBuilder, CommandDispatcher, FixedDelayReader},
};
pub use utils::error::{ProjectorError, Result};
