pub mod device;
pub mod dispatcher;

pub use crate::domain::model::{CommandSpec, CommandTable, SerialSettings};
pub use crate::domain::ports::{ResponseReader, Transport, TransportOpener};
pub use crate::utils::error::Result;
