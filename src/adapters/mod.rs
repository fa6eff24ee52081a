// Adapters layer: concrete implementations of the transport ports.

pub mod mock;
pub mod serial;

pub use mock::{MockHandle, MockOpener, MockTransport};
pub use serial::{SerialOpener, SerialTransport};
