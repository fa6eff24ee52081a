use crate::domain::model::SerialSettings;
use crate::utils::error::Result;
use std::time::Duration;

/// An open byte link to the device.
pub trait Transport: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Number of inbound bytes that can be read without blocking.
    fn bytes_available(&mut self) -> Result<usize>;

    fn read_byte(&mut self) -> Result<u8>;

    /// Release the link. Called once, when the owning device is closed or dropped.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

pub trait TransportOpener {
    fn open(&self, settings: &SerialSettings) -> Result<Box<dyn Transport>>;
}

/// Collects the device's answer after a command has been written.
pub trait ResponseReader {
    fn read_response(&self, transport: &mut dyn Transport, wait: Duration) -> Result<String>;
}
