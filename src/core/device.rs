use crate::config::catalog::Catalog;
use crate::config::overrides::Overrides;
use crate::core::dispatcher::{CommandDispatcher, FixedDelayReader};
use crate::domain::model::{CommandTable, SerialSettings};
use crate::domain::ports::{ResponseReader, Transport, TransportOpener};
use crate::utils::error::{ProjectorError, Result};

/// An open connection to one projector.
///
/// The transport is opened by [`Projector::open`] and released by
/// [`Projector::close`] or on drop. Dispatch takes `&mut self`, so commands
/// on one device never interleave.
pub struct Projector<R = FixedDelayReader> {
    settings: SerialSettings,
    dispatcher: CommandDispatcher<R>,
    transport: Option<Box<dyn Transport>>,
}

impl Projector {
    /// Resolves `device_id` from the catalog and opens its transport.
    ///
    /// `port` replaces the profile's `serial.port` when given.
    pub fn open(
        catalog: &Catalog,
        device_id: &str,
        port: Option<&str>,
        overrides: &Overrides,
        opener: &dyn TransportOpener,
    ) -> Result<Self> {
        Self::open_with_reader(catalog, device_id, port, overrides, opener, FixedDelayReader)
    }
}

impl<R: ResponseReader> Projector<R> {
    pub fn open_with_reader(
        catalog: &Catalog,
        device_id: &str,
        port: Option<&str>,
        overrides: &Overrides,
        opener: &dyn TransportOpener,
        reader: R,
    ) -> Result<Self> {
        let profile = catalog.resolve(device_id, overrides)?;
        let mut settings = SerialSettings::from_profile(&profile)?;
        if let Some(port) = port {
            settings.port = Some(port.to_string());
        }
        if settings.port.is_none() {
            return Err(ProjectorError::InvalidConfig {
                device_id: device_id.to_string(),
                section: "serial".to_string(),
                message: "no port given and the profile does not set `port`".to_string(),
            });
        }

        let dispatcher = CommandDispatcher::new(profile, reader)?;
        let transport = opener.open(&settings)?;
        tracing::info!(
            "Projector {} ready with {} command(s)",
            device_id,
            dispatcher.commands().len()
        );

        Ok(Self {
            settings,
            dispatcher,
            transport: Some(transport),
        })
    }

    pub fn device_id(&self) -> &str {
        self.dispatcher.profile().device_id()
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    pub fn commands(&self) -> &CommandTable {
        self.dispatcher.commands()
    }

    /// Action aliases of `command`, empty when the command takes free-form actions.
    pub fn actions(&self, command: &str) -> Result<Vec<&str>> {
        Ok(self
            .dispatcher
            .command(command)?
            .actions
            .keys()
            .map(String::as_str)
            .collect())
    }

    /// Sends `command action` and returns whatever the device answered
    /// within the profile's `wait_time`.
    pub fn dispatch(&mut self, command: &str, action: &str) -> Result<String> {
        let transport = self.transport.as_deref_mut().ok_or_else(transport_closed)?;
        self.dispatcher.send(transport, command, action)
    }

    /// Drains bytes already buffered by the transport without waiting.
    pub fn receive(&mut self) -> Result<String> {
        let transport = self.transport.as_deref_mut().ok_or_else(transport_closed)?;
        self.dispatcher.receive(transport)
    }

    pub fn close(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        match self.transport.take() {
            Some(mut transport) => {
                tracing::debug!("Releasing transport for {}", self.device_id());
                transport.close()
            }
            None => Ok(()),
        }
    }
}

fn transport_closed() -> ProjectorError {
    std::io::Error::new(std::io::ErrorKind::NotConnected, "transport closed").into()
}

impl<R> Drop for Projector<R> {
    fn drop(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            if let Err(e) = transport.close() {
                tracing::warn!("Failed to close transport: {}", e);
            }
        }
    }
}
