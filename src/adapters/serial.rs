use crate::domain::model::{DataBits, Parity, SerialSettings, StopBits};
use crate::domain::ports::{Transport, TransportOpener};
use crate::utils::error::{ProjectorError, Result};
use crate::utils::validation::validate_required_field;
use serialport::{ClearBuffer, FlowControl, SerialPort};
use std::io::{self, Read, Write};
use std::time::Duration;

/// Opens real serial ports through the `serialport` crate.
///
/// `serialport` has no DSR/DTR flow control. With `dsrdtr` set the port is
/// opened without flow control for it and DTR is asserted, nothing more.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialOpener;

pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

fn unsupported(what: String) -> ProjectorError {
    io::Error::new(io::ErrorKind::Unsupported, what).into()
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Five => serialport::DataBits::Five,
        DataBits::Six => serialport::DataBits::Six,
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> Result<serialport::Parity> {
    match parity {
        Parity::None => Ok(serialport::Parity::None),
        Parity::Even => Ok(serialport::Parity::Even),
        Parity::Odd => Ok(serialport::Parity::Odd),
        Parity::Mark | Parity::Space => Err(unsupported(format!(
            "{} parity is not available on this serial backend",
            parity
        ))),
    }
}

fn stop_bits(bits: StopBits) -> Result<serialport::StopBits> {
    match bits {
        StopBits::One => Ok(serialport::StopBits::One),
        StopBits::Two => Ok(serialport::StopBits::Two),
        StopBits::OnePointFive => Err(unsupported(
            "1.5 stop bits are not available on this serial backend".to_string(),
        )),
    }
}

fn flow_control(settings: &SerialSettings) -> FlowControl {
    if settings.rtscts {
        if settings.xonxoff {
            tracing::warn!("Both rtscts and xonxoff requested, using hardware flow control");
        }
        FlowControl::Hardware
    } else if settings.xonxoff {
        FlowControl::Software
    } else {
        FlowControl::None
    }
}

/// The backend has a single timeout for reads and writes: the larger of the
/// two. Unset means block, which the backend only offers as a very long timeout.
fn backend_timeout(settings: &SerialSettings) -> Duration {
    settings
        .timeout
        .into_iter()
        .chain(settings.write_timeout)
        .max()
        .unwrap_or(BLOCKING_TIMEOUT)
}

const BLOCKING_TIMEOUT: Duration = Duration::from_secs(u32::MAX as u64);

impl TransportOpener for SerialOpener {
    fn open(&self, settings: &SerialSettings) -> Result<Box<dyn Transport>> {
        let path = validate_required_field("serial.port", &settings.port)?;

        if settings.inter_char_timeout.is_some() {
            tracing::debug!("InterCharTimeout has no serial backend equivalent, ignoring");
        }

        let mut port = serialport::new(path, settings.baudrate)
            .data_bits(data_bits(settings.bytesize))
            .parity(parity(settings.parity)?)
            .stop_bits(stop_bits(settings.stopbits)?)
            .flow_control(flow_control(settings))
            .timeout(backend_timeout(settings))
            .open()?;

        if settings.dsrdtr {
            tracing::warn!("DSR/DTR flow control is not available, asserting DTR only");
            port.write_data_terminal_ready(true)?;
        }

        tracing::info!("🔌 Opened {}", settings);
        Ok(Box::new(SerialTransport { port }))
    }
}

impl Transport for SerialTransport {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.port.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn close(&mut self) -> Result<()> {
        self.port.flush()?;
        self.port.clear(ClearBuffer::Input)?;
        tracing::debug!("Closed {}", self.port.name().unwrap_or_default());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_rejects_mark_parity_and_one_point_five_stop_bits() {
        assert!(parity(Parity::Mark).is_err());
        assert!(parity(Parity::Space).is_err());
        assert!(stop_bits(StopBits::OnePointFive).is_err());
        assert_eq!(parity(Parity::Odd).unwrap(), serialport::Parity::Odd);
    }

    #[test]
    fn test_flow_control_precedence() {
        let mut settings = SerialSettings::default();
        assert_eq!(flow_control(&settings), FlowControl::None);
        settings.xonxoff = true;
        assert_eq!(flow_control(&settings), FlowControl::Software);
        settings.rtscts = true;
        assert_eq!(flow_control(&settings), FlowControl::Hardware);
    }

    #[test]
    fn test_backend_timeout() {
        let mut settings = SerialSettings::default();
        assert_eq!(backend_timeout(&settings), BLOCKING_TIMEOUT);

        settings.write_timeout = Some(Duration::from_millis(500));
        assert_eq!(backend_timeout(&settings), Duration::from_millis(500));

        settings.timeout = Some(Duration::from_secs(2));
        assert_eq!(backend_timeout(&settings), Duration::from_secs(2));

        settings.timeout = Some(Duration::ZERO);
        assert_eq!(backend_timeout(&settings), Duration::from_millis(500));
    }

    #[test]
    fn test_open_without_port() {
        let err = SerialOpener.open(&SerialSettings::default()).err().unwrap();
        assert!(matches!(err, ProjectorError::InvalidValue { .. }));
    }
}
