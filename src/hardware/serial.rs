//! Serial transport over a real port

use crate::hardware::{LinkError, LinkResult, ParityMode, SerialConfig, Transport};
use std::io::{Read, Write};
use std::time::Duration;

/// Transport implementation backed by the `serialport` crate
///
/// The handle is exclusively owned; dropping or closing it releases the
/// port. All reads block up to the configured timeout.
pub struct SerialTransport {
    port: Option<Box<dyn serialport::SerialPort>>,
    timeout_ms: u64,
}

impl SerialTransport {
    /// Open `port_name` with the given line parameters
    pub fn open(port_name: &str, config: &SerialConfig) -> LinkResult<Self> {
        config.validate()?;

        let data_bits = match config.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            _ => serialport::DataBits::Eight,
        };
        let parity = match config.parity {
            ParityMode::None => serialport::Parity::None,
            ParityMode::Odd => serialport::Parity::Odd,
            ParityMode::Even => serialport::Parity::Even,
        };

        let port = serialport::new(port_name, config.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .timeout(Duration::from_millis(config.timeout_ms))
            .open()
            .map_err(|e| LinkError::OpenFailed {
                port: port_name.to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            port: Some(port),
            timeout_ms: config.timeout_ms,
        })
    }

    fn port_mut(&mut self) -> LinkResult<&mut Box<dyn serialport::SerialPort>> {
        self.port.as_mut().ok_or(LinkError::NotConnected)
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, bytes: &[u8]) -> LinkResult<()> {
        let port = self.port_mut()?;
        port.write_all(bytes).map_err(|e| LinkError::Io {
            details: e.to_string(),
        })?;
        port.flush().map_err(|e| LinkError::Io {
            details: e.to_string(),
        })
    }

    fn read_exact(&mut self, len: usize) -> LinkResult<Vec<u8>> {
        let timeout_ms = self.timeout_ms;
        let port = self.port_mut()?;
        let mut buffer = vec![0u8; len];
        match port.read_exact(&mut buffer) {
            Ok(()) => Ok(buffer),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {
                Err(LinkError::Timeout { timeout_ms })
            }
            Err(e) => Err(LinkError::Io {
                details: e.to_string(),
            }),
        }
    }

    fn close(&mut self) {
        // dropping the boxed handle releases the OS port
        self.port = None;
    }
}
