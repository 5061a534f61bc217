//! Transport layer for the LIN adapter board
//!
//! The adapter talks to exactly one device over a byte stream with blocking
//! reads. [`SerialTransport`] drives a real serial port; [`MockTransport`]
//! scripts exchanges for tests.

pub mod serial;
pub mod mock;
pub mod error;

pub use serial::SerialTransport;
pub use mock::MockTransport;
pub use error::{LinkError, LinkResult};

use crate::core::{BAUD_RATE, READ_TIMEOUT_MS};
use serde::{Deserialize, Serialize};

/// Byte-stream contract required from the serial collaborator
///
/// Reads block up to the configured timeout; a timed-out read is an error
/// result, never a partial success.
pub trait Transport {
    /// Write the full byte sequence
    fn write_all(&mut self, bytes: &[u8]) -> LinkResult<()>;

    /// Read exactly `len` bytes or fail with a timeout
    fn read_exact(&mut self, len: usize) -> LinkResult<Vec<u8>>;

    /// Release the underlying handle; further calls fail
    fn close(&mut self);
}

/// Parity setting for the serial line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParityMode {
    None,
    Odd,
    Even,
}

/// Serial port parameters for the LIN adapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Line speed in baud
    pub baud_rate: u32,
    /// Data bits per character (the adapter board requires 8)
    pub data_bits: u8,
    /// Parity mode
    pub parity: ParityMode,
    /// Blocking read timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: BAUD_RATE,
            data_bits: 8,
            parity: ParityMode::None,
            timeout_ms: READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    pub fn validate(&self) -> LinkResult<()> {
        if !(5..=8).contains(&self.data_bits) {
            return Err(LinkError::InvalidConfig {
                parameter: "data_bits".to_string(),
                value: self.data_bits.to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(LinkError::InvalidConfig {
                parameter: "baud_rate".to_string(),
                value: self.baud_rate.to_string(),
            });
        }
        if self.timeout_ms == 0 {
            return Err(LinkError::InvalidConfig {
                parameter: "timeout_ms".to_string(),
                value: self.timeout_ms.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_adapter_board() {
        let config = SerialConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.data_bits, 8);
        assert_eq!(config.parity, ParityMode::None);
        assert_eq!(config.timeout_ms, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SerialConfig::default();
        config.data_bits = 9;
        assert!(matches!(
            config.validate(),
            Err(LinkError::InvalidConfig { .. })
        ));

        let mut config = SerialConfig::default();
        config.timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
