//! Link error types and handling

use crate::protocol::codec::{DecodeError, EncodeError};
use std::fmt;

/// Errors for every transport-facing operation
///
/// Codec failures are folded in so the adapter can surface one uniform
/// error kind; the polling engine treats any of the exchange variants as
/// "device did not respond" and degrades to Offline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Operation attempted while no session is open
    NotConnected,
    /// Serial port could not be opened
    OpenFailed { port: String, details: String },
    /// Invalid serial configuration
    InvalidConfig { parameter: String, value: String },
    /// Read did not complete within the configured timeout
    Timeout { timeout_ms: u64 },
    /// Underlying I/O failure
    Io { details: String },
    /// Device echo did not match the written frame
    EchoMismatch { sent: Vec<u8>, received: Vec<u8> },
    /// A frame could not be encoded
    Encode(EncodeError),
    /// A received frame could not be decoded
    Decode(DecodeError),
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::NotConnected => {
                write!(f, "Not connected to the LIN adapter")
            }
            LinkError::OpenFailed { port, details } => {
                write!(f, "Could not open {}: {}", port, details)
            }
            LinkError::InvalidConfig { parameter, value } => {
                write!(f, "Invalid serial configuration: {} = {}", parameter, value)
            }
            LinkError::Timeout { timeout_ms } => {
                write!(f, "No response within {}ms", timeout_ms)
            }
            LinkError::Io { details } => {
                write!(f, "I/O error: {}", details)
            }
            LinkError::EchoMismatch { sent, received } => {
                write!(
                    f,
                    "Echo mismatch: wrote {:02X?}, read back {:02X?}",
                    sent, received
                )
            }
            LinkError::Encode(e) => write!(f, "Encoding error: {}", e),
            LinkError::Decode(e) => write!(f, "Decoding error: {}", e),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<EncodeError> for LinkError {
    fn from(error: EncodeError) -> Self {
        LinkError::Encode(error)
    }
}

impl From<DecodeError> for LinkError {
    fn from(error: DecodeError) -> Self {
        LinkError::Decode(error)
    }
}

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;
