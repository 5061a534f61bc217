//! Mock transport for testing the adapter and polling engine

use crate::hardware::{LinkError, LinkResult, Transport};
use std::collections::VecDeque;

/// Scripted transport: reads come from a queued byte stream, writes are
/// recorded. With echo mode on, every written byte is immediately appended
/// to the read stream, which is exactly how the LIN adapter board
/// acknowledges a control frame.
pub struct MockTransport {
    read_buffer: VecDeque<u8>,
    written: Vec<Vec<u8>>,
    echo: bool,
    connected: bool,
    timeout_ms: u64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            read_buffer: VecDeque::new(),
            written: Vec::new(),
            echo: false,
            connected: true,
            timeout_ms: 1000,
        }
    }

    /// Create a mock that echoes every write back on the read side
    pub fn with_echo() -> Self {
        let mut mock = Self::new();
        mock.echo = true;
        mock
    }

    /// Queue bytes to be returned by subsequent reads
    pub fn queue_read(&mut self, bytes: &[u8]) {
        self.read_buffer.extend(bytes);
    }

    /// All writes issued so far, in order
    pub fn written(&self) -> &[Vec<u8>] {
        &self.written
    }

    /// Bytes queued but not yet consumed by reads
    pub fn pending_read_len(&self) -> usize {
        self.read_buffer.len()
    }

    /// Simulate the device disappearing mid-session
    pub fn drop_connection(&mut self) {
        self.connected = false;
        self.read_buffer.clear();
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn write_all(&mut self, bytes: &[u8]) -> LinkResult<()> {
        if !self.connected {
            return Err(LinkError::Io {
                details: "mock port closed".to_string(),
            });
        }
        self.written.push(bytes.to_vec());
        if self.echo {
            self.read_buffer.extend(bytes);
        }
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> LinkResult<Vec<u8>> {
        if !self.connected {
            return Err(LinkError::Io {
                details: "mock port closed".to_string(),
            });
        }
        if self.read_buffer.len() < len {
            // a real port would block until the timeout and give up
            return Err(LinkError::Timeout {
                timeout_ms: self.timeout_ms,
            });
        }
        Ok(self.read_buffer.drain(..len).collect())
    }

    fn close(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads() {
        let mut mock = MockTransport::new();
        mock.queue_read(&[1, 2, 3, 4]);

        assert_eq!(mock.read_exact(2).unwrap(), vec![1, 2]);
        assert_eq!(mock.read_exact(2).unwrap(), vec![3, 4]);
        assert!(matches!(
            mock.read_exact(1),
            Err(LinkError::Timeout { .. })
        ));
    }

    #[test]
    fn test_echo_mode() {
        let mut mock = MockTransport::with_echo();
        mock.write_all(&[0xAA, 0x30, 0x07]).unwrap();

        assert_eq!(mock.written(), &[vec![0xAA, 0x30, 0x07]]);
        assert_eq!(mock.read_exact(3).unwrap(), vec![0xAA, 0x30, 0x07]);
    }

    #[test]
    fn test_dropped_connection() {
        let mut mock = MockTransport::new();
        mock.queue_read(&[1, 2, 3]);
        mock.drop_connection();

        assert!(mock.write_all(&[0]).is_err());
        assert!(mock.read_exact(1).is_err());
    }
}
