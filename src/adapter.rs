//! RPC client for the LIN adapter board
//!
//! Every remote call is one exchange: write a frame (or a bare header),
//! then read back an exact number of bytes. The control path is
//! acknowledged by the device echoing the sent frame; the status path
//! answers a 3-byte header poll with a full status frame. Exchanges are
//! never interleaved; the transport handle is exclusively owned here.

use crate::hardware::{LinkError, LinkResult, SerialConfig, SerialTransport, Transport};
use crate::protocol::{ControlFrame, DiagRecFrame, DiagSendFrame, FrameHeader, StatusFrame};

/// Request/response client over a single-owner transport
///
/// State machine: Disconnected -> `connect` -> Connected -> `disconnect`.
/// Every operation other than `connect` fails with
/// [`LinkError::NotConnected`] while no session is open.
pub struct LinAdapter {
    transport: Option<Box<dyn Transport>>,
    config: SerialConfig,
}

impl LinAdapter {
    /// Create a disconnected adapter with the default serial parameters
    pub fn new() -> Self {
        Self::with_config(SerialConfig::default())
    }

    pub fn with_config(config: SerialConfig) -> Self {
        Self {
            transport: None,
            config,
        }
    }

    /// Open a session on the named serial port
    pub fn connect(&mut self, port_name: &str) -> LinkResult<()> {
        let transport = SerialTransport::open(port_name, &self.config)?;
        self.transport = Some(Box::new(transport));
        Ok(())
    }

    /// Adopt an already-open transport (tests, alternative backends)
    pub fn attach(&mut self, transport: Box<dyn Transport>) {
        self.transport = Some(transport);
    }

    /// Close the session; safe to call while disconnected
    pub fn disconnect(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_some()
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    fn transport_mut(&mut self) -> LinkResult<&mut Box<dyn Transport>> {
        self.transport.as_mut().ok_or(LinkError::NotConnected)
    }

    /// Write a full frame and require a byte-exact echo as acknowledgment
    fn echo_exchange(&mut self, frame_bytes: &[u8]) -> LinkResult<()> {
        let transport = self.transport_mut()?;
        transport.write_all(frame_bytes)?;

        let echoed = transport.read_exact(frame_bytes.len())?;
        if echoed != frame_bytes {
            return Err(LinkError::EchoMismatch {
                sent: frame_bytes.to_vec(),
                received: echoed,
            });
        }
        Ok(())
    }

    /// Write only a header as a poll request and read the full reply frame
    fn poll_exchange(&mut self, header: &FrameHeader) -> LinkResult<Vec<u8>> {
        let transport = self.transport_mut()?;
        transport.write_all(&header.to_bytes())?;
        transport.read_exact(header.frame_len())
    }

    /// Push the current control intent to the device
    ///
    /// Any mismatch, short read or timeout is a failed exchange reported as
    /// an error result; the caller decides whether the session survives.
    pub fn send_control(&mut self, frame: &ControlFrame) -> LinkResult<()> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        let bytes = frame.to_bytes()?;
        self.echo_exchange(&bytes)
    }

    /// Request the current device status
    pub fn request_status(&mut self, template: &StatusFrame) -> LinkResult<StatusFrame> {
        let bytes = self.poll_exchange(template.header())?;
        Ok(StatusFrame::decode(&bytes)?)
    }

    /// Push a diagnostic request frame, echo-acknowledged like control
    pub fn send_diagnostic(&mut self, frame: &DiagSendFrame) -> LinkResult<()> {
        if !self.is_connected() {
            return Err(LinkError::NotConnected);
        }
        let bytes = frame.to_bytes()?;
        self.echo_exchange(&bytes)
    }

    /// Request a diagnostic response frame
    pub fn request_diagnostic(&mut self, template: &DiagRecFrame) -> LinkResult<DiagRecFrame> {
        let bytes = self.poll_exchange(template.header())?;
        Ok(DiagRecFrame::decode(&bytes)?)
    }
}

impl Default for LinAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LinAdapter {
    fn drop(&mut self) {
        self.disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Direction, OpMode};
    use crate::hardware::MockTransport;

    fn control_frame() -> ControlFrame {
        let mut frame = ControlFrame::new();
        frame.set_init_position(16000);
        frame.set_new_position(8000);
        frame.set_speed(40);
        frame.set_op_mode(OpMode::PositionCtrl);
        frame.set_motor_enabled(true);
        frame.set_stall_detection(true);
        frame.set_direction(Direction::Stop);
        frame
    }

    #[test]
    fn test_operations_require_connection() {
        let mut adapter = LinAdapter::new();
        assert!(!adapter.is_connected());

        assert_eq!(
            adapter.send_control(&control_frame()),
            Err(LinkError::NotConnected)
        );
        assert_eq!(
            adapter.request_status(&StatusFrame::new()),
            Err(LinkError::NotConnected)
        );
        assert_eq!(
            adapter.request_diagnostic(&DiagRecFrame::new()),
            Err(LinkError::NotConnected)
        );
    }

    #[test]
    fn test_send_control_accepts_exact_echo() {
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(MockTransport::with_echo()));

        assert_eq!(adapter.send_control(&control_frame()), Ok(()));
    }

    #[test]
    fn test_send_control_rejects_mismatched_echo() {
        let frame = control_frame();
        let mut wrong = frame.to_bytes().unwrap();
        wrong[4] ^= 0xFF;

        let mut mock = MockTransport::new();
        mock.queue_read(&wrong);
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(mock));

        assert!(matches!(
            adapter.send_control(&frame),
            Err(LinkError::EchoMismatch { .. })
        ));
    }

    #[test]
    fn test_send_control_short_read_is_timeout() {
        let mut mock = MockTransport::new();
        mock.queue_read(&[0xAA, 0x30]); // device went away mid-echo
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(mock));

        assert!(matches!(
            adapter.send_control(&control_frame()),
            Err(LinkError::Timeout { .. })
        ));
    }

    #[test]
    fn test_request_status_decodes_reply() {
        let mut mock = MockTransport::new();
        mock.queue_read(&[0x55, 0x31, 6, 41, 9, 5, 12, 76, 142]);
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(mock));

        let status = adapter.request_status(&StatusFrame::new()).unwrap();
        assert_eq!(status.current_pos(), Some(2345));
        assert_eq!(status.bvdd(), Some(12));
        assert_eq!(status.current_speed(), Some(142));
    }

    #[test]
    fn test_request_diagnostic_decodes_reply() {
        let mut mock = MockTransport::new();
        mock.queue_read(&[0x55, 0x3D, 8, 0x7F, 0x06, 0xF2, 1, 2, 3, 4, 5]);
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(mock));

        let reply = adapter.request_diagnostic(&DiagRecFrame::new()).unwrap();
        assert_eq!(reply.nad(), Some(0x7F));
        assert_eq!(reply.sid(), Some(0xF2));
        assert_eq!(reply.data(5), Some(5));
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(MockTransport::new()));
        assert!(adapter.is_connected());

        adapter.disconnect();
        assert!(!adapter.is_connected());
        adapter.disconnect();
        assert!(!adapter.is_connected());
    }
}
