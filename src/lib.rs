//! HVC motor driver link
//!
//! Host-side control of an HVC motor driver over a LIN-style serial
//! transport: bit-packed frame codec, echo-validated request/response
//! exchanges and a cyclic polling engine that publishes scaled telemetry.

pub mod adapter;
pub mod core;
pub mod engine;
pub mod hardware;
pub mod protocol;

// Re-export commonly used types
pub use adapter::LinAdapter;
pub use core::{ConnectionState, Direction, FrameId, HvcStatus, OpMode};
pub use engine::{
    CallbackHandle, EngineConfig, IntervalScheduler, JsonFormatter, PlotData, PollingEngine,
    StatusIndicators, TelemetryFormatter, TelemetryHistory, TelemetryUpdate, TextFormatter,
    TickScheduler,
};
pub use hardware::{
    LinkError, LinkResult, MockTransport, ParityMode, SerialConfig, SerialTransport, Transport,
};
pub use protocol::{
    ControlFrame, DecodeError, DiagRecFrame, DiagSendFrame, EncodeError, FrameHeader, StatusFrame,
    StatusSnapshot,
};
