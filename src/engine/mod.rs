//! Cyclic polling engine: control push, status pull, telemetry fan-out

pub mod formatting;
pub mod poller;
pub mod scheduler;
pub mod telemetry;

pub use formatting::{JsonFormatter, TelemetryFormatter, TextFormatter};
pub use poller::{
    CallbackHandle, ConnectionCallback, EngineConfig, PollingEngine, TelemetryCallback,
};
pub use scheduler::{IntervalScheduler, ManualScheduler, ManualTrigger, TickScheduler};
pub use telemetry::{PlotData, StatusIndicators, TelemetryHistory, TelemetryUpdate};
