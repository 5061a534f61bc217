//! Protocol constants and telemetry scale factors

/// Sync byte marking a frame sent by the controller (PC side)
pub const CONTROLLER_SYNC: u8 = 0xAA;

/// Sync byte marking a frame sent by the device
pub const DEVICE_SYNC: u8 = 0x55;

/// Header size on the wire: sync, frame ID, payload length
pub const HEADER_LEN: usize = 3;

/// Serial baud rate required by the LIN adapter board
pub const BAUD_RATE: u32 = 115_200;

/// Default read timeout for one exchange (milliseconds)
pub const READ_TIMEOUT_MS: u64 = 1000;

/// Poll cycle period (milliseconds)
pub const UPDATE_INTERVAL_MS: u64 = 200;

/// Number of data points kept per plot buffer
pub const PLOT_WINDOW: usize = 1000;

/// Supply voltage scale: volts per raw BVDD digit
pub const BVDD_FACTOR: f64 = 0.2;

/// Junction temperature offset in degrees Celsius
pub const TJ_OFFSET: f64 = -60.0;

/// Rotor speed scale: RPM per raw speed digit
pub const RPM_FACTOR: f64 = 8.0;

/// Milliseconds per second, for the elapsed-time axis
pub const TIMEBASE_FACTOR: f64 = 1000.0;
