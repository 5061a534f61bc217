//! Cyclic control/status polling against one HVC target
//!
//! The engine holds the live control frame, pushes it to the device every
//! update interval, reads the status frame back and publishes scaled
//! telemetry through registered callbacks. Any failed exchange stops the
//! cycle and reports the target as offline.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::adapter::LinAdapter;
use crate::core::{ConnectionState, Direction, OpMode, PLOT_WINDOW, UPDATE_INTERVAL_MS};
use crate::engine::scheduler::TickScheduler;
use crate::engine::telemetry::{TelemetryHistory, TelemetryUpdate};
use crate::hardware::{LinkError, LinkResult, Transport};
use crate::protocol::{ControlFrame, StatusFrame, StatusSnapshot};

/// Called with every published telemetry record
pub type TelemetryCallback = Box<dyn Fn(&TelemetryUpdate) + Send>;

/// Called whenever target reachability changes
pub type ConnectionCallback = Box<dyn Fn(ConnectionState) + Send>;

/// Opaque handle returned on callback registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackHandle(u32);

/// Polling engine tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Milliseconds between poll cycles
    pub update_interval_ms: u64,
    /// Points retained per plot series
    pub plot_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: UPDATE_INTERVAL_MS,
            plot_window: PLOT_WINDOW,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> LinkResult<()> {
        if self.update_interval_ms == 0 {
            return Err(LinkError::InvalidConfig {
                parameter: "update_interval_ms".to_string(),
                value: self.update_interval_ms.to_string(),
            });
        }
        if self.plot_window == 0 {
            return Err(LinkError::InvalidConfig {
                parameter: "plot_window".to_string(),
                value: self.plot_window.to_string(),
            });
        }
        Ok(())
    }
}

pub struct PollingEngine {
    adapter: LinAdapter,
    scheduler: Box<dyn TickScheduler>,
    config: EngineConfig,
    control: ControlFrame,
    status: StatusFrame,
    history: TelemetryHistory,
    connection: ConnectionState,
    session_start: Option<Instant>,
    next_handle: u32,
    telemetry_callbacks: HashMap<CallbackHandle, TelemetryCallback>,
    connection_callbacks: HashMap<CallbackHandle, ConnectionCallback>,
    last_snapshot: Option<StatusSnapshot>,
}

impl PollingEngine {
    pub fn new(adapter: LinAdapter, scheduler: Box<dyn TickScheduler>) -> Self {
        Self::with_config(adapter, scheduler, EngineConfig::default())
    }

    pub fn with_config(
        adapter: LinAdapter,
        scheduler: Box<dyn TickScheduler>,
        config: EngineConfig,
    ) -> Self {
        let plot_window = config.plot_window;
        Self {
            adapter,
            scheduler,
            config,
            control: Self::default_control(),
            status: StatusFrame::new(),
            history: TelemetryHistory::new(plot_window),
            connection: ConnectionState::Offline,
            session_start: None,
            next_handle: 0,
            telemetry_callbacks: HashMap::new(),
            connection_callbacks: HashMap::new(),
            last_snapshot: None,
        }
    }

    /// Safe power-on defaults: motor off, no movement commanded
    fn default_control() -> ControlFrame {
        let mut frame = ControlFrame::new();
        frame.set_init_position(0);
        frame.set_new_position(0);
        frame.set_speed(0);
        frame.set_op_mode(OpMode::PositionCtrl);
        frame.set_motor_enabled(false);
        frame.set_stall_detection(false);
        frame.set_direction(Direction::Stop);
        frame
    }

    // Control setters take effect on the next poll cycle.

    pub fn set_init_position(&mut self, pos: i16) {
        self.control.set_init_position(pos);
    }

    pub fn set_new_position(&mut self, pos: i16) {
        self.control.set_new_position(pos);
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.control.set_speed(speed);
    }

    pub fn set_op_mode(&mut self, mode: OpMode) {
        self.control.set_op_mode(mode);
    }

    pub fn set_motor_enabled(&mut self, enabled: bool) {
        self.control.set_motor_enabled(enabled);
    }

    pub fn set_stall_detection(&mut self, enabled: bool) {
        self.control.set_stall_detection(enabled);
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.control.set_direction(direction);
    }

    pub fn control(&self) -> &ControlFrame {
        &self.control
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Fields from the most recent successful status exchange
    pub fn status_snapshot(&self) -> Option<StatusSnapshot> {
        self.last_snapshot
    }

    pub fn history(&self) -> &TelemetryHistory {
        &self.history
    }

    /// Adopt an already-open transport instead of opening a serial port
    pub fn attach_transport(&mut self, transport: Box<dyn Transport>) {
        self.adapter.attach(transport);
    }

    pub fn on_telemetry(&mut self, callback: TelemetryCallback) -> CallbackHandle {
        let handle = self.allocate_handle();
        self.telemetry_callbacks.insert(handle, callback);
        handle
    }

    pub fn on_connection_changed(&mut self, callback: ConnectionCallback) -> CallbackHandle {
        let handle = self.allocate_handle();
        self.connection_callbacks.insert(handle, callback);
        handle
    }

    /// Returns false if the handle was not registered
    pub fn unregister_callback(&mut self, handle: CallbackHandle) -> bool {
        self.telemetry_callbacks.remove(&handle).is_some()
            || self.connection_callbacks.remove(&handle).is_some()
    }

    fn allocate_handle(&mut self) -> CallbackHandle {
        let handle = CallbackHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }

    /// Begin a polling session against `port_name`
    ///
    /// Discards any previous session's plot history and snapshot. If a
    /// transport is already attached the port name is ignored.
    pub fn start(&mut self, port_name: &str) -> LinkResult<()> {
        self.config.validate()?;
        self.history.clear();
        self.last_snapshot = None;
        if !self.adapter.is_connected() {
            self.adapter.connect(port_name)?;
        }
        self.session_start = Some(Instant::now());
        self.scheduler
            .start(Duration::from_millis(self.config.update_interval_ms));
        self.set_connection(ConnectionState::Online);
        Ok(())
    }

    /// Halt polling and release the transport; safe to call at any time
    pub fn stop(&mut self) {
        self.scheduler.stop();
        self.adapter.disconnect();
    }

    /// Drive the engine; runs one poll cycle when a tick is due
    pub fn poll(&mut self) {
        if self.scheduler.tick_due() {
            self.tick();
        }
    }

    fn tick(&mut self) {
        if self.adapter.send_control(&self.control).is_err() {
            self.go_offline();
            return;
        }
        let status = match self.adapter.request_status(&self.status) {
            Ok(status) => status,
            Err(_) => {
                self.go_offline();
                return;
            }
        };
        self.status = status;
        let snapshot = match self.status.snapshot() {
            Some(snapshot) => snapshot,
            None => return,
        };
        let elapsed_ms = self
            .session_start
            .map(|start| start.elapsed().as_millis() as u64)
            .unwrap_or(0);
        let update = TelemetryUpdate::from_snapshot(&snapshot, elapsed_ms);
        self.history.record(&update);
        self.last_snapshot = Some(snapshot);
        for callback in self.telemetry_callbacks.values() {
            callback(&update);
        }
    }

    fn go_offline(&mut self) {
        self.stop();
        self.set_connection(ConnectionState::Offline);
    }

    fn set_connection(&mut self, state: ConnectionState) {
        if self.connection == state {
            return;
        }
        self.connection = state;
        for callback in self.connection_callbacks.values() {
            callback(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scheduler::{ManualScheduler, ManualTrigger};
    use crate::hardware::MockTransport;
    use std::sync::{Arc, Mutex};

    fn engine_with_mock(mock: MockTransport) -> (PollingEngine, ManualTrigger) {
        let scheduler = ManualScheduler::new();
        let trigger = scheduler.trigger();
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(mock));
        (PollingEngine::new(adapter, Box::new(scheduler)), trigger)
    }

    /// Control echo plus one status reply, as a healthy device produces them
    fn queue_good_cycle(mock: &mut MockTransport, control: &ControlFrame, status: [u8; 6]) {
        let mut stream = control.to_bytes().unwrap();
        stream.extend_from_slice(&StatusFrame::new().header().to_bytes());
        stream.extend_from_slice(&status);
        mock.queue_read(&stream);
    }

    fn status_payload() -> [u8; 6] {
        // pos 2345, overCurrent set, status error, bvdd 60, tj 85, speed 125
        [41, 9, 0b0000_0101, 60, 85, 125]
    }

    #[test]
    fn test_successful_tick_publishes_one_update() {
        let mut mock = MockTransport::new();
        queue_good_cycle(&mut mock, &PollingEngine::default_control(), status_payload());

        let (mut engine, trigger) = engine_with_mock(mock);
        let updates: Arc<Mutex<Vec<TelemetryUpdate>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&updates);
        engine.on_telemetry(Box::new(move |update| {
            sink.lock().unwrap().push(*update);
        }));

        engine.start("mock").unwrap();
        trigger.fire();
        engine.poll();

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let update = updates[0];
        assert_eq!(update.current_position, 2345);
        assert_eq!(update.supply_voltage_v, 12.0);
        assert_eq!(update.junction_temp_c, 25.0);
        assert_eq!(update.rotor_speed_rpm, 1000.0);
        assert!(update.indicators.over_current);
        assert!(update.indicators.device_error);

        assert!(engine.connection_state().is_online());
        assert!(engine.is_running());
        assert_eq!(engine.history().supply_voltage.len(), 1);
        assert!(engine.status_snapshot().is_some());
    }

    #[test]
    fn test_failed_tick_stops_and_reports_offline_once() {
        // nothing queued: the control echo read times out
        let (mut engine, trigger) = engine_with_mock(MockTransport::new());

        let states: Arc<Mutex<Vec<ConnectionState>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&states);
        engine.on_connection_changed(Box::new(move |state| {
            sink.lock().unwrap().push(state);
        }));
        let updates: Arc<Mutex<Vec<TelemetryUpdate>>> = Arc::new(Mutex::new(Vec::new()));
        let update_sink = Arc::clone(&updates);
        engine.on_telemetry(Box::new(move |update| {
            update_sink.lock().unwrap().push(*update);
        }));

        engine.start("mock").unwrap();
        trigger.fire();
        engine.poll();

        let states = states.lock().unwrap();
        assert_eq!(
            states.as_slice(),
            &[ConnectionState::Online, ConnectionState::Offline]
        );
        assert!(updates.lock().unwrap().is_empty());
        assert!(!engine.is_running());
        assert!(!engine.connection_state().is_online());
    }

    #[test]
    fn test_corrupted_echo_goes_offline_without_status_request() {
        let mut mock = MockTransport::new();
        // a full frame's worth of garbage instead of the echo
        mock.queue_read(&[0u8; 10]);
        let (mut engine, trigger) = engine_with_mock(mock);

        engine.start("mock").unwrap();
        trigger.fire();
        engine.poll();

        assert!(!engine.connection_state().is_online());
        assert!(engine.status_snapshot().is_none());
    }

    #[test]
    fn test_restart_clears_history() {
        let mut mock = MockTransport::new();
        queue_good_cycle(&mut mock, &PollingEngine::default_control(), status_payload());

        let (mut engine, trigger) = engine_with_mock(mock);
        engine.start("mock").unwrap();
        trigger.fire();
        engine.poll();
        assert_eq!(engine.history().supply_voltage.len(), 1);

        engine.stop();

        // new session over a fresh transport starts with empty plots
        engine.attach_transport(Box::new(MockTransport::new()));
        engine.start("mock").unwrap();
        assert!(engine.history().supply_voltage.is_empty());
        assert!(engine.status_snapshot().is_none());
    }

    #[test]
    fn test_setters_feed_next_control_frame() {
        let (mut engine, _trigger) = engine_with_mock(MockTransport::new());
        engine.set_new_position(16000);
        engine.set_speed(40);
        engine.set_motor_enabled(true);
        engine.set_direction(Direction::Clockwise);

        assert_eq!(engine.control().new_position(), Some(16000));
        assert_eq!(engine.control().speed(), Some(40));
        assert_eq!(engine.control().motor_enabled(), Some(true));
        assert_eq!(engine.control().direction(), Some(Direction::Clockwise));
    }

    #[test]
    fn test_unregister_callback() {
        let (mut engine, _trigger) = engine_with_mock(MockTransport::new());
        let handle = engine.on_telemetry(Box::new(|_| {}));
        assert!(engine.unregister_callback(handle));
        assert!(!engine.unregister_callback(handle));
    }

    #[test]
    fn test_invalid_config_rejected_on_start() {
        let config = EngineConfig {
            update_interval_ms: 0,
            plot_window: PLOT_WINDOW,
        };
        let mut adapter = LinAdapter::new();
        adapter.attach(Box::new(MockTransport::new()));
        let mut engine =
            PollingEngine::with_config(adapter, Box::new(ManualScheduler::new()), config);
        assert!(matches!(
            engine.start("mock"),
            Err(LinkError::InvalidConfig { .. })
        ));
    }
}
