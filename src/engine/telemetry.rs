//! Telemetry records and bounded plot history
//!
//! Raw status fields are scaled into engineering units here: supply
//! voltage in volts, junction temperature in degrees Celsius and rotor
//! speed in rpm.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{BVDD_FACTOR, PLOT_WINDOW, RPM_FACTOR, TIMEBASE_FACTOR, TJ_OFFSET};
use crate::protocol::StatusSnapshot;

/// Bounded x/y series backing one live plot
///
/// Once `capacity` points are held, each new point evicts the oldest.
#[derive(Debug, Clone)]
pub struct PlotData {
    capacity: usize,
    x: VecDeque<f64>,
    y: VecDeque<f64>,
}

impl PlotData {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            x: VecDeque::with_capacity(capacity),
            y: VecDeque::with_capacity(capacity),
        }
    }

    pub fn add(&mut self, x: f64, y: f64) {
        if self.x.len() == self.capacity {
            self.x.pop_front();
            self.y.pop_front();
        }
        self.x.push_back(x);
        self.y.push_back(y);
    }

    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn last(&self) -> Option<(f64, f64)> {
        Some((*self.x.back()?, *self.y.back()?))
    }

    /// Paired (x, y) points in insertion order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

impl Default for PlotData {
    fn default() -> Self {
        Self::new(PLOT_WINDOW)
    }
}

/// Fault and status bits reported in one poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusIndicators {
    pub device_error: bool,
    pub over_current: bool,
    pub over_temperature: bool,
    pub stall_detected: bool,
    pub lin_error: bool,
}

impl From<&StatusSnapshot> for StatusIndicators {
    fn from(snapshot: &StatusSnapshot) -> Self {
        Self {
            device_error: snapshot.hvc_status.is_error(),
            over_current: snapshot.over_current,
            over_temperature: snapshot.over_temperature,
            stall_detected: snapshot.stall_detected,
            lin_error: snapshot.lin_error,
        }
    }
}

/// One published telemetry record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetryUpdate {
    /// Seconds since the session started
    pub elapsed_s: f64,
    pub supply_voltage_v: f64,
    pub junction_temp_c: f64,
    pub rotor_speed_rpm: f64,
    pub current_position: i16,
    pub current_speed_raw: u8,
    pub indicators: StatusIndicators,
}

impl TelemetryUpdate {
    pub fn from_snapshot(snapshot: &StatusSnapshot, elapsed_ms: u64) -> Self {
        Self {
            elapsed_s: elapsed_ms as f64 / TIMEBASE_FACTOR,
            supply_voltage_v: f64::from(snapshot.bvdd) * BVDD_FACTOR,
            junction_temp_c: f64::from(snapshot.tj) + TJ_OFFSET,
            rotor_speed_rpm: f64::from(snapshot.current_speed) * RPM_FACTOR,
            current_position: snapshot.current_pos,
            current_speed_raw: snapshot.current_speed,
            indicators: StatusIndicators::from(snapshot),
        }
    }
}

/// The three live plot series kept across a session
#[derive(Debug, Clone)]
pub struct TelemetryHistory {
    pub supply_voltage: PlotData,
    pub junction_temp: PlotData,
    pub rotor_speed: PlotData,
}

impl TelemetryHistory {
    pub fn new(window: usize) -> Self {
        Self {
            supply_voltage: PlotData::new(window),
            junction_temp: PlotData::new(window),
            rotor_speed: PlotData::new(window),
        }
    }

    pub fn clear(&mut self) {
        self.supply_voltage.clear();
        self.junction_temp.clear();
        self.rotor_speed.clear();
    }

    pub fn record(&mut self, update: &TelemetryUpdate) {
        self.supply_voltage.add(update.elapsed_s, update.supply_voltage_v);
        self.junction_temp.add(update.elapsed_s, update.junction_temp_c);
        self.rotor_speed.add(update.elapsed_s, update.rotor_speed_rpm);
    }
}

impl Default for TelemetryHistory {
    fn default() -> Self {
        Self::new(PLOT_WINDOW)
    }
}
