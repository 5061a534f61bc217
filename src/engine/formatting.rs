//! Rendering telemetry updates for consuming front ends

use crate::engine::telemetry::TelemetryUpdate;

/// Renders one telemetry record as text
pub trait TelemetryFormatter {
    fn format(&self, update: &TelemetryUpdate) -> String;
}

/// Single human-readable line per update
pub struct TextFormatter;

impl TelemetryFormatter for TextFormatter {
    fn format(&self, update: &TelemetryUpdate) -> String {
        let mut line = format!(
            "t={:.1}s pos={} bvdd={:.1}V tj={:.0}C speed={:.0}rpm",
            update.elapsed_s,
            update.current_position,
            update.supply_voltage_v,
            update.junction_temp_c,
            update.rotor_speed_rpm,
        );
        let flags = &update.indicators;
        for (set, label) in [
            (flags.device_error, "ERROR"),
            (flags.over_current, "OC"),
            (flags.over_temperature, "OT"),
            (flags.stall_detected, "STALL"),
            (flags.lin_error, "LIN"),
        ] {
            if set {
                line.push(' ');
                line.push_str(label);
            }
        }
        line
    }
}

/// One JSON object per update
pub struct JsonFormatter;

impl TelemetryFormatter for JsonFormatter {
    fn format(&self, update: &TelemetryUpdate) -> String {
        serde_json::to_string(update).unwrap_or_else(|_| "{}".to_string())
    }
}
