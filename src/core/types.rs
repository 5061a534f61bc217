//! Domain enumerations for the HVC motor driver protocol
//!
//! Every enum carries the exact wire encoding of the device, including the
//! gap in `Direction` (value 2 is reserved by the firmware and never sent).

use serde::{Deserialize, Serialize};

/// Frame type identifiers as they appear in the header's ID byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FrameId {
    /// Control frame, controller to device
    Control = 0x30,
    /// Status frame, device to controller
    Status = 0x31,
    /// Diagnostic request, controller to device
    DiagSend = 0x3C,
    /// Diagnostic response, device to controller
    DiagRec = 0x3D,
}

impl FrameId {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x30 => Some(FrameId::Control),
            0x31 => Some(FrameId::Status),
            0x3C => Some(FrameId::DiagSend),
            0x3D => Some(FrameId::DiagRec),
            _ => None,
        }
    }
}

/// Rotor direction command
///
/// Value 2 is reserved by the device and intentionally has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Stop = 0,
    Clockwise = 1,
    AntiClockwise = 3,
}

impl Direction {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Direction::Stop),
            1 => Some(Direction::Clockwise),
            3 => Some(Direction::AntiClockwise),
            _ => None,
        }
    }
}

/// Motor control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpMode {
    PositionCtrl = 0,
    SpeedCtrl = 1,
}

impl OpMode {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(OpMode::PositionCtrl),
            1 => Some(OpMode::SpeedCtrl),
            _ => None,
        }
    }
}

/// Overall device status reported in the status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum HvcStatus {
    Operating = 0,
    Error = 1,
}

impl HvcStatus {
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(HvcStatus::Operating),
            1 => Some(HvcStatus::Error),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, HvcStatus::Error)
    }
}

/// Target reachability as seen by the polling engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionState {
    Online,
    Offline,
}

impl ConnectionState {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online)
    }
}
