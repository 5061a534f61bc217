//! Typed HVC frames
//!
//! Each frame type binds a fixed 3-byte header to a static payload layout.
//! Outgoing frames (control, diagnostic request) start with every field
//! unset and refuse to encode until all fields are assigned. Incoming
//! frames (status, diagnostic response) are either empty decode templates
//! or constructed directly from received bytes. `from_bytes` repopulates a
//! frame in place and leaves it untouched when decoding fails.

use crate::core::{
    Direction, FrameId, HvcStatus, OpMode, CONTROLLER_SYNC, DEVICE_SYNC, HEADER_LEN,
};
use crate::protocol::codec::{self, DecodeError, EncodeError, FieldKind, FieldSpec};
use serde::{Deserialize, Serialize};

/// Plain 3-byte frame header: sync, frame ID, payload length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub sync: u8,
    pub id: FrameId,
    pub data_length: u8,
}

impl FrameHeader {
    pub const fn new(sync: u8, id: FrameId, data_length: u8) -> Self {
        Self {
            sync,
            id,
            data_length,
        }
    }

    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        [self.sync, self.id as u8, self.data_length]
    }

    /// Total frame length on the wire, header included
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.data_length as usize
    }
}

const CONTROL_LAYOUT: &[FieldSpec] = &[
    FieldSpec::new("init_current_pos", FieldKind::IntLe16),
    FieldSpec::new("new_pos", FieldKind::IntLe16),
    FieldSpec::new("speed", FieldKind::Uint(8)),
    FieldSpec::new("reserved", FieldKind::Pad(8)),
    FieldSpec::new("reserved", FieldKind::Pad(3)),
    FieldSpec::new("op_mode", FieldKind::Uint(1)),
    FieldSpec::new("enable", FieldKind::Uint(1)),
    FieldSpec::new("enable_stall_detection", FieldKind::Uint(1)),
    FieldSpec::new("direction", FieldKind::Uint(2)),
];

const STATUS_LAYOUT: &[FieldSpec] = &[
    FieldSpec::new("current_pos", FieldKind::IntLe16),
    FieldSpec::new("reserved", FieldKind::Pad(2)),
    FieldSpec::new("lin_error", FieldKind::Uint(1)),
    FieldSpec::new("stall_detected", FieldKind::Uint(1)),
    FieldSpec::new("over_temperature", FieldKind::Uint(1)),
    FieldSpec::new("over_current", FieldKind::Uint(1)),
    FieldSpec::new("hvc_status", FieldKind::Uint(2)),
    FieldSpec::new("bvdd", FieldKind::Uint(8)),
    FieldSpec::new("tj", FieldKind::Uint(8)),
    FieldSpec::new("current_speed", FieldKind::Uint(8)),
];

const DIAG_LAYOUT: &[FieldSpec] = &[
    FieldSpec::new("nad", FieldKind::Uint(8)),
    FieldSpec::new("pci", FieldKind::Uint(8)),
    FieldSpec::new("sid", FieldKind::Uint(8)),
    FieldSpec::new("d1", FieldKind::Uint(8)),
    FieldSpec::new("d2", FieldKind::Uint(8)),
    FieldSpec::new("d3", FieldKind::Uint(8)),
    FieldSpec::new("d4", FieldKind::Uint(8)),
    FieldSpec::new("d5", FieldKind::Uint(8)),
];

fn check_frame_len(header: &FrameHeader, bytes: &[u8]) -> Result<(), DecodeError> {
    if bytes.len() != header.frame_len() {
        return Err(DecodeError::LengthMismatch {
            expected: header.frame_len(),
            actual: bytes.len(),
        });
    }
    Ok(())
}

fn bit_bool(value: i64) -> bool {
    value != 0
}

/// Control frame: desired device behavior, controller to device (ID 0x30)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlFrame {
    header: FrameHeader,
    init_position: Option<i16>,
    new_position: Option<i16>,
    speed: Option<u8>,
    op_mode: Option<OpMode>,
    motor_enabled: Option<bool>,
    stall_detection: Option<bool>,
    direction: Option<Direction>,
}

impl ControlFrame {
    pub const HEADER: FrameHeader = FrameHeader::new(CONTROLLER_SYNC, FrameId::Control, 7);

    /// Create a control frame with every payload field unset
    pub fn new() -> Self {
        debug_assert_eq!(codec::packed_len(CONTROL_LAYOUT) as u8, 7);
        Self {
            header: Self::HEADER,
            init_position: None,
            new_position: None,
            speed: None,
            op_mode: None,
            motor_enabled: None,
            stall_detection: None,
            direction: None,
        }
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn init_position(&self) -> Option<i16> {
        self.init_position
    }

    pub fn set_init_position(&mut self, pos: i16) {
        self.init_position = Some(pos);
    }

    pub fn new_position(&self) -> Option<i16> {
        self.new_position
    }

    pub fn set_new_position(&mut self, pos: i16) {
        self.new_position = Some(pos);
    }

    pub fn speed(&self) -> Option<u8> {
        self.speed
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.speed = Some(speed);
    }

    pub fn op_mode(&self) -> Option<OpMode> {
        self.op_mode
    }

    pub fn set_op_mode(&mut self, mode: OpMode) {
        self.op_mode = Some(mode);
    }

    pub fn motor_enabled(&self) -> Option<bool> {
        self.motor_enabled
    }

    pub fn set_motor_enabled(&mut self, enabled: bool) {
        self.motor_enabled = Some(enabled);
    }

    pub fn stall_detection(&self) -> Option<bool> {
        self.stall_detection
    }

    pub fn set_stall_detection(&mut self, enabled: bool) {
        self.stall_detection = Some(enabled);
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    fn values(&self) -> [Option<i64>; 7] {
        [
            self.init_position.map(i64::from),
            self.new_position.map(i64::from),
            self.speed.map(i64::from),
            self.op_mode.map(|m| m as i64),
            self.motor_enabled.map(i64::from),
            self.stall_detection.map(i64::from),
            self.direction.map(|d| d as i64),
        ]
    }

    /// Encode header and payload, failing on any unset field
    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut bytes = self.header.to_bytes().to_vec();
        bytes.extend(codec::encode(CONTROL_LAYOUT, &self.values())?);
        Ok(bytes)
    }

    /// Repopulate every payload field from a full frame byte sequence
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        check_frame_len(&self.header, bytes)?;
        let values = codec::decode(CONTROL_LAYOUT, &bytes[HEADER_LEN..])?;

        let op_mode = OpMode::from_bits(values[3] as u8).ok_or(DecodeError::InvalidEnum {
            field: "op_mode",
            value: values[3] as u8,
        })?;
        let direction = Direction::from_bits(values[6] as u8).ok_or(DecodeError::InvalidEnum {
            field: "direction",
            value: values[6] as u8,
        })?;

        self.init_position = Some(values[0] as i16);
        self.new_position = Some(values[1] as i16);
        self.speed = Some(values[2] as u8);
        self.op_mode = Some(op_mode);
        self.motor_enabled = Some(bit_bool(values[4]));
        self.stall_detection = Some(bit_bool(values[5]));
        self.direction = Some(direction);
        Ok(())
    }
}

impl Default for ControlFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Status frame: last reported device state, device to controller (ID 0x31)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFrame {
    header: FrameHeader,
    current_pos: Option<i16>,
    lin_error: Option<bool>,
    stall_detected: Option<bool>,
    over_temperature: Option<bool>,
    over_current: Option<bool>,
    hvc_status: Option<HvcStatus>,
    bvdd: Option<u8>,
    tj: Option<u8>,
    current_speed: Option<u8>,
}

impl StatusFrame {
    pub const HEADER: FrameHeader = FrameHeader::new(DEVICE_SYNC, FrameId::Status, 6);

    /// Create an empty status frame, used as a decode template
    pub fn new() -> Self {
        debug_assert_eq!(codec::packed_len(STATUS_LAYOUT) as u8, 6);
        Self {
            header: Self::HEADER,
            current_pos: None,
            lin_error: None,
            stall_detected: None,
            over_temperature: None,
            over_current: None,
            hvc_status: None,
            bvdd: None,
            tj: None,
            current_speed: None,
        }
    }

    /// Construct a status frame directly from received bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut frame = Self::new();
        frame.from_bytes(bytes)?;
        Ok(frame)
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn current_pos(&self) -> Option<i16> {
        self.current_pos
    }

    pub fn current_speed(&self) -> Option<u8> {
        self.current_speed
    }

    pub fn bvdd(&self) -> Option<u8> {
        self.bvdd
    }

    pub fn tj(&self) -> Option<u8> {
        self.tj
    }

    pub fn hvc_status(&self) -> Option<HvcStatus> {
        self.hvc_status
    }

    pub fn is_over_current(&self) -> Option<bool> {
        self.over_current
    }

    pub fn is_over_temperature(&self) -> Option<bool> {
        self.over_temperature
    }

    pub fn is_stall_detected(&self) -> Option<bool> {
        self.stall_detected
    }

    pub fn is_lin_error(&self) -> Option<bool> {
        self.lin_error
    }

    /// Repopulate every payload field from a full frame byte sequence
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        check_frame_len(&self.header, bytes)?;
        let values = codec::decode(STATUS_LAYOUT, &bytes[HEADER_LEN..])?;

        let hvc_status = HvcStatus::from_bits(values[5] as u8).ok_or(DecodeError::InvalidEnum {
            field: "hvc_status",
            value: values[5] as u8,
        })?;

        self.current_pos = Some(values[0] as i16);
        self.lin_error = Some(bit_bool(values[1]));
        self.stall_detected = Some(bit_bool(values[2]));
        self.over_temperature = Some(bit_bool(values[3]));
        self.over_current = Some(bit_bool(values[4]));
        self.hvc_status = Some(hvc_status);
        self.bvdd = Some(values[6] as u8);
        self.tj = Some(values[7] as u8);
        self.current_speed = Some(values[8] as u8);
        Ok(())
    }

    /// Plain-value view of a fully populated frame
    pub fn snapshot(&self) -> Option<StatusSnapshot> {
        Some(StatusSnapshot {
            current_pos: self.current_pos?,
            current_speed: self.current_speed?,
            bvdd: self.bvdd?,
            tj: self.tj?,
            hvc_status: self.hvc_status?,
            over_current: self.over_current?,
            over_temperature: self.over_temperature?,
            stall_detected: self.stall_detected?,
            lin_error: self.lin_error?,
        })
    }
}

impl Default for StatusFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of a decoded status frame, consumed by the UI layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub current_pos: i16,
    pub current_speed: u8,
    pub bvdd: u8,
    pub tj: u8,
    pub hvc_status: HvcStatus,
    pub over_current: bool,
    pub over_temperature: bool,
    pub stall_detected: bool,
    pub lin_error: bool,
}

/// Diagnostic request frame, controller to device (ID 0x3C)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagSendFrame {
    header: FrameHeader,
    fields: [Option<u8>; 8],
}

impl DiagSendFrame {
    pub const HEADER: FrameHeader = FrameHeader::new(CONTROLLER_SYNC, FrameId::DiagSend, 8);

    pub fn new() -> Self {
        debug_assert_eq!(codec::packed_len(DIAG_LAYOUT) as u8, 8);
        Self {
            header: Self::HEADER,
            fields: [None; 8],
        }
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn nad(&self) -> Option<u8> {
        self.fields[0]
    }

    pub fn set_nad(&mut self, nad: u8) {
        self.fields[0] = Some(nad);
    }

    pub fn pci(&self) -> Option<u8> {
        self.fields[1]
    }

    pub fn set_pci(&mut self, pci: u8) {
        self.fields[1] = Some(pci);
    }

    pub fn sid(&self) -> Option<u8> {
        self.fields[2]
    }

    pub fn set_sid(&mut self, sid: u8) {
        self.fields[2] = Some(sid);
    }

    /// Data byte accessor, index 1..=5
    pub fn data(&self, index: usize) -> Option<u8> {
        self.fields[2 + index]
    }

    pub fn set_data(&mut self, index: usize, value: u8) {
        self.fields[2 + index] = Some(value);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let values: Vec<Option<i64>> = self.fields.iter().map(|f| f.map(i64::from)).collect();
        let mut bytes = self.header.to_bytes().to_vec();
        bytes.extend(codec::encode(DIAG_LAYOUT, &values)?);
        Ok(bytes)
    }

    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        check_frame_len(&self.header, bytes)?;
        let values = codec::decode(DIAG_LAYOUT, &bytes[HEADER_LEN..])?;
        for (slot, value) in self.fields.iter_mut().zip(values) {
            *slot = Some(value as u8);
        }
        Ok(())
    }
}

impl Default for DiagSendFrame {
    fn default() -> Self {
        Self::new()
    }
}

/// Diagnostic response frame, device to controller (ID 0x3D)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagRecFrame {
    header: FrameHeader,
    fields: [Option<u8>; 8],
}

impl DiagRecFrame {
    pub const HEADER: FrameHeader = FrameHeader::new(DEVICE_SYNC, FrameId::DiagRec, 8);

    /// Create an empty response frame, used as a decode template
    pub fn new() -> Self {
        Self {
            header: Self::HEADER,
            fields: [None; 8],
        }
    }

    /// Construct a response frame directly from received bytes
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut frame = Self::new();
        frame.from_bytes(bytes)?;
        Ok(frame)
    }

    pub fn header(&self) -> &FrameHeader {
        &self.header
    }

    pub fn nad(&self) -> Option<u8> {
        self.fields[0]
    }

    pub fn pci(&self) -> Option<u8> {
        self.fields[1]
    }

    pub fn sid(&self) -> Option<u8> {
        self.fields[2]
    }

    /// Data byte accessor, index 1..=5
    pub fn data(&self, index: usize) -> Option<u8> {
        self.fields[2 + index]
    }

    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        check_frame_len(&self.header, bytes)?;
        let values = codec::decode(DIAG_LAYOUT, &bytes[HEADER_LEN..])?;
        for (slot, value) in self.fields.iter_mut().zip(values) {
            *slot = Some(value as u8);
        }
        Ok(())
    }
}

impl Default for DiagRecFrame {
    fn default() -> Self {
        Self::new()
    }
}
