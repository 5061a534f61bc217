//! Wire protocol for the HVC motor driver
//!
//! Frames are a 3-byte plain header followed by a bit-packed payload. The
//! codec consumes static layout tables; the frame types in [`frames`] bind
//! those layouts to fixed headers and named fields.

pub mod codec;
pub mod frames;

pub use codec::{DecodeError, EncodeError, FieldKind, FieldSpec};
pub use frames::{
    ControlFrame, DiagRecFrame, DiagSendFrame, FrameHeader, StatusFrame, StatusSnapshot,
};
