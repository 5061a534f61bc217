//! Core types and constants for the HVC link

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
