//! Bitlink host communication protocol
//!
//! This crate defines the BLE-carried protocol between the board and a
//! visual-programming host. Two logical channels run over one GATT
//! service, each frame at most 20 bytes:
//!
//! # Protocol Overview
//!
//! Outbound (board → host), fixed 20-byte telemetry frame:
//! ```text
//! ┌─────────┬─────────┬──────┬──────┬──────────┬──────────┬──────────┬──────┬──────────┐
//! │ ACCEL X │ ACCEL Y │ BTN A│ BTN B│ PIN DIG  │ GESTURES │ PIN ANA  │ TEMP │ RESERVED │
//! │ 2B (BE) │ 2B (BE) │ 1B   │ 1B   │ 3B       │ 1B       │ 3B       │ 1B   │ 6B zero  │
//! └─────────┴─────────┴──────┴──────┴──────────┴──────────┴──────────┴──────┴──────────┘
//! ```
//!
//! Inbound (host → board), variable length, first byte selects the
//! command: pin-configure (0x80), display-text (0x81), display-bitmap
//! (0x82). Payload shapes are defined in [`command`].
//!
//! The board acts as a peripheral "I/O terminal" — all program logic
//! stays on the host; the board only reports state and executes pin and
//! display commands.

#![no_std]
#![deny(unsafe_code)]

pub mod command;
pub mod telemetry;
pub mod types;

pub use command::{Command, DecodeError, CMD_DISPLAY_BITMAP, CMD_DISPLAY_TEXT, CMD_PIN_CONFIG};
pub use telemetry::{TelemetryFrame, EDGE_PIN_COUNT, TELEMETRY_FRAME_SIZE};
pub use types::{ButtonState, Gesture, PinMode};
