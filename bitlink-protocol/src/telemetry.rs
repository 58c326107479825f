//! Telemetry frame encoding
//!
//! The board pushes one fixed-size frame per notify. Field offsets are
//! fixed; slots for unconfigured analog pins carry whatever value was
//! last stored there, so the frame size never varies.

use crate::types::ButtonState;

/// Telemetry frame size in bytes, fixed regardless of pin configuration
pub const TELEMETRY_FRAME_SIZE: usize = 20;

/// Number of edge-connector pins reported per frame
pub const EDGE_PIN_COUNT: usize = 3;

// Field offsets within the frame
const OFFSET_ACCEL_X: usize = 0;
const OFFSET_ACCEL_Y: usize = 2;
const OFFSET_BUTTON_A: usize = 4;
const OFFSET_BUTTON_B: usize = 5;
const OFFSET_PIN_DIGITAL: usize = 6;
const OFFSET_GESTURES: usize = 9;
const OFFSET_PIN_ANALOG: usize = 10;
const OFFSET_TEMPERATURE: usize = 13;

/// Mask of the gesture bits that are defined on the wire
const GESTURE_MASK_BITS: u8 = 0b0000_0111;

/// One snapshot of reportable board state
///
/// Built fresh for every encode; the struct has no persistent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryFrame {
    /// Filtered accelerometer X, big-endian on the wire
    pub accel_x: i16,
    /// Filtered accelerometer Y, big-endian on the wire
    pub accel_y: i16,
    /// Button A state
    pub button_a: ButtonState,
    /// Button B state
    pub button_b: ButtonState,
    /// Last observed digital level per edge pin (0 or 1)
    pub pin_digital: [u8; EDGE_PIN_COUNT],
    /// Gesture mask (bit0 shake, bit1 jump, bit2 move)
    pub gestures: u8,
    /// Last sampled analog reading per edge pin, scaled 0-100
    ///
    /// Only meaningful for pins configured as input; other slots hold
    /// stale values.
    pub pin_analog: [u8; EDGE_PIN_COUNT],
    /// Last temperature sample in whole degrees Celsius
    ///
    /// Truncated to a single signed byte on the wire.
    pub temperature: i16,
}

impl TelemetryFrame {
    /// Encode into the fixed wire layout
    ///
    /// Pure function of the snapshot; repeated calls produce identical
    /// bytes. Reserved trailing bytes are zero.
    pub fn encode(&self) -> [u8; TELEMETRY_FRAME_SIZE] {
        let mut buf = [0u8; TELEMETRY_FRAME_SIZE];

        let x = self.accel_x.to_be_bytes();
        let y = self.accel_y.to_be_bytes();
        buf[OFFSET_ACCEL_X] = x[0];
        buf[OFFSET_ACCEL_X + 1] = x[1];
        buf[OFFSET_ACCEL_Y] = y[0];
        buf[OFFSET_ACCEL_Y + 1] = y[1];

        buf[OFFSET_BUTTON_A] = self.button_a.to_byte();
        buf[OFFSET_BUTTON_B] = self.button_b.to_byte();

        buf[OFFSET_PIN_DIGITAL..OFFSET_PIN_DIGITAL + EDGE_PIN_COUNT]
            .copy_from_slice(&self.pin_digital);

        buf[OFFSET_GESTURES] = self.gestures & GESTURE_MASK_BITS;

        buf[OFFSET_PIN_ANALOG..OFFSET_PIN_ANALOG + EDGE_PIN_COUNT]
            .copy_from_slice(&self.pin_analog);

        buf[OFFSET_TEMPERATURE] = self.temperature as u8;

        buf
    }
}

impl Default for TelemetryFrame {
    fn default() -> Self {
        Self {
            accel_x: 0,
            accel_y: 0,
            button_a: ButtonState::Up,
            button_b: ButtonState::Up,
            pin_digital: [0; EDGE_PIN_COUNT],
            gestures: 0,
            pin_analog: [0; EDGE_PIN_COUNT],
            temperature: 0,
        }
    }
}
