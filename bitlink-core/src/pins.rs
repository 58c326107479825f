//! Edge-pin state table
//!
//! Tracks each edge pin's configured mode and last observed values, and
//! applies pin-configure commands to the driver. Out-of-range drive
//! requests degrade to a safe value (digital low / servo 0) instead of
//! erroring; unrecognized mode bytes are ignored outright.

use bitlink_protocol::{PinMode, EDGE_PIN_COUNT};

use crate::config::{ANALOG_RANGE, PERCENT_RANGE, SERVO_MAX_DEGREES};
use crate::events::ButtonEvent;
use crate::traits::{PinDriver, PinError};

/// Per-pin mutable record
#[derive(Debug, Clone, Copy, Default)]
struct PinState {
    /// Configured mode; `None` until the host configures the pin
    mode: Option<PinMode>,
    /// Last observed digital level from edge events (0 or 1)
    digital: u8,
    /// Last analog sample, scaled 0-100; stale unless mode is input
    analog: u8,
}

/// State table for the three edge-connector pins
#[derive(Debug, Clone, Copy)]
pub struct PinTable {
    pins: [PinState; EDGE_PIN_COUNT],
}

impl Default for PinTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PinTable {
    /// Create a table with all pins unconfigured
    pub const fn new() -> Self {
        Self {
            pins: [PinState {
                mode: None,
                digital: 0,
                analog: 0,
            }; EDGE_PIN_COUNT],
        }
    }

    /// Apply a pin-configure command
    ///
    /// `mode` and `value` are raw wire bytes. Unknown mode bytes are a
    /// no-op. An out-of-range pin index is an error so the caller can
    /// count the frame as malformed.
    pub fn configure(
        &mut self,
        pin: u8,
        mode: u8,
        value: u8,
        driver: &mut impl PinDriver,
    ) -> Result<(), PinError> {
        let state = self
            .pins
            .get_mut(pin as usize)
            .ok_or(PinError::InvalidPin)?;

        match PinMode::from_byte(mode) {
            Some(PinMode::Output) => {
                if value != 0 && u16::from(value) <= PERCENT_RANGE {
                    driver.set_analog(pin, u16::from(value) * (ANALOG_RANGE / PERCENT_RANGE))?;
                } else {
                    driver.set_digital(pin, false)?;
                }
                state.mode = Some(PinMode::Output);
            }
            Some(PinMode::Input) => {
                // No hardware action; the pin is sampled at encode time
                state.mode = Some(PinMode::Input);
            }
            Some(PinMode::Servo) => {
                let angle = if value != 0 && value <= SERVO_MAX_DEGREES {
                    value
                } else {
                    0
                };
                driver.set_servo(pin, angle)?;
                state.mode = Some(PinMode::Servo);
            }
            None => {}
        }
        Ok(())
    }

    /// Track a raw contact transition on an edge pin
    ///
    /// Always follows edge events regardless of configured mode; event
    /// values other than up/down leave the state unchanged.
    pub fn on_edge_event(&mut self, pin: u8, event: ButtonEvent) {
        if let Some(state) = self.pins.get_mut(pin as usize) {
            if let Some(level) = event.digital_level() {
                state.digital = level;
            }
        }
    }

    /// Sample analog levels for input-configured pins
    ///
    /// Pins in other modes keep their last stored byte. Driver read
    /// failures also leave the stored byte untouched.
    pub fn sample_inputs(&mut self, driver: &mut impl PinDriver) {
        for (index, state) in self.pins.iter_mut().enumerate() {
            if state.mode == Some(PinMode::Input) {
                if let Ok(raw) = driver.read_analog(index as u8) {
                    state.analog =
                        (u32::from(raw) * u32::from(PERCENT_RANGE) / u32::from(ANALOG_RANGE)) as u8;
                }
            }
        }
    }

    /// Configured mode of a pin, if any
    pub fn mode(&self, pin: u8) -> Option<PinMode> {
        self.pins.get(pin as usize).and_then(|state| state.mode)
    }

    /// Digital levels for the telemetry frame
    pub fn digital_states(&self) -> [u8; EDGE_PIN_COUNT] {
        let mut out = [0u8; EDGE_PIN_COUNT];
        for (slot, state) in out.iter_mut().zip(self.pins.iter()) {
            *slot = state.digital;
        }
        out
    }

    /// Analog readings for the telemetry frame
    pub fn analog_states(&self) -> [u8; EDGE_PIN_COUNT] {
        let mut out = [0u8; EDGE_PIN_COUNT];
        for (slot, state) in out.iter_mut().zip(self.pins.iter()) {
            *slot = state.analog;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Driver double recording the last call per pin
    #[derive(Debug, Default)]
    struct RecordingDriver {
        analog: [Option<u16>; EDGE_PIN_COUNT],
        digital: [Option<bool>; EDGE_PIN_COUNT],
        servo: [Option<u8>; EDGE_PIN_COUNT],
        reads: [u16; EDGE_PIN_COUNT],
    }

    impl PinDriver for RecordingDriver {
        fn set_analog(&mut self, pin: u8, value: u16) -> Result<(), PinError> {
            self.analog[pin as usize] = Some(value);
            Ok(())
        }

        fn set_digital(&mut self, pin: u8, high: bool) -> Result<(), PinError> {
            self.digital[pin as usize] = Some(high);
            Ok(())
        }

        fn set_servo(&mut self, pin: u8, angle: u8) -> Result<(), PinError> {
            self.servo[pin as usize] = Some(angle);
            Ok(())
        }

        fn read_analog(&mut self, pin: u8) -> Result<u16, PinError> {
            Ok(self.reads[pin as usize])
        }
    }

    #[test]
    fn test_output_scales_to_native_range() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(0, PinMode::Output.to_byte(), 50, &mut driver).unwrap();
        assert_eq!(driver.analog[0], Some(500)); // 50 * (1024/100)
        assert_eq!(table.mode(0), Some(PinMode::Output));

        table.configure(0, PinMode::Output.to_byte(), 100, &mut driver).unwrap();
        assert_eq!(driver.analog[0], Some(1000));
    }

    #[test]
    fn test_output_out_of_range_degrades_to_low() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(1, PinMode::Output.to_byte(), 0, &mut driver).unwrap();
        assert_eq!(driver.digital[1], Some(false));
        assert_eq!(driver.analog[1], None);

        table.configure(1, PinMode::Output.to_byte(), 101, &mut driver).unwrap();
        assert_eq!(driver.digital[1], Some(false));
        assert_eq!(table.mode(1), Some(PinMode::Output));
    }

    #[test]
    fn test_servo_angle_and_degrade() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(2, PinMode::Servo.to_byte(), 90, &mut driver).unwrap();
        assert_eq!(driver.servo[2], Some(90));

        table.configure(2, PinMode::Servo.to_byte(), 181, &mut driver).unwrap();
        assert_eq!(driver.servo[2], Some(0));

        table.configure(2, PinMode::Servo.to_byte(), 0, &mut driver).unwrap();
        assert_eq!(driver.servo[2], Some(0));
        assert_eq!(table.mode(2), Some(PinMode::Servo));
    }

    #[test]
    fn test_input_mode_has_no_hardware_action() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(0, PinMode::Input.to_byte(), 42, &mut driver).unwrap();
        assert_eq!(table.mode(0), Some(PinMode::Input));
        assert_eq!(driver.analog[0], None);
        assert_eq!(driver.digital[0], None);
        assert_eq!(driver.servo[0], None);
    }

    #[test]
    fn test_unknown_mode_is_noop() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(0, 0x42, 50, &mut driver).unwrap();
        assert_eq!(table.mode(0), None);
        assert_eq!(driver.analog[0], None);
        assert_eq!(driver.digital[0], None);
    }

    #[test]
    fn test_invalid_pin_index() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        let result = table.configure(3, PinMode::Output.to_byte(), 50, &mut driver);
        assert_eq!(result, Err(PinError::InvalidPin));
    }

    #[test]
    fn test_edge_events_track_levels() {
        let mut table = PinTable::new();

        table.on_edge_event(0, ButtonEvent::Down);
        assert_eq!(table.digital_states(), [1, 0, 0]);

        table.on_edge_event(0, ButtonEvent::Up);
        table.on_edge_event(2, ButtonEvent::Down);
        assert_eq!(table.digital_states(), [0, 0, 1]);

        // Hold carries no level
        table.on_edge_event(2, ButtonEvent::Hold);
        assert_eq!(table.digital_states(), [0, 0, 1]);
    }

    #[test]
    fn test_edge_events_independent_of_mode() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();

        table.configure(1, PinMode::Output.to_byte(), 50, &mut driver).unwrap();
        table.on_edge_event(1, ButtonEvent::Down);
        assert_eq!(table.digital_states()[1], 1);
    }

    #[test]
    fn test_sampling_scales_and_skips_unconfigured() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();
        driver.reads = [512, 1023, 0];

        table.configure(0, PinMode::Input.to_byte(), 0, &mut driver).unwrap();
        table.sample_inputs(&mut driver);

        assert_eq!(table.analog_states()[0], 50); // 512 * 100 / 1024
        // Pins 1 and 2 were never configured as input: stale zero
        assert_eq!(table.analog_states()[1], 0);
        assert_eq!(table.analog_states()[2], 0);
    }

    #[test]
    fn test_stale_slot_survives_reconfiguration() {
        let mut table = PinTable::new();
        let mut driver = RecordingDriver::default();
        driver.reads = [512, 0, 0];

        table.configure(0, PinMode::Input.to_byte(), 0, &mut driver).unwrap();
        table.sample_inputs(&mut driver);
        assert_eq!(table.analog_states()[0], 50);

        // Switching the pin to output leaves the last sample in place
        table.configure(0, PinMode::Output.to_byte(), 10, &mut driver).unwrap();
        driver.reads = [900, 0, 0];
        table.sample_inputs(&mut driver);
        assert_eq!(table.analog_states()[0], 50);
    }
}
