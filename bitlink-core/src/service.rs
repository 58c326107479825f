//! Service facade tying board state to the wire protocol
//!
//! `BridgeService` is the single owning context for all mutable protocol
//! state. Three call paths touch it: board events, the periodic
//! telemetry encode, and inbound command dispatch. Every entry point
//! runs to completion without suspending, so on a cooperative executor
//! each call is atomic by construction; preemptive targets must wrap the
//! service in a mutual-exclusion scope.

use bitlink_protocol::{ButtonState, Command, DecodeError, Gesture, TelemetryFrame, TELEMETRY_FRAME_SIZE};

use crate::config::DEFAULT_SCROLL_SPEED_MS;
use crate::events::{BoardEvent, Button};
use crate::filter::AccelFilter;
use crate::gesture::GestureDebouncer;
use crate::pins::PinTable;
use crate::traits::display::DISPLAY_SIZE;
use crate::traits::{DisplayError, DisplaySink, PinDriver, PinError};

/// Errors surfaced to the calling task for logging
///
/// Never propagated to the host protocol; malformed frames are counted
/// and dropped instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServiceError {
    /// Pin driver failure
    Pin(PinError),
    /// Display sink failure
    Display(DisplayError),
}

impl From<PinError> for ServiceError {
    fn from(err: PinError) -> Self {
        ServiceError::Pin(err)
    }
}

impl From<DisplayError> for ServiceError {
    fn from(err: DisplayError) -> Self {
        ServiceError::Display(err)
    }
}

/// Protocol state owned by the bridge
#[derive(Debug, Clone, Copy)]
pub struct BridgeService {
    filter: AccelFilter,
    gestures: GestureDebouncer,
    pins: PinTable,
    button_a: ButtonState,
    button_b: ButtonState,
    /// Last event-pushed temperature; truncated to a byte at encode
    temperature: i16,
    /// Inbound frames dropped for being shorter than their opcode needs
    malformed_frames: u32,
}

impl Default for BridgeService {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeService {
    /// Create a service with everything at rest
    pub const fn new() -> Self {
        Self {
            filter: AccelFilter::new(),
            gestures: GestureDebouncer::new(),
            pins: PinTable::new(),
            button_a: ButtonState::Up,
            button_b: ButtonState::Up,
            temperature: 0,
            malformed_frames: 0,
        }
    }

    /// Dispatch one board event
    pub fn on_event(&mut self, event: BoardEvent, now_ms: u64) {
        match event {
            BoardEvent::Accel(sample) => {
                if self.filter.update(sample) {
                    self.gestures.trigger(Gesture::Move, now_ms);
                }
            }
            BoardEvent::Shake => self.gestures.trigger(Gesture::Shake, now_ms),
            BoardEvent::Freefall => self.gestures.trigger(Gesture::Jump, now_ms),
            BoardEvent::Button { which, event } => {
                let state = ButtonState::from(event);
                match which {
                    Button::A => self.button_a = state,
                    Button::B => self.button_b = state,
                }
            }
            BoardEvent::PinEdge { pin, event } => self.pins.on_edge_event(pin, event),
            BoardEvent::Temperature(celsius) => self.temperature = celsius,
        }
    }

    /// Snapshot current state into a telemetry frame
    ///
    /// Sweeps gesture timeouts and samples input-configured pins; has no
    /// other side effects, so absent intervening state changes repeated
    /// calls produce identical bytes.
    pub fn encode_telemetry(
        &mut self,
        now_ms: u64,
        driver: &mut impl PinDriver,
    ) -> [u8; TELEMETRY_FRAME_SIZE] {
        self.gestures.tick(now_ms);
        self.pins.sample_inputs(driver);

        TelemetryFrame {
            accel_x: self.filter.x(),
            accel_y: self.filter.y(),
            button_a: self.button_a,
            button_b: self.button_b,
            pin_digital: self.pins.digital_states(),
            gestures: self.gestures.mask(),
            pin_analog: self.pins.analog_states(),
            temperature: self.temperature,
        }
        .encode()
    }

    /// Decode and dispatch one inbound command frame
    ///
    /// Malformed frames (short, or naming a pin off the connector) are
    /// counted and swallowed; unknown opcodes are silently ignored.
    /// Driver and display failures bubble up for logging only.
    pub fn handle_command(
        &mut self,
        bytes: &[u8],
        driver: &mut impl PinDriver,
        display: &mut impl DisplaySink,
    ) -> Result<(), ServiceError> {
        let command = match Command::decode(bytes) {
            Ok(command) => command,
            Err(DecodeError::Empty | DecodeError::Truncated) => {
                self.malformed_frames = self.malformed_frames.wrapping_add(1);
                return Ok(());
            }
            Err(DecodeError::UnknownOpcode) => return Ok(()),
        };

        match command {
            Command::PinConfig { pin, mode, value } => {
                match self.pins.configure(pin, mode, value, driver) {
                    Err(PinError::InvalidPin) => {
                        self.malformed_frames = self.malformed_frames.wrapping_add(1);
                        Ok(())
                    }
                    other => other.map_err(ServiceError::from),
                }
            }
            Command::DisplayText(text) => {
                display.stop_animation();
                if text.len() > 1 {
                    display.scroll(text, DEFAULT_SCROLL_SPEED_MS)?;
                } else {
                    display.print(text)?;
                }
                Ok(())
            }
            Command::DisplayBitmap(rows) => {
                display.stop_animation();
                for (y, row) in rows.iter().enumerate() {
                    for x in 0..DISPLAY_SIZE {
                        let brightness = if row & (1u8 << x) != 0 { 255 } else { 0 };
                        display.set_pixel(x, y as u8, brightness)?;
                    }
                }
                Ok(())
            }
        }
    }

    /// Number of malformed inbound frames dropped so far
    pub fn malformed_frames(&self) -> u32 {
        self.malformed_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{AccelSample, ButtonEvent};
    use bitlink_protocol::{CMD_DISPLAY_BITMAP, CMD_DISPLAY_TEXT, CMD_PIN_CONFIG};

    #[derive(Debug, Default)]
    struct FakePins {
        analog_out: [Option<u16>; 3],
        reads: [u16; 3],
    }

    impl PinDriver for FakePins {
        fn set_analog(&mut self, pin: u8, value: u16) -> Result<(), PinError> {
            self.analog_out[pin as usize] = Some(value);
            Ok(())
        }

        fn set_digital(&mut self, _pin: u8, _high: bool) -> Result<(), PinError> {
            Ok(())
        }

        fn set_servo(&mut self, _pin: u8, _angle: u8) -> Result<(), PinError> {
            Ok(())
        }

        fn read_analog(&mut self, pin: u8) -> Result<u16, PinError> {
            Ok(self.reads[pin as usize])
        }
    }

    /// Display double: 5x5 brightness grid plus animation bookkeeping
    #[derive(Debug, Default)]
    struct FakeDisplay {
        pixels: [[u8; 5]; 5],
        scrolling: Option<(usize, u16)>,
        stops: u32,
    }

    impl DisplaySink for FakeDisplay {
        fn stop_animation(&mut self) {
            self.scrolling = None;
            self.stops += 1;
        }

        fn scroll(&mut self, text: &[u8], speed_ms: u16) -> Result<(), DisplayError> {
            self.scrolling = Some((text.len(), speed_ms));
            Ok(())
        }

        fn print(&mut self, _text: &[u8]) -> Result<(), DisplayError> {
            Ok(())
        }

        fn set_pixel(&mut self, x: u8, y: u8, brightness: u8) -> Result<(), DisplayError> {
            self.pixels[y as usize][x as usize] = brightness;
            Ok(())
        }
    }

    #[test]
    fn test_configured_input_shows_up_in_telemetry() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();
        pins.reads = [512, 0, 0];

        service
            .handle_command(&[CMD_PIN_CONFIG, 0, 2, 0], &mut pins, &mut display)
            .unwrap();
        let frame = service.encode_telemetry(0, &mut pins);

        assert_eq!(frame[10], 50); // 512 scaled to 0-100
        assert_eq!(frame.len(), 20);
    }

    #[test]
    fn test_malformed_frames_counted_and_dropped() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();

        service
            .handle_command(&[CMD_PIN_CONFIG, 0], &mut pins, &mut display)
            .unwrap();
        service.handle_command(&[], &mut pins, &mut display).unwrap();
        // Pin off the connector counts too
        service
            .handle_command(&[CMD_PIN_CONFIG, 7, 1, 50], &mut pins, &mut display)
            .unwrap();

        assert_eq!(service.malformed_frames(), 3);
        assert_eq!(pins.analog_out, [None, None, None]);
    }

    #[test]
    fn test_unknown_opcode_ignored_without_counting() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();

        service
            .handle_command(&[0x42, 1, 2, 3], &mut pins, &mut display)
            .unwrap();

        assert_eq!(service.malformed_frames(), 0);
        assert_eq!(display.stops, 0);
    }

    #[test]
    fn test_display_text_scrolls_when_long() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();

        service
            .handle_command(b"\x81hello", &mut pins, &mut display)
            .unwrap();

        assert_eq!(display.scrolling, Some((5, DEFAULT_SCROLL_SPEED_MS)));
        assert_eq!(display.stops, 1);
    }

    #[test]
    fn test_display_text_prints_single_char() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();

        service
            .handle_command(&[CMD_DISPLAY_TEXT, b'A'], &mut pins, &mut display)
            .unwrap();

        assert_eq!(display.scrolling, None);
        assert_eq!(display.stops, 1);
    }

    #[test]
    fn test_display_bitmap_diagonal() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();
        let mut display = FakeDisplay::default();

        service
            .handle_command(
                &[CMD_DISPLAY_BITMAP, 0b00001, 0b00010, 0b00100, 0b01000],
                &mut pins,
                &mut display,
            )
            .unwrap();

        // Exactly one pixel per addressed row, on the diagonal
        for y in 0..4 {
            for x in 0..5 {
                let expected = if x == y { 255 } else { 0 };
                assert_eq!(display.pixels[y][x], expected, "pixel ({}, {})", x, y);
            }
        }
        // Known quirk: the bottom row is never addressed by this command
        assert_eq!(display.pixels[4], [0; 5]);
    }

    #[test]
    fn test_button_states_reach_the_frame() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();

        service.on_event(
            BoardEvent::Button {
                which: Button::A,
                event: ButtonEvent::Hold,
            },
            0,
        );
        service.on_event(
            BoardEvent::Button {
                which: Button::B,
                event: ButtonEvent::Down,
            },
            0,
        );

        let frame = service.encode_telemetry(0, &mut pins);
        assert_eq!(frame[4], 2);
        assert_eq!(frame[5], 1);
    }

    #[test]
    fn test_gesture_lifecycle_through_telemetry() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();

        service.on_event(BoardEvent::Shake, 0);
        let frame = service.encode_telemetry(100, &mut pins);
        assert_eq!(frame[9] & 0b001, 0b001);

        let frame = service.encode_telemetry(250, &mut pins);
        assert_eq!(frame[9] & 0b001, 0);
    }

    #[test]
    fn test_accel_spike_sets_move_bit() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();

        service.on_event(BoardEvent::Accel(AccelSample { x: 0, y: 0, z: 2048 }), 0);
        let frame = service.encode_telemetry(10, &mut pins);
        assert_eq!(frame[9] & 0b100, 0b100);

        // Move cooldown is 50 ms
        let frame = service.encode_telemetry(50, &mut pins);
        assert_eq!(frame[9] & 0b100, 0);
    }

    #[test]
    fn test_temperature_truncated_to_byte() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();

        service.on_event(BoardEvent::Temperature(23), 0);
        let frame = service.encode_telemetry(0, &mut pins);
        assert_eq!(frame[13], 23);

        service.on_event(BoardEvent::Temperature(-10), 0);
        let frame = service.encode_telemetry(0, &mut pins);
        assert_eq!(frame[13], 0xF6);
    }

    #[test]
    fn test_encode_is_repeatable() {
        let mut service = BridgeService::new();
        let mut pins = FakePins::default();

        service.on_event(BoardEvent::Temperature(30), 0);
        service.on_event(
            BoardEvent::PinEdge {
                pin: 1,
                event: ButtonEvent::Down,
            },
            0,
        );

        let first = service.encode_telemetry(5, &mut pins);
        let second = service.encode_telemetry(5, &mut pins);
        assert_eq!(first, second);
    }
}
