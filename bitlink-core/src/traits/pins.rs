//! Edge-pin driver trait

/// Errors that can occur driving or reading an edge pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin index outside the edge connector
    InvalidPin,
    /// The pin cannot perform the requested function
    Unsupported,
}

/// Trait for the edge-connector pin electronics
///
/// Implementations own the analog, digital, and servo output hardware
/// plus the analog sampling path. Indexing is by edge-pin number (0-2).
pub trait PinDriver {
    /// Drive a PWM analog level in the native 0-1023 range
    fn set_analog(&mut self, pin: u8, value: u16) -> Result<(), PinError>;

    /// Drive a plain digital level
    fn set_digital(&mut self, pin: u8, high: bool) -> Result<(), PinError>;

    /// Drive a servo pulse for the given angle in degrees (0-180)
    fn set_servo(&mut self, pin: u8, angle: u8) -> Result<(), PinError>;

    /// Read the pin's analog level in the native 0-1023 range
    fn read_analog(&mut self, pin: u8) -> Result<u16, PinError>;
}
