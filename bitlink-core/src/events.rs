//! Board events consumed by the service facade
//!
//! The event vocabulary is fixed and small, so it is modeled as a closed
//! set of tagged variants dispatched through `BridgeService::on_event`
//! rather than callback registration.

use bitlink_protocol::ButtonState;

/// One raw accelerometer sample in milli-g-like device units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelSample {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// A discrete button or pin-contact transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// Released
    Up,
    /// Pressed
    Down,
    /// Held past the long-press threshold
    Hold,
}

impl ButtonEvent {
    /// Digital level for edge-pin tracking
    ///
    /// Only up/down transitions carry a level; other events leave the
    /// tracked pin state unchanged.
    pub fn digital_level(self) -> Option<u8> {
        match self {
            ButtonEvent::Up => Some(0),
            ButtonEvent::Down => Some(1),
            ButtonEvent::Hold => None,
        }
    }
}

impl From<ButtonEvent> for ButtonState {
    fn from(event: ButtonEvent) -> Self {
        match event {
            ButtonEvent::Up => ButtonState::Up,
            ButtonEvent::Down => ButtonState::Down,
            ButtonEvent::Hold => ButtonState::Held,
        }
    }
}

/// The two user buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    A,
    B,
}

/// Events delivered to the service facade by the board layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BoardEvent {
    /// New accelerometer sample
    Accel(AccelSample),
    /// Button state transition
    Button { which: Button, event: ButtonEvent },
    /// Edge-pin contact transition
    PinEdge { pin: u8, event: ButtonEvent },
    /// Shake gesture pre-detected by the motion processor
    Shake,
    /// Freefall pre-detected by the motion processor
    Freefall,
    /// New temperature sample in whole degrees Celsius
    Temperature(i16),
}
