//! Wire-format value types shared by both frame directions

/// Button state as reported in the telemetry frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    /// Released
    #[default]
    Up,
    /// Pressed
    Down,
    /// Held past the long-press threshold
    Held,
}

impl ButtonState {
    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            ButtonState::Up => 0,
            ButtonState::Down => 1,
            ButtonState::Held => 2,
        }
    }
}

// Wire format values for pin-configure mode
const MODE_OUTPUT: u8 = 1;
const MODE_INPUT: u8 = 2;
const MODE_SERVO: u8 = 3;

/// Edge-pin operating mode selected by a pin-configure command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Analog/digital output
    Output,
    /// Analog input, sampled into the telemetry frame
    Input,
    /// Servo pulse output
    Servo,
}

impl PinMode {
    /// Parse a mode from its wire format byte
    ///
    /// Returns `None` for unrecognized mode values; the command is then
    /// a no-op rather than an error.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MODE_OUTPUT => Some(PinMode::Output),
            MODE_INPUT => Some(PinMode::Input),
            MODE_SERVO => Some(PinMode::Servo),
            _ => None,
        }
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            PinMode::Output => MODE_OUTPUT,
            PinMode::Input => MODE_INPUT,
            PinMode::Servo => MODE_SERVO,
        }
    }
}

/// Gesture channels reported in the telemetry gesture-mask byte
///
/// Each gesture occupies one bit; the channel index doubles as the bit
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    /// Shake detected by the motion processor
    Shake,
    /// Freefall/jump spike
    Jump,
    /// Generic movement from the magnitude-delta filter
    Move,
}

impl Gesture {
    /// Channel index (0..3)
    pub fn index(self) -> usize {
        match self {
            Gesture::Shake => 0,
            Gesture::Jump => 1,
            Gesture::Move => 2,
        }
    }

    /// Bit mask for this gesture in the telemetry gesture byte
    pub fn bit(self) -> u8 {
        1 << self.index()
    }
}
