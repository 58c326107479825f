//! Tuning constants
//!
//! Kept as named values rather than inline literals so the filter,
//! debounce, and timing behavior can be tuned and tested independently.

/// Exponential-moving-average coefficient for the accelerometer filter
pub const ACCEL_FILTER_ALPHA: f32 = 0.3;

/// Magnitude-delta threshold (normalized units) that counts as movement
pub const MOVE_DELTA_THRESHOLD: f32 = 15.0;

/// Native range of the analog pin drivers (readings 0..1023)
pub const ANALOG_RANGE: u16 = 1024;

/// Range of scaled values carried on the wire (0..=100)
pub const PERCENT_RANGE: u16 = 100;

/// Maximum servo angle accepted by a pin-configure command
pub const SERVO_MAX_DEGREES: u8 = 180;

/// Gesture cooldowns: a channel ignores re-triggers for this long after
/// firing. A shake gesture's characteristic period is longer than a
/// jump/impact spike, so its window is wider.
pub const SHAKE_COOLDOWN_MS: u64 = 250;
/// Cooldown for the jump (freefall) channel
pub const JUMP_COOLDOWN_MS: u64 = 50;
/// Cooldown for the generic-move channel
pub const MOVE_COOLDOWN_MS: u64 = 50;

/// Period of the telemetry notify ticker
pub const TELEMETRY_PERIOD_MS: u64 = 20;

/// Accelerometer and thermometer sample period
pub const SENSOR_PERIOD_MS: u64 = 10;

/// Default column-step speed for host-commanded scrolling text
pub const DEFAULT_SCROLL_SPEED_MS: u16 = 120;

/// Column-step speed for the idle advertising name scroll
pub const NAME_SCROLL_SPEED_MS: u16 = 125;

/// Pause between advertising name scroll passes
pub const IDLE_SCROLL_PAUSE_MS: u64 = 500;

/// How long the check-mark splash stays up after a connection
pub const CONNECT_SPLASH_MS: u64 = 2000;
