//! Inter-task communication channels and shared state
//!
//! Defines the static channels used for communication between Embassy
//! tasks, plus the mutex-wrapped service context. Every service entry
//! point runs to completion, so each lock is held only for the duration
//! of one handler call.

use core::cell::RefCell;
use core::sync::atomic::AtomicU16;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use bitlink_core::events::BoardEvent;
use bitlink_core::BridgeService;
use bitlink_protocol::{EDGE_PIN_COUNT, TELEMETRY_FRAME_SIZE};

/// Channel capacity for board events (sensor, button, pin)
const EVENT_CHANNEL_SIZE: usize = 16;

/// Channel capacity for inbound command frames
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for encoded telemetry frames awaiting notify
const TELEMETRY_CHANNEL_SIZE: usize = 1;

/// The protocol service context, shared between the event, telemetry,
/// and command call paths
pub static SERVICE: Mutex<CriticalSectionRawMutex, RefCell<BridgeService>> =
    Mutex::new(RefCell::new(BridgeService::new()));

/// Board events from the sensor/button/pin tasks
pub static BOARD_EVENTS: Channel<CriticalSectionRawMutex, BoardEvent, EVENT_CHANNEL_SIZE> =
    Channel::new();

/// Raw inbound command frames from the BLE write handler
pub static COMMAND_FRAMES: Channel<
    CriticalSectionRawMutex,
    Vec<u8, TELEMETRY_FRAME_SIZE>,
    COMMAND_CHANNEL_SIZE,
> = Channel::new();

/// Encoded telemetry frames for the connection loop to notify
///
/// Capacity one: when no peer is draining the channel the freshest frame
/// replaces the stale one, mirroring the transport discarding writes
/// while disconnected.
pub static TELEMETRY_FRAMES: Channel<
    CriticalSectionRawMutex,
    [u8; TELEMETRY_FRAME_SIZE],
    TELEMETRY_CHANNEL_SIZE,
> = Channel::new();

/// Latest raw analog sample per edge pin (0-1023), updated by the ADC
/// sweep task and read synchronously by the pin driver
pub static ADC_CACHE: [AtomicU16; EDGE_PIN_COUNT] =
    [AtomicU16::new(0), AtomicU16::new(0), AtomicU16::new(0)];
