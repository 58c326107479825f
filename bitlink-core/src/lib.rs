//! Board-agnostic core logic for the Bitlink bridge
//!
//! This crate contains all protocol/state logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (pin driver, display sink)
//! - Accelerometer smoothing filter and shock detection
//! - Gesture debounce state machine
//! - Edge-pin state table
//! - The service facade tying them to the wire protocol
//! - Tuning constants
//!
//! All entry points run to completion without suspending; on a
//! preemptive target the owning context must be wrapped in an explicit
//! mutual-exclusion scope (the firmware crate uses a blocking mutex).

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod events;
pub mod filter;
pub mod gesture;
pub mod pins;
pub mod service;
pub mod traits;

pub use events::{AccelSample, BoardEvent, ButtonEvent};
pub use service::BridgeService;
