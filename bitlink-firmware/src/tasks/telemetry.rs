//! Telemetry encode task
//!
//! Snapshots the service state into a 20-byte frame every telemetry
//! period and hands it to the connection loop for notify. Frames keep
//! being produced while disconnected; the single-slot channel just
//! replaces the stale frame, mirroring a transport that discards writes
//! without a peer.

use core::cell::RefCell;

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker};

use bitlink_core::config::TELEMETRY_PERIOD_MS;

use crate::channels::{SERVICE, TELEMETRY_FRAMES};
use crate::iopins::EdgePins;

/// Shared ownership of the pin driver between this task and command
/// dispatch
pub type PinsMutex = Mutex<CriticalSectionRawMutex, RefCell<EdgePins>>;

/// Telemetry task - periodic state snapshot into the notify channel
#[embassy_executor::task]
pub async fn telemetry_task(pins: &'static PinsMutex) {
    info!("Telemetry task started");

    let mut ticker = Ticker::every(Duration::from_millis(TELEMETRY_PERIOD_MS));

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis();
        let frame = pins.lock(|pins| {
            SERVICE.lock(|service| {
                service
                    .borrow_mut()
                    .encode_telemetry(now_ms, &mut *pins.borrow_mut())
            })
        });

        if TELEMETRY_FRAMES.try_send(frame).is_err() {
            // No peer draining the channel; keep the freshest frame
            let _ = TELEMETRY_FRAMES.try_receive();
            let _ = TELEMETRY_FRAMES.try_send(frame);
        }
    }
}
