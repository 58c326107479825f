//! Board event dispatch task
//!
//! Drains the board event channel into the service context. Each
//! dispatch locks the service for one run-to-completion handler call.

use defmt::info;
use embassy_time::Instant;

use crate::channels::{BOARD_EVENTS, SERVICE};

/// Dispatch task - feeds sensor/button/pin events to the service
#[embassy_executor::task]
pub async fn dispatch_task() {
    info!("Dispatch task started");

    loop {
        let event = BOARD_EVENTS.receive().await;
        let now_ms = Instant::now().as_millis();
        SERVICE.lock(|service| service.borrow_mut().on_event(event, now_ms));
    }
}
