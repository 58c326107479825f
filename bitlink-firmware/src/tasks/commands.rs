//! Command dispatch task
//!
//! Drains inbound command frames from the BLE write handler into the
//! service. Malformed frames are counted and dropped inside the service;
//! driver failures only get logged - nothing is reported to the host.

use defmt::{info, warn};

use crate::channels::{COMMAND_FRAMES, SERVICE};
use crate::matrix::MatrixHandle;
use crate::tasks::telemetry::PinsMutex;

/// Command task - decode and execute host command frames
#[embassy_executor::task]
pub async fn commands_task(pins: &'static PinsMutex) {
    info!("Command task started");

    let mut display = MatrixHandle;

    loop {
        let frame = COMMAND_FRAMES.receive().await;

        let result = pins.lock(|pins| {
            SERVICE.lock(|service| {
                service
                    .borrow_mut()
                    .handle_command(&frame, &mut *pins.borrow_mut(), &mut display)
            })
        });

        if let Err(e) = result {
            warn!("Command dispatch failed: {:?}", e);
        }
    }
}
