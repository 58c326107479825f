//! Bitlink - Visual-Programming Bridge Firmware
//!
//! Main firmware binary for nRF52833-based boards with a 5x5 LED
//! matrix, two buttons, and a three-pin edge connector. Exposes board
//! state to a visual-programming host over BLE and executes the host's
//! pin and display commands. All protocol logic lives in
//! `bitlink-core`; this binary wires it to the hardware.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::{info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_futures::select::select;
use embassy_nrf::gpio::{Input, Level, Output, OutputDrive, Pin, Pull};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::saadc::{self, ChannelConfig, Resolution, Saadc};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::Mutex;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::gatt_server;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use bitlink_core::config::{CONNECT_SPLASH_MS, NAME_SCROLL_SPEED_MS};
use bitlink_core::events::Button;
use bitlink_core::traits::DisplaySink;

use crate::ble::ServerEvent;
use crate::iopins::EdgePins;
use crate::matrix::MatrixHandle;
use crate::tasks::telemetry::PinsMutex;

mod ble;
mod channels;
mod font;
mod iopins;
mod matrix;
mod tasks;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Check-mark splash shown when a host connects (bit 4 = left column)
#[rustfmt::skip]
const CHECK_IMAGE: [u8; 5] = [
    0b00000,
    0b00001,
    0b00010,
    0b10100,
    0b01000,
];

// Shared pin driver (must live forever for task references)
static EDGE_PINS: StaticCell<PinsMutex> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Bitlink firmware starting...");

    // The SoftDevice reserves interrupt priorities 0, 1 and 4
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0.set_priority(Priority::P3);
    info!("Peripherals initialized");

    let (sd, server) = ble::init(&spawner);
    info!("SoftDevice enabled");

    // Edge-pin analog sampling: P0.02/P0.03/P0.04 are AIN0/AIN1/AIN2.
    // 10-bit conversions match the 0-1023 native range.
    let mut adc_config = saadc::Config::default();
    adc_config.resolution = Resolution::_10BIT;
    let adc = Saadc::new(
        p.SAADC,
        Irqs,
        adc_config,
        [
            ChannelConfig::single_ended(p.P0_02),
            ChannelConfig::single_ended(p.P0_03),
            ChannelConfig::single_ended(p.P0_04),
        ],
    );

    // One PWM peripheral per edge pin for independent output periods.
    // The SAADC samples through the analog mux regardless of the GPIO
    // function, so the pins are shared with the PWM driver.
    let edge_pins = EdgePins::new(
        SimplePwm::new_1ch(p.PWM0, unsafe { peripherals::P0_02::steal() }),
        SimplePwm::new_1ch(p.PWM1, unsafe { peripherals::P0_03::steal() }),
        SimplePwm::new_1ch(p.PWM2, unsafe { peripherals::P0_04::steal() }),
    );
    let pins = EDGE_PINS.init(Mutex::new(RefCell::new(edge_pins)));

    // Internal I2C to the accelerometer (SCL P0.08, SDA P0.16)
    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_16, p.P0_08, twim::Config::default());

    // User buttons, active low with external pull-ups
    let button_a = Input::new(p.P0_14, Pull::None);
    let button_b = Input::new(p.P0_23, Pull::None);

    // LED matrix: row high + column low lights a pixel
    let rows = [
        Output::new(p.P0_21.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_22.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_15.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_24.degrade(), Level::Low, OutputDrive::Standard),
        Output::new(p.P0_19.degrade(), Level::Low, OutputDrive::Standard),
    ];
    let cols = [
        Output::new(p.P0_28.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_11.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_31.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P1_05.degrade(), Level::High, OutputDrive::Standard),
        Output::new(p.P0_30.degrade(), Level::High, OutputDrive::Standard),
    ];

    // Spawn tasks
    unwrap!(spawner.spawn(matrix::matrix_task(rows, cols)));
    unwrap!(spawner.spawn(iopins::adc_task(adc)));
    unwrap!(spawner.spawn(tasks::sensor_task(sd, i2c)));
    unwrap!(spawner.spawn(tasks::button_task(button_a, Button::A)));
    unwrap!(spawner.spawn(tasks::button_task(button_b, Button::B)));
    unwrap!(spawner.spawn(tasks::dispatch_task()));
    unwrap!(spawner.spawn(tasks::telemetry_task(pins)));
    unwrap!(spawner.spawn(tasks::commands_task(pins)));
    info!("All tasks spawned, firmware running");

    let name = ble::device_name();
    let adv_data = ble::advertising_data(&name);
    let mut display = MatrixHandle;

    // Connection loop: scroll the friendly name while advertising, show
    // the splash on connect, then serve the link until it drops.
    loop {
        if display
            .scroll_repeating(name.as_bytes(), NAME_SCROLL_SPEED_MS)
            .is_err()
        {
            warn!("Advertising name too long for the scroll buffer");
        }

        let conn = match ble::advertise(sd, &adv_data).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Advertising failed: {:?}", e);
                continue;
            }
        };
        info!("Peer connected");

        let gatt = gatt_server::run(&conn, server, |event| match event {
            ServerEvent::Bridge(event) => server.on_bridge_event(event),
        });
        let link = async {
            connection_splash(&mut MatrixHandle).await;
            loop {
                let frame = channels::TELEMETRY_FRAMES.receive().await;
                // Notify failures (e.g. notifications not enabled yet)
                // are the transport's business, not ours
                let _ = server.bridge.telemetry_notify(&conn, &frame);
            }
        };
        select(gatt, link).await;

        info!("Peer disconnected");
        display.clear();
    }
}

/// Show the check-mark for a moment, then clear for the host
async fn connection_splash(display: &mut MatrixHandle) {
    display.clear();
    for (y, row) in CHECK_IMAGE.iter().enumerate() {
        for x in 0..matrix::MATRIX_SIZE as u8 {
            let brightness = if row >> (4 - x) & 1 != 0 { 255 } else { 0 };
            let _ = display.set_pixel(x, y as u8, brightness);
        }
    }
    Timer::after(Duration::from_millis(CONNECT_SPLASH_MS)).await;
    display.clear();
}
