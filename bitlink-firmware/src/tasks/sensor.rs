//! Sensor and button tasks
//!
//! Polls the accelerometer and die thermometer every sensor period and
//! pushes samples as board events. The shake and freefall triggers the
//! protocol expects as pre-detected events are derived here: freefall
//! from a sustained near-zero magnitude, shake from rapid sign
//! alternation on the X axis. Detection works on squared magnitudes to
//! stay in integer math.

use defmt::{info, warn};
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Input;
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::Twim;
use embassy_time::{Delay, Duration, Ticker, Timer};
use lsm303agr::{AccelMode, AccelOutputDataRate, Lsm303agr};
use nrf_softdevice::Softdevice;

use bitlink_core::config::SENSOR_PERIOD_MS;
use bitlink_core::events::{AccelSample, BoardEvent, Button, ButtonEvent};

use crate::channels::BOARD_EVENTS;

/// Device units per g (reference-board accelerometer scale)
const UNITS_PER_G: i32 = 1024;

/// Freefall fires below 0.4 g and re-arms above 0.8 g
const FREEFALL_ENTER_SQ: i64 = (410 * 410) as i64;
const FREEFALL_EXIT_SQ: i64 = (820 * 820) as i64;
/// Samples below the threshold before freefall fires
const FREEFALL_SAMPLES: u8 = 3;

/// X-axis swing that counts toward shake detection
const SHAKE_AXIS_THRESHOLD: i32 = 600;
/// Direction flips within the window that make a shake
const SHAKE_FLIPS: u8 = 4;
/// Detection window length in samples
const SHAKE_WINDOW: u16 = 40;

/// How long a press must last to count as held
const BUTTON_HOLD_MS: u64 = 1500;

fn push_event(event: BoardEvent) {
    if BOARD_EVENTS.try_send(event).is_err() {
        warn!("Event channel full, dropping board event");
    }
}

/// Freefall detector state
#[derive(Default)]
struct FreefallDetector {
    below: u8,
    fired: bool,
}

impl FreefallDetector {
    fn update(&mut self, mag_sq: i64) -> bool {
        if mag_sq < FREEFALL_ENTER_SQ {
            self.below = self.below.saturating_add(1);
            if self.below >= FREEFALL_SAMPLES && !self.fired {
                self.fired = true;
                return true;
            }
        } else {
            self.below = 0;
            if mag_sq > FREEFALL_EXIT_SQ {
                self.fired = false;
            }
        }
        false
    }
}

/// Shake detector state: counts X-axis direction flips
#[derive(Default)]
struct ShakeDetector {
    last_sign: i8,
    flips: u8,
    age: u16,
}

impl ShakeDetector {
    fn update(&mut self, x: i32) -> bool {
        self.age = self.age.saturating_add(1);
        if self.age > SHAKE_WINDOW {
            self.flips = 0;
            self.age = 0;
        }

        let sign = if x > SHAKE_AXIS_THRESHOLD {
            1
        } else if x < -SHAKE_AXIS_THRESHOLD {
            -1
        } else {
            return false;
        };

        if sign != self.last_sign {
            self.last_sign = sign;
            self.flips += 1;
            self.age = 0;
            if self.flips >= SHAKE_FLIPS {
                self.flips = 0;
                return true;
            }
        }
        false
    }
}

/// Sensor task - accelerometer, gesture triggers, and thermometer
#[embassy_executor::task]
pub async fn sensor_task(sd: &'static Softdevice, i2c: Twim<'static, TWISPI0>) {
    info!("Sensor task started");

    let mut accel = Lsm303agr::new_with_i2c(i2c);
    if accel.init().is_err() {
        warn!("Accelerometer init failed, sensor task idle");
        return;
    }
    if accel
        .set_accel_mode_and_odr(&mut Delay, AccelMode::Normal, AccelOutputDataRate::Hz100)
        .is_err()
    {
        warn!("Accelerometer configuration failed, sensor task idle");
        return;
    }

    let mut freefall = FreefallDetector::default();
    let mut shake = ShakeDetector::default();
    let mut ticker = Ticker::every(Duration::from_millis(SENSOR_PERIOD_MS));

    loop {
        ticker.next().await;

        if let Ok(data) = accel.acceleration() {
            // Driver reports milli-g; the protocol uses 1024-per-g units
            let x = data.x_mg() as i32 * UNITS_PER_G / 1000;
            let y = data.y_mg() as i32 * UNITS_PER_G / 1000;
            let z = data.z_mg() as i32 * UNITS_PER_G / 1000;

            push_event(BoardEvent::Accel(AccelSample { x, y, z }));

            let mag_sq = i64::from(x) * i64::from(x)
                + i64::from(y) * i64::from(y)
                + i64::from(z) * i64::from(z);
            if freefall.update(mag_sq) {
                push_event(BoardEvent::Freefall);
            }
            if shake.update(x) {
                push_event(BoardEvent::Shake);
            }
        }

        // Die temperature via the SoftDevice (it owns the TEMP block)
        if let Ok(celsius) = nrf_softdevice::temperature_celsius(sd) {
            push_event(BoardEvent::Temperature(celsius.to_num::<i32>() as i16));
        }
    }
}

/// Button task - one per user button, active-low input
#[embassy_executor::task(pool_size = 2)]
pub async fn button_task(mut input: Input<'static>, which: Button) {
    info!("Button task started");

    loop {
        input.wait_for_low().await;
        push_event(BoardEvent::Button {
            which,
            event: ButtonEvent::Down,
        });

        match select(
            input.wait_for_high(),
            Timer::after(Duration::from_millis(BUTTON_HOLD_MS)),
        )
        .await
        {
            Either::First(_) => {}
            Either::Second(_) => {
                push_event(BoardEvent::Button {
                    which,
                    event: ButtonEvent::Hold,
                });
                input.wait_for_high().await;
            }
        }

        push_event(BoardEvent::Button {
            which,
            event: ButtonEvent::Up,
        });
    }
}
