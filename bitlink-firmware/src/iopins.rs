//! Edge-connector pin driver
//!
//! Each edge pin is bound to its own PWM peripheral so analog output,
//! digital levels (0%/100% duty), and servo pulses can run with
//! independent periods. Analog input goes through a SAADC sweep task:
//! the SAADC multiplexer addresses the analog inputs independently of
//! the pin's GPIO/PWM function, and the driver reads the latest cached
//! sample synchronously.

use core::sync::atomic::Ordering;

use embassy_nrf::peripherals::{PWM0, PWM1, PWM2};
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_nrf::saadc::Saadc;
use embassy_time::{Duration, Ticker};

use bitlink_core::config::{ANALOG_RANGE, SENSOR_PERIOD_MS};
use bitlink_core::events::{BoardEvent, ButtonEvent};
use bitlink_core::traits::{PinDriver, PinError};
use bitlink_protocol::EDGE_PIN_COUNT;

use crate::channels::{ADC_CACHE, BOARD_EVENTS};

/// Servo frame period in microseconds (50 Hz)
const SERVO_PERIOD_US: u16 = 20_000;
/// Servo pulse at 0 degrees
const SERVO_MIN_PULSE_US: u16 = 1_000;
/// Pulse growth across the full 0-180 degree range
const SERVO_RANGE_US: u16 = 1_000;

/// Digital threshold for synthesizing contact transitions from the
/// sampled level, with hysteresis on release
const EDGE_HIGH_LEVEL: u16 = 600;
const EDGE_LOW_LEVEL: u16 = 400;

/// PWM-backed driver for the three edge pins
///
/// Owns one PWM peripheral per pin; reads come from [`ADC_CACHE`].
pub struct EdgePins {
    pwm0: SimplePwm<'static, PWM0>,
    pwm1: SimplePwm<'static, PWM1>,
    pwm2: SimplePwm<'static, PWM2>,
}

impl EdgePins {
    /// Wrap the three per-pin PWM drivers
    ///
    /// Each must be configured by the caller with a 1 MHz base clock
    /// (`Prescaler::Div16`).
    pub fn new(
        pwm0: SimplePwm<'static, PWM0>,
        pwm1: SimplePwm<'static, PWM1>,
        pwm2: SimplePwm<'static, PWM2>,
    ) -> Self {
        let mut pins = Self { pwm0, pwm1, pwm2 };
        for pin in 0..EDGE_PIN_COUNT as u8 {
            // Idle low until the host configures the pin
            let _ = pins.set_digital(pin, false);
        }
        pins
    }

    /// Run `f` on the PWM bound to `pin`
    fn with_pwm<R>(
        &mut self,
        pin: u8,
        f: impl FnOnce(&mut dyn PwmChannel) -> R,
    ) -> Result<R, PinError> {
        match pin {
            0 => Ok(f(&mut self.pwm0)),
            1 => Ok(f(&mut self.pwm1)),
            2 => Ok(f(&mut self.pwm2)),
            _ => Err(PinError::InvalidPin),
        }
    }
}

/// Object-safe view over `SimplePwm` instances of different peripherals
trait PwmChannel {
    fn set_period_and_duty(&mut self, max_duty: u16, duty: u16);
}

impl<T: embassy_nrf::pwm::Instance> PwmChannel for SimplePwm<'static, T> {
    fn set_period_and_duty(&mut self, max_duty: u16, duty: u16) {
        self.set_prescaler(Prescaler::Div16); // 1 MHz base clock
        self.set_max_duty(max_duty);
        self.set_duty(0, duty);
    }
}

impl PinDriver for EdgePins {
    fn set_analog(&mut self, pin: u8, value: u16) -> Result<(), PinError> {
        // Native range maps onto a 1024 us period, like the reference
        // board's analog write
        let duty = value.min(ANALOG_RANGE);
        self.with_pwm(pin, |pwm| pwm.set_period_and_duty(ANALOG_RANGE, duty))
    }

    fn set_digital(&mut self, pin: u8, high: bool) -> Result<(), PinError> {
        let duty = if high { ANALOG_RANGE } else { 0 };
        self.with_pwm(pin, |pwm| pwm.set_period_and_duty(ANALOG_RANGE, duty))
    }

    fn set_servo(&mut self, pin: u8, angle: u8) -> Result<(), PinError> {
        let pulse = SERVO_MIN_PULSE_US
            + (u32::from(angle) * u32::from(SERVO_RANGE_US) / 180) as u16;
        self.with_pwm(pin, |pwm| pwm.set_period_and_duty(SERVO_PERIOD_US, pulse))
    }

    fn read_analog(&mut self, pin: u8) -> Result<u16, PinError> {
        ADC_CACHE
            .get(pin as usize)
            .map(|slot| slot.load(Ordering::Relaxed))
            .ok_or(PinError::InvalidPin)
    }
}

/// SAADC sweep task
///
/// Samples all three edge pins every sensor period, refreshes the cache,
/// and synthesizes contact up/down events from level crossings.
#[embassy_executor::task]
pub async fn adc_task(mut adc: Saadc<'static, { EDGE_PIN_COUNT }>) {
    defmt::info!("Edge pin ADC task started");

    let mut ticker = Ticker::every(Duration::from_millis(SENSOR_PERIOD_MS));
    let mut contact = [false; EDGE_PIN_COUNT];

    loop {
        ticker.next().await;

        let mut buf = [0i16; EDGE_PIN_COUNT];
        adc.sample(&mut buf).await;

        for (pin, &raw) in buf.iter().enumerate() {
            // 10-bit single-ended conversion; negative noise clamps to 0
            let level = raw.max(0) as u16;
            ADC_CACHE[pin].store(level, Ordering::Relaxed);

            let event = if !contact[pin] && level >= EDGE_HIGH_LEVEL {
                contact[pin] = true;
                Some(ButtonEvent::Down)
            } else if contact[pin] && level < EDGE_LOW_LEVEL {
                contact[pin] = false;
                Some(ButtonEvent::Up)
            } else {
                None
            };

            if let Some(event) = event {
                if BOARD_EVENTS
                    .try_send(BoardEvent::PinEdge {
                        pin: pin as u8,
                        event,
                    })
                    .is_err()
                {
                    defmt::warn!("Event channel full, dropping pin edge");
                }
            }
        }
    }
}
