//! Accelerometer smoothing filter
//!
//! Smooths raw 3-axis samples into stable X/Y/magnitude values for the
//! telemetry frame, and doubles as a shock detector: the delta between
//! the previously smoothed magnitude and each *unsmoothed* new magnitude
//! responds to impacts the smoothed trace would average away.

use libm::{fabsf, sqrtf};

use crate::config::{ACCEL_FILTER_ALPHA, MOVE_DELTA_THRESHOLD};
use crate::events::AccelSample;

/// Exponential-moving-average filter over accelerometer samples
///
/// State is continuously overwritten; no history is kept beyond the
/// current smoothed values.
#[derive(Debug, Clone, Copy)]
pub struct AccelFilter {
    x: f32,
    y: f32,
    magnitude: f32,
}

impl Default for AccelFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl AccelFilter {
    /// Create a filter at rest
    pub const fn new() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            magnitude: 0.0,
        }
    }

    /// Feed one raw sample
    ///
    /// Returns `true` when the magnitude delta exceeds the movement
    /// threshold, i.e. the sample looks like a shock. The caller decides
    /// what to do with that (the facade forwards it to the gesture
    /// debouncer's move channel).
    pub fn update(&mut self, sample: AccelSample) -> bool {
        let x = sample.x as f32;
        let y = sample.y as f32;
        let z = sample.z as f32;

        // Normalize: device units are 1024/g, wire units are 0-100
        let magnitude = sqrtf(x * x + y * y + z * z) / 1024.0 * 100.0;

        self.x = x * ACCEL_FILTER_ALPHA + self.x * (1.0 - ACCEL_FILTER_ALPHA);
        self.y = y * ACCEL_FILTER_ALPHA + self.y * (1.0 - ACCEL_FILTER_ALPHA);

        // Delta is taken before the magnitude is smoothed
        let delta = fabsf(self.magnitude - magnitude);
        self.magnitude = magnitude * ACCEL_FILTER_ALPHA + self.magnitude * (1.0 - ACCEL_FILTER_ALPHA);

        delta > MOVE_DELTA_THRESHOLD
    }

    /// Smoothed X in device units, truncated for the wire
    pub fn x(&self) -> i16 {
        self.x as i16
    }

    /// Smoothed Y in device units, truncated for the wire
    pub fn y(&self) -> i16 {
        self.y as i16
    }

    /// Smoothed magnitude in normalized 0-100-per-g units
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: i32, y: i32, z: i32) -> AccelSample {
        AccelSample { x, y, z }
    }

    #[test]
    fn test_constant_input_converges_monotonically() {
        let mut filter = AccelFilter::new();

        let mut prev_x = filter.x() as f32;
        let mut prev_mag = filter.magnitude();
        for _ in 0..100 {
            filter.update(sample(1024, 0, 0));

            // X climbs toward 1024, magnitude toward 100, never overshooting
            assert!(filter.x() as f32 >= prev_x);
            assert!(filter.x() <= 1024);
            assert!(filter.magnitude() >= prev_mag);
            assert!(filter.magnitude() <= 100.0 + 1e-3);

            prev_x = filter.x() as f32;
            prev_mag = filter.magnitude();
        }

        assert!(filter.x() >= 1023);
        assert!((filter.magnitude() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_first_sample_from_rest_is_a_shock() {
        // From a zeroed filter, a 1g sample is a 100-unit delta
        let mut filter = AccelFilter::new();
        assert!(filter.update(sample(0, 0, 1024)));
    }

    #[test]
    fn test_steady_state_is_not_movement() {
        let mut filter = AccelFilter::new();
        for _ in 0..50 {
            filter.update(sample(0, 0, 1024));
        }
        assert!(!filter.update(sample(0, 0, 1024)));
    }

    #[test]
    fn test_shock_detected_against_smoothed_trace() {
        let mut filter = AccelFilter::new();
        for _ in 0..50 {
            filter.update(sample(0, 0, 1024));
        }
        // A 2g spike is ~100 units above the settled magnitude
        assert!(filter.update(sample(0, 0, 2048)));
    }

    #[test]
    fn test_small_wobble_below_threshold() {
        let mut filter = AccelFilter::new();
        for _ in 0..50 {
            filter.update(sample(0, 0, 1024));
        }
        // ~1.4 units of delta, well under the threshold
        assert!(!filter.update(sample(0, 0, 1039)));
    }

    #[test]
    fn test_axes_filtered_independently() {
        let mut filter = AccelFilter::new();
        filter.update(sample(1000, -1000, 0));
        assert!(filter.x() > 0);
        assert!(filter.y() < 0);
        assert_eq!(filter.x(), -filter.y());
    }
}
