//! Shaft speed estimation
//!
//! Converts raw edge intervals into RPM and smooths the result with an
//! exponential moving average. Runs once per control cycle, not once per
//! edge: when no new edge arrived (or the interval is degenerate) the
//! previous filtered value is retained and only the derivative decays.
//!
//! # Filtering
//! `filtered = alpha * previous + (1 - alpha) * instantaneous` with
//! `alpha = N / (N + 1)`. The derivative handed to the controller is the
//! per-cycle change of the *filtered* value (derivative on measurement),
//! so setpoint steps cannot produce derivative spikes.

use defmt::Format;

use crate::system::timebase::{EdgeInterval, Timebase};

/// Speed estimate for one control cycle.
#[derive(Clone, Copy, Debug, Format)]
pub struct SpeedSample {
    /// Unfiltered RPM of the most recent valid edge interval.
    pub instantaneous_rpm: f32,
    /// EMA-filtered RPM, the controller's process variable.
    pub filtered_rpm: f32,
    /// Change of the filtered RPM since the previous cycle.
    pub derivative: f32,
}

/// Per-cycle RPM estimator with EMA smoothing.
pub struct SpeedEstimator {
    timebase: Timebase,
    /// Mechanical revolutions represented by one edge interval, pre-divided
    /// into the 60 s/min factor: instantaneous RPM = `rev_factor / elapsed`.
    rev_factor: f32,
    alpha: f32,
    instantaneous: f32,
    filtered: f32,
    filtered_prev: f32,
}

impl SpeedEstimator {
    /// Creates an estimator for a motor with `poles` commutation edges per
    /// revolution, filtering over an EMA window of `window` samples.
    pub fn new(timebase: Timebase, poles: u8, window: u32) -> Self {
        Self {
            timebase,
            rev_factor: 60.0 / poles as f32,
            alpha: window as f32 / (window as f32 + 1.0),
            instantaneous: 0.0,
            filtered: 0.0,
            filtered_prev: 0.0,
        }
    }

    /// Advances the estimator by one control cycle.
    ///
    /// `interval` is the freshest captured edge interval, or `None` when no
    /// edge arrived since the last cycle. A zero-length interval (first edge
    /// after startup or a counter glitch) is treated as "no sample" rather
    /// than dividing by zero.
    pub fn update(&mut self, interval: Option<EdgeInterval>) -> SpeedSample {
        if let Some(interval) = interval {
            let elapsed = self.timebase.elapsed_seconds(interval);
            if elapsed > 0.0 {
                self.instantaneous = self.rev_factor / elapsed;
                self.filtered =
                    self.alpha * self.filtered + (1.0 - self.alpha) * self.instantaneous;
            }
        }

        let derivative = self.filtered - self.filtered_prev;
        self.filtered_prev = self.filtered;

        SpeedSample {
            instantaneous_rpm: self.instantaneous,
            filtered_rpm: self.filtered,
            derivative,
        }
    }

    /// Clears all filter state, e.g. when the loop is disarmed.
    pub fn reset(&mut self) {
        self.instantaneous = 0.0;
        self.filtered = 0.0;
        self.filtered_prev = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micro_estimator() -> SpeedEstimator {
        SpeedEstimator::new(Timebase::new(1e-6, 65_536), 7, 20)
    }

    fn interval(ticks: u32, overflows: u32) -> Option<EdgeInterval> {
        Some(EdgeInterval {
            counter_ticks: ticks,
            overflow_count: overflows,
        })
    }

    #[test]
    fn instantaneous_rpm_from_fast_timebase() {
        // 1000 ticks at 62.5 ns with 7 poles: (60/7) / 62.5e-6 ~ 137143 RPM.
        let mut est = SpeedEstimator::new(Timebase::new(62.5e-9, 50_000), 7, 20);
        let sample = est.update(interval(1000, 0));
        assert!((sample.instantaneous_rpm - 137_142.86).abs() < 1.0);
    }

    #[test]
    fn zero_interval_yields_no_update() {
        let mut est = micro_estimator();
        // Establish a filtered value, then feed a degenerate interval.
        est.update(interval(2000, 0));
        let before = est.update(None).filtered_rpm;
        let after = est.update(interval(0, 0));
        assert_eq!(after.filtered_rpm, before);
        assert_eq!(after.derivative, 0.0);
    }

    #[test]
    fn missing_sample_retains_filtered_value() {
        let mut est = micro_estimator();
        est.update(interval(2000, 0));
        let held = est.update(None);
        assert!(held.filtered_rpm > 0.0);
        assert_eq!(held.derivative, 0.0);
    }

    #[test]
    fn ema_converges_monotonically_to_constant_input() {
        let mut est = micro_estimator();
        // 2000 us between edges with 7 poles: (60/7) / 2e-3 ~ 4285.7 RPM.
        let target = (60.0 / 7.0) / 2e-3;
        let mut last = 0.0;
        for _ in 0..400 {
            let sample = est.update(interval(2000, 0));
            assert!(sample.filtered_rpm >= last);
            assert!(sample.filtered_rpm <= target);
            last = sample.filtered_rpm;
        }
        assert!((last - target).abs() < 1.0);
    }

    #[test]
    fn derivative_tracks_filtered_change() {
        let mut est = micro_estimator();
        let first = est.update(interval(2000, 0));
        assert!((first.derivative - first.filtered_rpm).abs() < 1e-3);
        let second = est.update(interval(2000, 0));
        assert!((second.derivative - (second.filtered_rpm - first.filtered_rpm)).abs() < 1e-3);
    }

    #[test]
    fn reset_clears_filter_state() {
        let mut est = micro_estimator();
        est.update(interval(2000, 0));
        est.reset();
        let sample = est.update(None);
        assert_eq!(sample.filtered_rpm, 0.0);
        assert_eq!(sample.derivative, 0.0);
    }
}
