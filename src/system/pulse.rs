//! Actuator pulse shaping
//!
//! Last stage before the hardware PWM: clamps the raw controller command
//! to the configured pulse window and slew-limits it with the same EMA
//! pattern the speed estimator uses. Open-loop commands bypass the slew
//! limiter (they were validated by the serial layer and the operator
//! expects them to take effect on the next frame) but re-seed it, so a
//! later switch to closed loop starts from the actual output.

use defmt::Format;

use crate::system::config::ClampPolicy;

/// Shaped output state for one cycle.
#[derive(Clone, Copy, Debug, Format)]
pub struct ShapedPulse {
    /// Command before smoothing, after any clamping, in microseconds.
    pub raw_us: u16,
    /// Final pulse width written to the PWM, in microseconds.
    pub pulse_us: u16,
}

/// Clamp + EMA slew limiter for the ESC pulse.
pub struct PulseShaper {
    min_us: f32,
    max_us: f32,
    alpha: f32,
    policy: ClampPolicy,
    filtered: f32,
}

impl PulseShaper {
    /// `initial_us` seeds the filter; the stop pulse keeps the first
    /// closed-loop cycles from slewing up from zero.
    pub fn new(min_us: u16, max_us: u16, window: u32, policy: ClampPolicy, initial_us: u16) -> Self {
        Self {
            min_us: min_us as f32,
            max_us: max_us as f32,
            alpha: window as f32 / (window as f32 + 1.0),
            policy,
            filtered: initial_us as f32,
        }
    }

    /// Shapes a closed-loop controller command: clamp, then EMA.
    ///
    /// Truncation toward zero happens at the final microsecond cast.
    pub fn shape(&mut self, raw_us: f32) -> ShapedPulse {
        let bounded = raw_us.clamp(self.min_us, self.max_us);
        self.filtered = self.alpha * self.filtered + (1.0 - self.alpha) * bounded;
        ShapedPulse {
            raw_us: bounded as u16,
            pulse_us: self.filtered as u16,
        }
    }

    /// Passes an open-loop pulse through and re-seeds the filter.
    pub fn passthrough(&mut self, pulse_us: u16) -> ShapedPulse {
        let bounded = match self.policy {
            ClampPolicy::Always => (pulse_us as f32).clamp(self.min_us, self.max_us) as u16,
            ClampPolicy::ClosedLoopOnly => pulse_us,
        };
        self.filtered = bounded as f32;
        ShapedPulse {
            raw_us: bounded,
            pulse_us: bounded,
        }
    }

    /// Re-seeds the filter, e.g. after writing the stop pulse on disarm.
    pub fn reset(&mut self, pulse_us: u16) {
        self.filtered = pulse_us as f32;
    }
}

/// Compare-register value for a pulse width: the PWM counter runs at
/// 2 MHz, so one microsecond is two counter ticks.
pub fn compare_ticks(pulse_us: u16) -> u16 {
    pulse_us * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shaper(policy: ClampPolicy) -> PulseShaper {
        PulseShaper::new(1000, 2000, 20, policy, 1000)
    }

    #[test]
    fn shaped_output_stays_within_bounds() {
        let mut s = shaper(ClampPolicy::ClosedLoopOnly);
        for raw in [-500.0, 0.0, 900.0, 1500.0, 2500.0, 10_000.0] {
            let out = s.shape(raw);
            assert!(out.pulse_us >= 1000 && out.pulse_us <= 2000);
            assert!(out.raw_us >= 1000 && out.raw_us <= 2000);
        }
    }

    #[test]
    fn shaping_slews_toward_command() {
        let mut s = shaper(ClampPolicy::ClosedLoopOnly);
        let first = s.shape(2000.0);
        // One EMA step from 1000 toward 2000: 1000 + 1000/21.
        assert_eq!(first.pulse_us, 1047);
        let mut last = first.pulse_us;
        for _ in 0..300 {
            last = s.shape(2000.0).pulse_us;
        }
        assert!(last >= 1999);
    }

    #[test]
    fn open_loop_passes_through_unsmoothed() {
        let mut s = shaper(ClampPolicy::ClosedLoopOnly);
        let out = s.passthrough(1500);
        assert_eq!(out.pulse_us, 1500);
        assert_eq!(compare_ticks(out.pulse_us), 3000);
    }

    #[test]
    fn open_loop_clamped_only_when_policy_says_so() {
        let mut trusting = shaper(ClampPolicy::ClosedLoopOnly);
        assert_eq!(trusting.passthrough(2500).pulse_us, 2500);

        let mut strict = shaper(ClampPolicy::Always);
        assert_eq!(strict.passthrough(2500).pulse_us, 2000);
    }

    #[test]
    fn passthrough_reseeds_slew_filter() {
        let mut s = shaper(ClampPolicy::ClosedLoopOnly);
        s.passthrough(1800);
        // Closed-loop entry continues from the actual output, not from
        // the stale seed value.
        let out = s.shape(1800.0);
        assert_eq!(out.pulse_us, 1800);
    }
}
