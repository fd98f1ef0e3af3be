//! Discrete PID speed controller
//!
//! Classic positional PID with two deviations from the textbook form:
//!
//! - The integral accumulator is held at zero while the error magnitude
//!   exceeds a configured fraction of the setpoint. Large transients
//!   (spin-up, setpoint steps) therefore cannot wind the integrator up;
//!   it only starts accumulating once the loop is near its target.
//! - The derivative term acts on the measured (filtered) speed instead of
//!   the error, subtracted from the output, so a setpoint step does not
//!   kick the actuator.
//!
//! The output is a raw pulse width in microseconds around the ESC's
//! neutral ("stopped") pulse. Clamping is the pulse driver's job.

use defmt::Format;
use libm::fabsf;

/// Proportional, integral and derivative gains.
#[derive(Clone, Copy, Debug, Format)]
pub struct PidGains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// PID controller state persisting across control cycles.
pub struct PidController {
    gains: PidGains,
    /// Integral freeze threshold as a fraction of the setpoint.
    windup_fraction: f32,
    /// Actuator pulse width commanding zero output, added as output bias.
    neutral_pulse_us: f32,
    integral: f32,
    last_error: f32,
}

impl PidController {
    pub fn new(gains: PidGains, windup_fraction: f32, neutral_pulse_us: u16) -> Self {
        Self {
            gains,
            windup_fraction,
            neutral_pulse_us: neutral_pulse_us as f32,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Runs one closed-loop control cycle.
    ///
    /// `derivative` is the per-cycle change of the filtered speed, as
    /// produced by the estimator.
    pub fn update(&mut self, setpoint_rpm: f32, filtered_rpm: f32, derivative: f32) -> f32 {
        let error = setpoint_rpm - filtered_rpm;

        if fabsf(error) > self.windup_fraction * setpoint_rpm {
            self.integral = 0.0;
        } else {
            self.integral += error;
        }
        self.last_error = error;

        error * self.gains.kp + self.integral * self.gains.ki - derivative * self.gains.kd
            + self.neutral_pulse_us
    }

    /// Clears accumulated state. Called on every transition into closed
    /// loop and when the loop is disarmed.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    /// Error of the most recent cycle, for telemetry/debugging.
    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    #[cfg(test)]
    fn integral(&self) -> f32 {
        self.integral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> PidController {
        PidController::new(
            PidGains {
                kp: 0.05,
                ki: 0.002,
                kd: 0.01,
            },
            0.10,
            1000,
        )
    }

    #[test]
    fn zero_error_converges_to_neutral_pulse() {
        let mut pid = controller();
        // Error, integral and derivative all zero: output is the bias.
        let out = pid.update(5000.0, 5000.0, 0.0);
        assert_eq!(out, 1000.0);
    }

    #[test]
    fn large_error_freezes_and_clears_integral() {
        let mut pid = controller();
        // Accumulate a little inside the windup band first.
        pid.update(5000.0, 4800.0, 0.0);
        assert!(pid.integral() != 0.0);
        // 1500 RPM error > 10% of 5000: accumulator must be exactly zero
        // after the cycle, not previous value plus error.
        pid.update(5000.0, 3500.0, 0.0);
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn small_error_accumulates_integral() {
        let mut pid = controller();
        pid.update(5000.0, 4900.0, 0.0);
        pid.update(5000.0, 4900.0, 0.0);
        assert_eq!(pid.integral(), 200.0);
    }

    #[test]
    fn derivative_on_measurement_opposes_acceleration() {
        let mut pid = controller();
        let steady = pid.update(5000.0, 4900.0, 0.0);
        pid.reset();
        // Same error but the measured speed is rising: output must be lower.
        let accelerating = pid.update(5000.0, 4900.0, 50.0);
        assert!(accelerating < steady);
    }

    #[test]
    fn reset_clears_accumulator() {
        let mut pid = controller();
        pid.update(5000.0, 4900.0, 0.0);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
    }

    #[test]
    fn proportional_term_scales_with_error() {
        let mut pid = controller();
        // Outside the windup band the integral stays cleared, so the
        // output is purely proportional plus bias.
        let out = pid.update(5000.0, 3000.0, 0.0);
        assert_eq!(out, 2000.0 * 0.05 + 1000.0);
    }
}
