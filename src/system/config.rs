//! Governor tuning constants
//!
//! All fixed configuration for the speed control loop in one place.
//! Gains and pulse limits were tuned offline against the motor/ESC pair
//! and are not derived at runtime.

use embassy_time::Duration;

/// Number of magnetic poles of the motor; one commutation edge is sensed
/// per pole pair transition, so one mechanical revolution produces
/// `MOTOR_POLES` edges.
pub const MOTOR_POLES: u8 = 7;

/// ESC "stopped" pulse width in microseconds (1 ms). Also serves as the
/// neutral bias added to the PID output, so a zero-error steady state
/// commands exactly this pulse.
pub const PULSE_STOP_US: u16 = 1000;

/// Lower clamp bound for the actuator pulse, in microseconds.
pub const PULSE_MIN_US: u16 = 1000;

/// Upper clamp bound for the actuator pulse (full throttle), in microseconds.
pub const PULSE_MAX_US: u16 = 2000;

/// Accepted setpoint range for closed-loop operation, in RPM.
/// Below ~2000 RPM the commutation signal of this motor is too ragged to
/// regulate against; above 6000 RPM the ESC saturates.
pub const SETPOINT_MIN_RPM: u16 = 2000;
pub const SETPOINT_MAX_RPM: u16 = 6000;

/// EMA window size N, giving alpha = N / (N + 1) ~ 0.952. Applied both to
/// the speed estimate and to the closed-loop output slew limiter.
pub const EMA_WINDOW: u32 = 20;

/// Proportional gain, pulse-us per RPM of error.
pub const KP: f32 = 0.05;

/// Integral gain, pulse-us per accumulated RPM-cycle of error.
pub const KI: f32 = 0.002;

/// Derivative gain, pulse-us per RPM-per-cycle of measured speed change.
pub const KD: f32 = 0.01;

/// Integral freeze threshold as a fraction of the setpoint. While
/// |error| exceeds this fraction the accumulator is held cleared.
pub const WINDUP_FRACTION: f32 = 0.10;

/// Fixed control cycle period. Decouples the loop rate from motor RPM:
/// the estimator consumes at most one edge interval per tick.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Whether the output clamp also applies to open-loop passthrough
/// commands. The serial layer already range-checks open-loop pulses, so
/// the default trusts them; set `Always` to clamp unconditionally.
pub const CLAMP_POLICY: ClampPolicy = ClampPolicy::ClosedLoopOnly;

/// Output clamping policy for the pulse driver.
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum ClampPolicy {
    /// Clamp only commands computed by the PID (open-loop values pass through).
    ClosedLoopOnly,
    /// Clamp every command regardless of operating mode.
    Always,
}

/// PWM counter rate for the servo output. At 2 MHz one counter tick is
/// 0.5 us, so the compare value is exactly twice the pulse width in us.
pub const PWM_TICK_HZ: u32 = 2_000_000;

/// Servo PWM frame rate expected by standard ESCs.
pub const PWM_FRAME_HZ: u32 = 50;

/// Interval-capture timebase: edge intervals are measured in 1 us ticks
/// with a 16-bit counter span, mirroring a free-running hardware counter
/// plus software overflow count.
pub const CAPTURE_TICK_PERIOD_S: f32 = 1e-6;
pub const CAPTURE_TICKS_PER_OVERFLOW: u32 = 65_536;

/// Maximum significant characters in one serial command line (excluding
/// the newline terminator). An unterminated longer line is discarded.
pub const SERIAL_LINE_MAX: usize = 7;

/// Serial command/telemetry baud rate.
pub const SERIAL_BAUD: u32 = 115_200;

/// How long the ESC throttle-range calibration holds each extreme pulse.
pub const CALIBRATION_HOLD: Duration = Duration::from_millis(2000);
