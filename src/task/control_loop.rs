//! Control loop supervisor
//!
//! Runs one control cycle per sampling tick: drain the command mailbox,
//! update the speed estimate, run the PID law or the open-loop
//! passthrough, shape and write the output pulse, and queue telemetry.
//!
//! All controller state (integral accumulator, filter history, output
//! slew state) lives inside this task and is touched by nothing else;
//! the shared pieces are the two single-slot mailboxes (edge interval,
//! external command) and the mode/run state behind the state mutex.

use defmt::{info, warn};
use embassy_time::Ticker;

use crate::system::command::{self, ExternalCommand};
use crate::system::config::{
    CLAMP_POLICY, EMA_WINDOW, KD, KI, KP, MOTOR_POLES, PULSE_MAX_US, PULSE_MIN_US, PULSE_STOP_US,
    SAMPLE_INTERVAL, WINDUP_FRACTION,
};
use crate::system::estimator::SpeedEstimator;
use crate::system::pid::{PidController, PidGains};
use crate::system::pulse::PulseShaper;
use crate::system::state::{ControlMode, RunState, CONTROL_STATE};
use crate::task::edge_capture;
use crate::task::pulse_output::EscPwm;
use crate::task::telemetry::{self, TelemetryRecord};

/// Per-cycle control task.
#[embassy_executor::task]
pub async fn control_loop(mut esc: EscPwm) {
    let mut estimator =
        SpeedEstimator::new(edge_capture::capture_timebase(), MOTOR_POLES, EMA_WINDOW);
    let mut pid = PidController::new(
        PidGains {
            kp: KP,
            ki: KI,
            kd: KD,
        },
        WINDUP_FRACTION,
        PULSE_STOP_US,
    );
    let mut shaper = PulseShaper::new(
        PULSE_MIN_US,
        PULSE_MAX_US,
        EMA_WINDOW,
        CLAMP_POLICY,
        PULSE_STOP_US,
    );

    info!("Control loop started (idle)");

    let mut ticker = Ticker::every(SAMPLE_INTERVAL);
    let mut last_run_state = RunState::Idle;
    let mut last_mode = ControlMode::OpenLoop;

    loop {
        ticker.next().await;

        // Fold the freshest external command into the shared state before
        // snapshotting it. A command tagged for the other mode is stale
        // (the mode flipped after parsing) and is dropped; the sender's
        // next line supersedes it.
        let (run_state, mode, open_pulse, setpoint) = {
            let mut state = CONTROL_STATE.lock().await;
            if let Some(cmd) = command::try_take() {
                match (cmd, state.control_mode) {
                    (ExternalCommand::RawPulse(pulse), ControlMode::OpenLoop) => {
                        state.open_loop_pulse_us = pulse;
                    }
                    (ExternalCommand::Setpoint(rpm), ControlMode::ClosedLoop) => {
                        state.setpoint_rpm = rpm;
                    }
                    (cmd, mode) => warn!("dropping stale command {} in mode {}", cmd, mode),
                }
            }
            (
                state.run_state,
                state.control_mode,
                state.open_loop_pulse_us,
                state.setpoint_rpm,
            )
        };

        if run_state == RunState::Idle {
            if last_run_state == RunState::Running {
                info!("Disarmed: stop pulse, controller state cleared");
                esc.write_pulse(PULSE_STOP_US);
                estimator.reset();
                pid.reset();
                shaper.reset(PULSE_STOP_US);
            }
            last_run_state = RunState::Idle;
            // Drain edges so the first running cycle does not see a
            // stale interval from before the disarm.
            let _ = edge_capture::try_take();
            continue;
        }
        last_run_state = RunState::Running;

        if mode != last_mode {
            info!("Mode changed to {}", mode);
            pid.reset();
            last_mode = mode;
        }

        // The estimator runs every cycle in both modes; open-loop
        // operation still reports the measured speed.
        let sample = estimator.update(edge_capture::try_take());

        let shaped = match mode {
            ControlMode::OpenLoop => shaper.passthrough(open_pulse),
            ControlMode::ClosedLoop => {
                let raw = pid.update(setpoint as f32, sample.filtered_rpm, sample.derivative);
                shaper.shape(raw)
            }
        };
        esc.write_pulse(shaped.pulse_us);

        telemetry::report(TelemetryRecord {
            filtered_rpm: sample.filtered_rpm as u32,
            echo_pulse_us: match mode {
                ControlMode::OpenLoop => Some(shaped.pulse_us),
                ControlMode::ClosedLoop => None,
            },
        });
    }
}
