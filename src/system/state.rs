//! Control State Management
//!
//! Holds the governor's global operating state: whether the control loop
//! is armed and which operating mode it runs in. The state is protected
//! by a mutex so the orchestrator, the serial task and the control loop
//! all see consistent transitions.
//!
//! Both state machines are explicit tagged variants with exactly the
//! transitions below; nothing else mutates them.
//!
//! - `RunState`: `Idle` → `Running` on the start press, `Running` → `Idle`
//!   on a disarm hold.
//! - `ControlMode`: toggled between `OpenLoop` and `ClosedLoop` by the
//!   mode button while running.

use defmt::Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

use crate::system::config::{PULSE_STOP_US, SETPOINT_MIN_RPM};

/// Global control state protected by a mutex.
///
/// Initialized to an idle, open-loop governor with the stop pulse as the
/// open-loop target and the minimum accepted setpoint.
pub static CONTROL_STATE: Mutex<CriticalSectionRawMutex, ControlState> =
    Mutex::new(ControlState {
        run_state: RunState::Idle,
        control_mode: ControlMode::OpenLoop,
        open_loop_pulse_us: PULSE_STOP_US,
        setpoint_rpm: SETPOINT_MIN_RPM,
    });

/// Governor runtime state shared between tasks.
#[derive(Format)]
pub struct ControlState {
    /// Whether the control loop is executing cycles.
    pub run_state: RunState,
    /// Open-loop passthrough vs closed-loop PID.
    pub control_mode: ControlMode,
    /// Last commanded open-loop pulse width in microseconds.
    pub open_loop_pulse_us: u16,
    /// Last commanded closed-loop setpoint in RPM.
    pub setpoint_rpm: u16,
}

impl ControlState {
    /// Flips between open- and closed-loop operation.
    pub fn toggle_mode(&mut self) -> ControlMode {
        self.control_mode = match self.control_mode {
            ControlMode::OpenLoop => ControlMode::ClosedLoop,
            ControlMode::ClosedLoop => ControlMode::OpenLoop,
        };
        self.control_mode
    }
}

/// Whether the control loop is armed and cycling.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum RunState {
    /// Waiting for the start trigger; the ESC sees the stop pulse.
    Idle,
    /// Executing one control cycle per sampling tick.
    Running,
}

/// Operating mode of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum ControlMode {
    /// External pulse commands pass straight to the output stage,
    /// PID state frozen.
    OpenLoop,
    /// Full PID law against the filtered speed estimate.
    ClosedLoop,
}
