//! Orchestrator Module
//!
//! Consumes system events and coordinates run/mode state transitions,
//! keeping the status LED in sync with the governor's state.

use defmt::info;

use crate::system::event;
use crate::system::state::{ControlMode, RunState, CONTROL_STATE};
use crate::task::status_led::{self, LedPattern};

/// Main orchestrator task
///
/// Continuously listens for button events and applies the state machine:
/// first press arms the loop, further presses toggle the operating mode,
/// a hold disarms back to idle.
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    status_led::update(LedPattern::Solid);

    loop {
        let event = event::wait().await;
        if let Some(pattern) = process_event(event).await {
            status_led::update(pattern);
        }
    }
}

/// Processes one event against the control state.
///
/// Returns the LED pattern matching the new state, or None when the
/// event caused no transition.
async fn process_event(event: event::Events) -> Option<LedPattern> {
    let mut state = CONTROL_STATE.lock().await;

    match event {
        event::Events::ButtonPressed => match state.run_state {
            RunState::Idle => {
                state.run_state = RunState::Running;
                info!("Armed: control loop running ({})", state.control_mode);
                Some(pattern_for(state.control_mode))
            }
            RunState::Running => {
                let mode = state.toggle_mode();
                info!("Mode toggled to {}", mode);
                Some(pattern_for(mode))
            }
        },
        event::Events::ButtonHoldStart => match state.run_state {
            RunState::Running => {
                state.run_state = RunState::Idle;
                info!("Disarm requested");
                Some(LedPattern::Solid)
            }
            RunState::Idle => None,
        },
        event::Events::ButtonHoldEnd => None,
    }
}

fn pattern_for(mode: ControlMode) -> LedPattern {
    match mode {
        ControlMode::OpenLoop => LedPattern::SlowBlink,
        ControlMode::ClosedLoop => LedPattern::FastBlink,
    }
}
