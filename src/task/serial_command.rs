//! Serial command reception
//!
//! Reads the UART RX half one byte at a time, assembles newline-terminated
//! integer lines, range-checks the value against the current operating
//! mode and publishes it into the command mailbox. Anything malformed,
//! overflowing or out of range is discarded here and never reaches the
//! control loop.

use defmt::{info, warn};
use embassy_rp::uart::{Async, UartRx};

use crate::system::command::{self, ExternalCommand, LineParser};
use crate::system::config::{PULSE_MAX_US, PULSE_MIN_US, SETPOINT_MAX_RPM, SETPOINT_MIN_RPM};
use crate::system::state::{ControlMode, CONTROL_STATE};

/// Receives and validates serial command lines.
#[embassy_executor::task]
pub async fn serial_command(mut rx: UartRx<'static, Async>) {
    let mut parser = LineParser::new();
    let mut byte = [0u8; 1];

    info!("Serial command channel started");

    loop {
        if rx.read(&mut byte).await.is_err() {
            // Framing/break noise on the line; the parser state is still
            // consistent, keep reading.
            continue;
        }

        let Some(value) = parser.push(byte[0]) else {
            continue;
        };

        // Tag the value by the mode current at parse time.
        let mode = CONTROL_STATE.lock().await.control_mode;
        let command = match mode {
            ControlMode::OpenLoop => {
                if (PULSE_MIN_US as i32..=PULSE_MAX_US as i32).contains(&value) {
                    Some(ExternalCommand::RawPulse(value as u16))
                } else {
                    None
                }
            }
            ControlMode::ClosedLoop => {
                if (SETPOINT_MIN_RPM as i32..=SETPOINT_MAX_RPM as i32).contains(&value) {
                    Some(ExternalCommand::Setpoint(value as u16))
                } else {
                    None
                }
            }
        };

        match command {
            Some(command) => {
                info!("Command received: {}", command);
                command::publish(command);
            }
            None => warn!("Discarding out-of-range command {} for mode {}", value, mode),
        }
    }
}
