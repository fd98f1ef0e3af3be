//! Task implementations
pub mod control_loop;
pub mod edge_capture;
pub mod mode_button;
pub mod orchestrate;
pub mod pulse_output;
pub mod serial_command;
pub mod status_led;
pub mod telemetry;
