//! Governor firmware entry point
//!
//! Initializes peripherals, optionally runs the ESC throttle-range
//! calibration, and spawns the control tasks.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::uart::{self, Uart};
use system::config::SERIAL_BAUD;
use system::resources::{
    AssignedResources, CommutationResources, EscResources, Irqs, ModeButtonResources,
    SerialResources, StatusLedResources,
};
use task::{
    control_loop::control_loop, edge_capture::edge_capture, mode_button::mode_button,
    orchestrate::orchestrate, pulse_output, serial_command::serial_command, status_led::status_led,
    telemetry::telemetry,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());
    let r = split_resources!(p);

    // The ESC output arms at the stop pulse as soon as the PWM is
    // configured; everything downstream assumes a valid neutral signal.
    let mut esc = pulse_output::EscPwm::new(r.esc);

    let mut button = Input::new(r.mode_button.pin, Pull::Up);
    let led = Output::new(r.status_led.pin, Level::Low);

    // Holding the button at power-on enters the one-time ESC
    // throttle-range calibration before normal operation.
    if button.is_low() {
        pulse_output::calibrate(&mut esc, &mut button).await;
    }

    let mut serial_config = uart::Config::default();
    serial_config.baudrate = SERIAL_BAUD;
    let serial = Uart::new(
        r.serial.uart,
        r.serial.tx_pin,
        r.serial.rx_pin,
        Irqs,
        r.serial.tx_dma,
        r.serial.rx_dma,
        serial_config,
    );
    let (serial_tx, serial_rx) = serial.split();

    spawner.spawn(orchestrate()).unwrap();
    spawner.spawn(status_led(led)).unwrap();
    spawner.spawn(mode_button(button)).unwrap();
    // Spawn the capture task before the control loop so the first cycle
    // can already see an edge interval.
    spawner.spawn(edge_capture(r.commutation)).unwrap();
    spawner.spawn(serial_command(serial_rx)).unwrap();
    spawner.spawn(telemetry(serial_tx)).unwrap();
    spawner.spawn(control_loop(esc)).unwrap();
}
