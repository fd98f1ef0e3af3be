//! Hardware Resource Management
//!
//! Manages and allocates hardware resources (pins, peripherals) to the
//! governor's tasks, ensuring clear ownership of every pin and PWM slice.
//!
//! # Resource Groups
//! - ESC output: one PWM slice channel producing the 50 Hz servo pulse
//! - Commutation sense: digital input carrying the filtered commutation signal
//! - Mode button: start / mode-toggle / disarm input
//! - Status LED: run-state indicator
//! - Serial: UART plus DMA channels for the command/telemetry link

use assign_resources::assign_resources;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, UART0};
use embassy_rp::uart::InterruptHandler as UartInterruptHandler;

assign_resources! {
    /// ESC servo pulse output (PWM channel A of the slice)
    esc: EscResources {
        slice: PWM_SLICE0,
        pin: PIN_0,
    },
    /// Commutation sense input from the motor's sensor board
    commutation: CommutationResources {
        pin: PIN_4,
    },
    /// Mode/start/disarm push button
    mode_button: ModeButtonResources {
        pin: PIN_16,
    },
    /// Status LED
    status_led: StatusLedResources {
        pin: PIN_25,
    },
    /// Serial command and telemetry link
    serial: SerialResources {
        uart: UART0,
        tx_pin: PIN_12,
        rx_pin: PIN_13,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
}

bind_interrupts!(pub struct Irqs {
    UART0_IRQ => UartInterruptHandler<UART0>;
});
