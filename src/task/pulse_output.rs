//! ESC servo pulse output
//!
//! Drives one hardware PWM channel as a standard 50 Hz servo signal. The
//! PWM counter is configured to tick at 2 MHz so the compare register is
//! exactly twice the pulse width in microseconds; writes land at the next
//! frame boundary through the hardware's own double buffering.
//!
//! Also hosts the one-time ESC throttle-range calibration sequence that
//! runs before normal operation when the button is held at power-on.

use defmt::info;
use embassy_rp::gpio::Input;
use embassy_rp::pwm;
use embassy_time::Timer;

use crate::system::config::{CALIBRATION_HOLD, PULSE_MAX_US, PULSE_STOP_US, PWM_FRAME_HZ, PWM_TICK_HZ};
use crate::system::pulse::compare_ticks;
use crate::system::resources::EscResources;

/// Hardware PWM wrapper producing the ESC pulse.
pub struct EscPwm {
    pwm: pwm::Pwm<'static>,
    config: pwm::Config,
}

impl EscPwm {
    /// Configures the PWM slice for the 50 Hz servo frame and arms the
    /// output at the stop pulse.
    ///
    /// The divider must map the system clock onto the 2 MHz counter tick
    /// exactly; if it cannot (unexpected clock configuration), the
    /// timebase underlying every speed estimate would be wrong, so this
    /// halts instead of running miscalibrated.
    pub fn new(r: EscResources) -> Self {
        let clock_freq_hz = embassy_rp::clocks::clk_sys_freq(); // 150MHz
        let divider = clock_freq_hz / PWM_TICK_HZ;
        if divider == 0 || divider > 255 || divider * PWM_TICK_HZ != clock_freq_hz {
            defmt::panic!(
                "cannot derive {}Hz PWM tick from {}Hz system clock",
                PWM_TICK_HZ,
                clock_freq_hz
            );
        }

        let mut config = pwm::Config::default();
        config.divider = (divider as u8).into();
        config.top = (PWM_TICK_HZ / PWM_FRAME_HZ - 1) as u16; // 20ms frame
        config.compare_a = compare_ticks(PULSE_STOP_US);

        let pwm = pwm::Pwm::new_output_a(r.slice, r.pin, config.clone());
        Self { pwm, config }
    }

    /// Writes a pulse width in microseconds into the compare register.
    pub fn write_pulse(&mut self, pulse_us: u16) {
        self.config.compare_a = compare_ticks(pulse_us);
        self.pwm.set_config(&self.config);
    }
}

/// ESC throttle-range calibration.
///
/// Standard RC ESC procedure: hold the maximum pulse until the user
/// confirms (button release and re-press, with the ESC typically beeping
/// its acknowledgement), then hold the stop pulse so the ESC learns both
/// endpoints.
pub async fn calibrate(esc: &mut EscPwm, button: &mut Input<'static>) {
    info!("ESC calibration: max pulse");
    esc.write_pulse(PULSE_MAX_US);

    button.wait_for_high().await;
    Timer::after(CALIBRATION_HOLD).await;
    button.wait_for_low().await;

    info!("ESC calibration: stop pulse");
    esc.write_pulse(PULSE_STOP_US);
    Timer::after(CALIBRATION_HOLD).await;

    button.wait_for_high().await;
    info!("ESC calibration done");
}
