//! Status LED Module
//!
//! Drives the status LED from the governor state: solid while idle and
//! waiting for the start press, blinking while the loop runs, with the
//! blink rate distinguishing open from closed loop.

use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};

/// Blink interval while running open loop
const SLOW_BLINK_INTERVAL: Duration = Duration::from_millis(700);

/// Blink interval while running closed loop
const FAST_BLINK_INTERVAL: Duration = Duration::from_millis(150);

/// Signal carrying the latest requested LED pattern
static LED_PATTERN: Signal<CriticalSectionRawMutex, LedPattern> = Signal::new();

/// Requests a new LED pattern
pub fn update(pattern: LedPattern) {
    LED_PATTERN.signal(pattern);
}

/// LED display patterns
#[derive(Debug, Clone, Copy, PartialEq, defmt::Format)]
pub enum LedPattern {
    Off,
    /// Idle, armed-waiting
    Solid,
    /// Running, open loop
    SlowBlink,
    /// Running, closed loop
    FastBlink,
}

/// Status LED task
#[embassy_executor::task]
pub async fn status_led(mut led: Output<'static>) {
    let mut pattern = LedPattern::Off;

    loop {
        match pattern {
            LedPattern::Off => {
                led.set_low();
                pattern = LED_PATTERN.wait().await;
            }
            LedPattern::Solid => {
                led.set_high();
                pattern = LED_PATTERN.wait().await;
            }
            LedPattern::SlowBlink | LedPattern::FastBlink => {
                let interval = if pattern == LedPattern::SlowBlink {
                    SLOW_BLINK_INTERVAL
                } else {
                    FAST_BLINK_INTERVAL
                };
                led.toggle();
                match select(Timer::after(interval), LED_PATTERN.wait()).await {
                    Either::First(()) => {}
                    Either::Second(new_pattern) => pattern = new_pattern,
                }
            }
        }
    }
}
