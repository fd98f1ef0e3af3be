//! Mode button handling
//!
//! Processes the single push button and generates events: a short press
//! starts the loop or toggles the operating mode, a long hold disarms.
//! The button is a plain mechanical switch, so every edge is debounced
//! with a fixed settle delay before being honored.

use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Level};
use embassy_time::{Duration, Timer};

use crate::system::event;

/// Button hold threshold (ms)
const HOLD_DURATION: Duration = Duration::from_millis(700);

/// Button debounce delay (ms)
const DEBOUNCE_DURATION: Duration = Duration::from_millis(30);

/// Mode button handler.
///
/// The button is wired active-low (pull-up, pressed = low).
///
/// Generates:
/// - ButtonPressed for short press
/// - ButtonHoldStart/End for long press
#[embassy_executor::task]
pub async fn mode_button(mut button: Input<'static>) {
    loop {
        let init_level = debounce(&mut button).await;

        if init_level != Level::Low {
            continue;
        };

        match select(Timer::after(HOLD_DURATION), debounce(&mut button)).await {
            Either::First(()) => {
                event::send(event::Events::ButtonHoldStart).await;
                button.wait_for_high().await;
                event::send(event::Events::ButtonHoldEnd).await;
            }
            Either::Second(_) => {
                event::send(event::Events::ButtonPressed).await;
            }
        };
    }
}

/// Ensures stable button state
async fn debounce(button: &mut Input<'static>) -> Level {
    loop {
        let st_level = button.get_level();
        button.wait_for_any_edge().await;
        Timer::after(DEBOUNCE_DURATION).await;
        let end_level = button.get_level();
        if st_level != end_level {
            break end_level;
        }
    }
}
