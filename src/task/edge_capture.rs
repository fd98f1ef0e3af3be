//! Commutation edge interval capture
//!
//! Measures the time between consecutive falling edges of the commutation
//! sense signal and publishes each interval, decomposed into counter
//! ticks and overflow periods, into a single-slot mailbox. The control
//! loop drains the mailbox at most once per sampling tick; an unread
//! interval is simply overwritten by the next edge, which is the intended
//! latest-value semantics.
//!
//! The signal comes from a filtered commutation sensor, so no debouncing
//! is applied here.

use defmt::info;
use embassy_rp::gpio::{Input, Pull};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::Instant;

use crate::system::config::{CAPTURE_TICKS_PER_OVERFLOW, CAPTURE_TICK_PERIOD_S};
use crate::system::resources::CommutationResources;
use crate::system::timebase::{EdgeInterval, Timebase};

/// Latest captured edge interval. Single writer (this task), single
/// reader (the control loop); the signal's critical section makes the
/// two-field copy atomic with respect to the reader.
static EDGE_INTERVAL: Signal<CriticalSectionRawMutex, EdgeInterval> = Signal::new();

/// Takes the freshest interval, if an edge arrived since the last call.
pub fn try_take() -> Option<EdgeInterval> {
    EDGE_INTERVAL.try_take()
}

/// Timebase the capture runs on: 1 us ticks, 16-bit counter span.
pub const fn capture_timebase() -> Timebase {
    Timebase::new(CAPTURE_TICK_PERIOD_S, CAPTURE_TICKS_PER_OVERFLOW)
}

/// Captures inter-edge intervals on the commutation sense pin.
///
/// The very first interval after startup (or after a stall) is measured
/// from task start and may be arbitrarily large; the estimator's EMA
/// absorbs it.
#[embassy_executor::task]
pub async fn edge_capture(r: CommutationResources) {
    let mut sense = Input::new(r.pin, Pull::Up);
    let timebase = capture_timebase();

    info!("Edge capture started");

    let mut last_edge = Instant::now();
    loop {
        sense.wait_for_falling_edge().await;
        let now = Instant::now();
        let interval = timebase.split_duration(now - last_edge);
        last_edge = now;
        EDGE_INTERVAL.signal(interval);
    }
}
