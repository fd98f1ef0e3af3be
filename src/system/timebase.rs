//! Edge interval timebase
//!
//! Represents the time between two commutation edges the way the capture
//! hardware sees it: a free-running counter value plus the number of
//! counter overflows since the previous edge. Keeping the raw pair (rather
//! than a pre-multiplied duration) preserves full counter precision for
//! intervals longer than one counter period.

use defmt::Format;
use embassy_time::Duration;

/// Raw timing sample captured at the moment of a commutation edge.
///
/// Produced by the edge capture task, consumed at most once per control
/// cycle by the speed estimator, then superseded by the next edge.
#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub struct EdgeInterval {
    /// Counter ticks elapsed within the current counter period.
    pub counter_ticks: u32,
    /// Full counter periods elapsed since the previous edge.
    pub overflow_count: u32,
}

impl EdgeInterval {
    /// An interval of zero length, as seen before the first edge.
    pub const ZERO: Self = Self {
        counter_ticks: 0,
        overflow_count: 0,
    };
}

/// Conversion between raw counter samples and seconds.
#[derive(Clone, Copy, Debug)]
pub struct Timebase {
    /// Duration of one counter tick in seconds.
    pub tick_period_s: f32,
    /// Counter ticks per overflow period.
    pub ticks_per_overflow: u32,
}

impl Timebase {
    pub const fn new(tick_period_s: f32, ticks_per_overflow: u32) -> Self {
        Self {
            tick_period_s,
            ticks_per_overflow,
        }
    }

    /// Duration of one full counter period in seconds.
    pub fn counter_period_s(&self) -> f32 {
        self.tick_period_s * self.ticks_per_overflow as f32
    }

    /// Elapsed time of an interval:
    /// `counter_ticks * tick_period + overflow_count * counter_period`.
    pub fn elapsed_seconds(&self, interval: EdgeInterval) -> f32 {
        interval.counter_ticks as f32 * self.tick_period_s
            + interval.overflow_count as f32 * self.counter_period_s()
    }

    /// Decomposes a measured duration into counter ticks and overflows.
    ///
    /// Only valid for timebases whose tick is a whole number of
    /// microseconds; the capture task uses the 1 us system timebase.
    pub fn split_duration(&self, elapsed: Duration) -> EdgeInterval {
        let tick_us = (self.tick_period_s * 1e6) as u64;
        let ticks = elapsed.as_micros() / tick_us.max(1);
        EdgeInterval {
            counter_ticks: (ticks % self.ticks_per_overflow as u64) as u32,
            overflow_count: (ticks / self.ticks_per_overflow as u64) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 16 MHz counter, 50000-tick period: tick 62.5 ns, overflow 3.125 ms.
    const FAST: Timebase = Timebase::new(62.5e-9, 50_000);

    #[test]
    fn elapsed_is_ticks_plus_overflows() {
        let interval = EdgeInterval {
            counter_ticks: 1000,
            overflow_count: 2,
        };
        let expected = 1000.0 * 62.5e-9 + 2.0 * 3.125e-3;
        assert!((FAST.elapsed_seconds(interval) - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_interval_has_zero_elapsed() {
        assert_eq!(FAST.elapsed_seconds(EdgeInterval::ZERO), 0.0);
    }

    #[test]
    fn overflow_only_interval() {
        let interval = EdgeInterval {
            counter_ticks: 0,
            overflow_count: 4,
        };
        assert!((FAST.elapsed_seconds(interval) - 12.5e-3).abs() < 1e-9);
    }

    #[test]
    fn split_duration_round_trips_through_elapsed() {
        let micro = Timebase::new(1e-6, 65_536);
        let interval = micro.split_duration(Duration::from_micros(200_000));
        assert_eq!(interval.overflow_count, 3);
        assert_eq!(interval.counter_ticks, 200_000 - 3 * 65_536);
        let seconds = micro.elapsed_seconds(interval);
        assert!((seconds - 0.2).abs() < 1e-6);
    }

    #[test]
    fn split_duration_short_interval_has_no_overflow() {
        let micro = Timebase::new(1e-6, 65_536);
        let interval = micro.split_duration(Duration::from_micros(1500));
        assert_eq!(
            interval,
            EdgeInterval {
                counter_ticks: 1500,
                overflow_count: 0
            }
        );
    }
}
