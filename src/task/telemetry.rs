//! Serial telemetry output
//!
//! Emits one ASCII line per control cycle on the UART TX half: the
//! filtered RPM, and in open-loop mode also the pulse currently being
//! echoed, for the logging side of the serial client.
//!
//! The control loop hands records over through a bounded channel with a
//! non-blocking send; if the UART falls behind, records are dropped and
//! the next cycle's value supersedes them. Telemetry is a side effect,
//! never back-pressure on the control law.

use core::fmt::Write as _;

use defmt::{debug, Format};
use embassy_rp::uart::{Async, UartTx};
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use heapless::String;

/// Queued telemetry records; a few cycles of slack is plenty.
static TELEMETRY_CHANNEL: Channel<CriticalSectionRawMutex, TelemetryRecord, 4> = Channel::new();

/// One cycle's telemetry.
#[derive(Clone, Copy, Debug, Format)]
pub struct TelemetryRecord {
    /// Filtered shaft speed in RPM, truncated to whole RPM.
    pub filtered_rpm: u32,
    /// Pulse command to echo alongside the speed (open-loop mode).
    pub echo_pulse_us: Option<u16>,
}

/// Queues a record without blocking; drops it if the channel is full.
pub fn report(record: TelemetryRecord) {
    if TELEMETRY_CHANNEL.sender().try_send(record).is_err() {
        debug!("telemetry record dropped");
    }
}

/// Formats and transmits queued telemetry lines.
#[embassy_executor::task]
pub async fn telemetry(mut tx: UartTx<'static, Async>) {
    loop {
        let record = TELEMETRY_CHANNEL.receiver().receive().await;

        let mut line: String<24> = String::new();
        let result = match record.echo_pulse_us {
            Some(pulse) => writeln!(line, "{};{}", record.filtered_rpm, pulse),
            None => writeln!(line, "{}", record.filtered_rpm),
        };
        if result.is_err() {
            // Cannot happen with the field widths above; skip rather than
            // send a truncated line.
            continue;
        }

        let _ = tx.write(line.as_bytes()).await;
    }
}
