//! External command mailbox and serial line parsing
//!
//! Commands arrive as one ASCII signed decimal integer per line. The
//! parser accumulates at most [`SERIAL_LINE_MAX`] significant characters;
//! a longer unterminated line flips into overflow-discard until the next
//! terminator, so a runaway sender cannot corrupt later commands.
//!
//! The mailbox is a single-slot latest-value cell: only the most recent
//! validated command matters, and the control loop drains it at most once
//! per cycle without ever blocking on it.

use defmt::Format;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::Vec;

use crate::system::config::SERIAL_LINE_MAX;

/// Most recent validated command from the serial channel.
static COMMAND: Signal<CriticalSectionRawMutex, ExternalCommand> = Signal::new();

/// Publishes a validated command, overwriting any unread one.
pub fn publish(command: ExternalCommand) {
    COMMAND.signal(command);
}

/// Takes the pending command, if one arrived since the last call.
pub fn try_take() -> Option<ExternalCommand> {
    COMMAND.try_take()
}

/// A validated integer command, tagged with how it is to be interpreted.
#[derive(Clone, Copy, Debug, Format, PartialEq, Eq)]
pub enum ExternalCommand {
    /// Direct pulse width in microseconds (open-loop mode).
    RawPulse(u16),
    /// Target shaft speed in RPM (closed-loop mode).
    Setpoint(u16),
}

/// Byte-at-a-time accumulator for newline-terminated integer lines.
pub struct LineParser {
    buf: Vec<u8, SERIAL_LINE_MAX>,
    overflow: bool,
}

impl LineParser {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Feeds one received byte.
    ///
    /// Returns `Some(value)` when a terminator completes a well-formed
    /// line. Malformed or overflowing lines are discarded and yield
    /// nothing; the parser is ready for the next line afterwards.
    pub fn push(&mut self, byte: u8) -> Option<i32> {
        if byte == b'\n' {
            let parsed = if self.overflow {
                None
            } else {
                parse_line(&self.buf)
            };
            self.buf.clear();
            self.overflow = false;
            return parsed;
        }

        if self.overflow {
            return None;
        }

        if self.buf.push(byte).is_err() {
            // Line exceeded the buffer without a terminator: discard
            // everything up to the next newline.
            self.buf.clear();
            self.overflow = true;
        }
        None
    }
}

fn parse_line(line: &[u8]) -> Option<i32> {
    let trimmed = match line {
        [rest @ .., b'\r'] => rest,
        _ => line,
    };
    core::str::from_utf8(trimmed).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(parser: &mut LineParser, line: &str) -> Option<i32> {
        let mut result = None;
        for byte in line.bytes() {
            result = parser.push(byte);
        }
        result
    }

    #[test]
    fn parses_simple_pulse_line() {
        let mut p = LineParser::new();
        assert_eq!(feed(&mut p, "1500\n"), Some(1500));
    }

    #[test]
    fn parses_negative_and_crlf_lines() {
        let mut p = LineParser::new();
        assert_eq!(feed(&mut p, "-250\r\n"), Some(-250));
        assert_eq!(feed(&mut p, "4500\n"), Some(4500));
    }

    #[test]
    fn seven_significant_chars_is_the_limit() {
        let mut p = LineParser::new();
        assert_eq!(feed(&mut p, "1234567\n"), Some(1_234_567));
    }

    #[test]
    fn overflowing_line_is_discarded_until_terminator() {
        let mut p = LineParser::new();
        // Nine digits: enters overflow-discard, yields nothing even at
        // the terminator.
        assert_eq!(feed(&mut p, "99999999\n"), None);
        // The next well-formed line parses normally.
        assert_eq!(feed(&mut p, "1500\n"), Some(1500));
    }

    #[test]
    fn malformed_line_is_discarded_silently() {
        let mut p = LineParser::new();
        assert_eq!(feed(&mut p, "12ab\n"), None);
        assert_eq!(feed(&mut p, "\n"), None);
        assert_eq!(feed(&mut p, "2000\n"), Some(2000));
    }
}
