//! Serial trigger driver for Arduino-based output boards
//!
//! The board accepts one output byte per transaction and echoes one byte
//! back. The echo doubles as the acknowledgment and as the rate limiter:
//! the driver never has more than one transaction in flight, so an update's
//! wall-clock duration is the true command-to-hardware latency.
//!
//! Two board variants exist. Leonardo-type boards enumerate instantly and
//! get a baseline clear as a handshake; Uno-type boards reset on port open
//! and signal readiness by printing a line, which the driver waits for
//! before accepting commands.

use super::OutputDriver;
use crate::protocol;
use crate::transport::Transport;
use log::{debug, error, info, trace, warn};
use std::time::{Duration, Instant};

// Output bytes understood by the trigger firmware
const CLEAR: u8 = b'H';
const EVENT: u8 = b'L';
const SYNC: u8 = b'A';
const LINE_END: u8 = b'\n';

/// Latency statistics over all successful transactions
#[derive(Debug, Default)]
struct LatencyStats {
    count: u64,
    total: Duration,
    min: Option<Duration>,
    max: Duration,
}

impl LatencyStats {
    fn record(&mut self, elapsed: Duration) {
        self.count += 1;
        self.total += elapsed;
        self.min = Some(self.min.map_or(elapsed, |m| m.min(elapsed)));
        self.max = self.max.max(elapsed);
    }

    fn log_summary(&self) {
        match self.min {
            Some(min) => {
                info!("minimal response latency: {:?}", min);
                info!("maximal response latency: {:?}", self.max);
                info!(
                    "average response latency: {:?}/transaction over {} transactions",
                    self.total / self.count as u32,
                    self.count
                );
            }
            None => info!("no serial transactions performed"),
        }
    }
}

/// Stateful driver for serial-attached trigger boards
pub struct ArduinoDriver<T: Transport> {
    conn: T,
    closed: bool,
    last_sent: u8,
    latency: LatencyStats,
}

impl<T: Transport> ArduinoDriver<T> {
    /// Leonardo-type board: ready immediately, handshake by clearing output
    pub fn leonardo(conn: T) -> Self {
        info!("initializing Leonardo trigger driver");
        let mut driver = Self::new(conn);
        driver.clear();
        driver
    }

    /// Uno-type board: resets on open, prints a line when ready
    pub fn uno(conn: T) -> Self {
        info!("initializing Uno trigger driver");
        let mut driver = Self::new(conn);
        driver.wait_for_line();
        driver
    }

    fn new(conn: T) -> Self {
        ArduinoDriver {
            conn,
            closed: false,
            last_sent: CLEAR,
            latency: LatencyStats::default(),
        }
    }

    /// Transmit the baseline-clear byte
    fn clear(&mut self) {
        self.update(0);
    }

    /// Block until the board prints its ready line
    ///
    /// A read failure during the wait closes the driver.
    fn wait_for_line(&mut self) {
        debug!("waiting for the board to become ready...");
        let mut buf = [0u8; 1];
        loop {
            match self.conn.read(&mut buf) {
                Ok(0) => continue,
                Ok(_) => {
                    if buf[0] == LINE_END {
                        break;
                    }
                }
                Err(e) => {
                    error!("error waiting for the board: {}", e);
                    self.shutdown();
                    return;
                }
            }
        }
        debug!("board is ready");
    }

    /// Block until one echo byte arrives
    fn read_echo(&mut self) -> crate::error::Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match self.conn.read(&mut buf)? {
                0 => continue,
                _ => return Ok(buf[0]),
            }
        }
    }
}

impl<T: Transport> OutputDriver for ArduinoDriver<T> {
    fn update(&mut self, cmd: u8) {
        if self.closed {
            trace!("update ignored: port already closed");
            return;
        }

        let mut out = CLEAR;
        if protocol::has_event(cmd) {
            out |= EVENT;
        }
        if protocol::has_sync(cmd) {
            out |= SYNC;
        }

        // Identical output state needs no transmission, except the baseline
        // clear which is always forwarded (used as the handshake).
        if out == self.last_sent && out != CLEAR {
            return;
        }

        let start = Instant::now();

        if let Err(e) = self.conn.write(&[out]).and_then(|_| self.conn.flush()) {
            error!("error sending serial command: {}", e);
            self.shutdown();
            return;
        }

        // The echo paces transmissions; no timeout, an unresponsive board
        // blocks the driver stage.
        if let Err(e) = self.read_echo() {
            error!("error receiving the echo: {}", e);
            self.shutdown();
            return;
        }

        self.last_sent = out;
        self.latency.record(start.elapsed());
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        info!("shutting down the trigger driver");
        if let Err(e) = self.conn.write(&[CLEAR]).and_then(|_| self.conn.flush()) {
            warn!("could not clear the output on shutdown: {}", e);
        }
        self.latency.log_summary();
    }
}

impl<T: Transport> Drop for ArduinoDriver<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    /// Leonardo handshake transmits the baseline clear and consumes its echo
    #[test]
    fn test_leonardo_handshake_clears_output() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);

        let _driver = ArduinoDriver::leonardo(mock.clone());
        assert_eq!(mock.get_written(), vec![CLEAR]);
    }

    /// Uno handshake consumes input up to the line end, transmitting nothing
    #[test]
    fn test_uno_handshake_waits_for_line() {
        let mock = MockTransport::new();
        mock.inject_read(b"ready\n");

        let mut driver = ArduinoDriver::uno(mock.clone());
        assert!(mock.get_written().is_empty());

        // the board accepts commands once the line was seen
        mock.inject_read(&[CLEAR | SYNC]);
        driver.update(protocol::MASK_SYNC);
        assert_eq!(mock.get_written(), vec![CLEAR | SYNC]);
    }

    /// Two updates with the same effective output byte produce one transaction
    #[test]
    fn test_repeated_command_is_suppressed() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);
        let mut driver = ArduinoDriver::leonardo(mock.clone());
        mock.clear_written();

        mock.inject_read(&[CLEAR | EVENT]);
        driver.update(protocol::MASK_EVENT);
        driver.update(protocol::MASK_EVENT);

        // exactly one write despite two updates
        assert_eq!(mock.get_written(), vec![CLEAR | EVENT]);
    }

    /// The baseline clear is never suppressed
    #[test]
    fn test_repeated_clear_is_transmitted() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);
        let mut driver = ArduinoDriver::leonardo(mock.clone());
        mock.clear_written();

        mock.inject_read(&[CLEAR]);
        driver.update(0);
        assert_eq!(mock.get_written(), vec![CLEAR]);
    }

    /// Event and sync bits compose into a single output byte
    #[test]
    fn test_command_bit_composition() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);
        let mut driver = ArduinoDriver::leonardo(mock.clone());
        mock.clear_written();

        mock.inject_read(&[CLEAR | EVENT | SYNC]);
        driver.update(protocol::MASK_EVENT | protocol::MASK_SYNC);
        assert_eq!(mock.get_written(), vec![CLEAR | EVENT | SYNC]);
    }

    /// Shutdown clears the output once; later updates and shutdowns are no-ops
    #[test]
    fn test_shutdown_is_idempotent_and_closes_updates() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);
        let mut driver = ArduinoDriver::leonardo(mock.clone());
        mock.clear_written();

        driver.shutdown();
        assert_eq!(mock.get_written(), vec![CLEAR]);

        driver.shutdown();
        driver.update(protocol::MASK_EVENT);
        assert_eq!(mock.get_written(), vec![CLEAR]);
    }

    /// A write failure permanently closes the driver
    #[test]
    fn test_write_failure_closes_driver() {
        let mock = MockTransport::new();
        mock.inject_read(&[CLEAR]);
        let mut driver = ArduinoDriver::leonardo(mock.clone());
        mock.clear_written();

        mock.fail_writes(true);
        driver.update(protocol::MASK_EVENT);

        // driver closed itself; re-enabled writes must not revive it
        mock.fail_writes(false);
        driver.update(protocol::MASK_EVENT);
        assert!(mock.get_written().is_empty());
    }
}
