//! Single-slot handoff mailbox between pipeline stages
//!
//! A `Mailbox` passes the latest unread command from one producer to one
//! consumer. A write replaces any unread value (lost-update semantics): the
//! pipeline deliberately favors bounded latency over completeness, so a slow
//! consumer observes only the most recent command, never a backlog. EOF is a
//! one-way terminal state used for the downstream shutdown cascade.

use crate::protocol::Packet;
use parking_lot::{Condvar, Mutex};
use std::net::SocketAddr;

struct Slot {
    value: Option<(SocketAddr, Packet)>,
    eof: bool,
}

/// Single-slot, overwrite-on-write mailbox with blocking read
pub struct Mailbox {
    slot: Mutex<Slot>,
    update: Condvar,
}

impl Mailbox {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Mailbox {
            slot: Mutex::new(Slot {
                value: None,
                eof: false,
            }),
            update: Condvar::new(),
        }
    }

    /// Store a packet, overwriting any unread value, and wake a reader
    pub fn write(&self, client: SocketAddr, packet: Packet) {
        let mut slot = self.slot.lock();
        slot.value = Some((client, packet));
        self.update.notify_all();
    }

    /// Transition to the terminal EOF state and wake all readers; idempotent
    pub fn write_eof(&self) {
        let mut slot = self.slot.lock();
        slot.eof = true;
        self.update.notify_all();
    }

    /// Take the unread packet, blocking while the mailbox is empty
    ///
    /// Returns `None` once EOF has been written, immediately and forever
    /// after; any value still in the slot at that point is discarded.
    pub fn read(&self) -> Option<(SocketAddr, Packet)> {
        let mut slot = self.slot.lock();
        loop {
            if slot.eof {
                return None;
            }
            if let Some(entry) = slot.value.take() {
                return Some(entry);
            }
            self.update.wait(&mut slot);
        }
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[test]
    fn test_write_then_read() {
        let mailbox = Mailbox::new();
        mailbox.write(addr(1000), [0x00, 0x20]);
        assert_eq!(mailbox.read(), Some((addr(1000), [0x00, 0x20])));
    }

    #[test]
    fn test_second_write_overwrites_unread_value() {
        let mailbox = Mailbox::new();
        mailbox.write(addr(1000), [0x01, 0x20]);
        mailbox.write(addr(2000), [0x02, 0x10]);
        // The first value is unobservable
        assert_eq!(mailbox.read(), Some((addr(2000), [0x02, 0x10])));
    }

    #[test]
    fn test_eof_is_terminal_and_nonblocking() {
        let mailbox = Mailbox::new();
        mailbox.write(addr(1000), [0x00, 0x20]);
        mailbox.write_eof();
        assert_eq!(mailbox.read(), None);
        assert_eq!(mailbox.read(), None);
        // writing again does not revive the mailbox
        mailbox.write_eof();
        assert_eq!(mailbox.read(), None);
    }

    #[test]
    fn test_read_blocks_until_write() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = Arc::clone(&mailbox);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.write(addr(1000), [0x07, 0x30]);
        });

        // blocks until the producer thread writes
        assert_eq!(mailbox.read(), Some((addr(1000), [0x07, 0x30])));
        handle.join().unwrap();
    }

    #[test]
    fn test_eof_wakes_blocked_reader() {
        let mailbox = Arc::new(Mailbox::new());
        let producer = Arc::clone(&mailbox);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            producer.write_eof();
        });

        assert_eq!(mailbox.read(), None);
        handle.join().unwrap();
    }
}
