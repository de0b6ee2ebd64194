//! Driver stage: applies commands to the output driver

use crate::drivers::OutputDriver;
use crate::mailbox::Mailbox;
use crate::protocol::{self, STATUS_BYTE};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Consumes commands, applies them to the driver, forwards them downstream
///
/// The stage owns the output driver exclusively; nothing else mutates it
/// after construction, so the driver needs no internal locking.
pub struct DriverStage {
    input: Arc<Mailbox>,
    output: Arc<Mailbox>,
    driver: Box<dyn OutputDriver>,
}

impl DriverStage {
    pub fn new(input: Arc<Mailbox>, output: Arc<Mailbox>, driver: Box<dyn OutputDriver>) -> Self {
        DriverStage {
            input,
            output,
            driver,
        }
    }

    /// Spawn the stage on a dedicated thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("driver-stage".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        debug!("driver stage started");

        while let Some((client, packet)) = self.input.read() {
            match packet[STATUS_BYTE] {
                // stray line terminators are not commands
                b'\r' | b'\n' => {}
                status => self.driver.update(protocol::commands(status)),
            }

            // the acknowledgment mirrors the request, artifacts included
            self.output.write(client, packet);
        }

        // EOF: cascade downstream, then release the driver
        self.output.write_eof();
        self.driver.shutdown();
        debug!("driver stage stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};
    use std::sync::Mutex;

    /// Records every update for assertion
    struct RecordingDriver {
        updates: Arc<Mutex<Vec<u8>>>,
        shutdowns: Arc<Mutex<u32>>,
    }

    impl OutputDriver for RecordingDriver {
        fn update(&mut self, cmd: u8) {
            self.updates.lock().unwrap().push(cmd);
        }

        fn shutdown(&mut self) {
            *self.shutdowns.lock().unwrap() += 1;
        }
    }

    fn client() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 4000)
    }

    #[test]
    fn test_commands_reach_driver_and_are_forwarded() {
        let input = Arc::new(Mailbox::new());
        let output = Arc::new(Mailbox::new());
        let updates = Arc::new(Mutex::new(Vec::new()));
        let shutdowns = Arc::new(Mutex::new(0));
        let driver = Box::new(RecordingDriver {
            updates: Arc::clone(&updates),
            shutdowns: Arc::clone(&shutdowns),
        });

        let handle = DriverStage::new(Arc::clone(&input), Arc::clone(&output), driver)
            .spawn()
            .unwrap();

        // event bit plus unrecognized high bits
        input.write(client(), [0x05, 0xe0]);
        // forwarded downstream byte-identical
        assert_eq!(output.read(), Some((client(), [0x05, 0xe0])));

        input.write_eof();
        handle.join().unwrap();

        // unrecognized bits were stripped before the driver saw the command
        assert_eq!(*updates.lock().unwrap(), vec![0x20]);
        assert_eq!(*shutdowns.lock().unwrap(), 1);
        // EOF cascaded downstream
        assert_eq!(output.read(), None);
    }

    #[test]
    fn test_line_terminator_is_forwarded_but_not_applied() {
        let input = Arc::new(Mailbox::new());
        let output = Arc::new(Mailbox::new());
        let updates = Arc::new(Mutex::new(Vec::new()));
        let driver = Box::new(RecordingDriver {
            updates: Arc::clone(&updates),
            shutdowns: Arc::new(Mutex::new(0)),
        });

        let handle = DriverStage::new(Arc::clone(&input), Arc::clone(&output), driver)
            .spawn()
            .unwrap();

        input.write(client(), [0x00, b'\n']);
        assert_eq!(output.read(), Some((client(), [0x00, b'\n'])));

        input.write_eof();
        handle.join().unwrap();
        assert!(updates.lock().unwrap().is_empty());
    }
}
