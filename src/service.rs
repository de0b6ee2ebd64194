//! Service orchestration: network ingress and the shutdown cascade
//!
//! The service owns the shared UDP socket and runs the ingress loop on the
//! calling thread. Each received command is handed to the driver stage
//! through a single-slot mailbox; a shutdown command (or a receive failure)
//! ends the loop and the service cascades EOF downstream, joins both stage
//! threads in order, and closes the socket.

use crate::config::Config;
use crate::drivers::{DriverRegistry, DummyDriver, OutputDriver};
use crate::error::Result;
use crate::mailbox::Mailbox;
use crate::net::Socket;
use crate::pipeline::{DriverStage, ResponseStage};
use crate::protocol::{self, MSG_SIZE, STATUS_BYTE};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;

/// The trigger relay service
pub struct Service {
    socket: Arc<Socket>,
    driver: Box<dyn OutputDriver>,
}

impl Service {
    /// Build a service from a loaded configuration
    ///
    /// Driver setup failure is recoverable (falls back to the dummy driver);
    /// a bind failure shuts the driver down and is returned as an error.
    pub fn configure(registry: &DriverRegistry, config: &Config) -> Result<Self> {
        info!("port={}, driver={}", config.port, config.driver);

        let driver = Self::get_driver(registry, config);

        let socket = match Socket::bind(config.port) {
            Ok(socket) => socket,
            Err(e) => {
                let mut driver = driver;
                driver.shutdown();
                return Err(e);
            }
        };

        Ok(Service {
            socket: Arc::new(socket),
            driver,
        })
    }

    fn get_driver(registry: &DriverRegistry, config: &Config) -> Box<dyn OutputDriver> {
        match registry.create(&config.driver, &config.options) {
            Ok(driver) => {
                info!("driver: {}", config.driver);
                driver
            }
            Err(e) => {
                warn!(
                    "failed to initialize the output driver: {}; \
                     falling back to using a dummy output driver",
                    e
                );
                Box::new(DummyDriver::new())
            }
        }
    }

    /// Local address of the listening socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Run the ingress loop until a shutdown command or a receive failure
    ///
    /// Consumes the service; stage threads are joined and the socket closed
    /// on every exit path before this returns.
    pub fn run(self) -> Result<()> {
        let to_driver = Arc::new(Mailbox::new());
        let to_response = Arc::new(Mailbox::new());

        let driver_stage = DriverStage::new(
            Arc::clone(&to_driver),
            Arc::clone(&to_response),
            self.driver,
        )
        .spawn()?;
        let response_stage = match ResponseStage::new(to_response, Arc::clone(&self.socket)).spawn()
        {
            Ok(handle) => handle,
            Err(e) => {
                // unwind the already-running driver stage before bailing out
                to_driver.write_eof();
                let _ = driver_stage.join();
                return Err(e.into());
            }
        };

        loop {
            let mut buf = [0u8; MSG_SIZE];
            match self.socket.recv_from(&mut buf) {
                Ok((0, _)) => continue,
                Ok((_, sender)) => {
                    if protocol::has_shutdown(buf[STATUS_BYTE]) {
                        debug!("shutdown requested by {}", sender);
                        to_driver.write_eof();
                        break;
                    }
                    to_driver.write(sender, buf);
                }
                Err(e) => {
                    error!("failed to receive a packet: {}", e);
                    to_driver.write_eof();
                    break;
                }
            }
        }

        info!("shutting down the server...");

        // strictly downstream: driver stage first, then the response stage
        if driver_stage.join().is_err() {
            error!("driver stage panicked");
        }
        if response_stage.join().is_err() {
            error!("response stage panicked");
        }

        // last reference: dropping the socket closes the descriptor
        debug!("closing the listening socket");
        drop(self.socket);

        Ok(())
    }
}
