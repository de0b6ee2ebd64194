//! Response stage: acknowledges applied commands back to their senders

use crate::mailbox::Mailbox;
use crate::net::Socket;
use crate::protocol::MSG_SIZE;
use log::{debug, error};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Consumes applied commands and echoes them to the originating client
pub struct ResponseStage {
    input: Arc<Mailbox>,
    socket: Arc<Socket>,
}

impl ResponseStage {
    pub fn new(input: Arc<Mailbox>, socket: Arc<Socket>) -> Self {
        ResponseStage { input, socket }
    }

    /// Spawn the stage on a dedicated thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("response-stage".to_string())
            .spawn(move || self.run())
    }

    fn run(self) {
        debug!("response stage started");

        while let Some((client, packet)) = self.input.read() {
            // retry short sends until the whole packet went out
            loop {
                match self.socket.send_to(&packet, client) {
                    Ok(MSG_SIZE) => break,
                    Ok(0) => continue,
                    Ok(n) => {
                        error!("truncated send: {} of {} bytes", n, MSG_SIZE);
                        return;
                    }
                    Err(e) => {
                        // fatal to this stage only; the cascade still completes
                        error!("failed to send a packet: {}", e);
                        return;
                    }
                }
            }
        }

        debug!("response stage stopped");
    }
}
