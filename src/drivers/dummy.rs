//! Dummy output drivers
//!
//! The plain dummy discards every command; it doubles as the fallback when
//! the configured driver cannot be constructed. The verbose variant logs the
//! decoded flags of every command, which is handy for checking client wiring
//! without hardware attached.

use super::OutputDriver;
use crate::protocol;
use log::info;

/// No-op output driver
pub struct DummyDriver;

impl DummyDriver {
    pub fn new() -> Self {
        info!("initializing DummyDriver");
        DummyDriver
    }
}

impl Default for DummyDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDriver for DummyDriver {
    fn update(&mut self, _cmd: u8) {}

    fn shutdown(&mut self) {
        info!("shutting down DummyDriver");
    }
}

/// Dummy driver that logs the decoded flags of every command
pub struct VerboseDummyDriver;

impl VerboseDummyDriver {
    pub fn new() -> Self {
        info!("initializing VerboseDummyDriver");
        VerboseDummyDriver
    }
}

impl Default for VerboseDummyDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDriver for VerboseDummyDriver {
    fn update(&mut self, cmd: u8) {
        info!(
            "status: E={}, S={}, X={}",
            protocol::has_event(cmd),
            protocol::has_sync(cmd),
            protocol::has_shutdown(cmd)
        );
    }

    fn shutdown(&mut self) {
        info!("shutting down VerboseDummyDriver");
    }
}
