//! TrigIO - low-latency hardware trigger relay daemon
//!
//! Accepts 2-byte datagram commands from network clients, forwards each
//! command to a pluggable trigger output driver (serial-attached hardware or
//! a dummy emulator), and echoes the accepted command back to the sender.
//!
//! ## Pipeline
//!
//! ```text
//! client -> ingress (main thread) -> mailbox -> driver stage -> mailbox
//!        <------------------------ response stage <----------------+
//! ```
//!
//! Each mailbox holds only the latest unread command (overwrite-on-write);
//! shutdown propagates strictly downstream as an EOF marker.

pub mod config;
pub mod drivers;
pub mod error;
pub mod mailbox;
pub mod net;
pub mod pipeline;
pub mod protocol;
pub mod service;
pub mod transport;

pub use config::Config;
pub use error::{Error, Result};
