//! Shared datagram socket for ingress and response traffic
//!
//! One UDP socket carries both inbound commands (read by the ingress loop on
//! the main thread) and outbound acknowledgments (written by the response
//! stage). Sends from different threads are serialized by an internal lock;
//! the blocking receive is intentionally outside that lock so an in-flight
//! receive never stalls an acknowledgment.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};

/// Thread-safe wrapper around the shared listening/response socket
pub struct Socket {
    inner: UdpSocket,
    send_lock: Mutex<()>,
}

impl Socket {
    /// Bind the listening socket on all interfaces
    pub fn bind(port: u16) -> Result<Self> {
        let inner = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port))
            .map_err(|source| Error::Bind { port, source })?;

        Ok(Socket {
            inner,
            send_lock: Mutex::new(()),
        })
    }

    /// Local address of the bound socket (resolves port 0 bindings)
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }

    /// Blocking receive of one datagram; returns bytes read and the sender
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr)> {
        Ok(self.inner.recv_from(buf)?)
    }

    /// Blocking send of one datagram, serialized against concurrent senders
    pub fn send_to(&self, buf: &[u8], client: SocketAddr) -> Result<usize> {
        let _guard = self.send_lock.lock();
        Ok(self.inner.send_to(buf, client)?)
    }
}
