//! Fire-and-forget UDP transport adapter.
//!
//! Mirrors the protocol's at-most-once, no-guarantee contract: `send`
//! never blocks, never retries, and never surfaces a failure to the
//! caller; `poll_recv` never blocks the inbound loop, which sleeps
//! [`crate::POLL_INTERVAL`] between empty polls instead of parking on a
//! blocking read.

use crate::message::Message;
use crate::MAX_DATAGRAM_SIZE;
use log::{debug, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Cheap-to-clone handle on the peer's single UDP socket.
#[derive(Debug, Clone)]
pub struct Transport {
    socket: Arc<UdpSocket>,
}

impl Transport {
    /// Binds the peer's socket. The Host binds its configured port; other
    /// roles pass `0.0.0.0:0` for an ephemeral one.
    pub async fn bind(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Sends one message to one address. Failures (unreachable peer, full
    /// buffer, over-size frame) are swallowed; the next periodic send is
    /// the only retry this protocol has.
    pub fn send(&self, addr: SocketAddr, message: &Message) {
        let wire = message.encode();
        if wire.len() > MAX_DATAGRAM_SIZE {
            warn!("dropping over-size frame ({} bytes) to {}", wire.len(), addr);
            return;
        }
        if let Err(e) = self.socket.try_send_to(wire.as_bytes(), addr) {
            debug!("send to {} failed: {}", addr, e);
        }
    }

    /// Returns one decoded message and its sender, or `None` when nothing
    /// is available. Undecodable datagrams (non-UTF-8, unknown tag,
    /// malformed payload) are dropped here and also yield `None`.
    pub fn poll_recv(&self) -> Option<(Message, SocketAddr)> {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];
        match self.socket.try_recv_from(&mut buf) {
            Ok((len, addr)) => match std::str::from_utf8(&buf[..len]) {
                Ok(text) => match Message::decode(text) {
                    Some(message) => Some((message, addr)),
                    None => {
                        debug!("dropping undecodable datagram from {}", addr);
                        None
                    }
                },
                Err(_) => {
                    debug!("dropping non-UTF-8 datagram from {}", addr);
                    None
                }
            },
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => None,
            Err(e) => {
                debug!("receive failed: {}", e);
                None
            }
        }
    }
}
