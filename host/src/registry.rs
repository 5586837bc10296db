//! Session registry: the Host's address book.
//!
//! The Host is the only meaningfully stateful participant of the join
//! handshake. It tracks:
//! - the single current Player-Client address (a later join overwrites an
//!   earlier one; the evicted peer is never told)
//! - the set of spectator addresses (unbounded, and with no removal path:
//!   a spectator that stops responding stays in the set for the lifetime
//!   of the process - an accepted leak, not a bug)
//!
//! Clients and spectators keep no registry at all; they only know the
//! Host's address.

use log::info;
use std::collections::HashSet;
use std::net::SocketAddr;

/// Host-side role assignment and address book.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    /// The single Player-Client, once one has said hello.
    client_addr: Option<SocketAddr>,
    /// Every spectator that has ever said hello.
    spectators: HashSet<SocketAddr>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) the Player-Client.
    ///
    /// At most one Client is supported; a second `HELLO_CLIENT` silently
    /// evicts the first from the Host's perspective. Returns the evicted
    /// address so the caller can log the race.
    pub fn register_client(&mut self, addr: SocketAddr) -> Option<SocketAddr> {
        let evicted = self.client_addr.filter(|prior| *prior != addr);
        self.client_addr = Some(addr);
        info!("client registered from {}", addr);
        evicted
    }

    /// Adds a spectator address. Returns false if it was already known
    /// (re-joins are harmless and idempotent).
    pub fn register_spectator(&mut self, addr: SocketAddr) -> bool {
        let added = self.spectators.insert(addr);
        if added {
            info!("spectator registered from {} ({} total)", addr, self.spectators.len());
        }
        added
    }

    pub fn client_addr(&self) -> Option<SocketAddr> {
        self.client_addr
    }

    /// True when `addr` is the current Player-Client.
    pub fn is_client(&self, addr: SocketAddr) -> bool {
        self.client_addr == Some(addr)
    }

    pub fn is_spectator(&self, addr: SocketAddr) -> bool {
        self.spectators.contains(&addr)
    }

    /// Snapshot of every spectator address, for fan-out.
    pub fn spectator_addrs(&self) -> Vec<SocketAddr> {
        self.spectators.iter().copied().collect()
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }
}
