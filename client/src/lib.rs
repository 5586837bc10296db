//! # Game Client Library
//!
//! The joining side of the UDP chess session, covering two roles:
//!
//! - **Player-Client** (`network`): plays Black against the hosting peer.
//!   Local moves are validated and applied optimistically before the
//!   `MOVE` datagram leaves the process; remote moves are re-validated on
//!   arrival rather than trusted. With no acknowledgments or sequence
//!   numbers on the wire, a lost datagram leaves the replicas permanently
//!   diverged - by design.
//! - **Spectator** (`spectator`): a read-only mirror fed by wholesale
//!   `BOARD`/`CAPTURED` replacements, self-healing against loss and
//!   indifferent to reordering, at the price of visible jumps.
//!
//! Both roles say hello exactly once at startup and never retry; both run
//! a background inbound task (poll + short sleep, abandoned at exit) next
//! to a console-driven interactive loop.

pub mod network;
pub mod spectator;
