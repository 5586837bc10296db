//! # Game Host Library
//!
//! Hosting side of the UDP chess session. The Host owns the authoritative
//! replica: it validates and applies moves (its own and the Player-Client's),
//! answers join handshakes, reconciles newly joined spectators with a full
//! snapshot plus a bounded chat replay, and fans chat, board updates, and
//! game-over notices out to everyone it knows about.
//!
//! The transport gives no delivery, ordering, or exactly-once guarantees,
//! and the protocol deliberately adds none back: no acknowledgments, no
//! sequence numbers, no retries. The Player-Client tier therefore risks
//! permanent divergence after a lost `MOVE`; the spectator tier self-heals
//! because every update is a whole snapshot.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! The address book: the single current Player-Client (a later join
//! silently evicts an earlier one) and the ever-growing spectator set.
//!
//! ### Relay Module (`relay`)
//! Pure fan-out decisions: chat forwarding targets per sender role, the
//! new-spectator welcome burst, and the post-move spectator sync.
//!
//! ### Network Module (`network`)
//! The loops: a spawned inbound task polling the socket, and the
//! interactive loop driving console input and the countdown clocks.

pub mod network;
pub mod registry;
pub mod relay;
