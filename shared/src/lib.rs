//! Shared protocol and session state for the UDP chess peers.
//!
//! Everything both sides of the wire need lives here: the tagged text
//! message codec, the fire-and-forget UDP transport adapter, the game
//! session replication engine, and the small supporting pieces (captured
//! piece tracking, chat log, countdown clocks, console command parsing).
//! The `host` and `client` crates build their role-specific loops on top.

use std::time::Duration;

pub use chess;

pub mod capture;
pub mod chat;
pub mod clock;
pub mod command;
pub mod message;
pub mod session;
pub mod transport;

pub use capture::CapturedPieces;
pub use chat::ChatLog;
pub use clock::ClockPair;
pub use command::LocalCommand;
pub use message::Message;
pub use session::{GameOutcome, GameSession, LifecyclePhase, Role};
pub use transport::Transport;

/// One datagram carries one message, UTF-8, at most this many bytes.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Back-off between empty receive polls on the inbound loop.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How many trailing chat entries a newly joined spectator is replayed.
pub const SPECTATOR_CHAT_REPLAY: usize = 10;

/// Per-side countdown budget when none is configured.
pub const DEFAULT_CLOCK_SECS: f32 = 600.0;
