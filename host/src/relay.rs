//! Fan-out computation for chat and spectator reconciliation.
//!
//! Pure functions over the registry and session: they decide who gets
//! what, the network layer does the sending. Chat lines already carry the
//! sender's role label, so relaying is verbatim forwarding.

use crate::registry::SessionRegistry;
use shared::{GameSession, Message, SPECTATOR_CHAT_REPLAY};
use std::net::SocketAddr;

/// Where a chat line entered the session, as classified by the Host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatOrigin {
    /// Typed at the Host's own console.
    Host,
    /// Received from the Player-Client.
    Client,
    /// Received from the spectator at this address.
    Spectator(SocketAddr),
}

/// Addresses a chat line is forwarded to.
///
/// Host lines reach the Client and every spectator. Client lines reach
/// every spectator (the Client never talks to spectators directly).
/// Spectator lines reach the Client and every *other* spectator - never
/// an echo back to the sender.
pub fn chat_targets(registry: &SessionRegistry, origin: ChatOrigin) -> Vec<SocketAddr> {
    let mut targets = Vec::new();

    match origin {
        ChatOrigin::Host => {
            if let Some(client) = registry.client_addr() {
                targets.push(client);
            }
            targets.extend(registry.spectator_addrs());
        }
        ChatOrigin::Client => {
            targets.extend(registry.spectator_addrs());
        }
        ChatOrigin::Spectator(sender) => {
            if let Some(client) = registry.client_addr() {
                targets.push(client);
            }
            targets.extend(
                registry
                    .spectator_addrs()
                    .into_iter()
                    .filter(|addr| *addr != sender),
            );
        }
    }

    targets
}

/// Reconciliation burst for a newly joined spectator: exactly one board
/// snapshot, then up to the last [`SPECTATOR_CHAT_REPLAY`] chat entries as
/// individual messages in original order.
pub fn welcome_burst(session: &GameSession) -> Vec<Message> {
    let mut burst = vec![Message::Board(*session.board())];
    for line in session.chat_tail(SPECTATOR_CHAT_REPLAY) {
        burst.push(Message::Chat(line.clone()));
    }
    burst
}

/// Post-move push to every spectator: a fresh snapshot plus the combined
/// capture lists.
pub fn board_sync(session: &GameSession) -> Vec<Message> {
    vec![
        Message::Board(*session.board()),
        Message::Captured {
            white: session.captures().white().to_vec(),
            black: session.captures().black().to_vec(),
        },
    ]
}
