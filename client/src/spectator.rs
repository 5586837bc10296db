//! Spectator network layer.
//!
//! A spectator never computes or applies moves. Its replica is a
//! best-effort mirror of the Host's: every `BOARD` wholesale-replaces the
//! position and every `CAPTURED` wholesale-replaces the capture lists.
//! That makes a single lost update self-healing (the next snapshot
//! supersedes it) at the price of visible jumps when datagrams arrive out
//! of order - there is no sequence number to reject a stale snapshot.

use log::{debug, info};
use shared::{GameSession, LocalCommand, Message, Role, Transport, POLL_INTERVAL};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::sync::Mutex;

/// A read-only observer of the hosted game.
pub struct Spectator {
    transport: Transport,
    session: Arc<Mutex<GameSession>>,
    server_addr: SocketAddr,
}

impl Spectator {
    pub async fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = Transport::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Spectator {
            transport,
            session: Arc::new(Mutex::new(GameSession::new(Role::Spectator, 0.0))),
            server_addr,
        })
    }

    pub fn session(&self) -> Arc<Mutex<GameSession>> {
        Arc::clone(&self.session)
    }

    fn spawn_inbound(&self) {
        let transport = self.transport.clone();
        let session = Arc::clone(&self.session);
        let server_addr = self.server_addr;

        tokio::spawn(async move {
            loop {
                match transport.poll_recv() {
                    Some((message, addr)) => {
                        if addr != server_addr {
                            debug!("datagram from unexpected sender {} ignored", addr);
                            continue;
                        }
                        handle_message(&session, message).await;
                    }
                    None => tokio::time::sleep(POLL_INTERVAL).await,
                }
            }
        });
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        // One hello, no retry: an unanswered join just means we watch
        // nothing until the process is restarted.
        self.transport
            .send(self.server_addr, &Message::HelloSpectator);
        info!("spectating {}", self.server_addr);

        self.spawn_inbound();

        println!("spectating - commands: say <text>, show, quit");

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match LocalCommand::parse(&line) {
                Ok(LocalCommand::Quit) => break,
                Ok(LocalCommand::Say(text)) => {
                    let line = format!("{}: {}", Role::Spectator.chat_label(), text);
                    let mut session = self.session.lock().await;
                    session.append_chat(line.clone());
                    drop(session);
                    // The Host forwards this to everyone but us.
                    self.transport.send(self.server_addr, &Message::Chat(line));
                }
                Ok(LocalCommand::Show) => {
                    let session = self.session.lock().await;
                    for line in session.status_lines() {
                        println!("{}", line);
                    }
                    for line in session.chat_tail(5) {
                        println!("| {}", line);
                    }
                }
                Ok(LocalCommand::Move(_)) | Ok(LocalCommand::Resign) => {
                    println!("spectators only watch; try say, show, or quit");
                }
                Err(reason) => println!("{}", reason),
            }
        }

        Ok(())
    }
}

/// Applies one datagram from the Host to the mirror replica.
async fn handle_message(session: &Arc<Mutex<GameSession>>, message: Message) {
    match message {
        Message::WelcomeSpectator => {
            info!("host acknowledged the join");
        }
        Message::Board(board) => {
            let mut session = session.lock().await;
            let was_concluded = session.outcome().is_terminal();
            session.apply_snapshot(board);
            if !was_concluded && session.outcome().is_terminal() {
                println!("{}", session.outcome());
            }
        }
        Message::Captured { white, black } => {
            let mut session = session.lock().await;
            session.replace_captures(white, black);
        }
        Message::Chat(text) => {
            let mut session = session.lock().await;
            session.append_chat(text.clone());
            println!("{}", text);
        }
        Message::GameOver(description) => {
            let mut session = session.lock().await;
            if session.conclude_announced(description) {
                println!("{}", session.outcome());
            }
        }
        other => {
            debug!("unexpected {:?} ignored", other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::chess::{Board, Piece};
    use shared::message::parse_move;
    use shared::{GameOutcome, LifecyclePhase};

    fn session() -> Arc<Mutex<GameSession>> {
        Arc::new(Mutex::new(GameSession::new(Role::Spectator, 0.0)))
    }

    #[tokio::test]
    async fn test_snapshot_replaces_position() {
        let session = session();
        let board = Board::default().make_move_new(parse_move("e2e4").unwrap());

        handle_message(&session, Message::Board(board)).await;

        let guard = session.lock().await;
        assert_eq!(*guard.board(), board);
        assert_eq!(guard.phase(), LifecyclePhase::InProgress);
    }

    #[tokio::test]
    async fn test_captured_update_replaces_lists() {
        let session = session();
        handle_message(
            &session,
            Message::Captured {
                white: vec![Piece::Pawn],
                black: vec![],
            },
        )
        .await;
        handle_message(
            &session,
            Message::Captured {
                white: vec![],
                black: vec![Piece::Rook],
            },
        )
        .await;

        let guard = session.lock().await;
        assert!(guard.captures().white().is_empty());
        assert_eq!(guard.captures().black(), &[Piece::Rook]);
    }

    #[tokio::test]
    async fn test_gameover_text_concludes_the_mirror() {
        let session = session();
        handle_message(
            &session,
            Message::GameOver("Black resigned. White wins!".to_string()),
        )
        .await;

        let guard = session.lock().await;
        assert_eq!(
            *guard.outcome(),
            GameOutcome::Announced("Black resigned. White wins!".to_string())
        );

        // A later snapshot still updates the position but not the outcome.
        drop(guard);
        handle_message(&session, Message::Board(Board::default())).await;
        let guard = session.lock().await;
        assert_eq!(guard.phase(), LifecyclePhase::Concluded);
    }
}
