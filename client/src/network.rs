//! Player-Client network layer.
//!
//! The joining player holds a tracking replica of the Host's game. Moves
//! flow both ways as `MOVE` datagrams and are re-validated on arrival;
//! with no acknowledgments on the wire, a lost datagram leaves the two
//! replicas permanently diverged, which surfaces only as later moves being
//! silently rejected.

use log::{debug, info};
use shared::{GameSession, LocalCommand, Message, Role, Transport, POLL_INTERVAL};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;
use tokio::sync::Mutex;
use tokio::time::interval;

/// The joining player, playing Black against the Host's White.
pub struct Player {
    transport: Transport,
    session: Arc<Mutex<GameSession>>,
    server_addr: SocketAddr,
}

impl Player {
    pub async fn connect(
        server_addr: &str,
        clock_secs: f32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = Transport::bind("0.0.0.0:0").await?;
        let server_addr = server_addr.parse()?;

        Ok(Player {
            transport,
            session: Arc::new(Mutex::new(GameSession::new(Role::PlayerClient, clock_secs))),
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
        // The hello goes out exactly once. There is no retry and no
        // timeout; a lost WELCOME just leaves the Host unaware of us.
        self.transport.send(self.server_addr, &Message::HelloClient);
        info!("joining {} as Black", self.server_addr);

        self.spawn_inbound();

        println!("joined as Black - commands: move <from><to>, say <text>, resign, show, quit");

        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        let mut ticker = interval(Duration::from_millis(250));
        let mut last_tick = Instant::now();

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line {
                        Ok(Some(line)) => {
                            if line.trim().is_empty() {
                                continue;
                            }
                            match LocalCommand::parse(&line) {
                                Ok(LocalCommand::Quit) => break,
                                Ok(command) => self.handle_command(command).await,
                                Err(reason) => println!("{}", reason),
                            }
                        }
                        Ok(None) => break,
                        Err(e) => {
                            debug!("console read failed: {}", e);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => {
                    let now = Instant::now();
                    let dt = now.duration_since(last_tick).as_secs_f32();
                    last_tick = now;

                    let mut session = self.session.lock().await;
                    if let Some(loser) = session.tick_clock(dt) {
                        info!("flag fell for {}", shared::session::color_name(loser));
                        println!("{}", session.outcome());
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&self, command: LocalCommand) {
        match command {
            LocalCommand::Move(m) => {
                let mut session = self.session.lock().await;
                if !session.propose_local_move(m) {
                    println!("move rejected");
                    return;
                }
                self.transport.send(self.server_addr, &Message::Move(m));
                if session.outcome().is_terminal() {
                    println!("{}", session.outcome());
                }
            }
            LocalCommand::Say(text) => {
                let line = format!("{}: {}", Role::PlayerClient.chat_label(), text);
                let mut session = self.session.lock().await;
                session.append_chat(line.clone());
                drop(session);
                self.transport.send(self.server_addr, &Message::Chat(line));
            }
            LocalCommand::Resign => {
                let mut session = self.session.lock().await;
                if !session.resign_local() {
                    println!("nothing to resign");
                    return;
                }
                println!("{}", session.outcome());
                drop(session);
                self.transport.send(self.server_addr, &Message::Resign);
            }
            LocalCommand::Show => {
                let session = self.session.lock().await;
                for line in session.status_lines() {
                    println!("{}", line);
                }
                for line in session.chat_tail(5) {
                    println!("| {}", line);
                }
            }
            LocalCommand::Quit => {}
        }
    }
}

/// Applies one datagram from the Host to the tracking replica.
async fn handle_message(session: &Arc<Mutex<GameSession>>, message: Message) {
    match message {
        Message::Welcome => {
            info!("host acknowledged the join");
        }
        Message::Move(m) => {
            let mut session = session.lock().await;
            if !session.apply_remote_move(m) {
                debug!("remote move rejected; replicas may have diverged");
                return;
            }
            if session.outcome().is_terminal() {
                println!("{}", session.outcome());
            }
        }
        Message::Chat(text) => {
            let mut session = session.lock().await;
            session.append_chat(text.clone());
            println!("{}", text);
        }
        Message::Resign => {
            let mut session = session.lock().await;
            if session.apply_remote_resign() {
                println!("{}", session.outcome());
            }
        }
        other => {
            debug!("unexpected {:?} ignored", other);
        }
    }
}
