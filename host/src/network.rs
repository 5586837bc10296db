//! Host network layer: inbound dispatch and the interactive loop.

use crate::registry::SessionRegistry;
use crate::relay::{self, ChatOrigin};
use log::{debug, info};
use shared::{GameSession, LocalCommand, Message, Role, Transport, POLL_INTERVAL};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::AsyncBufReadExt;
use tokio::sync::Mutex;
use tokio::time::interval;

/// The hosting peer: authoritative replica plus the address book.
///
/// Two logical tasks share the state: the spawned inbound task (datagram
/// poll + dispatch) and the interactive loop driving local input and the
/// clock tick. Lock order is always session before registry.
pub struct Host {
    transport: Transport,
    session: Arc<Mutex<GameSession>>,
    registry: Arc<Mutex<SessionRegistry>>,
}

impl Host {
    pub async fn bind(
        addr: &str,
        clock_secs: f32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let transport = Transport::bind(addr).await?;
        info!("hosting on {}", transport.local_addr()?);

        Ok(Host {
            transport,
            session: Arc::new(Mutex::new(GameSession::new(Role::Host, clock_secs))),
            registry: Arc::new(Mutex::new(SessionRegistry::new())),
        })
    }

    pub fn session(&self) -> Arc<Mutex<GameSession>> {
        Arc::clone(&self.session)
    }

    pub fn registry(&self) -> Arc<Mutex<SessionRegistry>> {
        Arc::clone(&self.registry)
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Spawns the background inbound task: poll, dispatch, short sleep
    /// when idle. Abandoned (never joined) when the process exits.
    pub fn spawn_inbound(&self) {
        let transport = self.transport.clone();
        let session = Arc::clone(&self.session);
        let registry = Arc::clone(&self.registry);

        tokio::spawn(async move {
            loop {
                match transport.poll_recv() {
                    Some((message, addr)) => {
                        handle_message(&transport, &session, &registry, message, addr).await;
                    }
                    None => tokio::time::sleep(POLL_INTERVAL).await,
                }
            }
        });
    }

    /// Interactive loop: console commands plus the periodic clock tick.
    /// Network failures never stop this loop; the local player can always
    /// inspect the board and resign or quit.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_inbound();

        println!("hosting as White - commands: move <from><to>, say <text>, resign, show, quit");

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
                    self.tick(dt).await;
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

                let registry = self.registry.lock().await;
                if let Some(client) = registry.client_addr() {
                    self.transport.send(client, &Message::Move(m));
                }
                for message in relay::board_sync(&session) {
                    for spectator in registry.spectator_addrs() {
                        self.transport.send(spectator, &message);
                    }
                }
                if session.outcome().is_terminal() {
                    println!("{}", session.outcome());
                }
            }
            LocalCommand::Say(text) => {
                let line = format!("{}: {}", Role::Host.chat_label(), text);
                let mut session = self.session.lock().await;
                session.append_chat(line.clone());
                drop(session);

                let registry = self.registry.lock().await;
                let message = Message::Chat(line);
                for target in relay::chat_targets(&registry, ChatOrigin::Host) {
                    self.transport.send(target, &message);
                }
            }
            LocalCommand::Resign => {
                let mut session = self.session.lock().await;
                if !session.resign_local() {
                    println!("nothing to resign");
                    return;
                }
                let description = session.outcome().to_string();
                println!("{}", description);
                drop(session);

                let registry = self.registry.lock().await;
                if let Some(client) = registry.client_addr() {
                    self.transport.send(client, &Message::Resign);
                }
                let gameover = Message::GameOver(description);
                for spectator in registry.spectator_addrs() {
                    self.transport.send(spectator, &gameover);
                }
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

    async fn tick(&self, dt: f32) {
        let mut session = self.session.lock().await;
        if let Some(loser) = session.tick_clock(dt) {
            // Timeouts conclude locally and are never transmitted.
            info!("flag fell for {}", shared::session::color_name(loser));
            println!("{}", session.outcome());
        }
    }
}

/// Dispatches one inbound datagram against the shared state.
///
/// Unknown senders and out-of-role messages are dropped with a debug log;
/// nothing here is a process-level error.
pub async fn handle_message(
    transport: &Transport,
    session: &Arc<Mutex<GameSession>>,
    registry: &Arc<Mutex<SessionRegistry>>,
    message: Message,
    addr: SocketAddr,
) {
    match message {
        Message::HelloClient => {
            let mut session = session.lock().await;
            let mut registry = registry.lock().await;
            if let Some(evicted) = registry.register_client(addr) {
                info!("client {} silently evicted by join from {}", evicted, addr);
            }
            transport.send(addr, &Message::Welcome);
            session.append_chat("A player joined as Black.".to_string());
        }
        Message::HelloSpectator => {
            let mut session = session.lock().await;
            let mut registry = registry.lock().await;
            registry.register_spectator(addr);
            transport.send(addr, &Message::WelcomeSpectator);
            session.append_chat("A spectator joined.".to_string());
            for message in relay::welcome_burst(&session) {
                transport.send(addr, &message);
            }
        }
        Message::Move(m) => {
            let mut session = session.lock().await;
            let registry = registry.lock().await;
            if !registry.is_client(addr) {
                debug!("MOVE from unexpected sender {} ignored", addr);
                return;
            }
            if !session.apply_remote_move(m) {
                debug!("remote move rejected; replicas may have diverged");
                return;
            }
            for message in relay::board_sync(&session) {
                for spectator in registry.spectator_addrs() {
                    transport.send(spectator, &message);
                }
            }
            if session.outcome().is_terminal() {
                println!("{}", session.outcome());
            }
        }
        Message::Chat(text) => {
            let mut session = session.lock().await;
            let registry = registry.lock().await;
            let origin = if registry.is_client(addr) {
                ChatOrigin::Client
            } else if registry.is_spectator(addr) {
                ChatOrigin::Spectator(addr)
            } else {
                debug!("CHAT from unknown sender {} ignored", addr);
                return;
            };

            session.append_chat(text.clone());
            println!("{}", text);

            let message = Message::Chat(text);
            for target in relay::chat_targets(&registry, origin) {
                transport.send(target, &message);
            }
        }
        Message::Resign => {
            let mut session = session.lock().await;
            let registry = registry.lock().await;
            if !registry.is_client(addr) {
                debug!("RESIGN from unexpected sender {} ignored", addr);
                return;
            }
            if !session.apply_remote_resign() {
                return;
            }
            let description = session.outcome().to_string();
            println!("{}", description);

            let gameover = Message::GameOver(description);
            for spectator in registry.spectator_addrs() {
                transport.send(spectator, &gameover);
            }
        }
        other => {
            debug!("unexpected {:?} from {} ignored", other, addr);
        }
    }
}
