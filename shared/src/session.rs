//! Replication engine: the per-peer session state machine.
//!
//! Every peer owns exactly one [`GameSession`] holding its replica of the
//! game: position, captured pieces, chat log, clocks, and lifecycle. The
//! Host's replica is authoritative; the Player-Client tracks it
//! move-for-move; Spectators mirror it through wholesale snapshot
//! replacement. Move legality is never decided here - the session defers
//! to the rules engine (the `chess` crate) on its own board, which is also
//! why a remote move that arrives after replica divergence is simply
//! rejected: with no acknowledgments or sequence numbers on the wire,
//! divergence is permanent until restart.

use crate::capture::CapturedPieces;
use crate::chat::ChatLog;
use crate::clock::{format_clock, ClockPair};
use chess::{Board, BoardStatus, ChessMove, Color};
use std::fmt;

/// Which seat this process occupies. Fixed at startup for the process
/// lifetime; decides which side (if any) the peer may move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Host,
    PlayerClient,
    Spectator,
}

impl Role {
    /// The color this role plays. Host takes White, the joining client
    /// takes Black, spectators play nothing.
    pub fn play_color(&self) -> Option<Color> {
        match self {
            Role::Host => Some(Color::White),
            Role::PlayerClient => Some(Color::Black),
            Role::Spectator => None,
        }
    }

    /// Label prepended to outgoing chat lines.
    pub fn chat_label(&self) -> &'static str {
        match self {
            Role::Host => "Host",
            Role::PlayerClient => "Client",
            Role::Spectator => "Spectator",
        }
    }
}

/// How the game ended, if it has. Terminal once set: no later move,
/// resignation, timeout, or announcement may overwrite it.
#[derive(Debug, Clone, PartialEq)]
pub enum GameOutcome {
    Unresolved,
    Resigned { loser: Color },
    Timeout { loser: Color },
    Checkmate { loser: Color },
    Stalemate,
    /// Conclusion learned only as `GAMEOVER` text. Spectators never see a
    /// structured reason for a resignation, just the Host's description.
    Announced(String),
}

impl GameOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameOutcome::Unresolved)
    }
}

impl fmt::Display for GameOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameOutcome::Unresolved => write!(f, "game in progress"),
            GameOutcome::Resigned { loser } => write!(
                f,
                "{} resigned. {} wins!",
                color_name(*loser),
                color_name(!*loser)
            ),
            GameOutcome::Timeout { loser } => {
                write!(f, "{} wins by timeout!", color_name(!*loser))
            }
            GameOutcome::Checkmate { loser } => {
                write!(f, "{} wins by checkmate!", color_name(!*loser))
            }
            GameOutcome::Stalemate => write!(f, "Draw by stalemate!"),
            GameOutcome::Announced(text) => write!(f, "{}", text),
        }
    }
}

/// Coarse lifecycle view derived from (started, outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Waiting,
    InProgress,
    Concluded,
}

pub fn color_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}

/// One peer's replica of the shared game.
///
/// Mutated from two concurrent tasks (inbound network, interactive); the
/// owner wraps it in a mutex and exposes only these operations, never raw
/// fields.
#[derive(Debug, Clone)]
pub struct GameSession {
    role: Role,
    board: Board,
    captures: CapturedPieces,
    chat: ChatLog,
    clocks: ClockPair,
    outcome: GameOutcome,
    started: bool,
    in_check: bool,
}

impl GameSession {
    pub fn new(role: Role, clock_secs: f32) -> Self {
        Self {
            role,
            board: Board::default(),
            captures: CapturedPieces::new(),
            chat: ChatLog::new(),
            clocks: ClockPair::new(clock_secs),
            outcome: GameOutcome::Unresolved,
            started: false,
            in_check: false,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn captures(&self) -> &CapturedPieces {
        &self.captures
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn outcome(&self) -> &GameOutcome {
        &self.outcome
    }

    pub fn in_check(&self) -> bool {
        self.in_check
    }

    pub fn clocks(&self) -> &ClockPair {
        &self.clocks
    }

    pub fn phase(&self) -> LifecyclePhase {
        if self.outcome.is_terminal() {
            LifecyclePhase::Concluded
        } else if self.started {
            LifecyclePhase::InProgress
        } else {
            LifecyclePhase::Waiting
        }
    }

    /// A move typed by the local user. Applied optimistically - the mover
    /// sees the result before any datagram leaves the process. Returns
    /// true when the move was legal and applied, in which case the caller
    /// transmits it to the counterpart.
    pub fn propose_local_move(&mut self, m: ChessMove) -> bool {
        let color = match self.role.play_color() {
            Some(color) => color,
            None => return false,
        };
        if self.board.side_to_move() != color {
            return false;
        }
        self.apply_move(m)
    }

    /// A `MOVE` datagram from the counterpart. Re-validated against the
    /// local board, never trusted blindly. A rejection here means the
    /// replicas already diverged; the move is dropped with no reply and no
    /// recovery.
    pub fn apply_remote_move(&mut self, m: ChessMove) -> bool {
        self.apply_move(m)
    }

    fn apply_move(&mut self, m: ChessMove) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        if !self.board.legal(m) {
            return false;
        }

        // A capture is exactly "destination square was occupied"; the
        // occupant's color tells which list grows.
        if let Some(piece) = self.board.piece_on(m.get_dest()) {
            if let Some(color) = self.board.color_on(m.get_dest()) {
                self.captures.record(piece, color);
            }
        }

        self.board = self.board.make_move_new(m);
        self.started = true;
        self.in_check = self.board.checkers().popcnt() > 0;
        self.conclude_from_board();
        true
    }

    /// A `BOARD` snapshot from the Host. Wholesale replacement, last
    /// snapshot wins; there is no sequence number to reject a stale one.
    pub fn apply_snapshot(&mut self, board: Board) {
        self.board = board;
        self.started = true;
        self.in_check = board.checkers().popcnt() > 0;
        self.conclude_from_board();
    }

    /// A `CAPTURED` update from the Host. Both lists replaced, not merged.
    pub fn replace_captures(&mut self, white: Vec<chess::Piece>, black: Vec<chess::Piece>) {
        self.captures.replace(white, black);
    }

    /// Local resignation. Spectators cannot resign, and a concluded game
    /// ignores it. Returns true when the outcome changed, in which case
    /// the caller transmits `RESIGN`.
    pub fn resign_local(&mut self) -> bool {
        let color = match self.role.play_color() {
            Some(color) => color,
            None => return false,
        };
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = GameOutcome::Resigned { loser: color };
        true
    }

    /// A `RESIGN` datagram from the counterpart: they lose, we win. Not
    /// acknowledged.
    pub fn apply_remote_resign(&mut self) -> bool {
        let color = match self.role.play_color() {
            Some(color) => color,
            None => return false,
        };
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = GameOutcome::Resigned { loser: !color };
        true
    }

    /// A `GAMEOVER` description from the Host (spectator tier).
    pub fn conclude_announced(&mut self, description: String) -> bool {
        if self.outcome.is_terminal() {
            return false;
        }
        self.outcome = GameOutcome::Announced(description);
        true
    }

    /// Burns `dt` seconds from the clock of whoever the local board says
    /// is to move. Only playing peers tick, and only between the first
    /// move and the conclusion. Returns the loser on expiry. The
    /// conclusion stays local: timeouts are never transmitted.
    pub fn tick_clock(&mut self, dt: f32) -> Option<Color> {
        if self.role.play_color().is_none() {
            return None;
        }
        if !self.started || self.outcome.is_terminal() {
            return None;
        }
        let side = self.board.side_to_move();
        if self.clocks.tick(side, dt) {
            self.outcome = GameOutcome::Timeout { loser: side };
            return Some(side);
        }
        None
    }

    pub fn append_chat(&mut self, line: String) {
        self.chat.push(line);
    }

    pub fn chat_tail(&self, n: usize) -> &[String] {
        self.chat.tail(n)
    }

    /// Display-ready summary for the console front end.
    pub fn status_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("position: {}", self.board),
            format!("turn: {}", color_name(self.board.side_to_move())),
            format!(
                "captured white pieces: {}",
                self.captures.tally_line(Color::White)
            ),
            format!(
                "captured black pieces: {}",
                self.captures.tally_line(Color::Black)
            ),
        ];
        if self.role.play_color().is_some() {
            lines.push(format!(
                "clocks: White {} | Black {}",
                format_clock(self.clocks.remaining(Color::White)),
                format_clock(self.clocks.remaining(Color::Black))
            ));
        }
        if self.in_check && !self.outcome.is_terminal() {
            lines.push("CHECK!".to_string());
        }
        match self.phase() {
            LifecyclePhase::Waiting => lines.push("waiting for the first move".to_string()),
            LifecyclePhase::InProgress => {}
            LifecyclePhase::Concluded => lines.push(self.outcome.to_string()),
        }
        lines
    }

    // Each peer evaluates mate and stalemate independently against its own
    // replica; there is no cross-peer confirmation.
    fn conclude_from_board(&mut self) {
        if self.outcome.is_terminal() {
            return;
        }
        match self.board.status() {
            BoardStatus::Checkmate => {
                self.outcome = GameOutcome::Checkmate {
                    loser: self.board.side_to_move(),
                }
            }
            BoardStatus::Stalemate => self.outcome = GameOutcome::Stalemate,
            BoardStatus::Ongoing => {}
        }
    }
}
