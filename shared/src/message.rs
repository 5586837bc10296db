//! Tagged text message codec for the session replication protocol.
//!
//! One datagram carries one message, encoded as `TAG` or `TAG:PAYLOAD`.
//! Decoding is forward tolerant: an unrecognized tag is not an error, and a
//! malformed payload never panics the receiver. Both simply yield `None`
//! and the datagram is dropped.

use crate::capture::piece_from_symbol;
use chess::{Board, ChessMove, Color, Piece, Square};
use std::str::FromStr;

/// A decoded protocol message.
///
/// Payload-carrying variants hold parsed values, not raw text: a `Move`
/// that reaches the replication engine is already a well-formed square
/// pair, and a `Board` is already a valid position. Whether a move is
/// *legal* is decided separately against the local position.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    HelloClient,
    HelloSpectator,
    Welcome,
    WelcomeSpectator,
    Move(ChessMove),
    Chat(String),
    Resign,
    Board(Board),
    Captured {
        white: Vec<Piece>,
        black: Vec<Piece>,
    },
    GameOver(String),
}

impl Message {
    /// Encodes the message into its wire form.
    pub fn encode(&self) -> String {
        match self {
            Message::HelloClient => "HELLO_CLIENT".to_string(),
            Message::HelloSpectator => "HELLO_SPECTATOR".to_string(),
            Message::Welcome => "WELCOME".to_string(),
            Message::WelcomeSpectator => "WELCOME_SPECTATOR".to_string(),
            Message::Move(m) => format!("MOVE:{}", encode_move(m)),
            Message::Chat(text) => format!("CHAT:{}", text),
            Message::Resign => "RESIGN".to_string(),
            Message::Board(board) => format!("BOARD:{}", board),
            Message::Captured { white, black } => format!(
                "CAPTURED:{}|{}",
                encode_piece_list(white, Color::White),
                encode_piece_list(black, Color::Black)
            ),
            Message::GameOver(text) => format!("GAMEOVER:{}", text),
        }
    }

    /// Decodes one datagram's text into a message.
    ///
    /// Returns `None` for unknown tags and for payloads that fail to parse;
    /// the caller drops the datagram either way.
    pub fn decode(text: &str) -> Option<Message> {
        match text {
            "HELLO_CLIENT" => return Some(Message::HelloClient),
            "HELLO_SPECTATOR" => return Some(Message::HelloSpectator),
            "WELCOME" => return Some(Message::Welcome),
            "WELCOME_SPECTATOR" => return Some(Message::WelcomeSpectator),
            "RESIGN" => return Some(Message::Resign),
            _ => {}
        }

        if let Some(payload) = text.strip_prefix("MOVE:") {
            return parse_move(payload).map(Message::Move);
        }
        if let Some(payload) = text.strip_prefix("CHAT:") {
            return Some(Message::Chat(payload.to_string()));
        }
        if let Some(payload) = text.strip_prefix("BOARD:") {
            return Board::from_str(payload).ok().map(Message::Board);
        }
        if let Some(payload) = text.strip_prefix("CAPTURED:") {
            let (white, black) = payload.split_once('|')?;
            return Some(Message::Captured {
                white: decode_piece_list(white)?,
                black: decode_piece_list(black)?,
            });
        }
        if let Some(payload) = text.strip_prefix("GAMEOVER:") {
            return Some(Message::GameOver(payload.to_string()));
        }

        None
    }
}

/// Coordinate move text: source square, destination square, optional
/// promotion piece letter (`e2e4`, `e7e8q`).
fn encode_move(m: &ChessMove) -> String {
    match m.get_promotion() {
        Some(piece) => format!(
            "{}{}{}",
            m.get_source(),
            m.get_dest(),
            piece.to_string(Color::Black)
        ),
        None => format!("{}{}", m.get_source(), m.get_dest()),
    }
}

/// Parses coordinate move text. Shared with the console front end, which
/// accepts the same notation as the wire.
pub fn parse_move(text: &str) -> Option<ChessMove> {
    if text.len() < 4 || text.len() > 5 || !text.is_ascii() {
        return None;
    }
    let source = Square::from_str(&text[0..2]).ok()?;
    let dest = Square::from_str(&text[2..4]).ok()?;
    let promotion = match &text[4..] {
        "" => None,
        letter => Some(piece_from_symbol(letter)?),
    };
    Some(ChessMove::new(source, dest, promotion))
}

fn encode_piece_list(pieces: &[Piece], color: Color) -> String {
    pieces
        .iter()
        .map(|p| p.to_string(color))
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_piece_list(text: &str) -> Option<Vec<Piece>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split(',').map(piece_from_symbol).collect()
}
