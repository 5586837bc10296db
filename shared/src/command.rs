//! Console line parsing for the interactive loop.
//!
//! The presentation layer proper is out of scope; the binaries drive the
//! session through these commands instead. Unknown or malformed input is
//! reported locally and never reaches the wire.

use crate::message::parse_move;
use chess::ChessMove;

/// A local user action, parsed from one console line.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalCommand {
    /// `move e2e4` / `move e7e8q`
    Move(ChessMove),
    /// `say <text>`
    Say(String),
    /// `resign`
    Resign,
    /// `show` - print the current session state
    Show,
    /// `quit`
    Quit,
}

impl LocalCommand {
    /// Parses one trimmed console line. `Err` carries the line to show the
    /// user.
    pub fn parse(line: &str) -> Result<LocalCommand, String> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(' ') {
            Some((k, r)) => (k, r.trim()),
            None => (line, ""),
        };

        match keyword {
            "move" => match parse_move(rest) {
                Some(m) => Ok(LocalCommand::Move(m)),
                None => Err(format!(
                    "unreadable move '{}' (coordinate notation, e.g. e2e4 or e7e8q)",
                    rest
                )),
            },
            "say" if !rest.is_empty() => Ok(LocalCommand::Say(rest.to_string())),
            "say" => Err("nothing to say".to_string()),
            "resign" => Ok(LocalCommand::Resign),
            "show" => Ok(LocalCommand::Show),
            "quit" | "exit" => Ok(LocalCommand::Quit),
            "" => Err(usage()),
            other => Err(format!("unknown command '{}'\n{}", other, usage())),
        }
    }
}

fn usage() -> String {
    "commands: move <from><to>[promotion], say <text>, resign, show, quit".to_string()
}
