//! Captured piece bookkeeping and material point tallies.

use chess::{Color, Piece};

/// Ordered record of captured pieces, one list per color.
///
/// `white` holds white pieces that were captured, `black` the black ones.
/// On the playing peers the lists are append-only until the game ends; on
/// spectators they are replaced wholesale by each `CAPTURED` update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedPieces {
    white: Vec<Piece>,
    black: Vec<Piece>,
}

impl CapturedPieces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a freshly captured piece to its color's list.
    pub fn record(&mut self, piece: Piece, color: Color) {
        match color {
            Color::White => self.white.push(piece),
            Color::Black => self.black.push(piece),
        }
    }

    /// Replaces both lists wholesale with the contents of a `CAPTURED`
    /// update. Spectator-side only.
    pub fn replace(&mut self, white: Vec<Piece>, black: Vec<Piece>) {
        self.white = white;
        self.black = black;
    }

    pub fn white(&self) -> &[Piece] {
        &self.white
    }

    pub fn black(&self) -> &[Piece] {
        &self.black
    }

    pub fn is_empty(&self) -> bool {
        self.white.is_empty() && self.black.is_empty()
    }

    /// Material points lost by the given color so far.
    pub fn points_lost(&self, color: Color) -> u32 {
        let list = match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        };
        list.iter().copied().map(piece_points).sum()
    }

    /// Display-ready tally line, e.g. `P N (Total: 4)`.
    pub fn tally_line(&self, color: Color) -> String {
        let list = match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        };
        let symbols = list
            .iter()
            .map(|p| p.to_string(color))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} (Total: {})", symbols, self.points_lost(color))
    }
}

/// Standard material value of a piece. Kings carry no exchange value.
pub fn piece_points(piece: Piece) -> u32 {
    match piece {
        Piece::Pawn => 1,
        Piece::Knight => 3,
        Piece::Bishop => 3,
        Piece::Rook => 5,
        Piece::Queen => 9,
        Piece::King => 0,
    }
}

/// Parses a single piece letter (either case) from the wire.
pub fn piece_from_symbol(symbol: &str) -> Option<Piece> {
    match symbol.to_ascii_lowercase().as_str() {
        "p" => Some(Piece::Pawn),
        "n" => Some(Piece::Knight),
        "b" => Some(Piece::Bishop),
        "r" => Some(Piece::Rook),
        "q" => Some(Piece::Queen),
        "k" => Some(Piece::King),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut captures = CapturedPieces::new();
        captures.record(Piece::Pawn, Color::Black);
        captures.record(Piece::Knight, Color::Black);
        captures.record(Piece::Queen, Color::White);

        assert_eq!(captures.black(), &[Piece::Pawn, Piece::Knight]);
        assert_eq!(captures.white(), &[Piece::Queen]);
    }

    #[test]
    fn test_points_lost() {
        let mut captures = CapturedPieces::new();
        captures.record(Piece::Pawn, Color::White);
        captures.record(Piece::Rook, Color::White);
        captures.record(Piece::Bishop, Color::Black);

        assert_eq!(captures.points_lost(Color::White), 6);
        assert_eq!(captures.points_lost(Color::Black), 3);
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut captures = CapturedPieces::new();
        captures.record(Piece::Pawn, Color::White);
        captures.record(Piece::Pawn, Color::Black);

        captures.replace(vec![Piece::Queen], vec![]);

        assert_eq!(captures.white(), &[Piece::Queen]);
        assert!(captures.black().is_empty());
    }

    #[test]
    fn test_tally_line() {
        let mut captures = CapturedPieces::new();
        captures.record(Piece::Pawn, Color::Black);
        captures.record(Piece::Knight, Color::Black);

        assert_eq!(captures.tally_line(Color::Black), "p n (Total: 4)");
        assert_eq!(captures.tally_line(Color::White), " (Total: 0)");
    }

    #[test]
    fn test_piece_symbol_parsing() {
        assert_eq!(piece_from_symbol("q"), Some(Piece::Queen));
        assert_eq!(piece_from_symbol("Q"), Some(Piece::Queen));
        assert_eq!(piece_from_symbol("k"), Some(Piece::King));
        assert_eq!(piece_from_symbol("x"), None);
        assert_eq!(piece_from_symbol(""), None);
        assert_eq!(piece_from_symbol("qq"), None);
    }
}
