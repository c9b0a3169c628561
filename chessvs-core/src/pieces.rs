//! Piece and colour definitions

use serde::{Deserialize, Serialize};

/// Side colour. Light moves first; the computer plays Dark by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Light = 0,
    Dark = 1,
}

impl Color {
    pub fn opponent(self) -> Self {
        match self {
            Color::Light => Color::Dark,
            Color::Dark => Color::Light,
        }
    }

    /// Single-letter code used in FEN ("w" / "b")
    pub fn fen_char(self) -> char {
        match self {
            Color::Light => 'w',
            Color::Dark => 'b',
        }
    }

    pub(crate) fn from_engine(color: chess::Color) -> Self {
        match color {
            chess::Color::White => Color::Light,
            chess::Color::Black => Color::Dark,
        }
    }
}

impl std::str::FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "white" | "w" => Ok(Color::Light),
            "dark" | "black" | "b" => Ok(Color::Dark),
            other => Err(format!("unknown colour: {other}")),
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Light => f.write_str("light"),
            Color::Dark => f.write_str("dark"),
        }
    }
}

/// Piece kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// All piece kinds, in material order
pub const PIECE_KINDS: [PieceKind; 6] = [
    PieceKind::Pawn,
    PieceKind::Knight,
    PieceKind::Bishop,
    PieceKind::Rook,
    PieceKind::Queen,
    PieceKind::King,
];

impl PieceKind {
    /// Material value used by the evaluator
    pub const fn value(self) -> i32 {
        match self {
            PieceKind::Pawn => 10,
            PieceKind::Knight => 30,
            PieceKind::Bishop => 30,
            PieceKind::Rook => 50,
            PieceKind::Queen => 90,
            PieceKind::King => 900,
        }
    }

    /// Lowercase letter as used in FEN and UCI promotion suffixes
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }

    pub(crate) fn from_engine(piece: chess::Piece) -> Self {
        match piece {
            chess::Piece::Pawn => PieceKind::Pawn,
            chess::Piece::Knight => PieceKind::Knight,
            chess::Piece::Bishop => PieceKind::Bishop,
            chess::Piece::Rook => PieceKind::Rook,
            chess::Piece::Queen => PieceKind::Queen,
            chess::Piece::King => PieceKind::King,
        }
    }

    pub(crate) fn to_engine(self) -> chess::Piece {
        match self {
            PieceKind::Pawn => chess::Piece::Pawn,
            PieceKind::Knight => chess::Piece::Knight,
            PieceKind::Bishop => chess::Piece::Bishop,
            PieceKind::Rook => chess::Piece::Rook,
            PieceKind::Queen => chess::Piece::Queen,
            PieceKind::King => chess::Piece::King,
        }
    }
}

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
}

impl Piece {
    pub const fn new(kind: PieceKind, color: Color) -> Self {
        Self { kind, color }
    }

    /// Signed material contribution: positive for Dark, negative for Light
    pub const fn signed_value(&self) -> i32 {
        match self.color {
            Color::Dark => self.kind.value(),
            Color::Light => -self.kind.value(),
        }
    }

    /// FEN letter (uppercase for Light)
    pub fn fen_char(&self) -> char {
        let c = self.kind.letter();
        match self.color {
            Color::Light => c.to_ascii_uppercase(),
            Color::Dark => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_values() {
        assert_eq!(PieceKind::Pawn.value(), 10);
        assert_eq!(PieceKind::Knight.value(), 30);
        assert_eq!(PieceKind::Bishop.value(), 30);
        assert_eq!(PieceKind::Rook.value(), 50);
        assert_eq!(PieceKind::Queen.value(), 90);
        assert_eq!(PieceKind::King.value(), 900);
    }

    #[test]
    fn test_signed_value() {
        assert_eq!(Piece::new(PieceKind::Rook, Color::Dark).signed_value(), 50);
        assert_eq!(Piece::new(PieceKind::Rook, Color::Light).signed_value(), -50);
    }

    #[test]
    fn test_letters_roundtrip() {
        for kind in PIECE_KINDS {
            assert_eq!(PieceKind::from_letter(kind.letter()), Some(kind));
        }
        assert_eq!(PieceKind::from_letter('x'), None);
    }

    #[test]
    fn test_color_parse() {
        assert_eq!("dark".parse::<Color>(), Ok(Color::Dark));
        assert_eq!("White".parse::<Color>(), Ok(Color::Light));
        assert!("green".parse::<Color>().is_err());
        assert_eq!(Color::Light.opponent(), Color::Dark);
    }
}
