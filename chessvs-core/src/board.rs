//! Board coordinates, moves and snapshots

use crate::error::ChessError;
use crate::pieces::{Piece, PieceKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Board size along each axis
pub const BOARD_SIZE: u8 = 8;

/// Board square, file 0..8 (a..h) and rank 0..8 (1..8)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Build a square, rejecting out-of-range coordinates
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < BOARD_SIZE && rank < BOARD_SIZE).then_some(Self { file, rank })
    }

    pub fn file(&self) -> u8 {
        self.file
    }

    pub fn rank(&self) -> u8 {
        self.rank
    }

    /// Index 0..64 with a1 = 0, h1 = 7, h8 = 63
    pub fn index(&self) -> usize {
        self.rank as usize * BOARD_SIZE as usize + self.file as usize
    }

    /// Iterate all 64 squares from a1 to h8
    pub fn all() -> impl Iterator<Item = Square> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Square { file, rank }))
    }

    pub(crate) fn to_engine(self) -> chess::Square {
        chess::ALL_SQUARES[self.index()]
    }

    pub(crate) fn from_engine(sq: chess::Square) -> Self {
        Self {
            file: sq.get_file().to_index() as u8,
            rank: sq.get_rank().to_index() as u8,
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(ChessError::InvalidSquare(s.to_string()));
        }
        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        Square::new(file, rank).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

impl TryFrom<String> for Square {
    type Error = ChessError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(sq: Square) -> Self {
        sq.to_string()
    }
}

/// A concrete move: source, destination and optional promotion piece
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PieceKind>,
}

impl Move {
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    pub const fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    pub(crate) fn to_engine(self) -> chess::ChessMove {
        chess::ChessMove::new(
            self.from.to_engine(),
            self.to.to_engine(),
            self.promotion.map(PieceKind::to_engine),
        )
    }

    pub(crate) fn from_engine(mv: chess::ChessMove) -> Self {
        Self {
            from: Square::from_engine(mv.get_source()),
            to: Square::from_engine(mv.get_dest()),
            promotion: mv.get_promotion().map(PieceKind::from_engine),
        }
    }
}

/// UCI long algebraic notation, e.g. "e2e4" or "e7e8q"
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || ChessError::InvalidMove(s.to_string());
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(invalid());
        }
        let from: Square = s[0..2].parse().map_err(|_| invalid())?;
        let to: Square = s[2..4].parse().map_err(|_| invalid())?;
        let promotion = match s[4..].chars().next() {
            None => None,
            Some(c) => match PieceKind::from_letter(c) {
                Some(kind @ (PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen)) => {
                    Some(kind)
                }
                _ => return Err(invalid()),
            },
        };
        Ok(Self { from, to, promotion })
    }
}

/// 8x8 grid of optional pieces, indexed `[rank][file]` with rank 0 = rank 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct BoardSnapshot {
    squares: [[Option<Piece>; 8]; 8],
}

impl BoardSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.rank as usize][sq.file as usize]
    }

    pub fn set(&mut self, sq: Square, piece: Option<Piece>) {
        self.squares[sq.rank as usize][sq.file as usize] = piece;
    }

    /// Rows from rank 1 to rank 8
    pub fn rows(&self) -> &[[Option<Piece>; 8]; 8] {
        &self.squares
    }

    /// Iterate occupied squares from a1 to h8
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.get(sq).map(|p| (sq, p)))
    }

    /// Piece placement field of a FEN string
    pub fn placement(&self) -> String {
        let mut out = String::with_capacity(72);
        for rank in (0..BOARD_SIZE as usize).rev() {
            let mut empty = 0;
            for cell in &self.squares[rank] {
                match cell {
                    Some(piece) => {
                        if empty > 0 {
                            out.push(char::from(b'0' + empty));
                            empty = 0;
                        }
                        out.push(piece.fen_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push(char::from(b'0' + empty));
            }
            if rank > 0 {
                out.push('/');
            }
        }
        out
    }
}

/// Text diagram, rank 8 at the top
impl fmt::Display for BoardSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in (0..BOARD_SIZE as usize).rev() {
            write!(f, "{} ", rank + 1)?;
            for cell in &self.squares[rank] {
                let c = cell.map_or('.', |p| p.fen_char());
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}
