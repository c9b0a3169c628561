//! Error types

use crate::board::Move;
use thiserror::Error;

/// Errors raised by the core crate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChessError {
    #[error("invalid square: {0:?}")]
    InvalidSquare(String),

    #[error("invalid move text: {0:?}")]
    InvalidMove(String),

    #[error("invalid FEN {fen:?}: {reason}")]
    InvalidFen { fen: String, reason: String },

    #[error("illegal move: {0}")]
    IllegalMove(Move),

    #[error("cannot {action} while {phase}")]
    WrongPhase {
        action: &'static str,
        phase: String,
    },

    #[error("nothing to undo")]
    NothingToUndo,
}

pub type Result<T> = std::result::Result<T, ChessError>;
