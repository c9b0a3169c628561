//! CHESSVS Core - Game engine and AI
//!
//! This crate provides the core logic for playing chess against the computer:
//! - Squares, pieces and typed moves
//! - Rules engine seam with scoped apply/undo (backed by the `chess` crate)
//! - Material evaluation
//! - Fixed-depth exhaustive minimax AI
//! - Human-vs-computer game session state machine

pub mod board;
pub mod pieces;
pub mod error;
pub mod rules;
pub mod eval;
pub mod ai;
pub mod game;
pub mod config;

// Re-exports for convenient access
pub use board::{BoardSnapshot, Move, Square, BOARD_SIZE};
pub use pieces::{Color, Piece, PieceKind, PIECE_KINDS};
pub use error::{ChessError, Result};
pub use rules::{ChessRules, DrawReason, GameStatus, MoveGuard, RulesEngine, START_FEN};
pub use eval::{evaluate, evaluate_board, MATE_SCORE};
pub use ai::{minimax, select_move, Decision, MinimaxAI, DEFAULT_SEARCH_DEPTH};
pub use game::{ClickOutcome, GameSession, GameView, Phase, SquareStyle, SquareStyles};
pub use config::{GameConfig, DEFAULT_COMPUTER_DELAY_MS};
