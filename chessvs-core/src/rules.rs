//! Rules engine seam
//!
//! The core never decides move legality itself. Everything it needs from the
//! rules of chess goes through [`RulesEngine`]:
//! - legal move enumeration (in a deterministic order)
//! - apply / undo on one shared, mutable position
//! - terminal conditions (checkmate, stalemate, draws)
//! - board snapshots and the FEN string handed to the renderer
//!
//! [`ChessRules`] implements the trait on top of the `chess` crate. That crate
//! only offers copy-make boards, so undo is provided by a history stack.

use crate::board::{BoardSnapshot, Move, Square, BOARD_SIZE};
use crate::error::{ChessError, Result};
use crate::pieces::{Color, Piece, PieceKind};
use chess::{Board, BoardStatus, MoveGen};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

// ============================================================================
// CONSTANTS
// ============================================================================

/// FEN of the standard starting position
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Half-moves without pawn move or capture before the fifty-move draw
const FIFTY_MOVE_HALFMOVES: u32 = 100;

/// Occurrences of one position that make a repetition draw
const REPETITION_LIMIT: u8 = 3;

// ============================================================================
// GAME STATUS
// ============================================================================

/// Why a game was drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawReason {
    FiftyMoveRule,
    InsufficientMaterial,
    ThreefoldRepetition,
}

/// Terminal state of a position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameStatus {
    Ongoing,
    Checkmate { winner: Color },
    Stalemate,
    Draw { reason: DrawReason },
}

impl GameStatus {
    pub fn is_over(&self) -> bool {
        !matches!(self, GameStatus::Ongoing)
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, GameStatus::Stalemate | GameStatus::Draw { .. })
    }

    pub fn winner(&self) -> Option<Color> {
        match self {
            GameStatus::Checkmate { winner } => Some(*winner),
            _ => None,
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Ongoing => f.write_str("ongoing"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate, {winner} wins"),
            GameStatus::Stalemate => f.write_str("stalemate"),
            GameStatus::Draw { reason } => match reason {
                DrawReason::FiftyMoveRule => f.write_str("draw by fifty-move rule"),
                DrawReason::InsufficientMaterial => f.write_str("draw by insufficient material"),
                DrawReason::ThreefoldRepetition => f.write_str("draw by threefold repetition"),
            },
        }
    }
}

// ============================================================================
// RULES ENGINE TRAIT
// ============================================================================

/// Oracle for the rules of chess over one mutable position
pub trait RulesEngine {
    /// All legal moves for the side to move, in enumeration order
    fn legal_moves(&self) -> Vec<Move>;

    /// Legal moves starting on `square`
    fn legal_moves_from(&self, square: Square) -> Vec<Move> {
        self.legal_moves()
            .into_iter()
            .filter(|mv| mv.from == square)
            .collect()
    }

    /// Apply a move in place. Returns `None` and leaves the position
    /// untouched when the move is illegal.
    fn apply(&mut self, mv: Move) -> Option<Move>;

    /// Revert the most recent move. Returns `None` when there is no history.
    fn undo(&mut self) -> Option<Move>;

    fn status(&self) -> GameStatus;

    fn is_game_over(&self) -> bool {
        self.status().is_over()
    }

    fn is_draw(&self) -> bool {
        self.status().is_draw()
    }

    fn side_to_move(&self) -> Color;

    fn board_snapshot(&self) -> BoardSnapshot;

    fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board_snapshot().get(square)
    }

    /// Position as a FEN string
    fn fen(&self) -> String;

    /// Number of moves that can be undone
    fn history_len(&self) -> usize;

    /// Apply `mv` for the lifetime of the returned guard; dropping the guard
    /// undoes it.
    fn try_apply(&mut self, mv: Move) -> Option<MoveGuard<'_, Self>>
    where
        Self: Sized,
    {
        MoveGuard::apply(self, mv)
    }
}

// ============================================================================
// SCOPED APPLY / UNDO
// ============================================================================

/// A move applied to a rules engine, undone when the guard is dropped.
///
/// Every exit path of the search (normal return, early `continue`, `?`)
/// drops the guard, so apply and undo always pair up.
pub struct MoveGuard<'a, R: RulesEngine + ?Sized> {
    rules: &'a mut R,
    mv: Move,
}

impl<'a, R: RulesEngine + ?Sized> MoveGuard<'a, R> {
    pub fn apply(rules: &'a mut R, mv: Move) -> Option<Self> {
        rules.apply(mv)?;
        Some(Self { rules, mv })
    }

    /// The move held by this guard
    pub fn mv(&self) -> Move {
        self.mv
    }
}

impl<R: RulesEngine + ?Sized> Deref for MoveGuard<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        self.rules
    }
}

impl<R: RulesEngine + ?Sized> DerefMut for MoveGuard<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        self.rules
    }
}

impl<R: RulesEngine + ?Sized> Drop for MoveGuard<'_, R> {
    fn drop(&mut self) {
        let undone = self.rules.undo();
        debug_assert_eq!(undone, Some(self.mv), "guard undid a different move");
    }
}

// ============================================================================
// CHESS CRATE ADAPTER
// ============================================================================

#[derive(Clone)]
struct HistoryEntry {
    board: Board,
    mv: Move,
    halfmove_clock: u32,
    fullmove_number: u32,
}

/// Standard chess position backed by `chess::Board`
#[derive(Clone)]
pub struct ChessRules {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
    history: Vec<HistoryEntry>,
    /// Occurrence count per Zobrist hash, for repetition draws
    repetitions: FxHashMap<u64, u8>,
}

impl ChessRules {
    /// Standard starting position
    pub fn new() -> Self {
        Self::with_board(Board::default(), 0, 1)
    }

    /// Position from a FEN string. Missing move counters default to 0 and 1.
    pub fn from_fen(fen: &str) -> Result<Self> {
        let invalid = |reason: String| ChessError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };

        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() < 4 {
            return Err(invalid("expected at least 4 fields".to_string()));
        }

        validate_placement(fields[0]).map_err(invalid)?;
        let side = match fields[1] {
            "w" => Color::Light,
            "b" => Color::Dark,
            other => return Err(invalid(format!("bad side to move {other:?}"))),
        };
        validate_en_passant(fields[3], side).map_err(invalid)?;

        let board = Board::from_str(&fields[..4].join(" "))
            .map_err(|e| invalid(format!("{e:?}")))?;

        let halfmove_clock = match fields.get(4) {
            Some(s) => s
                .parse()
                .map_err(|_| invalid(format!("bad half-move clock {s:?}")))?,
            None => 0,
        };
        let fullmove_number = match fields.get(5) {
            Some(s) => s
                .parse::<u32>()
                .map_err(|_| invalid(format!("bad full-move number {s:?}")))?
                .max(1),
            None => 1,
        };

        Ok(Self::with_board(board, halfmove_clock, fullmove_number))
    }

    fn with_board(board: Board, halfmove_clock: u32, fullmove_number: u32) -> Self {
        let mut repetitions = FxHashMap::default();
        repetitions.insert(board.get_hash(), 1);
        Self {
            board,
            halfmove_clock,
            fullmove_number,
            history: Vec::new(),
            repetitions,
        }
    }

    /// Back to the starting position with empty history
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Moves played so far, oldest first
    pub fn history(&self) -> Vec<Move> {
        self.history.iter().map(|entry| entry.mv).collect()
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    fn draw_reason(&self) -> Option<DrawReason> {
        if self.halfmove_clock >= FIFTY_MOVE_HALFMOVES {
            return Some(DrawReason::FiftyMoveRule);
        }
        if insufficient_material(&self.board_snapshot()) {
            return Some(DrawReason::InsufficientMaterial);
        }
        let seen = self
            .repetitions
            .get(&self.board.get_hash())
            .copied()
            .unwrap_or(0);
        if seen >= REPETITION_LIMIT {
            return Some(DrawReason::ThreefoldRepetition);
        }
        None
    }
}

impl Default for ChessRules {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ChessRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChessRules")
            .field("fen", &self.fen())
            .field("history", &self.history.len())
            .finish()
    }
}

impl RulesEngine for ChessRules {
    fn legal_moves(&self) -> Vec<Move> {
        MoveGen::new_legal(&self.board).map(Move::from_engine).collect()
    }

    fn apply(&mut self, mv: Move) -> Option<Move> {
        let engine_move = mv.to_engine();
        if !self.board.legal(engine_move) {
            return None;
        }

        let source = engine_move.get_source();
        let dest = engine_move.get_dest();
        let resets_clock = self.board.piece_on(source) == Some(chess::Piece::Pawn)
            || self.board.piece_on(dest).is_some();
        let dark_moved = self.board.side_to_move() == chess::Color::Black;

        self.history.push(HistoryEntry {
            board: self.board,
            mv,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
        });

        self.board = self.board.make_move_new(engine_move);
        self.halfmove_clock = if resets_clock { 0 } else { self.halfmove_clock + 1 };
        if dark_moved {
            self.fullmove_number += 1;
        }
        *self.repetitions.entry(self.board.get_hash()).or_insert(0) += 1;

        Some(mv)
    }

    fn undo(&mut self) -> Option<Move> {
        let entry = self.history.pop()?;

        let hash = self.board.get_hash();
        if let Some(count) = self.repetitions.get_mut(&hash) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.repetitions.remove(&hash);
            }
        }

        self.board = entry.board;
        self.halfmove_clock = entry.halfmove_clock;
        self.fullmove_number = entry.fullmove_number;
        Some(entry.mv)
    }

    fn status(&self) -> GameStatus {
        match self.board.status() {
            BoardStatus::Checkmate => GameStatus::Checkmate {
                winner: Color::from_engine(!self.board.side_to_move()),
            },
            BoardStatus::Stalemate => GameStatus::Stalemate,
            BoardStatus::Ongoing => match self.draw_reason() {
                Some(reason) => GameStatus::Draw { reason },
                None => GameStatus::Ongoing,
            },
        }
    }

    fn side_to_move(&self) -> Color {
        Color::from_engine(self.board.side_to_move())
    }

    fn board_snapshot(&self) -> BoardSnapshot {
        let mut snapshot = BoardSnapshot::empty();
        for sq in Square::all() {
            let engine_sq = sq.to_engine();
            if let (Some(piece), Some(color)) =
                (self.board.piece_on(engine_sq), self.board.color_on(engine_sq))
            {
                snapshot.set(
                    sq,
                    Some(Piece::new(PieceKind::from_engine(piece), Color::from_engine(color))),
                );
            }
        }
        snapshot
    }

    fn piece_at(&self, square: Square) -> Option<Piece> {
        let sq = square.to_engine();
        let piece = self.board.piece_on(sq)?;
        let color = self.board.color_on(sq)?;
        Some(Piece::new(PieceKind::from_engine(piece), Color::from_engine(color)))
    }

    fn fen(&self) -> String {
        // The chess crate prints fixed move counters, so only the first four
        // fields are taken from it.
        let board_fen = self.board.to_string();
        let fields: Vec<&str> = board_fen.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            fields.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}

// ============================================================================
// FEN CHECKS
// ============================================================================

// `chess::Board::from_str` indexes by king square before its own sanity
// check, so a position without both kings must never reach it.

/// Piece-placement field: 8 ranks of 8 squares, one king per side, no pawn
/// on the first or last rank
fn validate_placement(placement: &str) -> std::result::Result<(), String> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != BOARD_SIZE as usize {
        return Err(format!("expected 8 ranks, found {}", rows.len()));
    }

    let mut kings = [0usize; 2];
    for (i, row) in rows.iter().enumerate() {
        let rank = BOARD_SIZE as usize - i;
        let mut files = 0u32;
        for c in row.chars() {
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(format!("bad empty run {c:?} on rank {rank}"));
                }
                files += run;
                continue;
            }
            let kind = PieceKind::from_letter(c)
                .ok_or_else(|| format!("unknown piece {c:?} on rank {rank}"))?;
            match kind {
                PieceKind::King if c.is_ascii_uppercase() => kings[0] += 1,
                PieceKind::King => kings[1] += 1,
                PieceKind::Pawn if rank == 1 || rank == 8 => {
                    return Err(format!("pawn on rank {rank}"));
                }
                _ => {}
            }
            files += 1;
        }
        if files != u32::from(BOARD_SIZE) {
            return Err(format!("rank {rank} has {files} squares"));
        }
    }

    match kings {
        [1, 1] => Ok(()),
        [light, dark] => Err(format!(
            "need one king per side, found {light} light and {dark} dark"
        )),
    }
}

/// En-passant field: `-` or a square behind a pawn that just advanced two
fn validate_en_passant(field: &str, side: Color) -> std::result::Result<(), String> {
    if field == "-" {
        return Ok(());
    }
    let square: Square = field
        .parse()
        .map_err(|_| format!("bad en-passant square {field:?}"))?;
    let expected_rank = match side {
        Color::Light => 5,
        Color::Dark => 2,
    };
    if square.rank() != expected_rank {
        return Err(format!("en-passant square {field} does not match the side to move"));
    }
    Ok(())
}

// ============================================================================
// DRAW HELPERS
// ============================================================================

/// Bare kings, a single minor piece, or only bishops all on one square colour
fn insufficient_material(snapshot: &BoardSnapshot) -> bool {
    let mut total = 0;
    let mut minors = 0;
    let mut bishops = 0;
    let mut bishop_square_colors = [0usize; 2];

    for (sq, piece) in snapshot.pieces() {
        total += 1;
        match piece.kind {
            PieceKind::King => {}
            PieceKind::Knight => minors += 1,
            PieceKind::Bishop => {
                minors += 1;
                bishops += 1;
                bishop_square_colors[(sq.file() + sq.rank()) as usize % 2] += 1;
            }
            _ => return false,
        }
    }

    match total {
        2 => true,
        3 => minors == 1,
        _ => {
            total == bishops + 2
                && (bishop_square_colors[0] == 0 || bishop_square_colors[1] == 0)
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(text: &str) -> Move {
        text.parse().unwrap()
    }

    #[test]
    fn test_start_position() {
        let rules = ChessRules::new();
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.side_to_move(), Color::Light);
        assert_eq!(rules.legal_moves().len(), 20);
        assert_eq!(rules.status(), GameStatus::Ongoing);
        assert_eq!(rules.history_len(), 0);
    }

    #[test]
    fn test_from_fen_roundtrip() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 12 40";
        let rules = ChessRules::from_fen(fen).unwrap();
        assert_eq!(rules.fen(), fen);
        assert_eq!(rules.halfmove_clock(), 12);
        assert_eq!(rules.fullmove_number(), 40);
    }

    #[test]
    fn test_from_fen_rejects_garbage() {
        assert!(matches!(
            ChessRules::from_fen("not a fen"),
            Err(ChessError::InvalidFen { .. })
        ));
    }

    #[test]
    fn test_from_fen_requires_both_kings() {
        for fen in [
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            "8/8/8/8/8/8/8/4K3 b - - 0 1",
            "4k3/8/8/8/8/8/8/3KK3 w - - 0 1",
        ] {
            assert!(
                matches!(ChessRules::from_fen(fen), Err(ChessError::InvalidFen { .. })),
                "{fen} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_fen_rejects_malformed_fields() {
        for fen in [
            // pawn on the back ranks
            "4k3/8/8/8/8/8/8/4K2P w - - 0 1",
            "3pk3/8/8/8/8/8/8/4K3 w - - 0 1",
            // en-passant square off the board or on the wrong rank
            "4k3/8/8/8/8/8/8/4K3 w - z9 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1",
            // bad ranks
            "4k3/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/9/8/8/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K4 w - - 0 1",
            "4k3/8/8/8/8/8/8/4X3 w - - 0 1",
            // side to move
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
        ] {
            assert!(
                matches!(ChessRules::from_fen(fen), Err(ChessError::InvalidFen { .. })),
                "{fen} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_fen_accepts_en_passant() {
        let rules = ChessRules::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").unwrap();
        assert!(rules.legal_moves().contains(&mv("e5d6")));
    }

    #[test]
    fn test_illegal_move_leaves_position() {
        let mut rules = ChessRules::new();
        assert_eq!(rules.apply(mv("e2e5")), None);
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.history_len(), 0);
    }

    #[test]
    fn test_apply_and_undo() {
        let mut rules = ChessRules::new();
        assert_eq!(rules.apply(mv("e2e4")), Some(mv("e2e4")));
        assert_eq!(rules.side_to_move(), Color::Dark);
        assert_eq!(rules.history(), vec![mv("e2e4")]);

        assert_eq!(rules.undo(), Some(mv("e2e4")));
        assert_eq!(rules.fen(), START_FEN);
        assert_eq!(rules.undo(), None);
    }

    #[test]
    fn test_move_counters() {
        let mut rules = ChessRules::new();
        rules.apply(mv("g1f3")).unwrap();
        assert_eq!(rules.halfmove_clock(), 1);
        assert_eq!(rules.fullmove_number(), 1);
        rules.apply(mv("g8f6")).unwrap();
        assert_eq!(rules.halfmove_clock(), 2);
        assert_eq!(rules.fullmove_number(), 2);
        rules.apply(mv("e2e4")).unwrap();
        assert_eq!(rules.halfmove_clock(), 0);
    }

    #[test]
    fn test_guard_undoes_on_drop() {
        let mut rules = ChessRules::new();
        {
            let guard = rules.try_apply(mv("d2d4")).unwrap();
            assert_eq!(guard.side_to_move(), Color::Dark);
            assert_eq!(guard.mv(), mv("d2d4"));
        }
        assert_eq!(rules.fen(), START_FEN);
        assert!(rules.try_apply(mv("d2d5")).is_none());
        assert_eq!(rules.history_len(), 0);
    }

    #[test]
    fn test_legal_moves_from() {
        let rules = ChessRules::new();
        let knight = rules.legal_moves_from("g1".parse().unwrap());
        assert_eq!(knight.len(), 2);
        assert!(knight.contains(&mv("g1f3")));
        assert!(knight.contains(&mv("g1h3")));
        assert!(rules.legal_moves_from("e4".parse().unwrap()).is_empty());
    }

    #[test]
    fn test_checkmate() {
        let rules = ChessRules::from_fen("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(
            rules.status(),
            GameStatus::Checkmate { winner: Color::Light }
        );
        assert!(rules.is_game_over());
        assert!(!rules.is_draw());
        assert!(rules.legal_moves().is_empty());
    }

    #[test]
    fn test_stalemate() {
        let rules = ChessRules::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert_eq!(rules.status(), GameStatus::Stalemate);
        assert!(rules.is_draw());
    }

    #[test]
    fn test_insufficient_material() {
        let bare = ChessRules::from_fen("k7/8/8/8/8/8/8/7K w - - 0 1").unwrap();
        assert_eq!(
            bare.status(),
            GameStatus::Draw { reason: DrawReason::InsufficientMaterial }
        );

        let knight = ChessRules::from_fen("k7/8/8/8/8/8/8/6NK w - - 0 1").unwrap();
        assert!(knight.is_draw());

        // Bishops on a1 (dark square) and h8 (dark square)
        let same_colour = ChessRules::from_fen("k6b/8/8/8/8/8/8/B6K w - - 0 1").unwrap();
        assert!(same_colour.is_draw());

        let rook = ChessRules::from_fen("k7/8/8/8/8/8/8/6RK w - - 0 1").unwrap();
        assert_eq!(rook.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_fifty_move_rule() {
        let rules = ChessRules::from_fen("k7/8/8/8/8/8/8/6RK w - - 100 80").unwrap();
        assert_eq!(
            rules.status(),
            GameStatus::Draw { reason: DrawReason::FiftyMoveRule }
        );
    }

    #[test]
    fn test_threefold_repetition() {
        let mut rules = ChessRules::new();
        for _ in 0..2 {
            for text in ["g1f3", "g8f6", "f3g1", "f6g8"] {
                rules.apply(mv(text)).unwrap();
            }
        }
        assert_eq!(
            rules.status(),
            GameStatus::Draw { reason: DrawReason::ThreefoldRepetition }
        );

        rules.undo().unwrap();
        assert_eq!(rules.status(), GameStatus::Ongoing);
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_value(GameStatus::Checkmate { winner: Color::Dark }).unwrap();
        assert_eq!(json["kind"], "checkmate");
        assert_eq!(json["winner"], "dark");
    }
}
