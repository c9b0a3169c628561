//! Position evaluation
//!
//! Material only: every piece counts its value for Dark and against Light.

use crate::board::BoardSnapshot;
use crate::rules::RulesEngine;

/// Magnitude of the sentinel extremum that seeds the search, also used as
/// the checkmate score
pub const MATE_SCORE: i32 = 9999;

/// Material balance of a snapshot; positive favours Dark
pub fn evaluate_board(board: &BoardSnapshot) -> i32 {
    board.pieces().map(|(_, piece)| piece.signed_value()).sum()
}

/// Material balance of the position held by a rules engine
pub fn evaluate<R: RulesEngine + ?Sized>(rules: &R) -> i32 {
    evaluate_board(&rules.board_snapshot())
}
