//! Fixed-depth minimax AI
//!
//! Exhaustive search, no pruning: every legal move is explored to the full
//! depth and leaves are scored by material balance. Dark maximises, Light
//! minimises. The search mutates one shared position and relies on
//! [`MoveGuard`](crate::rules::MoveGuard) to undo each move.

use crate::board::Move;
use crate::error::{ChessError, Result};
use crate::eval::{evaluate, MATE_SCORE};
use crate::pieces::Color;
use crate::rules::{GameStatus, RulesEngine};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Plies searched below each candidate move
pub const DEFAULT_SEARCH_DEPTH: u32 = 2;

// ============================================================================
// DECISION
// ============================================================================

/// Result of asking the AI for a move
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decision {
    /// The chosen move and the score the search assigned to it
    Move { mv: Move, score: i32 },
    /// No move is possible; the position is terminal
    GameOver { status: GameStatus },
}

impl Decision {
    pub fn mv(&self) -> Option<Move> {
        match self {
            Decision::Move { mv, .. } => Some(*mv),
            Decision::GameOver { .. } => None,
        }
    }
}

// ============================================================================
// MINIMAX AI
// ============================================================================

/// Minimax player
#[derive(Clone, Debug)]
pub struct MinimaxAI {
    pub depth: u32,
    nodes: u64,
}

impl MinimaxAI {
    pub fn new(depth: u32) -> Self {
        Self { depth, nodes: 0 }
    }

    /// Nodes visited by the most recent decision
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Choose a move for the side to move without changing the position
    pub fn select_move<R: RulesEngine>(&mut self, rules: &mut R) -> Decision {
        self.nodes = 0;
        let decision = select_move(rules, self.depth, &mut self.nodes);
        tracing::debug!(
            depth = self.depth,
            nodes = self.nodes,
            ?decision,
            "minimax decision"
        );
        decision
    }

    /// Choose a move and apply it permanently.
    ///
    /// Fails with [`ChessError::IllegalMove`] if the engine refuses the move
    /// it just offered; the position is then left as it was.
    pub fn play_move<R: RulesEngine>(&mut self, rules: &mut R) -> Result<Decision> {
        let decision = self.select_move(rules);
        if let Decision::Move { mv, .. } = decision {
            rules.apply(mv).ok_or(ChessError::IllegalMove(mv))?;
        }
        Ok(decision)
    }
}

impl Default for MinimaxAI {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_DEPTH)
    }
}

// ============================================================================
// SEARCH
// ============================================================================

/// Score of a terminal position from Dark's point of view
fn terminal_score(status: GameStatus) -> Option<i32> {
    match status {
        GameStatus::Ongoing => None,
        GameStatus::Checkmate { winner: Color::Dark } => Some(MATE_SCORE),
        GameStatus::Checkmate { winner: Color::Light } => Some(-MATE_SCORE),
        GameStatus::Stalemate | GameStatus::Draw { .. } => Some(0),
    }
}

/// Exhaustive minimax to `depth` plies. Returns the extremal score only.
///
/// `side` is the side to move at this node: Dark maximises, Light minimises.
/// `nodes` is incremented once per visited node.
pub fn minimax<R: RulesEngine>(rules: &mut R, depth: u32, side: Color, nodes: &mut u64) -> i32 {
    *nodes += 1;

    if depth == 0 {
        return evaluate(rules);
    }

    if let Some(score) = terminal_score(rules.status()) {
        return score;
    }

    debug_assert_eq!(rules.side_to_move(), side);

    let maximizing = side == Color::Dark;
    let mut best = if maximizing { -MATE_SCORE } else { MATE_SCORE };

    for mv in rules.legal_moves() {
        let Some(mut child) = rules.try_apply(mv) else {
            continue;
        };
        let score = minimax(&mut *child, depth - 1, side.opponent(), nodes);
        best = if maximizing { best.max(score) } else { best.min(score) };
    }

    best
}

/// Pick the best move for the side to move.
///
/// Each candidate is applied, searched `depth` plies deeper starting from the
/// opponent, and undone. Dark keeps the highest score, Light the lowest;
/// among equal scores the later-enumerated move wins. Terminal positions
/// yield [`Decision::GameOver`] and the position is not touched.
pub fn select_move<R: RulesEngine>(rules: &mut R, depth: u32, nodes: &mut u64) -> Decision {
    let status = rules.status();
    let candidates = rules.legal_moves();
    if status.is_over() || candidates.is_empty() {
        return Decision::GameOver { status };
    }

    let side = rules.side_to_move();
    let maximizing = side == Color::Dark;
    let mut best: Option<(Move, i32)> = None;

    for mv in candidates {
        let score = {
            let Some(mut child) = rules.try_apply(mv) else {
                continue;
            };
            minimax(&mut *child, depth, side.opponent(), nodes)
        };

        let replaces = match best {
            None => true,
            Some((_, best_score)) if maximizing => score >= best_score,
            Some((_, best_score)) => score <= best_score,
        };
        if replaces {
            best = Some((mv, score));
        }
    }

    match best {
        Some((mv, score)) => Decision::Move { mv, score },
        None => Decision::GameOver { status },
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{ChessRules, START_FEN};

    fn rules(fen: &str) -> ChessRules {
        ChessRules::from_fen(fen).unwrap()
    }

    #[test]
    fn test_depth_zero_is_evaluation() {
        let mut pos = rules("4k3/8/8/8/8/8/4P3/R3K3 w - - 0 1");
        let expected = evaluate(&pos);
        let mut nodes = 0;
        assert_eq!(minimax(&mut pos, 0, Color::Light, &mut nodes), expected);
        assert_eq!(minimax(&mut pos, 0, Color::Dark, &mut nodes), expected);
        assert_eq!(nodes, 2);
    }

    #[test]
    fn test_search_restores_position() {
        let mut pos = ChessRules::new();
        let mut nodes = 0;
        minimax(&mut pos, 2, Color::Light, &mut nodes);
        assert_eq!(pos.fen(), START_FEN);
        assert_eq!(pos.history_len(), 0);
        // root + 20 + 20 * 20
        assert_eq!(nodes, 421);
    }

    #[test]
    fn test_mated_node_scores_for_winner() {
        let mut mated = rules("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        let mut nodes = 0;
        assert_eq!(minimax(&mut mated, 2, Color::Dark, &mut nodes), -MATE_SCORE);
    }

    #[test]
    fn test_stalemate_node_scores_zero() {
        let mut stalemate = rules("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
        let mut nodes = 0;
        assert_eq!(minimax(&mut stalemate, 2, Color::Dark, &mut nodes), 0);
    }

    #[test]
    fn test_dark_takes_free_queen() {
        // Dark rook on d8 can capture the undefended queen on d1
        let mut pos = rules("3rk3/8/8/8/8/8/8/3Q3K b - - 0 1");
        let mut ai = MinimaxAI::default();
        let decision = ai.select_move(&mut pos);
        assert_eq!(decision.mv(), Some("d8d1".parse().unwrap()));
        assert!(ai.nodes() > 0);
    }

    #[test]
    fn test_light_minimises() {
        // Light queen on d1 can capture the undefended rook on d8
        let mut pos = rules("3r3k/8/8/8/8/8/8/3QK3 w - - 0 1");
        let decision = MinimaxAI::default().select_move(&mut pos);
        assert_eq!(decision.mv(), Some("d1d8".parse().unwrap()));
    }

    #[test]
    fn test_play_move_applies_one_ply() {
        let mut pos = rules("3rk3/8/8/8/8/8/8/3Q3K b - - 0 1");
        let decision = MinimaxAI::default().play_move(&mut pos).unwrap();
        assert!(matches!(decision, Decision::Move { .. }));
        assert_eq!(pos.history_len(), 1);
        assert_eq!(pos.side_to_move(), Color::Light);
    }

    #[test]
    fn test_game_over_decision() {
        let mut mated = rules("7k/6Q1/6K1/8/8/8/8/8 b - - 0 1");
        let decision = MinimaxAI::default().play_move(&mut mated).unwrap();
        assert_eq!(
            decision,
            Decision::GameOver {
                status: GameStatus::Checkmate { winner: Color::Light }
            }
        );
        assert_eq!(mated.history_len(), 0);
    }

    /// Engine that accepts a fixed number of moves, then refuses all others
    struct RationedRules {
        inner: ChessRules,
        applies_left: usize,
    }

    impl RulesEngine for RationedRules {
        fn legal_moves(&self) -> Vec<Move> {
            self.inner.legal_moves()
        }

        fn apply(&mut self, mv: Move) -> Option<Move> {
            if self.applies_left == 0 {
                return None;
            }
            self.applies_left -= 1;
            self.inner.apply(mv)
        }

        fn undo(&mut self) -> Option<Move> {
            self.inner.undo()
        }

        fn status(&self) -> GameStatus {
            self.inner.status()
        }

        fn side_to_move(&self) -> Color {
            self.inner.side_to_move()
        }

        fn board_snapshot(&self) -> crate::board::BoardSnapshot {
            self.inner.board_snapshot()
        }

        fn fen(&self) -> String {
            self.inner.fen()
        }

        fn history_len(&self) -> usize {
            self.inner.history_len()
        }
    }

    #[test]
    fn test_play_move_reports_refused_move() {
        let inner = rules("3rk3/8/8/8/8/8/8/3Q3K b - - 0 1");
        let fen = inner.fen();
        // Enough applies for the depth-0 search over every candidate, none left after
        let applies_left = inner.legal_moves().len();
        let mut pos = RationedRules { inner, applies_left };

        let result = MinimaxAI::new(0).play_move(&mut pos);
        assert!(matches!(result, Err(ChessError::IllegalMove(_))));
        assert_eq!(pos.history_len(), 0);
        assert_eq!(pos.fen(), fen);
    }
}
