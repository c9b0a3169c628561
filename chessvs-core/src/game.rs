//! Human-vs-computer game session
//!
//! The session is an explicit state machine:
//!
//! ```text
//!   AwaitingHuman --click/click--> AwaitingComputer --computer_move--> AwaitingHuman
//!         \                               |                                 |
//!          `------------ any move ending the game ---------------> GameOver
//! ```
//!
//! `reset` and `undo` re-derive the phase from the side to move, so undoing a
//! single ply hands the turn back to whoever made it.

use crate::ai::{Decision, MinimaxAI, DEFAULT_SEARCH_DEPTH};
use crate::board::{Move, Square};
use crate::config::GameConfig;
use crate::error::{ChessError, Result};
use crate::eval::evaluate;
use crate::pieces::{Color, PieceKind};
use crate::rules::{ChessRules, GameStatus, RulesEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// HIGHLIGHT STYLES
// ============================================================================

const SOURCE_BACKGROUND: &str = "rgba(255, 255, 0, 0.4)";
const LAST_MOVE_BACKGROUND: &str = "rgba(155, 199, 0, 0.41)";
const CAPTURE_BACKGROUND: &str = "radial-gradient(circle, rgba(0,0,0,.1) 85%, transparent 85%)";
const QUIET_BACKGROUND: &str = "radial-gradient(circle, rgba(0,0,0,.1) 25%, transparent 25%)";
const ROUND: &str = "50%";

/// Inline style applied by the renderer to one square
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SquareStyle {
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
}

impl SquareStyle {
    fn source() -> Self {
        Self {
            background: SOURCE_BACKGROUND.to_string(),
            border_radius: None,
        }
    }

    fn last_move() -> Self {
        Self {
            background: LAST_MOVE_BACKGROUND.to_string(),
            border_radius: None,
        }
    }

    fn destination(capture: bool) -> Self {
        let background = if capture { CAPTURE_BACKGROUND } else { QUIET_BACKGROUND };
        Self {
            background: background.to_string(),
            border_radius: Some(ROUND.to_string()),
        }
    }
}

/// Square name to style
pub type SquareStyles = BTreeMap<Square, SquareStyle>;

// ============================================================================
// PHASE / OUTCOMES
// ============================================================================

/// Whose action the session is waiting for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    AwaitingHuman,
    AwaitingComputer,
    GameOver { status: GameStatus },
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::AwaitingHuman => f.write_str("awaiting the human move"),
            Phase::AwaitingComputer => f.write_str("awaiting the computer move"),
            Phase::GameOver { status } => write!(f, "game over ({status})"),
        }
    }
}

/// What a square click did
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// Not the human's turn
    Ignored,
    /// First click: source armed, destinations highlighted
    Selected { square: Square, destinations: Vec<Square> },
    /// Second click did not make a legal move; treated as a new first click
    Reselected { square: Square, destinations: Vec<Square> },
    /// Second click made a move
    Moved { mv: Move },
}

/// Everything a renderer needs to draw the game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub fen: String,
    pub phase: Phase,
    pub status: GameStatus,
    pub side_to_move: Color,
    pub human_color: Color,
    pub selected: Option<Square>,
    /// Highlight for the armed source square
    pub source_squares: SquareStyles,
    /// Highlights for the legal destinations of the armed source
    pub option_squares: SquareStyles,
    pub last_move: Option<Move>,
    /// Highlights for the from and to squares of the last move
    pub move_squares: SquareStyles,
    pub evaluation: i32,
    /// Board interaction is suspended (game-over overlay)
    pub blocked: bool,
    pub history: Vec<String>,
}

// ============================================================================
// GAME SESSION
// ============================================================================

/// One game between a human and the minimax AI
#[derive(Clone, Debug)]
pub struct GameSession {
    rules: ChessRules,
    ai: MinimaxAI,
    config: GameConfig,
    phase: Phase,
    selected: Option<Square>,
    option_squares: SquareStyles,
    last_move: Option<Move>,
}

impl GameSession {
    /// New game from the starting position
    pub fn new(config: GameConfig) -> Self {
        Self::from_rules(ChessRules::new(), config)
    }

    /// Session over an existing position
    pub fn from_rules(rules: ChessRules, config: GameConfig) -> Self {
        let mut session = Self {
            rules,
            ai: MinimaxAI::new(DEFAULT_SEARCH_DEPTH),
            config,
            phase: Phase::AwaitingHuman,
            selected: None,
            option_squares: SquareStyles::new(),
            last_move: None,
        };
        session.refresh_phase();
        session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn rules(&self) -> &ChessRules {
        &self.rules
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<Square> {
        self.selected
    }

    // ========================================================================
    // HUMAN INPUT
    // ========================================================================

    /// Two-click move entry
    pub fn click(&mut self, square: Square) -> ClickOutcome {
        if self.phase != Phase::AwaitingHuman {
            return ClickOutcome::Ignored;
        }

        let Some(from) = self.selected else {
            let destinations = self.arm(square);
            return ClickOutcome::Selected { square, destinations };
        };

        let mv = self.human_move(from, square);
        if self.rules.apply(mv).is_none() {
            let destinations = self.arm(square);
            return ClickOutcome::Reselected { square, destinations };
        }

        tracing::debug!(%mv, "human move");
        self.clear_selection();
        self.last_move = Some(mv);
        self.refresh_phase();
        ClickOutcome::Moved { mv }
    }

    /// Move from `from` to `to`, promoting pawns to a queen
    fn human_move(&self, from: Square, to: Square) -> Move {
        let promotes = self.rules.piece_at(from).is_some_and(|piece| {
            let last_rank = match piece.color {
                Color::Light => 7,
                Color::Dark => 0,
            };
            piece.kind == PieceKind::Pawn && to.rank() == last_rank
        });
        if promotes {
            Move::with_promotion(from, to, PieceKind::Queen)
        } else {
            Move::new(from, to)
        }
    }

    /// Arm `square` as the move source and compute destination highlights
    fn arm(&mut self, square: Square) -> Vec<Square> {
        self.selected = Some(square);
        self.option_squares.clear();

        let mover = self.rules.piece_at(square).map(|p| p.color);
        let mut destinations: Vec<Square> = Vec::new();
        for mv in self.rules.legal_moves_from(square) {
            if destinations.contains(&mv.to) {
                continue;
            }
            let capture = matches!(
                (self.rules.piece_at(mv.to), mover),
                (Some(target), Some(color)) if target.color != color
            );
            self.option_squares.insert(mv.to, SquareStyle::destination(capture));
            destinations.push(mv.to);
        }
        destinations
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.option_squares.clear();
    }

    /// Drop an armed source square without moving
    pub fn deselect(&mut self) {
        self.clear_selection();
    }

    // ========================================================================
    // COMPUTER MOVE
    // ========================================================================

    /// Let the AI pick and play its move
    pub fn computer_move(&mut self) -> Result<Decision> {
        if self.phase != Phase::AwaitingComputer {
            return Err(ChessError::WrongPhase {
                action: "play the computer move",
                phase: self.phase.to_string(),
            });
        }

        let decision = self.ai.play_move(&mut self.rules)?;
        match decision {
            Decision::Move { mv, score } => {
                self.last_move = Some(mv);
                tracing::info!(
                    %mv,
                    score,
                    evaluation = evaluate(&self.rules),
                    nodes = self.ai.nodes(),
                    "computer move"
                );
                self.refresh_phase();
            }
            Decision::GameOver { status } => {
                self.phase = Phase::GameOver { status };
            }
        }
        Ok(decision)
    }

    // ========================================================================
    // RESET / UNDO
    // ========================================================================

    /// Start a new game with the same configuration
    pub fn reset(&mut self) {
        self.rules.reset();
        self.clear_selection();
        self.last_move = None;
        self.refresh_phase();
        tracing::info!(phase = %self.phase, "new game");
    }

    /// Take back one ply
    pub fn undo(&mut self) -> Result<Move> {
        let mv = self.rules.undo().ok_or(ChessError::NothingToUndo)?;
        self.clear_selection();
        self.last_move = self.rules.history().last().copied();
        self.refresh_phase();
        tracing::debug!(%mv, phase = %self.phase, "undo");
        Ok(mv)
    }

    fn refresh_phase(&mut self) {
        let status = self.rules.status();
        self.phase = if status.is_over() {
            Phase::GameOver { status }
        } else if self.rules.side_to_move() == self.config.human_color {
            Phase::AwaitingHuman
        } else {
            Phase::AwaitingComputer
        };
    }

    // ========================================================================
    // VIEW
    // ========================================================================

    /// Snapshot for the renderer
    pub fn view(&self) -> GameView {
        let source_squares = self
            .selected
            .map(|sq| SquareStyles::from([(sq, SquareStyle::source())]))
            .unwrap_or_default();

        let move_squares = self
            .last_move
            .map(|mv| {
                SquareStyles::from([
                    (mv.from, SquareStyle::last_move()),
                    (mv.to, SquareStyle::last_move()),
                ])
            })
            .unwrap_or_default();

        GameView {
            fen: self.rules.fen(),
            phase: self.phase,
            status: self.rules.status(),
            side_to_move: self.rules.side_to_move(),
            human_color: self.config.human_color,
            selected: self.selected,
            source_squares,
            option_squares: self.option_squares.clone(),
            last_move: self.last_move,
            move_squares,
            evaluation: evaluate(&self.rules),
            blocked: matches!(self.phase, Phase::GameOver { .. }),
            history: self.rules.history().iter().map(Move::to_string).collect(),
        }
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

// ============================================================================
// TESTS
// ============================================================================
