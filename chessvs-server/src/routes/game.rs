//! Game API endpoints
//!
//! Click-driven play against the computer. Every mutating endpoint answers
//! with the fresh [`GameView`] so the renderer can redraw from one response.

use crate::state::ServerState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chessvs_core::{ChessError, ClickOutcome, Decision, GameView, Move, Phase, RulesEngine, Square};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, err: impl std::fmt::Display) -> ApiError {
    (status, Json(json!({ "error": err.to_string() })))
}

fn parse_square(text: &str) -> Result<Square, ApiError> {
    text.parse::<Square>()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClickRequest {
    pub square: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponse {
    pub outcome: ClickOutcome,
    pub view: GameView,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComputerMoveResponse {
    pub decision: Decision,
    pub view: GameView,
}

#[derive(Debug, Deserialize)]
pub struct MovesQuery {
    pub square: Option<String>,
}

/// Current game view
pub async fn get_game(State(state): State<Arc<ServerState>>) -> Json<GameView> {
    Json(state.game().view())
}

/// Legal moves, optionally restricted to one source square
pub async fn get_moves(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<MovesQuery>,
) -> Result<Json<Vec<Move>>, ApiError> {
    let source = query.square.as_deref().map(parse_square).transpose()?;
    let game = state.game();
    let moves = match source {
        Some(square) => game.rules().legal_moves_from(square),
        None => game.rules().legal_moves(),
    };
    Ok(Json(moves))
}

/// Handle a click on a board square
pub async fn click_square(
    State(state): State<Arc<ServerState>>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, ApiError> {
    let square = parse_square(&req.square)?;
    let mut game = state.game_mut();
    let outcome = game.click(square);
    tracing::debug!(%square, ?outcome, "click");

    Ok(Json(ClickResponse {
        outcome,
        view: game.view(),
    }))
}

/// Play the computer's reply after the pacing delay
pub async fn computer_move(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<ComputerMoveResponse>, ApiError> {
    let phase = state.game().phase();
    if phase != Phase::AwaitingComputer {
        let err = ChessError::WrongPhase {
            action: "play the computer move",
            phase: phase.to_string(),
        };
        return Err(api_error(StatusCode::CONFLICT, err));
    }

    tokio::time::sleep(state.computer_delay()).await;

    // The search holds the write lock until it returns; run it on the
    // blocking pool. Readers still wait on the lock meanwhile.
    let worker = Arc::clone(&state);
    let searched = tokio::task::spawn_blocking(move || -> chessvs_core::Result<ComputerMoveResponse> {
        let mut game = worker.game_mut();
        let decision = game.computer_move()?;
        Ok(ComputerMoveResponse {
            decision,
            view: game.view(),
        })
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    searched.map(Json).map_err(|e: ChessError| {
        let status = match &e {
            ChessError::WrongPhase { .. } => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        api_error(status, e)
    })
}

/// Start a new game
pub async fn reset_game(State(state): State<Arc<ServerState>>) -> Json<GameView> {
    let mut game = state.game_mut();
    game.reset();
    Json(game.view())
}

/// Take back one ply
pub async fn undo_move(State(state): State<Arc<ServerState>>) -> Result<Json<GameView>, ApiError> {
    let mut game = state.game_mut();
    game.undo().map_err(|e| api_error(StatusCode::CONFLICT, e))?;
    Ok(Json(game.view()))
}
