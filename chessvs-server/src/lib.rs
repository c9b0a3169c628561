//! CHESSVS Server - HTTP API for the board renderer
//!
//! This crate provides the web backend:
//! - REST API for the human-vs-computer game (clicks, computer move, reset, undo)
//! - Static file serving for the board front end

mod routes;
mod state;

use axum::{
    routing::{get, post},
    Router,
};
use chessvs_core::GameConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use routes::game::{ClickRequest, ClickResponse, ComputerMoveResponse};
pub use state::ServerState;

/// Server configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub static_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8002,
            static_dir: "web".to_string(),
        }
    }
}

/// Create the router with all routes
pub fn create_router(config: &ServerConfig, state: Arc<ServerState>) -> Router {
    let static_service = ServeDir::new(&config.static_dir);

    Router::new()
        // Status endpoint
        .route("/api/status", get(routes::status::status_handler))
        // Game API
        .route("/api/game", get(routes::game::get_game))
        .route("/api/game/moves", get(routes::game::get_moves))
        .route("/api/game/click", post(routes::game::click_square))
        .route("/api/game/computer-move", post(routes::game::computer_move))
        .route("/api/game/reset", post(routes::game::reset_game))
        .route("/api/game/undo", post(routes::game::undo_move))
        // Shared state
        .with_state(state)
        // Static file serving (must be last)
        .fallback_service(static_service)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn run_server(config: ServerConfig, game: GameConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(ServerState::new(game));
    let router = create_router(&config, state);

    tracing::info!("CHESSVS Server starting on http://0.0.0.0:{}", config.port);
    tracing::info!("Static files served from: {}", config.static_dir);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
