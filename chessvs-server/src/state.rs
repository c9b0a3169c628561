//! Server state management
//!
//! One shared game session. The search runs while the write lock is held;
//! the pacing delay before it is awaited without the lock.

use chessvs_core::{GameConfig, GameSession};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Server-wide shared state
pub struct ServerState {
    pub config: GameConfig,
    game: RwLock<GameSession>,
}

impl ServerState {
    pub fn new(config: GameConfig) -> Self {
        Self {
            game: RwLock::new(GameSession::new(config.clone())),
            config,
        }
    }

    /// Pause inserted before each computer move
    pub fn computer_delay(&self) -> Duration {
        Duration::from_millis(self.config.computer_delay_ms)
    }

    pub fn game(&self) -> RwLockReadGuard<'_, GameSession> {
        self.game.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn game_mut(&self) -> RwLockWriteGuard<'_, GameSession> {
        self.game.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
