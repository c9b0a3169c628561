//! Game configuration

use crate::pieces::Color;
use serde::{Deserialize, Serialize};

/// Pause before the computer replies, in milliseconds
pub const DEFAULT_COMPUTER_DELAY_MS: u64 = 300;

/// Settings for one human-vs-computer game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Colour played by the human; the computer takes the other one
    pub human_color: Color,
    /// Pacing delay before the computer move
    pub computer_delay_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            human_color: Color::Light,
            computer_delay_ms: DEFAULT_COMPUTER_DELAY_MS,
        }
    }
}

impl GameConfig {
    pub fn computer_color(&self) -> Color {
        self.human_color.opponent()
    }

    /// Set the human's colour
    pub fn with_human_color(mut self, color: Color) -> Self {
        self.human_color = color;
        self
    }

    /// Set the pacing delay
    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.computer_delay_ms = delay_ms;
        self
    }
}
