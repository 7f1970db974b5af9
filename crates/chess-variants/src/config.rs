//! Game setup loaded from TOML.
//!
//! ```toml
//! variant = "suicide"
//! fen = "8/4P3/8/8/8/8/8/k7 w - - 0 1"
//!
//! [tags]
//! White = "Alice"
//! Black = "Bob"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Game, GameError, Variant};

/// Errors that can occur when loading a game configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid game setup: {0}")]
    Game(#[from] GameError),
}

/// How to start a game. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GameConfig {
    #[serde(default)]
    pub variant: Variant,
    /// Starting position; the variant's initial position when absent.
    #[serde(default)]
    pub fen: Option<String>,
    /// Extra metadata tags, e.g. `White` and `Event`.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl GameConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn into_game(self) -> Result<Game, ConfigError> {
        let mut game = match &self.fen {
            Some(fen) => Game::from_fen(self.variant, fen)?,
            None => Game::new(self.variant),
        };
        for (name, value) in self.tags {
            game.set_tag(name, value);
        }
        Ok(game)
    }
}
