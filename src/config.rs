//! Runtime configuration for the terminal front-end.

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::domain::PieceColor;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path or name of a UCI engine binary.
    pub engine_path: String,
    /// Search depth passed to the engine.
    pub depth: u32,
    pub player_color: PieceColor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_path: "stockfish".to_string(),
            depth: 10,
            player_color: PieceColor::White,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing fields fall back to the
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
