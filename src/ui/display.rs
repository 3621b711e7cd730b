//! Display generation for session state.
//!
//! This module transforms game and session state into display-ready values:
//! the status line, paired move history, captured material, and think time.
//! It lives in the UI layer and depends on domain + models, not vice versa.

use std::fmt;
use std::time::Duration;

use crate::domain::{Piece, PieceColor, PieceKind};
use crate::models::Rules;

/// Game status, evaluated in the order the front-end reports it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Checkmate { winner: PieceColor },
    Draw,
    Stalemate,
    RepetitionDraw,
    InProgress { turn: PieceColor, in_check: bool },
}

impl GameStatus {
    pub fn of(rules: &Rules) -> Self {
        let turn = rules.turn();
        if rules.is_checkmate() {
            GameStatus::Checkmate {
                winner: turn.opponent(),
            }
        } else if rules.is_draw() {
            GameStatus::Draw
        } else if rules.is_stalemate() {
            GameStatus::Stalemate
        } else if rules.is_threefold_repetition() {
            GameStatus::RepetitionDraw
        } else {
            GameStatus::InProgress {
                turn,
                in_check: rules.is_check(),
            }
        }
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::InProgress { .. })
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Checkmate { winner } => {
                write!(f, "Game over - {} wins by checkmate!", winner.name())
            }
            GameStatus::Draw => write!(f, "Game over - draw"),
            GameStatus::Stalemate => write!(f, "Game over - stalemate"),
            GameStatus::RepetitionDraw => write!(f, "Game over - draw by repetition"),
            GameStatus::InProgress { turn, in_check } => {
                write!(f, "{} to move", capitalize(turn.name()))?;
                if *in_check {
                    write!(f, " - check!")?;
                }
                Ok(())
            }
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Pair the SAN history per full move for display (`1. e4 e5`).
pub fn move_pairs(history: &[String]) -> Vec<(usize, String, Option<String>)> {
    history
        .chunks(2)
        .enumerate()
        .map(|(i, chunk)| (i + 1, chunk[0].clone(), chunk.get(1).cloned()))
        .collect()
}

/// Captured material of one side as a glyph string, in capture order.
pub fn captured_line(color: PieceColor, kinds: &[PieceKind]) -> String {
    kinds
        .iter()
        .map(|&kind| Piece { kind, color }.glyph())
        .collect()
}

/// Think time formatted the way the front-end shows it, e.g. `1.23s`.
pub fn think_time(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}
