//! UCI (Universal Chess Interface) protocol types and utilities.
//!
//! This module handles low-level UCI protocol communication with chess
//! engines. It provides types for UCI commands and responses, but does not
//! handle the actual process spawning (that's done in the models layer).

use shakmaty::{Role, Square};

/// UCI commands that can be sent to an engine
#[derive(Debug, Clone)]
#[allow(dead_code)] // Some variants reserved for future use
pub enum UciCommand {
    /// Initialize UCI mode
    Uci,
    /// Check if engine is ready
    IsReady,
    /// Set a new game
    UciNewGame,
    /// Set position from a FEN snapshot
    Position { fen: String },
    /// Start a search with a depth limit
    GoDepth(u32),
    /// Stop the search
    Stop,
    /// Quit the engine
    Quit,
}

impl UciCommand {
    /// Convert command to UCI protocol string
    pub fn to_uci_string(&self) -> String {
        match self {
            UciCommand::Uci => "uci".to_string(),
            UciCommand::IsReady => "isready".to_string(),
            UciCommand::UciNewGame => "ucinewgame".to_string(),
            UciCommand::Position { fen } => format!("position fen {}", fen),
            UciCommand::GoDepth(d) => format!("go depth {}", d),
            UciCommand::Stop => "stop".to_string(),
            UciCommand::Quit => "quit".to_string(),
        }
    }
}

/// Raw UCI output line types
#[derive(Debug, Clone)]
#[allow(dead_code)] // Some variants reserved for future use
pub enum UciOutputKind {
    /// "uciok" - engine is ready for UCI
    UciOk,
    /// "readyok" - engine is ready
    ReadyOk,
    /// "info ..." - search information
    Info(String),
    /// "bestmove ..." - best move found
    BestMove(String),
    /// Engine identification
    Id(String),
    /// Option definition
    Option(String),
    /// Unknown/other output
    Other(String),
}

impl UciOutputKind {
    /// Parse a raw UCI output line into a categorized type
    pub fn parse(line: &str) -> Self {
        let line = line.trim();

        if line == "uciok" {
            UciOutputKind::UciOk
        } else if line == "readyok" {
            UciOutputKind::ReadyOk
        } else if let Some(rest) = line.strip_prefix("info ") {
            UciOutputKind::Info(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("bestmove ") {
            UciOutputKind::BestMove(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("id ") {
            UciOutputKind::Id(rest.to_string())
        } else if let Some(rest) = line.strip_prefix("option ") {
            UciOutputKind::Option(rest.to_string())
        } else {
            UciOutputKind::Other(line.to_string())
        }
    }
}

/// Parsed payload of a `bestmove` line: a four/five-character move token
/// (from-square, to-square, optional promotion letter).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BestMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Role>,
}

impl BestMove {
    /// Parse the text following `bestmove`, e.g. `e2e4`, `e7e8q`, or
    /// `g1f3 ponder d7d5`. Returns `None` for `(none)` (no move available)
    /// and for anything that isn't a UCI move token.
    pub fn parse(rest: &str) -> Option<Self> {
        let token = rest.split_whitespace().next()?;
        if !token.is_ascii() || !(4..=5).contains(&token.len()) {
            return None;
        }
        let from = token.get(0..2)?.parse::<Square>().ok()?;
        let to = token.get(2..4)?.parse::<Square>().ok()?;
        let promotion = match token.get(4..).and_then(|s| s.chars().next()) {
            Some(ch) => Some(Role::from_char(ch)?),
            None => None,
        };
        Some(Self {
            from,
            to,
            promotion,
        })
    }
}
