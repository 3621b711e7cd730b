//! Pure chess domain types and utilities.
//! No process or I/O dependencies - this is the domain layer.

use serde::{Deserialize, Serialize};
use shakmaty::{Color as SColor, Role, Square};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PieceKind {
    Pawn,
    Rook,
    Knight,
    Bishop,
    Queen,
    King,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    pub fn opponent(self) -> Self {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PieceColor::White => "white",
            PieceColor::Black => "black",
        }
    }
}

impl From<SColor> for PieceColor {
    fn from(color: SColor) -> Self {
        match color {
            SColor::White => PieceColor::White,
            SColor::Black => PieceColor::Black,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: PieceColor,
}

impl Piece {
    /// Figurine glyph for captured-material and board display.
    pub fn glyph(&self) -> char {
        match (self.kind, self.color) {
            (PieceKind::Pawn, PieceColor::White) => '♙',
            (PieceKind::Pawn, PieceColor::Black) => '♟',
            (PieceKind::Rook, PieceColor::White) => '♖',
            (PieceKind::Rook, PieceColor::Black) => '♜',
            (PieceKind::Knight, PieceColor::White) => '♘',
            (PieceKind::Knight, PieceColor::Black) => '♞',
            (PieceKind::Bishop, PieceColor::White) => '♗',
            (PieceKind::Bishop, PieceColor::Black) => '♝',
            (PieceKind::Queen, PieceColor::White) => '♕',
            (PieceKind::Queen, PieceColor::Black) => '♛',
            (PieceKind::King, PieceColor::White) => '♔',
            (PieceKind::King, PieceColor::Black) => '♚',
        }
    }
}

/// Convert a shakmaty role to our domain piece kind
pub fn kind_from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

/// Convert shakmaty piece to our domain Piece
pub fn shakmaty_to_piece(piece: shakmaty::Piece) -> Piece {
    Piece {
        kind: kind_from_role(piece.role),
        color: piece.color.into(),
    }
}

/// A move the player (or the engine, once its reply is parsed) asks the
/// rules engine to make. Promotion defaults to queen, matching the
/// drag-and-drop front-end.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    pub from: Square,
    pub to: Square,
    pub promotion: Role,
}

impl MoveRequest {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: Role::Queen,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: Role) -> Self {
        Self {
            from,
            to,
            promotion,
        }
    }
}

/// What the rules engine reports back for an applied (or undone) move.
/// Immutable once returned.
#[derive(Clone, Debug)]
pub struct MoveResult {
    pub from: Square,
    pub to: Square,
    /// Side that made the move.
    pub color: PieceColor,
    /// Kind of the piece taken off the board, if the move was a capture.
    pub captured: Option<PieceKind>,
    /// Standard algebraic notation of the move.
    pub san: String,
}
