pub mod chess;
pub mod uci;

pub use chess::{
    MoveRequest, MoveResult, Piece, PieceColor, PieceKind, kind_from_role, shakmaty_to_piece,
};
