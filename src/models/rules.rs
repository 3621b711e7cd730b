//! Rules engine adapter over shakmaty.
//!
//! The session controller never reasons about legality itself; everything
//! flows through this adapter: move application, undo, history, position
//! snapshots, and game-state flags. shakmaty positions are immutable-on-play,
//! so undo is a stack of pre-move snapshots kept here.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::{Chess, EnPassantMode, File, Move, Position, Square};

use crate::domain::{MoveRequest, MoveResult, PieceColor, kind_from_role};

/// A legal move reduced to the squares the front-end works with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LegalMove {
    pub from: Square,
    pub to: Square,
}

/// One applied move: the position it was played from plus the reported result.
#[derive(Clone, Debug)]
struct Applied {
    before: Chess,
    result: MoveResult,
}

#[derive(Default)]
pub struct Rules {
    position: Chess,
    applied: Vec<Applied>,
}

impl Rules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the starting position with an empty history.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Try to make the requested move. Returns `None` if it is not legal;
    /// the position is left untouched in that case.
    pub fn try_move(&mut self, req: MoveRequest) -> Option<MoveResult> {
        let m = self.find_legal(req)?;
        let san = San::from_move(&self.position, m.clone()).to_string();
        let result = MoveResult {
            from: req.from,
            to: req.to,
            color: self.position.turn().into(),
            captured: m.capture().map(kind_from_role),
            san,
        };

        let before = self.position.clone();
        // The move came straight out of legal_moves(), so play cannot fail.
        self.position = before.clone().play(m).expect("legal move");
        self.applied.push(Applied {
            before,
            result: result.clone(),
        });
        Some(result)
    }

    /// Take back the last half-move. Returns the result that was originally
    /// reported for it, or `None` if there is nothing to undo.
    pub fn undo(&mut self) -> Option<MoveResult> {
        let last = self.applied.pop()?;
        self.position = last.before;
        Some(last.result)
    }

    /// All legal moves from the current position, as from/to square pairs.
    /// Castling is reported as the king moving to its destination square,
    /// the way a player would drag it.
    pub fn legal_moves(&self) -> Vec<LegalMove> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(|m| {
                let (from, to) = endpoints(m)?;
                Some(LegalMove { from, to })
            })
            .collect()
    }

    pub fn turn(&self) -> PieceColor {
        self.position.turn().into()
    }

    /// Color of the piece on `square`, if any.
    pub fn color_at(&self, square: Square) -> Option<PieceColor> {
        self.position
            .board()
            .piece_at(square)
            .map(|p| p.color.into())
    }

    /// Moves played so far, in standard algebraic notation.
    pub fn history(&self) -> Vec<String> {
        self.applied.iter().map(|a| a.result.san.clone()).collect()
    }

    pub fn history_len(&self) -> usize {
        self.applied.len()
    }

    /// FEN snapshot of the current position.
    pub fn fen(&self) -> String {
        Fen::from_position(&self.position, EnPassantMode::Legal).to_string()
    }

    pub fn is_checkmate(&self) -> bool {
        self.position.is_checkmate()
    }

    pub fn is_stalemate(&self) -> bool {
        self.position.is_stalemate()
    }

    pub fn is_check(&self) -> bool {
        self.position.is_check()
    }

    /// Drawn by the fifty-move rule or insufficient material.
    pub fn is_draw(&self) -> bool {
        self.position.halfmoves() >= 100 || self.position.is_insufficient_material()
    }

    /// The current position has occurred at least three times.
    pub fn is_threefold_repetition(&self) -> bool {
        let key = repetition_key(&self.position);
        let mut seen = 1;
        for a in &self.applied {
            if repetition_key(&a.before) == key {
                seen += 1;
                if seen >= 3 {
                    return true;
                }
            }
        }
        false
    }

    pub fn is_game_over(&self) -> bool {
        self.is_checkmate() || self.is_stalemate() || self.is_draw() || self.is_threefold_repetition()
    }

    /// Find the legal move matching the request, if any.
    fn find_legal(&self, req: MoveRequest) -> Option<Move> {
        for m in &self.position.legal_moves() {
            let Some((from, to)) = endpoints(m) else {
                continue;
            };
            if from != req.from || to != req.to {
                continue;
            }
            // Promotion moves exist once per target role; pick the requested one.
            if let Some(p) = m.promotion() {
                if p != req.promotion {
                    continue;
                }
            }
            return Some(m.clone());
        }
        None
    }
}

/// From/to squares as the player sees them. For castling, the user drags the
/// king to its destination (g1/g8 or c1/c8).
fn endpoints(m: &Move) -> Option<(Square, Square)> {
    match m {
        Move::Normal { from, to, .. } | Move::EnPassant { from, to } => Some((*from, *to)),
        Move::Castle { king, rook } => {
            let king_dest = if rook.file() == File::H {
                Square::from_coords(File::G, rook.rank())
            } else {
                Square::from_coords(File::C, rook.rank())
            };
            Some((*king, king_dest))
        }
        Move::Put { .. } => None,
    }
}

/// Position identity for repetition counting: board, side to move, castling
/// rights, and en passant square (the first four FEN fields).
fn repetition_key(pos: &Chess) -> String {
    let fen = Fen::from_position(pos, EnPassantMode::Legal).to_string();
    fen.split_whitespace()
        .take(4)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PieceKind;
    use shakmaty::Role;

    fn mv(rules: &mut Rules, from: Square, to: Square) -> MoveResult {
        rules
            .try_move(MoveRequest::new(from, to))
            .expect("move should be legal")
    }

    #[test]
    fn test_opening_move() {
        let mut rules = Rules::new();
        let result = mv(&mut rules, Square::E2, Square::E4);
        assert_eq!(result.san, "e4");
        assert_eq!(result.color, PieceColor::White);
        assert_eq!(result.captured, None);
        assert_eq!(rules.turn(), PieceColor::Black);
        assert!(rules.fen().starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b"));
    }

    #[test]
    fn test_illegal_move_is_rejected_without_state_change() {
        let mut rules = Rules::new();
        let fen_before = rules.fen();
        assert!(rules.try_move(MoveRequest::new(Square::E2, Square::E5)).is_none());
        assert_eq!(rules.fen(), fen_before);
        assert_eq!(rules.history_len(), 0);
    }

    #[test]
    fn test_capture_is_reported() {
        let mut rules = Rules::new();
        mv(&mut rules, Square::E2, Square::E4);
        mv(&mut rules, Square::D7, Square::D5);
        let result = mv(&mut rules, Square::E4, Square::D5);
        assert_eq!(result.captured, Some(PieceKind::Pawn));
        assert_eq!(result.san, "exd5");
    }

    #[test]
    fn test_undo_restores_position_and_history() {
        let mut rules = Rules::new();
        let fen_start = rules.fen();
        mv(&mut rules, Square::E2, Square::E4);
        let undone = rules.undo().unwrap();
        assert_eq!(undone.san, "e4");
        assert_eq!(rules.fen(), fen_start);
        assert!(rules.history().is_empty());
        assert!(rules.undo().is_none());
    }

    #[test]
    fn test_castling_by_king_destination() {
        let mut rules = Rules::new();
        for (from, to) in [
            (Square::E2, Square::E4),
            (Square::E7, Square::E5),
            (Square::G1, Square::F3),
            (Square::B8, Square::C6),
            (Square::F1, Square::C4),
            (Square::F8, Square::C5),
        ] {
            mv(&mut rules, from, to);
        }
        let result = mv(&mut rules, Square::E1, Square::G1);
        assert_eq!(result.san, "O-O");
    }

    #[test]
    fn test_promotion_follows_request() {
        // White pawn on a7 ready to promote.
        let mut rules = Rules::new();
        for (from, to) in [
            (Square::B2, Square::B4),
            (Square::A7, Square::A5),
            (Square::B4, Square::A5),
            (Square::H7, Square::H6),
            (Square::A5, Square::A6),
            (Square::H6, Square::H5),
            (Square::A6, Square::B7),
            (Square::H5, Square::H4),
        ] {
            mv(&mut rules, from, to);
        }
        let result = rules
            .try_move(MoveRequest::with_promotion(
                Square::B7,
                Square::A8,
                Role::Knight,
            ))
            .unwrap();
        assert!(result.san.contains("=N"));
    }

    #[test]
    fn test_scholars_mate_is_checkmate() {
        let mut rules = Rules::new();
        for (from, to) in [
            (Square::E2, Square::E4),
            (Square::E7, Square::E5),
            (Square::F1, Square::C4),
            (Square::B8, Square::C6),
            (Square::D1, Square::H5),
            (Square::G8, Square::F6),
            (Square::H5, Square::F7),
        ] {
            mv(&mut rules, from, to);
        }
        assert!(rules.is_checkmate());
        assert!(rules.is_game_over());
        assert!(rules.legal_moves().is_empty());
    }

    #[test]
    fn test_threefold_repetition() {
        let mut rules = Rules::new();
        // Shuffle knights back and forth until the start position recurs twice.
        for _ in 0..2 {
            mv(&mut rules, Square::G1, Square::F3);
            mv(&mut rules, Square::G8, Square::F6);
            mv(&mut rules, Square::F3, Square::G1);
            mv(&mut rules, Square::F6, Square::G8);
        }
        assert!(rules.is_threefold_repetition());
        assert!(rules.is_game_over());
    }

    #[test]
    fn test_legal_moves_at_start() {
        let rules = Rules::new();
        let moves = rules.legal_moves();
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&LegalMove {
            from: Square::E2,
            to: Square::E4
        }));
    }

    #[test]
    fn test_check_flag() {
        let mut rules = Rules::new();
        for (from, to) in [
            (Square::E2, Square::E4),
            (Square::F7, Square::F6),
            (Square::D2, Square::D4),
            (Square::G7, Square::G5),
            (Square::D1, Square::H5),
        ] {
            mv(&mut rules, from, to);
        }
        // This is actually mate (fool's mate pattern), which implies check.
        assert!(rules.is_check());
        assert!(rules.is_checkmate());
    }
}
