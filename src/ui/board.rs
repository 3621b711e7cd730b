//! Board renderer seam and the terminal implementation.
//!
//! The controller only ever talks to [`BoardRenderer`]; the terminal board
//! here is the production implementation, tests substitute a recording fake.

use crate::domain::{PieceColor, shakmaty_to_piece};
use crate::models::session::BoardRenderer;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A unicode board printed to stdout.
pub struct TermBoard {
    orientation: PieceColor,
    last_fen: String,
}

impl TermBoard {
    pub fn new(orientation: PieceColor) -> Self {
        Self {
            orientation,
            last_fen: START_FEN.to_string(),
        }
    }

    fn draw(&self) {
        print!("{}", render_board(&self.last_fen, self.orientation));
    }
}

impl BoardRenderer for TermBoard {
    fn position(&mut self, fen: &str) {
        self.last_fen = fen.to_string();
        self.draw();
    }

    fn start(&mut self) {
        self.last_fen = START_FEN.to_string();
        self.draw();
    }

    fn orientation(&mut self, color: PieceColor) {
        if self.orientation != color {
            self.orientation = color;
            self.draw();
        }
    }

    fn resize(&mut self) {
        self.draw();
    }
}

/// Render the board field of a FEN as text, rank labels on the left and file
/// labels underneath, flipped for black.
pub fn render_board(fen: &str, orientation: PieceColor) -> String {
    let board_field = fen.split_whitespace().next().unwrap_or("");
    let mut grid = [[None; 8]; 8]; // [rank][file], rank 0 = rank 1
    let mut rank = 7usize;
    let mut file = 0usize;
    for ch in board_field.chars() {
        match ch {
            '/' => {
                rank = rank.saturating_sub(1);
                file = 0;
            }
            d if d.is_ascii_digit() => {
                file += d.to_digit(10).unwrap_or(0) as usize;
            }
            p => {
                if file < 8 {
                    grid[rank][file] = shakmaty::Piece::from_char(p);
                }
                file += 1;
            }
        }
    }

    let ranks: Vec<usize> = match orientation {
        PieceColor::White => (0..8).rev().collect(),
        PieceColor::Black => (0..8).collect(),
    };
    let files: Vec<usize> = match orientation {
        PieceColor::White => (0..8).collect(),
        PieceColor::Black => (0..8).rev().collect(),
    };

    let mut out = String::new();
    for &r in &ranks {
        out.push((b'1' + r as u8) as char);
        for &f in &files {
            out.push(' ');
            match grid[r][f] {
                Some(piece) => out.push(shakmaty_to_piece(piece).glyph()),
                None => out.push('.'),
            }
        }
        out.push('\n');
    }
    out.push(' ');
    for &f in &files {
        out.push(' ');
        out.push((b'a' + f as u8) as char);
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_white_orientation() {
        let text = render_board(START_FEN, PieceColor::White);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("8 ♜"));
        assert!(lines[7].starts_with("1 ♖"));
        assert_eq!(lines[8].trim_start(), "a b c d e f g h");
    }

    #[test]
    fn test_black_orientation_is_flipped() {
        let text = render_board(START_FEN, PieceColor::Black);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("1 ♖"));
        assert_eq!(lines[8].trim_start(), "h g f e d c b a");
    }

    #[test]
    fn test_empty_squares_render_as_dots() {
        let text = render_board("8/8/8/8/8/8/8/8 w - - 0 1", PieceColor::White);
        assert!(text.lines().next().unwrap().contains(". . . ."));
    }
}
