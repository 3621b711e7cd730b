pub mod board;
pub mod display;

pub use board::TermBoard;
pub use display::GameStatus;
