//! Play chess against a UCI engine.
//!
//! The crate is organized in layers:
//! - `domain`: pure chess and UCI protocol types
//! - `models`: the rules engine adapter, the engine process, and the game
//!   session controller
//! - `ui`: the board renderer seam and display generation
//! - `app`/`config`: the terminal front-end

pub mod app;
pub mod config;
pub mod domain;
pub mod models;
pub mod ui;
