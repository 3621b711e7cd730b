use std::path::PathBuf;

use anyhow::Result;

use chess_bot::app;
use chess_bot::config::Config;

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&PathBuf::from(path))?,
        None => Config::default(),
    };
    app::run(config)
}
