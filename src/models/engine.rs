//! Search engine process management.
//!
//! Engine I/O runs on OS threads (reader/writer) connected by channels.
//! Every line the engine prints is forwarded into the session event channel,
//! where the controller consumes it on its single consumer thread - the
//! controller never blocks on the engine and never handles two events at
//! once.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::{Context as _, Result};

use crate::domain::uci::UciCommand;
use crate::models::session::Event;

/// The controller's view of the search engine: fire a request, receive the
/// reply later as an [`Event::Engine`] line.
pub trait SearchBackend {
    fn request(&mut self, fen: &str, depth: u32);
}

/// A UCI engine subprocess (Stockfish or compatible).
pub struct UciEngine {
    cmd_tx: Sender<String>,
    process: Child,
}

impl UciEngine {
    /// Spawn the engine and wire its output into `events`.
    pub fn spawn(path: &str, events: Sender<Event>) -> Result<Self> {
        let mut child = Command::new(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start engine at {}", path))?;

        let stdin = child.stdin.take().context("engine stdin unavailable")?;
        let stdout = child.stdout.take().context("engine stdout unavailable")?;

        let (cmd_tx, cmd_rx) = mpsc::channel::<String>();

        // Reader thread: blocking line reads, forwarded as events.
        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(text) => {
                        if events.send(Event::Engine(text)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::warn!("engine read error: {}", e);
                        break;
                    }
                }
            }
            log::info!("engine output stream closed");
        });

        // Writer thread: blocking writes of queued commands.
        thread::spawn(move || {
            let mut writer = stdin;
            while let Ok(cmd) = cmd_rx.recv() {
                if writeln!(writer, "{}", cmd).is_err() {
                    break;
                }
                if writer.flush().is_err() {
                    break;
                }
            }
        });

        let engine = Self {
            cmd_tx,
            process: child,
        };
        engine.send(UciCommand::Uci);
        engine.send(UciCommand::IsReady);
        Ok(engine)
    }

    fn send(&self, cmd: UciCommand) {
        // A closed channel means the writer thread is gone; the reader side
        // will report the dead process.
        let _ = self.cmd_tx.send(cmd.to_uci_string());
    }
}

impl SearchBackend for UciEngine {
    fn request(&mut self, fen: &str, depth: u32) {
        self.send(UciCommand::Position {
            fen: fen.to_string(),
        });
        self.send(UciCommand::GoDepth(depth));
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.send(UciCommand::Quit);
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
