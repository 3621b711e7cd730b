//! Terminal front-end wiring: engine process, stdin commands, event loop.
//!
//! The loop here is the single consumer thread of the event channel; the
//! stdin reader and the engine reader are producers. The controller never
//! sees two events at once.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Sender};
use std::thread;

use anyhow::Result;
use shakmaty::Square;

use crate::config::Config;
use crate::domain::PieceColor;
use crate::models::engine::UciEngine;
use crate::models::session::{Command, Controller, DropOutcome, Event, Timing};
use crate::ui::board::TermBoard;
use crate::ui::display::{self, GameStatus};

pub fn run(config: Config) -> Result<()> {
    let (tx, rx) = mpsc::channel::<Event>();
    let engine = UciEngine::spawn(&config.engine_path, tx.clone())?;
    let board = TermBoard::new(config.player_color);
    let mut controller = Controller::new(
        config.player_color,
        config.depth,
        board,
        engine,
        tx.clone(),
        Timing::default(),
    );

    spawn_input_thread(tx);
    print_help();

    let mut last_summary = String::new();
    while let Ok(event) = rx.recv() {
        match event {
            Event::Command(Command::Quit) => break,
            Event::PlayerDrop { from, to } => {
                if !controller.can_lift(from) {
                    println!("You can't pick up that piece.");
                } else if controller.player_drop(from, to) == DropOutcome::Snapback {
                    println!("Illegal move.");
                }
            }
            other => controller.handle(other),
        }

        let summary = summarize(&controller);
        if summary != last_summary {
            println!("{}", summary);
            last_summary = summary;
        }
    }
    Ok(())
}

fn summarize<R, S>(controller: &Controller<R, S>) -> String
where
    R: crate::models::BoardRenderer,
    S: crate::models::SearchBackend,
{
    let session = controller.session();
    let rules = controller.rules();
    let mut out = String::new();

    out.push_str(&GameStatus::of(rules).to_string());
    out.push('\n');

    for (num, white, black) in display::move_pairs(&rules.history()) {
        out.push_str(&format!(
            "{}. {} {}\n",
            num,
            white,
            black.unwrap_or_default()
        ));
    }

    out.push_str(&format!(
        "moves: {}  captures: {}\n",
        session.move_count, session.capture_count
    ));
    if !session.captured_white.is_empty() {
        out.push_str(&format!(
            "white material lost: {}\n",
            display::captured_line(PieceColor::White, &session.captured_white)
        ));
    }
    if !session.captured_black.is_empty() {
        out.push_str(&format!(
            "black material lost: {}\n",
            display::captured_line(PieceColor::Black, &session.captured_black)
        ));
    }
    if let Some(think) = session.last_think_time {
        out.push_str(&format!("engine thought for {}\n", display::think_time(think)));
    }
    if let Some(hint) = session.hint {
        out.push_str(&format!("Hint: try moving from {} to {}\n", hint.from, hint.to));
    }
    out
}

fn spawn_input_thread(tx: Sender<Event>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match parse_input(&line) {
                Some(event) => {
                    let quit = matches!(event, Event::Command(Command::Quit));
                    if tx.send(event).is_err() || quit {
                        break;
                    }
                }
                None => {
                    if !line.trim().is_empty() {
                        print_help();
                    }
                }
            }
        }
    });
}

fn parse_input(line: &str) -> Option<Event> {
    let mut parts = line.split_whitespace();
    let word = parts.next()?;
    match word {
        "move" | "m" => parse_drop(&parts.collect::<Vec<_>>().join("")),
        "new" => Some(Event::Command(Command::NewGame)),
        "undo" => Some(Event::Command(Command::Undo)),
        "hint" => Some(Event::Command(Command::Hint)),
        "depth" => {
            let depth = parts.next()?.parse().ok()?;
            Some(Event::Command(Command::SetDepth(depth)))
        }
        "color" => match parts.next()? {
            "white" => Some(Event::Command(Command::SetColor(PieceColor::White))),
            "black" => Some(Event::Command(Command::SetColor(PieceColor::Black))),
            _ => None,
        },
        "redraw" => Some(Event::Command(Command::Redraw)),
        "quit" | "q" => Some(Event::Command(Command::Quit)),
        // Bare move tokens like `e2e4` work too.
        token => parse_drop(token),
    }
}

fn parse_drop(token: &str) -> Option<Event> {
    if !token.is_ascii() || token.len() != 4 {
        return None;
    }
    let from = token.get(0..2)?.parse::<Square>().ok()?;
    let to = token.get(2..4)?.parse::<Square>().ok()?;
    Some(Event::PlayerDrop { from, to })
}

fn print_help() {
    println!(
        "commands: move <from><to> (e.g. move e2e4), new, undo, hint, \
         depth <n>, color <white|black>, redraw, quit"
    );
}
