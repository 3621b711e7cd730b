//! End-to-end session flows driven through the public API, with a scripted
//! engine standing in for the UCI process.

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use chess_bot::domain::PieceColor;
use chess_bot::models::{
    BoardRenderer, Command, Controller, DropOutcome, Event, SearchBackend, SessionState, Timing,
};
use chess_bot::ui::GameStatus;
use shakmaty::Square;

#[derive(Default)]
struct RecordingBoard {
    positions: Vec<String>,
    orientation: Option<PieceColor>,
}

impl BoardRenderer for RecordingBoard {
    fn position(&mut self, fen: &str) {
        self.positions.push(fen.to_string());
    }

    fn start(&mut self) {
        self.positions.clear();
    }

    fn orientation(&mut self, color: PieceColor) {
        self.orientation = Some(color);
    }
}

/// Replies to every search request with the next scripted move, delivered
/// through the event channel like the real engine reader thread.
struct ScriptedEngine {
    replies: Vec<&'static str>,
    next: usize,
    events: Sender<Event>,
    requests: Vec<(String, u32)>,
}

impl ScriptedEngine {
    fn new(replies: Vec<&'static str>, events: Sender<Event>) -> Self {
        Self {
            replies,
            next: 0,
            events,
            requests: Vec::new(),
        }
    }
}

impl SearchBackend for ScriptedEngine {
    fn request(&mut self, fen: &str, depth: u32) {
        self.requests.push((fen.to_string(), depth));
        if let Some(reply) = self.replies.get(self.next) {
            self.next += 1;
            let _ = self
                .events
                .send(Event::Engine(format!("bestmove {}", reply)));
        }
    }
}

fn scripted(
    color: PieceColor,
    replies: Vec<&'static str>,
) -> (Controller<RecordingBoard, ScriptedEngine>, Receiver<Event>) {
    let (tx, rx) = mpsc::channel();
    let engine = ScriptedEngine::new(replies, tx.clone());
    let controller = Controller::new(
        color,
        8,
        RecordingBoard::default(),
        engine,
        tx,
        Timing::IMMEDIATE,
    );
    (controller, rx)
}

fn pump(c: &mut Controller<RecordingBoard, ScriptedEngine>, rx: &Receiver<Event>) {
    while let Ok(event) = rx.try_recv() {
        c.handle(event);
    }
}

#[test]
fn full_opening_exchange() {
    let (mut c, rx) = scripted(PieceColor::White, vec!["e7e5", "b8c6"]);

    assert_eq!(c.player_drop(Square::E2, Square::E4), DropOutcome::Moved);
    pump(&mut c, &rx);
    assert_eq!(c.session().state, SessionState::AwaitingPlayerMove);
    assert_eq!(c.rules().history(), vec!["e4", "e5"]);

    assert_eq!(c.player_drop(Square::G1, Square::F3), DropOutcome::Moved);
    pump(&mut c, &rx);
    assert_eq!(c.rules().history(), vec!["e4", "e5", "Nf3", "Nc6"]);
    assert_eq!(c.session().move_count, 2);
    assert_eq!(c.session().capture_count, 0);
    assert_eq!(c.engine().requests.len(), 2);
    assert_eq!(c.engine().requests[0].1, 8);
    // Every applied half-move was mirrored to the renderer.
    assert_eq!(c.board().positions.len(), 4);
}

#[test]
fn playing_black_engine_opens() {
    let (mut c, rx) = scripted(PieceColor::Black, vec!["d2d4"]);
    assert_eq!(c.session().state, SessionState::AwaitingEngineMove);

    pump(&mut c, &rx);
    assert_eq!(c.session().state, SessionState::AwaitingPlayerMove);
    assert_eq!(c.rules().history(), vec!["d4"]);
    assert_eq!(c.board().orientation, Some(PieceColor::Black));
    assert!(c.can_lift(Square::D7));
    assert!(!c.can_lift(Square::D4));
}

#[test]
fn capture_undo_roundtrip_restores_session() {
    let (mut c, rx) = scripted(PieceColor::White, vec!["d7d5", "d8d5"]);

    c.player_drop(Square::E2, Square::E4);
    pump(&mut c, &rx);
    c.player_drop(Square::E4, Square::D5); // exd5
    pump(&mut c, &rx); // ... Qxd5
    assert_eq!(c.session().capture_count, 2);

    // Undo takes back the engine's recapture and the player's capture.
    c.handle(Event::Command(Command::Undo));
    assert_eq!(c.session().capture_count, 0);
    assert!(c.session().captured_white.is_empty());
    assert!(c.session().captured_black.is_empty());
    assert_eq!(c.session().state, SessionState::AwaitingPlayerMove);
    assert_eq!(c.rules().history(), vec!["e4", "d5"]);

    c.handle(Event::Command(Command::Undo));
    assert_eq!(c.rules().history_len(), 0);
}

#[test]
fn status_reflects_game_over() {
    let (mut c, rx) = scripted(PieceColor::White, vec!["e7e5", "b8c6", "g8f6"]);
    for (from, to) in [
        (Square::E2, Square::E4),
        (Square::F1, Square::C4),
        (Square::D1, Square::H5),
        (Square::H5, Square::F7),
    ] {
        assert_eq!(c.player_drop(from, to), DropOutcome::Moved);
        pump(&mut c, &rx);
    }
    assert_eq!(c.session().state, SessionState::GameOver);
    let status = GameStatus::of(c.rules());
    assert!(status.is_game_over());
    assert_eq!(
        status,
        GameStatus::Checkmate {
            winner: PieceColor::White
        }
    );
}

#[test]
fn new_game_mid_search_discards_the_late_reply() {
    // The scripted engine replies synchronously, so emulate a slow engine by
    // scripting no reply and injecting one manually after the reset.
    let (mut c, rx) = scripted(PieceColor::White, vec![]);
    c.player_drop(Square::E2, Square::E4);
    pump(&mut c, &rx); // search issued, no reply arrives

    c.handle(Event::Command(Command::NewGame));
    c.handle(Event::Engine("bestmove e7e5".to_string()));
    assert_eq!(c.rules().history_len(), 0);
    assert_eq!(c.session().state, SessionState::AwaitingPlayerMove);

    // The next game works normally.
    c.player_drop(Square::D2, Square::D4);
    pump(&mut c, &rx);
    c.handle(Event::Engine("bestmove g8f6".to_string()));
    assert_eq!(c.rules().history(), vec!["d4", "Nf6"]);
}

#[test]
fn default_timing_delivers_the_bot_move_event() {
    let (tx, rx) = mpsc::channel();
    let engine = ScriptedEngine::new(vec![], tx.clone());
    let mut c = Controller::new(
        PieceColor::White,
        8,
        RecordingBoard::default(),
        engine,
        tx,
        Timing::default(),
    );

    c.player_drop(Square::E2, Square::E4);
    // The 250ms bot-move timer must fire on its own.
    let event = rx
        .recv_timeout(Duration::from_secs(2))
        .expect("scheduled bot move should arrive");
    assert!(matches!(event, Event::BotMoveDue { .. }));
    c.handle(event);
    assert_eq!(c.engine().requests.len(), 1);
}
