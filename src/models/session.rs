//! Game session controller - the application layer for playing against the
//! engine.
//!
//! The controller owns all session state (turn ownership, color assignment,
//! counters, captured material, the pending search marker) and orchestrates
//! the turn-taking protocol between the player, the rules engine, the search
//! engine, and the board renderer.
//!
//! Architecture:
//! - All event sources (piece drops, timers, engine output) feed one mpsc
//!   channel drained by a single consumer thread
//! - Handlers therefore never run concurrently and session mutation is
//!   strictly sequential
//! - Waiting for the engine is implicit: a request is issued, the handler
//!   returns, and the reply arrives later as a fresh event

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use shakmaty::{Role, Square};

use crate::domain::uci::{BestMove, UciOutputKind};
use crate::domain::{MoveRequest, MoveResult, PieceColor, PieceKind};
use crate::models::engine::SearchBackend;
use crate::models::rules::Rules;

/// Delay before asking the engine to move, so the player's move renders first.
const PLAYER_MOVE_DELAY: Duration = Duration::from_millis(250);
/// Delay before the engine's first move when the player takes black.
const NEW_GAME_DELAY: Duration = Duration::from_millis(500);
/// How long a hint stays up if not dismissed earlier.
const HINT_TTL: Duration = Duration::from_secs(5);

/// Timer configuration for the controller. Tests run with
/// [`Timing::IMMEDIATE`] so scheduled events land on the channel directly.
#[derive(Clone, Copy, Debug)]
pub struct Timing {
    pub player_move_delay: Duration,
    pub new_game_delay: Duration,
    pub hint_ttl: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            player_move_delay: PLAYER_MOVE_DELAY,
            new_game_delay: NEW_GAME_DELAY,
            hint_ttl: HINT_TTL,
        }
    }
}

impl Timing {
    pub const IMMEDIATE: Timing = Timing {
        player_move_delay: Duration::ZERO,
        new_game_delay: Duration::ZERO,
        hint_ttl: Duration::ZERO,
    };
}

/// Events delivered to the controller.
#[derive(Debug, Clone)]
pub enum Event {
    /// The player dropped a piece on a target square.
    PlayerDrop { from: Square, to: Square },
    /// A raw output line from the search engine.
    Engine(String),
    /// A scheduled engine move came due.
    BotMoveDue { generation: u64 },
    /// A hint's display window elapsed.
    HintExpired { id: u64 },
    /// A user-facing control was triggered.
    Command(Command),
}

/// Commands produced by the user-facing controls.
#[derive(Debug, Clone)]
pub enum Command {
    NewGame,
    SetColor(PieceColor),
    Undo,
    Hint,
    SetDepth(u32),
    /// Repaint the board, e.g. after the terminal was resized.
    Redraw,
    /// Handled by the front-end loop, not the controller.
    Quit,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    AwaitingPlayerMove,
    AwaitingEngineMove,
    GameOver,
}

/// Outcome of a drop attempt, mirrored to the renderer.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DropOutcome {
    Moved,
    Snapback,
}

/// A suggested move shown to the player until it expires.
#[derive(Clone, Copy, Debug)]
pub struct Hint {
    pub from: Square,
    pub to: Square,
    pub id: u64,
}

/// Session state owned exclusively by the controller. Derived display state
/// (counts, captured lists) mirrors the rules engine after every mutation.
pub struct Session {
    pub player_color: PieceColor,
    pub state: SessionState,
    /// Full moves played, `ceil(half_moves / 2)`.
    pub move_count: usize,
    pub capture_count: usize,
    /// White pieces now off the board (captured by black), in capture order.
    pub captured_white: Vec<PieceKind>,
    /// Black pieces now off the board (captured by white), in capture order.
    pub captured_black: Vec<PieceKind>,
    /// Search depth passed to the engine.
    pub depth: u32,
    /// Wall-clock duration of the engine's last accepted search.
    pub last_think_time: Option<Duration>,
    pub hint: Option<Hint>,
    think_start: Option<Instant>,
}

impl Session {
    fn new(player_color: PieceColor, depth: u32) -> Self {
        let state = match player_color {
            PieceColor::White => SessionState::AwaitingPlayerMove,
            PieceColor::Black => SessionState::AwaitingEngineMove,
        };
        Self {
            player_color,
            state,
            move_count: 0,
            capture_count: 0,
            captured_white: Vec::new(),
            captured_black: Vec::new(),
            depth,
            last_think_time: None,
            hint: None,
            think_start: None,
        }
    }

    pub fn is_player_turn(&self) -> bool {
        self.state == SessionState::AwaitingPlayerMove
    }
}

/// The display surface the controller mirrors positions onto. The terminal
/// board in the ui layer is the production implementation; tests substitute
/// a recording fake.
pub trait BoardRenderer {
    /// Show the given FEN position.
    fn position(&mut self, fen: &str);
    /// Show the starting position.
    fn start(&mut self);
    /// Orient the board toward the given player.
    fn orientation(&mut self, color: PieceColor);
    /// Re-fit the board to its surface.
    fn resize(&mut self) {}
}

pub struct Controller<R, S> {
    session: Session,
    rules: Rules,
    board: R,
    engine: S,
    events: Sender<Event>,
    timing: Timing,
    /// Bumped on new game and undo; timer events carrying an old value are
    /// stale and ignored.
    generation: u64,
    /// True while a search request awaits its `bestmove`.
    pending_search: bool,
    /// Searches abandoned by new game/undo whose replies must be discarded
    /// on arrival. UCI replies come back in request order, so one counter
    /// is enough to pair discards with abandoned requests.
    stale_replies: u32,
    hint_seq: u64,
}

impl<R: BoardRenderer, S: SearchBackend> Controller<R, S> {
    pub fn new(
        player_color: PieceColor,
        depth: u32,
        board: R,
        engine: S,
        events: Sender<Event>,
        timing: Timing,
    ) -> Self {
        let mut controller = Self {
            session: Session::new(player_color, depth),
            rules: Rules::new(),
            board,
            engine,
            events,
            timing,
            generation: 0,
            pending_search: false,
            stale_replies: 0,
            hint_seq: 0,
        };
        controller.board.start();
        controller.board.orientation(player_color);
        if controller.session.state == SessionState::AwaitingEngineMove {
            controller.schedule(
                controller.timing.new_game_delay,
                Event::BotMoveDue {
                    generation: controller.generation,
                },
            );
        }
        controller
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn board(&self) -> &R {
        &self.board
    }

    pub fn engine(&self) -> &S {
        &self.engine
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::PlayerDrop { from, to } => {
                self.player_drop(from, to);
            }
            Event::Engine(line) => self.on_engine_line(&line),
            Event::BotMoveDue { generation } => self.on_bot_move_due(generation),
            Event::HintExpired { id } => self.on_hint_expired(id),
            Event::Command(cmd) => match cmd {
                Command::NewGame => self.new_game(),
                Command::SetColor(color) => self.set_color(color),
                Command::Undo => self.undo(),
                Command::Hint => self.hint(),
                Command::SetDepth(depth) => self.session.depth = depth,
                Command::Redraw => self.board.resize(),
                Command::Quit => {}
            },
        }
    }

    /// Pre-move gate for piece pickup: the game is running, it is the
    /// player's turn, and the piece belongs to the player.
    pub fn can_lift(&self, square: Square) -> bool {
        if !self.session.is_player_turn() {
            return false;
        }
        self.rules.color_at(square) == Some(self.session.player_color)
    }

    /// Apply a player drop. On `Snapback` the session and board are left
    /// untouched.
    pub fn player_drop(&mut self, from: Square, to: Square) -> DropOutcome {
        if self.session.state != SessionState::AwaitingPlayerMove {
            return DropOutcome::Snapback;
        }
        let Some(result) = self.rules.try_move(MoveRequest::new(from, to)) else {
            return DropOutcome::Snapback;
        };

        self.record_capture(&result);
        self.sync_after_move();

        if self.rules.is_game_over() {
            self.session.state = SessionState::GameOver;
        } else {
            self.session.state = SessionState::AwaitingEngineMove;
            self.schedule(
                self.timing.player_move_delay,
                Event::BotMoveDue {
                    generation: self.generation,
                },
            );
        }
        DropOutcome::Moved
    }

    fn on_bot_move_due(&mut self, generation: u64) {
        if generation != self.generation {
            return;
        }
        if self.session.state != SessionState::AwaitingEngineMove || self.pending_search {
            return;
        }
        self.session.think_start = Some(Instant::now());
        self.pending_search = true;
        self.engine.request(&self.rules.fen(), self.session.depth);
    }

    fn on_engine_line(&mut self, line: &str) {
        let UciOutputKind::BestMove(rest) = UciOutputKind::parse(line) else {
            return;
        };

        if self.stale_replies > 0 {
            self.stale_replies -= 1;
            log::warn!("discarding stale engine reply: {}", line);
            return;
        }
        if !self.pending_search {
            log::warn!("ignoring unsolicited engine reply: {}", line);
            return;
        }
        self.pending_search = false;
        self.session.last_think_time = self.session.think_start.take().map(|t| t.elapsed());

        let Some(best) = BestMove::parse(&rest) else {
            if rest.starts_with("(none)") {
                // The engine has no move; trust the rules flags for why.
                if self.rules.is_game_over() {
                    self.session.state = SessionState::GameOver;
                } else {
                    log::error!("engine reported no move in a live position");
                }
            } else {
                // Malformed reply: log and leave the session recoverable
                // via new game or undo.
                log::error!("unparsable engine reply: {}", line);
            }
            return;
        };
        let req = MoveRequest::with_promotion(
            best.from,
            best.to,
            best.promotion.unwrap_or(Role::Queen),
        );
        let Some(result) = self.rules.try_move(req) else {
            log::error!("engine proposed illegal move: {}", rest);
            return;
        };

        self.record_capture(&result);
        self.sync_after_move();

        self.session.state = if self.rules.is_game_over() {
            SessionState::GameOver
        } else {
            SessionState::AwaitingPlayerMove
        };
    }

    fn new_game(&mut self) {
        self.abandon_pending();
        self.rules.reset();
        self.board.start();
        self.board.orientation(self.session.player_color);
        self.session = Session::new(self.session.player_color, self.session.depth);
        if self.session.state == SessionState::AwaitingEngineMove {
            self.schedule(
                self.timing.new_game_delay,
                Event::BotMoveDue {
                    generation: self.generation,
                },
            );
        }
    }

    /// A color change always starts a fresh game.
    fn set_color(&mut self, color: PieceColor) {
        self.session.player_color = color;
        self.new_game();
    }

    /// Take back the engine's reply and the player's preceding move. No-op
    /// before the first full move pair and once the game is over.
    fn undo(&mut self) {
        if self.session.state == SessionState::GameOver {
            return;
        }
        if self.session.move_count == 0 {
            return;
        }
        self.abandon_pending();

        // Engine's half-move first, then the player's.
        for _ in 0..2 {
            if let Some(result) = self.rules.undo() {
                self.revert_capture(&result);
            }
        }

        self.session.hint = None;
        self.sync_after_move();
        self.session.state = SessionState::AwaitingPlayerMove;
    }

    /// Suggest a uniformly random legal move; it expires after the hint TTL.
    fn hint(&mut self) {
        if self.session.state != SessionState::AwaitingPlayerMove {
            return;
        }
        let moves = self.rules.legal_moves();
        let Some(pick) = moves.choose(&mut rand::thread_rng()) else {
            return;
        };
        self.hint_seq += 1;
        let hint = Hint {
            from: pick.from,
            to: pick.to,
            id: self.hint_seq,
        };
        self.session.hint = Some(hint);
        self.schedule(self.timing.hint_ttl, Event::HintExpired { id: hint.id });
    }

    fn on_hint_expired(&mut self, id: u64) {
        if self.session.hint.map(|h| h.id) == Some(id) {
            self.session.hint = None;
        }
    }

    /// Invalidate scheduled timers and mark any in-flight search as stale.
    fn abandon_pending(&mut self) {
        self.generation += 1;
        if self.pending_search {
            self.pending_search = false;
            self.stale_replies += 1;
        }
        self.session.think_start = None;
    }

    fn record_capture(&mut self, result: &MoveResult) {
        let Some(kind) = result.captured else {
            return;
        };
        self.session.capture_count += 1;
        // Lists are indexed by which side's pieces are now off the board:
        // a white-made capture removes a black piece.
        match result.color {
            PieceColor::White => self.session.captured_black.push(kind),
            PieceColor::Black => self.session.captured_white.push(kind),
        }
    }

    fn revert_capture(&mut self, result: &MoveResult) {
        let Some(kind) = result.captured else {
            return;
        };
        self.session.capture_count -= 1;
        let list = match result.color {
            PieceColor::White => &mut self.session.captured_black,
            PieceColor::Black => &mut self.session.captured_white,
        };
        // Remove the most recent occurrence of this piece kind, not the last
        // list element: duplicates of the same kind are indistinguishable.
        if let Some(idx) = list.iter().rposition(|&k| k == kind) {
            list.remove(idx);
        }
    }

    /// Recompute derived state from the rules engine's authoritative history
    /// and push the new position to the renderer.
    fn sync_after_move(&mut self) {
        self.session.move_count = self.rules.history_len().div_ceil(2);
        self.board.position(&self.rules.fen());
    }

    fn schedule(&self, delay: Duration, event: Event) {
        let tx = self.events.clone();
        if delay.is_zero() {
            let _ = tx.send(event);
            return;
        }
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(event);
        });
    }
}
