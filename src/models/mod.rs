pub mod engine;
pub mod rules;
pub mod session;

pub use engine::{SearchBackend, UciEngine};
pub use rules::Rules;
pub use session::{BoardRenderer, Command, Controller, DropOutcome, Event, SessionState, Timing};
