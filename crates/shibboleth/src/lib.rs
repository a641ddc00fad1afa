//! # Shibboleth
//!
//! Backend engine for the Shibboleth social party game, designed to sit
//! behind a chat bot. Players join a per-channel room, a round deals two
//! secret words across two hidden teams, and the round resolves through
//! word guesses, team guesses, and an optional timed veto phase.
//!
//! The [`Engine`] is the single entry point for a command dispatcher:
//! it owns the room registry, the shared word list, and the veto timers,
//! and returns typed outcomes that the chat layer renders however it
//! likes. Timer-driven outcomes (veto warnings and expiries) arrive on
//! the event receiver returned by [`Engine::new`].
//!
//! ```rust,no_run
//! use shibboleth::{Engine, RoomSettings, WordList};
//!
//! # async fn run() {
//! let words = WordList::from_lines("apple\nbridge\ncastle\ndragon\n");
//! let (engine, mut events) = Engine::new(words, RoomSettings::default());
//! // Wire `engine` into command handlers and drain `events` in a task.
//! # }
//! ```

mod engine;
mod outcome;
mod telemetry;

pub use engine::Engine;
pub use outcome::{
    EngineEvent, JoinOutcome, LeaveOutcome, RoomStatus, RoundResolution, RoundStart,
    TeamGuessOutcome, TeamSummary, VetoPostMortem, WordGuessOutcome,
};
pub use telemetry::init_tracing;

pub use shibboleth_core::{ChannelId, PlayerId, WordList};
pub use shibboleth_game::{ActionError, GameSetup, InitError, Phase, Shibboleth, TeamGuess};
pub use shibboleth_room::{
    QueueDrain, Room, RoomError, RoomRegistry, RoomSettings, RosterSource, SharedRoom,
};
pub use shibboleth_veto::{VetoClock, VetoConfig, VetoEvent, VetoTimers};
