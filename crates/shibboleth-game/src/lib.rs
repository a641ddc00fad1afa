//! The Shibboleth round engine.
//!
//! One [`Shibboleth`] value is one round: two secret words, two hidden
//! teams, and a small state machine that resolves word guesses, team
//! guesses, and the veto phase. It owns no I/O and no clock — randomness
//! is injected at construction and veto timing lives in a higher layer.
//!
//! # Key types
//!
//! - [`Shibboleth`] — the round state machine
//! - [`GameSetup`] — construction parameters
//! - [`Phase`] — main / veto / over
//! - [`InitError`], [`ActionError`] — construction vs. in-round failures

mod error;
mod game;
mod setup;

pub use error::{ActionError, InitError};
pub use game::{Phase, Shibboleth, TeamGuess};
pub use setup::GameSetup;
