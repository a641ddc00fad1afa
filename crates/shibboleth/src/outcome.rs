//! Typed outcomes returned to the command dispatcher.
//!
//! The engine never formats user-facing text; it hands the chat layer
//! structured results and lets it do the wording.

use std::time::Duration;

use shibboleth_core::{ChannelId, PlayerId};
use shibboleth_game::{Phase, TeamGuess};
use shibboleth_room::{QueueDrain, RoomSettings};

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Added to the roster immediately.
    Joined,
    /// A round is running; the player joins when it ends.
    Queued,
    /// Already on the roster.
    AlreadyPlaying,
    /// The player was queued to leave; that request is withdrawn.
    LeaveCancelled,
}

/// Result of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Removed from the roster immediately.
    Left,
    /// A round is running; the player leaves when it ends.
    Queued,
    /// The player was queued to join; that request is withdrawn.
    JoinCancelled,
    /// The player was not on the roster to begin with.
    NotPlaying,
}

/// Everything the chat layer needs to announce a new round. Secret
/// words are deliberately absent; fetch them per player with
/// [`Engine::secret_word`](crate::Engine::secret_word).
#[derive(Debug, Clone)]
pub struct RoundStart {
    pub round: u64,
    pub players: Vec<PlayerId>,
    pub word_pool: Vec<String>,
    pub possible_team_sizes: Vec<usize>,
    pub team_guess_size: Option<usize>,
    /// `None` when the veto phase is disabled.
    pub veto_duration: Option<Duration>,
}

/// One team, revealed at round end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSummary {
    pub word: String,
    pub players: Vec<PlayerId>,
}

/// A finished round: who resolved it, how, and what changed.
#[derive(Debug, Clone)]
pub struct RoundResolution {
    /// The number of the round that just ended.
    pub round: u64,
    pub guesser: PlayerId,
    pub correct: bool,
    pub winning_word: String,
    /// Both teams, winners first.
    pub teams: [TeamSummary; 2],
    /// `true` when the veto window elapsed and the held guess resolved.
    pub via_timeout: bool,
    /// Roster changes applied after the round ended.
    pub drained: QueueDrain,
}

/// The held team guess a word guess overrode, with the correctness it
/// would have had. Informational only.
#[derive(Debug, Clone)]
pub struct VetoPostMortem {
    pub guesser: PlayerId,
    pub team: Vec<PlayerId>,
    pub would_have_been_correct: bool,
}

/// Result of a word guess. Word guesses always end the round.
#[derive(Debug, Clone)]
pub struct WordGuessOutcome {
    pub resolution: RoundResolution,
    /// Set when the guess landed during a veto phase.
    pub overridden_veto: Option<VetoPostMortem>,
}

/// Result of a team guess.
#[derive(Debug, Clone)]
pub enum TeamGuessOutcome {
    /// Veto disabled: the guess resolved the round immediately.
    Resolved(RoundResolution),
    /// The guess is held; a veto timer is now running.
    VetoStarted {
        duration: Duration,
        correct_so_far: bool,
    },
}

/// Events originating from veto timers rather than a command.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// The veto window is about to close.
    VetoWarning {
        channel: ChannelId,
        round: u64,
        remaining: Duration,
    },
    /// The veto window elapsed and the held team guess resolved.
    RoundResolved {
        channel: ChannelId,
        resolution: RoundResolution,
    },
}

/// A point-in-time snapshot of a room, for status commands.
#[derive(Debug, Clone)]
pub struct RoomStatus {
    pub channel: ChannelId,
    pub round: u64,
    pub roster: Vec<PlayerId>,
    pub queued_joiners: Vec<PlayerId>,
    pub queued_leavers: Vec<PlayerId>,
    pub in_round: bool,
    pub paused: bool,
    pub settings: RoomSettings,
    /// `None` when no round is active.
    pub phase: Option<Phase>,
    /// The held team guess, while a veto phase is pending.
    pub pending_veto: Option<TeamGuess>,
}
