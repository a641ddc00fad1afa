//! Error types for the room layer.

use shibboleth_core::{ChannelId, PlayerId};
use shibboleth_game::{ActionError, InitError};

/// Errors from room-level operations.
///
/// Room lifecycle violations are always recoverable — the room stays
/// valid and the caller may retry. Game-level failures bubble up
/// transparently so the chat layer sees the specific violated rule.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room exists for this channel.
    #[error("channel {0} has no room")]
    ChannelNotFound(ChannelId),

    /// A round is already active; at most one per room.
    #[error("round already started")]
    RoundActive,

    /// The operation needs an active round.
    #[error("no round ongoing")]
    NoRound,

    /// The roster is frozen while a round is active; use the queues.
    #[error("cannot change roster while a round is ongoing")]
    RosterFrozen,

    /// Only current round participants can queue to leave.
    #[error("player {0} is not a participant of the active round")]
    NotAParticipant(PlayerId),

    /// The room is already paused.
    #[error("already paused")]
    AlreadyPaused,

    /// The room is not paused.
    #[error("already unpaused")]
    NotPaused,

    /// Guessing is blocked while the room is paused.
    #[error("cannot guess while paused")]
    Paused,

    /// A settings value was out of range.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// The round could not be constructed from the roster and settings.
    #[error(transparent)]
    Init(#[from] InitError),

    /// An in-round rule was violated.
    #[error(transparent)]
    Action(#[from] ActionError),
}
