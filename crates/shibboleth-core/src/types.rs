//! Identity newtypes.
//!
//! Players and channels come from an external chat platform; the engine
//! only ever compares, hashes, and logs them. Wrapping the raw `u64` in a
//! named struct keeps a `ChannelId` from being passed where a [`PlayerId`]
//! is expected.

use serde::{Deserialize, Serialize};

use std::fmt;

/// A unique identifier for a player.
///
/// The engine treats this as opaque: display names and mentions are the
/// chat layer's concern. `#[serde(transparent)]` keeps the serialized
/// form as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for a chat channel.
///
/// One room exists per channel; the registry is keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}
