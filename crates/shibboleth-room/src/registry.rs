//! The process-wide channel → room map.
//!
//! Rooms are created lazily on first reference. Construction runs inside
//! the registry's map lock, so two concurrent first references to the
//! same channel still produce exactly one room. Per-room serialization
//! is a `tokio::sync::Mutex` around each room: guess handlers and the
//! veto timer both lock it, which is what makes their race safe.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use shibboleth_core::{ChannelId, PlayerId};

use crate::{Room, RoomError, RoomSettings};

/// A shared handle to one room. Clones are cheap.
pub type SharedRoom = Arc<tokio::sync::Mutex<Room>>;

/// Supplies a channel's current occupancy when its room is first
/// created. This is a one-time seed, not re-validated afterwards —
/// later roster changes go through explicit player actions.
///
/// The chat layer decides what "occupancy" means (for the original bot,
/// members of the channel holding its playing role).
pub trait RosterSource: Send + Sync {
    fn current_players(&self, channel: ChannelId) -> Vec<PlayerId>;
}

impl<F> RosterSource for F
where
    F: Fn(ChannelId) -> Vec<PlayerId> + Send + Sync,
{
    fn current_players(&self, channel: ChannelId) -> Vec<PlayerId> {
        self(channel)
    }
}

/// All rooms in the process, keyed by channel.
///
/// Explicitly constructed and passed by handle to command handlers —
/// deliberately not a global.
pub struct RoomRegistry {
    rooms: Mutex<HashMap<ChannelId, SharedRoom>>,
    defaults: RoomSettings,
}

impl RoomRegistry {
    pub fn new(defaults: RoomSettings) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            defaults,
        }
    }

    /// Returns the channel's room, creating it (seeded from `source`) if
    /// absent. Safe to call concurrently for the same channel: the map
    /// lock is the creation critical section.
    pub fn get_or_create(&self, channel: ChannelId, source: &dyn RosterSource) -> SharedRoom {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(rooms.entry(channel).or_insert_with(|| {
            let roster = source.current_players(channel);
            Arc::new(tokio::sync::Mutex::new(Room::new(
                channel,
                roster,
                self.defaults.clone(),
            )))
        }))
    }

    /// Returns the channel's room if it exists.
    pub fn get(&self, channel: ChannelId) -> Result<SharedRoom, RoomError> {
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms
            .get(&channel)
            .cloned()
            .ok_or(RoomError::ChannelNotFound(channel))
    }

    /// Drops the channel's room. Idempotent.
    pub fn remove(&self, channel: ChannelId) {
        let mut rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        if rooms.remove(&channel).is_some() {
            tracing::info!(%channel, "room removed");
        }
    }

    pub fn len(&self) -> usize {
        self.rooms.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn channels(&self) -> Vec<ChannelId> {
        let rooms = self.rooms.lock().unwrap_or_else(|e| e.into_inner());
        rooms.keys().copied().collect()
    }
}
