//! Room lifecycle management for the Shibboleth engine.
//!
//! One [`Room`] exists per chat channel. It owns the roster, the
//! join/leave queues, the per-channel settings, and at most one active
//! round. The [`RoomRegistry`] is the process-wide map from channel to
//! room, created lazily on first reference.
//!
//! # Key types
//!
//! - [`Room`] — roster, queues, settings, active round
//! - [`RoomSettings`] — per-channel configuration
//! - [`RoomRegistry`] — channel → room map, concurrent-creation safe
//! - [`RosterSource`] — one-time occupancy seed at room creation
//! - [`RoomError`] — room-level lifecycle errors

mod error;
mod registry;
mod room;
mod settings;

pub use error::RoomError;
pub use registry::{RoomRegistry, RosterSource, SharedRoom};
pub use room::{QueueDrain, Room};
pub use settings::RoomSettings;
