//! Veto-phase timing for the Shibboleth engine.
//!
//! When a team guess enters the veto phase, the round must resolve
//! automatically once the window elapses — unless a word guess lands
//! first. This crate owns the two timing pieces and nothing else:
//!
//! - [`VetoClock`] — a countdown yielding an optional warning event and
//!   then the expiry event, driven by `tokio::time`.
//! - [`VetoTimers`] — the per-channel registry of the one outstanding
//!   veto task, keyed by round number so stale timers can be detected.
//!
//! The clock never touches game state. The orchestrating layer spawns a
//! task per veto window, and that task re-validates the round number
//! before resolving anything — a timer that outlives its round no-ops.
//!
//! # Integration
//!
//! ```ignore
//! timers.spawn(channel, round, async move {
//!     let mut clock = VetoClock::start(config);
//!     while let Some(event) = clock.next_event().await {
//!         match event {
//!             VetoEvent::Warning { remaining } => { /* nudge players */ }
//!             VetoEvent::Expired => { /* resolve if round unchanged */ }
//!         }
//!     }
//! });
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::AbortHandle;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

use shibboleth_core::ChannelId;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Timing for one veto window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VetoConfig {
    /// Total length of the window.
    pub duration: Duration,

    /// How long before expiry the warning fires. Zero disables the
    /// warning.
    pub warning_before: Duration,
}

impl VetoConfig {
    /// Default lead time for the warning event.
    pub const DEFAULT_WARNING: Duration = Duration::from_secs(10);

    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            warning_before: Self::DEFAULT_WARNING,
        }
    }

    /// Fixes out-of-range values so the config is safe to use: a warning
    /// lead longer than the window itself is clamped to the window.
    pub fn validated(mut self) -> Self {
        if self.warning_before > self.duration {
            warn!(
                warning = ?self.warning_before,
                duration = ?self.duration,
                "veto warning lead exceeds window, clamping"
            );
            self.warning_before = self.duration;
        }
        self
    }
}

impl Default for VetoConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(45))
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// An event from a running veto window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VetoEvent {
    /// The window is about to close.
    Warning { remaining: Duration },
    /// The window elapsed; the pending team guess should resolve.
    Expired,
}

/// A countdown over one veto window.
///
/// The deadline is fixed at creation; [`VetoClock::next_event`] yields
/// at most one `Warning` (when the window is long enough to warrant
/// one), then `Expired`, then `None` forever.
#[derive(Debug)]
pub struct VetoClock {
    deadline: Instant,
    warning_at: Option<Instant>,
    warning_lead: Duration,
    expired: bool,
}

impl VetoClock {
    /// Starts the countdown now.
    pub fn start(config: VetoConfig) -> Self {
        let config = config.validated();
        let deadline = Instant::now() + config.duration;
        // A warning only makes sense strictly inside the window.
        let warning_at = (!config.warning_before.is_zero()
            && config.duration > config.warning_before)
            .then(|| deadline - config.warning_before);
        Self {
            deadline,
            warning_at,
            warning_lead: config.warning_before,
            expired: false,
        }
    }

    /// Waits for and returns the next event, or `None` once expired.
    pub async fn next_event(&mut self) -> Option<VetoEvent> {
        if self.expired {
            return None;
        }
        if let Some(at) = self.warning_at.take() {
            time::sleep_until(at).await;
            return Some(VetoEvent::Warning {
                remaining: self.warning_lead,
            });
        }
        time::sleep_until(self.deadline).await;
        self.expired = true;
        Some(VetoEvent::Expired)
    }

    /// Time left in the window, zero once past the deadline.
    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }
}

// ---------------------------------------------------------------------------
// Per-channel timer registry
// ---------------------------------------------------------------------------

struct TimerEntry {
    round: u64,
    handle: AbortHandle,
}

/// Tracks the one outstanding veto task per channel.
///
/// Spawning for a channel aborts whatever task was previously scheduled
/// there — a room can only ever have one live veto window. Explicit
/// [`VetoTimers::cancel`] on round end is the primary cancellation
/// mechanism; the spawned task's own round-number re-check is the
/// backstop for a timer that fires anyway.
#[derive(Default)]
pub struct VetoTimers {
    tasks: Mutex<HashMap<ChannelId, TimerEntry>>,
}

impl VetoTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `task` as this channel's veto timer for `round`, aborting
    /// any previous timer for the channel.
    pub fn spawn<F>(&self, channel: ChannelId, round: u64, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task).abort_handle();
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = tasks.insert(channel, TimerEntry { round, handle }) {
            previous.handle.abort();
            debug!(%channel, round = previous.round, "replaced outstanding veto timer");
        }
    }

    /// Aborts and forgets the channel's timer, if any. Returns whether a
    /// timer was cancelled.
    pub fn cancel(&self, channel: ChannelId) -> bool {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        match tasks.remove(&channel) {
            Some(entry) => {
                entry.handle.abort();
                debug!(%channel, round = entry.round, "veto timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Forgets the channel's entry if it belongs to `round`. Called by a
    /// timer task when it completes on its own.
    pub fn finish(&self, channel: ChannelId, round: u64) {
        let mut tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        if tasks.get(&channel).is_some_and(|e| e.round == round) {
            tasks.remove(&channel);
        }
    }

    /// The round number of the channel's scheduled timer, if one exists.
    pub fn scheduled_round(&self, channel: ChannelId) -> Option<u64> {
        let tasks = self.tasks.lock().unwrap_or_else(|e| e.into_inner());
        tasks.get(&channel).map(|e| e.round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validated_clamps_warning_to_window() {
        let config = VetoConfig {
            duration: Duration::from_secs(5),
            warning_before: Duration::from_secs(10),
        }
        .validated();
        assert_eq!(config.warning_before, Duration::from_secs(5));
    }

    #[test]
    fn test_default_config() {
        let config = VetoConfig::default();
        assert_eq!(config.duration, Duration::from_secs(45));
        assert_eq!(config.warning_before, VetoConfig::DEFAULT_WARNING);
    }
}
