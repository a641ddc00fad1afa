//! Engine orchestration: rooms, guesses, and veto timers, glued
//! together behind one handle.
//!
//! Every command-path method locks the target room's mutex for its whole
//! critical section, and so does the veto expiry task. That lock is the
//! race resolution between "word guess lands" and "veto window elapses":
//! whichever acquires the room first wins, and the loser either finds
//! the round already gone (timer path no-ops on a stale round number) or
//! finds no more pending guess.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use shibboleth_core::{ChannelId, PlayerId, WordList};
use shibboleth_room::{
    QueueDrain, Room, RoomError, RoomRegistry, RoomSettings, RosterSource, SharedRoom,
};
use shibboleth_veto::{VetoClock, VetoConfig, VetoEvent, VetoTimers};

use crate::outcome::{
    EngineEvent, JoinOutcome, LeaveOutcome, RoomStatus, RoundResolution, RoundStart,
    TeamGuessOutcome, TeamSummary, VetoPostMortem, WordGuessOutcome,
};

/// The game engine. One per process; clones share state.
///
/// Commands go in through the methods here; timer-driven outcomes (veto
/// warnings, timeout resolutions) come out through the receiver returned
/// by [`Engine::new`].
#[derive(Clone)]
pub struct Engine {
    inner: Arc<Inner>,
}

struct Inner {
    registry: RoomRegistry,
    timers: VetoTimers,
    word_list: WordList,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl Engine {
    /// Creates an engine over `word_list` with per-room defaults, plus
    /// the receiver for timer-driven events. Dropping the receiver is
    /// fine; events are then discarded.
    pub fn new(
        word_list: WordList,
        defaults: RoomSettings,
    ) -> (Self, mpsc::UnboundedReceiver<EngineEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let engine = Self {
            inner: Arc::new(Inner {
                registry: RoomRegistry::new(defaults),
                timers: VetoTimers::new(),
                word_list,
                events,
            }),
        };
        (engine, rx)
    }

    // -- room lifecycle ---------------------------------------------------

    /// Returns the channel's room, creating it (seeded from `source`) on
    /// first reference.
    pub fn ensure_room(&self, channel: ChannelId, source: &dyn RosterSource) -> SharedRoom {
        self.inner.registry.get_or_create(channel, source)
    }

    /// Drops the channel's room and cancels any outstanding veto timer.
    /// Idempotent.
    pub fn remove_room(&self, channel: ChannelId) {
        self.inner.timers.cancel(channel);
        self.inner.registry.remove(channel);
    }

    // -- membership -------------------------------------------------------

    /// Adds `player` to the channel's roster, or queues them if a round
    /// is running.
    pub async fn join(
        &self,
        channel: ChannelId,
        player: PlayerId,
    ) -> Result<JoinOutcome, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;
        if room.in_round() {
            if room.unqueue_leave(player) {
                return Ok(JoinOutcome::LeaveCancelled);
            }
            if room.is_participant(player) {
                return Ok(JoinOutcome::AlreadyPlaying);
            }
            room.queue_join(player);
            return Ok(JoinOutcome::Queued);
        }
        if room.add_player(player)? {
            Ok(JoinOutcome::Joined)
        } else {
            Ok(JoinOutcome::AlreadyPlaying)
        }
    }

    /// Removes `player` from the channel's roster, or queues the leave
    /// if a round is running.
    pub async fn leave(
        &self,
        channel: ChannelId,
        player: PlayerId,
    ) -> Result<LeaveOutcome, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;
        if room.in_round() {
            if room.unqueue_join(player) {
                return Ok(LeaveOutcome::JoinCancelled);
            }
            if !room.is_participant(player) {
                return Ok(LeaveOutcome::NotPlaying);
            }
            room.queue_leave(player)?;
            return Ok(LeaveOutcome::Queued);
        }
        if room.remove_player(player)? {
            Ok(LeaveOutcome::Left)
        } else {
            Ok(LeaveOutcome::NotPlaying)
        }
    }

    // -- round lifecycle --------------------------------------------------

    /// Starts a round in the channel from its current roster and
    /// settings.
    pub async fn start_round(&self, channel: ChannelId) -> Result<RoundStart, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;
        {
            let mut rng = rand::rng();
            room.start_round(&self.inner.word_list, &mut rng)?;
        }
        let game = room.game().ok_or(RoomError::NoRound)?;
        Ok(RoundStart {
            round: room.round_num(),
            players: game.players().to_vec(),
            word_pool: game.word_pool().to_vec(),
            possible_team_sizes: game.possible_team_sizes(),
            team_guess_size: game.team_guess_size(),
            veto_duration: game
                .include_veto_phase()
                .then(|| room.settings().veto_duration),
        })
    }

    /// Ends the current round without a resolution and applies the
    /// queued roster changes.
    pub async fn abandon_round(&self, channel: ChannelId) -> Result<QueueDrain, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;
        room.end_round()?;
        let drained = room.drain_queues()?;
        self.inner.timers.cancel(channel);
        Ok(drained)
    }

    pub async fn pause(&self, channel: ChannelId) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.pause()
    }

    pub async fn unpause(&self, channel: ChannelId) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.unpause()
    }

    // -- guesses ----------------------------------------------------------

    /// The secret word dealt to `player` this round. For whispering, so
    /// readable while paused.
    pub async fn secret_word(
        &self,
        channel: ChannelId,
        player: PlayerId,
    ) -> Result<String, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let room = room.lock().await;
        let game = room.game().ok_or(RoomError::NoRound)?;
        Ok(game.secret_word(player)?.to_owned())
    }

    /// Resolves a word guess. Always ends the round, including during a
    /// veto phase; a pending team guess is then reported back as an
    /// overridden post-mortem.
    pub async fn guess_word(
        &self,
        channel: ChannelId,
        player: PlayerId,
        word: &str,
    ) -> Result<WordGuessOutcome, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;

        let overridden_veto = room
            .game()
            .filter(|game| game.in_veto_phase())
            .and_then(|game| {
                let pending = game.vetoable_team_guess()?;
                Some(VetoPostMortem {
                    guesser: pending.guesser,
                    team: pending.team.clone(),
                    would_have_been_correct: game
                        .check_team_guess(pending.guesser, &pending.team)
                        .unwrap_or(false),
                })
            });

        let correct = room.resolve_word_guess(player, word)?;
        let resolution = conclude(&mut room, player, correct, false)?;
        self.inner.timers.cancel(channel);
        Ok(WordGuessOutcome {
            resolution,
            overridden_veto,
        })
    }

    /// Resolves a team guess. With the veto phase enabled this holds the
    /// guess and starts the window's timer instead of ending the round.
    pub async fn guess_team(
        &self,
        channel: ChannelId,
        player: PlayerId,
        team: &[PlayerId],
    ) -> Result<TeamGuessOutcome, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let mut room = room.lock().await;
        let round = room.round_num();

        let correct = room.resolve_team_guess(player, team, false)?;

        if room.game().is_some_and(|game| game.in_veto_phase()) {
            let duration = room.settings().veto_duration;
            self.spawn_veto_timer(channel, round, duration);
            return Ok(TeamGuessOutcome::VetoStarted {
                duration,
                correct_so_far: correct,
            });
        }

        let resolution = conclude(&mut room, player, correct, false)?;
        Ok(TeamGuessOutcome::Resolved(resolution))
    }

    // -- settings ---------------------------------------------------------

    pub async fn set_num_words(&self, channel: ChannelId, num: usize) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.settings_mut().set_num_words(num)
    }

    pub async fn set_max_guess_size(
        &self,
        channel: ChannelId,
        size: usize,
    ) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.settings_mut().set_max_guess_size(size)
    }

    pub async fn set_veto_duration(
        &self,
        channel: ChannelId,
        duration: Duration,
    ) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.settings_mut().set_veto_duration(duration)
    }

    pub async fn set_skew_chance(&self, channel: ChannelId, chance: f64) -> Result<(), RoomError> {
        let room = self.inner.registry.get(channel)?;
        room.lock().await.settings_mut().set_skew_chance(chance)
    }

    // -- inspection -------------------------------------------------------

    /// A point-in-time snapshot of the channel's room.
    pub async fn status(&self, channel: ChannelId) -> Result<RoomStatus, RoomError> {
        let room = self.inner.registry.get(channel)?;
        let room = room.lock().await;
        Ok(RoomStatus {
            channel,
            round: room.round_num(),
            roster: room.roster().to_vec(),
            queued_joiners: room.queued_joiners().to_vec(),
            queued_leavers: room.queued_leavers().to_vec(),
            in_round: room.in_round(),
            paused: room.paused(),
            settings: room.settings().clone(),
            phase: room.game().map(|game| game.phase()),
            pending_veto: room
                .game()
                .filter(|game| game.in_veto_phase())
                .and_then(|game| game.vetoable_team_guess())
                .cloned(),
        })
    }

    // -- veto timing ------------------------------------------------------

    fn spawn_veto_timer(&self, channel: ChannelId, round: u64, duration: Duration) {
        let inner = Arc::clone(&self.inner);
        self.inner.timers.spawn(channel, round, async move {
            let mut clock = VetoClock::start(VetoConfig::new(duration));
            while let Some(event) = clock.next_event().await {
                match event {
                    VetoEvent::Warning { remaining } => {
                        inner.veto_warning(channel, round, remaining).await;
                    }
                    VetoEvent::Expired => {
                        inner.veto_expired(channel, round).await;
                    }
                }
            }
            inner.timers.finish(channel, round);
        });
    }
}

impl Inner {
    async fn veto_warning(&self, channel: ChannelId, round: u64, remaining: Duration) {
        let Ok(room) = self.registry.get(channel) else {
            return;
        };
        let room = room.lock().await;
        if room.round_num() != round || !room.in_round() || room.paused() {
            return;
        }
        let _ = self.events.send(EngineEvent::VetoWarning {
            channel,
            round,
            remaining,
        });
    }

    /// The timer's half of the veto race. Locks the room and re-checks
    /// the round number: a word guess that already ended the round makes
    /// this a no-op.
    async fn veto_expired(&self, channel: ChannelId, round: u64) {
        let Ok(room) = self.registry.get(channel) else {
            return;
        };
        let mut room = room.lock().await;
        if room.round_num() != round || !room.in_round() {
            debug!(%channel, round, "stale veto expiry, ignoring");
            return;
        }
        let Some(pending) = room
            .game()
            .and_then(|game| game.vetoable_team_guess())
            .cloned()
        else {
            debug!(%channel, round, "veto expiry with no pending guess, ignoring");
            return;
        };
        match room.resolve_veto_timeout() {
            Ok(correct) => match conclude(&mut room, pending.guesser, correct, true) {
                Ok(resolution) => {
                    let _ = self
                        .events
                        .send(EngineEvent::RoundResolved { channel, resolution });
                }
                Err(error) => {
                    warn!(%channel, round, %error, "veto expiry could not conclude round");
                }
            },
            // A paused room swallows the expiry; the round stays pending.
            Err(error) => debug!(%channel, round, %error, "veto expiry did not resolve"),
        }
    }
}

/// Packages a terminally resolved round and tears it down: summary
/// first, then `end_round` and the queue drain.
fn conclude(
    room: &mut Room,
    guesser: PlayerId,
    correct: bool,
    via_timeout: bool,
) -> Result<RoundResolution, RoomError> {
    let round = room.round_num();
    let game = room.game().ok_or(RoomError::NoRound)?;
    let winning_word = game.winning_word().unwrap_or_default().to_owned();
    let [first, second] = game.teams();
    let mut teams = [
        TeamSummary {
            word: first.0,
            players: first.1,
        },
        TeamSummary {
            word: second.0,
            players: second.1,
        },
    ];
    if teams[1].word == winning_word {
        teams.swap(0, 1);
    }
    room.end_round()?;
    let drained = room.drain_queues()?;
    Ok(RoundResolution {
        round,
        guesser,
        correct,
        winning_word,
        teams,
        via_timeout,
        drained,
    })
}
