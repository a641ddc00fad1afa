//! A per-channel room: roster, queues, settings, and the active round.
//!
//! The roster freezes while a round runs; join and leave requests made
//! mid-round land in queues that the orchestrating layer drains right
//! after the round ends. Queue draining is deliberately a separate call
//! from [`Room::end_round`] so round teardown never re-enters roster
//! mutation.

use rand::Rng;

use shibboleth_core::{ChannelId, PlayerId, WordList};
use shibboleth_game::{GameSetup, Shibboleth};

use crate::{RoomError, RoomSettings};

/// The roster changes applied by [`Room::drain_queues`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueDrain {
    pub joined: Vec<PlayerId>,
    pub left: Vec<PlayerId>,
}

impl QueueDrain {
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }
}

/// One room per chat channel. Owns at most one active [`Shibboleth`]
/// round; `game.is_some()` is the single "in round" source of truth.
#[derive(Debug)]
pub struct Room {
    channel: ChannelId,
    roster: Vec<PlayerId>,
    queued_joiners: Vec<PlayerId>,
    queued_leavers: Vec<PlayerId>,
    round_num: u64,
    settings: RoomSettings,
    game: Option<Shibboleth>,
    paused: bool,
}

impl Room {
    /// Creates a room seeded with the channel's current occupancy.
    /// Duplicates in the seed are dropped, order preserved.
    pub fn new(channel: ChannelId, initial_roster: Vec<PlayerId>, settings: RoomSettings) -> Self {
        let mut roster = Vec::with_capacity(initial_roster.len());
        for player in initial_roster {
            if !roster.contains(&player) {
                roster.push(player);
            }
        }
        tracing::info!(%channel, players = roster.len(), "room created");
        Self {
            channel,
            roster,
            queued_joiners: Vec::new(),
            queued_leavers: Vec::new(),
            round_num: 1,
            settings,
            game: None,
            paused: false,
        }
    }

    // -- accessors --------------------------------------------------------

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn queued_joiners(&self) -> &[PlayerId] {
        &self.queued_joiners
    }

    pub fn queued_leavers(&self) -> &[PlayerId] {
        &self.queued_leavers
    }

    pub fn round_num(&self) -> u64 {
        self.round_num
    }

    pub fn in_round(&self) -> bool {
        self.game.is_some()
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn game(&self) -> Option<&Shibboleth> {
        self.game.as_ref()
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RoomSettings {
        &mut self.settings
    }

    /// `true` if the player is a participant of the active round.
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.game
            .as_ref()
            .is_some_and(|g| g.players().contains(&player))
    }

    // -- roster -----------------------------------------------------------

    /// Adds a player to the roster. Fails while a round is active; no-op
    /// (returning `false`) if already present. Joining clears any stale
    /// joiner-queue entry.
    pub fn add_player(&mut self, player: PlayerId) -> Result<bool, RoomError> {
        if self.in_round() {
            return Err(RoomError::RosterFrozen);
        }
        if self.roster.contains(&player) {
            return Ok(false);
        }
        self.roster.push(player);
        self.unqueue_join(player);
        tracing::debug!(channel = %self.channel, %player, "player joined roster");
        Ok(true)
    }

    /// Removes a player from the roster. Fails while a round is active;
    /// no-op (returning `false`) if absent.
    pub fn remove_player(&mut self, player: PlayerId) -> Result<bool, RoomError> {
        if self.in_round() {
            return Err(RoomError::RosterFrozen);
        }
        let Some(pos) = self.roster.iter().position(|p| *p == player) else {
            return Ok(false);
        };
        self.roster.remove(pos);
        self.unqueue_leave(player);
        tracing::debug!(channel = %self.channel, %player, "player left roster");
        Ok(true)
    }

    pub fn remove_all_players(&mut self) -> Result<(), RoomError> {
        if self.in_round() {
            return Err(RoomError::RosterFrozen);
        }
        self.roster.clear();
        Ok(())
    }

    // -- queues -----------------------------------------------------------

    /// Queues a player to join after the current round. No-op if already
    /// queued or already on the roster.
    pub fn queue_join(&mut self, player: PlayerId) {
        if !self.queued_joiners.contains(&player) && !self.roster.contains(&player) {
            self.queued_joiners.push(player);
        }
    }

    pub fn unqueue_join(&mut self, player: PlayerId) -> bool {
        let Some(pos) = self.queued_joiners.iter().position(|p| *p == player) else {
            return false;
        };
        self.queued_joiners.remove(pos);
        true
    }

    /// Queues a round participant to leave after the current round.
    pub fn queue_leave(&mut self, player: PlayerId) -> Result<(), RoomError> {
        if !self.is_participant(player) {
            return Err(RoomError::NotAParticipant(player));
        }
        if !self.queued_leavers.contains(&player) {
            self.queued_leavers.push(player);
        }
        Ok(())
    }

    pub fn unqueue_leave(&mut self, player: PlayerId) -> bool {
        let Some(pos) = self.queued_leavers.iter().position(|p| *p == player) else {
            return false;
        };
        self.queued_leavers.remove(pos);
        true
    }

    /// Applies the queued joins and leaves to the roster. Must run
    /// between rounds.
    pub fn drain_queues(&mut self) -> Result<QueueDrain, RoomError> {
        if self.in_round() {
            return Err(RoomError::RosterFrozen);
        }
        let mut drain = QueueDrain::default();
        for player in std::mem::take(&mut self.queued_joiners) {
            if !self.roster.contains(&player) {
                self.roster.push(player);
                drain.joined.push(player);
            }
        }
        for player in std::mem::take(&mut self.queued_leavers) {
            if let Some(pos) = self.roster.iter().position(|p| *p == player) {
                self.roster.remove(pos);
                drain.left.push(player);
            }
        }
        if !drain.is_empty() {
            tracing::info!(
                channel = %self.channel,
                joined = drain.joined.len(),
                left = drain.left.len(),
                "queues drained"
            );
        }
        Ok(drain)
    }

    // -- round lifecycle --------------------------------------------------

    /// Starts a round from the current roster and settings.
    pub fn start_round<R: Rng + ?Sized>(
        &mut self,
        word_list: &WordList,
        rng: &mut R,
    ) -> Result<(), RoomError> {
        if self.in_round() {
            return Err(RoomError::RoundActive);
        }

        let player_count = self.roster.len();
        let setup = GameSetup::new(self.settings.effective_num_words(player_count))
            .veto_phase(!self.settings.veto_duration.is_zero())
            .team_guess_size(self.settings.effective_team_guess_size(player_count))
            .skew_chance(self.settings.skew_chance);

        let game = Shibboleth::new(self.roster.clone(), word_list, setup, rng)?;
        self.game = Some(game);
        self.paused = false;
        tracing::info!(
            channel = %self.channel,
            round = self.round_num,
            players = player_count,
            "round started"
        );
        Ok(())
    }

    /// Ends the round, whatever its state. The caller drains the queues
    /// afterwards.
    pub fn end_round(&mut self) -> Result<(), RoomError> {
        if !self.in_round() {
            return Err(RoomError::NoRound);
        }
        self.game = None;
        self.paused = false;
        self.round_num += 1;
        tracing::info!(channel = %self.channel, round = self.round_num, "round ended");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), RoomError> {
        if self.paused {
            return Err(RoomError::AlreadyPaused);
        }
        self.paused = true;
        Ok(())
    }

    pub fn unpause(&mut self) -> Result<(), RoomError> {
        if !self.paused {
            return Err(RoomError::NotPaused);
        }
        self.paused = false;
        Ok(())
    }

    // -- guess forwarding -------------------------------------------------

    fn active_game(&mut self) -> Result<&mut Shibboleth, RoomError> {
        if self.paused {
            return Err(RoomError::Paused);
        }
        self.game.as_mut().ok_or(RoomError::NoRound)
    }

    pub fn resolve_word_guess(
        &mut self,
        guesser: PlayerId,
        word: &str,
    ) -> Result<bool, RoomError> {
        Ok(self.active_game()?.resolve_word_guess(guesser, word)?)
    }

    pub fn resolve_team_guess(
        &mut self,
        guesser: PlayerId,
        guessed_team: &[PlayerId],
        veto_timeout_override: bool,
    ) -> Result<bool, RoomError> {
        Ok(self
            .active_game()?
            .resolve_team_guess(guesser, guessed_team, veto_timeout_override)?)
    }

    pub fn resolve_veto_timeout(&mut self) -> Result<bool, RoomError> {
        Ok(self.active_game()?.resolve_veto_timeout()?)
    }
}
