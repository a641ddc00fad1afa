//! The round state machine.
//!
//! A round moves through at most three phases:
//!
//! ```text
//! main ──word guess──────────────────────────▶ over
//! main ──team guess (veto off)───────────────▶ over
//! main ──team guess (veto on)──▶ veto ──word guess or timeout──▶ over
//! ```
//!
//! Terminal states are absorbing: once `winning_word` is set, every
//! further resolve fails with [`ActionError::GameOver`]. That guard is
//! what makes the veto timer and a live word guess safe to race — both
//! may attempt resolution, only the first succeeds.

use std::collections::{HashMap, HashSet};
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use rand::seq::index;

use shibboleth_core::{PlayerId, WordList};

use crate::{ActionError, GameSetup, InitError};

/// A team guess held for the duration of the veto window.
///
/// Once set this is never cleared, even after the round ends — the chat
/// layer reports the original guess post hoc when a word guess overrides
/// it. The round ends via `winning_word`, not by clearing this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamGuess {
    pub guesser: PlayerId,
    pub team: Vec<PlayerId>,
}

impl TeamGuess {
    fn matches(&self, guesser: PlayerId, team: &[PlayerId]) -> bool {
        let pending: HashSet<PlayerId> = self.team.iter().copied().collect();
        let offered: HashSet<PlayerId> = team.iter().copied().collect();
        self.guesser == guesser && pending == offered
    }
}

/// The phase of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cluing and guessing; no team guess pending.
    Main,
    /// A team guess is pending its veto window.
    Veto,
    /// A winning word has been declared.
    Over,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Veto => write!(f, "veto"),
            Self::Over => write!(f, "over"),
        }
    }
}

/// One round of Shibboleth: two secret words, two hidden teams, and the
/// guess-resolution state machine.
///
/// Randomness is injected at construction; after that the type is fully
/// deterministic. It performs no I/O and holds no clock — the veto window
/// is a higher layer's timer that calls [`Shibboleth::resolve_veto_timeout`].
#[derive(Debug, Clone)]
pub struct Shibboleth {
    players: Vec<PlayerId>,
    word_pool: Vec<String>,
    secret_words: [String; 2],
    team_sizes: [usize; 2],
    skew_chance: f64,
    player_words: HashMap<PlayerId, String>,
    team_guess_size: Option<usize>,
    include_veto_phase: bool,
    vetoable_team_guess: Option<TeamGuess>,
    winning_word: Option<String>,
}

impl Shibboleth {
    /// Builds a round: samples the word pool and secret words, draws team
    /// sizes (with the optional skew), and deals a uniformly random
    /// balanced partition of `players` across the two words.
    pub fn new<R: Rng + ?Sized>(
        players: Vec<PlayerId>,
        word_list: &WordList,
        setup: GameSetup,
        rng: &mut R,
    ) -> Result<Self, InitError> {
        let unique: HashSet<PlayerId> = players.iter().copied().collect();
        if unique.len() != players.len() {
            return Err(InitError::DuplicatePlayers);
        }

        let corpus = word_list.words();
        if setup.num_words < 2 || setup.num_words > corpus.len() {
            return Err(InitError::InvalidWordCount {
                requested: setup.num_words,
                corpus_size: corpus.len(),
            });
        }

        let word_pool: Vec<String> = index::sample(rng, corpus.len(), setup.num_words)
            .iter()
            .map(|i| corpus[i].clone())
            .collect();

        let secret = index::sample(rng, word_pool.len(), 2);
        let secret_words = [
            word_pool[secret.index(0)].clone(),
            word_pool[secret.index(1)].clone(),
        ];
        if secret_words[0] == secret_words[1] {
            // Distinct indices, but the corpus may carry repeated tokens.
            return Err(InitError::IndistinctSecretWords);
        }

        let num_players = players.len();
        let mut team_sizes = [num_players / 2, num_players.div_ceil(2)];

        if setup.skew_chance > 0.0 {
            if num_players < 2 {
                return Err(InitError::SkewTooFewPlayers);
            }
            if setup.team_guess_size.is_some() {
                return Err(InitError::SkewWithTeamGuessSize);
            }
            if rng.random::<f64>() < setup.skew_chance {
                team_sizes = [team_sizes[0] - 1, team_sizes[1] + 1];
            }
        }

        if let Some(size) = setup.team_guess_size {
            if size == 0 {
                return Err(InitError::ZeroTeamGuessSize);
            }
            let min_team_size = team_sizes[0].min(team_sizes[1]);
            if size > min_team_size {
                return Err(InitError::TeamGuessSizeTooLarge { size, min_team_size });
            }
        }

        // One copy of each secret word per seat on its team, shuffled,
        // then zipped with the roster in its original order.
        let mut dealt: Vec<&String> = Vec::with_capacity(num_players);
        for (word, size) in secret_words.iter().zip(team_sizes) {
            dealt.extend(std::iter::repeat_n(word, size));
        }
        dealt.shuffle(rng);
        let player_words: HashMap<PlayerId, String> = players
            .iter()
            .copied()
            .zip(dealt.into_iter().cloned())
            .collect();

        tracing::debug!(
            players = num_players,
            words = word_pool.len(),
            team_sizes = ?team_sizes,
            veto = setup.include_veto_phase,
            "round constructed"
        );

        Ok(Self {
            players,
            word_pool,
            secret_words,
            team_sizes,
            skew_chance: setup.skew_chance,
            player_words,
            team_guess_size: setup.team_guess_size,
            include_veto_phase: setup.include_veto_phase,
            vetoable_team_guess: None,
            winning_word: None,
        })
    }

    // -- read-only queries ------------------------------------------------

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn word_pool(&self) -> &[String] {
        &self.word_pool
    }

    pub fn secret_words(&self) -> [&str; 2] {
        [&self.secret_words[0], &self.secret_words[1]]
    }

    pub fn team_sizes(&self) -> [usize; 2] {
        self.team_sizes
    }

    pub fn team_guess_size(&self) -> Option<usize> {
        self.team_guess_size
    }

    pub fn include_veto_phase(&self) -> bool {
        self.include_veto_phase
    }

    /// `true` if this round was constructed with a nonzero skew chance
    /// (whether or not the skew was actually drawn).
    pub fn might_skew(&self) -> bool {
        self.skew_chance > 0.0
    }

    /// The team sizes a guesser must consider possible. Without skew this
    /// is just the actual split; with skew it includes the shifted sizes.
    pub fn possible_team_sizes(&self) -> Vec<usize> {
        let n = self.players.len();
        let (lo, hi) = (n / 2, n.div_ceil(2));
        if self.might_skew() {
            (lo - 1..=hi + 1).collect()
        } else if lo == hi {
            vec![lo]
        } else {
            vec![lo, hi]
        }
    }

    /// The guessed-team sizes accepted by [`Self::check_team_guess`].
    pub fn valid_team_guess_sizes(&self) -> Vec<usize> {
        match self.team_guess_size {
            Some(size) => vec![size],
            None => self.possible_team_sizes(),
        }
    }

    pub fn secret_word(&self, player: PlayerId) -> Result<&str, ActionError> {
        self.player_words
            .get(&player)
            .map(String::as_str)
            .ok_or(ActionError::UnknownPlayer(player))
    }

    /// The other secret word, or `None` if `word` is not a secret word.
    pub fn opposing_word(&self, word: &str) -> Option<&str> {
        let [a, b] = &self.secret_words;
        if word == a {
            Some(b)
        } else if word == b {
            Some(a)
        } else {
            None
        }
    }

    /// The players holding `word`, in roster order. `None` if `word` is
    /// not a secret word.
    pub fn players_with_word(&self, word: &str) -> Option<Vec<PlayerId>> {
        if !self.secret_words.iter().any(|w| w == word) {
            return None;
        }
        Some(
            self.players
                .iter()
                .copied()
                .filter(|p| self.player_words[p] == word)
                .collect(),
        )
    }

    /// Both teams, keyed by their secret word.
    pub fn teams(&self) -> [(String, Vec<PlayerId>); 2] {
        self.secret_words.clone().map(|word| {
            let members = self
                .players_with_word(&word)
                .unwrap_or_default();
            (word, members)
        })
    }

    pub fn vetoable_team_guess(&self) -> Option<&TeamGuess> {
        self.vetoable_team_guess.as_ref()
    }

    pub fn in_veto_phase(&self) -> bool {
        self.vetoable_team_guess.is_some()
    }

    pub fn game_ongoing(&self) -> bool {
        self.winning_word.is_none()
    }

    pub fn winning_word(&self) -> Option<&str> {
        self.winning_word.as_deref()
    }

    pub fn phase(&self) -> Phase {
        if !self.game_ongoing() {
            Phase::Over
        } else if self.in_veto_phase() {
            Phase::Veto
        } else {
            Phase::Main
        }
    }

    /// `[winners, losers]` once the round is over, `None` while ongoing.
    pub fn winners_and_losers(&self) -> Option<[Vec<PlayerId>; 2]> {
        let winning = self.winning_word.as_deref()?;
        let losing = self.opposing_word(winning)?;
        Some([
            self.players_with_word(winning)?,
            self.players_with_word(losing)?,
        ])
    }

    // -- guess checking ---------------------------------------------------

    /// Validates a word guess and reports whether it would be correct,
    /// without changing any state.
    pub fn check_word_guess(&self, guesser: PlayerId, word: &str) -> Result<bool, ActionError> {
        let own_word = self.secret_word(guesser)?;
        if !self.word_pool.iter().any(|w| w == word) {
            return Err(ActionError::WordNotInPool(word.to_owned()));
        }
        if word == own_word {
            return Err(ActionError::OwnWordGuess);
        }
        let opposing = self
            .opposing_word(own_word)
            .unwrap_or_else(|| unreachable!("own word is always a secret word"));
        Ok(word == opposing)
    }

    /// Validates a team guess and reports whether it would be correct,
    /// without changing any state.
    ///
    /// With a fixed `team_guess_size` a guess is correct when it is a
    /// subset of the guesser's actual team; otherwise it must match the
    /// team exactly.
    pub fn check_team_guess(
        &self,
        guesser: PlayerId,
        guessed_team: &[PlayerId],
    ) -> Result<bool, ActionError> {
        let own_word = self.secret_word(guesser)?;

        let guessed: HashSet<PlayerId> = guessed_team.iter().copied().collect();
        if guessed.len() != guessed_team.len() {
            return Err(ActionError::DuplicateGuessedPlayers);
        }

        let roster: HashSet<PlayerId> = self.players.iter().copied().collect();
        let mut outsiders: Vec<PlayerId> =
            guessed.difference(&roster).copied().collect();
        if !outsiders.is_empty() {
            outsiders.sort();
            return Err(ActionError::NonPlayersGuessed(outsiders));
        }

        if !guessed.contains(&guesser) {
            return Err(ActionError::SelfNotIncluded);
        }

        let allowed = self.valid_team_guess_sizes();
        if !allowed.contains(&guessed.len()) {
            return Err(ActionError::WrongGuessSize {
                got: guessed.len(),
                allowed,
            });
        }

        let actual: HashSet<PlayerId> = self
            .players_with_word(own_word)
            .unwrap_or_default()
            .into_iter()
            .collect();

        if self.team_guess_size.is_some() {
            Ok(guessed.is_subset(&actual))
        } else {
            Ok(guessed == actual)
        }
    }

    // -- resolution -------------------------------------------------------

    /// Resolves a word guess: checks it, then terminally declares the
    /// winner. A word guess always ends the round immediately, including
    /// during a veto phase (it overrides the pending team guess).
    pub fn resolve_word_guess(
        &mut self,
        guesser: PlayerId,
        word: &str,
    ) -> Result<bool, ActionError> {
        if !self.game_ongoing() {
            return Err(ActionError::GameOver);
        }
        let correct = self.check_word_guess(guesser, word)?;
        self.declare_winner(guesser, correct);
        tracing::info!(%guesser, word, correct, "word guess resolved");
        Ok(correct)
    }

    /// Resolves a team guess.
    ///
    /// With the veto phase enabled, the first team guess of the round is
    /// held in [`Self::vetoable_team_guess`] and the round enters the
    /// veto phase; the returned correctness is informational until the
    /// window resolves. `veto_timeout_override` is the timer's path: it
    /// must name exactly the pending guess, and then resolves it
    /// terminally.
    pub fn resolve_team_guess(
        &mut self,
        guesser: PlayerId,
        guessed_team: &[PlayerId],
        veto_timeout_override: bool,
    ) -> Result<bool, ActionError> {
        if !self.game_ongoing() {
            return Err(ActionError::GameOver);
        }
        if self.in_veto_phase() && !veto_timeout_override {
            return Err(ActionError::VetoPending);
        }
        if veto_timeout_override {
            // A stray timeout must never resolve anything it doesn't own.
            match &self.vetoable_team_guess {
                None => return Err(ActionError::NoVetoPending),
                Some(pending) if !pending.matches(guesser, guessed_team) => {
                    return Err(ActionError::VetoMismatch);
                }
                Some(_) => {}
            }
        }

        let correct = self.check_team_guess(guesser, guessed_team)?;

        if self.include_veto_phase && !self.in_veto_phase() {
            self.vetoable_team_guess = Some(TeamGuess {
                guesser,
                team: guessed_team.to_vec(),
            });
            tracing::info!(%guesser, "team guess held, entering veto phase");
        } else {
            self.declare_winner(guesser, correct);
            tracing::info!(%guesser, correct, "team guess resolved");
        }
        Ok(correct)
    }

    /// The veto window elapsed: resolves the pending team guess as-is.
    pub fn resolve_veto_timeout(&mut self) -> Result<bool, ActionError> {
        if !self.game_ongoing() {
            return Err(ActionError::GameOver);
        }
        let pending = self
            .vetoable_team_guess
            .clone()
            .ok_or(ActionError::NoVetoPending)?;
        self.resolve_team_guess(pending.guesser, &pending.team, true)
    }

    /// Sets the winning word from a resolving player's perspective. The
    /// single `None → Some` transition of the round.
    fn declare_winner(&mut self, player: PlayerId, correct: bool) {
        debug_assert!(self.winning_word.is_none());
        let own = self.player_words[&player].clone();
        let winning = if correct {
            own
        } else {
            self.opposing_word(&own)
                .unwrap_or_else(|| unreachable!("own word is always a secret word"))
                .to_owned()
        };
        self.winning_word = Some(winning);
    }
}
