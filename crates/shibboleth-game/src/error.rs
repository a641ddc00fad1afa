//! Error types for the round engine.
//!
//! Two distinct kinds: [`InitError`] means the construction inputs can
//! never produce a valid round (don't retry without changing them);
//! [`ActionError`] means one in-round action broke a rule and the round
//! itself is still perfectly valid.

use shibboleth_core::PlayerId;

/// A round could not be constructed from the given inputs.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The player list contains the same player more than once.
    #[error("repeated players in player list")]
    DuplicatePlayers,

    /// The requested word-pool size is outside `[2, corpus size]`.
    #[error("invalid number of words {requested} (corpus has {corpus_size})")]
    InvalidWordCount { requested: usize, corpus_size: usize },

    /// Drawing two secret words from the pool yielded fewer than two
    /// distinct values. Only possible with a degenerate corpus.
    #[error("secret words are not distinct")]
    IndistinctSecretWords,

    /// Skew shifts one player between teams, so it needs at least two.
    #[error("skew requires at least 2 players")]
    SkewTooFewPlayers,

    /// A fixed team guess size can't be kept consistent across skewed and
    /// unskewed team sizes.
    #[error("skew chance and a fixed team guess size are mutually exclusive")]
    SkewWithTeamGuessSize,

    /// The fixed team guess size must fit inside the smaller team.
    #[error("team guess size {size} is too large for teams of minimum size {min_team_size}")]
    TeamGuessSizeTooLarge { size: usize, min_team_size: usize },

    /// A team guess must at least contain the guesser.
    #[error("team guess size must be at least 1")]
    ZeroTeamGuessSize,
}

/// An in-round action violated a rule. The round remains valid and the
/// same action may be retried with corrected arguments.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The acting player is not part of this round.
    #[error("player {0} is not in this round")]
    UnknownPlayer(PlayerId),

    /// The guessed word is not on the round's word list.
    #[error("word {0:?} is not on the word list")]
    WordNotInPool(String),

    /// A player may never guess their own secret word.
    #[error("cannot guess own word")]
    OwnWordGuess,

    /// The round already has a winner; terminal states are absorbing.
    #[error("cannot act after the round is over")]
    GameOver,

    /// A team guess is already pending its veto window.
    #[error("cannot guess team during veto phase")]
    VetoPending,

    /// A veto timeout was signalled but no team guess is pending.
    #[error("no vetoable team guess is pending")]
    NoVetoPending,

    /// A veto timeout was signalled for a different guess than the
    /// pending one.
    #[error("veto timeout does not match the pending team guess")]
    VetoMismatch,

    /// The guessed team names the same player more than once.
    #[error("duplicate players in team guess")]
    DuplicateGuessedPlayers,

    /// The guessed team names people who are not in the round.
    #[error("non-players guessed: {}", format_players(.0))]
    NonPlayersGuessed(Vec<PlayerId>),

    /// Guessers must include themselves in their own team guess.
    #[error("player guessed a team without themselves")]
    SelfNotIncluded,

    /// The guessed team has the wrong number of players.
    #[error("invalid guessed team size {got}; must be {}", format_sizes(.allowed))]
    WrongGuessSize { got: usize, allowed: Vec<usize> },
}

fn format_players(players: &[PlayerId]) -> String {
    let names: Vec<String> = players.iter().map(ToString::to_string).collect();
    names.join(", ")
}

fn format_sizes(sizes: &[usize]) -> String {
    let sizes: Vec<String> = sizes.iter().map(ToString::to_string).collect();
    sizes.join(" or ")
}
