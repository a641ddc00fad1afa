//! Construction parameters for a round.

/// Parameters for [`Shibboleth::new`](crate::Shibboleth::new).
///
/// `num_words` is the only field without a useful default; the room layer
/// computes it from its own settings before starting a round.
#[derive(Debug, Clone)]
pub struct GameSetup {
    /// Size of the round's word pool, sampled from the corpus.
    pub num_words: usize,

    /// Whether a team guess opens a veto window instead of resolving
    /// immediately.
    pub include_veto_phase: bool,

    /// Fixed team guess size for large games. `None` means the whole
    /// team must be named.
    pub team_guess_size: Option<usize>,

    /// Probability in `[0, 1]` of shifting one player between the two
    /// teams. Incompatible with `team_guess_size`.
    pub skew_chance: f64,
}

impl GameSetup {
    pub fn new(num_words: usize) -> Self {
        Self {
            num_words,
            include_veto_phase: true,
            team_guess_size: None,
            skew_chance: 0.0,
        }
    }

    pub fn veto_phase(mut self, include: bool) -> Self {
        self.include_veto_phase = include;
        self
    }

    pub fn team_guess_size(mut self, size: Option<usize>) -> Self {
        self.team_guess_size = size;
        self
    }

    pub fn skew_chance(mut self, chance: f64) -> Self {
        self.skew_chance = chance;
        self
    }
}
