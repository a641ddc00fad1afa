//! Per-channel room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::RoomError;

/// Configuration for a room. Changes made during a round only affect
/// later rounds, since the active game snapshots everything it needs at
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSettings {
    /// Word-pool size. 0 means automatic: twice the player count,
    /// clamped to `[10, 14]`.
    pub num_words: usize,

    /// Largest team a player guesses in full. Rounds with more than
    /// `2 * max_guess_size` players switch to capped subset guessing.
    pub max_guess_size: usize,

    /// Length of the veto window. Zero disables the veto phase.
    pub veto_duration: Duration,

    /// Probability of shifting one player between the two teams.
    pub skew_chance: f64,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            num_words: 0,
            max_guess_size: 3,
            veto_duration: Duration::from_secs(45),
            skew_chance: 0.0,
        }
    }
}

impl RoomSettings {
    /// Bounds for the automatic word count.
    pub const AUTO_WORDS_MIN: usize = 10;
    pub const AUTO_WORDS_MAX: usize = 14;

    pub fn set_num_words(&mut self, num: usize) -> Result<(), RoomError> {
        if num != 0 && !(2..=100).contains(&num) {
            return Err(RoomError::InvalidSetting(format!(
                "number of words {num} not 0 or in 2..=100"
            )));
        }
        self.num_words = num;
        Ok(())
    }

    pub fn set_max_guess_size(&mut self, size: usize) -> Result<(), RoomError> {
        if !(1..=99).contains(&size) {
            return Err(RoomError::InvalidSetting(format!(
                "team guess size {size} not in 1..=99"
            )));
        }
        self.max_guess_size = size;
        Ok(())
    }

    pub fn set_veto_duration(&mut self, duration: Duration) -> Result<(), RoomError> {
        if duration > Duration::from_secs(999) {
            return Err(RoomError::InvalidSetting(format!(
                "veto duration {}s exceeds 999s",
                duration.as_secs()
            )));
        }
        self.veto_duration = duration;
        Ok(())
    }

    pub fn set_skew_chance(&mut self, chance: f64) -> Result<(), RoomError> {
        if !(0.0..=1.0).contains(&chance) {
            return Err(RoomError::InvalidSetting(format!(
                "skew chance {chance} not in 0.0..=1.0"
            )));
        }
        self.skew_chance = chance;
        Ok(())
    }

    /// The word-pool size to use for `player_count` players.
    pub fn effective_num_words(&self, player_count: usize) -> usize {
        if self.num_words == 0 {
            (2 * player_count).clamp(Self::AUTO_WORDS_MIN, Self::AUTO_WORDS_MAX)
        } else {
            self.num_words
        }
    }

    /// The team guess cap for `player_count` players. Small games guess
    /// their whole team.
    pub fn effective_team_guess_size(&self, player_count: usize) -> Option<usize> {
        if player_count <= 2 * self.max_guess_size {
            None
        } else {
            Some(self.max_guess_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = RoomSettings::default();
        assert_eq!(s.num_words, 0);
        assert_eq!(s.max_guess_size, 3);
        assert_eq!(s.veto_duration, Duration::from_secs(45));
        assert_eq!(s.skew_chance, 0.0);
    }

    #[test]
    fn test_setter_ranges() {
        let mut s = RoomSettings::default();
        assert!(s.set_num_words(0).is_ok());
        assert!(s.set_num_words(2).is_ok());
        assert!(s.set_num_words(100).is_ok());
        assert!(s.set_num_words(1).is_err());
        assert!(s.set_num_words(101).is_err());

        assert!(s.set_max_guess_size(1).is_ok());
        assert!(s.set_max_guess_size(0).is_err());
        assert!(s.set_max_guess_size(100).is_err());

        assert!(s.set_veto_duration(Duration::ZERO).is_ok());
        assert!(s.set_veto_duration(Duration::from_secs(999)).is_ok());
        assert!(s.set_veto_duration(Duration::from_secs(1000)).is_err());

        assert!(s.set_skew_chance(1.0).is_ok());
        assert!(s.set_skew_chance(-0.1).is_err());
        assert!(s.set_skew_chance(1.1).is_err());
    }

    #[test]
    fn test_auto_word_count_clamps() {
        let s = RoomSettings::default();
        assert_eq!(s.effective_num_words(3), 10);
        assert_eq!(s.effective_num_words(6), 12);
        assert_eq!(s.effective_num_words(10), 14);
    }

    #[test]
    fn test_fixed_word_count_passthrough() {
        let mut s = RoomSettings::default();
        s.set_num_words(20).unwrap();
        assert_eq!(s.effective_num_words(3), 20);
    }

    #[test]
    fn test_team_guess_cap_threshold() {
        let s = RoomSettings::default();
        assert_eq!(s.effective_team_guess_size(6), None);
        assert_eq!(s.effective_team_guess_size(7), Some(3));
    }
}
