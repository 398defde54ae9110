//! Match configuration.
//!
//! The ruleset constants live here rather than in the engine so tests and
//! tools can shrink or stretch a match. The defaults are the standard
//! rules.

use serde::{Deserialize, Serialize};

/// Match configuration parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Seed for the match RNG (shuffles, deal retries, steals).
    pub seed: u64,

    /// Maximum hand size at the end of a turn.
    pub hand_limit: usize,

    /// Cards dealt to each player at match start.
    pub opening_hand_size: usize,

    /// Creatures an opening hand must contain; deals are retried until met.
    pub min_opening_creatures: usize,

    /// Rows each field starts with.
    pub initial_field_rows: usize,

    /// Move budget on a player's very first turn.
    pub first_turn_moves: u32,

    /// Move budget on every later turn.
    pub moves_per_turn: u32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            hand_limit: 5,
            opening_hand_size: 5,
            min_opening_creatures: 3,
            initial_field_rows: 1,
            first_turn_moves: 1,
            moves_per_turn: 2,
        }
    }
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the end-of-turn hand limit.
    pub fn with_hand_limit(mut self, limit: usize) -> Self {
        self.hand_limit = limit;
        self
    }

    /// Set the opening hand size and its creature minimum.
    pub fn with_opening_hand(mut self, size: usize, min_creatures: usize) -> Self {
        self.opening_hand_size = size;
        self.min_opening_creatures = min_creatures;
        self
    }

    /// Move budget for a player who has completed `turns_completed` turns.
    #[must_use]
    pub fn moves_for_turn(&self, turns_completed: u32) -> u32 {
        if turns_completed == 0 {
            self.first_turn_moves
        } else {
            self.moves_per_turn
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_standard_rules() {
        let config = MatchConfig::default();

        assert_eq!(config.hand_limit, 5);
        assert_eq!(config.opening_hand_size, 5);
        assert_eq!(config.min_opening_creatures, 3);
        assert_eq!(config.moves_for_turn(0), 1);
        assert_eq!(config.moves_for_turn(1), 2);
        assert_eq!(config.moves_for_turn(17), 2);
    }

    #[test]
    fn test_builder() {
        let config = MatchConfig::new()
            .with_seed(7)
            .with_hand_limit(4)
            .with_opening_hand(3, 1);

        assert_eq!(config.seed, 7);
        assert_eq!(config.hand_limit, 4);
        assert_eq!(config.opening_hand_size, 3);
        assert_eq!(config.min_opening_creatures, 1);
    }

    #[test]
    fn test_config_serde() {
        let config = MatchConfig::default().with_seed(99);
        let json = serde_json::to_string(&config).unwrap();
        let back: MatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
