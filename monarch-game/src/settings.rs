//! World-creation inputs: enemy difficulty, map tuning selectors and seed.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::mapgen::{MapDifficulty, MapSize};

/// Day number up to which the early danger increase applies.
const EARLY_GAME_LAST_DAY: u32 = 5;

/// Enemy aggression: how fast the danger level climbs each dawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DifficultyLevel {
    #[default]
    Easy,
    Normal,
    Hard,
}

impl DifficultyLevel {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
        }
    }

    const fn increases(self) -> (f64, f64) {
        match self {
            Self::Easy => (0.9, 1.35),
            Self::Normal => (1.1, 1.6),
            Self::Hard => (1.3, 1.9),
        }
    }

    /// Danger added at the dawn that starts `day`.
    #[must_use]
    pub const fn daily_danger_increase(self, day: u32) -> f64 {
        let (early, mid) = self.increases();
        if day <= EARLY_GAME_LAST_DAY { early } else { mid }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Everything needed to create a world. Fixed once the game starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameSettings {
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub map_difficulty: MapDifficulty,
    #[serde(default)]
    pub map_size: MapSize,
    /// Seed for the game RNG; `None` draws from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GameSettings {
    #[must_use]
    pub const fn new(difficulty: DifficultyLevel, map_difficulty: MapDifficulty, map_size: MapSize) -> Self {
        Self {
            difficulty,
            map_difficulty,
            map_size,
            seed: None,
        }
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_days_use_the_early_rate() {
        let easy = DifficultyLevel::Easy;
        assert!((easy.daily_danger_increase(2) - 0.9).abs() < f64::EPSILON);
        assert!((easy.daily_danger_increase(5) - 0.9).abs() < f64::EPSILON);
        assert!((easy.daily_danger_increase(6) - 1.35).abs() < f64::EPSILON);
        assert!(
            DifficultyLevel::Hard.daily_danger_increase(9)
                > DifficultyLevel::Normal.daily_danger_increase(9)
        );
    }

    #[test]
    fn settings_round_trip_through_json() {
        let settings = GameSettings::new(DifficultyLevel::Hard, MapDifficulty::Easy, MapSize::Large)
            .with_seed(42);
        let json = serde_json::to_string(&settings).expect("serialize");
        let back: GameSettings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, settings);
        let sparse: GameSettings = serde_json::from_str("{}").expect("defaults");
        assert_eq!(sparse, GameSettings::default());
    }
}
