//! Per-node fortifications.

use serde::{Deserialize, Serialize};

use crate::constants::{
    WALL_CONSTRUCTION_TIMES, WALL_COSTS, WALL_DEFENSE_RATINGS, WALL_MAX_LEVEL, by_level,
};
use crate::construction::{Construction, ConstructionEvent};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    construction: Construction,
}

impl Default for Wall {
    fn default() -> Self {
        Self::new()
    }
}

impl Wall {
    /// A new level-1 wall, not yet built.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            construction: Construction::building_site(),
        }
    }

    /// Gold needed to reach `level`; 1 is the initial build.
    #[must_use]
    pub fn cost_for_level(level: u8) -> u32 {
        by_level(&WALL_COSTS, level)
    }

    #[must_use]
    pub const fn construction(&self) -> &Construction {
        &self.construction
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.construction.level()
    }

    #[must_use]
    pub const fn is_building_site(&self) -> bool {
        self.construction.is_building_site()
    }

    #[must_use]
    pub const fn is_upgrading(&self) -> bool {
        self.construction.is_upgrading()
    }

    /// Construction of any kind is in progress.
    #[must_use]
    pub const fn is_under_construction(&self) -> bool {
        !self.construction.is_operational()
    }

    /// Rating contributed to the node's defense. A building site contributes
    /// nothing; callers fall back to the wall-less bonus.
    #[must_use]
    pub fn defense_rating(&self) -> Option<u32> {
        (!self.is_building_site()).then(|| by_level(&WALL_DEFENSE_RATINGS, self.level()))
    }

    #[must_use]
    pub fn upgrade_cost(&self) -> Option<u32> {
        (self.level() < WALL_MAX_LEVEL).then(|| Self::cost_for_level(self.level() + 1))
    }

    pub fn begin_upgrade(&mut self) -> bool {
        self.construction.begin_upgrade(WALL_MAX_LEVEL)
    }

    pub fn cancel_upgrade(&mut self) -> bool {
        self.construction.cancel_upgrade()
    }

    /// Advance one daytime tick with `workers` present.
    pub fn advance(&mut self, dt: f64, workers: u32) -> Option<ConstructionEvent> {
        if self.construction.is_operational() {
            return None;
        }
        let worker_days = by_level(&WALL_CONSTRUCTION_TIMES, self.construction.target_level());
        self.construction.advance(dt, workers, worker_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn building_site_has_no_rating_until_finished() {
        let mut wall = Wall::new();
        assert_eq!(wall.defense_rating(), None);
        assert_eq!(wall.advance(0.1, 1), None);
        assert_eq!(wall.advance(0.1, 1), Some(ConstructionEvent::Built));
        assert_eq!(wall.defense_rating(), Some(6));
    }

    #[test]
    fn upgrades_walk_the_rating_table() {
        let mut wall = Wall::new();
        let _ = wall.advance(1.0, 1);
        assert_eq!(wall.upgrade_cost(), Some(6));
        assert!(wall.begin_upgrade());
        assert!(wall.is_under_construction());
        // Reaching level 2 needs 0.6 worker-days; the old rating holds meanwhile.
        assert_eq!(wall.advance(0.3, 1), None);
        assert_eq!(wall.defense_rating(), Some(6));
        assert_eq!(
            wall.advance(0.3, 1),
            Some(ConstructionEvent::Upgraded { level: 2 })
        );
        assert_eq!(wall.defense_rating(), Some(12));
    }

    #[test]
    fn max_level_wall_cannot_upgrade() {
        let mut wall = Wall::new();
        let _ = wall.advance(1.0, 1);
        for _ in 1..WALL_MAX_LEVEL {
            assert!(wall.begin_upgrade());
            let _ = wall.advance(10.0, 1);
        }
        assert_eq!(wall.level(), WALL_MAX_LEVEL);
        assert_eq!(wall.upgrade_cost(), None);
        assert!(!wall.begin_upgrade());
        assert_eq!(wall.defense_rating(), Some(102));
    }
}
