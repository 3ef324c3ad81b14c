//! Enemy strongholds, nightly frontier attacks and player sorties.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CAPTAIN_STRENGTH_BONUS, DEFENSE_PER_SOLDIER, INTERMEDIATE_STRONGHOLD_FACTOR,
    SORTIE_BASE_CASUALTIES_PER_DAY, SORTIE_CASUALTIES_PER_STRENGTH, SORTIE_DISTANCE_PENALTY,
    STRONGHOLD_BASE_STRENGTH, STRONGHOLD_DANGER_FACTOR, STRONGHOLD_DEPTH_BONUS,
};
use crate::map::NodeId;
use crate::numbers::round_f64_to_u32;

/// Soldier-derived strength of a garrison, before any distance penalty.
#[must_use]
pub fn garrison_strength(soldiers: u32, has_captain: bool) -> f64 {
    let base = f64::from(soldiers * DEFENSE_PER_SOLDIER);
    if has_captain {
        base * CAPTAIN_STRENGTH_BONUS
    } else {
        base
    }
}

/// Enemy presence at a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stronghold {
    depth: u32,
    intermediate: bool,
}

impl Stronghold {
    #[must_use]
    pub const fn new(depth: u32, intermediate: bool) -> Self {
        Self {
            depth,
            intermediate,
        }
    }

    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.depth
    }

    #[must_use]
    pub const fn is_intermediate(&self) -> bool {
        self.intermediate
    }

    /// Strength against sorties at the given kingdom danger level; never below 1.
    #[must_use]
    pub fn strength(&self, danger: f64) -> u32 {
        let mut strength = STRONGHOLD_DANGER_FACTOR.mul_add(danger, STRONGHOLD_BASE_STRENGTH);
        strength *= STRONGHOLD_DEPTH_BONUS.mul_add(f64::from(self.depth), 1.0);
        if self.intermediate {
            strength *= INTERMEDIATE_STRONGHOLD_FACTOR;
        }
        round_f64_to_u32(strength).max(1)
    }
}

/// One night's siege against a single captured node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrontierAttack {
    total: u32,
    accumulated: f64,
}

impl FrontierAttack {
    #[must_use]
    pub const fn new(total: u32) -> Self {
        Self {
            total,
            accumulated: 0.0,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn accumulated(&self) -> f64 {
        self.accumulated
    }

    pub fn advance(&mut self, dt: f64) {
        self.accumulated += dt * f64::from(self.total);
    }

    /// Absorb the leftover strength of a defeated child attack.
    pub fn reinforce(&mut self, extra: u32) {
        self.total += extra;
    }

    /// The attack breaks through once its accumulated strength strictly
    /// exceeds the defense.
    #[must_use]
    pub fn overwhelms(&self, defense: u32) -> bool {
        self.accumulated > f64::from(defense)
    }

    /// Strength not yet spent, rounded; carried to the parent node on a breakthrough.
    #[must_use]
    pub fn remaining(&self) -> u32 {
        round_f64_to_u32(f64::from(self.total) - self.accumulated)
    }
}

/// What happened to a sortie during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortieOutcome {
    pub victory: bool,
    pub casualty: bool,
}

/// A player assault from a captured node against a stronghold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sortie {
    origin: NodeId,
    target: NodeId,
    distance: u32,
    casualties: u32,
    victory_progress: f64,
    casualty_progress: f64,
}

impl Sortie {
    /// `hops` is the map distance from origin to target; adjacency counts as zero.
    #[must_use]
    pub const fn new(origin: NodeId, target: NodeId, hops: u32) -> Self {
        Self {
            origin,
            target,
            distance: hops.saturating_sub(1),
            casualties: 0,
            victory_progress: 0.0,
            casualty_progress: 0.0,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> NodeId {
        self.origin
    }

    #[must_use]
    pub const fn target(&self) -> NodeId {
        self.target
    }

    #[must_use]
    pub const fn distance(&self) -> u32 {
        self.distance
    }

    #[must_use]
    pub const fn casualties(&self) -> u32 {
        self.casualties
    }

    #[must_use]
    pub const fn victory_progress(&self) -> f64 {
        self.victory_progress
    }

    #[must_use]
    pub const fn casualty_progress(&self) -> f64 {
        self.casualty_progress
    }

    #[must_use]
    pub fn distance_penalty(&self) -> f64 {
        (f64::from(self.distance) * SORTIE_DISTANCE_PENALTY).min(1.0)
    }

    /// Strength of the attackers after the distance penalty, rounded.
    #[must_use]
    pub fn human_strength(&self, soldiers: u32, has_captain: bool) -> u32 {
        let strength = garrison_strength(soldiers, has_captain);
        round_f64_to_u32(strength - strength * self.distance_penalty())
    }

    #[must_use]
    pub fn casualty_rate(stronghold_strength: u32) -> f64 {
        SORTIE_CASUALTIES_PER_STRENGTH.mul_add(
            f64::from(stronghold_strength),
            SORTIE_BASE_CASUALTIES_PER_DAY,
        )
    }

    /// Accrue victory and casualty progress. Both can come due on the same tick.
    pub fn advance(&mut self, dt: f64, human_strength: u32, stronghold_strength: u32) -> SortieOutcome {
        let defense = f64::from(stronghold_strength.max(1));
        self.victory_progress += dt * f64::from(human_strength) / defense;
        self.casualty_progress += dt * Self::casualty_rate(stronghold_strength);
        let casualty = self.casualty_progress >= 1.0;
        if casualty {
            self.casualty_progress = 0.0;
            self.casualties += 1;
        }
        SortieOutcome {
            victory: self.victory_progress >= 1.0,
            casualty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stronghold_strength_scales_with_depth_and_type() {
        let leaf = Stronghold::new(10, false);
        // (10 + 0.8) * 1.5 = 16.2
        assert_eq!(leaf.strength(1.0), 16);
        let inner = Stronghold::new(10, true);
        // 16.2 * 0.75 = 12.15
        assert_eq!(inner.strength(1.0), 12);
        assert!(Stronghold::new(0, true).strength(-100.0) >= 1);
    }

    #[test]
    fn attack_breaks_through_only_when_strictly_above_defense() {
        let mut attack = FrontierAttack::new(10);
        attack.advance(0.5);
        assert!(!attack.overwhelms(5));
        attack.advance(0.01);
        assert!(attack.overwhelms(5));
        assert_eq!(attack.remaining(), 5);
        attack.reinforce(3);
        assert_eq!(attack.total(), 13);
    }

    #[test]
    fn sortie_victory_progress_is_linear() {
        let mut sortie = Sortie::new(NodeId::new(1), NodeId::new(2), 1);
        assert!(sortie.distance_penalty().abs() < f64::EPSILON);
        let outcome = sortie.advance(0.01, 20, 40);
        assert!(!outcome.victory);
        for _ in 0..99 {
            let _ = sortie.advance(0.01, 20, 40);
        }
        assert!((sortie.victory_progress() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sortie_casualties_wait_for_full_progress() {
        let mut sortie = Sortie::new(NodeId::new(1), NodeId::new(2), 1);
        // Rate is 5.2 + 0.04 * 40 = 6.8 per day.
        let per_casualty = 1.0 / Sortie::casualty_rate(40);
        let outcome = sortie.advance(per_casualty * 0.9, 0, 40);
        assert!(!outcome.casualty);
        let outcome = sortie.advance(per_casualty * 0.2, 0, 40);
        assert!(outcome.casualty);
        assert_eq!(sortie.casualties(), 1);
        assert!(sortie.casualty_progress().abs() < f64::EPSILON);
    }

    #[test]
    fn distance_penalty_caps_at_total_loss() {
        let near = Sortie::new(NodeId::new(0), NodeId::new(5), 3);
        assert_eq!(near.distance(), 2);
        // 6 soldiers * 3 = 18, minus 10%.
        assert_eq!(near.human_strength(6, false), 16);
        assert_eq!(near.human_strength(5, true), 16);
        let far = Sortie::new(NodeId::new(0), NodeId::new(9), 40);
        assert_eq!(far.human_strength(100, true), 0);
    }

    #[test]
    fn a_winning_tick_still_counts_its_casualty() {
        let mut sortie = Sortie::new(NodeId::new(1), NodeId::new(2), 1);
        // 20 against 20 wins after one day; casualties come at 6 a day.
        let outcome = sortie.advance(0.5, 20, 20);
        assert!(!outcome.victory);
        assert!(outcome.casualty);
        let outcome = sortie.advance(0.5, 20, 20);
        assert!(outcome.victory);
        assert!(outcome.casualty);
        assert_eq!(sortie.casualties(), 2);
    }
}
