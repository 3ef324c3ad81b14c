//! Subject categories and the population ledger.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numbers::floor_f64_to_u32;

/// Every profession a subject can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectType {
    Idle,
    Worker,
    Soldier,
    Farmer,
    Captain,
}

impl SubjectType {
    /// All categories in ledger order. Weighted picks walk this order.
    pub const ALL: [Self; 5] = [
        Self::Idle,
        Self::Worker,
        Self::Soldier,
        Self::Farmer,
        Self::Captain,
    ];

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Idle => 0,
            Self::Worker => 1,
            Self::Soldier => 2,
            Self::Farmer => 3,
            Self::Captain => 4,
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Worker => "Worker",
            Self::Soldier => "Soldier",
            Self::Farmer => "Farmer",
            Self::Captain => "Captain",
        }
    }

    #[must_use]
    pub const fn is_civilian(self) -> bool {
        !self.is_military()
    }

    #[must_use]
    pub const fn is_military(self) -> bool {
        matches!(self, Self::Soldier | Self::Captain)
    }

    /// Gold needed to turn one idle subject into this type, before marginal growth.
    #[must_use]
    pub const fn base_equipment_cost(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::Worker => 3,
            Self::Soldier => 2,
            Self::Farmer => 6,
            Self::Captain => 20,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Counts per subject category with a maintained total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Population {
    counts: [u32; 5],
    total: u32,
}

impl Population {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counts: [0; 5],
            total: 0,
        }
    }

    /// Build a population from `(type, count)` pairs.
    #[must_use]
    pub fn from_counts(entries: &[(SubjectType, u32)]) -> Self {
        let mut pop = Self::new();
        for &(subject, count) in entries {
            pop.add_many(subject, count);
        }
        pop
    }

    #[must_use]
    pub const fn count(&self, subject: SubjectType) -> u32 {
        self.counts[subject.index()]
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total == 0
    }

    #[must_use]
    pub fn civilians(&self) -> u32 {
        SubjectType::ALL
            .into_iter()
            .filter(|s| s.is_civilian())
            .map(|s| self.count(s))
            .sum()
    }

    #[must_use]
    pub fn military(&self) -> u32 {
        self.count(SubjectType::Soldier) + self.count(SubjectType::Captain)
    }

    pub fn add(&mut self, subject: SubjectType) {
        self.add_many(subject, 1);
    }

    pub fn add_many(&mut self, subject: SubjectType, count: u32) {
        self.counts[subject.index()] += count;
        self.total += count;
    }

    /// Remove one subject. Returns `false` and leaves the ledger untouched when
    /// none of that type is present.
    pub fn remove(&mut self, subject: SubjectType) -> bool {
        self.remove_many(subject, 1)
    }

    /// Remove `count` subjects, all or nothing.
    pub fn remove_many(&mut self, subject: SubjectType, count: u32) -> bool {
        let slot = &mut self.counts[subject.index()];
        if *slot < count {
            return false;
        }
        *slot -= count;
        self.total -= count;
        true
    }

    pub fn add_all(&mut self, other: &Self) {
        for subject in SubjectType::ALL {
            self.add_many(subject, other.count(subject));
        }
    }

    /// Subtract every category of `other`, saturating at zero. Returns `false`
    /// if any category would have gone negative.
    pub fn subtract_all(&mut self, other: &Self) -> bool {
        let mut exact = true;
        for subject in SubjectType::ALL {
            let have = self.count(subject);
            let take = other.count(subject);
            if take > have {
                exact = false;
            }
            let taken = take.min(have);
            self.counts[subject.index()] = have - taken;
            self.total -= taken;
        }
        exact
    }

    /// Remove and return everything in the given categories.
    pub fn drain_where(&mut self, keep: impl Fn(SubjectType) -> bool) -> Self {
        let mut out = Self::new();
        for subject in SubjectType::ALL {
            if keep(subject) {
                let count = self.count(subject);
                out.add_many(subject, count);
                self.counts[subject.index()] = 0;
                self.total -= count;
            }
        }
        out
    }

    /// Pick a category present in this population with probability
    /// proportional to its count, considering only categories accepted by
    /// `filter`. Categories are walked in [`SubjectType::ALL`] order, so the
    /// outcome is fully determined by the roll.
    pub fn weighted_pick<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        filter: impl Fn(SubjectType) -> bool,
    ) -> Option<SubjectType> {
        let eligible: u32 = SubjectType::ALL
            .into_iter()
            .filter(|s| filter(*s))
            .map(|s| self.count(s))
            .sum();
        if eligible == 0 {
            return None;
        }
        let scaled = rng.r#gen::<f64>() * f64::from(eligible);
        let mut roll = floor_f64_to_u32(scaled).min(eligible - 1);
        for subject in SubjectType::ALL {
            if !filter(subject) {
                continue;
            }
            let count = self.count(subject);
            if roll < count {
                return Some(subject);
            }
            roll -= count;
        }
        None
    }

    /// Weighted pick over every category.
    pub fn weighted_random_subject<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SubjectType> {
        self.weighted_pick(rng, |_| true)
    }

    /// Recompute the total from the counts; used to check snapshots.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.counts.iter().sum::<u32>() == self.total
    }

    pub fn iter(&self) -> impl Iterator<Item = (SubjectType, u32)> + '_ {
        SubjectType::ALL.into_iter().map(|s| (s, self.count(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn add_and_remove_track_total() {
        let mut pop = Population::new();
        pop.add(SubjectType::Idle);
        pop.add_many(SubjectType::Soldier, 3);
        assert_eq!(pop.total(), 4);
        assert!(pop.remove(SubjectType::Soldier));
        assert!(!pop.remove(SubjectType::Farmer));
        assert_eq!(pop.total(), 3);
        assert_eq!(pop.military(), 2);
        assert_eq!(pop.civilians(), 1);
        assert!(pop.is_consistent());
    }

    #[test]
    fn subtract_all_saturates_and_reports() {
        let mut base = Population::from_counts(&[(SubjectType::Idle, 2), (SubjectType::Worker, 1)]);
        let other = Population::from_counts(&[(SubjectType::Idle, 1), (SubjectType::Worker, 2)]);
        assert!(!base.subtract_all(&other));
        assert_eq!(base.count(SubjectType::Idle), 1);
        assert_eq!(base.count(SubjectType::Worker), 0);
        assert_eq!(base.total(), 1);
    }

    #[test]
    fn drain_where_moves_military_only() {
        let mut pop = Population::from_counts(&[
            (SubjectType::Idle, 2),
            (SubjectType::Soldier, 3),
            (SubjectType::Captain, 1),
        ]);
        let army = pop.drain_where(SubjectType::is_military);
        assert_eq!(army.total(), 4);
        assert_eq!(pop.total(), 2);
        assert_eq!(pop.military(), 0);
    }

    #[test]
    fn weighted_pick_walks_categories_in_order() {
        let pop = Population::from_counts(&[(SubjectType::Worker, 2), (SubjectType::Farmer, 1)]);
        // A zero roll lands on the first populated category.
        let mut low = StepRng::new(0, 0);
        assert_eq!(pop.weighted_random_subject(&mut low), Some(SubjectType::Worker));
        // A maximal roll lands on the last populated category.
        let mut high = StepRng::new(u64::MAX, 0);
        assert_eq!(pop.weighted_random_subject(&mut high), Some(SubjectType::Farmer));
    }

    #[test]
    fn weighted_pick_respects_filter_and_weights() {
        let pop = Population::from_counts(&[
            (SubjectType::Idle, 9),
            (SubjectType::Worker, 1),
            (SubjectType::Soldier, 50),
        ]);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let mut idle = 0;
        for _ in 0..1_000 {
            match pop.weighted_pick(&mut rng, SubjectType::is_civilian) {
                Some(SubjectType::Idle) => idle += 1,
                Some(SubjectType::Worker) => {}
                other => panic!("unexpected pick {other:?}"),
            }
        }
        assert!(idle > 820, "idle picked {idle} times");
        assert_eq!(Population::new().weighted_random_subject(&mut rng), None);
    }

    #[test]
    fn subject_metadata() {
        assert!(SubjectType::Farmer.is_civilian());
        assert!(SubjectType::Captain.is_military());
        assert_eq!(SubjectType::Captain.base_equipment_cost(), 20);
        assert_eq!(SubjectType::Worker.to_string(), "Worker");
    }
}
