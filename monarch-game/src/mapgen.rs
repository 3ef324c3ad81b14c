//! Procedural map generation.
//!
//! Lanes grow breadth-first from the root. Once the tree is frozen the
//! generator annotates it with peddler sites, intermediate stronghold sites,
//! arable land and gold veins.

use log::{debug, warn};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::fmt;

use crate::error::MapGenConfigError;
use crate::map::{Direction, GridPos, Map, NodeId};
use crate::numbers::{round_f64_to_u32, usize_to_f64};

const DEFAULT_MAPGEN_DATA: &str = include_str!("../assets/mapgen.json");

/// Branching and stronghold density preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MapDifficulty {
    Easy,
    #[default]
    Moderate,
    Hard,
}

impl MapDifficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Moderate, Self::Hard];

    /// Menu index (0-based) to preset; out-of-range indices clamp.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

impl fmt::Display for MapDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
        })
    }
}

/// Lane length and resource count preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum MapSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl MapSize {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

impl fmt::Display for MapSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeTuning {
    pub min_lane_depth: u32,
    pub max_lane_depth: u32,
    pub lane_end_chance: f64,
    pub min_peddlers: u32,
    pub max_peddlers: u32,
    pub max_econ_spacing: u32,
}

impl SizeTuning {
    fn small() -> Self {
        Self {
            min_lane_depth: 5,
            max_lane_depth: 10,
            lane_end_chance: 0.26,
            min_peddlers: 2,
            max_peddlers: 3,
            max_econ_spacing: 10,
        }
    }

    fn medium() -> Self {
        Self {
            min_lane_depth: 8,
            max_lane_depth: 15,
            lane_end_chance: 0.21,
            min_peddlers: 3,
            max_peddlers: 5,
            max_econ_spacing: 12,
        }
    }

    fn large() -> Self {
        Self {
            min_lane_depth: 11,
            max_lane_depth: 20,
            lane_end_chance: 0.17,
            min_peddlers: 5,
            max_peddlers: 7,
            max_econ_spacing: 14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyTuning {
    /// Rolls below this seed two root lanes.
    pub two_lanes_below: f64,
    /// Rolls below this (and not below the first) seed three; otherwise four.
    pub three_lanes_below: f64,
    pub fork_chance: f64,
    pub double_fork_chance: f64,
    pub corner_chance: f64,
    pub stronghold_fraction_min: f64,
    pub stronghold_fraction_max: f64,
    pub intermediate_chance: f64,
}

impl DifficultyTuning {
    fn easy() -> Self {
        Self {
            two_lanes_below: 0.8,
            three_lanes_below: 0.98,
            fork_chance: 0.14,
            double_fork_chance: 0.02,
            corner_chance: 0.07,
            stronghold_fraction_min: 0.15,
            stronghold_fraction_max: 0.45,
            intermediate_chance: 0.1,
        }
    }

    fn moderate() -> Self {
        Self {
            two_lanes_below: 0.7,
            three_lanes_below: 0.97,
            fork_chance: 0.17,
            double_fork_chance: 0.03,
            corner_chance: 0.07,
            stronghold_fraction_min: 0.25,
            stronghold_fraction_max: 0.75,
            intermediate_chance: 0.1,
        }
    }

    fn hard() -> Self {
        Self {
            two_lanes_below: 0.5,
            three_lanes_below: 0.9,
            fork_chance: 0.21,
            double_fork_chance: 0.05,
            corner_chance: 0.07,
            stronghold_fraction_min: 0.4,
            stronghold_fraction_max: 0.9,
            intermediate_chance: 0.15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeddlerTuning {
    #[serde(default = "PeddlerTuning::default_min_depth")]
    pub min_depth: u32,
    /// At or beyond this depth a peddler is always placed.
    #[serde(default = "PeddlerTuning::default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "PeddlerTuning::default_chance")]
    pub chance: f64,
}

impl PeddlerTuning {
    const fn default_min_depth() -> u32 {
        3
    }

    const fn default_max_depth() -> u32 {
        8
    }

    const fn default_chance() -> f64 {
        0.35
    }
}

impl Default for PeddlerTuning {
    fn default() -> Self {
        Self {
            min_depth: Self::default_min_depth(),
            max_depth: Self::default_max_depth(),
            chance: Self::default_chance(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconTuning {
    /// Hops from the previous resource that must be exceeded before another
    /// may be placed.
    #[serde(default = "EconTuning::default_min_spacing")]
    pub min_spacing: u32,
    #[serde(default = "EconTuning::default_frequency")]
    pub frequency: f64,
    #[serde(default = "EconTuning::default_farm_share")]
    pub farm_share: f64,
    /// At least one resource is guaranteed within this many hops of the root.
    #[serde(default = "EconTuning::default_fallback_radius")]
    pub fallback_radius: u32,
}

impl EconTuning {
    const fn default_min_spacing() -> u32 {
        2
    }

    const fn default_frequency() -> f64 {
        0.2
    }

    const fn default_farm_share() -> f64 {
        0.5
    }

    const fn default_fallback_radius() -> u32 {
        4
    }
}

impl Default for EconTuning {
    fn default() -> Self {
        Self {
            min_spacing: Self::default_min_spacing(),
            frequency: Self::default_frequency(),
            farm_share: Self::default_farm_share(),
            fallback_radius: Self::default_fallback_radius(),
        }
    }
}

/// Generator tuning tables, keyed by [`MapSize`] and [`MapDifficulty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapGenConfig {
    #[serde(default = "SizeTuning::small")]
    pub small: SizeTuning,
    #[serde(default = "SizeTuning::medium")]
    pub medium: SizeTuning,
    #[serde(default = "SizeTuning::large")]
    pub large: SizeTuning,
    #[serde(default = "DifficultyTuning::easy")]
    pub easy: DifficultyTuning,
    #[serde(default = "DifficultyTuning::moderate")]
    pub moderate: DifficultyTuning,
    #[serde(default = "DifficultyTuning::hard")]
    pub hard: DifficultyTuning,
    #[serde(default)]
    pub peddlers: PeddlerTuning,
    #[serde(default = "MapGenConfig::default_min_intermediate_depth")]
    pub min_intermediate_depth: u32,
    #[serde(default)]
    pub econ: EconTuning,
}

impl Default for MapGenConfig {
    fn default() -> Self {
        Self {
            small: SizeTuning::small(),
            medium: SizeTuning::medium(),
            large: SizeTuning::large(),
            easy: DifficultyTuning::easy(),
            moderate: DifficultyTuning::moderate(),
            hard: DifficultyTuning::hard(),
            peddlers: PeddlerTuning::default(),
            min_intermediate_depth: Self::default_min_intermediate_depth(),
            econ: EconTuning::default(),
        }
    }
}

impl MapGenConfig {
    const fn default_min_intermediate_depth() -> u32 {
        7
    }

    /// Load the bundled tuning, falling back to the in-code defaults if the
    /// asset is missing or invalid.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(DEFAULT_MAPGEN_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse and validate a tuning table.
    ///
    /// # Errors
    ///
    /// Returns [`MapGenConfigError`] when the JSON is malformed or a table
    /// violates a range invariant.
    pub fn from_json(data: &str) -> Result<Self, MapGenConfigError> {
        let config: Self =
            serde_json::from_str(data).map_err(|err| MapGenConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub const fn size(&self, size: MapSize) -> &SizeTuning {
        match size {
            MapSize::Small => &self.small,
            MapSize::Medium => &self.medium,
            MapSize::Large => &self.large,
        }
    }

    #[must_use]
    pub const fn difficulty(&self, difficulty: MapDifficulty) -> &DifficultyTuning {
        match difficulty {
            MapDifficulty::Easy => &self.easy,
            MapDifficulty::Moderate => &self.moderate,
            MapDifficulty::Hard => &self.hard,
        }
    }

    /// Check every table for range invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), MapGenConfigError> {
        for (name, size) in [
            ("small", &self.small),
            ("medium", &self.medium),
            ("large", &self.large),
        ] {
            check_probability(name, "lane_end_chance", size.lane_end_chance)?;
            if size.min_lane_depth < 1 {
                return Err(MapGenConfigError::MinViolation {
                    field: "min_lane_depth",
                    min: 1,
                    value: size.min_lane_depth,
                });
            }
            check_ordered(
                "lane_depth",
                f64::from(size.min_lane_depth),
                f64::from(size.max_lane_depth),
            )?;
            check_ordered(
                "peddlers",
                f64::from(size.min_peddlers),
                f64::from(size.max_peddlers),
            )?;
        }
        for (name, tuning) in [
            ("easy", &self.easy),
            ("moderate", &self.moderate),
            ("hard", &self.hard),
        ] {
            check_probability(name, "two_lanes_below", tuning.two_lanes_below)?;
            check_probability(name, "three_lanes_below", tuning.three_lanes_below)?;
            check_probability(name, "fork_chance", tuning.fork_chance)?;
            check_probability(name, "double_fork_chance", tuning.double_fork_chance)?;
            check_probability(name, "corner_chance", tuning.corner_chance)?;
            check_probability(name, "stronghold_fraction_min", tuning.stronghold_fraction_min)?;
            check_probability(name, "stronghold_fraction_max", tuning.stronghold_fraction_max)?;
            check_probability(name, "intermediate_chance", tuning.intermediate_chance)?;
            check_ordered("root_lanes", tuning.two_lanes_below, tuning.three_lanes_below)?;
            check_ordered(
                "stronghold_fraction",
                tuning.stronghold_fraction_min,
                tuning.stronghold_fraction_max,
            )?;
        }
        check_probability("peddlers", "chance", self.peddlers.chance)?;
        check_ordered(
            "peddler_depth",
            f64::from(self.peddlers.min_depth),
            f64::from(self.peddlers.max_depth),
        )?;
        check_probability("econ", "frequency", self.econ.frequency)?;
        check_probability("econ", "farm_share", self.econ.farm_share)?;
        if self.econ.min_spacing < 1 {
            return Err(MapGenConfigError::MinViolation {
                field: "econ.min_spacing",
                min: 1,
                value: self.econ.min_spacing,
            });
        }
        Ok(())
    }
}

fn check_probability(table: &str, field: &'static str, value: f64) -> Result<(), MapGenConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        debug!("mapgen table {table} rejected: {field} = {value}");
        Err(MapGenConfigError::Probability { field, value })
    }
}

fn check_ordered(field: &'static str, min: f64, max: f64) -> Result<(), MapGenConfigError> {
    if min > max {
        Err(MapGenConfigError::InvertedRange { field, min, max })
    } else {
        Ok(())
    }
}

/// Build a fully annotated map.
pub fn generate<R: Rng + ?Sized>(
    config: &MapGenConfig,
    difficulty: MapDifficulty,
    size: MapSize,
    rng: &mut R,
) -> Map {
    let mut generator = Generator {
        size: config.size(size),
        difficulty: config.difficulty(difficulty),
        config,
        rng,
    };
    let mut map = generator.grow_lanes();
    generator.add_peddlers(&mut map);
    generator.add_intermediate_strongholds(&mut map);
    generator.add_farms_and_gold_veins(&mut map);
    debug!(
        "generated {size} {difficulty} map: {} nodes, {} leaves, {} peddlers, {} intermediate strongholds, {} arable, {} veins",
        map.len(),
        map.leaves().len(),
        map.peddler_sites().len(),
        map.intermediate_stronghold_sites().len(),
        map.arable_land().len(),
        map.gold_veins().len(),
    );
    map
}

struct Generator<'a, R: Rng + ?Sized> {
    config: &'a MapGenConfig,
    size: &'a SizeTuning,
    difficulty: &'a DifficultyTuning,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> Generator<'_, R> {
    fn roll(&mut self) -> f64 {
        self.rng.r#gen::<f64>()
    }

    // Topology ---------------------------------------------------------------

    fn grow_lanes(&mut self) -> Map {
        let origin = GridPos::new(0, 0);
        let mut map = Map::with_root(origin);
        let mut occupied: HashSet<GridPos> = HashSet::from([origin]);
        let mut queue = VecDeque::new();

        let mut directions = Direction::ALL;
        directions.shuffle(self.rng);
        let lanes = self.root_lane_count();
        for direction in directions.into_iter().take(lanes) {
            let pos = origin.step(direction);
            occupied.insert(pos);
            queue.push_back(map.add_child(NodeId::ROOT, pos));
        }

        while let Some(node) = queue.pop_front() {
            let depth = map.depth(node);
            if depth >= self.size.max_lane_depth {
                continue;
            }
            if depth > self.size.min_lane_depth && self.roll() < self.size.lane_end_chance {
                continue;
            }
            for _ in 0..self.child_count() {
                if let Some(pos) = self.child_location(&map, &occupied, node) {
                    occupied.insert(pos);
                    queue.push_back(map.add_child(node, pos));
                }
            }
        }
        map
    }

    fn root_lane_count(&mut self) -> usize {
        let roll = self.roll();
        if roll < self.difficulty.two_lanes_below {
            2
        } else if roll < self.difficulty.three_lanes_below {
            3
        } else {
            4
        }
    }

    fn child_count(&mut self) -> usize {
        if self.roll() < self.difficulty.double_fork_chance {
            return 3;
        }
        if self.roll() < self.difficulty.fork_chance {
            return 2;
        }
        1
    }

    /// Highest-priority free grid cell next to `node`, or `None` for a dead end.
    fn child_location(
        &mut self,
        map: &Map,
        occupied: &HashSet<GridPos>,
        node: NodeId,
    ) -> Option<GridPos> {
        let pos = map.position(node);
        let parent_pos = map.parent(node).map(|parent| map.position(parent))?;
        let back = Direction::between(pos, parent_pos)?;
        let straight = back.opposite();

        let mut directions: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|dir| *dir != back && *dir != straight)
            .collect();
        directions.shuffle(self.rng);
        if self.roll() < self.difficulty.corner_chance {
            directions.push(straight);
        } else {
            directions.insert(0, straight);
        }

        directions
            .into_iter()
            .map(|dir| pos.step(dir))
            .find(|candidate| !occupied.contains(candidate))
    }

    // Peddlers ---------------------------------------------------------------

    fn add_peddlers(&mut self, map: &mut Map) {
        let total = self
            .rng
            .gen_range(self.size.min_peddlers..=self.size.max_peddlers);
        let lanes = map.children(NodeId::ROOT).to_vec();
        for (lane, share) in lanes.iter().zip(apportion(total, lanes.len())) {
            if share > 0 {
                self.place_peddlers_on_lane(map, *lane, share);
            }
        }
    }

    fn place_peddlers_on_lane(&mut self, map: &mut Map, node: NodeId, mut remaining: u32) {
        if map.is_leaf(node) {
            return;
        }
        let depth = map.depth(node);
        let tuning = &self.config.peddlers;
        if depth >= tuning.min_depth {
            let forced = depth >= tuning.max_depth;
            let chance = tuning.chance;
            if forced || self.roll() < chance {
                map.mark_peddler_site(node);
                remaining -= 1;
                if remaining == 0 {
                    return;
                }
            }
        }
        let children = map.children(node).to_vec();
        for (child, share) in children.iter().zip(apportion(remaining, children.len())) {
            if share > 0 {
                self.place_peddlers_on_lane(map, *child, share);
            }
        }
    }

    // Strongholds ------------------------------------------------------------

    fn add_intermediate_strongholds(&mut self, map: &mut Map) {
        let mut leaves = map.leaves();
        leaves.shuffle(self.rng);
        let span = self.difficulty.stronghold_fraction_max - self.difficulty.stronghold_fraction_min;
        let fraction = span.mul_add(self.roll(), self.difficulty.stronghold_fraction_min);
        let wanted = round_f64_to_u32(usize_to_f64(leaves.len()) * fraction);
        for leaf in leaves.into_iter().take(wanted as usize) {
            if let Some(parent) = map.parent(leaf) {
                self.place_intermediate_stronghold(map, parent);
            }
        }
    }

    /// Walk upward from `start` until a node passes the depth/probability test.
    /// The root and its children never host one, peddler sites are skipped and
    /// a node already marked ends the walk.
    fn place_intermediate_stronghold(&mut self, map: &mut Map, start: NodeId) {
        let mut node = start;
        loop {
            let depth = map.depth(node);
            if depth < 2 || map.is_intermediate_stronghold_site(node) {
                return;
            }
            if !map.is_peddler_site(node)
                && (depth <= self.config.min_intermediate_depth
                    || self.roll() < self.difficulty.intermediate_chance)
            {
                map.mark_intermediate_stronghold(node);
                return;
            }
            match map.parent(node) {
                Some(parent) => node = parent,
                None => return,
            }
        }
    }

    // Economy ----------------------------------------------------------------

    fn add_farms_and_gold_veins(&mut self, map: &mut Map) {
        let lanes = map.children(NodeId::ROOT).to_vec();
        for lane in lanes {
            self.place_econ_on_lane(map, lane);
        }
        self.ensure_econ_near_root(map);
    }

    fn is_econ_candidate(map: &Map, node: NodeId) -> bool {
        !map.is_leaf(node)
            && !map.is_intermediate_stronghold_site(node)
            && !map.is_peddler_site(node)
    }

    fn place_econ_on_lane(&mut self, map: &mut Map, lane: NodeId) {
        let econ = self.config.econ.clone();
        let max_spacing = self.size.max_econ_spacing;
        let mut stack = vec![(lane, 1_u32)];
        while let Some((node, since_last)) = stack.pop() {
            let mut placed = false;
            if Self::is_econ_candidate(map, node) {
                if since_last >= max_spacing {
                    placed = true;
                } else if since_last > econ.min_spacing {
                    placed = self.roll() <= econ.frequency;
                }
                if placed {
                    self.place_resource(map, node);
                }
            }
            let next = if placed { 1 } else { since_last + 1 };
            for child in map.children(node).iter().rev() {
                stack.push((*child, next));
            }
        }
    }

    fn place_resource(&mut self, map: &mut Map, node: NodeId) {
        if self.roll() < self.config.econ.farm_share {
            map.mark_arable(node);
        } else {
            map.mark_gold_vein(node);
        }
    }

    fn ensure_econ_near_root(&mut self, map: &mut Map) {
        let radius = self.config.econ.fallback_radius;
        let mut nearby = Vec::new();
        let mut queue: VecDeque<NodeId> = map.children(NodeId::ROOT).iter().copied().collect();
        while let Some(node) = queue.pop_front() {
            if map.is_economic_site(node) {
                return;
            }
            if Self::is_econ_candidate(map, node) {
                nearby.push(node);
            }
            if map.depth(node) < radius {
                queue.extend(map.children(node).iter().copied());
            }
        }
        match nearby.choose(self.rng).copied() {
            Some(node) => self.place_resource(map, node),
            None => warn!("no room for an economic resource within {radius} hops of the root"),
        }
    }
}

/// Split `total` across `slots` as evenly as possible, earlier slots taking
/// the remainder.
fn apportion(total: u32, slots: usize) -> Vec<u32> {
    let Ok(count) = u32::try_from(slots) else {
        return Vec::new();
    };
    if count == 0 {
        return Vec::new();
    }
    let base = total / count;
    let extra = total % count;
    (0..count).map(|i| base + u32::from(i < extra)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn bundled_asset_matches_in_code_defaults() {
        let loaded = MapGenConfig::from_json(DEFAULT_MAPGEN_DATA).expect("asset parses");
        assert_eq!(loaded, MapGenConfig::default());
        assert_eq!(MapGenConfig::load_from_static(), MapGenConfig::default());
    }

    #[test]
    fn validation_rejects_bad_tables() {
        let mut config = MapGenConfig::default();
        config.hard.fork_chance = 1.5;
        assert!(matches!(
            config.validate(),
            Err(MapGenConfigError::Probability {
                field: "fork_chance",
                ..
            })
        ));
        let mut config = MapGenConfig::default();
        config.small.min_lane_depth = 12;
        assert!(matches!(
            config.validate(),
            Err(MapGenConfigError::InvertedRange {
                field: "lane_depth",
                ..
            })
        ));
        assert!(matches!(
            MapGenConfig::from_json("{not json"),
            Err(MapGenConfigError::Parse(_))
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = MapGenConfig::from_json(r#"{"min_intermediate_depth": 9}"#).expect("valid");
        assert_eq!(config.min_intermediate_depth, 9);
        assert_eq!(config.large, SizeTuning::large());
    }

    #[test]
    fn apportion_spreads_remainder_first() {
        assert_eq!(apportion(5, 2), vec![3, 2]);
        assert_eq!(apportion(2, 3), vec![1, 1, 0]);
        assert!(apportion(4, 0).is_empty());
    }

    #[test]
    fn generated_maps_are_trees_with_valid_annotations() {
        let config = MapGenConfig::default();
        for seed in 0..24_u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let difficulty = MapDifficulty::from_index(usize::try_from(seed % 3).unwrap_or(0));
            let size = MapSize::from_index(usize::try_from(seed / 3 % 3).unwrap_or(0));
            let map = generate(&config, difficulty, size, &mut rng);
            assert!(map.is_well_formed(), "seed {seed}");
            let root_lanes = map.children(NodeId::ROOT).len();
            assert!((2..=4).contains(&root_lanes));
            let max_depth = config.size(size).max_lane_depth;
            assert!(map.nodes().iter().all(|n| n.depth <= max_depth));
            for site in map.intermediate_stronghold_sites() {
                assert!(map.depth(*site) >= 2);
                assert!(!map.is_leaf(*site));
                assert!(!map.is_peddler_site(*site));
            }
            for site in map.peddler_sites() {
                assert!(!map.is_leaf(*site));
                assert!(map.depth(*site) >= config.peddlers.min_depth);
            }
        }
    }

    #[test]
    fn econ_resources_keep_minimum_spacing_along_lanes() {
        let config = MapGenConfig::default();
        for seed in 100..116_u64 {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            let map = generate(&config, MapDifficulty::Moderate, MapSize::Medium, &mut rng);
            let econ: Vec<NodeId> = map
                .node_ids()
                .filter(|id| map.is_economic_site(*id))
                .collect();
            assert!(!econ.is_empty(), "seed {seed} has no economy");
            for id in &econ {
                assert!(!map.is_leaf(*id));
                assert!(!(map.is_arable(*id) && map.is_gold_vein(*id)));
            }
        }
    }

    #[test]
    fn generation_is_reproducible_for_a_seed() {
        let config = MapGenConfig::default();
        let a = generate(
            &config,
            MapDifficulty::Hard,
            MapSize::Large,
            &mut ChaCha20Rng::seed_from_u64(9),
        );
        let b = generate(
            &config,
            MapDifficulty::Hard,
            MapSize::Large,
            &mut ChaCha20Rng::seed_from_u64(9),
        );
        assert_eq!(a, b);
    }
}
