//! The serialisable game state: one root object owning every entity table.
//!
//! Population bookkeeping lives here so that the kingdom-wide aggregate can
//! only be changed together with the per-node, retinue or special-retinue
//! ledgers it summarises.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::combat::{FrontierAttack, Sortie, Stronghold, garrison_strength};
use crate::constants::{
    CITY_EXCLUSION_DISTANCE, DEFENSE_PER_SOLDIER, MARGINAL_EQUIP_COST_SOLDIER,
    MARGINAL_EQUIP_COST_WORKER, MAX_SOLDIER_EQUIP_COST, NIGHT_TO_DAY_RATIO, PURSE_SIZES,
    RETINUE_LIMITS, RULER_BASE_MOVE_SPEED, RULER_SPEED_BONUSES, WALLLESS_DEFENSE, by_level,
};
use crate::error::GameOver;
use crate::housing::{GrowthModifier, HousingTracker};
use crate::map::{Heading, Map, MapEdge, NodeId, Point};
use crate::numbers::{floor_f64_to_u32, round_f64_to_u32};
use crate::population::{Population, SubjectType};
use crate::settings::GameSettings;
use crate::settlement::{Settlement, SettlementType};
use crate::wall::Wall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DayPhase {
    #[default]
    Day,
    Night,
}

/// Day counter plus the fraction of the current phase already elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calendar {
    pub day: u32,
    pub phase: DayPhase,
    pub progress: f64,
}

impl Default for Calendar {
    fn default() -> Self {
        Self {
            day: 1,
            phase: DayPhase::Day,
            progress: 0.0,
        }
    }
}

impl Calendar {
    #[must_use]
    pub fn is_daytime(&self) -> bool {
        self.phase == DayPhase::Day
    }
}

/// Where the ruler is: parked on a node or somewhere along a road.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RulerPosition {
    AtNode(NodeId),
    /// Heading towards `edge.to`; `traveled` is measured from `edge.from`.
    InTransit { edge: MapEdge, traveled: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ruler {
    pub position: RulerPosition,
    pub heading: Heading,
    /// Purse contents.
    pub gold: u32,
}

/// A temporarily detached army outside the normal retinue cap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialRetinue {
    pub name: String,
    pub members: Population,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub settings: GameSettings,
    pub map: Map,
    pub calendar: Calendar,
    pub ruler: Ruler,
    pub danger: f64,
    pub explored: BTreeSet<NodeId>,
    captured: BTreeSet<NodeId>,
    pub captured_this_turn: BTreeSet<NodeId>,
    settlements: BTreeMap<NodeId, Settlement>,
    pub walls: BTreeMap<NodeId, Wall>,
    pub strongholds: BTreeMap<NodeId, Stronghold>,
    pub attacks: BTreeMap<NodeId, FrontierAttack>,
    pub sorties: BTreeMap<NodeId, Sortie>,
    /// Gold left in each vein.
    pub gold_veins: BTreeMap<NodeId, u32>,
    populations: Vec<Population>,
    retinue: Population,
    special_retinue: Option<SpecialRetinue>,
    kingdom: Population,
    housing: HousingTracker,
    pub outcome: Option<GameOver>,
}

impl GameState {
    /// An empty world over `map`: nothing explored, captured or built.
    #[must_use]
    pub fn new(settings: GameSettings, map: Map) -> Self {
        let populations = vec![Population::new(); map.len()];
        Self {
            settings,
            calendar: Calendar::default(),
            ruler: Ruler {
                position: RulerPosition::AtNode(map.root()),
                heading: Heading::default(),
                gold: 0,
            },
            map,
            danger: 0.0,
            explored: BTreeSet::new(),
            captured: BTreeSet::new(),
            captured_this_turn: BTreeSet::new(),
            settlements: BTreeMap::new(),
            walls: BTreeMap::new(),
            strongholds: BTreeMap::new(),
            attacks: BTreeMap::new(),
            sorties: BTreeMap::new(),
            gold_veins: BTreeMap::new(),
            populations,
            retinue: Population::new(),
            special_retinue: None,
            kingdom: Population::new(),
            housing: HousingTracker::default(),
            outcome: None,
        }
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn is_daytime(&self) -> bool {
        self.calendar.is_daytime()
    }

    // Capture ----------------------------------------------------------------

    #[must_use]
    pub fn is_captured(&self, node: NodeId) -> bool {
        self.captured.contains(&node)
    }

    #[must_use]
    pub fn is_explored(&self, node: NodeId) -> bool {
        self.explored.contains(&node)
    }

    #[must_use]
    pub const fn captured_nodes(&self) -> &BTreeSet<NodeId> {
        &self.captured
    }

    /// Bring `node` and its resident population into the kingdom.
    pub fn mark_captured(&mut self, node: NodeId) {
        if self.captured.insert(node) {
            let resident = self.populations[node.index()];
            self.kingdom.add_all(&resident);
        }
    }

    /// Drop `node` from the kingdom, taking whoever still lives there with it.
    pub fn mark_uncaptured(&mut self, node: NodeId) {
        if self.captured.remove(&node) {
            let resident = self.populations[node.index()];
            if !self.kingdom.subtract_all(&resident) {
                warn!("kingdom ledger short while releasing {node}");
            }
        }
        self.captured_this_turn.remove(&node);
    }

    // Settlements ------------------------------------------------------------

    #[must_use]
    pub fn settlement(&self, node: NodeId) -> Option<&Settlement> {
        self.settlements.get(&node)
    }

    pub fn settlement_mut(&mut self, node: NodeId) -> Option<&mut Settlement> {
        self.settlements.get_mut(&node)
    }

    #[must_use]
    pub const fn settlements(&self) -> &BTreeMap<NodeId, Settlement> {
        &self.settlements
    }

    /// Place a settlement and let it pick up any farmers already living there.
    pub fn insert_settlement(&mut self, node: NodeId, mut settlement: Settlement) {
        let farmers = self.populations[node.index()].count(SubjectType::Farmer);
        for _ in 0..farmers {
            settlement.on_subject_added(SubjectType::Farmer);
        }
        self.settlements.insert(node, settlement);
    }

    pub fn remove_settlement(&mut self, node: NodeId) -> Option<Settlement> {
        self.settlements.remove(&node)
    }

    #[must_use]
    pub fn capital(&self) -> Option<&Settlement> {
        self.settlements
            .get(&self.map.root())
            .filter(|s| s.settlement_type() == SettlementType::Capital)
    }

    pub fn capital_mut(&mut self) -> Option<&mut Settlement> {
        let root = self.map.root();
        self.settlements
            .get_mut(&root)
            .filter(|s| s.settlement_type() == SettlementType::Capital)
    }

    /// Level of the capital; `1` if it is somehow missing.
    #[must_use]
    pub fn capital_level(&self) -> u8 {
        self.capital().map_or(1, Settlement::level)
    }

    /// A City or Capital within the exclusion radius of `node`.
    #[must_use]
    pub fn is_too_close_to_city(&self, node: NodeId) -> bool {
        self.map
            .within_hops(node, CITY_EXCLUSION_DISTANCE)
            .into_iter()
            .filter_map(|near| self.settlements.get(&near))
            .any(|s| s.settlement_type().is_urban())
    }

    // Population ledger ------------------------------------------------------

    #[must_use]
    pub fn population(&self, node: NodeId) -> &Population {
        &self.populations[node.index()]
    }

    #[must_use]
    pub const fn retinue(&self) -> &Population {
        &self.retinue
    }

    #[must_use]
    pub const fn special_retinue(&self) -> Option<&SpecialRetinue> {
        self.special_retinue.as_ref()
    }

    #[must_use]
    pub const fn kingdom(&self) -> &Population {
        &self.kingdom
    }

    pub fn add_subjects(&mut self, node: NodeId, subject: SubjectType, count: u32) {
        if count == 0 {
            return;
        }
        self.populations[node.index()].add_many(subject, count);
        if self.captured.contains(&node) {
            self.kingdom.add_many(subject, count);
        }
        if let Some(settlement) = self.settlements.get_mut(&node) {
            for _ in 0..count {
                settlement.on_subject_added(subject);
            }
        }
    }

    /// Remove `count` subjects of one type from a node, all or nothing.
    pub fn remove_subjects(&mut self, node: NodeId, subject: SubjectType, count: u32) -> bool {
        if count == 0 {
            return true;
        }
        let pop = &mut self.populations[node.index()];
        if !pop.remove_many(subject, count) {
            return false;
        }
        let remaining = pop.count(SubjectType::Farmer);
        if self.captured.contains(&node) && !self.kingdom.remove_many(subject, count) {
            warn!("kingdom ledger short of {subject} while removing from {node}");
        }
        if let Some(settlement) = self.settlements.get_mut(&node) {
            settlement.on_subject_removed(subject, remaining);
        }
        true
    }

    pub fn move_subjects(&mut self, from: NodeId, to: NodeId, subject: SubjectType, count: u32) -> bool {
        if !self.remove_subjects(from, subject, count) {
            return false;
        }
        self.add_subjects(to, subject, count);
        true
    }

    /// Move every subject of the accepted categories from one node to another.
    pub fn move_where(&mut self, from: NodeId, to: NodeId, keep: impl Fn(SubjectType) -> bool) {
        let moving = *self.population(from);
        for (subject, count) in moving.iter() {
            if keep(subject) && count > 0 {
                self.move_subjects(from, to, subject, count);
            }
        }
    }

    /// Remove everyone living at `node`.
    pub fn wipe_population(&mut self, node: NodeId) -> Population {
        let gone = *self.population(node);
        for (subject, count) in gone.iter() {
            self.remove_subjects(node, subject, count);
        }
        gone
    }

    pub fn add_to_retinue(&mut self, subject: SubjectType, count: u32) {
        self.retinue.add_many(subject, count);
        self.kingdom.add_many(subject, count);
    }

    pub fn remove_from_retinue(&mut self, subject: SubjectType, count: u32) -> bool {
        if !self.retinue.remove_many(subject, count) {
            return false;
        }
        if !self.kingdom.remove_many(subject, count) {
            warn!("kingdom ledger short of {subject} while shrinking the retinue");
        }
        true
    }

    /// Pull every soldier and captain at `node` into a detached army.
    /// Returns `false` if one already exists or there is nobody to take.
    pub fn form_special_retinue(&mut self, node: NodeId, name: &str) -> bool {
        if self.special_retinue.is_some()
            || !self.is_captured(node)
            || self.population(node).military() == 0
        {
            return false;
        }
        let pop = &mut self.populations[node.index()];
        let members = pop.drain_where(SubjectType::is_military);
        // Population moves between ledgers, so the kingdom total is unchanged.
        self.special_retinue = Some(SpecialRetinue {
            name: name.to_owned(),
            members,
        });
        true
    }

    /// Settle the detached army at `node`.
    pub fn disband_special_retinue(&mut self, node: NodeId) -> Option<SpecialRetinue> {
        let army = self.special_retinue.take()?;
        // The army already counts towards the kingdom; avoid double-adding.
        if !self.kingdom.subtract_all(&army.members) {
            warn!("kingdom ledger short while disbanding {}", army.name);
        }
        for (subject, count) in army.members.iter() {
            self.add_subjects(node, subject, count);
        }
        Some(army)
    }

    /// Recompute the kingdom aggregate from scratch and compare.
    #[must_use]
    pub fn is_ledger_consistent(&self) -> bool {
        let mut expected = self.retinue;
        for node in &self.captured {
            expected.add_all(&self.populations[node.index()]);
        }
        if let Some(army) = &self.special_retinue {
            expected.add_all(&army.members);
        }
        expected == self.kingdom && self.populations.iter().all(Population::is_consistent)
    }

    /// Whole-snapshot check for states coming back from storage: the map is
    /// well formed, every table refers to real nodes and the ledger adds up.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let known = |node: &NodeId| self.map.contains(*node);
        self.map.is_well_formed()
            && self.populations.len() == self.map.len()
            && self.captured.iter().all(known)
            && self.explored.iter().all(known)
            && self.settlements.keys().all(known)
            && self.walls.keys().all(known)
            && self.strongholds.keys().all(known)
            && self.attacks.keys().all(known)
            && self.sorties.keys().all(known)
            && self.gold_veins.keys().all(known)
            && self.is_ledger_consistent()
    }

    // Housing ----------------------------------------------------------------

    #[must_use]
    pub const fn housing(&self) -> &HousingTracker {
        &self.housing
    }

    pub fn recalculate_housing(&mut self) {
        let open = self
            .captured
            .iter()
            .filter(|node| !self.settlements.contains_key(node))
            .count();
        let settled = self
            .captured
            .iter()
            .filter_map(|node| self.settlements.get(node));
        self.housing.recalculate(open, settled);
    }

    #[must_use]
    pub fn growth_modifier(&self) -> GrowthModifier {
        GrowthModifier::for_population(self.kingdom.total(), self.housing.total())
    }

    // Ruler ------------------------------------------------------------------

    /// The node the ruler stands on, if not travelling.
    #[must_use]
    pub const fn ruler_node(&self) -> Option<NodeId> {
        match self.ruler.position {
            RulerPosition::AtNode(node) => Some(node),
            RulerPosition::InTransit { .. } => None,
        }
    }

    #[must_use]
    pub fn ruler_at(&self, node: NodeId) -> bool {
        self.ruler_node() == Some(node)
    }

    #[must_use]
    pub fn purse_max(&self) -> u32 {
        by_level(&PURSE_SIZES, self.capital_level())
    }

    #[must_use]
    pub fn retinue_max(&self) -> u32 {
        by_level(&RETINUE_LIMITS, self.capital_level())
    }

    /// Map units per day at the current phase.
    #[must_use]
    pub fn ruler_speed(&self) -> f64 {
        let bonus = by_level(&RULER_SPEED_BONUSES, self.capital_level());
        let speed = RULER_BASE_MOVE_SPEED * (1.0 + bonus);
        if self.is_daytime() {
            speed
        } else {
            speed * NIGHT_TO_DAY_RATIO
        }
    }

    /// Continuous ruler coordinates, interpolated along the road in transit.
    #[must_use]
    pub fn ruler_point(&self) -> Point {
        match self.ruler.position {
            RulerPosition::AtNode(node) => self.map.point(node),
            RulerPosition::InTransit { edge, traveled } => {
                let length = edge.length(&self.map);
                let t = if length > 0.0 { traveled / length } else { 0.0 };
                self.map.point(edge.from).lerp(self.map.point(edge.to), t)
            }
        }
    }

    /// Gold the ruler can spend at their current node: purse plus the local
    /// treasury.
    #[must_use]
    pub fn spendable_gold(&self) -> u32 {
        let local = self
            .ruler_node()
            .and_then(|node| self.settlements.get(&node))
            .map_or(0, Settlement::gold);
        self.ruler.gold + local
    }

    /// Pay `cost` from the local treasury first, then the purse. All or nothing.
    pub fn spend_money(&mut self, cost: u32) -> bool {
        if self.spendable_gold() < cost {
            return false;
        }
        let mut owed = cost;
        if let Some(node) = self.ruler_node()
            && let Some(settlement) = self.settlements.get_mut(&node)
        {
            owed -= settlement.withdraw(owed);
        }
        self.ruler.gold -= owed;
        true
    }

    /// Price to equip one idle subject as `subject`, rising with the number
    /// the kingdom already fields.
    #[must_use]
    pub fn equipment_cost(&self, subject: SubjectType) -> u32 {
        let base = subject.base_equipment_cost();
        match subject {
            SubjectType::Soldier => {
                let owned = f64::from(self.kingdom.count(SubjectType::Soldier));
                (base + floor_f64_to_u32(MARGINAL_EQUIP_COST_SOLDIER * owned))
                    .min(MAX_SOLDIER_EQUIP_COST)
            }
            SubjectType::Worker => {
                let owned = f64::from(self.kingdom.count(SubjectType::Worker));
                base + floor_f64_to_u32(MARGINAL_EQUIP_COST_WORKER * owned)
            }
            _ => base,
        }
    }

    // Node queries -----------------------------------------------------------

    /// Workers building at `node`, counting the retinue when the ruler is there.
    #[must_use]
    pub fn workers_at(&self, node: NodeId) -> u32 {
        let mut workers = self.population(node).count(SubjectType::Worker);
        if self.ruler_at(node) {
            workers += self.retinue.count(SubjectType::Worker);
        }
        workers
    }

    /// Soldiers and whether a captain is present at `node`, counting the
    /// retinue when the ruler is there.
    #[must_use]
    pub fn garrison_at(&self, node: NodeId) -> (u32, bool) {
        let pop = self.population(node);
        let mut soldiers = pop.count(SubjectType::Soldier);
        let mut captains = pop.count(SubjectType::Captain);
        if self.ruler_at(node) {
            soldiers += self.retinue.count(SubjectType::Soldier);
            captains += self.retinue.count(SubjectType::Captain);
        }
        (soldiers, captains > 0)
    }

    #[must_use]
    pub fn defense_rating(&self, node: NodeId) -> u32 {
        let (soldiers, has_captain) = self.garrison_at(node);
        let garrison = if has_captain {
            round_f64_to_u32(garrison_strength(soldiers, true))
        } else {
            soldiers * DEFENSE_PER_SOLDIER
        };
        let wall = self
            .walls
            .get(&node)
            .and_then(Wall::defense_rating)
            .unwrap_or(WALLLESS_DEFENSE);
        garrison + wall
    }

    /// Captured with at least one uncaptured child.
    #[must_use]
    pub fn is_frontier(&self, node: NodeId) -> bool {
        self.is_captured(node)
            && self
                .map
                .children(node)
                .iter()
                .any(|child| !self.is_captured(*child))
    }

    /// A living stronghold somewhere below `node` through uncaptured land.
    #[must_use]
    pub fn has_downstream_stronghold(&self, node: NodeId) -> bool {
        self.map
            .children(node)
            .iter()
            .filter(|child| !self.is_captured(**child))
            .any(|child| self.strongholds.contains_key(child) || self.has_downstream_stronghold(*child))
    }

    /// The lane below `node` still has an enemy in it.
    #[must_use]
    pub fn is_contested(&self, node: NodeId) -> bool {
        !self.is_captured(node)
            && (self.strongholds.contains_key(&node) || self.has_downstream_stronghold(node))
    }

    /// Nearest explored stronghold below `node`. Unexplored nodes block the
    /// search, and the search does not look past a stronghold.
    #[must_use]
    pub fn closest_explored_stronghold(&self, node: NodeId) -> Option<NodeId> {
        let mut queue: VecDeque<NodeId> = self.map.children(node).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if !self.is_explored(current) {
                continue;
            }
            if self.strongholds.contains_key(&current) {
                return Some(current);
            }
            queue.extend(self.map.children(current).iter().copied());
        }
        None
    }

    /// The sortie, if any, currently besieging `target`.
    #[must_use]
    pub fn sortie_targeting(&self, target: NodeId) -> Option<(NodeId, &Sortie)> {
        self.sorties
            .iter()
            .find(|(_, sortie)| sortie.target() == target)
            .map(|(origin, sortie)| (*origin, sortie))
    }

    #[must_use]
    pub fn stronghold_strength(&self, node: NodeId) -> Option<u32> {
        self.strongholds.get(&node).map(|s| s.strength(self.danger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridPos;

    fn line_map() -> Map {
        // 0 - 1 - 2 - 3, with 4 hanging off 1.
        let mut map = Map::with_root(GridPos::new(0, 0));
        let a = map.add_child(NodeId::ROOT, GridPos::new(1, 0));
        let b = map.add_child(a, GridPos::new(2, 0));
        map.add_child(b, GridPos::new(3, 0));
        map.add_child(a, GridPos::new(1, 1));
        map
    }

    fn fresh_state() -> GameState {
        let mut state = GameState::new(GameSettings::default(), line_map());
        state.insert_settlement(NodeId::ROOT, Settlement::capital(2, 20));
        state.mark_captured(NodeId::ROOT);
        state.explored.insert(NodeId::ROOT);
        state.add_subjects(NodeId::ROOT, SubjectType::Idle, 5);
        state.recalculate_housing();
        state
    }

    #[test]
    fn capture_and_release_keep_the_ledger_exact() {
        let mut state = fresh_state();
        let wild = NodeId::new(1);
        state.add_subjects(wild, SubjectType::Idle, 2);
        assert_eq!(state.kingdom().total(), 5);
        state.mark_captured(wild);
        assert_eq!(state.kingdom().total(), 7);
        state.add_to_retinue(SubjectType::Soldier, 2);
        assert!(state.move_subjects(wild, NodeId::ROOT, SubjectType::Idle, 1));
        assert!(state.is_ledger_consistent());
        state.mark_uncaptured(wild);
        assert_eq!(state.kingdom().total(), 8);
        assert!(state.is_ledger_consistent());
    }

    #[test]
    fn special_retinue_counts_once() {
        let mut state = fresh_state();
        state.add_subjects(NodeId::ROOT, SubjectType::Soldier, 3);
        state.add_subjects(NodeId::ROOT, SubjectType::Captain, 1);
        assert!(state.form_special_retinue(NodeId::ROOT, "army"));
        assert!(!state.form_special_retinue(NodeId::ROOT, "again"));
        assert_eq!(state.population(NodeId::ROOT).military(), 0);
        assert_eq!(state.kingdom().military(), 4);
        assert!(state.is_ledger_consistent());
        let army = state.disband_special_retinue(NodeId::ROOT).expect("army");
        assert_eq!(army.members.total(), 4);
        assert_eq!(state.kingdom().military(), 4);
        assert!(state.is_ledger_consistent());
    }

    #[test]
    fn spend_money_drains_local_treasury_first() {
        let mut state = fresh_state();
        state.ruler.gold = 10;
        assert_eq!(state.spendable_gold(), 30);
        assert!(state.spend_money(25));
        assert_eq!(state.capital().map(Settlement::gold), Some(0));
        assert_eq!(state.ruler.gold, 5);
        assert!(!state.spend_money(6));
        assert_eq!(state.ruler.gold, 5);
    }

    #[test]
    fn equipment_cost_rises_with_the_army() {
        let mut state = fresh_state();
        assert_eq!(state.equipment_cost(SubjectType::Soldier), 2);
        state.add_to_retinue(SubjectType::Soldier, 8);
        assert_eq!(state.equipment_cost(SubjectType::Soldier), 4);
        state.add_to_retinue(SubjectType::Soldier, 100);
        assert_eq!(state.equipment_cost(SubjectType::Soldier), 15);
        state.add_to_retinue(SubjectType::Worker, 3);
        assert_eq!(state.equipment_cost(SubjectType::Worker), 4);
        assert_eq!(state.equipment_cost(SubjectType::Captain), 20);
    }

    #[test]
    fn defense_counts_soldiers_captains_and_walls() {
        let mut state = fresh_state();
        assert_eq!(state.defense_rating(NodeId::ROOT), 1);
        state.add_subjects(NodeId::ROOT, SubjectType::Soldier, 4);
        assert_eq!(state.defense_rating(NodeId::ROOT), 13);
        state.add_to_retinue(SubjectType::Captain, 1);
        // 12 * 1.2 = 14.4 -> 14, plus 1.
        assert_eq!(state.defense_rating(NodeId::ROOT), 15);
        state.walls.insert(NodeId::ROOT, Wall::new());
        // A wall still being built offers nothing beyond the flat bonus.
        assert_eq!(state.defense_rating(NodeId::ROOT), 15);
    }

    #[test]
    fn stronghold_searches_respect_capture_and_exploration() {
        let mut state = fresh_state();
        let (a, b, c, d) = (NodeId::new(1), NodeId::new(2), NodeId::new(3), NodeId::new(4));
        state.strongholds.insert(c, Stronghold::new(3, false));
        state.strongholds.insert(d, Stronghold::new(2, false));
        assert!(state.is_frontier(NodeId::ROOT));
        assert!(state.has_downstream_stronghold(NodeId::ROOT));
        assert_eq!(state.closest_explored_stronghold(NodeId::ROOT), None);
        state.explored.extend([a, b, c, d]);
        assert_eq!(state.closest_explored_stronghold(NodeId::ROOT), Some(d));
        state.strongholds.remove(&d);
        assert_eq!(state.closest_explored_stronghold(NodeId::ROOT), Some(c));
        state.mark_captured(a);
        assert!(!state.is_frontier(NodeId::ROOT));
        assert!(state.is_frontier(a));
        assert!(state.is_contested(b));
        assert!(!state.is_contested(d));
    }

    #[test]
    fn city_exclusion_uses_hop_distance() {
        let state = fresh_state();
        assert!(state.is_too_close_to_city(NodeId::new(2)));
        assert!(!state.is_too_close_to_city(NodeId::new(3)));
    }

    #[test]
    fn farm_fields_follow_resident_farmers() {
        let mut state = fresh_state();
        let node = NodeId::new(1);
        state.mark_captured(node);
        state.add_subjects(node, SubjectType::Farmer, 2);
        let mut farm = Settlement::founded(SettlementType::Farm).expect("farm");
        let ctx = crate::settlement::SettlementContext {
            workers: 100,
            ..Default::default()
        };
        let _ = farm.advance(1.0, &ctx);
        state.insert_settlement(node, farm);
        assert_eq!(state.settlement(node).map(|s| s.fields().len()), Some(2));
        assert!(state.remove_subjects(node, SubjectType::Farmer, 1));
        assert_eq!(state.settlement(node).map(|s| s.fields().len()), Some(1));
    }
}
