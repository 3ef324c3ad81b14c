//! Settlements: the per-node economic buildings.
//!
//! Every variant shares the [`Construction`] state machine; what differs is
//! the production logic run each daytime tick and the level tables.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

use crate::constants::{
    CAPITAL_CAPTAIN_LEVEL, CAPITAL_FARMER_LEVEL, CAPITAL_HOUSING, CAPITAL_MAX_LEVEL,
    CAPITAL_TREASURY_SIZES, CAPITAL_UPGRADE_COSTS, CAPITAL_UPGRADE_TIMES, CITY_CONSTRUCTION_TIMES,
    CITY_COSTS, CITY_FARMER_LEVEL, CITY_HOUSING, CITY_MAX_LEVEL, CITY_TREASURY_SIZES,
    FARM_CONSTRUCTION_TIMES, FARM_COSTS, FARM_HARVEST_TIME, FARM_HARVEST_YIELDS,
    FARM_LEVEL_THREE_CAPITAL, FARM_LEVEL_TWO_CAPITAL, FARM_MAX_FARMERS, FARM_MAX_LEVEL,
    FARM_TREASURY_SIZES, GOLD_MINE_CONSTRUCTION_TIME, GOLD_MINE_COST, GOLD_MINE_RATE,
    GOLD_MINE_TREASURY, NEW_POP_PER_DAY, PEDDLER_GOLD_PER_DAY, PEDDLER_STARTING_GOLD,
    PEDDLER_TREASURY, by_level,
};
use crate::construction::{Construction, ConstructionEvent};
use crate::population::SubjectType;

/// The five settlement variants, without their state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SettlementType {
    Capital,
    City,
    Farm,
    GoldMine,
    Peddler,
}

impl SettlementType {
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Capital => "Capital City",
            Self::City => "City",
            Self::Farm => "Farm",
            Self::GoldMine => "Gold mine",
            Self::Peddler => "Peddler",
        }
    }

    #[must_use]
    pub const fn max_level(self) -> u8 {
        match self {
            Self::Capital => CAPITAL_MAX_LEVEL,
            Self::City => CITY_MAX_LEVEL,
            Self::Farm => FARM_MAX_LEVEL,
            Self::GoldMine | Self::Peddler => 1,
        }
    }

    /// Gold needed to found a new settlement of this type. The capital and
    /// peddlers only exist from world creation.
    #[must_use]
    pub fn build_cost(self) -> Option<u32> {
        match self {
            Self::City => Some(by_level(&CITY_COSTS, 1)),
            Self::Farm => Some(by_level(&FARM_COSTS, 1)),
            Self::GoldMine => Some(GOLD_MINE_COST),
            Self::Capital | Self::Peddler => None,
        }
    }

    /// Gold needed to reach `level` (1 = founding).
    #[must_use]
    pub fn cost_for_level(self, level: u8) -> u32 {
        match self {
            Self::Capital => by_level(&CAPITAL_UPGRADE_COSTS, level),
            Self::City => by_level(&CITY_COSTS, level),
            Self::Farm => by_level(&FARM_COSTS, level),
            Self::GoldMine => GOLD_MINE_COST,
            Self::Peddler => 0,
        }
    }

    /// Worker-days needed to reach `level` (1 = finishing the building site).
    #[must_use]
    pub fn worker_days_for_level(self, level: u8) -> f64 {
        match self {
            Self::Capital => by_level(&CAPITAL_UPGRADE_TIMES, level),
            Self::City => by_level(&CITY_CONSTRUCTION_TIMES, level),
            Self::Farm => by_level(&FARM_CONSTRUCTION_TIMES, level),
            Self::GoldMine => GOLD_MINE_CONSTRUCTION_TIME,
            Self::Peddler => 0.0,
        }
    }

    #[must_use]
    pub const fn is_urban(self) -> bool {
        matches!(self, Self::Capital | Self::City)
    }
}

impl fmt::Display for SettlementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Variant-specific production state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SettlementKind {
    Capital { growth: f64 },
    City { growth: f64 },
    Farm { fields: Vec<f64> },
    GoldMine { progress: f64 },
    Peddler { progress: f64 },
}

/// What the node around a settlement looks like this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettlementContext {
    /// Workers at the node, counting the retinue when the ruler is present.
    pub workers: u32,
    /// Farmers resident at the node.
    pub farmers: u32,
    pub growth_modifier: f64,
    pub daytime: bool,
    /// A wall at the node is being built or upgraded.
    pub wall_under_construction: bool,
    /// Gold left in the vein under this node.
    pub vein_remaining: u32,
    /// Some neighboring City or Capital has treasury room.
    pub neighbor_has_room: bool,
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self {
            workers: 0,
            farmers: 0,
            growth_modifier: 1.0,
            daytime: true,
            wall_under_construction: false,
            vein_remaining: 0,
            neighbor_has_room: false,
        }
    }
}

/// Side effects a settlement asks the orchestrator to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettlementEvent {
    Built,
    Upgraded { level: u8 },
    /// One new idle subject appears at the node.
    NewSubject,
    /// Gold that did not fit in the treasury; route it to a neighbor.
    Overflow(u32),
    /// One unit of gold was taken from the vein.
    GoldMined,
}

pub type SettlementEvents = SmallVec<[SettlementEvent; 4]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    construction: Construction,
    gold: u32,
    kind: SettlementKind,
}

impl Settlement {
    #[must_use]
    pub const fn capital(level: u8, gold: u32) -> Self {
        Self {
            construction: Construction::operational(level),
            gold,
            kind: SettlementKind::Capital { growth: 0.0 },
        }
    }

    #[must_use]
    pub const fn peddler() -> Self {
        Self {
            construction: Construction::operational(1),
            gold: PEDDLER_STARTING_GOLD,
            kind: SettlementKind::Peddler { progress: 0.0 },
        }
    }

    /// A freshly founded building site. Capitals and peddlers cannot be founded.
    #[must_use]
    pub fn founded(kind: SettlementType) -> Option<Self> {
        let kind = match kind {
            SettlementType::City => SettlementKind::City { growth: 0.0 },
            SettlementType::Farm => SettlementKind::Farm { fields: Vec::new() },
            SettlementType::GoldMine => SettlementKind::GoldMine { progress: 0.0 },
            SettlementType::Capital | SettlementType::Peddler => return None,
        };
        Some(Self {
            construction: Construction::building_site(),
            gold: 0,
            kind,
        })
    }

    #[must_use]
    pub const fn settlement_type(&self) -> SettlementType {
        match self.kind {
            SettlementKind::Capital { .. } => SettlementType::Capital,
            SettlementKind::City { .. } => SettlementType::City,
            SettlementKind::Farm { .. } => SettlementType::Farm,
            SettlementKind::GoldMine { .. } => SettlementType::GoldMine,
            SettlementKind::Peddler { .. } => SettlementType::Peddler,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &SettlementKind {
        &self.kind
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
    pub const fn gold(&self) -> u32 {
        self.gold
    }

    #[must_use]
    pub const fn is_building_site(&self) -> bool {
        self.construction.is_building_site()
    }

    #[must_use]
    pub const fn is_upgrading(&self) -> bool {
        self.construction.is_upgrading()
    }

    #[must_use]
    pub const fn max_level(&self) -> u8 {
        self.settlement_type().max_level()
    }

    #[must_use]
    pub fn max_gold(&self) -> u32 {
        let level = self.level();
        match self.kind {
            SettlementKind::Capital { .. } => by_level(&CAPITAL_TREASURY_SIZES, level),
            SettlementKind::City { .. } => by_level(&CITY_TREASURY_SIZES, level),
            SettlementKind::Farm { .. } => by_level(&FARM_TREASURY_SIZES, level),
            SettlementKind::GoldMine { .. } => GOLD_MINE_TREASURY,
            SettlementKind::Peddler { .. } => PEDDLER_TREASURY,
        }
    }

    #[must_use]
    pub fn treasury_room(&self) -> u32 {
        self.max_gold().saturating_sub(self.gold)
    }

    /// Housing this settlement would provide once built.
    #[must_use]
    pub fn housing_capacity(&self) -> u32 {
        let level = self.level();
        match self.kind {
            SettlementKind::Capital { .. } => by_level(&CAPITAL_HOUSING, level),
            SettlementKind::City { .. } => by_level(&CITY_HOUSING, level),
            _ => 0,
        }
    }

    #[must_use]
    pub const fn allows_gold_deposits(&self) -> bool {
        matches!(
            self.kind,
            SettlementKind::Capital { .. } | SettlementKind::City { .. }
        )
    }

    #[must_use]
    pub const fn sells_equipment(&self, subject: SubjectType) -> bool {
        let level = self.level();
        match self.kind {
            SettlementKind::Capital { .. } => match subject {
                SubjectType::Worker | SubjectType::Soldier => true,
                SubjectType::Farmer => level >= CAPITAL_FARMER_LEVEL,
                SubjectType::Captain => level >= CAPITAL_CAPTAIN_LEVEL,
                SubjectType::Idle => false,
            },
            SettlementKind::City { .. } => match subject {
                SubjectType::Worker | SubjectType::Soldier => true,
                SubjectType::Farmer => level >= CITY_FARMER_LEVEL,
                SubjectType::Idle | SubjectType::Captain => false,
            },
            _ => false,
        }
    }

    /// Cost of the next upgrade, or `None` at max level.
    #[must_use]
    pub fn upgrade_cost(&self) -> Option<u32> {
        (self.level() < self.max_level())
            .then(|| self.settlement_type().cost_for_level(self.level() + 1))
    }

    /// Capital level needed before the next upgrade may begin, or `None` if
    /// this settlement can never be upgraded further.
    #[must_use]
    pub const fn capital_level_for_upgrade(&self) -> Option<u8> {
        let level = self.level();
        if level >= self.max_level() {
            return None;
        }
        match self.kind {
            SettlementKind::Capital { .. } => Some(0),
            SettlementKind::City { .. } => Some(level + 1),
            SettlementKind::Farm { .. } => {
                if level == 1 {
                    Some(FARM_LEVEL_TWO_CAPITAL)
                } else {
                    Some(FARM_LEVEL_THREE_CAPITAL)
                }
            }
            SettlementKind::GoldMine { .. } | SettlementKind::Peddler { .. } => None,
        }
    }

    #[must_use]
    pub fn is_upgrade_unlocked(&self, capital_level: u8) -> bool {
        self.capital_level_for_upgrade()
            .is_some_and(|required| capital_level >= required)
    }

    /// Start upgrading. Returns `false` if not operational or already at max.
    pub fn begin_upgrade(&mut self) -> bool {
        let max = self.max_level();
        self.construction.begin_upgrade(max)
    }

    pub fn cancel_upgrade(&mut self) -> bool {
        self.construction.cancel_upgrade()
    }

    /// Add up to `amount` gold, returning what actually fit.
    pub fn deposit(&mut self, amount: u32) -> u32 {
        let accepted = amount.min(self.treasury_room());
        self.gold += accepted;
        accepted
    }

    /// Take up to `amount` gold, returning what was actually taken.
    pub fn withdraw(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.gold);
        self.gold -= taken;
        taken
    }

    // Variant state ----------------------------------------------------------

    /// Progress toward the next new subject (Capital/City).
    #[must_use]
    pub const fn growth_progress(&self) -> Option<f64> {
        match self.kind {
            SettlementKind::Capital { growth } | SettlementKind::City { growth } => Some(growth),
            _ => None,
        }
    }

    /// Per-field harvest progress (Farm only).
    #[must_use]
    pub fn fields(&self) -> &[f64] {
        match &self.kind {
            SettlementKind::Farm { fields } => fields,
            _ => &[],
        }
    }

    /// Progress toward the next unit of gold (GoldMine/Peddler).
    #[must_use]
    pub const fn production_progress(&self) -> Option<f64> {
        match self.kind {
            SettlementKind::GoldMine { progress } | SettlementKind::Peddler { progress } => {
                Some(progress)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn max_farmers(&self) -> u32 {
        match self.kind {
            SettlementKind::Farm { .. } => by_level(&FARM_MAX_FARMERS, self.level()),
            _ => 0,
        }
    }

    #[must_use]
    pub fn harvest_yield(&self) -> u32 {
        match self.kind {
            SettlementKind::Farm { .. } => by_level(&FARM_HARVEST_YIELDS, self.level()),
            _ => 0,
        }
    }

    // Ticking ----------------------------------------------------------------

    /// Advance one daytime tick of `dt` days.
    pub fn advance(&mut self, dt: f64, ctx: &SettlementContext) -> SettlementEvents {
        let mut events = SettlementEvents::new();
        let ty = self.settlement_type();
        if !self.construction.is_operational() {
            let worker_days = ty.worker_days_for_level(self.construction.target_level());
            match self.construction.advance(dt, ctx.workers, worker_days) {
                Some(ConstructionEvent::Built) => {
                    self.assign_fields(ctx.farmers);
                    events.push(SettlementEvent::Built);
                }
                Some(ConstructionEvent::Upgraded { level }) => {
                    self.assign_fields(ctx.farmers);
                    events.push(SettlementEvent::Upgraded { level });
                }
                None => {}
            }
        }
        if self.is_building_site() {
            return events;
        }

        let level = self.level();
        let max_gold = self.max_gold();
        match &mut self.kind {
            SettlementKind::Capital { growth } | SettlementKind::City { growth } => {
                *growth += dt * by_level(&NEW_POP_PER_DAY, level) * ctx.growth_modifier;
                if *growth >= 1.0 {
                    *growth = 0.0;
                    events.push(SettlementEvent::NewSubject);
                }
            }
            SettlementKind::Farm { fields } => {
                let step = dt / FARM_HARVEST_TIME;
                let mut harvests = 0;
                for field in fields.iter_mut() {
                    *field += step;
                    if *field >= 1.0 {
                        *field = 0.0;
                        harvests += 1;
                    }
                }
                let yield_per = by_level(&FARM_HARVEST_YIELDS, level);
                for _ in 0..harvests {
                    let fresh = self.gold + yield_per;
                    if fresh > max_gold {
                        self.gold = max_gold;
                        events.push(SettlementEvent::Overflow(fresh - max_gold));
                    } else {
                        self.gold = fresh;
                    }
                }
            }
            SettlementKind::GoldMine { progress } => {
                let has_room = self.gold < max_gold || ctx.neighbor_has_room;
                if has_room && ctx.vein_remaining > 0 && !ctx.wall_under_construction {
                    *progress += dt * GOLD_MINE_RATE * f64::from(ctx.workers);
                    if *progress >= 1.0 {
                        *progress = 0.0;
                        if self.gold >= max_gold {
                            events.push(SettlementEvent::Overflow(1));
                        } else {
                            self.gold += 1;
                        }
                        events.push(SettlementEvent::GoldMined);
                    }
                }
            }
            SettlementKind::Peddler { progress } => {
                if ctx.daytime && self.gold < max_gold {
                    *progress += dt * PEDDLER_GOLD_PER_DAY;
                    if *progress >= 1.0 {
                        *progress = 0.0;
                        self.gold += 1;
                    }
                }
            }
        }
        events
    }

    /// A subject of `subject` arrived at this node.
    pub fn on_subject_added(&mut self, subject: SubjectType) {
        if subject != SubjectType::Farmer || self.is_building_site() {
            return;
        }
        let max = self.max_farmers();
        if let SettlementKind::Farm { fields } = &mut self.kind
            && u32::try_from(fields.len()).unwrap_or(u32::MAX) < max
        {
            fields.push(0.0);
        }
    }

    /// A subject of `subject` left this node; `farmers_now` is the resident
    /// farmer count after the removal.
    pub fn on_subject_removed(&mut self, subject: SubjectType, farmers_now: u32) {
        if subject != SubjectType::Farmer {
            return;
        }
        if let SettlementKind::Farm { fields } = &mut self.kind {
            trim_fields(fields, farmers_now);
        }
    }

    /// Bring the field count to `min(farmers, max_farmers)`.
    fn assign_fields(&mut self, farmers: u32) {
        let target = farmers.min(self.max_farmers());
        if let SettlementKind::Farm { fields } = &mut self.kind {
            trim_fields(fields, target);
            while u32::try_from(fields.len()).unwrap_or(u32::MAX) < target {
                fields.push(0.0);
            }
        }
    }
}

/// Drop lowest-progress fields until at most `target` remain.
fn trim_fields(fields: &mut Vec<f64>, target: u32) {
    while u32::try_from(fields.len()).unwrap_or(u32::MAX) > target {
        let lowest = fields
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx);
        match lowest {
            Some(idx) => {
                fields.remove(idx);
            }
            None => break,
        }
    }
}
