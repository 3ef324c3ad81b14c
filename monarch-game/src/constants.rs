//! Centralized balance and tuning constants for Monarch game logic.
//!
//! Tables indexed by level are stored 0-based: entry `i` applies to level
//! `i + 1`. Keeping them together ensures that gameplay can only be adjusted
//! via code changes reviewed in version control.

// Calendar -----------------------------------------------------------------
/// Length of a night relative to the length of a day.
pub const NIGHT_TO_DAY_RATIO: f64 = 0.666;
pub(crate) const STARTING_DANGER_LEVEL: f64 = 1.0;
pub(crate) const DAILY_CAPITAL_INCOME: u32 = 2;

// Ruler ----------------------------------------------------------------------
/// Map units the ruler covers per day at the base speed.
pub const RULER_BASE_MOVE_SPEED: f64 = 60.0;
pub(crate) const PURSE_SIZES: [u32; 5] = [20, 25, 35, 45, 60];
pub(crate) const RETINUE_LIMITS: [u32; 5] = [3, 4, 5, 6, 8];
pub(crate) const RULER_SPEED_BONUSES: [f64; 5] = [0.0, 0.0, 0.05, 0.1, 0.15];

// Kingdom --------------------------------------------------------------------
pub const NODE_CAPTURE_COST: u32 = 5;
/// Capital level required before farms can be built.
pub const FARM_UNLOCK_LEVEL: u8 = 2;
pub(crate) const CITY_EXCLUSION_DISTANCE: u32 = 2;
pub(crate) const STARTING_CAPITAL_LEVEL: u8 = 2;
pub(crate) const STARTING_CAPITAL_GOLD: u32 = 20;
pub(crate) const STARTING_IDLE_SUBJECTS: u32 = 5;
pub(crate) const WILD_SUBJECT_CHANCE: f64 = 0.5;
pub(crate) const WILD_SECOND_SUBJECT_CHANCE: f64 = 0.25;
pub(crate) const MARGINAL_EQUIP_COST_WORKER: f64 = 0.5;
pub(crate) const MARGINAL_EQUIP_COST_SOLDIER: f64 = 0.25;
pub(crate) const MAX_SOLDIER_EQUIP_COST: u32 = 15;
pub(crate) const VICTORIOUS_ARMY_NAME: &str = "Victorious army";

// Housing --------------------------------------------------------------------
pub(crate) const HOUSING_PER_OPEN_NODE: f64 = 0.25;

// Combat ---------------------------------------------------------------------
pub const DEFENSE_PER_SOLDIER: u32 = 3;
pub const CAPTAIN_STRENGTH_BONUS: f64 = 1.2;
pub(crate) const WALLLESS_DEFENSE: u32 = 1;
pub(crate) const ATTACK_VARIANCE_MIN: f64 = 0.9;
pub(crate) const ATTACK_VARIANCE_MAX: f64 = 1.1;
pub(crate) const CIVILIAN_LOSS_DIVISOR: u32 = 3;
pub(crate) const STRONGHOLD_BASE_STRENGTH: f64 = 10.0;
pub(crate) const STRONGHOLD_DANGER_FACTOR: f64 = 0.8;
pub(crate) const STRONGHOLD_DEPTH_BONUS: f64 = 0.05;
pub(crate) const INTERMEDIATE_STRONGHOLD_FACTOR: f64 = 0.75;
/// Fractional strength lost per hop between a sortie and its target.
pub const SORTIE_DISTANCE_PENALTY: f64 = 0.05;
pub(crate) const SORTIE_BASE_CASUALTIES_PER_DAY: f64 = 5.2;
pub(crate) const SORTIE_CASUALTIES_PER_STRENGTH: f64 = 0.04;

// Population growth ------------------------------------------------------
pub(crate) const NEW_POP_PER_DAY: [f64; 5] = [0.26, 0.51, 1.01, 1.51, 2.51];

// Capital ----------------------------------------------------------------
pub(crate) const CAPITAL_MAX_LEVEL: u8 = 5;
pub(crate) const CAPITAL_UPGRADE_COSTS: [u32; 5] = [0, 0, 36, 60, 100];
pub(crate) const CAPITAL_UPGRADE_TIMES: [f64; 5] = [0.0, 0.0, 1.0, 1.5, 2.5];
pub(crate) const CAPITAL_TREASURY_SIZES: [u32; 5] = [50, 75, 125, 200, 500];
pub(crate) const CAPITAL_HOUSING: [u32; 5] = [8, 10, 16, 22, 32];
pub(crate) const CAPITAL_FARMER_LEVEL: u8 = 2;
pub(crate) const CAPITAL_CAPTAIN_LEVEL: u8 = 4;

// City -------------------------------------------------------------------
pub(crate) const CITY_MAX_LEVEL: u8 = 5;
pub(crate) const CITY_COSTS: [u32; 5] = [16, 12, 22, 30, 60];
pub(crate) const CITY_CONSTRUCTION_TIMES: [f64; 5] = [1.0, 2.0, 2.5, 3.5, 5.0];
pub(crate) const CITY_TREASURY_SIZES: [u32; 5] = [20, 50, 75, 120, 180];
pub(crate) const CITY_HOUSING: [u32; 5] = [4, 6, 10, 14, 20];
pub(crate) const CITY_FARMER_LEVEL: u8 = 2;

// Farm -------------------------------------------------------------------
pub(crate) const FARM_MAX_LEVEL: u8 = 3;
pub(crate) const FARM_COSTS: [u32; 3] = [10, 12, 18];
pub(crate) const FARM_CONSTRUCTION_TIMES: [f64; 3] = [0.5, 1.0, 1.5];
pub(crate) const FARM_TREASURY_SIZES: [u32; 3] = [25, 32, 40];
pub(crate) const FARM_MAX_FARMERS: [u32; 3] = [3, 4, 5];
pub(crate) const FARM_HARVEST_YIELDS: [u32; 3] = [5, 6, 7];
/// Days between harvests on a single field.
pub const FARM_HARVEST_TIME: f64 = 1.475;
pub(crate) const FARM_LEVEL_TWO_CAPITAL: u8 = 3;
pub(crate) const FARM_LEVEL_THREE_CAPITAL: u8 = 5;

// Gold mine --------------------------------------------------------------
pub(crate) const GOLD_MINE_COST: u32 = 20;
pub(crate) const GOLD_MINE_TREASURY: u32 = 16;
pub(crate) const GOLD_MINE_CONSTRUCTION_TIME: f64 = 0.75;
pub(crate) const GOLD_MINE_RATE: f64 = 5.0;
pub(crate) const GOLD_VEIN_BASE: u32 = 60;
pub(crate) const GOLD_VEIN_SPREAD: u32 = 60;
pub(crate) const GOLD_VEIN_PER_DEPTH: u32 = 3;

// Peddler ----------------------------------------------------------------
pub(crate) const PEDDLER_GOLD_PER_DAY: f64 = 4.2;
pub(crate) const PEDDLER_TREASURY: u32 = 6;
pub(crate) const PEDDLER_STARTING_GOLD: u32 = 2;

// Wall -------------------------------------------------------------------
pub const WALL_MAX_LEVEL: u8 = 8;
pub(crate) const WALL_COSTS: [u32; 8] = [4, 6, 16, 24, 40, 50, 50, 50];
pub(crate) const WALL_CONSTRUCTION_TIMES: [f64; 8] = [0.20, 0.6, 1.2, 1.6, 2.5, 2.7, 3.0, 3.4];
pub(crate) const WALL_DEFENSE_RATINGS: [u32; 8] = [6, 12, 24, 38, 54, 72, 88, 102];

/// Look up a level-indexed table entry, clamping out-of-range levels to the
/// nearest valid entry.
pub(crate) fn by_level<T: Copy, const N: usize>(table: &[T; N], level: u8) -> T {
    let idx = usize::from(level.max(1)) - 1;
    table[idx.min(N - 1)]
}
