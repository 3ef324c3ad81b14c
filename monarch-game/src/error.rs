//! Error types for the simulation core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::map::NodeId;
use crate::population::SubjectType;

/// Terminal outcome of a game, returned from `advance` as the error arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum GameOver {
    #[error("victory: every stronghold has fallen")]
    Victory,
    #[error("defeat: the capital has been overrun")]
    Defeat,
}

impl GameOver {
    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Victory)
    }
}

/// Why a command was declined. A declined command never changes state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("the game is already over")]
    GameFinished,
    #[error("only possible during the day")]
    NotDaytime,
    #[error("the ruler is travelling")]
    RulerInTransit,
    #[error("the ruler is not at {0}")]
    RulerNotPresent(NodeId),
    #[error("{0} does not exist")]
    UnknownNode(NodeId),
    #[error("{0} is not captured")]
    NotCaptured(NodeId),
    #[error("{0} is already captured")]
    AlreadyCaptured(NodeId),
    #[error("{0} is held by a stronghold")]
    StrongholdPresent(NodeId),
    #[error("{0} has no captured neighbor that can support a capture today")]
    NoSupportingNeighbor(NodeId),
    #[error("not enough gold: need {needed}, have {available}")]
    CannotAfford { needed: u32, available: u32 },
    #[error("{0} already has a settlement")]
    SettlementExists(NodeId),
    #[error("{0} has no settlement")]
    NoSettlement(NodeId),
    #[error("{0} already has a wall")]
    WallExists(NodeId),
    #[error("{0} has no wall")]
    NoWall(NodeId),
    #[error("construction at {0} is not finished")]
    UnderConstruction(NodeId),
    #[error("nothing is being upgraded at {0}")]
    NotUpgrading(NodeId),
    #[error("already at the maximum level")]
    MaxLevel,
    #[error("requires a capital at level {required}")]
    LockedByCapitalLevel { required: u8 },
    #[error("another city is within {0} hops")]
    TooCloseToCity(u32),
    #[error("{0} has no arable land")]
    NotArable(NodeId),
    #[error("{0} has no gold vein")]
    NoGoldVein(NodeId),
    #[error("{0} cannot be equipped here")]
    EquipmentNotSold(SubjectType),
    #[error("no idle subject available to equip")]
    NoIdleSubject,
    #[error("no {0} available")]
    NoSubject(SubjectType),
    #[error("the retinue is full")]
    RetinueFull,
    #[error("the purse is full")]
    PurseFull,
    #[error("this settlement does not accept deposits")]
    DepositsNotAccepted,
    #[error("nothing to transfer")]
    NothingToTransfer,
    #[error("{0} is not a frontier node")]
    NotFrontier(NodeId),
    #[error("a sortie is already underway from {0}")]
    SortieExists(NodeId),
    #[error("no sortie is underway from {0}")]
    NoSortie(NodeId),
    #[error("no explored stronghold is reachable from {0}")]
    NoReachableStronghold(NodeId),
    #[error("no soldiers are available for a sortie")]
    NoSoldiers,
    #[error("there is no special retinue")]
    NoSpecialRetinue,
    #[error("a special retinue is already in the field")]
    SpecialRetinueExists,
}

/// Errors raised when generator tuning invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum MapGenConfigError {
    #[error("{field} must be a probability in [0, 1] (got {value:.3})")]
    Probability { field: &'static str, value: f64 },
    #[error("{field} range is inverted (min {min} > max {max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u32,
        value: u32,
    },
    #[error("mapgen tuning could not be parsed: {0}")]
    Parse(String),
}
