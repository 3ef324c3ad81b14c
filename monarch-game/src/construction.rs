//! Build/upgrade state machine shared by settlements and walls.
//!
//! Progress accrues in worker-days: each tick adds
//! `dt * workers / worker_days_for_target_level`, and the transition fires
//! once the accumulated fraction reaches 1.0.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstructionPhase {
    BuildingSite,
    Operational,
    Upgrading,
}

/// A transition that completed during [`Construction::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionEvent {
    Built,
    Upgraded { level: u8 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Construction {
    level: u8,
    phase: ConstructionPhase,
    progress: f64,
}

impl Construction {
    /// A fresh level-1 building site.
    #[must_use]
    pub const fn building_site() -> Self {
        Self {
            level: 1,
            phase: ConstructionPhase::BuildingSite,
            progress: 0.0,
        }
    }

    /// Already-built structure at `level`.
    #[must_use]
    pub const fn operational(level: u8) -> Self {
        Self {
            level,
            phase: ConstructionPhase::Operational,
            progress: 0.0,
        }
    }

    #[must_use]
    pub const fn level(&self) -> u8 {
        self.level
    }

    #[must_use]
    pub const fn phase(&self) -> ConstructionPhase {
        self.phase
    }

    /// Fraction in `[0, 1)` of the current build or upgrade.
    #[must_use]
    pub const fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub const fn is_building_site(&self) -> bool {
        matches!(self.phase, ConstructionPhase::BuildingSite)
    }

    #[must_use]
    pub const fn is_upgrading(&self) -> bool {
        matches!(self.phase, ConstructionPhase::Upgrading)
    }

    #[must_use]
    pub const fn is_operational(&self) -> bool {
        matches!(self.phase, ConstructionPhase::Operational)
    }

    /// Level the in-flight transition is working towards.
    #[must_use]
    pub const fn target_level(&self) -> u8 {
        match self.phase {
            ConstructionPhase::Upgrading => self.level + 1,
            ConstructionPhase::BuildingSite | ConstructionPhase::Operational => self.level,
        }
    }

    /// Start an upgrade. Only an operational structure below `max_level` can upgrade.
    pub fn begin_upgrade(&mut self, max_level: u8) -> bool {
        if !self.is_operational() || self.level >= max_level {
            return false;
        }
        self.phase = ConstructionPhase::Upgrading;
        self.progress = 0.0;
        true
    }

    /// Abandon an upgrade in progress. The level stays where it was.
    pub fn cancel_upgrade(&mut self) -> bool {
        if !self.is_upgrading() {
            return false;
        }
        self.phase = ConstructionPhase::Operational;
        self.progress = 0.0;
        true
    }

    /// Accrue `dt * workers / worker_days` progress. A non-positive
    /// `worker_days` requirement completes the transition immediately.
    pub fn advance(&mut self, dt: f64, workers: u32, worker_days: f64) -> Option<ConstructionEvent> {
        if self.is_operational() {
            return None;
        }
        if worker_days > 0.0 {
            self.progress += dt * f64::from(workers) / worker_days;
        } else {
            self.progress = 1.0;
        }
        if self.progress < 1.0 {
            return None;
        }
        self.progress = 0.0;
        let event = match self.phase {
            ConstructionPhase::BuildingSite => ConstructionEvent::Built,
            ConstructionPhase::Upgrading => {
                self.level += 1;
                ConstructionEvent::Upgraded { level: self.level }
            }
            ConstructionPhase::Operational => return None,
        };
        self.phase = ConstructionPhase::Operational;
        Some(event)
    }
}
