//! The fixed-step update pipeline.

use log::{debug, info, trace};

use super::GameInstance;
use crate::combat::FrontierAttack;
use crate::constants::{ATTACK_VARIANCE_MAX, ATTACK_VARIANCE_MIN, DAILY_CAPITAL_INCOME};
use crate::construction::ConstructionEvent;
use crate::error::GameOver;
use crate::map::NodeId;
use crate::numbers::round_f64_to_u32;
use crate::population::SubjectType;
use crate::settlement::{SettlementContext, SettlementEvent, SettlementType};
use crate::state::DayPhase;
use rand::Rng;

impl GameInstance {
    /// Advance the simulation by `dt`, a fraction of the current day or night.
    ///
    /// `dt` is clamped so the phase progress never passes 1.0; the remainder
    /// of a clamped call is dropped rather than carried into the next phase.
    ///
    /// # Errors
    ///
    /// Returns [`GameOver`] once the game has ended, on this call or earlier.
    /// Every later call returns the same outcome without ticking.
    pub fn advance(&mut self, dt: f64) -> Result<(), GameOver> {
        if let Some(outcome) = self.state.outcome {
            return Err(outcome);
        }
        match self.run_tick(dt) {
            Ok(()) => Ok(()),
            Err(outcome) => {
                info!("game over on day {}: {outcome}", self.state.calendar.day);
                self.state.outcome = Some(outcome);
                Err(outcome)
            }
        }
    }

    fn run_tick(&mut self, dt: f64) -> Result<(), GameOver> {
        let remaining = 1.0 - self.state.calendar.progress;
        let dt = if dt.is_finite() {
            dt.clamp(0.0, remaining.max(0.0))
        } else {
            0.0
        };
        let rollover = dt >= remaining;

        match self.state.calendar.phase {
            DayPhase::Day => {
                self.update_settlements(dt);
                self.update_walls(dt);
            }
            DayPhase::Night => self.update_attacks(dt)?,
        }
        self.update_sorties(dt)?;

        if rollover {
            self.state.calendar.progress = 0.0;
            match self.state.calendar.phase {
                DayPhase::Day => {
                    self.state.calendar.phase = DayPhase::Night;
                    self.on_night_begin();
                }
                DayPhase::Night => {
                    self.state.calendar.phase = DayPhase::Day;
                    self.state.calendar.day += 1;
                    self.state.captured_this_turn.clear();
                    self.on_day_begin();
                }
            }
        } else {
            self.state.calendar.progress += dt;
        }

        self.update_movement(dt);
        Ok(())
    }

    fn on_night_begin(&mut self) {
        self.state.sorties.clear();
        let besieged: Vec<NodeId> = self
            .state
            .captured_nodes()
            .iter()
            .copied()
            .filter(|node| self.state.is_frontier(*node) && self.state.has_downstream_stronghold(*node))
            .collect();
        for node in besieged {
            let variance = self.rng.gen_range(ATTACK_VARIANCE_MIN..=ATTACK_VARIANCE_MAX);
            let strength = round_f64_to_u32(self.state.danger * variance);
            debug!("night attack of strength {strength} against {node}");
            self.state.attacks.insert(node, FrontierAttack::new(strength));
        }
        info!(
            "night falls on day {}: {} frontier nodes under attack",
            self.state.calendar.day,
            self.state.attacks.len()
        );
    }

    fn on_day_begin(&mut self) {
        if let Some(capital) = self.state.capital_mut() {
            capital.deposit(DAILY_CAPITAL_INCOME);
        }
        let increase = self
            .state
            .settings
            .difficulty
            .daily_danger_increase(self.state.calendar.day);
        self.state.danger += increase;
        self.state.attacks.clear();
        info!(
            "day {} begins, danger {:.2}",
            self.state.calendar.day, self.state.danger
        );
    }

    // Daytime ----------------------------------------------------------------

    fn settlement_context(&self, node: NodeId) -> SettlementContext {
        let state = &self.state;
        let neighbor_has_room = state.map.neighbors(node).iter().any(|near| {
            state
                .settlement(*near)
                .is_some_and(|s| s.allows_gold_deposits() && s.treasury_room() > 0)
        });
        SettlementContext {
            workers: state.workers_at(node),
            farmers: state.population(node).count(SubjectType::Farmer),
            growth_modifier: state.growth_modifier().multiplier(),
            daytime: state.is_daytime(),
            wall_under_construction: state.walls.get(&node).is_some_and(|w| w.is_under_construction()),
            vein_remaining: state.gold_veins.get(&node).copied().unwrap_or(0),
            neighbor_has_room,
        }
    }

    fn update_settlements(&mut self, dt: f64) {
        let nodes: Vec<NodeId> = self.state.settlements().keys().copied().collect();
        for node in nodes {
            let ctx = self.settlement_context(node);
            let Some(settlement) = self.state.settlement_mut(node) else {
                continue;
            };
            let events = settlement.advance(dt, &ctx);
            let kind = settlement.settlement_type();
            for event in events {
                self.apply_settlement_event(node, kind, event);
            }
        }
    }

    fn apply_settlement_event(&mut self, node: NodeId, kind: SettlementType, event: SettlementEvent) {
        match event {
            SettlementEvent::Built => {
                info!("{kind} at {node} is finished");
                self.state.recalculate_housing();
            }
            SettlementEvent::Upgraded { level } => {
                info!("{kind} at {node} reached level {level}");
                self.state.recalculate_housing();
            }
            SettlementEvent::NewSubject => {
                trace!("a new subject arrives at {node}");
                self.state.add_subjects(node, SubjectType::Idle, 1);
            }
            SettlementEvent::Overflow(gold) => self.route_overflow(node, gold),
            SettlementEvent::GoldMined => {
                if let Some(vein) = self.state.gold_veins.get_mut(&node) {
                    *vein = vein.saturating_sub(1);
                }
            }
        }
    }

    /// Deposit surplus gold into neighboring cities in neighbor order; whatever
    /// does not fit anywhere is lost.
    fn route_overflow(&mut self, node: NodeId, mut gold: u32) {
        for near in self.state.map.neighbors(node) {
            if gold == 0 {
                break;
            }
            if let Some(city) = self.state.settlement_mut(near)
                && city.allows_gold_deposits()
            {
                gold -= city.deposit(gold);
            }
        }
        if gold > 0 {
            trace!("{gold} surplus gold from {node} was lost");
        }
    }

    fn update_walls(&mut self, dt: f64) {
        let nodes: Vec<NodeId> = self.state.walls.keys().copied().collect();
        for node in nodes {
            let workers = self.state.workers_at(node);
            let Some(wall) = self.state.walls.get_mut(&node) else {
                continue;
            };
            match wall.advance(dt, workers) {
                Some(ConstructionEvent::Built) => info!("wall at {node} is finished"),
                Some(ConstructionEvent::Upgraded { level }) => {
                    info!("wall at {node} reached level {level}");
                }
                None => {}
            }
        }
    }
}
