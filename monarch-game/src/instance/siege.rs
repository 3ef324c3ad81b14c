//! Combat resolution: nightly frontier sieges and daytime sorties.

use log::{debug, info, warn};

use super::GameInstance;
use crate::combat::FrontierAttack;
use crate::constants::{CIVILIAN_LOSS_DIVISOR, VICTORIOUS_ARMY_NAME};
use crate::error::GameOver;
use crate::map::NodeId;
use crate::population::SubjectType;

impl GameInstance {
    pub(super) fn update_attacks(&mut self, dt: f64) -> Result<(), GameOver> {
        let besieged: Vec<NodeId> = self.state.attacks.keys().copied().collect();
        for node in besieged {
            if !self.state.is_captured(node) {
                continue;
            }
            let defense = self.state.defense_rating(node);
            let Some(attack) = self.state.attacks.get_mut(&node) else {
                continue;
            };
            attack.advance(dt);
            if attack.overwhelms(defense) {
                self.lose_node(node)?;
            }
        }
        Ok(())
    }

    /// `node` falls to the enemy. Military retreats to the parent, a share of
    /// the civilians die, the rest flee, and everything cut off below is lost.
    fn lose_node(&mut self, node: NodeId) -> Result<(), GameOver> {
        let Some(parent) = self.state.map.parent(node) else {
            return Err(GameOver::Defeat);
        };
        info!("{node} has fallen");
        let attack = self.state.attacks.remove(&node);
        self.state.remove_settlement(node);
        self.state.walls.remove(&node);
        self.state.sorties.remove(&node);

        self.state.move_where(node, parent, SubjectType::is_military);
        let civilians = self.state.population(node).civilians();
        let deaths = (civilians / CIVILIAN_LOSS_DIVISOR).max(1).min(civilians);
        for _ in 0..deaths {
            let victim = self
                .state
                .population(node)
                .weighted_pick(&mut self.rng, SubjectType::is_civilian);
            match victim {
                Some(subject) => {
                    self.state.remove_subjects(node, subject, 1);
                }
                None => {
                    warn!("no civilian left to kill at {node}");
                    break;
                }
            }
        }
        debug!("{deaths} civilians died at {node}");
        self.state.move_where(node, parent, |_| true);
        self.state.mark_uncaptured(node);
        self.clear_cut_off(node);
        self.state.recalculate_housing();

        if let Some(attack) = attack {
            let leftover = attack.remaining();
            if leftover > 0 {
                debug!("{leftover} attack strength carries on to {parent}");
                self.state
                    .attacks
                    .entry(parent)
                    .and_modify(|existing| existing.reinforce(leftover))
                    .or_insert_with(|| FrontierAttack::new(leftover));
            }
        }
        Ok(())
    }

    /// Everything captured below a lost node goes with it, nobody escaping.
    fn clear_cut_off(&mut self, lost: NodeId) {
        let children = self.state.map.children(lost).to_vec();
        for child in children {
            if !self.state.is_captured(child) {
                continue;
            }
            self.state.remove_settlement(child);
            self.state.walls.remove(&child);
            self.state.attacks.remove(&child);
            self.state.sorties.remove(&child);
            self.state.wipe_population(child);
            self.state.mark_uncaptured(child);
            info!("{child} was cut off and lost");
            self.clear_cut_off(child);
        }
    }

    // Sorties ----------------------------------------------------------------

    pub(super) fn update_sorties(&mut self, dt: f64) -> Result<(), GameOver> {
        let origins: Vec<NodeId> = self.state.sorties.keys().copied().collect();
        for origin in origins {
            let Some(target) = self.state.sorties.get(&origin).map(|s| s.target()) else {
                continue;
            };
            let Some(stronghold_strength) = self.state.stronghold_strength(target) else {
                self.state.sorties.remove(&origin);
                continue;
            };
            let (soldiers, has_captain) = self.state.garrison_at(origin);
            if soldiers == 0 && !has_captain {
                debug!("sortie from {origin} has nobody left and is called off");
                self.state.sorties.remove(&origin);
                continue;
            }
            let Some(sortie) = self.state.sorties.get_mut(&origin) else {
                continue;
            };
            let human = sortie.human_strength(soldiers, has_captain);
            let outcome = sortie.advance(dt, human, stronghold_strength);
            if outcome.casualty {
                self.sortie_casualty(origin);
            }
            if outcome.victory {
                self.win_sortie(origin, target)?;
            } else if outcome.casualty {
                let (soldiers, has_captain) = self.state.garrison_at(origin);
                if soldiers == 0 && !has_captain {
                    debug!("sortie from {origin} lost its last fighter");
                    self.state.sorties.remove(&origin);
                }
            }
        }
        Ok(())
    }

    fn win_sortie(&mut self, origin: NodeId, target: NodeId) -> Result<(), GameOver> {
        self.state.sorties.remove(&origin);
        self.state.strongholds.remove(&target);
        info!("the stronghold at {target} was destroyed by a sortie from {origin}");
        if self.state.strongholds.is_empty() {
            return Err(GameOver::Victory);
        }
        if self.state.ruler_at(origin)
            && !self.state.has_downstream_stronghold(origin)
            && self.state.special_retinue().is_none()
            && self.state.form_special_retinue(origin, VICTORIOUS_ARMY_NAME)
        {
            info!("the {VICTORIOUS_ARMY_NAME} gathers at {origin}");
        }
        Ok(())
    }

    /// One fighter dies: node soldiers first, then retinue soldiers, then
    /// captains in the same order.
    fn sortie_casualty(&mut self, origin: NodeId) {
        let ruler_present = self.state.ruler_at(origin);
        for subject in [SubjectType::Soldier, SubjectType::Captain] {
            if self.state.remove_subjects(origin, subject, 1) {
                return;
            }
            if ruler_present && self.state.remove_from_retinue(subject, 1) {
                return;
            }
        }
        warn!("sortie casualty at {origin} with nobody to take");
    }
}
