//! Player intents. Every command validates first and changes nothing when
//! it is declined.

use log::{debug, info};

use super::GameInstance;
use crate::combat::Sortie;
use crate::constants::{CITY_EXCLUSION_DISTANCE, FARM_UNLOCK_LEVEL, NODE_CAPTURE_COST};
use crate::error::CommandError;
use crate::map::NodeId;
use crate::population::SubjectType;
use crate::settlement::{Settlement, SettlementType};
use crate::wall::Wall;

fn report(action: &str, result: Result<(), CommandError>) -> Result<(), CommandError> {
    if let Err(err) = &result {
        debug!("{action} declined: {err}");
    }
    result
}

impl GameInstance {
    // Capture ----------------------------------------------------------------

    pub(super) fn check_capture(&self, node: NodeId) -> Result<(), CommandError> {
        self.ensure_running()?;
        self.ensure_known(node)?;
        let state = &self.state;
        if state.is_captured(node) {
            return Err(CommandError::AlreadyCaptured(node));
        }
        if state.strongholds.contains_key(&node) {
            return Err(CommandError::StrongholdPresent(node));
        }
        if !state.is_daytime() {
            return Err(CommandError::NotDaytime);
        }
        match state.ruler_node() {
            None => return Err(CommandError::RulerInTransit),
            Some(at) if at != node => return Err(CommandError::RulerNotPresent(node)),
            Some(_) => {}
        }
        let supported = state
            .map
            .neighbors(node)
            .iter()
            .any(|near| state.is_captured(*near) && !state.captured_this_turn.contains(near));
        if !supported {
            return Err(CommandError::NoSupportingNeighbor(node));
        }
        if state.ruler.gold < NODE_CAPTURE_COST {
            return Err(CommandError::CannotAfford {
                needed: NODE_CAPTURE_COST,
                available: state.ruler.gold,
            });
        }
        Ok(())
    }

    /// Claim the node the ruler stands on, paying from the purse.
    ///
    /// # Errors
    ///
    /// See [`CommandError`]; the state is untouched on error.
    pub fn capture_node(&mut self, node: NodeId) -> Result<(), CommandError> {
        let result = self.check_capture(node).map(|()| {
            let state = &mut self.state;
            state.ruler.gold -= NODE_CAPTURE_COST;
            if state
                .settlement(node)
                .is_some_and(|s| s.settlement_type() == SettlementType::Peddler)
            {
                state.remove_settlement(node);
            }
            state.mark_captured(node);
            state.captured_this_turn.insert(node);
            state.recalculate_housing();
            self.advance_garrison(node);
            info!("captured {node}");
        });
        report("capture", result)
    }

    /// Soldiers follow the frontier forward from the parent: all of them (with
    /// captains) if no other lane of the parent is still contested, otherwise
    /// half the soldiers.
    fn advance_garrison(&mut self, node: NodeId) {
        let state = &mut self.state;
        let Some(parent) = state.map.parent(node) else {
            return;
        };
        if !state.is_captured(parent) {
            return;
        }
        let others_contested = state
            .map
            .children(parent)
            .iter()
            .any(|child| *child != node && state.is_contested(*child));
        if others_contested {
            let half = state.population(parent).count(SubjectType::Soldier) / 2;
            state.move_subjects(parent, node, SubjectType::Soldier, half);
        } else {
            state.move_where(parent, node, SubjectType::is_military);
        }
    }

    // Building ---------------------------------------------------------------

    fn check_new_site(&self, node: NodeId) -> Result<(), CommandError> {
        self.ensure_running()?;
        self.ensure_known(node)?;
        if !self.state.is_captured(node) {
            return Err(CommandError::NotCaptured(node));
        }
        if self.state.settlement(node).is_some() {
            return Err(CommandError::SettlementExists(node));
        }
        Ok(())
    }

    fn check_purse(&self, cost: u32) -> Result<(), CommandError> {
        if self.state.ruler.gold < cost {
            return Err(CommandError::CannotAfford {
                needed: cost,
                available: self.state.ruler.gold,
            });
        }
        Ok(())
    }

    fn found_settlement(&mut self, node: NodeId, kind: SettlementType) -> Result<(), CommandError> {
        let cost = kind.build_cost().ok_or(CommandError::MaxLevel)?;
        self.check_purse(cost)?;
        let settlement = Settlement::founded(kind).ok_or(CommandError::MaxLevel)?;
        self.state.ruler.gold -= cost;
        self.state.insert_settlement(node, settlement);
        self.state.recalculate_housing();
        info!("founded a {kind} at {node}");
        Ok(())
    }

    /// Lay out a city on captured land away from other cities.
    ///
    /// # Errors
    ///
    /// Declined when the node is taken, too close to a city or unaffordable.
    pub fn build_city(&mut self, node: NodeId) -> Result<(), CommandError> {
        let result = self.check_new_site(node).and_then(|()| {
            if self.state.is_too_close_to_city(node) {
                return Err(CommandError::TooCloseToCity(CITY_EXCLUSION_DISTANCE));
            }
            self.found_settlement(node, SettlementType::City)
        });
        report("build city", result)
    }

    /// # Errors
    ///
    /// Declined without arable land, before the capital unlocks farming, or
    /// when unaffordable.
    pub fn build_farm(&mut self, node: NodeId) -> Result<(), CommandError> {
        let result = self.check_new_site(node).and_then(|()| {
            if self.state.capital_level() < FARM_UNLOCK_LEVEL {
                return Err(CommandError::LockedByCapitalLevel {
                    required: FARM_UNLOCK_LEVEL,
                });
            }
            if !self.state.map.is_arable(node) {
                return Err(CommandError::NotArable(node));
            }
            self.found_settlement(node, SettlementType::Farm)
        });
        report("build farm", result)
    }

    /// Sink a mine into the vein under the ruler.
    ///
    /// # Errors
    ///
    /// Declined away from a captured vein or when unaffordable.
    pub fn build_gold_mine(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            self.check_new_site(node)?;
            if !self.state.map.is_gold_vein(node) {
                return Err(CommandError::NoGoldVein(node));
            }
            self.found_settlement(node, SettlementType::GoldMine)
        });
        report("build gold mine", result)
    }

    fn spend(&mut self, cost: u32) -> Result<(), CommandError> {
        let available = self.state.spendable_gold();
        if self.state.spend_money(cost) {
            Ok(())
        } else {
            Err(CommandError::CannotAfford {
                needed: cost,
                available,
            })
        }
    }

    /// Start a wall at the ruler's node.
    ///
    /// # Errors
    ///
    /// Declined if a wall exists, the settlement there is still a building
    /// site, or the ruler cannot pay.
    pub fn build_wall(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            if !self.state.is_captured(node) {
                return Err(CommandError::NotCaptured(node));
            }
            if self.state.walls.contains_key(&node) {
                return Err(CommandError::WallExists(node));
            }
            if self.state.settlement(node).is_some_and(Settlement::is_building_site) {
                return Err(CommandError::UnderConstruction(node));
            }
            self.spend(Wall::cost_for_level(1))?;
            self.state.walls.insert(node, Wall::new());
            info!("started a wall at {node}");
            Ok(())
        });
        report("build wall", result)
    }

    /// # Errors
    ///
    /// Declined without a finished wall, while the settlement there is still
    /// a building site, at max level, or when unaffordable.
    pub fn upgrade_wall(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let wall = self.state.walls.get(&node).ok_or(CommandError::NoWall(node))?;
            if wall.is_under_construction()
                || self.state.settlement(node).is_some_and(Settlement::is_building_site)
            {
                return Err(CommandError::UnderConstruction(node));
            }
            let cost = wall.upgrade_cost().ok_or(CommandError::MaxLevel)?;
            self.spend(cost)?;
            if let Some(wall) = self.state.walls.get_mut(&node) {
                wall.begin_upgrade();
            }
            Ok(())
        });
        report("upgrade wall", result)
    }

    /// Upgrade the settlement at the ruler's node.
    ///
    /// # Errors
    ///
    /// Declined while it is building, at max level, locked behind the capital
    /// level, or when unaffordable.
    pub fn upgrade_settlement(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let capital_level = self.state.capital_level();
            let settlement = self
                .state
                .settlement(node)
                .ok_or(CommandError::NoSettlement(node))?;
            if settlement.is_building_site() || settlement.is_upgrading() {
                return Err(CommandError::UnderConstruction(node));
            }
            let cost = settlement.upgrade_cost().ok_or(CommandError::MaxLevel)?;
            let required = settlement
                .capital_level_for_upgrade()
                .ok_or(CommandError::MaxLevel)?;
            if !settlement.is_upgrade_unlocked(capital_level) {
                return Err(CommandError::LockedByCapitalLevel { required });
            }
            self.spend(cost)?;
            if let Some(settlement) = self.state.settlement_mut(node) {
                settlement.begin_upgrade();
                info!("upgrading {} at {node}", settlement.settlement_type());
            }
            Ok(())
        });
        report("upgrade settlement", result)
    }

    /// Abandon the upgrade at the ruler's node, the settlement's before the
    /// wall's. The gold already paid is lost.
    ///
    /// # Errors
    ///
    /// Declined when nothing at the ruler's node is upgrading.
    pub fn cancel_upgrade(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            if self
                .state
                .settlement_mut(node)
                .is_some_and(Settlement::cancel_upgrade)
            {
                info!("abandoned the settlement upgrade at {node}");
                return Ok(());
            }
            if self.state.walls.get_mut(&node).is_some_and(Wall::cancel_upgrade) {
                info!("abandoned the wall upgrade at {node}");
                return Ok(());
            }
            Err(CommandError::NotUpgrading(node))
        });
        report("cancel upgrade", result)
    }

    // Subjects ---------------------------------------------------------------

    fn captured_ruler_node(&self) -> Result<NodeId, CommandError> {
        let node = self.ruler_location()?;
        if self.state.is_captured(node) {
            Ok(node)
        } else {
            Err(CommandError::NotCaptured(node))
        }
    }

    /// Take one subject of `subject` from the ruler's node into the retinue.
    ///
    /// # Errors
    ///
    /// Declined when nobody of that type is there or the retinue is full.
    pub fn recruit_subject(&mut self, subject: SubjectType) -> Result<(), CommandError> {
        let result = self.captured_ruler_node().and_then(|node| {
            if self.state.population(node).count(subject) == 0 {
                return Err(CommandError::NoSubject(subject));
            }
            if self.state.retinue().total() >= self.state.retinue_max() {
                return Err(CommandError::RetinueFull);
            }
            self.state.remove_subjects(node, subject, 1);
            self.state.add_to_retinue(subject, 1);
            Ok(())
        });
        report("recruit", result)
    }

    /// Leave one retinue member of `subject` at the ruler's node.
    ///
    /// # Errors
    ///
    /// Declined when the retinue has nobody of that type.
    pub fn leave_subject(&mut self, subject: SubjectType) -> Result<(), CommandError> {
        let result = self.captured_ruler_node().and_then(|node| {
            if !self.state.remove_from_retinue(subject, 1) {
                return Err(CommandError::NoSubject(subject));
            }
            self.state.add_subjects(node, subject, 1);
            Ok(())
        });
        report("leave", result)
    }

    /// Buy equipment for one idle subject, preferring the retinue's idlers.
    ///
    /// # Errors
    ///
    /// Declined if the local settlement does not sell it, nobody is idle, or
    /// the ruler cannot pay. A city still being built already sells.
    pub fn equip_subject(&mut self, subject: SubjectType) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let settlement = self
                .state
                .settlement(node)
                .ok_or(CommandError::NoSettlement(node))?;
            if !settlement.sells_equipment(subject) {
                return Err(CommandError::EquipmentNotSold(subject));
            }
            let from_retinue = self.state.retinue().count(SubjectType::Idle) > 0;
            if !from_retinue && self.state.population(node).count(SubjectType::Idle) == 0 {
                return Err(CommandError::NoIdleSubject);
            }
            self.spend(self.state.equipment_cost(subject))?;
            if from_retinue {
                self.state.remove_from_retinue(SubjectType::Idle, 1);
                self.state.add_to_retinue(subject, 1);
            } else {
                self.state.remove_subjects(node, SubjectType::Idle, 1);
                self.state.add_subjects(node, subject, 1);
            }
            Ok(())
        });
        report("equip", result)
    }

    // Gold -------------------------------------------------------------------

    /// Move up to `amount` gold from the local treasury into the purse.
    ///
    /// # Errors
    ///
    /// Declined with no settlement here, a full purse, or an empty treasury.
    pub fn withdraw_gold(&mut self, amount: u32) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let room = self.state.purse_max().saturating_sub(self.state.ruler.gold);
            let settlement = self
                .state
                .settlement_mut(node)
                .ok_or(CommandError::NoSettlement(node))?;
            if room == 0 {
                return Err(CommandError::PurseFull);
            }
            let taken = settlement.withdraw(amount.min(room));
            if taken == 0 {
                return Err(CommandError::NothingToTransfer);
            }
            self.state.ruler.gold += taken;
            Ok(())
        });
        report("withdraw", result)
    }

    /// Move up to `amount` gold from the purse into the local treasury.
    ///
    /// # Errors
    ///
    /// Declined where deposits are not accepted or nothing fits.
    pub fn deposit_gold(&mut self, amount: u32) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let purse = self.state.ruler.gold;
            let settlement = self
                .state
                .settlement_mut(node)
                .ok_or(CommandError::NoSettlement(node))?;
            if !settlement.allows_gold_deposits() {
                return Err(CommandError::DepositsNotAccepted);
            }
            let stored = settlement.deposit(amount.min(purse));
            if stored == 0 {
                return Err(CommandError::NothingToTransfer);
            }
            self.state.ruler.gold -= stored;
            Ok(())
        });
        report("deposit", result)
    }

    // Sorties ----------------------------------------------------------------

    /// Validate a sortie from `node` and pick its target.
    pub(super) fn check_sortie(&self, node: NodeId) -> Result<NodeId, CommandError> {
        self.ensure_running()?;
        self.ensure_known(node)?;
        let state = &self.state;
        if !state.is_daytime() {
            return Err(CommandError::NotDaytime);
        }
        if !state.is_captured(node) {
            return Err(CommandError::NotCaptured(node));
        }
        if !state.is_frontier(node) {
            return Err(CommandError::NotFrontier(node));
        }
        if state.sorties.contains_key(&node) {
            return Err(CommandError::SortieExists(node));
        }
        if state.garrison_at(node).0 == 0 {
            return Err(CommandError::NoSoldiers);
        }
        state
            .closest_explored_stronghold(node)
            .ok_or(CommandError::NoReachableStronghold(node))
    }

    /// Send the soldiers at the ruler's node against the nearest stronghold.
    ///
    /// # Errors
    ///
    /// Declined at night, away from a contested frontier, or without soldiers.
    pub fn launch_sortie(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            let target = self.check_sortie(node)?;
            let hops = self.state.map.distance(node, target);
            self.state.sorties.insert(node, Sortie::new(node, target, hops));
            info!("sortie from {node} against the stronghold at {target}");
            Ok(())
        });
        report("launch sortie", result)
    }

    /// # Errors
    ///
    /// Declined when no sortie leaves from the ruler's node.
    pub fn cancel_sortie(&mut self) -> Result<(), CommandError> {
        let result = self.ruler_location().and_then(|node| {
            self.state
                .sorties
                .remove(&node)
                .map(|_| ())
                .ok_or(CommandError::NoSortie(node))
        });
        report("cancel sortie", result)
    }

    /// Disband the victorious army at the ruler's node.
    ///
    /// # Errors
    ///
    /// Declined away from captured land or with no army in the field.
    pub fn leave_special_retinue(&mut self) -> Result<(), CommandError> {
        let result = self.captured_ruler_node().and_then(|node| {
            let army = self
                .state
                .disband_special_retinue(node)
                .ok_or(CommandError::NoSpecialRetinue)?;
            info!("{} settles at {node}", army.name);
            Ok(())
        });
        report("leave special retinue", result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::seeded;
    use super::GameInstance;
    use crate::combat::Stronghold;
    use crate::error::CommandError;
    use crate::map::NodeId;
    use crate::population::SubjectType;
    use crate::settlement::{Settlement, SettlementType};
    use crate::state::{DayPhase, RulerPosition};
    use crate::wall::Wall;

    fn walk_to(game: &mut GameInstance, node: NodeId) {
        game.with_state_mut(|state| {
            state.explored.insert(node);
            state.ruler.position = RulerPosition::AtNode(node);
        });
    }

    /// First lane and its first child, cleared of strongholds and settlers.
    fn quiet_lane(game: &mut GameInstance) -> (NodeId, NodeId) {
        let root = game.map().root();
        let lane = game.map().children(root)[0];
        let next = game.map().children(lane)[0];
        game.with_state_mut(|state| {
            state.strongholds.remove(&next);
            state.remove_settlement(next);
            state.wipe_population(lane);
            state.wipe_population(next);
            state.ruler.gold = 25;
        });
        (lane, next)
    }

    #[test]
    fn capture_requires_a_supporting_neighbor_from_before_today() {
        let mut game = seeded(40);
        let (lane, next) = quiet_lane(&mut game);
        walk_to(&mut game, next);
        assert_eq!(
            game.capture_node(next),
            Err(CommandError::NoSupportingNeighbor(next))
        );
        walk_to(&mut game, lane);
        assert!(game.can_capture(lane));
        assert!(game.capture_node(lane).is_ok());
        assert_eq!(game.state().ruler.gold, 20);
        walk_to(&mut game, next);
        assert_eq!(
            game.capture_node(next),
            Err(CommandError::NoSupportingNeighbor(next))
        );

        // The lock lifts at dawn.
        assert!(game.advance(1.0).is_ok());
        assert!(game.advance(1.0).is_ok());
        assert!(game.state().is_captured(lane));
        assert!(game.capture_node(next).is_ok());
        assert!(game.state().is_ledger_consistent());
    }

    #[test]
    fn capture_is_declined_at_night_and_against_strongholds() {
        let mut game = seeded(41);
        let (lane, next) = quiet_lane(&mut game);
        walk_to(&mut game, lane);
        game.with_state_mut(|state| state.calendar.phase = DayPhase::Night);
        assert_eq!(game.capture_node(lane), Err(CommandError::NotDaytime));
        game.with_state_mut(|state| {
            state.calendar.phase = DayPhase::Day;
            state.strongholds.insert(lane, Stronghold::new(1, true));
        });
        assert_eq!(game.capture_node(lane), Err(CommandError::StrongholdPresent(lane)));
        assert_eq!(game.capture_node(next), Err(CommandError::RulerNotPresent(next)));
        assert_eq!(game.state().ruler.gold, 25);
    }

    #[test]
    fn capture_pulls_soldiers_forward() {
        let mut game = seeded(42);
        let root = game.map().root();
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.add_subjects(root, SubjectType::Soldier, 5);
            state.add_subjects(root, SubjectType::Captain, 1);
        });
        walk_to(&mut game, lane);
        assert!(game.capture_node(lane).is_ok());
        let state = game.state();
        // Other root lanes still hold strongholds: half the soldiers move.
        assert_eq!(state.population(lane).count(SubjectType::Soldier), 2);
        assert_eq!(state.population(root).count(SubjectType::Soldier), 3);
        assert_eq!(state.population(root).count(SubjectType::Captain), 1);
    }

    #[test]
    fn cities_keep_their_distance_and_cost_gold() {
        let mut game = seeded(43);
        let (lane, next) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.mark_captured(lane);
            state.mark_captured(next);
        });
        assert_eq!(
            game.build_city(next),
            Err(CommandError::TooCloseToCity(2))
        );
        game.with_state_mut(|state| state.ruler.gold = 10);
        let far = game.map().children(next).first().copied();
        if let Some(far) = far {
            game.with_state_mut(|state| {
                state.strongholds.remove(&far);
                state.remove_settlement(far);
                state.mark_captured(far);
            });
            assert_eq!(
                game.build_city(far),
                Err(CommandError::CannotAfford {
                    needed: 16,
                    available: 10
                })
            );
            game.with_state_mut(|state| state.ruler.gold = 20);
            assert!(game.build_city(far).is_ok());
            assert_eq!(game.state().ruler.gold, 4);
            let city = game.state().settlement(far).expect("city");
            assert!(city.is_building_site());
        }
    }

    #[test]
    fn farms_need_arable_land() {
        let mut game = seeded(44);
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| state.mark_captured(lane));
        if !game.map().is_arable(lane) {
            assert_eq!(game.build_farm(lane), Err(CommandError::NotArable(lane)));
        }
        game.with_state_mut(|state| state.map.mark_arable(lane));
        assert!(game.build_farm(lane).is_ok());
        assert_eq!(game.state().ruler.gold, 15);
    }

    #[test]
    fn equipping_spends_the_local_treasury_first() {
        let mut game = seeded(45);
        let root = game.map().root();
        game.with_state_mut(|state| state.ruler.gold = 10);
        assert!(game.equip_subject(SubjectType::Soldier).is_ok());
        let state = game.state();
        assert_eq!(state.capital().map(Settlement::gold), Some(18));
        assert_eq!(state.ruler.gold, 10);
        assert_eq!(state.population(root).count(SubjectType::Soldier), 1);
        assert_eq!(state.population(root).count(SubjectType::Idle), 4);
        assert_eq!(
            game.equip_subject(SubjectType::Captain),
            Err(CommandError::EquipmentNotSold(SubjectType::Captain))
        );
        assert_eq!(
            game.equip_subject(SubjectType::Idle),
            Err(CommandError::EquipmentNotSold(SubjectType::Idle))
        );
    }

    #[test]
    fn retinue_is_capped_by_capital_level() {
        let mut game = seeded(46);
        for _ in 0..4 {
            assert!(game.recruit_subject(SubjectType::Idle).is_ok());
        }
        assert_eq!(
            game.recruit_subject(SubjectType::Idle),
            Err(CommandError::RetinueFull)
        );
        assert!(game.equip_subject(SubjectType::Worker).is_ok());
        assert_eq!(game.state().retinue().count(SubjectType::Worker), 1);
        assert!(game.leave_subject(SubjectType::Worker).is_ok());
        assert_eq!(
            game.leave_subject(SubjectType::Farmer),
            Err(CommandError::NoSubject(SubjectType::Farmer))
        );
        assert!(game.state().is_ledger_consistent());
    }

    #[test]
    fn gold_transfers_clip_to_purse_and_treasury() {
        let mut game = seeded(47);
        assert!(game.withdraw_gold(100).is_ok());
        assert_eq!(game.state().ruler.gold, 20);
        assert_eq!(game.state().capital().map(Settlement::gold), Some(0));
        // Level-2 purse holds 25, but the treasury is empty.
        assert_eq!(game.withdraw_gold(1), Err(CommandError::NothingToTransfer));
        assert!(game.deposit_gold(7).is_ok());
        assert_eq!(game.state().ruler.gold, 13);
        assert_eq!(game.state().capital().map(Settlement::gold), Some(7));
        game.with_state_mut(|state| state.ruler.gold = 25);
        assert_eq!(game.withdraw_gold(5), Err(CommandError::PurseFull));
        assert_eq!(game.state().capital().map(Settlement::gold), Some(7));
    }

    #[test]
    fn peddlers_trade_but_take_no_deposits() {
        let mut game = seeded(48);
        let Some(site) = game.map().peddler_sites().iter().next().copied() else {
            return;
        };
        walk_to(&mut game, site);
        game.with_state_mut(|state| state.ruler.gold = 3);
        assert_eq!(game.deposit_gold(1), Err(CommandError::DepositsNotAccepted));
        assert!(game.withdraw_gold(10).is_ok());
        assert_eq!(game.state().ruler.gold, 5);
        assert_eq!(
            game.state().settlement(site).map(Settlement::gold),
            Some(0)
        );
    }

    #[test]
    fn walls_wait_for_the_settlement_and_finish_before_upgrading() {
        let mut game = seeded(49);
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.mark_captured(lane);
            state.insert_settlement(lane, Settlement::founded(SettlementType::City).expect("city"));
        });
        walk_to(&mut game, lane);
        assert_eq!(game.build_wall(), Err(CommandError::UnderConstruction(lane)));
        game.with_state_mut(|state| {
            state.remove_settlement(lane);
        });
        assert!(game.build_wall().is_ok());
        assert_eq!(game.state().ruler.gold, 21);
        assert_eq!(game.upgrade_wall(), Err(CommandError::UnderConstruction(lane)));
        assert_eq!(game.build_wall(), Err(CommandError::WallExists(lane)));
    }

    #[test]
    fn settlement_upgrades_respect_the_capital_level() {
        let mut game = seeded(50);
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.mark_captured(lane);
            let mut city = Settlement::founded(SettlementType::City).expect("city");
            let _ = city.advance(1.0, &crate::settlement::SettlementContext {
                workers: 10,
                ..Default::default()
            });
            let _ = city.begin_upgrade();
            let _ = city.advance(1.0, &crate::settlement::SettlementContext {
                workers: 10,
                ..Default::default()
            });
            state.insert_settlement(lane, city);
        });
        walk_to(&mut game, lane);
        assert_eq!(game.state().settlement(lane).map(Settlement::level), Some(2));
        assert_eq!(
            game.upgrade_settlement(),
            Err(CommandError::LockedByCapitalLevel { required: 3 })
        );
        let root = game.map().root();
        walk_to(&mut game, root);
        assert!(game.upgrade_settlement().is_ok());
        assert!(game.state().capital().is_some_and(Settlement::is_upgrading));
        assert_eq!(game.state().ruler.gold, 9);
    }

    #[test]
    fn sorties_need_soldiers_and_a_visible_target() {
        let mut game = seeded(51);
        let root = game.map().root();
        assert_eq!(game.launch_sortie(), Err(CommandError::NoSoldiers));
        game.with_state_mut(|state| state.add_subjects(root, SubjectType::Soldier, 3));
        assert_eq!(
            game.launch_sortie(),
            Err(CommandError::NoReachableStronghold(root))
        );
        let (lane, next) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.explored.extend([lane, next]);
            state.strongholds.insert(next, Stronghold::new(2, true));
        });
        assert!(game.can_launch_sortie(root));
        assert!(game.launch_sortie().is_ok());
        let sortie = game.sortie_at(root).expect("sortie");
        assert_eq!(sortie.target(), next);
        assert_eq!(sortie.distance(), 1);
        assert_eq!(game.sortie_targeting(next).map(|(origin, _)| origin), Some(root));
        assert_eq!(game.launch_sortie(), Err(CommandError::SortieExists(root)));
        assert!(game.cancel_sortie().is_ok());
        assert_eq!(game.cancel_sortie(), Err(CommandError::NoSortie(root)));
    }

    fn built_wall() -> Wall {
        let mut wall = Wall::new();
        let _ = wall.advance(1.0, 10);
        assert!(!wall.is_under_construction());
        wall
    }

    #[test]
    fn wall_upgrades_wait_for_the_city_to_be_built() {
        let mut game = seeded(52);
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.mark_captured(lane);
            state.walls.insert(lane, built_wall());
            state.insert_settlement(lane, Settlement::founded(SettlementType::City).expect("city"));
        });
        walk_to(&mut game, lane);
        assert_eq!(game.upgrade_wall(), Err(CommandError::UnderConstruction(lane)));
        assert_eq!(game.state().ruler.gold, 25);
        assert!(game.state().walls.get(&lane).is_some_and(|wall| !wall.is_upgrading()));

        game.with_state_mut(|state| {
            if let Some(city) = state.settlement_mut(lane) {
                let _ = city.advance(1.0, &crate::settlement::SettlementContext {
                    workers: 10,
                    ..Default::default()
                });
            }
        });
        assert!(game.upgrade_wall().is_ok());
        assert_eq!(game.state().ruler.gold, 19);
        assert!(game.state().walls.get(&lane).is_some_and(Wall::is_upgrading));
    }

    #[test]
    fn a_city_still_being_built_already_equips() {
        let mut game = seeded(53);
        let (lane, _) = quiet_lane(&mut game);
        game.with_state_mut(|state| {
            state.mark_captured(lane);
            state.insert_settlement(lane, Settlement::founded(SettlementType::City).expect("city"));
            state.add_subjects(lane, SubjectType::Idle, 1);
        });
        walk_to(&mut game, lane);
        let cost = game.state().equipment_cost(SubjectType::Worker);
        assert!(game.equip_subject(SubjectType::Worker).is_ok());
        let state = game.state();
        assert!(state.settlement(lane).is_some_and(Settlement::is_building_site));
        assert_eq!(state.population(lane).count(SubjectType::Worker), 1);
        assert_eq!(state.population(lane).count(SubjectType::Idle), 0);
        assert_eq!(state.ruler.gold, 25 - cost);
    }

    #[test]
    fn abandoned_upgrades_keep_their_level_and_their_cost() {
        let mut game = seeded(54);
        let root = game.map().root();
        game.with_state_mut(|state| state.ruler.gold = 25);
        assert_eq!(game.cancel_upgrade(), Err(CommandError::NotUpgrading(root)));
        assert!(game.upgrade_settlement().is_ok());
        let purse = game.state().ruler.gold;

        assert!(game.cancel_upgrade().is_ok());
        let capital = game.state().capital().expect("capital");
        assert!(!capital.is_upgrading());
        assert_eq!(capital.level(), 2);
        assert_eq!(capital.gold(), 0);
        assert_eq!(game.state().ruler.gold, purse);

        game.with_state_mut(|state| {
            let mut wall = built_wall();
            assert!(wall.begin_upgrade());
            state.walls.insert(root, wall);
        });
        assert!(game.cancel_upgrade().is_ok());
        let wall = game.state().walls.get(&root).expect("wall");
        assert!(!wall.is_upgrading());
        assert_eq!(wall.level(), 1);
        assert_eq!(game.cancel_upgrade(), Err(CommandError::NotUpgrading(root)));
    }
}
