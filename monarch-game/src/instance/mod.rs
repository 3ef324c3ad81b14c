//! The runnable game: state plus the RNG that drives it.
//!
//! [`GameInstance::advance`] is the only time-driven entry point. Commands
//! live in `commands`, the tick pipeline in `tick`, combat resolution in
//! `siege` and ruler travel in `movement`.

mod commands;
mod movement;
mod siege;
mod tick;
mod world;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::combat::{FrontierAttack, Sortie};
use crate::error::{CommandError, GameOver};
use crate::housing::GrowthModifier;
use crate::map::{Map, NodeId, Point};
use crate::population::SubjectType;
use crate::settings::GameSettings;
use crate::state::GameState;

/// A live game session. Not `Sync`-shared: callers serialise `advance` and
/// command calls themselves.
#[derive(Debug, Clone)]
pub struct GameInstance {
    state: GameState,
    rng: ChaCha20Rng,
}

impl GameInstance {
    /// Generate a new world from `settings`.
    #[must_use]
    pub fn new(settings: GameSettings) -> Self {
        let mut rng = settings
            .seed
            .map_or_else(ChaCha20Rng::from_entropy, ChaCha20Rng::seed_from_u64);
        let state = world::create_world(settings, &mut rng);
        Self { state, rng }
    }

    /// Resume a saved game. The RNG is not part of a snapshot, so a fresh
    /// entropy-seeded one is drawn.
    #[must_use]
    pub fn from_state(state: GameState) -> Self {
        Self::from_state_with_rng(state, ChaCha20Rng::from_entropy())
    }

    #[must_use]
    pub const fn from_state_with_rng(state: GameState, rng: ChaCha20Rng) -> Self {
        Self { state, rng }
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Mutate the state directly, bypassing command validation.
    pub fn with_state_mut<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GameState) -> R,
    {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn map(&self) -> &Map {
        &self.state.map
    }

    #[must_use]
    pub const fn outcome(&self) -> Option<GameOver> {
        self.state.outcome
    }

    // Queries ----------------------------------------------------------------

    #[must_use]
    pub fn is_frontier(&self, node: NodeId) -> bool {
        self.state.is_frontier(node)
    }

    #[must_use]
    pub fn can_capture(&self, node: NodeId) -> bool {
        self.check_capture(node).is_ok()
    }

    #[must_use]
    pub fn can_launch_sortie(&self, node: NodeId) -> bool {
        self.check_sortie(node).is_ok()
    }

    #[must_use]
    pub fn is_too_close_to_city(&self, node: NodeId) -> bool {
        self.state.is_too_close_to_city(node)
    }

    /// Whether the capital level allows the settlement at `node` to upgrade.
    #[must_use]
    pub fn is_settlement_upgrade_unlocked(&self, node: NodeId) -> bool {
        let capital_level = self.state.capital_level();
        self.state
            .settlement(node)
            .is_some_and(|s| s.is_upgrade_unlocked(capital_level))
    }

    #[must_use]
    pub fn defense_rating(&self, node: NodeId) -> u32 {
        self.state.defense_rating(node)
    }

    #[must_use]
    pub fn attack_at(&self, node: NodeId) -> Option<&FrontierAttack> {
        self.state.attacks.get(&node)
    }

    #[must_use]
    pub fn sortie_at(&self, node: NodeId) -> Option<&Sortie> {
        self.state.sorties.get(&node)
    }

    #[must_use]
    pub fn sortie_targeting(&self, target: NodeId) -> Option<(NodeId, &Sortie)> {
        self.state.sortie_targeting(target)
    }

    #[must_use]
    pub fn closest_explored_stronghold(&self, node: NodeId) -> Option<NodeId> {
        self.state.closest_explored_stronghold(node)
    }

    #[must_use]
    pub fn growth_modifier(&self) -> GrowthModifier {
        self.state.growth_modifier()
    }

    #[must_use]
    pub fn equipment_cost(&self, subject: SubjectType) -> u32 {
        self.state.equipment_cost(subject)
    }

    #[must_use]
    pub fn purse_max(&self) -> u32 {
        self.state.purse_max()
    }

    #[must_use]
    pub fn retinue_max(&self) -> u32 {
        self.state.retinue_max()
    }

    #[must_use]
    pub fn ruler_speed(&self) -> f64 {
        self.state.ruler_speed()
    }

    #[must_use]
    pub fn ruler_point(&self) -> Point {
        self.state.ruler_point()
    }

    #[must_use]
    pub fn ruler_node(&self) -> Option<NodeId> {
        self.state.ruler_node()
    }

    fn ensure_running(&self) -> Result<(), CommandError> {
        if self.state.is_over() {
            Err(CommandError::GameFinished)
        } else {
            Ok(())
        }
    }

    /// The node the ruler is standing on, or why there is none.
    fn ruler_location(&self) -> Result<NodeId, CommandError> {
        self.ensure_running()?;
        self.state.ruler_node().ok_or(CommandError::RulerInTransit)
    }

    fn ensure_known(&self, node: NodeId) -> Result<(), CommandError> {
        if self.state.map.contains(node) {
            Ok(())
        } else {
            Err(CommandError::UnknownNode(node))
        }
    }
}
