use std::collections::VecDeque;
use std::fmt;

use monarch_game::constants::NODE_CAPTURE_COST;
use monarch_game::{Direction, GameInstance, NodeId, SubjectType};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

/// Policy interface for automated play strategies.
///
/// `act` is called once per tick, before the world advances. Policies issue
/// intents only; a declined command is simply tried again later.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    fn act(&mut self, game: &mut GameInstance);
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameplayStrategy {
    Idle,
    Expansionist,
    Warlord,
}

impl GameplayStrategy {
    pub const ALL: [Self; 3] = [Self::Idle, Self::Expansionist, Self::Warlord];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Idle => "Idle",
            GameplayStrategy::Expansionist => "Expansionist",
            GameplayStrategy::Warlord => "Warlord",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Idle => Box::new(IdlePolicy),
            GameplayStrategy::Expansionist => Box::new(ExpansionistPolicy::default()),
            GameplayStrategy::Warlord => Box::new(WarlordPolicy::new(seed)),
        }
    }

    /// Parse a strategy name, ignoring case and separators.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let normalized: String = key
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "idle" | "none" => Some(Self::Idle),
            "expansionist" | "expand" => Some(Self::Expansionist),
            "warlord" | "war" => Some(Self::Warlord),
            _ => None,
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Never touches the keyboard: the capital alone against the night.
pub struct IdlePolicy;

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn act(&mut self, _game: &mut GameInstance) {}
}

/// Remaining hops of a planned walk, steered with direction keys.
#[derive(Debug, Default)]
struct Route {
    hops: VecDeque<NodeId>,
}

impl Route {
    fn plan(&mut self, game: &GameInstance, to: NodeId) {
        self.hops.clear();
        if let Some(from) = game.ruler_node() {
            self.hops.extend(game.map().path(from, to));
        }
    }

    fn is_done(&self) -> bool {
        self.hops.is_empty()
    }

    /// Press the key for the next hop. Returns `true` while still travelling.
    fn steer(&mut self, game: &mut GameInstance) -> bool {
        let Some(here) = game.ruler_node() else {
            return true;
        };
        while self.hops.front() == Some(&here) {
            self.hops.pop_front();
        }
        let Some(next) = self.hops.front().copied() else {
            return false;
        };
        let map = game.map();
        match Direction::between(map.position(here), map.position(next)) {
            Some(direction) => {
                game.start_movement(direction);
                true
            }
            None => {
                self.hops.clear();
                false
            }
        }
    }
}

/// Uncaptured, unfortified children of nodes that can support a capture today.
fn capture_candidates(game: &GameInstance) -> Vec<NodeId> {
    let state = game.state();
    state
        .captured_nodes()
        .iter()
        .filter(|node| !state.captured_this_turn.contains(*node))
        .flat_map(|node| state.map.children(*node).iter().copied())
        .filter(|child| !state.is_captured(*child) && !state.strongholds.contains_key(child))
        .collect()
}

/// Equip soldiers, then fill the purse from the capital.
fn resupply(game: &mut GameInstance) {
    while game.equip_subject(SubjectType::Soldier).is_ok() {}
    let _ = game.withdraw_gold(u32::MAX);
}

/// Walks out by day, takes the shallowest open node it can afford and
/// returns home to restock once the purse runs dry.
#[derive(Debug, Default)]
pub struct ExpansionistPolicy {
    route: Route,
    target: Option<NodeId>,
    restocked_on: Option<u32>,
}

impl ExpansionistPolicy {
    fn pick_target(game: &GameInstance, candidates: &[NodeId]) -> Option<NodeId> {
        candidates
            .iter()
            .copied()
            .min_by_key(|node| (game.map().depth(*node), *node))
    }

    /// Shared day routine; `choose` picks among open targets.
    fn day_step(
        &mut self,
        game: &mut GameInstance,
        choose: impl FnOnce(&GameInstance, &[NodeId]) -> Option<NodeId>,
    ) -> Option<NodeId> {
        if self.route.steer(game) {
            return None;
        }
        let here = game.ruler_node()?;
        let root = game.map().root();
        let day = game.state().calendar.day;

        if here == root && self.restocked_on != Some(day) {
            resupply(game);
            self.restocked_on = Some(day);
        }

        if let Some(target) = self.target.take()
            && target == here
            && game.capture_node(here).is_ok()
        {
            return Some(here);
        }

        if game.state().ruler.gold < NODE_CAPTURE_COST {
            if here != root {
                self.route.plan(game, root);
            }
            return None;
        }

        let candidates = capture_candidates(game);
        if let Some(target) = choose(game, &candidates) {
            self.target = Some(target);
            self.route.plan(game, target);
        }
        None
    }
}

impl PlayerPolicy for ExpansionistPolicy {
    fn name(&self) -> &'static str {
        "Expansionist"
    }

    fn act(&mut self, game: &mut GameInstance) {
        if !game.state().is_daytime() {
            // Finish the current road, then wait for dawn.
            self.route.hops.clear();
            return;
        }
        self.day_step(game, Self::pick_target);
    }
}

/// Expands at random, walls every fresh conquest and sends soldiers
/// against the nearest stronghold whenever a frontier allows it.
pub struct WarlordPolicy {
    expansion: ExpansionistPolicy,
    rng: ChaCha20Rng,
}

impl WarlordPolicy {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            expansion: ExpansionistPolicy::default(),
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    fn fortify(game: &mut GameInstance, node: NodeId) {
        if game.state().walls.contains_key(&node) {
            let _ = game.upgrade_wall();
        } else {
            let _ = game.build_wall();
        }
        if game.can_launch_sortie(node) {
            let _ = game.launch_sortie();
        }
    }
}

impl PlayerPolicy for WarlordPolicy {
    fn name(&self) -> &'static str {
        "Warlord"
    }

    fn act(&mut self, game: &mut GameInstance) {
        if !game.state().is_daytime() {
            self.expansion.route.hops.clear();
            return;
        }
        let rng = &mut self.rng;
        let captured = self
            .expansion
            .day_step(game, |_, candidates| candidates.choose(rng).copied());
        if let Some(node) = captured {
            Self::fortify(game, node);
        } else if let Some(here) = game.ruler_node()
            && self.expansion.route.is_done()
            && game.is_frontier(here)
            && game.can_launch_sortie(here)
        {
            let _ = game.launch_sortie();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use monarch_game::{DifficultyLevel, GameSettings, MapDifficulty, MapSize};

    fn game(seed: u64) -> GameInstance {
        GameInstance::new(
            GameSettings::new(DifficultyLevel::Easy, MapDifficulty::Easy, MapSize::Small)
                .with_seed(seed),
        )
    }

    fn run_daylight(policy: &mut dyn PlayerPolicy, game: &mut GameInstance) {
        while game.state().is_daytime() {
            policy.act(game);
            if game.advance(0.002).is_err() {
                break;
            }
        }
    }

    #[test]
    fn strategy_keys_parse_loosely() {
        assert_eq!(GameplayStrategy::from_key("Expansionist"), Some(GameplayStrategy::Expansionist));
        assert_eq!(GameplayStrategy::from_key("war-lord"), Some(GameplayStrategy::Warlord));
        assert_eq!(GameplayStrategy::from_key("IDLE"), Some(GameplayStrategy::Idle));
        assert_eq!(GameplayStrategy::from_key("pacifist"), None);
        for strategy in GameplayStrategy::ALL {
            assert_eq!(strategy.create_policy(1).name(), strategy.label());
        }
    }

    #[test]
    fn idle_policy_never_leaves_the_capital() {
        let mut game = game(11);
        let mut policy = GameplayStrategy::Idle.create_policy(11);
        run_daylight(policy.as_mut(), &mut game);
        assert_eq!(game.ruler_node(), Some(game.map().root()));
        assert_eq!(game.state().captured_nodes().len(), 1);
    }

    #[test]
    fn expansionist_takes_ground_on_its_first_day() {
        let mut game = game(12);
        let mut policy = GameplayStrategy::Expansionist.create_policy(12);
        run_daylight(policy.as_mut(), &mut game);
        assert!(game.state().captured_nodes().len() > 1);
        assert!(game.state().is_ledger_consistent());
    }

    #[test]
    fn routes_follow_the_tree_one_road_at_a_time() {
        let mut game = game(13);
        let root = game.map().root();
        let lane = game.map().children(root)[0];
        let mut route = Route::default();
        route.plan(&game, lane);
        assert!(route.steer(&mut game));
        while game.ruler_node() != Some(lane) {
            assert!(game.advance(0.002).is_ok());
        }
        assert!(!route.steer(&mut game));
        assert!(route.is_done());
    }
}
