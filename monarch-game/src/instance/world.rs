//! Populating a freshly generated map with the starting position.

use log::info;
use rand::Rng;

use crate::combat::Stronghold;
use crate::constants::{
    GOLD_VEIN_BASE, GOLD_VEIN_PER_DEPTH, GOLD_VEIN_SPREAD, STARTING_CAPITAL_GOLD,
    STARTING_CAPITAL_LEVEL, STARTING_DANGER_LEVEL, STARTING_IDLE_SUBJECTS, WILD_SECOND_SUBJECT_CHANCE,
    WILD_SUBJECT_CHANCE,
};
use crate::mapgen::{self, MapGenConfig};
use crate::population::SubjectType;
use crate::settings::GameSettings;
use crate::settlement::Settlement;
use crate::state::GameState;

pub(super) fn create_world<R: Rng + ?Sized>(settings: GameSettings, rng: &mut R) -> GameState {
    let config = MapGenConfig::load_from_static();
    let map = mapgen::generate(&config, settings.map_difficulty, settings.map_size, rng);
    let mut state = GameState::new(settings, map);
    let root = state.map.root();

    state.danger = STARTING_DANGER_LEVEL;
    state.explored.insert(root);
    state.insert_settlement(
        root,
        Settlement::capital(STARTING_CAPITAL_LEVEL, STARTING_CAPITAL_GOLD),
    );
    state.mark_captured(root);
    state.add_subjects(root, SubjectType::Idle, STARTING_IDLE_SUBJECTS);

    let peddlers: Vec<_> = state.map.peddler_sites().iter().copied().collect();
    for site in peddlers {
        state.insert_settlement(site, Settlement::peddler());
    }

    for leaf in state.map.leaves() {
        let depth = state.map.depth(leaf);
        state.strongholds.insert(leaf, Stronghold::new(depth, false));
    }
    let intermediates: Vec<_> = state
        .map
        .intermediate_stronghold_sites()
        .iter()
        .copied()
        .collect();
    for site in intermediates {
        let depth = state.map.depth(site);
        state.strongholds.insert(site, Stronghold::new(depth, true));
    }

    let veins: Vec<_> = state.map.gold_veins().iter().copied().collect();
    for vein in veins {
        let size = GOLD_VEIN_BASE
            + rng.gen_range(0..GOLD_VEIN_SPREAD)
            + GOLD_VEIN_PER_DEPTH * state.map.depth(vein);
        state.gold_veins.insert(vein, size);
    }

    let wild: Vec<_> = state
        .map
        .node_ids()
        .filter(|id| *id != root && !state.strongholds.contains_key(id))
        .collect();
    for node in wild {
        if rng.r#gen::<f64>() < WILD_SUBJECT_CHANCE {
            state.add_subjects(node, SubjectType::Idle, 1);
            if rng.r#gen::<f64>() < WILD_SECOND_SUBJECT_CHANCE {
                state.add_subjects(node, SubjectType::Idle, 1);
            }
        }
    }

    state.recalculate_housing();
    info!(
        "new {} game on a {} {} map: {} nodes, {} strongholds",
        settings.difficulty,
        settings.map_size,
        settings.map_difficulty,
        state.map.len(),
        state.strongholds.len()
    );
    state
}
