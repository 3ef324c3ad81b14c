use std::thread;
use std::time::Instant;

use log::{debug, info};
use monarch_game::{GameInstance, GameOver, GameSettings, SettlementType};
use serde::Serialize;

use super::pacing::Pacing;
use super::policy::GameplayStrategy;

/// How a run should be driven.
#[derive(Debug, Clone, Copy)]
pub struct RunConfig {
    pub settings: GameSettings,
    pub strategy: GameplayStrategy,
    /// Stop once this many days have fully elapsed.
    pub days: u32,
    pub pacing: Pacing,
    /// Sleep for the tick delay between ticks instead of running flat out.
    pub realtime: bool,
}

/// End-of-run snapshot used by every report format.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RunSummary {
    pub seed: u64,
    pub strategy: String,
    pub difficulty: String,
    pub map_difficulty: String,
    pub map_size: String,
    pub outcome: String,
    pub days_elapsed: u32,
    pub ticks: u64,
    pub map_nodes: usize,
    pub captured_nodes: usize,
    pub explored_nodes: usize,
    pub strongholds_remaining: usize,
    pub capital_level: u8,
    pub cities: usize,
    pub farms: usize,
    pub gold_mines: usize,
    pub walls: usize,
    pub kingdom_population: u32,
    pub purse: u32,
    pub danger: f64,
    pub ledger_consistent: bool,
    pub elapsed_ms: u128,
}

impl RunSummary {
    #[must_use]
    pub fn is_victory(&self) -> bool {
        self.outcome == "Victory"
    }
}

fn outcome_label(outcome: Option<GameOver>) -> &'static str {
    match outcome {
        Some(GameOver::Victory) => "Victory",
        Some(GameOver::Defeat) => "Defeat",
        None => "Ongoing",
    }
}

/// Play one seeded game under `config`, returning the finished instance.
pub fn play(config: &RunConfig, seed: u64) -> (GameInstance, u64) {
    let mut game = GameInstance::new(config.settings.with_seed(seed));
    let mut policy = config.strategy.create_policy(seed);
    let mut ticks = 0_u64;
    debug!(
        "{} starts seed {seed} at {} ticks per day",
        policy.name(),
        config.pacing.ticks_per_cycle()
    );

    while game.state().calendar.day <= config.days {
        policy.act(&mut game);
        let dt = config.pacing.tick_fraction(game.state().calendar.phase);
        ticks += 1;
        if let Err(over) = game.advance(dt) {
            info!("seed {seed}: {over} on day {}", game.state().calendar.day);
            break;
        }
        if config.realtime {
            thread::sleep(config.pacing.tick_delay);
        }
    }
    (game, ticks)
}

#[must_use]
pub fn summarize(
    config: &RunConfig,
    seed: u64,
    game: &GameInstance,
    ticks: u64,
    started: Instant,
) -> RunSummary {
    let state = game.state();
    let count = |kind: SettlementType| {
        state
            .settlements()
            .values()
            .filter(|settlement| settlement.settlement_type() == kind)
            .count()
    };
    RunSummary {
        seed,
        strategy: config.strategy.label().to_string(),
        difficulty: config.settings.difficulty.to_string(),
        map_difficulty: config.settings.map_difficulty.to_string(),
        map_size: config.settings.map_size.to_string(),
        outcome: outcome_label(game.outcome()).to_string(),
        days_elapsed: state.calendar.day.saturating_sub(1),
        ticks,
        map_nodes: state.map.len(),
        captured_nodes: state.captured_nodes().len(),
        explored_nodes: state.explored.len(),
        strongholds_remaining: state.strongholds.len(),
        capital_level: state.capital_level(),
        cities: count(SettlementType::City),
        farms: count(SettlementType::Farm),
        gold_mines: count(SettlementType::GoldMine),
        walls: state.walls.len(),
        kingdom_population: state.kingdom().total(),
        purse: state.ruler.gold,
        danger: state.danger,
        ledger_consistent: state.is_consistent(),
        elapsed_ms: started.elapsed().as_millis(),
    }
}

/// Play and summarize every seed in turn.
#[must_use]
pub fn run_seeds(config: &RunConfig, seeds: &[u64]) -> Vec<(RunSummary, GameInstance)> {
    seeds
        .iter()
        .map(|&seed| {
            let started = Instant::now();
            let (game, ticks) = play(config, seed);
            (summarize(config, seed, &game, ticks, started), game)
        })
        .collect()
}
