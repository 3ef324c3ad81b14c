use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::{LevelFilter, info, warn};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use monarch_game::{DifficultyLevel, GameEngine, GameInstance, GameSettings, MapDifficulty, MapSize};

mod common;
mod logic;

use common::util::{save_slot, split_csv};
use logic::{
    GameplayStrategy, JsonFileStorage, Pacing, RunConfig, RunSummary, resolve_seed_inputs,
    run_seeds,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for DifficultyLevel {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MapDifficultyArg {
    Easy,
    Moderate,
    Hard,
}

impl From<MapDifficultyArg> for MapDifficulty {
    fn from(value: MapDifficultyArg) -> Self {
        match value {
            MapDifficultyArg::Easy => Self::Easy,
            MapDifficultyArg::Moderate => Self::Moderate,
            MapDifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum MapSizeArg {
    Small,
    Medium,
    Large,
}

impl From<MapSizeArg> for MapSize {
    fn from(value: MapSizeArg) -> Self {
        match value {
            MapSizeArg::Small => Self::Small,
            MapSizeArg::Medium => Self::Medium,
            MapSizeArg::Large => Self::Large,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "monarch-tester")]
#[command(about = "Headless autoplay runner for the Monarch engine")]
struct Args {
    /// Seeds to run (comma-separated; ranges like 1..5 and `random` allowed)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Autoplay strategies (comma-separated, or `all`)
    #[arg(long, default_value = "expansionist")]
    strategies: String,

    /// Enemy difficulty
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,

    /// Map tuning difficulty
    #[arg(long, value_enum, default_value_t = MapDifficultyArg::Moderate)]
    map_difficulty: MapDifficultyArg,

    /// Map size
    #[arg(long, value_enum, default_value_t = MapSizeArg::Small)]
    map_size: MapSizeArg,

    /// Days to play before stopping an undecided game
    #[arg(long, default_value_t = 7)]
    days: u32,

    /// Sleep between ticks like the interactive game loop
    #[arg(long)]
    realtime: bool,

    /// Directory to save final snapshots into (one JSON file per run)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    announce_banner();

    let start_time = Instant::now();
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let strategies = expand_strategies(&args.strategies)?;
    let settings = settings_from(&args);

    let mut summaries = Vec::new();
    for strategy in strategies {
        let config = RunConfig {
            settings,
            strategy,
            days: args.days,
            pacing: Pacing::default(),
            realtime: args.realtime,
        };
        info!("running {strategy} over {} seed(s)", seeds.len());
        for (summary, game) in run_seeds(&config, &seeds) {
            if let Some(dir) = &args.save_dir {
                save_snapshot(dir, &summary, &game)?;
            }
            summaries.push(summary);
        }
    }

    write_reports(&args, &summaries, start_time)?;

    if summaries.iter().any(|summary| !summary.ledger_consistent) {
        std::process::exit(1);
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn announce_banner() {
    eprintln!("{}", "Monarch Automated Tester".bright_cyan().bold());
    eprintln!("{}", "========================".cyan());
}

fn settings_from(args: &Args) -> GameSettings {
    GameSettings::new(
        args.difficulty.into(),
        args.map_difficulty.into(),
        args.map_size.into(),
    )
}

fn expand_strategies(arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for key in split_csv(arg) {
        if key.eq_ignore_ascii_case("all") {
            strategies.extend(GameplayStrategy::ALL);
            continue;
        }
        match GameplayStrategy::from_key(&key) {
            Some(strategy) => strategies.push(strategy),
            None => bail!("Unknown strategy: {key}"),
        }
    }
    strategies.dedup();
    if strategies.is_empty() {
        strategies.push(GameplayStrategy::Expansionist);
    }
    Ok(strategies)
}

/// Save the final state and make sure it loads back identically.
fn save_snapshot(dir: &std::path::Path, summary: &RunSummary, game: &GameInstance) -> Result<()> {
    let engine = GameEngine::new(JsonFileStorage::new(dir));
    let slot = save_slot(&summary.strategy, summary.seed);
    engine
        .save_game(&slot, game)
        .with_context(|| format!("failed to save {slot}"))?;
    match engine.load_game(&slot)? {
        Some(loaded) if loaded.state() == game.state() => {
            info!("saved {slot} to {}", dir.display());
        }
        Some(_) => warn!("{slot} reloaded with a different state"),
        None => bail!("{slot} vanished right after saving"),
    }
    Ok(())
}

fn write_reports(args: &Args, summaries: &[RunSummary], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let duration = start_time.elapsed();

    match args.report.as_str() {
        "json" => logic::reports::generate_json_report(&mut output_target, summaries, duration)?,
        "markdown" => logic::reports::generate_markdown_report(&mut output_target, summaries)?,
        _ => {
            if summaries.is_empty() {
                writeln!(&mut output_target, "No runs executed.")?;
            } else {
                logic::reports::generate_console_report(&mut output_target, summaries, duration)?;
            }
        }
    }

    output_target.flush()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            Self::Stdout(writer) => writer.write(buf),
            Self::File(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(writer) => writer.flush(),
            Self::File(writer) => writer.flush(),
        }
    }
}
