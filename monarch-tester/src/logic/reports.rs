use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::simulation::RunSummary;

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    total_duration_ms: u128,
    runs: &'a [RunSummary],
}

pub fn generate_console_report(
    out: &mut dyn Write,
    runs: &[RunSummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Monarch Run Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;

    let victories = runs.iter().filter(|r| r.is_victory()).count();
    let defeats = runs.iter().filter(|r| r.outcome == "Defeat").count();
    writeln!(out, "Total runs: {}", runs.len())?;
    writeln!(out, "Victories: {}", victories.to_string().green())?;
    writeln!(out, "Defeats: {}", defeats.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for run in runs {
        let status = match run.outcome.as_str() {
            "Victory" => run.outcome.green(),
            "Defeat" => run.outcome.red(),
            _ => run.outcome.yellow(),
        };
        writeln!(
            out,
            "{status} {} seed {} ({} / {} {} map)",
            run.strategy.bold(),
            run.seed,
            run.difficulty,
            run.map_difficulty,
            run.map_size
        )?;
        writeln!(
            out,
            "   Day {} after {} ticks, danger {:.2}",
            run.days_elapsed + 1,
            run.ticks,
            run.danger
        )?;
        writeln!(
            out,
            "   Held {}/{} nodes, explored {}, {} strongholds left",
            run.captured_nodes, run.map_nodes, run.explored_nodes, run.strongholds_remaining
        )?;
        writeln!(
            out,
            "   Capital level {}, {} cities, {} farms, {} mines, {} walls",
            run.capital_level, run.cities, run.farms, run.gold_mines, run.walls
        )?;
        writeln!(
            out,
            "   Population {}, purse {}",
            run.kingdom_population, run.purse
        )?;
        if !run.ledger_consistent {
            writeln!(out, "   {}", "Ledger inconsistent!".red().bold())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report(
    out: &mut dyn Write,
    runs: &[RunSummary],
    total_duration: Duration,
) -> Result<()> {
    let report = JsonReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        total_duration_ms: total_duration.as_millis(),
        runs,
    };
    let json_output = serde_json::to_string_pretty(&report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, runs: &[RunSummary]) -> Result<()> {
    writeln!(out, "# Monarch Run Results\n")?;
    writeln!(
        out,
        "_Generated {}_\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(
        out,
        "| Seed | Strategy | Outcome | Day | Held | Strongholds left | Population |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for run in runs {
        writeln!(
            out,
            "| {} | {} | {} | {} | {}/{} | {} | {} |",
            run.seed,
            run.strategy,
            run.outcome,
            run.days_elapsed + 1,
            run.captured_nodes,
            run.map_nodes,
            run.strongholds_remaining,
            run.kingdom_population
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RunSummary {
        RunSummary {
            seed: 42,
            strategy: "Warlord".to_string(),
            difficulty: "Hard".to_string(),
            map_difficulty: "Moderate".to_string(),
            map_size: "Small".to_string(),
            outcome: "Defeat".to_string(),
            days_elapsed: 6,
            ticks: 23_324,
            map_nodes: 31,
            captured_nodes: 4,
            explored_nodes: 9,
            strongholds_remaining: 12,
            capital_level: 3,
            cities: 1,
            farms: 1,
            gold_mines: 0,
            walls: 2,
            kingdom_population: 17,
            purse: 3,
            danger: 8.15,
            ledger_consistent: true,
            elapsed_ms: 12,
        }
    }

    #[test]
    fn json_report_wraps_runs_with_a_timestamp() {
        let mut buffer = Vec::new();
        generate_json_report(&mut buffer, &[sample()], Duration::from_millis(40)).expect("report");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");
        assert_eq!(value["total_duration_ms"], 40);
        assert_eq!(value["runs"][0]["seed"], 42);
        assert_eq!(value["runs"][0]["outcome"], "Defeat");
        assert!(value["generated_at"].as_str().is_some_and(|s| s.contains('T')));
    }

    #[test]
    fn markdown_report_has_one_row_per_run() {
        let mut buffer = Vec::new();
        generate_markdown_report(&mut buffer, &[sample(), sample()]).expect("report");
        let text = String::from_utf8(buffer).expect("utf8");
        assert_eq!(text.matches("| 42 | Warlord | Defeat | 7 | 4/31 |").count(), 2);
    }

    #[test]
    fn console_report_flags_broken_ledgers() {
        colored::control::set_override(false);
        let mut broken = sample();
        broken.ledger_consistent = false;
        let mut buffer = Vec::new();
        generate_console_report(&mut buffer, &[broken], Duration::ZERO).expect("report");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains("Defeats: 1"));
        assert!(text.contains("Ledger inconsistent!"));
    }
}
