use std::process::Command;

fn tester() -> Command {
    Command::new(env!("CARGO_BIN_EXE_monarch-tester"))
}

#[test]
fn json_reports_cover_every_seed_and_strategy() {
    let output = tester()
        .args([
            "--seeds",
            "3,4",
            "--strategies",
            "idle,expansionist",
            "--days",
            "1",
            "--difficulty",
            "easy",
            "--report",
            "json",
        ])
        .output()
        .expect("tester runs");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json report");
    let runs = report["runs"].as_array().expect("runs array");
    assert_eq!(runs.len(), 4);
    for run in runs {
        assert_eq!(run["ledger_consistent"], true);
        assert_eq!(run["difficulty"], "Easy");
    }
}

#[test]
fn unknown_strategies_fail_cleanly() {
    let output = tester()
        .args(["--strategies", "pacifist", "--days", "1"])
        .output()
        .expect("tester runs");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown strategy"));
}
