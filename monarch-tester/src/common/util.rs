use chrono::Utc;

/// Save slot for one run: strategy, seed and a UTC timestamp.
pub fn save_slot(strategy: &str, seed: u64) -> String {
    let ts = Utc::now().format("%Y%m%dT%H%M%S");
    let strategy = strategy.to_ascii_lowercase().replace(' ', "-");
    format!("{strategy}-seed-{seed}-{ts}")
}

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_csv_trims_and_filters() {
        let parts = split_csv(" idle, ,warlord,  7 ");
        assert_eq!(parts, vec!["idle", "warlord", "7"]);
    }

    #[test]
    fn save_slots_name_strategy_and_seed() {
        let slot = save_slot("Warlord", 42);
        assert!(slot.starts_with("warlord-seed-42-"));
        assert!(slot.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
    }
}
