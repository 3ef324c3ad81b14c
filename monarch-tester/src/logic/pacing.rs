//! Wall-clock pacing: how much of a day or night one fixed-delay tick covers.

use std::time::Duration;

use monarch_game::DayPhase;
use monarch_game::constants::NIGHT_TO_DAY_RATIO;

pub const TICK_DELAY_MS: u64 = 50;
pub const DAY_LENGTH_SECONDS: f64 = 100.0;

/// Fixed-delay clock translating real time into phase fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub tick_delay: Duration,
    pub day_length: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            tick_delay: Duration::from_millis(TICK_DELAY_MS),
            day_length: Duration::from_secs_f64(DAY_LENGTH_SECONDS),
        }
    }
}

impl Pacing {
    /// Real-time length of `phase`.
    #[must_use]
    pub fn phase_length(&self, phase: DayPhase) -> Duration {
        match phase {
            DayPhase::Day => self.day_length,
            DayPhase::Night => self.day_length.mul_f64(NIGHT_TO_DAY_RATIO),
        }
    }

    /// Fraction of `phase` covered by one tick.
    #[must_use]
    pub fn tick_fraction(&self, phase: DayPhase) -> f64 {
        let length = self.phase_length(phase).as_secs_f64();
        if length <= 0.0 {
            return 1.0;
        }
        self.tick_delay.as_secs_f64() / length
    }

    /// Ticks needed for one whole day and night.
    #[must_use]
    pub fn ticks_per_cycle(&self) -> u64 {
        num_ticks(self.tick_fraction(DayPhase::Day)) + num_ticks(self.tick_fraction(DayPhase::Night))
    }
}

fn num_ticks(fraction: f64) -> u64 {
    // Absorb rounding in the fraction before taking the ceiling.
    let value = (1.0 / fraction - 1e-9).ceil();
    if value.is_finite() && value > 0.0 {
        // Bounded by the ratio of two durations, far below u64::MAX.
        value as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pacing_gives_two_thousand_day_ticks() {
        let pacing = Pacing::default();
        assert!((pacing.tick_fraction(DayPhase::Day) - 0.0005).abs() < 1e-12);
        let night = pacing.tick_fraction(DayPhase::Night);
        assert!((night - 0.0005 / 0.666).abs() < 1e-12);
        assert_eq!(pacing.ticks_per_cycle(), 2000 + 1332);
    }

    #[test]
    fn zero_length_days_end_in_one_tick() {
        let pacing = Pacing {
            tick_delay: Duration::from_millis(10),
            day_length: Duration::ZERO,
        };
        assert!((pacing.tick_fraction(DayPhase::Night) - 1.0).abs() < f64::EPSILON);
    }
}
