//! Housing capacity and the population growth modifier it drives.

use serde::{Deserialize, Serialize};

use crate::constants::HOUSING_PER_OPEN_NODE;
use crate::numbers::round_f64_to_u32;
use crate::settlement::{Settlement, SettlementType};

/// Multiplier applied to Capital/City growth, picked from the
/// population-to-housing ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthModifier {
    Green,
    Yellow,
    Red,
    Black,
}

impl GrowthModifier {
    /// Ascending by threshold.
    pub const ALL: [Self; 4] = [Self::Green, Self::Yellow, Self::Red, Self::Black];

    #[must_use]
    pub const fn threshold(self) -> f64 {
        match self {
            Self::Green => 0.0,
            Self::Yellow => 0.75,
            Self::Red => 1.0,
            Self::Black => 1.2,
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Green => 1.0,
            Self::Yellow => 0.8,
            Self::Red => 0.5,
            Self::Black => 0.05,
        }
    }

    /// Tier with the highest threshold not exceeding `ratio`.
    #[must_use]
    pub fn for_ratio(ratio: f64) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|tier| tier.threshold() <= ratio)
            .unwrap_or(Self::Green)
    }

    /// Tier for a kingdom of `population` living in `housing`. With no housing
    /// at all, any population is treated as the harshest tier.
    #[must_use]
    pub fn for_population(population: u32, housing: u32) -> Self {
        if housing == 0 {
            return if population == 0 { Self::Green } else { Self::Black };
        }
        Self::for_ratio(f64::from(population) / f64::from(housing))
    }
}

/// Aggregated housing capacity of the kingdom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HousingTracker {
    open_nodes: u32,
    from_cities: u32,
    from_capital: u32,
    total: u32,
}

impl HousingTracker {
    /// Rebuild from the number of captured nodes without a settlement and the
    /// settlements on captured land. Building sites contribute nothing.
    pub fn recalculate<'a>(
        &mut self,
        open_nodes: usize,
        settlements: impl IntoIterator<Item = &'a Settlement>,
    ) {
        self.open_nodes = u32::try_from(open_nodes).unwrap_or(u32::MAX);
        self.from_cities = 0;
        self.from_capital = 0;
        for settlement in settlements {
            if settlement.is_building_site() {
                continue;
            }
            match settlement.settlement_type() {
                SettlementType::City => self.from_cities += settlement.housing_capacity(),
                SettlementType::Capital => self.from_capital = settlement.housing_capacity(),
                _ => {}
            }
        }
        self.total = self.from_cities + self.from_capital + self.open_node_housing();
    }

    #[must_use]
    pub fn open_node_housing(&self) -> u32 {
        round_f64_to_u32(HOUSING_PER_OPEN_NODE * f64::from(self.open_nodes))
    }

    #[must_use]
    pub const fn open_nodes(&self) -> u32 {
        self.open_nodes
    }

    #[must_use]
    pub const fn capital_housing(&self) -> u32 {
        self.from_capital
    }

    #[must_use]
    pub const fn cities_housing(&self) -> u32 {
        self.from_cities
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.total
    }
}
