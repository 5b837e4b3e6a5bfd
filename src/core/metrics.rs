//! Pure derivations from the raw production and consumption numbers.

use crate::core::reading::{Column, DailySeries};

/// Import/export split of a production–consumption pair.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Split {
    pub import_active: bool,

    /// Share of the consumption which is not covered by the production, percent.
    pub import_pct: f64,

    pub export_active: bool,

    /// Share of the production which is not consumed, percent.
    pub export_pct: f64,
}

impl Split {
    /// Nobody wins, both sides are off.
    pub const BALANCED: Self =
        Self { import_active: false, import_pct: 0.0, export_active: false, export_pct: 0.0 };
}

/// Split the pair into import and export percentages.
///
/// Only the larger side is active. Equal values switch both sides off.
pub fn derive_current_split(consumption: f64, production: f64) -> Split {
    if consumption > production {
        Split {
            import_active: true,
            import_pct: excess_percent(consumption - production, consumption),
            ..Split::BALANCED
        }
    } else if production > consumption {
        Split {
            export_active: true,
            export_pct: excess_percent(production - consumption, production),
            ..Split::BALANCED
        }
    } else {
        Split::BALANCED
    }
}

/// Rounded `excess / base` in percent, zero for a non-positive base or a non-finite quotient.
fn excess_percent(excess: f64, base: f64) -> f64 {
    let percent = (excess / base * 100.0).round();
    if base > 0.0 && percent.is_finite() { percent.clamp(0.0, 100.0) } else { 0.0 }
}

/// Total of the column over the entire series.
#[must_use]
pub fn sum_column(series: &DailySeries, column: Column) -> f64 {
    series.into_iter().map(|sample| sample.get(column)).sum()
}

/// Fraction of the total energy covered by the solar energy.
///
/// Zero total yields zero instead of a non-finite ratio.
#[must_use]
pub fn daily_mix_ratio(solar_energy: f64, total_energy: f64) -> f64 {
    let ratio = solar_energy / total_energy;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Everything derived within a single poll cycle.
#[must_use]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DerivedMetrics {
    pub import_pct: f64,
    pub export_pct: f64,
    pub import_active: bool,
    pub export_active: bool,
    pub daily_mix_ratio: f64,
}

impl DerivedMetrics {
    pub const fn new(current: Split, daily_mix_ratio: f64) -> Self {
        Self {
            import_pct: current.import_pct,
            export_pct: current.export_pct,
            import_active: current.import_active,
            export_active: current.export_active,
            daily_mix_ratio,
        }
    }
}
