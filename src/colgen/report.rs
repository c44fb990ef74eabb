//! Solution quality metrics.
//!
//! Summarizes how the final relaxation covers the flight set.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Fully covered | Flights with Σ value of covering columns ≈ 1 |
//! | Seed covered | Flights (partly) covered by a big-M seed |
//! | Fractional columns | Selected columns with value not ≈ 0 or 1 |
//! | Avg legs | Mean flights per selected priced pairing |

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt;

use super::ColumnGenerationResult;
use crate::models::Flight;

const TOLERANCE: f64 = 1e-6;

/// Coverage indicators of a column-generation result.
#[derive(Debug, Clone, Serialize)]
pub struct SolutionKpi {
    /// Number of input flights.
    pub total_flights: usize,
    /// Flights whose coverage is within tolerance of 1.
    pub fully_covered: usize,
    /// Flights covered at least partly by a seed column.
    pub seed_covered: usize,
    /// Selected columns with a fractional value.
    pub fractional_columns: usize,
    /// Whether every selected column is at 1.
    pub is_integral: bool,
    /// Mean legs per selected priced pairing (0 if none).
    pub avg_legs: f64,
    /// Coverage per flight identifier.
    pub coverage: HashMap<String, f64>,
}

impl SolutionKpi {
    /// Computes indicators for `result` over its input `flights`.
    pub fn calculate(result: &ColumnGenerationResult, flights: &[Flight]) -> Self {
        let mut coverage: HashMap<String, f64> =
            flights.iter().map(|f| (f.id.clone(), 0.0)).collect();
        let mut seeded: HashSet<&str> = HashSet::new();
        let mut fractional_columns = 0;
        let mut priced = 0usize;
        let mut priced_legs = 0usize;

        for selected in &result.selected {
            let value = selected.value;
            if value.abs() > TOLERANCE && (value - 1.0).abs() > TOLERANCE {
                fractional_columns += 1;
            }
            if selected.pairing.is_seed() {
                seeded.extend(selected.pairing.flight_ids());
            } else {
                priced += 1;
                priced_legs += selected.pairing.len();
            }
            for id in selected.pairing.flight_ids() {
                if let Some(total) = coverage.get_mut(id) {
                    *total += value;
                }
            }
        }

        let fully_covered = coverage
            .values()
            .filter(|&&total| (total - 1.0).abs() <= TOLERANCE)
            .count();

        let avg_legs = if priced == 0 {
            0.0
        } else {
            priced_legs as f64 / priced as f64
        };

        Self {
            total_flights: flights.len(),
            fully_covered,
            seed_covered: seeded.len(),
            fractional_columns,
            is_integral: fractional_columns == 0,
            avg_legs,
            coverage,
        }
    }

    /// Whether every flight is covered exactly once in value.
    pub fn covers_all(&self) -> bool {
        self.fully_covered == self.total_flights
    }
}

impl fmt::Display for SolutionKpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Coverage: {}/{} flights",
            self.fully_covered, self.total_flights
        )?;
        writeln!(f, "Seed-covered flights: {}", self.seed_covered)?;
        writeln!(
            f,
            "Integral: {} ({} fractional columns)",
            if self.is_integral { "yes" } else { "no" },
            self.fractional_columns
        )?;
        write!(f, "Avg legs per pairing: {:.2}", self.avg_legs)
    }
}
