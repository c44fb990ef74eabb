//! Run parameters.
//!
//! Duty rules and the cost model configure the pricing search; the
//! column-generation settings configure the master loop. Every field has
//! a default, so partial JSON files are accepted.
//!
//! # Defaults
//!
//! | Parameter | Default |
//! |-----------|---------|
//! | home base | base of the first flight |
//! | max duty | 12 h |
//! | max flying | 8 h |
//! | min turnaround | 40 min |
//! | overnight duties | not allowed |
//! | fixed cost per duty | 200 |
//! | hourly flying cost | 100 |
//! | night penalty | 150 |
//! | overtime penalty | 120 per hour above 8 h duty |
//! | columns per iteration | 10 |
//! | big-M seed cost | 1 000 000 |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::Result;

/// Operational limits a pairing must respect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DutyRules {
    /// Home-base station. `None` = base of the first loaded flight.
    pub home_base: Option<String>,
    /// Maximum duty span (hours).
    pub max_duty_hours: f64,
    /// Maximum total block time (hours).
    pub max_flying_hours: f64,
    /// Minimum turnaround between consecutive legs (minutes).
    pub min_turnaround_minutes: u32,
    /// Whether connections may wrap past midnight.
    pub allow_overnight: bool,
}

impl Default for DutyRules {
    fn default() -> Self {
        Self {
            home_base: None,
            max_duty_hours: 12.0,
            max_flying_hours: 8.0,
            min_turnaround_minutes: 40,
            allow_overnight: false,
        }
    }
}

impl DutyRules {
    /// Creates the default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the home base.
    pub fn with_home_base(mut self, base: impl Into<String>) -> Self {
        self.home_base = Some(base.into());
        self
    }

    /// Sets the maximum duty span (hours).
    pub fn with_max_duty_hours(mut self, hours: f64) -> Self {
        self.max_duty_hours = hours;
        self
    }

    /// Sets the maximum flying time (hours).
    pub fn with_max_flying_hours(mut self, hours: f64) -> Self {
        self.max_flying_hours = hours;
        self
    }

    /// Sets the minimum turnaround (minutes).
    pub fn with_min_turnaround(mut self, minutes: u32) -> Self {
        self.min_turnaround_minutes = minutes;
        self
    }

    /// Allows or forbids overnight connections.
    pub fn with_overnight(mut self, allow: bool) -> Self {
        self.allow_overnight = allow;
        self
    }
}

/// Cost model of a pairing.
///
/// `cost = Σ leg cost + fixed + flying_hours × hourly
///        + night_penalty (any night leg)
///        + overtime_penalty × max(0, duty_hours − overtime_threshold)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    /// Fixed cost per duty.
    pub fixed_duty_cost: f64,
    /// Cost per block hour.
    pub hourly_flying_cost: f64,
    /// Penalty applied once if any leg is a night flight.
    pub night_penalty: f64,
    /// Penalty per duty hour above the overtime threshold.
    pub overtime_penalty_per_hour: f64,
    /// Duty hours after which overtime is charged.
    pub overtime_threshold_hours: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            fixed_duty_cost: 200.0,
            hourly_flying_cost: 100.0,
            night_penalty: 150.0,
            overtime_penalty_per_hour: 120.0,
            overtime_threshold_hours: 8.0,
        }
    }
}

impl CostModel {
    /// Creates the default cost model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fixed cost per duty.
    pub fn with_fixed_cost(mut self, cost: f64) -> Self {
        self.fixed_duty_cost = cost;
        self
    }

    /// Sets the hourly flying cost.
    pub fn with_hourly_cost(mut self, cost: f64) -> Self {
        self.hourly_flying_cost = cost;
        self
    }

    /// Sets the night penalty.
    pub fn with_night_penalty(mut self, penalty: f64) -> Self {
        self.night_penalty = penalty;
        self
    }

    /// Sets the overtime penalty and its threshold.
    pub fn with_overtime(mut self, penalty_per_hour: f64, threshold_hours: f64) -> Self {
        self.overtime_penalty_per_hour = penalty_per_hour;
        self.overtime_threshold_hours = threshold_hours;
        self
    }
}

/// Settings of the column-generation loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnGenerationConfig {
    /// Maximum number of columns injected per iteration.
    pub max_columns_per_iteration: usize,
    /// Placeholder cost of single-flight seed columns.
    pub big_m: f64,
    /// Variable value above which a column counts as selected.
    pub selection_epsilon: f64,
    /// Stop after this many master solves. `None` = until convergence.
    pub max_iterations: Option<usize>,
    /// Wall-clock budget in seconds. `None` = unbounded.
    pub time_limit_secs: Option<f64>,
}

impl Default for ColumnGenerationConfig {
    fn default() -> Self {
        Self {
            max_columns_per_iteration: 10,
            big_m: 1_000_000.0,
            selection_epsilon: 1e-4,
            max_iterations: None,
            time_limit_secs: None,
        }
    }
}

impl ColumnGenerationConfig {
    /// Creates the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-iteration column cap.
    pub fn with_max_columns(mut self, n: usize) -> Self {
        self.max_columns_per_iteration = n;
        self
    }

    /// Sets the big-M seed cost.
    pub fn with_big_m(mut self, big_m: f64) -> Self {
        self.big_m = big_m;
        self
    }

    /// Caps the number of master solves.
    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Sets a wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = Some(limit.as_secs_f64());
        self
    }

    /// Wall-clock budget as a `Duration`, if set and representable.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

/// Complete parameter set of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairingConfig {
    /// Operational limits.
    pub rules: DutyRules,
    /// Pairing cost model.
    pub costs: CostModel,
    /// Loop settings.
    pub column_generation: ColumnGenerationConfig,
}

impl PairingConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the duty rules.
    pub fn with_rules(mut self, rules: DutyRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the cost model.
    pub fn with_costs(mut self, costs: CostModel) -> Self {
        self.costs = costs;
        self
    }

    /// Sets the loop settings.
    pub fn with_column_generation(mut self, config: ColumnGenerationConfig) -> Self {
        self.column_generation = config;
        self
    }

    /// Parses a (possibly partial) JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a (possibly partial) JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PairingConfig::default();
        assert_eq!(config.rules.home_base, None);
        assert!((config.rules.max_duty_hours - 12.0).abs() < 1e-10);
        assert!((config.rules.max_flying_hours - 8.0).abs() < 1e-10);
        assert_eq!(config.rules.min_turnaround_minutes, 40);
        assert!(!config.rules.allow_overnight);
        assert!((config.costs.fixed_duty_cost - 200.0).abs() < 1e-10);
        assert!((config.costs.hourly_flying_cost - 100.0).abs() < 1e-10);
        assert!((config.costs.night_penalty - 150.0).abs() < 1e-10);
        assert!((config.costs.overtime_penalty_per_hour - 120.0).abs() < 1e-10);
        assert!((config.costs.overtime_threshold_hours - 8.0).abs() < 1e-10);
        assert_eq!(config.column_generation.max_columns_per_iteration, 10);
        assert!((config.column_generation.big_m - 1e6).abs() < 1e-10);
        assert_eq!(config.column_generation.time_limit(), None);
    }

    #[test]
    fn test_builders() {
        let rules = DutyRules::new()
            .with_home_base("HUB")
            .with_max_duty_hours(10.0)
            .with_max_flying_hours(6.0)
            .with_min_turnaround(30)
            .with_overnight(true);
        assert_eq!(rules.home_base.as_deref(), Some("HUB"));
        assert_eq!(rules.min_turnaround_minutes, 30);
        assert!(rules.allow_overnight);

        let costs = CostModel::new().with_overtime(50.0, 9.0);
        assert!((costs.overtime_threshold_hours - 9.0).abs() < 1e-10);

        let cg = ColumnGenerationConfig::new()
            .with_max_columns(3)
            .with_max_iterations(7)
            .with_time_limit(Duration::from_millis(1500));
        assert_eq!(cg.max_columns_per_iteration, 3);
        assert_eq!(cg.max_iterations, Some(7));
        assert_eq!(cg.time_limit(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_partial_json() {
        let config = PairingConfig::from_json_str(
            r#"{ "rules": { "home_base": "HUB", "allow_overnight": true },
                 "costs": { "night_penalty": 0 } }"#,
        )
        .unwrap();
        assert_eq!(config.rules.home_base.as_deref(), Some("HUB"));
        assert!(config.rules.allow_overnight);
        assert!((config.rules.max_duty_hours - 12.0).abs() < 1e-10);
        assert!((config.costs.night_penalty - 0.0).abs() < 1e-10);
        assert!((config.costs.fixed_duty_cost - 200.0).abs() < 1e-10);
        assert_eq!(config.column_generation, ColumnGenerationConfig::default());
    }

    #[test]
    fn test_bad_json() {
        assert!(PairingConfig::from_json_str("{ \"rules\": 5 }").is_err());
    }
}
