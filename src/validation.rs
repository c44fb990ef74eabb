//! Input validation for crew pairing problems.
//!
//! Checks structural integrity of flights and run parameters before the
//! column-generation loop starts. Detects:
//! - Duplicate flight IDs
//! - Non-positive or non-finite flight durations
//! - Empty station codes
//! - Non-finite flight costs
//! - Negative or non-finite limits and costs in the configuration
//! - Degenerate loop settings (zero columns per iteration, non-positive big-M)

use crate::config::PairingConfig;
use crate::models::Flight;
use serde::Serialize;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationErrorKind {
    /// Two flights share the same ID.
    DuplicateId,
    /// A flight duration is zero, negative or not finite.
    NonPositiveDuration,
    /// A flight has an empty origin or destination.
    EmptyStation,
    /// A flight cost is not finite.
    InvalidCost,
    /// A run parameter is out of range.
    InvalidParameter,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a flight list.
///
/// Checks:
/// 1. No duplicate flight IDs
/// 2. Every duration is finite and > 0
/// 3. Origin and destination are non-empty
/// 4. Every cost is finite
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_flights(flights: &[Flight]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for flight in flights {
        if !ids.insert(flight.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate flight ID: {}", flight.id),
            ));
        }

        if !(flight.duration_hours.is_finite() && flight.duration_hours > 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonPositiveDuration,
                format!(
                    "Flight '{}' has duration {}",
                    flight.id, flight.duration_hours
                ),
            ));
        }

        if flight.origin.is_empty() || flight.destination.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyStation,
                format!("Flight '{}' has an empty station code", flight.id),
            ));
        }

        if !flight.cost.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCost,
                format!("Flight '{}' has cost {}", flight.id, flight.cost),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates run parameters.
///
/// Limits and cost coefficients must be finite and non-negative; the loop
/// must inject at least one column per iteration and seed with a positive
/// big-M.
pub fn validate_config(config: &PairingConfig) -> ValidationResult {
    let mut errors = Vec::new();
    let rules = &config.rules;
    let costs = &config.costs;
    let cg = &config.column_generation;

    let non_negative = [
        ("max_duty_hours", rules.max_duty_hours),
        ("max_flying_hours", rules.max_flying_hours),
        ("fixed_duty_cost", costs.fixed_duty_cost),
        ("hourly_flying_cost", costs.hourly_flying_cost),
        ("night_penalty", costs.night_penalty),
        ("overtime_penalty_per_hour", costs.overtime_penalty_per_hour),
        ("overtime_threshold_hours", costs.overtime_threshold_hours),
        ("selection_epsilon", cg.selection_epsilon),
    ];
    for (name, value) in non_negative {
        if !(value.is_finite() && value >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Parameter '{name}' must be finite and non-negative, got {value}"),
            ));
        }
    }

    if matches!(rules.home_base.as_deref(), Some("")) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Parameter 'home_base' must not be empty",
        ));
    }

    if cg.max_columns_per_iteration == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            "Parameter 'max_columns_per_iteration' must be at least 1",
        ));
    }

    if !(cg.big_m.is_finite() && cg.big_m > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidParameter,
            format!("Parameter 'big_m' must be positive, got {}", cg.big_m),
        ));
    }

    if let Some(secs) = cg.time_limit_secs {
        if !(secs.is_finite() && secs >= 0.0) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidParameter,
                format!("Parameter 'time_limit_secs' must be non-negative, got {secs}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
