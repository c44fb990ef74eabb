//! Error taxonomy.
//!
//! Line-level input problems are [`ParseError`](crate::parser::ParseError)s
//! and are recovered by skipping the line. Everything here is fatal to a
//! column-generation run.

use thiserror::Error;

use crate::lp::LpError;
use crate::validation::ValidationError;

/// Result alias for fallible pairing operations.
pub type Result<T> = std::result::Result<T, PairingError>;

/// Fatal errors of the pairing pipeline.
#[derive(Debug, Error)]
pub enum PairingError {
    /// A column was rejected by the master model.
    #[error("invalid column: {0}")]
    InvalidColumn(String),
    /// The master LP has no feasible solution.
    #[error("master problem is infeasible")]
    Infeasible,
    /// The LP engine failed or was queried out of order.
    #[error("LP solver error: {0}")]
    Solver(String),
    /// Reading input failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A configuration document could not be decoded.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Flights or parameters failed validation.
    #[error("invalid input: {}", format_validation(.0))]
    InvalidInput(Vec<ValidationError>),
}

impl From<LpError> for PairingError {
    fn from(err: LpError) -> Self {
        match err {
            LpError::Infeasible => PairingError::Infeasible,
            other => PairingError::Solver(other.to_string()),
        }
    }
}

impl From<Vec<ValidationError>> for PairingError {
    fn from(errors: Vec<ValidationError>) -> Self {
        PairingError::InvalidInput(errors)
    }
}

fn format_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
