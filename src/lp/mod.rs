//! Linear-programming engine seam.
//!
//! The master problem talks to an LP solver only through [`LpEngine`]:
//! add rows, add columns incrementally, solve, and read back objective,
//! primal values and row duals. Any solver with those capabilities can
//! back the column-generation loop.
//!
//! # Implementations
//!
//! - [`MicroLpEngine`]: pure-Rust engine on `good_lp` + `microlp`.
//!
//! # Reference
//! Chvátal (1983), "Linear Programming", Ch. 5 (Duality)

mod microlp;

pub use self::microlp::MicroLpEngine;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Handle of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub usize);

/// Handle of a variable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColId(pub usize);

/// Sense of a constraint row `a·x (sense) rhs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowSense {
    /// `a·x = rhs`
    Eq,
    /// `a·x >= rhs`
    Ge,
    /// `a·x <= rhs`
    Le,
}

/// Errors reported by an LP engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LpError {
    /// No point satisfies the constraints.
    #[error("problem is infeasible")]
    Infeasible,
    /// The objective decreases without bound.
    #[error("problem is unbounded")]
    Unbounded,
    /// A column referenced a row that does not exist.
    #[error("unknown row {0}")]
    UnknownRow(usize),
    /// Results were requested before a successful solve.
    #[error("model not solved")]
    NotSolved,
    /// Backend failure.
    #[error("{0}")]
    Solver(String),
}

/// A minimizing LP solver with incremental column addition.
///
/// All columns are continuous with bounds `[0, +inf)`. Results are valid
/// only between a successful [`solve`](LpEngine::solve) and the next
/// mutation.
pub trait LpEngine: Debug {
    /// Engine name for logs.
    fn name(&self) -> &'static str;

    /// Adds a constraint row with empty left-hand side.
    fn add_row(&mut self, rhs: f64, sense: RowSense) -> RowId;

    /// Adds a continuous column with objective coefficient and row entries.
    fn add_column(&mut self, objective: f64, entries: &[(RowId, f64)]) -> Result<ColId, LpError>;

    /// Solves the current model to optimality.
    fn solve(&mut self) -> Result<(), LpError>;

    /// Objective value of the last solve.
    fn objective_value(&self) -> Result<f64, LpError>;

    /// Primal value of a column in the last solve.
    fn value(&self, col: ColId) -> Result<f64, LpError>;

    /// Dual price (shadow price) of a row in the last solve.
    fn dual(&self, row: RowId) -> Result<f64, LpError>;

    /// Number of rows.
    fn row_count(&self) -> usize;

    /// Number of columns.
    fn column_count(&self) -> usize;

    /// Frees solver-held resources. The engine must not be used afterwards.
    fn release(&mut self) {}
}
