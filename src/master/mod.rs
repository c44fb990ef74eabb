//! Restricted master problem.
//!
//! Holds the LP relaxation of the set-partitioning formulation over the
//! columns known so far:
//!
//! ```text
//! min  Σ_p cost(p) · x_p
//! s.t. Σ_{p ∋ f} x_p = 1     for every flight f
//!      x_p >= 0
//! ```
//!
//! Columns live in an append-only arena indexed by [`ColumnId`]. Rows are
//! fixed at construction, one per flight, in flight order. Columns are
//! never removed.
//!
//! # Reference
//! Desrosiers & Lübbecke (2005), "A Primer in Column Generation", in
//! Column Generation, Springer, Ch. 1

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{PairingError, Result};
use crate::lp::{ColId, LpEngine, RowId, RowSense};
use crate::models::{Flight, Pairing, PairingOrigin, SelectedPairing};

/// Index of a column in the master arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnId(pub usize);

/// Default value above which a column counts as selected.
pub const DEFAULT_SELECTION_EPSILON: f64 = 1e-4;

/// The restricted master problem over an [`LpEngine`].
///
/// Owns the engine. [`release`](MasterModel::release) frees solver
/// resources; dropping an unreleased model releases it as well, so every
/// exit path releases exactly once.
#[derive(Debug)]
pub struct MasterModel<E: LpEngine> {
    engine: E,
    flight_ids: Vec<String>,
    rows: Vec<RowId>,
    row_of: HashMap<String, usize>,
    columns: Vec<Pairing>,
    vars: Vec<ColId>,
    keys: HashMap<(PairingOrigin, Vec<String>), ColumnId>,
    released: bool,
}

impl<E: LpEngine> MasterModel<E> {
    /// Builds the coverage rows, one equality row with rhs 1 per flight.
    pub fn new(flights: &[Flight], mut engine: E) -> Self {
        let mut rows = Vec::with_capacity(flights.len());
        let mut row_of = HashMap::with_capacity(flights.len());
        for (i, flight) in flights.iter().enumerate() {
            rows.push(engine.add_row(1.0, RowSense::Eq));
            row_of.insert(flight.id.clone(), i);
        }
        Self {
            engine,
            flight_ids: flights.iter().map(|f| f.id.clone()).collect(),
            rows,
            row_of,
            columns: Vec::new(),
            vars: Vec::new(),
            keys: HashMap::new(),
            released: false,
        }
    }

    /// Adds one big-M single-flight column per flight.
    ///
    /// Guarantees the first solve is feasible. Returns the number of
    /// columns added.
    pub fn seed(&mut self, flights: &[Flight], big_m: f64) -> Result<usize> {
        let mut added = 0;
        for flight in flights {
            self.add_column(Pairing::seed(flight.clone(), big_m))?;
            added += 1;
        }
        debug!(columns = added, big_m, "seeded master problem");
        Ok(added)
    }

    /// Registers a pairing as a new column.
    ///
    /// The variable is continuous in `[0, +inf)` with objective coefficient
    /// `pairing.cost()` and coefficient 1 in each covered flight's row.
    /// A pairing already in the model is not added again; its existing id
    /// is returned.
    ///
    /// # Errors
    /// `InvalidColumn` if the pairing is empty or covers a flight without
    /// a coverage row.
    pub fn add_column(&mut self, pairing: Pairing) -> Result<ColumnId> {
        if pairing.is_empty() {
            return Err(PairingError::InvalidColumn("pairing has no flights".into()));
        }
        let key = pairing.key();
        if let Some(&existing) = self.keys.get(&key) {
            return Ok(existing);
        }

        let mut entries = Vec::with_capacity(pairing.len());
        let mut seen = HashSet::with_capacity(pairing.len());
        for flight in pairing.flights() {
            let row = *self.row_of.get(&flight.id).ok_or_else(|| {
                PairingError::InvalidColumn(format!("unknown flight '{}'", flight.id))
            })?;
            if seen.insert(row) {
                entries.push((self.rows[row], 1.0));
            }
        }

        let var = self.engine.add_column(pairing.cost(), &entries)?;
        let id = ColumnId(self.columns.len());
        self.columns.push(pairing);
        self.vars.push(var);
        self.keys.insert(key, id);
        Ok(id)
    }

    /// Whether a structurally identical column is already present.
    pub fn contains(&self, pairing: &Pairing) -> bool {
        self.keys.contains_key(&pairing.key())
    }

    /// Solves the current relaxation.
    ///
    /// # Errors
    /// `Infeasible` if no solution exists, `Solver` for engine failures.
    pub fn solve(&mut self) -> Result<()> {
        self.engine.solve()?;
        Ok(())
    }

    /// Optimal objective of the last solve.
    pub fn objective_value(&self) -> Result<f64> {
        Ok(self.engine.objective_value()?)
    }

    /// Dual prices aligned to the flights given at construction.
    ///
    /// Valid only right after a successful [`solve`](Self::solve).
    pub fn dual_prices(&self) -> Result<Vec<f64>> {
        self.rows
            .iter()
            .map(|&row| self.engine.dual(row).map_err(PairingError::from))
            .collect()
    }

    /// Value of one column in the last solve.
    pub fn value(&self, id: ColumnId) -> Result<f64> {
        let var = self
            .vars
            .get(id.0)
            .ok_or_else(|| PairingError::Solver(format!("unknown column {}", id.0)))?;
        Ok(self.engine.value(*var)?)
    }

    /// All columns with value above `epsilon`, in insertion order.
    pub fn selected_pairings(&self, epsilon: f64) -> Result<Vec<SelectedPairing>> {
        let mut selected = Vec::new();
        for (pairing, &var) in self.columns.iter().zip(&self.vars) {
            let value = self.engine.value(var)?;
            if value > epsilon {
                selected.push(SelectedPairing {
                    pairing: pairing.clone(),
                    value,
                });
            }
        }
        Ok(selected)
    }

    /// Column by id.
    pub fn column(&self, id: ColumnId) -> Option<&Pairing> {
        self.columns.get(id.0)
    }

    /// All columns in insertion order.
    pub fn columns(&self) -> &[Pairing] {
        &self.columns
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Flight identifiers in row order.
    pub fn flight_ids(&self) -> &[String] {
        &self.flight_ids
    }

    /// Releases solver resources.
    pub fn release(mut self) {
        self.release_engine();
    }

    fn release_engine(&mut self) {
        if !self.released {
            self.released = true;
            self.engine.release();
            debug!(engine = self.engine.name(), "master problem released");
        }
    }
}

impl<E: LpEngine> Drop for MasterModel<E> {
    fn drop(&mut self) {
        self.release_engine();
    }
}
