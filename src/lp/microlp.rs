//! LP engine on `good_lp` with the pure-Rust `microlp` backend.
//!
//! `good_lp` models are built in one shot, so the engine keeps the rows
//! and columns itself and rebuilds the model on every solve. Row duals
//! are obtained by solving the LP dual explicitly:
//!
//! ```text
//! primal: min c·x   s.t. A x (sense) b,  x >= 0
//! dual:   max b·π   s.t. Aᵀ π <= c,      π_i free (=), >= 0 (>=), <= 0 (<=)
//! ```
//!
//! By strong duality both optima coincide, and any optimal `π` is a valid
//! dual price vector for the primal.

use good_lp::{
    constraint, variable, Constraint, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{trace, warn};

use super::{ColId, LpEngine, LpError, RowId, RowSense};

/// Relative tolerance for the primal/dual objective agreement check.
const DUALITY_GAP_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone)]
struct Row {
    rhs: f64,
    sense: RowSense,
}

impl Row {
    /// Whether the row is satisfied by an empty left-hand side.
    fn holds_at_zero(&self) -> bool {
        match self.sense {
            RowSense::Eq => self.rhs.abs() <= f64::EPSILON,
            RowSense::Ge => self.rhs <= 0.0,
            RowSense::Le => self.rhs >= 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Column {
    objective: f64,
    entries: Vec<(RowId, f64)>,
}

#[derive(Debug, Clone)]
struct LpSolution {
    objective: f64,
    values: Vec<f64>,
    duals: Vec<f64>,
}

/// Pure-Rust LP engine backed by `good_lp::microlp`.
///
/// # Performance
/// Nothing is kept between solves. Each `solve` rebuilds both the primal
/// and the dual program from the stored rows and columns and solves them
/// from scratch, so one solve costs more with every column added. In a
/// column-generation loop the master gets slower each iteration.
///
/// # Example
/// ```
/// use u_pairing::lp::{LpEngine, MicroLpEngine, RowSense};
///
/// let mut lp = MicroLpEngine::new();
/// let row = lp.add_row(2.0, RowSense::Ge);
/// let x = lp.add_column(3.0, &[(row, 1.0)]).unwrap();
/// lp.solve().unwrap();
/// assert!((lp.objective_value().unwrap() - 6.0).abs() < 1e-6);
/// assert!((lp.value(x).unwrap() - 2.0).abs() < 1e-6);
/// assert!((lp.dual(row).unwrap() - 3.0).abs() < 1e-6);
/// ```
#[derive(Debug, Default)]
pub struct MicroLpEngine {
    rows: Vec<Row>,
    columns: Vec<Column>,
    solution: Option<LpSolution>,
    solves: usize,
}

impl MicroLpEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful solves so far.
    pub fn solve_count(&self) -> usize {
        self.solves
    }

    fn solution(&self) -> Result<&LpSolution, LpError> {
        self.solution.as_ref().ok_or(LpError::NotSolved)
    }

    /// Solution of a model without columns: every row must hold at zero.
    fn solve_empty(&self) -> Result<LpSolution, LpError> {
        if !self.rows.iter().all(Row::holds_at_zero) {
            return Err(LpError::Infeasible);
        }
        Ok(LpSolution {
            objective: 0.0,
            values: Vec::new(),
            duals: vec![0.0; self.rows.len()],
        })
    }

    fn solve_primal(&self) -> Result<(f64, Vec<f64>), LpError> {
        let mut vars = ProblemVariables::new();
        let xs: Vec<Variable> = self
            .columns
            .iter()
            .map(|_| vars.add(variable().min(0.0)))
            .collect();

        let mut objective = Expression::from(0.0);
        let mut lhs = vec![Expression::from(0.0); self.rows.len()];
        let mut touched = vec![false; self.rows.len()];
        for (column, &x) in self.columns.iter().zip(&xs) {
            objective += column.objective * x;
            for &(row, coef) in &column.entries {
                lhs[row.0] += coef * x;
                touched[row.0] = true;
            }
        }

        // Rows without entries are constant and checked here.
        let mut model = vars.minimise(objective).using(good_lp::microlp);
        for ((row, expr), touched) in self.rows.iter().zip(lhs).zip(touched) {
            if touched {
                model = model.with(row_constraint(expr, row));
            } else if !row.holds_at_zero() {
                return Err(LpError::Infeasible);
            }
        }
        let solution = model.solve().map_err(resolution_error)?;

        let values: Vec<f64> = xs.iter().map(|&x| solution.value(x)).collect();
        let objective = self
            .columns
            .iter()
            .zip(&values)
            .map(|(c, v)| c.objective * v)
            .sum();
        Ok((objective, values))
    }

    fn solve_dual(&self) -> Result<(f64, Vec<f64>), LpError> {
        if self.rows.is_empty() {
            return Ok((0.0, Vec::new()));
        }

        let mut vars = ProblemVariables::new();
        let pis: Vec<Variable> = self
            .rows
            .iter()
            .map(|row| {
                let def = match row.sense {
                    RowSense::Eq => variable(),
                    RowSense::Ge => variable().min(0.0),
                    RowSense::Le => variable().max(0.0),
                };
                vars.add(def)
            })
            .collect();

        let mut objective = Expression::from(0.0);
        for (row, &pi) in self.rows.iter().zip(&pis) {
            objective += row.rhs * pi;
        }

        let mut model = vars.maximise(objective).using(good_lp::microlp);
        for column in self.columns.iter().filter(|c| !c.entries.is_empty()) {
            let mut lhs = Expression::from(0.0);
            for &(row, coef) in &column.entries {
                lhs += coef * pis[row.0];
            }
            model = model.with(constraint::leq(lhs, column.objective));
        }
        let solution = model.solve().map_err(|err| match err {
            // The primal was solved already, so a failing dual is numerical.
            ResolutionError::Infeasible | ResolutionError::Unbounded => {
                LpError::Solver(format!("dual program failed after primal optimum: {err}"))
            }
            other => resolution_error(other),
        })?;

        let duals: Vec<f64> = pis.iter().map(|&pi| solution.value(pi)).collect();
        let objective = self.rows.iter().zip(&duals).map(|(r, d)| r.rhs * d).sum();
        Ok((objective, duals))
    }
}

fn row_constraint(expr: Expression, row: &Row) -> Constraint {
    match row.sense {
        RowSense::Eq => constraint::eq(expr, row.rhs),
        RowSense::Ge => constraint::geq(expr, row.rhs),
        RowSense::Le => constraint::leq(expr, row.rhs),
    }
}

fn resolution_error(err: ResolutionError) -> LpError {
    match err {
        ResolutionError::Infeasible => LpError::Infeasible,
        ResolutionError::Unbounded => LpError::Unbounded,
        other => LpError::Solver(other.to_string()),
    }
}

impl LpEngine for MicroLpEngine {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn add_row(&mut self, rhs: f64, sense: RowSense) -> RowId {
        self.solution = None;
        self.rows.push(Row { rhs, sense });
        RowId(self.rows.len() - 1)
    }

    fn add_column(&mut self, objective: f64, entries: &[(RowId, f64)]) -> Result<ColId, LpError> {
        if let Some(&(row, _)) = entries.iter().find(|(row, _)| row.0 >= self.rows.len()) {
            return Err(LpError::UnknownRow(row.0));
        }
        self.solution = None;
        self.columns.push(Column {
            objective,
            entries: entries.to_vec(),
        });
        Ok(ColId(self.columns.len() - 1))
    }

    fn solve(&mut self) -> Result<(), LpError> {
        self.solution = None;

        let solution = if self.columns.is_empty() {
            self.solve_empty()?
        } else {
            let (objective, values) = self.solve_primal()?;
            let (dual_objective, duals) = self.solve_dual()?;

            let gap = (objective - dual_objective).abs();
            if gap > DUALITY_GAP_TOLERANCE * objective.abs().max(1.0) {
                warn!(
                    primal = objective,
                    dual = dual_objective,
                    "primal and dual objectives disagree"
                );
            }
            LpSolution {
                objective,
                values,
                duals,
            }
        };

        self.solves += 1;
        trace!(
            rows = self.rows.len(),
            columns = self.columns.len(),
            objective = solution.objective,
            "LP solved"
        );
        self.solution = Some(solution);
        Ok(())
    }

    fn objective_value(&self) -> Result<f64, LpError> {
        Ok(self.solution()?.objective)
    }

    fn value(&self, col: ColId) -> Result<f64, LpError> {
        let solution = self.solution()?;
        solution
            .values
            .get(col.0)
            .copied()
            .ok_or_else(|| LpError::Solver(format!("unknown column {}", col.0)))
    }

    fn dual(&self, row: RowId) -> Result<f64, LpError> {
        let solution = self.solution()?;
        solution
            .duals
            .get(row.0)
            .copied()
            .ok_or(LpError::UnknownRow(row.0))
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn release(&mut self) {
        self.rows.clear();
        self.columns.clear();
        self.solution = None;
    }
}
