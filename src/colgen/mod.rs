//! Column-generation loop.
//!
//! Alternates between the restricted master problem and the pricing
//! search until pricing finds no improving duty:
//!
//! ```text
//! Seeding → Solving → Pricing → Injecting → Solving → … → Converged
//! ```
//!
//! 1. **Seeding**: one big-M column per flight makes the first LP feasible.
//! 2. **Solving**: solve the master, record the objective.
//! 3. **Pricing**: read row duals, search for negative-reduced-cost duties.
//! 4. **Injecting**: add the best candidates (most negative reduced cost
//!    first, at most `max_columns_per_iteration`). Nothing new → converged.
//!
//! The optional iteration and time limits are checked on entry to
//! Pricing, so the reported solution always belongs to the current
//! column set.
//!
//! # Reference
//! Desrosiers & Lübbecke (2005), "A Primer in Column Generation", in
//! Column Generation, Springer, Ch. 1

mod report;

pub use report::SolutionKpi;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::{ColumnGenerationConfig, PairingConfig};
use crate::error::Result;
use crate::lp::{LpEngine, MicroLpEngine};
use crate::master::MasterModel;
use crate::models::{DualPrices, Flight, Pairing, SelectedPairing};
use crate::pricing::PricingEngine;
use crate::validation::{validate_config, validate_flights};

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoopStatus {
    /// Pricing found no improving column.
    Converged,
    /// `max_iterations` master solves were performed.
    IterationLimit,
    /// The wall-clock budget ran out.
    TimeLimit,
}

impl fmt::Display for LoopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopStatus::Converged => write!(f, "converged"),
            LoopStatus::IterationLimit => write!(f, "iteration limit"),
            LoopStatus::TimeLimit => write!(f, "time limit"),
        }
    }
}

/// Progress of one priced iteration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    /// 1-based master solve number.
    pub iteration: usize,
    /// Master objective of this solve.
    pub objective: f64,
    /// Duties returned by pricing.
    pub candidates: usize,
    /// New columns injected.
    pub columns_added: usize,
    /// Most negative reduced cost among candidates (0 if none).
    pub best_reduced_cost: f64,
}

/// Outcome of a column-generation run.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnGenerationResult {
    /// Stop reason.
    pub status: LoopStatus,
    /// Objective of the final master solve.
    pub objective: f64,
    /// Number of master solves.
    pub iterations: usize,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Columns in the master at the end, seeds included.
    pub column_count: usize,
    /// Columns with value above the selection epsilon, in insertion order.
    pub selected: Vec<SelectedPairing>,
    /// Per-iteration progress.
    pub history: Vec<IterationRecord>,
    /// Duals of the final master solve.
    pub final_duals: DualPrices,
}

impl ColumnGenerationResult {
    /// Whether the loop ran to convergence.
    pub fn is_converged(&self) -> bool {
        self.status == LoopStatus::Converged
    }

    /// Selected pairings that are not big-M seeds.
    pub fn priced_pairings(&self) -> impl Iterator<Item = &SelectedPairing> {
        self.selected.iter().filter(|s| !s.pairing.is_seed())
    }
}

impl fmt::Display for ColumnGenerationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Final objective: {:.2}", self.objective)?;
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Elapsed: {:.3} s", self.elapsed.as_secs_f64())?;
        writeln!(f, "Selected pairings ({}):", self.selected.len())?;
        for selected in &self.selected {
            if (selected.value - 1.0).abs() < 1e-6 {
                writeln!(f, "  {}", selected.pairing)?;
            } else {
                writeln!(f, "  {} x {:.4}", selected.pairing, selected.value)?;
            }
        }
        Ok(())
    }
}

/// Loop state machine.
#[derive(Debug)]
enum LoopState {
    Seeding,
    Solving,
    Pricing,
    Injecting {
        duals: DualPrices,
        candidates: Vec<Pairing>,
    },
    Done(LoopStatus),
}

/// Column-generation driver.
///
/// # Example
/// ```
/// use u_pairing::colgen::{ColumnGeneration, LoopStatus};
/// use u_pairing::config::{ColumnGenerationConfig, CostModel, DutyRules};
/// use u_pairing::lp::MicroLpEngine;
/// use u_pairing::models::{ClockTime, Flight};
/// use u_pairing::pricing::PricingEngine;
///
/// let t = |s| ClockTime::parse(s).unwrap();
/// let flights = vec![
///     Flight::new("A", "BASE", "X").with_times(t("08:00"), t("10:00")).with_duration(2.0),
///     Flight::new("B", "X", "BASE").with_times(t("11:00"), t("13:00")).with_duration(2.0),
/// ];
/// let pricing = PricingEngine::new(&flights, "BASE", DutyRules::new(), CostModel::new());
/// let result = ColumnGeneration::new(pricing, ColumnGenerationConfig::new())
///     .run(&flights, MicroLpEngine::new())
///     .unwrap();
/// assert_eq!(result.status, LoopStatus::Converged);
/// assert_eq!(result.selected[0].pairing.label(), "A-B");
/// ```
#[derive(Debug, Clone)]
pub struct ColumnGeneration {
    pricing: PricingEngine,
    config: ColumnGenerationConfig,
}

impl ColumnGeneration {
    /// Creates a driver around a pricing engine.
    pub fn new(pricing: PricingEngine, config: ColumnGenerationConfig) -> Self {
        Self { pricing, config }
    }

    /// Pricing engine in use.
    pub fn pricing(&self) -> &PricingEngine {
        &self.pricing
    }

    /// Loop settings in use.
    pub fn config(&self) -> &ColumnGenerationConfig {
        &self.config
    }

    /// Runs the loop over `flights` on `engine`.
    ///
    /// The master model is released on every exit path.
    ///
    /// # Errors
    /// `InvalidColumn`, `Infeasible` or `Solver` from the master problem.
    pub fn run<E: LpEngine>(&self, flights: &[Flight], engine: E) -> Result<ColumnGenerationResult> {
        let start = Instant::now();
        let mut master = MasterModel::new(flights, engine);
        debug!(
            home_base = self.pricing.home_base(),
            edges = self.pricing.graph().edge_count(),
            max_duty_hours = self.pricing.rules().max_duty_hours,
            fixed_duty_cost = self.pricing.costs().fixed_duty_cost,
            "pricing graph ready"
        );

        let mut history = Vec::new();
        let (status, iterations, objective) =
            self.iterate(flights, &mut master, start, &mut history)?;

        let final_duals = DualPrices::from_aligned(flights, &master.dual_prices()?);
        let selected = master.selected_pairings(self.config.selection_epsilon)?;
        let column_count = master.column_count();
        master.release();

        let elapsed = start.elapsed();
        info!(
            %status,
            objective,
            iterations,
            columns = column_count,
            selected = selected.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "column generation finished"
        );

        Ok(ColumnGenerationResult {
            status,
            objective,
            iterations,
            elapsed,
            column_count,
            selected,
            history,
            final_duals,
        })
    }

    fn iterate<E: LpEngine>(
        &self,
        flights: &[Flight],
        master: &mut MasterModel<E>,
        start: Instant,
        history: &mut Vec<IterationRecord>,
    ) -> Result<(LoopStatus, usize, f64)> {
        let mut iteration = 0;
        let mut objective = 0.0;
        let mut state = LoopState::Seeding;

        let status = loop {
            state = match state {
                LoopState::Seeding => {
                    master.seed(flights, self.config.big_m)?;
                    LoopState::Solving
                }
                LoopState::Solving => {
                    master.solve()?;
                    iteration += 1;
                    objective = master.objective_value()?;
                    LoopState::Pricing
                }
                LoopState::Pricing => match self.limit_reached(iteration, start) {
                    Some(status) => {
                        info!(%status, iteration, "stopping column generation");
                        LoopState::Done(status)
                    }
                    None => {
                        let duals = DualPrices::from_aligned(flights, &master.dual_prices()?);
                        let candidates = self.pricing.solve(&duals);
                        LoopState::Injecting { duals, candidates }
                    }
                },
                LoopState::Injecting { duals, candidates } => {
                    let found = candidates.len();
                    let (added, best) = self.inject(master, &duals, candidates)?;
                    info!(
                        "iter {iteration}: obj = {objective:.2} | cols added = {added} | best reduced cost = {best:.2}"
                    );
                    history.push(IterationRecord {
                        iteration,
                        objective,
                        candidates: found,
                        columns_added: added,
                        best_reduced_cost: best,
                    });

                    if added > 0 {
                        LoopState::Solving
                    } else {
                        if found > 0 {
                            warn!(
                                candidates = found,
                                "all priced duties already in the master; stopping"
                            );
                        }
                        LoopState::Done(LoopStatus::Converged)
                    }
                }
                LoopState::Done(status) => break status,
            };
        };

        Ok((status, iteration, objective))
    }

    /// Injects the most improving candidates.
    ///
    /// Candidates with reduced cost `>= 0` and columns already in the
    /// master are dropped before ranking, so the cap only counts new
    /// columns. Ties keep pricing order. Returns the number of new columns
    /// and the best reduced cost among all candidates.
    fn inject<E: LpEngine>(
        &self,
        master: &mut MasterModel<E>,
        duals: &DualPrices,
        candidates: Vec<Pairing>,
    ) -> Result<(usize, f64)> {
        let mut best = 0.0_f64;
        let mut keys = HashSet::new();
        let mut improving: Vec<(f64, Pairing)> = Vec::with_capacity(candidates.len());
        for pairing in candidates {
            let reduced_cost = duals.reduced_cost(&pairing);
            if reduced_cost >= 0.0 {
                continue;
            }
            best = best.min(reduced_cost);
            if master.contains(&pairing) || !keys.insert(pairing.key()) {
                continue;
            }
            improving.push((reduced_cost, pairing));
        }
        improving.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut added = 0;
        for (reduced_cost, pairing) in improving
            .into_iter()
            .take(self.config.max_columns_per_iteration)
        {
            debug!(pairing = %pairing, reduced_cost, "injecting column");
            master.add_column(pairing)?;
            added += 1;
        }
        Ok((added, best))
    }

    fn limit_reached(&self, iteration: usize, start: Instant) -> Option<LoopStatus> {
        if self
            .config
            .max_iterations
            .is_some_and(|max| iteration >= max)
        {
            return Some(LoopStatus::IterationLimit);
        }
        if self
            .config
            .time_limit()
            .is_some_and(|limit| start.elapsed() >= limit)
        {
            return Some(LoopStatus::TimeLimit);
        }
        None
    }
}

/// Home base of a run: the configured one, else the first flight's base.
pub fn resolve_home_base(flights: &[Flight], config: &PairingConfig) -> String {
    config
        .rules
        .home_base
        .clone()
        .or_else(|| flights.first().map(|f| f.base.clone()))
        .unwrap_or_default()
}

/// Validates the input and runs column generation on the default engine.
///
/// # Errors
/// `InvalidInput` if flights or parameters fail validation, otherwise the
/// errors of [`ColumnGeneration::run`].
pub fn solve_pairings(flights: &[Flight], config: &PairingConfig) -> Result<ColumnGenerationResult> {
    validate_flights(flights)?;
    validate_config(config)?;

    let home_base = resolve_home_base(flights, config);
    info!(
        flights = flights.len(),
        home_base = %home_base,
        "starting column generation"
    );
    let pricing = PricingEngine::new(
        flights,
        home_base,
        config.rules.clone(),
        config.costs.clone(),
    );
    ColumnGeneration::new(pricing, config.column_generation.clone()).run(flights, MicroLpEngine::new())
}
