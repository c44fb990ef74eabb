//! Pricing subproblem.
//!
//! Given the master's dual prices, enumerates legal duties from the home
//! base and returns those whose reduced cost
//! `cost(p) − Σ_{f ∈ p} dual(f)` is below `−ε`.
//!
//! # Algorithm
//!
//! Depth-first enumeration of simple paths in the [`ConnectionGraph`]:
//!
//! 1. Start from every flight departing the home base (departure order).
//! 2. Extend one connecting flight at a time; prune any extension whose
//!    total block time would exceed the flying limit.
//! 3. Whenever the path is back at the home base and its duty span is
//!    within the duty limit, price it as a candidate. The branch keeps
//!    extending past that point.
//!
//! The search is exhaustive within the flying-time bound. Realistic duty
//! limits keep paths to a handful of legs.
//!
//! # Reference
//! Irnich & Desaulniers (2005), "Shortest Path Problems with Resource
//! Constraints", in Column Generation, Springer, Ch. 2

mod cost;
mod graph;

pub use graph::{can_connect, ConnectionGraph};

use tracing::debug;

use crate::config::{CostModel, DutyRules};
use crate::models::{duty_hours, DualPrices, Flight, Pairing};

/// Reduced cost a candidate must undercut to be emitted.
pub const REDUCED_COST_EPSILON: f64 = 1e-4;

/// A partial duty on the search stack.
///
/// Each entry owns its path, so branches share no mutable state.
#[derive(Debug, Clone)]
struct PartialDuty {
    path: Vec<usize>,
    flying_hours: f64,
}

impl PartialDuty {
    fn last(&self) -> usize {
        self.path[self.path.len() - 1]
    }

    fn extended(&self, next: usize, duration_hours: f64) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend_from_slice(&self.path);
        path.push(next);
        Self {
            path,
            flying_hours: self.flying_hours + duration_hours,
        }
    }
}

/// Statistics of one pricing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PricingStats {
    /// Partial duties popped from the search stack.
    pub paths_explored: usize,
    /// Duties back at base within the duty limit.
    pub duties_evaluated: usize,
    /// Duties emitted with negative reduced cost.
    pub candidates: usize,
}

/// Negative-reduced-cost duty search.
///
/// Configuration is fixed for the run: flights, duty rules, home base and
/// cost model.
///
/// # Example
/// ```
/// use u_pairing::config::{CostModel, DutyRules};
/// use u_pairing::models::{ClockTime, DualPrices, Flight};
/// use u_pairing::pricing::PricingEngine;
///
/// let t = |s| ClockTime::parse(s).unwrap();
/// let flights = vec![
///     Flight::new("A", "BASE", "X").with_times(t("08:00"), t("10:00")).with_duration(2.0),
///     Flight::new("B", "X", "BASE").with_times(t("11:00"), t("13:00")).with_duration(2.0),
/// ];
/// let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), CostModel::new());
/// let duals = DualPrices::new().with_price("A", 1e6).with_price("B", 1e6);
/// let found = engine.solve(&duals);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].label(), "A-B");
/// ```
#[derive(Debug, Clone)]
pub struct PricingEngine {
    flights: Vec<Flight>,
    home_base: String,
    rules: DutyRules,
    costs: CostModel,
    graph: ConnectionGraph,
}

impl PricingEngine {
    /// Creates a pricing engine and builds its connection graph.
    pub fn new(
        flights: &[Flight],
        home_base: impl Into<String>,
        rules: DutyRules,
        costs: CostModel,
    ) -> Self {
        let graph = ConnectionGraph::build(flights, &rules);
        Self {
            flights: flights.to_vec(),
            home_base: home_base.into(),
            rules,
            costs,
            graph,
        }
    }

    /// Home-base station.
    pub fn home_base(&self) -> &str {
        &self.home_base
    }

    /// Duty rules in force.
    pub fn rules(&self) -> &DutyRules {
        &self.rules
    }

    /// Cost model in force.
    pub fn costs(&self) -> &CostModel {
        &self.costs
    }

    /// Connection graph.
    pub fn graph(&self) -> &ConnectionGraph {
        &self.graph
    }

    /// Finds duties with reduced cost below `−ε` under `duals`.
    ///
    /// Candidates come out in depth-first discovery order. An empty result
    /// means no improving column exists.
    pub fn solve(&self, duals: &DualPrices) -> Vec<Pairing> {
        self.solve_with_stats(duals).0
    }

    /// Like [`solve`](Self::solve), also returning search statistics.
    pub fn solve_with_stats(&self, duals: &DualPrices) -> (Vec<Pairing>, PricingStats) {
        let mut found = Vec::new();
        let mut stats = PricingStats::default();

        // Reverse push so the stack pops in departure order.
        let mut stack: Vec<PartialDuty> = self
            .graph
            .order()
            .iter()
            .rev()
            .copied()
            .filter(|&i| {
                let flight = &self.flights[i];
                flight.departs_from(&self.home_base)
                    && flight.duration_hours <= self.rules.max_flying_hours
            })
            .map(|i| PartialDuty {
                path: vec![i],
                flying_hours: self.flights[i].duration_hours,
            })
            .collect();

        while let Some(duty) = stack.pop() {
            stats.paths_explored += 1;
            let current = duty.last();

            if self.flights[current].arrives_at(&self.home_base) {
                if let Some(pairing) = self.price(&duty, duals, &mut stats) {
                    found.push(pairing);
                }
            }

            for &next in self.graph.successors(current).iter().rev() {
                if duty.path.contains(&next) {
                    continue;
                }
                let duration = self.flights[next].duration_hours;
                if duty.flying_hours + duration <= self.rules.max_flying_hours {
                    stack.push(duty.extended(next, duration));
                }
            }
        }

        stats.candidates = found.len();
        debug!(
            explored = stats.paths_explored,
            evaluated = stats.duties_evaluated,
            candidates = stats.candidates,
            "pricing finished"
        );
        (found, stats)
    }

    /// Prices a duty that is back at base; `None` if illegal or not improving.
    fn price(
        &self,
        duty: &PartialDuty,
        duals: &DualPrices,
        stats: &mut PricingStats,
    ) -> Option<Pairing> {
        let legs = duty.path.iter().map(|&i| &self.flights[i]);
        if duty_hours(legs.clone()) > self.rules.max_duty_hours {
            return None;
        }
        stats.duties_evaluated += 1;

        let cost = self.costs.duty_cost(legs.clone());
        let reduced_cost = cost - duals.sum_over(legs);
        if reduced_cost < -REDUCED_COST_EPSILON {
            let flights = duty.path.iter().map(|&i| self.flights[i].clone()).collect();
            Some(Pairing::new(flights, cost))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClockTime;

    fn flight(id: &str, from: &str, to: &str, dep: (u32, u32), arr: (u32, u32), hours: f64) -> Flight {
        Flight::new(id, from, to)
            .with_times(
                ClockTime::from_hm(dep.0, dep.1).unwrap(),
                ClockTime::from_hm(arr.0, arr.1).unwrap(),
            )
            .with_duration(hours)
            .with_base("BASE")
            .with_cost(100.0)
    }

    fn plain_costs() -> CostModel {
        CostModel::new()
            .with_fixed_cost(200.0)
            .with_hourly_cost(100.0)
            .with_night_penalty(0.0)
            .with_overtime(0.0, 8.0)
    }

    fn high_duals(flights: &[Flight]) -> DualPrices {
        flights
            .iter()
            .fold(DualPrices::new(), |d, f| d.with_price(f.id.clone(), 1e6))
    }

    #[test]
    fn test_engine_keeps_inputs() {
        let flights = vec![
            flight("A", "BASE", "X", (8, 0), (10, 0), 2.0),
            flight("B", "X", "BASE", (11, 0), (13, 0), 2.0),
            flight("C", "BASE", "Y", (7, 0), (8, 0), 1.0),
        ];
        let rules = DutyRules::new().with_max_duty_hours(10.0);
        let engine = PricingEngine::new(&flights, "BASE", rules, plain_costs());

        assert_eq!(engine.home_base(), "BASE");
        assert!((engine.rules().max_duty_hours - 10.0).abs() < 1e-10);
        assert!((engine.costs().fixed_duty_cost - 200.0).abs() < 1e-10);

        let graph = engine.graph();
        assert_eq!(graph.order(), &[2, 0, 1]);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.successors(0), &[1]);
        assert!(graph.successors(2).is_empty());
    }

    #[test]
    fn test_round_trip_found() {
        let flights = vec![
            flight("A", "BASE", "X", (8, 0), (10, 0), 2.0),
            flight("B", "X", "BASE", (11, 0), (13, 0), 2.0),
        ];
        let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());
        let found = engine.solve(&high_duals(&flights));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label(), "A-B");
        assert!((found[0].cost() - 800.0).abs() < 1e-10);
    }

    #[test]
    fn test_no_candidate_when_duals_too_low() {
        let flights = vec![
            flight("A", "BASE", "X", (8, 0), (10, 0), 2.0),
            flight("B", "X", "BASE", (11, 0), (13, 0), 2.0),
        ];
        let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());

        // Reduced cost exactly zero is not improving.
        let duals = DualPrices::new().with_price("A", 400.0).with_price("B", 400.0);
        assert!(engine.solve(&duals).is_empty());

        // Within epsilon is not improving either.
        let duals = DualPrices::new().with_price("A", 400.0).with_price("B", 400.00005);
        assert!(engine.solve(&duals).is_empty());
    }

    #[test]
    fn test_search_continues_past_base() {
        // A-B returns to base at 13:00, then C-D is a second round trip.
        let flights = vec![
            flight("A", "BASE", "X", (6, 0), (7, 0), 1.0),
            flight("B", "X", "BASE", (8, 0), (9, 0), 1.0),
            flight("C", "BASE", "Y", (10, 0), (11, 0), 1.0),
            flight("D", "Y", "BASE", (12, 0), (13, 0), 1.0),
        ];
        let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());
        let labels: Vec<String> = engine
            .solve(&high_duals(&flights))
            .iter()
            .map(Pairing::label)
            .collect();
        assert_eq!(labels, vec!["A-B", "A-B-C-D", "C-D"]);
    }

    #[test]
    fn test_flying_limit_prunes() {
        let flights = vec![
            flight("A", "BASE", "X", (6, 0), (9, 0), 3.0),
            flight("B", "X", "BASE", (10, 0), (13, 0), 3.0),
        ];
        let rules = DutyRules::new().with_max_flying_hours(5.0);
        let engine = PricingEngine::new(&flights, "BASE", rules, plain_costs());
        let (found, stats) = engine.solve_with_stats(&high_duals(&flights));
        assert!(found.is_empty());
        assert_eq!(stats.paths_explored, 1);
    }

    #[test]
    fn test_duty_limit_blocks_emission() {
        // Duty 06:00 → 19:00 = 13h > 12h even though flying is only 4h.
        let flights = vec![
            flight("A", "BASE", "X", (6, 0), (8, 0), 2.0),
            flight("B", "X", "BASE", (17, 0), (19, 0), 2.0),
        ];
        let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());
        let (found, stats) = engine.solve_with_stats(&high_duals(&flights));
        assert!(found.is_empty());
        assert_eq!(stats.duties_evaluated, 0);
        assert_eq!(stats.paths_explored, 2);
    }

    #[test]
    fn test_overnight_duty_span() {
        let flights = vec![
            flight("A", "BASE", "X", (22, 0), (23, 0), 1.0),
            flight("B", "X", "BASE", (0, 0), (1, 0), 1.0),
        ];
        let closed = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());
        assert!(closed.solve(&high_duals(&flights)).is_empty());

        let open = PricingEngine::new(
            &flights,
            "BASE",
            DutyRules::new().with_overnight(true),
            plain_costs(),
        );
        let found = open.solve(&high_duals(&flights));
        assert_eq!(found.len(), 1);
        assert!((found[0].duty_hours() - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_cycles_do_not_repeat_flights() {
        // With overnight allowed, A → B → A would be a cycle.
        let flights = vec![
            flight("A", "BASE", "X", (8, 0), (9, 0), 1.0),
            flight("B", "X", "BASE", (10, 0), (11, 0), 1.0),
        ];
        let rules = DutyRules::new()
            .with_overnight(true)
            .with_max_duty_hours(48.0)
            .with_max_flying_hours(100.0);
        let engine = PricingEngine::new(&flights, "BASE", rules, plain_costs());
        let found = engine.solve(&high_duals(&flights));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].label(), "A-B");
    }

    #[test]
    fn test_single_leg_round_trip() {
        let flights = vec![flight("L", "BASE", "BASE", (9, 0), (10, 0), 1.0)];
        let engine = PricingEngine::new(&flights, "BASE", DutyRules::new(), plain_costs());
        let found = engine.solve(&high_duals(&flights));
        assert_eq!(found.len(), 1);
        assert!(!found[0].is_seed());
        assert!((found[0].cost() - 400.0).abs() < 1e-10);
    }

    #[test]
    fn test_emitted_connections_are_legal() {
        let flights = vec![
            flight("A", "BASE", "X", (6, 0), (7, 0), 1.0),
            flight("B", "X", "Y", (7, 30), (8, 30), 1.0),
            flight("C", "X", "BASE", (7, 50), (8, 50), 1.0),
            flight("D", "Y", "BASE", (9, 30), (10, 30), 1.0),
            flight("E", "BASE", "Y", (11, 0), (12, 0), 1.0),
        ];
        let rules = DutyRules::new();
        let engine = PricingEngine::new(&flights, "BASE", rules.clone(), plain_costs());
        let found = engine.solve(&high_duals(&flights));
        assert!(!found.is_empty());
        for pairing in &found {
            assert_eq!(pairing.flights()[0].origin, "BASE");
            assert_eq!(pairing.flights().last().unwrap().destination, "BASE");
            for pair in pairing.flights().windows(2) {
                assert!(can_connect(&pair[0], &pair[1], &rules));
            }
        }
        // A→B has only 30 minutes turnaround.
        assert!(found.iter().all(|p| !p.label().starts_with("A-B")));
    }
}
