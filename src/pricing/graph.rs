//! Flight connection graph.
//!
//! Nodes are flights. An edge `A → B` exists iff a crew arriving on `A`
//! can legally operate `B` next:
//!
//! 1. `A.destination == B.origin`
//! 2. turnaround `B.departure − A.arrival` (plus 24h if negative) is at
//!    least the minimum turnaround
//! 3. if the turnaround wrapped past midnight, overnight duties are allowed
//!
//! Node order is the stable departure-time order of the flights, which
//! fixes the order in which the pricing search explores branches.

use crate::config::DutyRules;
use crate::models::Flight;

/// Precedence graph over a flight set.
#[derive(Debug, Clone)]
pub struct ConnectionGraph {
    /// Flight indices sorted by departure time (stable).
    order: Vec<usize>,
    /// Successors per flight index, in departure order.
    successors: Vec<Vec<usize>>,
}

impl ConnectionGraph {
    /// Builds the graph for `flights` under `rules`.
    ///
    /// # Complexity
    /// O(n²) connection checks for n flights.
    pub fn build(flights: &[Flight], rules: &DutyRules) -> Self {
        let mut order: Vec<usize> = (0..flights.len()).collect();
        order.sort_by_key(|&i| flights[i].departure);

        let successors = flights
            .iter()
            .map(|from| {
                order
                    .iter()
                    .copied()
                    .filter(|&j| can_connect(from, &flights[j], rules))
                    .collect()
            })
            .collect();

        Self { order, successors }
    }

    /// Flight indices in departure order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Legal next flights after flight `index`, in departure order.
    pub fn successors(&self, index: usize) -> &[usize] {
        &self.successors[index]
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }
}

/// Whether `next` may directly follow `current` in one duty.
pub fn can_connect(current: &Flight, next: &Flight, rules: &DutyRules) -> bool {
    if current.destination != next.origin {
        return false;
    }
    let (gap, wrapped) = current.turnaround_to(next);
    if gap < rules.min_turnaround_minutes {
        return false;
    }
    !wrapped || rules.allow_overnight
}
