//! Pairing (column) model and dual prices.
//!
//! A pairing is an ordered sequence of flights forming one crew duty. In
//! the set-partitioning LP it is a column: it covers each of its flights
//! once and contributes its cost to the objective.
//!
//! # Reference
//! Barnhart et al. (2003), "Airline Crew Scheduling", in Handbook of
//! Transportation Science, Ch. 14

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{Flight, MINUTES_PER_DAY};

/// How a pairing entered the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingOrigin {
    /// Single-flight big-M placeholder that makes the first solve feasible.
    Seed,
    /// Produced by the pricing search.
    Priced,
}

/// An ordered sequence of flights with a total cost.
///
/// Immutable once created. Identity is structural: two pairings with the
/// same origin and flight sequence are the same column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    flights: Vec<Flight>,
    cost: f64,
    origin: PairingOrigin,
}

impl Pairing {
    /// Creates a priced pairing.
    pub fn new(flights: Vec<Flight>, cost: f64) -> Self {
        Self {
            flights,
            cost,
            origin: PairingOrigin::Priced,
        }
    }

    /// Creates a single-flight seed pairing with placeholder cost.
    pub fn seed(flight: Flight, big_m: f64) -> Self {
        Self {
            flights: vec![flight],
            cost: big_m,
            origin: PairingOrigin::Seed,
        }
    }

    /// Flights in duty order.
    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    /// Total cost.
    #[inline]
    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// How the pairing entered the model.
    #[inline]
    pub fn origin(&self) -> PairingOrigin {
        self.origin
    }

    /// Whether this is a big-M seed column.
    pub fn is_seed(&self) -> bool {
        self.origin == PairingOrigin::Seed
    }

    /// Number of legs.
    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Whether the pairing has no flights.
    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    /// Flight identifiers in order.
    pub fn flight_ids(&self) -> impl Iterator<Item = &str> {
        self.flights.iter().map(|f| f.id.as_str())
    }

    /// Whether the pairing covers the given flight.
    pub fn covers(&self, flight_id: &str) -> bool {
        self.flights.iter().any(|f| f.id == flight_id)
    }

    /// Flight identifiers joined by `-` (e.g. `A-B`).
    pub fn label(&self) -> String {
        self.flight_ids().collect::<Vec<_>>().join("-")
    }

    /// Structural key used for de-duplication.
    pub fn key(&self) -> (PairingOrigin, Vec<String>) {
        (self.origin, self.flights.iter().map(|f| f.id.clone()).collect())
    }

    /// Total block hours.
    pub fn flying_hours(&self) -> f64 {
        self.flights.iter().map(|f| f.duration_hours).sum()
    }

    /// Duty span in hours, from first departure to last arrival.
    ///
    /// Adds 24h when the last arrival is earlier on the clock than the
    /// first departure. The whole pairing is treated as one duty span.
    pub fn duty_hours(&self) -> f64 {
        duty_hours(&self.flights)
    }

    /// Whether any leg is a night flight.
    pub fn has_night_leg(&self) -> bool {
        self.flights.iter().any(|f| f.night)
    }
}

/// Duty span of a flight sequence in hours. Zero for an empty sequence.
pub(crate) fn duty_hours<'a, I>(flights: I) -> f64
where
    I: IntoIterator<Item = &'a Flight>,
    I::IntoIter: DoubleEndedIterator,
{
    let mut iter = flights.into_iter();
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let last = iter.next_back().unwrap_or(first);
    let mut minutes = first.departure.minutes_until(last.arrival);
    if minutes < 0 {
        minutes += MINUTES_PER_DAY as i32;
    }
    f64::from(minutes) / 60.0
}

impl fmt::Display for Pairing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (${:.2})", self.label(), self.cost)
    }
}

/// Dual prices keyed by flight identifier.
///
/// Produced from one LP solve and valid for that iteration only. Unknown
/// identifiers price at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DualPrices {
    prices: HashMap<String, f64>,
}

impl DualPrices {
    /// Creates an empty price map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from flights and a dual vector aligned to them.
    ///
    /// Flight `i` maps to `duals[i]`. Surplus entries on either side are
    /// ignored.
    pub fn from_aligned(flights: &[Flight], duals: &[f64]) -> Self {
        Self {
            prices: flights
                .iter()
                .zip(duals)
                .map(|(f, &d)| (f.id.clone(), d))
                .collect(),
        }
    }

    /// Sets the price of a flight.
    pub fn with_price(mut self, flight_id: impl Into<String>, price: f64) -> Self {
        self.prices.insert(flight_id.into(), price);
        self
    }

    /// Price of a flight (0.0 if unknown).
    #[inline]
    pub fn get(&self, flight_id: &str) -> f64 {
        self.prices.get(flight_id).copied().unwrap_or(0.0)
    }

    /// Sum of prices over a flight sequence.
    pub fn sum_over<'a>(&self, flights: impl IntoIterator<Item = &'a Flight>) -> f64 {
        flights.into_iter().map(|f| self.get(&f.id)).sum()
    }

    /// Reduced cost: `cost - Σ price(f)` over the pairing's flights.
    pub fn reduced_cost(&self, pairing: &Pairing) -> f64 {
        pairing.cost() - self.sum_over(pairing.flights())
    }

    /// Number of priced flights.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether no prices are stored.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

/// A pairing selected by the final LP solve, with its variable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPairing {
    /// The selected column.
    pub pairing: Pairing,
    /// Its value in the relaxation (in `(ε, 1]` for a partition).
    pub value: f64,
}
