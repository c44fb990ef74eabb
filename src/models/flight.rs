//! Flight leg model.
//!
//! A flight is one scheduled leg between two stations. Flights are the
//! rows of the set-partitioning model: each must be covered exactly once.

use serde::{Deserialize, Serialize};

use super::ClockTime;

/// A scheduled flight leg.
///
/// Immutable for the run once loaded.
///
/// # Time Representation
/// Departure and arrival are wall-clock times without a date. A flight whose
/// arrival is earlier on the clock than its departure crosses midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Unique flight identifier.
    pub id: String,
    /// Origin station code.
    pub origin: String,
    /// Destination station code.
    pub destination: String,
    /// Departure time.
    pub departure: ClockTime,
    /// Arrival time.
    pub arrival: ClockTime,
    /// Block duration in hours (> 0).
    pub duration_hours: f64,
    /// Aircraft type.
    pub aircraft: String,
    /// Home-base station the leg is planned from.
    pub base: String,
    /// Direct operating cost.
    pub cost: f64,
    /// Whether the leg is a night flight.
    pub night: bool,
}

impl Flight {
    /// Creates a flight between two stations.
    ///
    /// Times default to midnight and duration to zero; set them with the
    /// builder methods.
    pub fn new(
        id: impl Into<String>,
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            origin: origin.into(),
            destination: destination.into(),
            departure: ClockTime::MIDNIGHT,
            arrival: ClockTime::MIDNIGHT,
            duration_hours: 0.0,
            aircraft: String::new(),
            base: String::new(),
            cost: 0.0,
            night: false,
        }
    }

    /// Sets departure and arrival times.
    pub fn with_times(mut self, departure: ClockTime, arrival: ClockTime) -> Self {
        self.departure = departure;
        self.arrival = arrival;
        self
    }

    /// Sets the block duration (hours).
    pub fn with_duration(mut self, hours: f64) -> Self {
        self.duration_hours = hours;
        self
    }

    /// Sets the aircraft type.
    pub fn with_aircraft(mut self, aircraft: impl Into<String>) -> Self {
        self.aircraft = aircraft.into();
        self
    }

    /// Sets the home base.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    /// Sets the direct operating cost.
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost;
        self
    }

    /// Marks the flight as a night flight.
    pub fn with_night(mut self, night: bool) -> Self {
        self.night = night;
        self
    }

    /// Whether this flight departs from `station`.
    #[inline]
    pub fn departs_from(&self, station: &str) -> bool {
        self.origin == station
    }

    /// Whether this flight arrives at `station`.
    #[inline]
    pub fn arrives_at(&self, station: &str) -> bool {
        self.destination == station
    }

    /// Turnaround from this flight's arrival to `next`'s departure.
    ///
    /// Returns the gap in minutes and whether it wrapped past midnight.
    pub fn turnaround_to(&self, next: &Flight) -> (u32, bool) {
        self.arrival.wrapping_minutes_until(next.departure)
    }
}
