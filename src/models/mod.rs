//! Crew pairing domain models.
//!
//! Provides the core data types of the set-partitioning formulation:
//! flights are the rows, pairings are the columns, and dual prices link
//! the master problem to the pricing search.
//!
//! # Domain Mappings
//!
//! | u-pairing | LP view | Crew view |
//! |-----------|---------|-----------|
//! | Flight | Row (coverage constraint) | Leg to be crewed |
//! | Pairing | Column (variable) | One duty from home base |
//! | DualPrices | Row duals | Value of covering a leg |

mod clock;
mod flight;
mod pairing;

pub use clock::{ClockTime, MINUTES_PER_DAY};
pub use flight::Flight;
pub use pairing::{DualPrices, Pairing, PairingOrigin, SelectedPairing};

pub(crate) use pairing::duty_hours;
