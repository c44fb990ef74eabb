//! Airline crew pairing by column generation.
//!
//! Covers a day's flight schedule with crew duties (pairings) that start
//! and end at a home base, minimizing total duty cost. The LP relaxation of
//! the set-partitioning formulation is solved by column generation: a
//! restricted master problem over known pairings, and a pricing search
//! that proposes new pairings from the master's dual prices.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Flight`, `ClockTime`, `Pairing`,
//!   `DualPrices`, `SelectedPairing`
//! - **`parser`**: Flight schedule loader with line-level error recovery
//! - **`config`**: Duty rules, cost model, loop settings (JSON-loadable)
//! - **`validation`**: Input integrity checks (duplicate IDs, durations, parameters)
//! - **`lp`**: `LpEngine` abstraction and the `good_lp`/`microlp` engine
//! - **`master`**: Restricted master problem over an append-only column arena
//! - **`pricing`**: Connection graph and negative-reduced-cost duty search
//! - **`colgen`**: The column-generation loop and solution report
//!
//! # Example
//!
//! ```
//! use u_pairing::{solve_pairings, PairingConfig};
//! use u_pairing::models::{ClockTime, Flight};
//!
//! let t = |s| ClockTime::parse(s).unwrap();
//! let flights = vec![
//!     Flight::new("A", "BASE", "X")
//!         .with_times(t("08:00"), t("10:00"))
//!         .with_duration(2.0)
//!         .with_base("BASE")
//!         .with_cost(100.0),
//!     Flight::new("B", "X", "BASE")
//!         .with_times(t("11:00"), t("13:00"))
//!         .with_duration(2.0)
//!         .with_base("BASE")
//!         .with_cost(100.0),
//! ];
//! let result = solve_pairings(&flights, &PairingConfig::default()).unwrap();
//! assert!(result.is_converged());
//! assert_eq!(result.selected.len(), 1);
//! assert_eq!(result.selected[0].pairing.label(), "A-B");
//! ```
//!
//! # References
//!
//! - Desrosiers & Lübbecke (2005), "A Primer in Column Generation"
//! - Barnhart et al. (2003), "Airline Crew Scheduling"
//! - Irnich & Desaulniers (2005), "Shortest Path Problems with Resource Constraints"

pub mod colgen;
pub mod config;
pub mod error;
pub mod lp;
pub mod master;
pub mod models;
pub mod parser;
pub mod pricing;
pub mod validation;

pub use colgen::{solve_pairings, ColumnGeneration, ColumnGenerationResult, LoopStatus, SolutionKpi};
pub use config::{ColumnGenerationConfig, CostModel, DutyRules, PairingConfig};
pub use error::{PairingError, Result};
