//! End-to-end column-generation scenarios.

use u_pairing::colgen::{ColumnGeneration, LoopStatus, SolutionKpi};
use u_pairing::config::{ColumnGenerationConfig, CostModel, DutyRules, PairingConfig};
use u_pairing::lp::MicroLpEngine;
use u_pairing::models::{ClockTime, Flight};
use u_pairing::parser::{load_flights, parse_flights};
use u_pairing::pricing::{can_connect, PricingEngine};
use u_pairing::solve_pairings;

fn flight(id: &str, from: &str, to: &str, dep: &str, arr: &str, hours: f64) -> Flight {
    Flight::new(id, from, to)
        .with_times(ClockTime::parse(dep).unwrap(), ClockTime::parse(arr).unwrap())
        .with_duration(hours)
        .with_base("BASE")
        .with_cost(100.0)
}

/// Fixed 200, hourly 100, no night or overtime terms.
fn plain_config() -> PairingConfig {
    PairingConfig::new().with_costs(
        CostModel::new()
            .with_fixed_cost(200.0)
            .with_hourly_cost(100.0)
            .with_night_penalty(0.0)
            .with_overtime(0.0, 8.0),
    )
}

fn round_trip() -> Vec<Flight> {
    vec![
        flight("A", "BASE", "X", "08:00", "10:00", 2.0),
        flight("B", "X", "BASE", "11:00", "13:00", 2.0),
    ]
}

#[test]
fn round_trip_replaces_seeds() {
    let result = solve_pairings(&round_trip(), &plain_config()).unwrap();

    assert_eq!(result.status, LoopStatus::Converged);
    assert!((result.objective - 800.0).abs() < 1e-6);
    assert_eq!(result.selected.len(), 1);

    let chosen = &result.selected[0];
    assert_eq!(chosen.pairing.label(), "A-B");
    assert!((chosen.pairing.cost() - 800.0).abs() < 1e-10);
    assert!((chosen.value - 1.0).abs() < 1e-6);
    assert!(!chosen.pairing.is_seed());
}

#[test]
fn unreturnable_flight_stays_on_seed() {
    let mut flights = round_trip();
    flights.push(flight("C", "X", "Y", "14:00", "15:00", 1.0));

    let result = solve_pairings(&flights, &plain_config()).unwrap();

    assert_eq!(result.status, LoopStatus::Converged);
    assert!((result.objective - (800.0 + 1e6)).abs() < 1e-3);

    let labels: Vec<String> = result.selected.iter().map(|s| s.pairing.label()).collect();
    assert!(labels.contains(&"A-B".to_string()));
    let seed = result
        .selected
        .iter()
        .find(|s| s.pairing.covers("C"))
        .unwrap();
    assert!(seed.pairing.is_seed());

    let kpi = SolutionKpi::calculate(&result, &flights);
    assert!(kpi.covers_all());
    assert_eq!(kpi.seed_covered, 1);
}

#[test]
fn duty_over_limit_never_emitted() {
    // 06:00 → 19:00 is a 13h duty against a 12h limit.
    let flights = vec![
        flight("A", "BASE", "X", "06:00", "08:00", 2.0),
        flight("B", "X", "BASE", "17:00", "19:00", 2.0),
    ];
    let result = solve_pairings(&flights, &plain_config()).unwrap();

    assert_eq!(result.status, LoopStatus::Converged);
    assert_eq!(result.iterations, 1);
    assert!((result.objective - 2e6).abs() < 1e-3);
    assert!(result.selected.iter().all(|s| s.pairing.is_seed()));

    // Relaxing the limit lets the pairing through.
    let relaxed = plain_config().with_rules(DutyRules::new().with_max_duty_hours(13.0));
    let result = solve_pairings(&flights, &relaxed).unwrap();
    assert_eq!(result.selected.len(), 1);
    assert_eq!(result.selected[0].pairing.label(), "A-B");
}

#[test]
fn overnight_connection_needs_permission() {
    let flights = vec![
        flight("A", "BASE", "X", "22:00", "23:00", 1.0),
        flight("B", "X", "BASE", "00:00", "01:00", 1.0),
    ];

    let closed = solve_pairings(&flights, &plain_config()).unwrap();
    assert!((closed.objective - 2e6).abs() < 1e-3);

    let open = plain_config().with_rules(DutyRules::new().with_overnight(true));
    let result = solve_pairings(&flights, &open).unwrap();
    // 200 legs + 200 fixed + 2h × 100
    assert!((result.objective - 600.0).abs() < 1e-6);
    assert!((result.selected[0].pairing.duty_hours() - 3.0).abs() < 1e-10);
}

#[test]
fn cheaper_combination_wins() {
    // Two short round trips vs. one long chain covering all four legs.
    let flights = vec![
        flight("A", "BASE", "X", "06:00", "07:00", 1.0),
        flight("B", "X", "BASE", "08:00", "09:00", 1.0),
        flight("C", "BASE", "Y", "10:00", "11:00", 1.0),
        flight("D", "Y", "BASE", "12:00", "13:00", 1.0),
    ];
    let result = solve_pairings(&flights, &plain_config()).unwrap();

    // One duty: 400 legs + 200 fixed + 400 flying; two duties add a second fixed cost.
    assert!((result.objective - 1000.0).abs() < 1e-6);
    assert_eq!(result.selected.len(), 1);
    assert_eq!(result.selected[0].pairing.label(), "A-B-C-D");
}

#[test]
fn objective_never_increases() {
    let parsed = load_flights(concat!(env!("CARGO_MANIFEST_DIR"), "/data/flights.csv")).unwrap();
    let config = PairingConfig::new()
        .with_column_generation(ColumnGenerationConfig::new().with_max_columns(2));
    let result = solve_pairings(&parsed.flights, &config).unwrap();

    assert!(result.is_converged());
    for pair in result.history.windows(2) {
        assert!(pair[1].objective <= pair[0].objective + 1e-6 * pair[0].objective.abs().max(1.0));
    }
    for record in &result.history {
        if record.columns_added > 0 {
            assert!(record.best_reduced_cost < -1e-4);
        }
        assert!(record.columns_added <= 2);
    }
}

#[test]
fn sample_schedule_end_to_end() {
    let parsed = load_flights(concat!(env!("CARGO_MANIFEST_DIR"), "/data/flights.csv")).unwrap();
    assert_eq!(parsed.flights.len(), 15);
    assert!(parsed.skipped.is_empty());

    let config = PairingConfig::default();
    let result = solve_pairings(&parsed.flights, &config).unwrap();
    assert!(result.is_converged());

    // F116 leaves the base and never comes back.
    assert!(result.objective > 1e6);
    assert!(result.objective < 2e6);
    let kpi = SolutionKpi::calculate(&result, &parsed.flights);
    assert!(kpi.covers_all());
    assert!(kpi.seed_covered >= 1);
    assert!(result
        .selected
        .iter()
        .any(|s| s.pairing.is_seed() && s.pairing.covers("F116")));

    let rules = &config.rules;
    for selected in result.priced_pairings() {
        let legs = selected.pairing.flights();
        assert_eq!(legs[0].origin, "DEL");
        assert_eq!(legs[legs.len() - 1].destination, "DEL");
        assert!(selected.pairing.duty_hours() <= rules.max_duty_hours + 1e-9);
        assert!(selected.pairing.flying_hours() <= rules.max_flying_hours + 1e-9);
        for pair in legs.windows(2) {
            assert!(can_connect(&pair[0], &pair[1], rules));
        }
    }
}

#[test]
fn parsed_text_with_noise() {
    let text = "\
FlightID,From,To,DepTime,ArrTime,Duration,Aircraft,Base,FlightCost,Night
# comment
A,BASE,X,08:00,10:00,2.0,A320,BASE,100,0

B,X,BASE,11:00,13:00,2.0,A320,BASE,100,0
broken,line
---
";
    let parsed = parse_flights(text.as_bytes()).unwrap();
    assert_eq!(parsed.flights.len(), 2);
    assert_eq!(parsed.skipped.len(), 1);
    assert_eq!(parsed.skipped[0].line, 6);

    let result = solve_pairings(&parsed.flights, &plain_config()).unwrap();
    assert!((result.objective - 800.0).abs() < 1e-6);
}

#[test]
fn final_duals_admit_no_improving_duty() {
    let flights = vec![
        flight("A", "BASE", "X", "06:00", "07:30", 1.5),
        flight("B", "X", "BASE", "08:30", "10:00", 1.5),
        flight("C", "X", "Y", "08:15", "09:15", 1.0),
        flight("D", "Y", "BASE", "10:00", "11:00", 1.0),
        flight("E", "BASE", "Y", "11:00", "12:00", 1.0),
        flight("F", "Y", "BASE", "13:00", "14:00", 1.0),
    ];
    let config = plain_config();
    let pricing = PricingEngine::new(&flights, "BASE", config.rules.clone(), config.costs.clone());
    let result = ColumnGeneration::new(pricing.clone(), ColumnGenerationConfig::new())
        .run(&flights, MicroLpEngine::new())
        .unwrap();

    assert!(result.is_converged());
    assert!(pricing.solve(&result.final_duals).is_empty());
    assert_eq!(result.final_duals.len(), flights.len());
}

#[test]
fn json_config_overrides_defaults() {
    let config = PairingConfig::from_json_str(
        r#"{ "rules": { "home_base": "X", "allow_overnight": true, "max_duty_hours": 24.0 },
             "costs": { "night_penalty": 0.0 } }"#,
    )
    .unwrap();
    assert_eq!(config.rules.home_base.as_deref(), Some("X"));
    assert!(config.rules.allow_overnight);
    assert_eq!(config.rules.min_turnaround_minutes, 40);
    assert_eq!(config.rules.max_duty_hours, 24.0);
    assert_eq!(config.costs.night_penalty, 0.0);
    assert_eq!(config.column_generation.max_columns_per_iteration, 10);

    // From X, B then A wraps past midnight: a 23h duty.
    let result = solve_pairings(&round_trip(), &config).unwrap();
    assert!(result.is_converged());
    assert_eq!(result.selected.len(), 1);
    assert_eq!(result.selected[0].pairing.label(), "B-A");
}

#[test]
fn serializes_to_json() {
    let result = solve_pairings(&round_trip(), &plain_config()).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["status"], "Converged");
    assert_eq!(json["iterations"], 2);
    assert_eq!(json["selected"].as_array().unwrap().len(), 1);
}
