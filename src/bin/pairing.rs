use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use u_pairing::parser::load_flights;
use u_pairing::{solve_pairings, PairingConfig, SolutionKpi};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = args.to_config()?;

    let parsed = load_flights(&args.flights)
        .with_context(|| format!("failed to read {}", args.flights.display()))?;
    if parsed.flights.is_empty() {
        bail!("no flights loaded from {}", args.flights.display());
    }
    info!("Loaded {} flights", parsed.flights.len());

    let result = solve_pairings(&parsed.flights, &config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let kpi = SolutionKpi::calculate(&result, &parsed.flights);
        println!("{result}");
        println!("{kpi}");
    }
    Ok(())
}

/// Crew pairing by column generation.
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    /// Flight schedule file.
    #[clap(long, default_value = "data/flights.csv")]
    flights: PathBuf,
    /// JSON parameter file; flags below override it.
    #[clap(long)]
    config: Option<PathBuf>,
    /// Home-base station (default: base of the first flight).
    #[clap(long)]
    base: Option<String>,
    /// Maximum duty hours.
    #[clap(long)]
    max_duty: Option<f64>,
    /// Maximum flying hours.
    #[clap(long)]
    max_flying: Option<f64>,
    /// Minimum turnaround in minutes.
    #[clap(long)]
    min_turnaround: Option<u32>,
    /// Allow connections past midnight.
    #[clap(long)]
    overnight: bool,
    /// Fixed cost per duty.
    #[clap(long)]
    fixed_cost: Option<f64>,
    /// Cost per flying hour.
    #[clap(long)]
    hourly_cost: Option<f64>,
    /// Penalty for duties with a night leg.
    #[clap(long)]
    night_penalty: Option<f64>,
    /// Penalty per duty hour above the overtime threshold.
    #[clap(long)]
    overtime_penalty: Option<f64>,
    /// Duty hours after which overtime applies.
    #[clap(long)]
    overtime_threshold: Option<f64>,
    /// Columns injected per iteration.
    #[clap(long)]
    max_columns: Option<usize>,
    /// Stop after this many master solves.
    #[clap(long)]
    max_iterations: Option<usize>,
    /// Wall-clock budget in seconds.
    #[clap(long)]
    time_limit: Option<f64>,
    /// Print the result as JSON.
    #[clap(long)]
    json: bool,
}

impl Args {
    fn to_config(&self) -> anyhow::Result<PairingConfig> {
        let mut config = match &self.config {
            Some(path) => PairingConfig::from_json_file(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => PairingConfig::default(),
        };

        let rules = &mut config.rules;
        if let Some(base) = &self.base {
            rules.home_base = Some(base.clone());
        }
        if let Some(hours) = self.max_duty {
            rules.max_duty_hours = hours;
        }
        if let Some(hours) = self.max_flying {
            rules.max_flying_hours = hours;
        }
        if let Some(minutes) = self.min_turnaround {
            rules.min_turnaround_minutes = minutes;
        }
        if self.overnight {
            rules.allow_overnight = true;
        }

        let costs = &mut config.costs;
        if let Some(cost) = self.fixed_cost {
            costs.fixed_duty_cost = cost;
        }
        if let Some(cost) = self.hourly_cost {
            costs.hourly_flying_cost = cost;
        }
        if let Some(penalty) = self.night_penalty {
            costs.night_penalty = penalty;
        }
        if let Some(penalty) = self.overtime_penalty {
            costs.overtime_penalty_per_hour = penalty;
        }
        if let Some(hours) = self.overtime_threshold {
            costs.overtime_threshold_hours = hours;
        }

        let cg = &mut config.column_generation;
        if let Some(n) = self.max_columns {
            cg.max_columns_per_iteration = n;
        }
        if let Some(n) = self.max_iterations {
            cg.max_iterations = Some(n);
        }
        if let Some(secs) = self.time_limit {
            let limit = Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid time limit {secs}"))?;
            cg.time_limit_secs = Some(limit.as_secs_f64());
        }

        Ok(config)
    }
}
