//! Flight schedule loader.
//!
//! Reads comma-delimited flight records, one per line:
//!
//! ```text
//! FlightID,From,To,DepTime,ArrTime,Duration,Aircraft,Base,FlightCost,Night
//! F101,BASE,X,08:00,10:00,2.0,A320,BASE,100,0
//! ```
//!
//! Blank lines, `#` comments, `---` separators and header rows are skipped
//! silently. Malformed records are skipped and reported as [`SkippedLine`]s;
//! they never abort the load.

use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{ClockTime, Flight};

/// Number of fields in a flight record.
pub const FIELD_COUNT: usize = 10;

/// Why a single input record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ParseError {
    /// Fewer than [`FIELD_COUNT`] fields.
    #[error("expected 10 fields, found {0}")]
    TooFewFields(usize),
    /// A time field is not `HH:mm`.
    #[error("invalid time '{0}'")]
    InvalidTime(String),
    /// A numeric field failed to parse.
    #[error("invalid {field} '{value}'")]
    InvalidNumber {
        /// Field name.
        field: &'static str,
        /// Raw text.
        value: String,
    },
    /// The night flag is not an integer.
    #[error("invalid night flag '{0}' (expected an integer)")]
    InvalidNightFlag(String),
}

/// A record that was skipped during loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    /// Rejection reason.
    pub error: ParseError,
}

/// Result of loading a flight file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedFlights {
    /// Successfully parsed flights, in file order.
    pub flights: Vec<Flight>,
    /// Malformed records that were skipped.
    pub skipped: Vec<SkippedLine>,
}

/// Parses flight records from a reader.
///
/// Only I/O failures are errors; bad records land in
/// [`ParsedFlights::skipped`].
pub fn parse_flights<R: BufRead>(reader: R) -> Result<ParsedFlights> {
    let mut parsed = ParsedFlights::default();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        if is_ignorable(&line) {
            continue;
        }
        match parse_record(&line) {
            Ok(flight) => parsed.flights.push(flight),
            Err(error) => {
                warn!(line = line_no, %error, "skipping malformed flight record");
                parsed.skipped.push(SkippedLine {
                    line: line_no,
                    error,
                });
            }
        }
    }

    Ok(parsed)
}

/// Loads flights from a file.
pub fn load_flights(path: impl AsRef<Path>) -> Result<ParsedFlights> {
    let path = path.as_ref();
    let parsed = parse_flights(BufReader::new(File::open(path)?))?;
    info!(
        path = %path.display(),
        flights = parsed.flights.len(),
        skipped = parsed.skipped.len(),
        "loaded flight schedule"
    );
    Ok(parsed)
}

/// Parses a single record.
pub fn parse_record(line: &str) -> std::result::Result<Flight, ParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < FIELD_COUNT {
        return Err(ParseError::TooFewFields(fields.len()));
    }

    let departure = ClockTime::parse(fields[3])?;
    let arrival = ClockTime::parse(fields[4])?;
    let duration = parse_number("duration", fields[5])?;
    let cost = parse_number("cost", fields[8])?;
    // Only 1 marks a night flight; any other integer is a day flight.
    let night = match fields[9].parse::<i64>() {
        Ok(flag) => flag == 1,
        Err(_) => return Err(ParseError::InvalidNightFlag(fields[9].to_string())),
    };

    Ok(Flight::new(fields[0], fields[1], fields[2])
        .with_times(departure, arrival)
        .with_duration(duration)
        .with_aircraft(fields[6])
        .with_base(fields[7])
        .with_cost(cost)
        .with_night(night))
}

fn parse_number(field: &'static str, value: &str) -> std::result::Result<f64, ParseError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty()
        || trimmed.starts_with('#')
        || trimmed.starts_with("---")
        || trimmed.starts_with("inputId")
        || trimmed.to_ascii_lowercase().starts_with("flightid")
}
