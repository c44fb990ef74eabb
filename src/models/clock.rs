//! Wall-clock time of day.
//!
//! Flight schedules carry departure and arrival times without a date.
//! Connections and duty spans that cross midnight are resolved with
//! modular (24h) arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::parser::ParseError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time of day with minute resolution.
///
/// Stored as minutes since midnight (`0..1440`). Parses from and
/// serializes to `HH:mm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    /// Midnight (`00:00`).
    pub const MIDNIGHT: ClockTime = ClockTime { minutes: 0 };

    /// Creates a time from hour and minute.
    ///
    /// Returns `None` if `hour >= 24` or `minute >= 60`.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour >= 24 || minute >= 60 {
            return None;
        }
        Some(Self {
            minutes: (hour * 60 + minute) as u16,
        })
    }

    /// Parses a `HH:mm` string.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidTime(text.to_string());
        let (h, m) = text.trim().split_once(':').ok_or_else(invalid)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u32 = h.parse().map_err(|_| invalid())?;
        let minute: u32 = m.parse().map_err(|_| invalid())?;
        Self::from_hm(hour, minute).ok_or_else(invalid)
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(&self) -> u32 {
        u32::from(self.minutes)
    }

    /// Hour component (0..24).
    pub fn hour(&self) -> u32 {
        self.minutes() / 60
    }

    /// Minute component (0..60).
    pub fn minute(&self) -> u32 {
        self.minutes() % 60
    }

    /// Signed same-day difference `later - self` in minutes.
    ///
    /// Negative when `later` is earlier on the clock.
    #[inline]
    pub fn minutes_until(&self, later: ClockTime) -> i32 {
        later.minutes() as i32 - self.minutes() as i32
    }

    /// Forward gap to `later`, wrapping past midnight when needed.
    ///
    /// Returns the gap in minutes and whether a wrap occurred. Equal
    /// times give a zero gap without wrap.
    pub fn wrapping_minutes_until(&self, later: ClockTime) -> (u32, bool) {
        let diff = self.minutes_until(later);
        if diff < 0 {
            ((diff + MINUTES_PER_DAY as i32) as u32, true)
        } else {
            (diff as u32, false)
        }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}
