//! Pairing cost evaluation.

use crate::config::CostModel;
use crate::models::{duty_hours, Flight};

impl CostModel {
    /// Cost of a duty flown as the given flight sequence.
    ///
    /// `Σ leg cost + fixed + flying_hours × hourly + night penalty (if any
    /// night leg) + overtime × max(0, duty_hours − threshold)`.
    pub fn duty_cost<'a, I>(&self, flights: I) -> f64
    where
        I: IntoIterator<Item = &'a Flight>,
        I::IntoIter: DoubleEndedIterator + Clone,
    {
        let iter = flights.into_iter();
        let mut leg_cost = 0.0;
        let mut flying_hours = 0.0;
        let mut has_night = false;
        for flight in iter.clone() {
            leg_cost += flight.cost;
            flying_hours += flight.duration_hours;
            has_night |= flight.night;
        }

        let duty = duty_hours(iter);
        let overtime = (duty - self.overtime_threshold_hours).max(0.0);

        let mut cost = leg_cost + self.fixed_duty_cost + flying_hours * self.hourly_flying_cost;
        if has_night {
            cost += self.night_penalty;
        }
        cost + overtime * self.overtime_penalty_per_hour
    }
}
