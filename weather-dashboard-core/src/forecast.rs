//! Collapses the 3-hour forecast series into one sample per calendar day.

use chrono::{NaiveDate, TimeZone};
use std::collections::HashSet;

use crate::model::ForecastSample;

/// Number of day cards shown in the forecast row.
pub const MAX_FORECAST_DAYS: usize = 5;

/// Picks the first sample of each calendar date (as seen in `tz`), keeping the
/// order in which dates first appear, capped at [`MAX_FORECAST_DAYS`].
///
/// Samples whose timestamp cannot be represented are skipped.
pub fn forecast_days<'a, Tz: TimeZone>(
    series: &'a [ForecastSample],
    tz: &Tz,
) -> Vec<&'a ForecastSample> {
    let mut seen: HashSet<NaiveDate> = HashSet::new();
    let mut days = Vec::with_capacity(MAX_FORECAST_DAYS);

    for sample in series {
        let Some(ts) = sample.timestamp() else {
            continue;
        };
        let date = ts.with_timezone(tz).date_naive();
        if seen.insert(date) {
            days.push(sample);
        }
    }

    days.truncate(MAX_FORECAST_DAYS);
    days
}
