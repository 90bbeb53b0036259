//! Time dimension builder.
//!
//! Derives calendar parts (year, month, day, hour, weekday) for every
//! distinct timestamp in the cleaned ratings. Weekday numbering is 1=Sunday
//! through 7=Saturday. All derived columns are pure functions of the
//! timestamp, so which duplicate survives deduplication does not matter.

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};
use polars::prelude::*;

use crate::error::Result;
use crate::models::CleanRatingRow;

use super::loader::{START_TIME_FORMAT, local_datetime};

struct TimeParts {
    start_time: String,
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    weekday: i32,
}

/// Build the time dimension: one row per distinct non-null timestamp.
///
/// Rows whose timestamp is null (or outside the representable calendar
/// range) contribute nothing; there is no key to look them up by.
pub fn build_time_dimension(rows: &[CleanRatingRow]) -> Result<DataFrame> {
    let mut by_timestamp: BTreeMap<i64, TimeParts> = BTreeMap::new();
    for row in rows {
        let Some(ts) = row.timestamp else { continue };
        if by_timestamp.contains_key(&ts) {
            continue;
        }
        let Some(dt) = local_datetime(ts) else { continue };
        by_timestamp.insert(
            ts,
            TimeParts {
                start_time: dt.format(START_TIME_FORMAT).to_string(),
                year: dt.year(),
                month: dt.month() as i32,
                day: dt.day() as i32,
                hour: dt.hour() as i32,
                weekday: dt.weekday().num_days_from_sunday() as i32 + 1,
            },
        );
    }

    let mut timestamps: Vec<i64> = Vec::with_capacity(by_timestamp.len());
    let mut start_times: Vec<String> = Vec::with_capacity(by_timestamp.len());
    let mut years: Vec<i32> = Vec::with_capacity(by_timestamp.len());
    let mut months: Vec<i32> = Vec::with_capacity(by_timestamp.len());
    let mut days: Vec<i32> = Vec::with_capacity(by_timestamp.len());
    let mut hours: Vec<i32> = Vec::with_capacity(by_timestamp.len());
    let mut weekdays: Vec<i32> = Vec::with_capacity(by_timestamp.len());

    for (ts, parts) in by_timestamp {
        timestamps.push(ts);
        start_times.push(parts.start_time);
        years.push(parts.year);
        months.push(parts.month);
        days.push(parts.day);
        hours.push(parts.hour);
        weekdays.push(parts.weekday);
    }

    let df = df!(
        "timestamp" => timestamps,
        "start_time" => start_times,
        "year" => years,
        "month" => months,
        "day" => days,
        "hour" => hours,
        "weekday" => weekdays,
    )?;
    Ok(df)
}
