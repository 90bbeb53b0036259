//! Ratings loading and cleaning.
//!
//! The ratings log is a headerless CSV with four positional fields:
//! reviewer_id, product_id, rating, timestamp. Rating and timestamp are
//! parsed tolerantly; a value that does not parse becomes null and the row
//! survives.

use std::path::Path;

use chrono::{DateTime, Local, TimeZone};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Result, WarehouseError};
use crate::models::CleanRatingRow;

/// Rendering format for `start_time`.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Counters accumulated while loading the ratings log.
#[derive(Debug, Default, Clone)]
pub struct RatingsStats {
    pub rows_read: usize,
    pub unparsable_ratings: usize,
    pub unparsable_timestamps: usize,
}

/// Read and clean the ratings log, one `CleanRatingRow` per input row.
pub fn load_ratings(path: &Path) -> Result<(Vec<CleanRatingRow>, RatingsStats)> {
    if !path.exists() {
        return Err(WarehouseError::InputNotFound {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut stats = RatingsStats::default();

    for record in reader.records() {
        let record = record?;
        stats.rows_read += 1;

        let rating_raw = field(&record, 2);
        let rating = rating_raw.as_deref().and_then(|v| v.parse::<f64>().ok());
        if rating_raw.is_some() && rating.is_none() {
            stats.unparsable_ratings += 1;
        }

        let timestamp_raw = field(&record, 3);
        let timestamp = timestamp_raw.as_deref().and_then(|v| v.parse::<i64>().ok());
        if timestamp_raw.is_some() && timestamp.is_none() {
            stats.unparsable_timestamps += 1;
        }

        rows.push(CleanRatingRow {
            reviewer_id: field(&record, 0),
            product_id: field(&record, 1),
            rating,
            timestamp,
            start_time: timestamp.and_then(format_local_timestamp),
        });
    }

    debug!(
        "Ratings loaded: {} rows ({} unparsable ratings, {} unparsable timestamps)",
        stats.rows_read, stats.unparsable_ratings, stats.unparsable_timestamps
    );

    Ok((rows, stats))
}

fn field(record: &csv::StringRecord, index: usize) -> Option<String> {
    record
        .get(index)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Calendar view of an epoch second in the local time zone of the executing
/// process. Local time, not UTC, is the contract here: the warehouse has
/// always rendered wall-clock values and consumers depend on it.
pub fn local_datetime(epoch_seconds: i64) -> Option<DateTime<Local>> {
    Local.timestamp_opt(epoch_seconds, 0).single()
}

/// Render an epoch second as `YYYY-MM-DD HH:MM:SS` local time.
pub fn format_local_timestamp(epoch_seconds: i64) -> Option<String> {
    local_datetime(epoch_seconds).map(|dt| dt.format(START_TIME_FORMAT).to_string())
}
