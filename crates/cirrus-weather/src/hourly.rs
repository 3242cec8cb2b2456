//! Temporal selection over the hourly series.

use chrono::{DateTime, Utc};

/// Tolerance for matching the "current" hour against continuous wall-clock
/// time, since the series granularity is hourly.
pub const CURRENT_HOUR_TOLERANCE_MINUTES: i64 = 30;

/// Indices of the next `n` hourly samples starting from the first timestamp
/// at or after `now`.
///
/// When no future sample remains in the fetched window, selection starts at
/// the closest preceding one. Returned indices are strictly increasing and
/// never wrap; when fewer than `n` samples remain, all remaining indices are
/// returned without padding.
pub fn next_n_hours(times: &[DateTime<Utc>], now: DateTime<Utc>, n: usize) -> Vec<usize> {
    if times.is_empty() || n == 0 {
        return Vec::new();
    }

    let start = times
        .iter()
        .position(|t| *t >= now)
        .unwrap_or(times.len() - 1);

    (start..times.len()).take(n).collect()
}

/// Whether a sample timestamp counts as "now" for highlighting, within a
/// ±30 minute window.
pub fn is_current_hour(sample: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (sample - now).num_minutes().abs() <= CURRENT_HOUR_TOLERANCE_MINUTES
}
