//! Unit conversions and ratio helpers.
//!
//! Every ratio is guarded: a zero or negative denominator yields `0`,
//! never `NaN` or infinity.

use port_ops_vessel_models::SECONDS_PER_HOUR;

/// Seconds in a day.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tons in a million metric tons.
pub const TONS_PER_MMT: f64 = 1_000_000.0;

/// Converts seconds to hours.
#[must_use]
pub fn hours(seconds: f64) -> f64 {
    seconds / SECONDS_PER_HOUR
}

/// Converts tons to million metric tons.
#[must_use]
pub fn million_tons(tons: f64) -> f64 {
    tons / TONS_PER_MMT
}

/// Arithmetic mean; `0` for no values.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

/// Median of the values (mean of the middle two for an even count);
/// `0` for no values.
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// `part / whole * 100`, or `0` when `whole` is not positive.
#[must_use]
pub fn percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// `numerator / denominator`, or `0` when the denominator is not positive.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Berth-hours available to `berths` berths over `days` days.
#[must_use]
pub fn available_berth_hours(berths: u32, days: i64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let days = days.max(0) as f64;
    f64::from(berths) * 24.0 * days
}

/// Caps occupied hours at the hours physically available.
#[must_use]
pub fn cap_occupied(occupied: f64, available: f64) -> f64 {
    occupied.min(available).max(0.0)
}

/// Rounds to `places` decimal places.
#[must_use]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round() / factor
}

/// Converts a reduced count to an integer.
#[must_use]
pub fn count(value: f64) -> u64 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = value.max(0.0).round() as u64;
    n
}
