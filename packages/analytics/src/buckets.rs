//! Contiguous bucket ranges.
//!
//! Monthly series cover every calendar month from the start's month to
//! the end's month. Yearly series ignore the requested dates except for
//! the anchor year and always cover the trailing
//! [`SeriesPolicy::year_series_width`] years.

use chrono::{Datelike as _, NaiveDate};
use port_ops_analytics_models::{BucketKey, Granularity, SeriesPolicy, YearAnchor};
use port_ops_database_models::{DateWindow, GroupKey, GroupValue};
use port_ops_vessel_models::TimeField;

/// Every month from `start`'s month through `end`'s month, inclusive.
#[must_use]
pub fn month_range(start: NaiveDate, end: NaiveDate) -> Vec<BucketKey> {
    let mut buckets = Vec::new();
    let (mut year, mut month) = (start.year(), start.month());
    let last = (end.year(), end.month());

    while (year, month) <= last {
        buckets.push(BucketKey::month(year, month));
        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
    }

    buckets
}

/// The year a yearly series ends at.
#[must_use]
pub fn anchor_year(policy: &SeriesPolicy, end: NaiveDate, today: NaiveDate) -> i32 {
    match policy.year_anchor {
        YearAnchor::Latest => end.year().max(today.year()),
        YearAnchor::EndDate => end.year(),
        YearAnchor::Today => today.year(),
    }
}

/// The trailing yearly window ending at `last_year`.
#[must_use]
pub fn year_range(last_year: i32, width: u32) -> Vec<BucketKey> {
    let width = i32::try_from(width.max(1)).unwrap_or(i32::MAX);
    let first = last_year.saturating_sub(width - 1);
    (first..=last_year).map(BucketKey::year).collect()
}

/// Window covering every day of the given buckets.
#[must_use]
pub fn span(buckets: &[BucketKey]) -> Option<DateWindow> {
    DateWindow::whole_days(buckets.first()?.first_day()?, buckets.last()?.last_day()?)
}

/// Window covering every day of one bucket.
#[must_use]
pub fn bucket_window(key: BucketKey) -> Option<DateWindow> {
    span(&[key])
}

/// Converts a store group key into a bucket key.
#[must_use]
pub const fn bucket_of(value: &GroupValue) -> Option<BucketKey> {
    match value {
        GroupValue::Year(year) => Some(BucketKey::year(*year)),
        GroupValue::YearMonth { year, month } => Some(BucketKey::month(*year, *month)),
        GroupValue::All | GroupValue::Label(_) | GroupValue::YearMonthLabel { .. } => None,
    }
}

/// A planned series: its buckets and the window to aggregate over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesPlan {
    /// Bucket granularity.
    pub granularity: Granularity,
    /// Every bucket of the series, in order.
    pub buckets: Vec<BucketKey>,
    /// Calls are filtered to this window.
    pub window: DateWindow,
}

impl SeriesPlan {
    /// Plans the series for a request window.
    ///
    /// Monthly series aggregate over the requested window. Yearly series
    /// aggregate over the full span of their trailing years.
    #[must_use]
    pub fn new(
        granularity: Granularity,
        requested: DateWindow,
        policy: &SeriesPolicy,
        today: NaiveDate,
    ) -> Self {
        match granularity {
            Granularity::Month => Self {
                granularity,
                buckets: month_range(requested.start.date(), requested.last_date()),
                window: requested,
            },
            Granularity::Year => {
                let last = anchor_year(policy, requested.last_date(), today);
                let buckets = year_range(last, policy.year_series_width);
                let window = span(&buckets).unwrap_or(requested);
                Self {
                    granularity,
                    buckets,
                    window,
                }
            }
        }
    }

    /// Store grouping key bucketing calls by `field`.
    #[must_use]
    pub const fn group_key(&self, field: TimeField) -> GroupKey {
        match self.granularity {
            Granularity::Month => GroupKey::YearMonth(field),
            Granularity::Year => GroupKey::Year(field),
        }
    }
}
