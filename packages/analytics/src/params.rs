//! Interpretation of raw request parameters.
//!
//! Dates accept `YYYY-MM-DD` or a full `YYYY-MM-DDTHH:MM:SS` timestamp
//! (fractional seconds and a trailing `Z` are tolerated). Windows are
//! half-open: a date-only end means the following midnight, so the whole
//! day is covered, and a full timestamp end is excluded.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use port_ops_analytics_models::{Granularity, SeriesPolicy};
use port_ops_database_models::DateWindow;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::AnalyticsError;

const DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Default number of flag states in the nationality ranking.
pub const DEFAULT_FLAG_LIMIT: usize = 10;

fn next_midnight(date: NaiveDate) -> Option<NaiveDateTime> {
    date.succ_opt().map(|d| d.and_time(NaiveTime::MIN))
}

fn parse_date(
    name: &'static str,
    value: &str,
    date_only: fn(NaiveDate) -> Option<NaiveDateTime>,
) -> Result<NaiveDateTime, AnalyticsError> {
    let value = value.trim();
    let trimmed = value.strip_suffix('Z').unwrap_or(value);

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|e| {
        AnalyticsError::InvalidParameter {
            name,
            message: format!("'{value}': {e}. Expected format: YYYY-MM-DD"),
        }
    })?;
    date_only(date).ok_or_else(|| AnalyticsError::InvalidParameter {
        name,
        message: format!("'{value}' is out of range"),
    })
}

/// Parses a range start; a bare date means midnight.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if the value is not a date.
pub fn parse_start(value: &str) -> Result<NaiveDateTime, AnalyticsError> {
    parse_date("startDate", value, |d| Some(d.and_time(NaiveTime::MIN)))
}

/// Parses an exclusive range end; a bare date means the midnight that
/// ends that day.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if the value is not a date.
pub fn parse_end(value: &str) -> Result<NaiveDateTime, AnalyticsError> {
    parse_date("endDate", value, next_midnight)
}

fn window(start: NaiveDateTime, end: NaiveDateTime) -> Result<DateWindow, AnalyticsError> {
    if end < start {
        return Err(AnalyticsError::InvalidParameter {
            name: "endDate",
            message: "endDate is before startDate".to_string(),
        });
    }
    Ok(DateWindow::new(start, end))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds the window for endpoints that require both dates.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingParameter`] if either date is absent,
/// or [`AnalyticsError::InvalidParameter`] if one cannot be parsed or the
/// end precedes the start.
pub fn required_window(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<DateWindow, AnalyticsError> {
    let start = present(start).ok_or(AnalyticsError::MissingParameter("startDate"))?;
    let end = present(end).ok_or(AnalyticsError::MissingParameter("endDate"))?;
    window(parse_start(start)?, parse_end(end)?)
}

/// Builds the window for endpoints with fallbacks: the policy's default
/// start, and the end of `today`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if a date cannot be parsed
/// or the end precedes the start.
pub fn window_or_default(
    start: Option<&str>,
    end: Option<&str>,
    policy: &SeriesPolicy,
    today: NaiveDate,
) -> Result<DateWindow, AnalyticsError> {
    let start = present(start).map_or_else(
        || Ok(policy.default_start.and_time(NaiveTime::MIN)),
        parse_start,
    )?;
    let end = present(end).map_or_else(
        || {
            next_midnight(today).ok_or_else(|| AnalyticsError::InvalidParameter {
                name: "endDate",
                message: "today is out of range".to_string(),
            })
        },
        parse_end,
    )?;
    window(start, end)
}

/// Builds the window for endpoints that filter only when asked to: no
/// window when both dates are absent, otherwise [`window_or_default`].
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] if a date cannot be parsed
/// or the end precedes the start.
pub fn optional_window(
    start: Option<&str>,
    end: Option<&str>,
    policy: &SeriesPolicy,
    today: NaiveDate,
) -> Result<Option<DateWindow>, AnalyticsError> {
    if present(start).is_none() && present(end).is_none() {
        return Ok(None);
    }
    window_or_default(start, end, policy, today).map(Some)
}

/// Parses the `mode` parameter; absent means monthly.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] for anything other than
/// `month` or `year`.
pub fn parse_granularity(mode: Option<&str>) -> Result<Granularity, AnalyticsError> {
    present(mode).map_or(Ok(Granularity::Month), |mode| {
        mode.trim()
            .parse()
            .map_err(|_| AnalyticsError::InvalidParameter {
                name: "mode",
                message: format!("'{mode}' is not one of month, year"),
            })
    })
}

/// Parses the required `totalBerths` parameter.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingParameter`] if absent, or
/// [`AnalyticsError::InvalidParameter`] unless it is a positive integer.
pub fn parse_total_berths(value: Option<&str>) -> Result<u32, AnalyticsError> {
    let value = present(value).ok_or(AnalyticsError::MissingParameter("totalBerths"))?;
    match value.trim().parse::<u32>() {
        Ok(berths) if berths > 0 => Ok(berths),
        Ok(_) => Err(AnalyticsError::InvalidParameter {
            name: "totalBerths",
            message: "must be at least 1".to_string(),
        }),
        Err(e) => Err(AnalyticsError::InvalidParameter {
            name: "totalBerths",
            message: format!("'{value}': {e}"),
        }),
    }
}

/// Parses an optional positive `limit`.
///
/// # Errors
///
/// Returns [`AnalyticsError::InvalidParameter`] unless the value is a
/// positive integer.
pub fn parse_limit(value: Option<&str>) -> Result<Option<usize>, AnalyticsError> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    match value.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        Ok(_) => Err(AnalyticsError::InvalidParameter {
            name: "limit",
            message: "must be at least 1".to_string(),
        }),
        Err(e) => Err(AnalyticsError::InvalidParameter {
            name: "limit",
            message: format!("'{value}': {e}"),
        }),
    }
}

/// Vessel selector; `None` means every vessel.
#[must_use]
pub fn vessel_selector(vessel_id: Option<&str>) -> Option<&str> {
    present(vessel_id).map(str::trim)
}

/// Berth selector; `None` means every berth.
#[must_use]
pub fn berth_selector(berth: Option<&str>) -> Option<&str> {
    present(berth).filter(|b| !b.eq_ignore_ascii_case("all"))
}

/// The dashboard KPI a commodity drill-down is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
pub enum CommodityKpi {
    /// Liquid bulk tonnage.
    #[strum(serialize = "Liquid Cargo (MMT)")]
    LiquidCargo,
    /// Containerised TEUs.
    #[strum(serialize = "Containers (TEUs)")]
    Containers,
}

/// Parses the required `kpi` parameter.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingParameter`] if absent, or
/// [`AnalyticsError::InvalidParameter`] for an unknown KPI.
pub fn parse_commodity_kpi(value: Option<&str>) -> Result<CommodityKpi, AnalyticsError> {
    let value = present(value).ok_or(AnalyticsError::MissingParameter("kpi"))?;
    value
        .trim()
        .parse()
        .map_err(|_| AnalyticsError::InvalidParameter {
            name: "kpi",
            message: format!("unknown KPI '{value}'"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, date};

    #[test]
    fn date_only_end_covers_the_day() {
        let w = required_window(Some("2024-01-01"), Some("2024-01-31")).unwrap();
        assert_eq!(w.start, at(2024, 1, 1, 0));
        assert_eq!(w.end, at(2024, 2, 1, 0));
        assert_eq!(w.last_date(), date(2024, 1, 31));
        assert!(w.contains(date(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap()));
    }

    #[test]
    fn whole_month_window_has_whole_hours() {
        let w = required_window(Some("2024-03-01"), Some("2024-03-31")).unwrap();
        assert!((w.hours() - 744.0).abs() < f64::EPSILON);
        assert!((w.hours() * 21.0 - 15_624.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_full_timestamps() {
        assert_eq!(
            parse_start("2024-03-05T06:00:00").unwrap(),
            at(2024, 3, 5, 6)
        );
        assert_eq!(
            parse_end("2024-03-05T06:00:00.000Z").unwrap(),
            at(2024, 3, 5, 6)
        );
    }

    #[test]
    fn missing_and_bad_dates_are_client_errors() {
        let missing = required_window(None, Some("2024-01-31")).unwrap_err();
        assert!(matches!(missing, AnalyticsError::MissingParameter("startDate")));
        assert!(missing.is_client_error());

        let bad = required_window(Some("yesterday"), Some("2024-01-31")).unwrap_err();
        assert!(matches!(
            bad,
            AnalyticsError::InvalidParameter {
                name: "startDate",
                ..
            }
        ));

        assert!(required_window(Some("2024-02-01"), Some("2024-01-01")).is_err());
    }

    #[test]
    fn falls_back_to_policy_start_and_today() {
        let policy = SeriesPolicy::default();
        let w = window_or_default(None, Some(""), &policy, date(2025, 6, 30)).unwrap();
        assert_eq!(w.start, at(2020, 1, 1, 0));
        assert_eq!(w.last_date(), date(2025, 6, 30));
        assert_eq!(w.end, at(2025, 7, 1, 0));
    }

    #[test]
    fn optional_window_only_filters_when_asked() {
        let policy = SeriesPolicy::default();
        let today = date(2025, 6, 30);
        assert_eq!(optional_window(None, Some(" "), &policy, today).unwrap(), None);

        let w = optional_window(None, Some("2024-12-31"), &policy, today)
            .unwrap()
            .unwrap();
        assert_eq!(w.start, at(2020, 1, 1, 0));
        assert_eq!(w.end, at(2025, 1, 1, 0));
    }

    #[test]
    fn parses_limit_and_vessel() {
        assert_eq!(parse_limit(None).unwrap(), None);
        assert_eq!(parse_limit(Some("5")).unwrap(), Some(5));
        assert!(parse_limit(Some("0")).is_err());
        assert!(matches!(
            parse_limit(Some("ten")),
            Err(AnalyticsError::InvalidParameter { name: "limit", .. })
        ));

        assert_eq!(vessel_selector(Some(" V1 ")), Some("V1"));
        assert_eq!(vessel_selector(Some("")), None);
    }

    #[test]
    fn parses_mode() {
        assert_eq!(parse_granularity(None).unwrap(), Granularity::Month);
        assert_eq!(parse_granularity(Some("year")).unwrap(), Granularity::Year);
        assert!(parse_granularity(Some("decade")).is_err());
    }

    #[test]
    fn parses_total_berths() {
        assert_eq!(parse_total_berths(Some("21")).unwrap(), 21);
        assert!(matches!(
            parse_total_berths(None),
            Err(AnalyticsError::MissingParameter("totalBerths"))
        ));
        assert!(parse_total_berths(Some("0")).is_err());
        assert!(parse_total_berths(Some("many")).is_err());
    }

    #[test]
    fn parses_commodity_kpi_labels() {
        assert_eq!(
            parse_commodity_kpi(Some("Liquid Cargo (MMT)")).unwrap(),
            CommodityKpi::LiquidCargo
        );
        assert_eq!(
            parse_commodity_kpi(Some("Containers (TEUs)")).unwrap(),
            CommodityKpi::Containers
        );
        assert!(parse_commodity_kpi(Some("Dry Cargo")).is_err());
        assert!(parse_commodity_kpi(None).is_err());
    }

    #[test]
    fn berth_selector_treats_all_as_every_berth() {
        assert_eq!(berth_selector(Some("All")), None);
        assert_eq!(berth_selector(Some("")), None);
        assert_eq!(berth_selector(Some("Q7")), Some("Q7"));
    }
}
