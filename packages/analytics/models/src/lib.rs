#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Bucket keys, series policy and typed metric rows for the port
//! operations dashboards.
//!
//! Every metric set is a plain `Copy` struct whose `Default` is the
//! all-zero value emitted for buckets with no data. Each set has a
//! matching variance struct of `Option<f64>` fields; `None` serializes as
//! JSON `null` and means "no comparison available".

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Bucket granularity of a series.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Granularity {
    /// One bucket per calendar month.
    #[default]
    Month,
    /// One bucket per calendar year.
    Year,
}

/// A year or a (year, month) bucket key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BucketKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month 1-12, absent for yearly buckets.
    pub month: Option<u32>,
}

impl BucketKey {
    /// A yearly bucket.
    #[must_use]
    pub const fn year(year: i32) -> Self {
        Self { year, month: None }
    }

    /// A monthly bucket.
    #[must_use]
    pub const fn month(year: i32, month: u32) -> Self {
        Self {
            year,
            month: Some(month),
        }
    }

    /// Month label in `MMM-YYYY` form (`"Aug-2025"`), absent for yearly
    /// buckets.
    #[must_use]
    pub fn month_label(&self) -> Option<String> {
        let month = self.month?;
        let index = usize::try_from(month.checked_sub(1)?).ok()?;
        MONTH_ABBREVIATIONS
            .get(index)
            .map(|name| format!("{name}-{}", self.year))
    }

    /// First day of the bucket.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), 1)
    }

    /// Last day of the bucket.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        match self.month {
            None | Some(12) => NaiveDate::from_ymd_opt(self.year, 12, 31),
            Some(month) => NaiveDate::from_ymd_opt(self.year, month + 1, 1)?.pred_opt(),
        }
    }

    /// Number of calendar days in the bucket.
    #[must_use]
    pub fn days(&self) -> i64 {
        match (self.first_day(), self.last_day()) {
            (Some(first), Some(last)) => (last - first).num_days() + 1,
            _ => 0,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.month_label() {
            Some(label) => f.write_str(&label),
            None => write!(f, "{}", self.year),
        }
    }
}

/// Which year the trailing yearly window ends at.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum YearAnchor {
    /// The later of the requested end date's year and the current year.
    #[default]
    Latest,
    /// The requested end date's year.
    EndDate,
    /// The current year.
    Today,
}

/// Shape of the generated series and port constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesPolicy {
    /// Number of buckets in a yearly series.
    pub year_series_width: u32,
    /// Year the yearly series ends at.
    pub year_anchor: YearAnchor,
    /// Berths used for available-hours in the occupancy trend.
    pub total_berths: u32,
    /// Range start used when the caller gives no start date.
    pub default_start: NaiveDate,
}

impl Default for SeriesPolicy {
    fn default() -> Self {
        Self {
            year_series_width: 5,
            year_anchor: YearAnchor::Latest,
            total_berths: 21,
            default_start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default(),
        }
    }
}

/// One row of a trend series: bucket label, metrics and the change from
/// the previous row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRow<M, V> {
    /// Calendar year.
    pub year: i32,
    /// `MMM-YYYY` label, monthly series only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<String>,
    /// This bucket's values.
    #[serde(flatten)]
    pub metrics: M,
    /// Percent change from the previous bucket.
    pub variance: V,
}

/// Turnaround time per bucket, hours.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnaroundMetrics {
    /// Mean arrival-to-departure time.
    pub mean_overall: f64,
    /// Median arrival-to-departure time.
    pub median_overall: f64,
    /// Mean for containerised calls only.
    pub container_avg: f64,
}

/// Percent change of [`TurnaroundMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnaroundVariance {
    /// Change of the mean.
    pub mean_overall: Option<f64>,
    /// Change of the median.
    pub median_overall: Option<f64>,
    /// Change of the container mean.
    pub container_avg: Option<f64>,
}

/// Idle time per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleMetrics {
    /// Idle hours as a percentage of the denominator hours.
    pub idle_percent: f64,
    /// Idle hours.
    pub total_idle: f64,
}

/// Percent change of [`IdleMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdleVariance {
    /// Change of the idle percentage.
    pub idle_percent: Option<f64>,
    /// Change of idle hours.
    pub total_idle: Option<f64>,
}

/// Average output per ship-berth-day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMetrics {
    /// Tons handled per berth-day.
    pub avg_output: f64,
    /// Calls in the bucket.
    pub vessel_count: u64,
}

/// Percent change of [`OutputMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputVariance {
    /// Change of output.
    pub avg_output: Option<f64>,
    /// Change of the call count.
    pub vessel_count: Option<f64>,
}

/// Pre-berthing detention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetentionMetrics {
    /// Mean detention, hours.
    #[serde(rename = "avgPBD")]
    pub avg_pbd: f64,
    /// Calls with a logged detention.
    pub vessels_count: u64,
}

/// Percent change of [`DetentionMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetentionVariance {
    /// Change of mean detention.
    #[serde(rename = "avgPBD")]
    pub avg_pbd: Option<f64>,
    /// Change of the call count.
    pub vessels_count: Option<f64>,
}

/// Berth occupancy trend values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyMetrics {
    /// Occupied berth-hours, capped at available hours.
    pub occupancy_hours: f64,
    /// Occupied share of available berth-hours.
    pub occupancy_percent: f64,
    /// Calls in the bucket.
    pub vessels_count: u64,
}

/// Percent change of [`OccupancyMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyVariance {
    /// Change of occupied hours.
    pub occupancy_hours: Option<f64>,
    /// Change of occupancy percentage.
    pub occupancy_percent: Option<f64>,
    /// Change of the call count.
    pub vessels_count: Option<f64>,
}

/// Cargo throughput.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputMetrics {
    /// All cargo, million metric tons.
    pub total_throughput: f64,
    /// Dry bulk, million metric tons.
    pub dry_cargo: f64,
    /// Liquid bulk, million metric tons.
    pub liquid_cargo: f64,
    /// Containers, TEUs.
    #[serde(rename = "containerTEUs")]
    pub container_teus: f64,
}

/// Percent change of [`ThroughputMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThroughputVariance {
    /// Change of total throughput.
    pub total_throughput: Option<f64>,
    /// Change of dry cargo.
    pub dry_cargo: Option<f64>,
    /// Change of liquid cargo.
    pub liquid_cargo: Option<f64>,
    /// Change of TEUs.
    #[serde(rename = "containerTEUs")]
    pub container_teus: Option<f64>,
}

/// Monthly throughput row: values nested under `current`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyThroughputRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// This month's values.
    pub current: ThroughputMetrics,
    /// Percent change from the previous month in the series.
    pub variance: ThroughputVariance,
}

/// A throughput row in either of its two wire shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ThroughputRow {
    /// Nested `{ month, current, variance }`.
    Month(MonthlyThroughputRow),
    /// Flat `{ year, ...metrics, variance }`.
    Year(TrendRow<ThroughputMetrics, ThroughputVariance>),
}

/// Headline KPIs over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiSnapshot {
    /// All cargo, million metric tons.
    #[serde(rename = "totalThroughputMMT")]
    pub total_throughput_mmt: f64,
    /// Dry bulk, million metric tons.
    #[serde(rename = "dryCargoMMT")]
    pub dry_cargo_mmt: f64,
    /// Liquid bulk, million metric tons.
    #[serde(rename = "liquidCargoMMT")]
    pub liquid_cargo_mmt: f64,
    /// Containers, TEUs.
    #[serde(rename = "containerTEUs")]
    pub container_teus: f64,
    /// Mean turnaround, hours.
    #[serde(rename = "meanTRT")]
    pub mean_trt: f64,
    /// Median turnaround, hours.
    #[serde(rename = "medianTRT")]
    pub median_trt: f64,
    /// Mean container turnaround, hours.
    #[serde(rename = "avgContainerTRT")]
    pub avg_container_trt: f64,
    /// Tons per berth-day.
    pub output_per_berth_day: f64,
    /// Mean pre-berthing detention, hours.
    #[serde(rename = "avgPBD")]
    pub avg_pbd: f64,
    /// Idle hours as a percentage of berth hours.
    pub idle_percent: f64,
}

/// Percent change between two [`KpiSnapshot`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiVariation {
    /// Change of total throughput.
    #[serde(rename = "totalThroughputMMT")]
    pub total_throughput_mmt: Option<f64>,
    /// Change of dry cargo.
    #[serde(rename = "dryCargoMMT")]
    pub dry_cargo_mmt: Option<f64>,
    /// Change of liquid cargo.
    #[serde(rename = "liquidCargoMMT")]
    pub liquid_cargo_mmt: Option<f64>,
    /// Change of TEUs.
    #[serde(rename = "containerTEUs")]
    pub container_teus: Option<f64>,
    /// Change of mean turnaround.
    #[serde(rename = "meanTRT")]
    pub mean_trt: Option<f64>,
    /// Change of median turnaround.
    #[serde(rename = "medianTRT")]
    pub median_trt: Option<f64>,
    /// Change of container turnaround.
    #[serde(rename = "avgContainerTRT")]
    pub avg_container_trt: Option<f64>,
    /// Change of output per berth-day.
    pub output_per_berth_day: Option<f64>,
    /// Change of detention.
    #[serde(rename = "avgPBD")]
    pub avg_pbd: Option<f64>,
    /// Change of idle percentage.
    pub idle_percent: Option<f64>,
}

/// The requested window against the same window one year earlier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComparison {
    /// The requested window.
    pub year1: KpiSnapshot,
    /// The window shifted back one year.
    pub year2: KpiSnapshot,
    /// `(year1 - year2) / year2 * 100` per metric.
    pub variation: KpiVariation,
}

/// Commodity total for the commodity drill-down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityTotal {
    /// Commodity name.
    pub code: String,
    /// Tons or TEUs, depending on the KPI.
    pub value: f64,
}

/// Berth occupancy over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BerthOccupancy {
    /// Selected berth, or `"All Berths"`.
    pub berth: String,
    /// Occupied hours, capped at available hours.
    pub total_occupied_hours: f64,
    /// Window hours times effective berths.
    pub total_available_hours: f64,
    /// Occupied share of available hours, percent.
    pub occupancy: f64,
}

/// Monthly averages of the time components of a call, whole hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeUtilizationRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// Pre-berthing detention.
    #[serde(rename = "PBD")]
    pub pbd: f64,
    /// Ship not working before berthing.
    #[serde(rename = "SNWB")]
    pub snwb: f64,
    /// Ship waiting at berth.
    #[serde(rename = "SWB")]
    pub swb: f64,
    /// Shifting.
    #[serde(rename = "Shifting")]
    pub shifting: f64,
    /// Idling at berth.
    #[serde(rename = "Idling")]
    pub idling: f64,
    /// Other movement.
    #[serde(rename = "OM")]
    pub om: f64,
    /// Inter movement.
    #[serde(rename = "IM")]
    pub im: f64,
}

/// Monthly average waiting before berth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingTrendRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// Mean waiting (PBD + SNWB), whole hours.
    pub avg_waiting_hours: f64,
}

/// Tonnage handled for one cargo type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoVolume {
    /// Cargo classification label.
    pub cargo_type: String,
    /// Metric tons.
    pub total_volume: f64,
}

/// Tonnage handled for one commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityVolume {
    /// Commodity name.
    pub commodity: String,
    /// Metric tons.
    pub total_volume: f64,
}

/// A ranked commodity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCommodity {
    /// Commodity name.
    pub commodity: String,
    /// Metric tons.
    pub volume: f64,
}

/// A pie slice of the cargo share chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CargoShare {
    /// Cargo classification label.
    pub name: String,
    /// Metric tons.
    pub value: f64,
}

/// Tonnage per cargo type for one month, keyed by cargo label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CargoMonthRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// Metric tons per cargo label; every label of the series is present.
    #[serde(flatten)]
    pub volumes: BTreeMap<String, f64>,
}

/// Monthly tonnage by cargo type with a status message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CargoThroughputTrend {
    /// `"Success"`, or `"No data"` when nothing matched.
    pub message: String,
    /// One row per month; empty when nothing matched.
    pub data: Vec<CargoMonthRow>,
}

/// Monthly tonnage by cargo type with the labels seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoTrend {
    /// Cargo labels present in the window, sorted.
    pub cargo_types: Vec<String>,
    /// One row per month.
    pub data: Vec<CargoMonthRow>,
    /// `true` when every value is zero.
    pub all_zero: bool,
}

/// Container TEUs for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerTrafficRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// TEUs handled.
    pub teus: f64,
}

/// Monthly container traffic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerTraffic {
    /// `true` when every month is zero.
    pub no_data: bool,
    /// Explanation, present only when there is no data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// One row per month.
    pub data: Vec<ContainerTrafficRow>,
}

/// Summary cards over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiCards {
    /// All cargo, metric tons.
    pub total_throughput: f64,
    /// Dry bulk, metric tons.
    pub dry_cargo: f64,
    /// Liquid bulk, metric tons.
    pub liquid_cargo: f64,
    /// Containers, TEUs.
    pub containers: f64,
    /// Mean arrival-to-departure time, hours.
    pub avg_turnaround: f64,
    /// Mean logged idle time, hours.
    pub idle_time: f64,
    /// Berth hours as a share of berth plus idle hours, percent.
    pub berth_occupancy_rate: f64,
}

/// Mean berth stay for one month, per cargo type and overall.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VesselTurnaroundRow {
    /// `MMM-YYYY` label.
    pub month: String,
    /// Whole hours per snake_case cargo key.
    #[serde(flatten)]
    pub by_cargo: BTreeMap<String, f64>,
    /// Whole hours over every call of the month.
    pub overall: f64,
}

/// Idle time against turnaround for one call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdleVsTrt {
    /// Vessel identifier.
    pub vessel: String,
    /// Logged idle hours.
    pub idle: Option<f64>,
    /// Arrival-to-departure hours.
    pub trt: Option<f64>,
}

/// Calls per flag state, split by voyage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NationalityRow {
    /// Flag state, or `"Unknown"`.
    pub flag: String,
    /// Coastal calls.
    #[serde(rename = "Coastal")]
    pub coastal: u64,
    /// Foreign calls.
    #[serde(rename = "Foreign")]
    pub foreign: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_month_buckets() {
        assert_eq!(
            BucketKey::month(2025, 8).month_label().as_deref(),
            Some("Aug-2025")
        );
        assert_eq!(BucketKey::year(2025).month_label(), None);
        assert_eq!(BucketKey::month(2025, 13).month_label(), None);
        assert_eq!(BucketKey::year(2024).to_string(), "2024");
    }

    #[test]
    fn counts_days_in_bucket() {
        assert_eq!(BucketKey::month(2024, 2).days(), 29);
        assert_eq!(BucketKey::month(2023, 2).days(), 28);
        assert_eq!(BucketKey::month(2023, 12).days(), 31);
        assert_eq!(BucketKey::year(2024).days(), 366);
        assert_eq!(BucketKey::year(2100).days(), 365);
    }

    #[test]
    fn parses_granularity() {
        assert_eq!("month".parse::<Granularity>().unwrap(), Granularity::Month);
        assert_eq!("year".parse::<Granularity>().unwrap(), Granularity::Year);
        assert!("week".parse::<Granularity>().is_err());
    }

    #[test]
    fn trend_row_flattens_metrics_and_keeps_null_variance() {
        let row = TrendRow {
            year: 2024,
            month: Some("Jan-2024".to_string()),
            metrics: DetentionMetrics {
                avg_pbd: 2.5,
                vessels_count: 4,
            },
            variance: DetentionVariance::default(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "year": 2024,
                "month": "Jan-2024",
                "avgPBD": 2.5,
                "vesselsCount": 4,
                "variance": { "avgPBD": null, "vesselsCount": null }
            })
        );
    }

    #[test]
    fn throughput_rows_keep_both_shapes() {
        let monthly = ThroughputRow::Month(MonthlyThroughputRow {
            month: "Jan-2024".to_string(),
            current: ThroughputMetrics::default(),
            variance: ThroughputVariance::default(),
        });
        let json = serde_json::to_value(&monthly).unwrap();
        assert!(json["current"]["containerTEUs"].is_number());
        assert!(json.get("year").is_none());

        let yearly = ThroughputRow::Year(TrendRow {
            year: 2024,
            month: None,
            metrics: ThroughputMetrics::default(),
            variance: ThroughputVariance::default(),
        });
        let json = serde_json::to_value(&yearly).unwrap();
        assert_eq!(json["year"], 2024);
        assert!(json["totalThroughput"].is_number());
        assert!(json.get("month").is_none());
        assert!(json["variance"]["dryCargo"].is_null());
    }

    #[test]
    fn cargo_rows_flatten_their_labels() {
        let row = CargoMonthRow {
            month: "Jan-2024".to_string(),
            volumes: BTreeMap::from([
                ("Liquid Bulk".to_string(), 1_500.0),
                ("Break Bulk".to_string(), 0.0),
            ]),
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({ "month": "Jan-2024", "Liquid Bulk": 1500.0, "Break Bulk": 0.0 })
        );

        let traffic = ContainerTraffic {
            no_data: false,
            message: None,
            data: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&traffic).unwrap(),
            serde_json::json!({ "noData": false, "data": [] })
        );
    }

    #[test]
    fn policy_defaults() {
        let policy = SeriesPolicy::default();
        assert_eq!(policy.year_series_width, 5);
        assert_eq!(policy.total_berths, 21);
        assert_eq!(policy.year_anchor, YearAnchor::Latest);
        assert_eq!(
            policy.default_start,
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()
        );
    }
}
