//! Cargo mix, commodity rankings and monthly cargo series.
//!
//! Calls are selected by berthing time. Endpoints taking an optional
//! window aggregate over every call when it is `None`.

use std::collections::{BTreeMap, BTreeSet};

use port_ops_analytics_models::{
    BucketKey, CargoMonthRow, CargoShare, CargoThroughputTrend, CargoTrend, CargoVolume,
    CommodityVolume, ContainerTraffic, ContainerTrafficRow, TopCommodity,
};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, GroupValue, LabelField, Measure,
    NumericField,
};
use port_ops_vessel_models::TimeField;

use crate::buckets::{bucket_of, month_range, span};
use crate::fill::gap_fill;
use crate::AnalyticsError;

const TONS: Measure = Measure::Field(NumericField::CargoTonnage);

/// Shown when a container traffic window has no TEUs at all.
pub const NO_CONTAINER_TRAFFIC: &str =
    "No container traffic data available for the selected period";

fn berthed(window: Option<DateWindow>) -> CallFilter {
    window.map_or_else(CallFilter::default, |w| {
        CallFilter::within(TimeField::BerthingTime, w)
    })
}

async fn tons_by_label(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
    label: LabelField,
) -> Result<Vec<(String, f64)>, AnalyticsError> {
    let query = AggregationQuery::new(berthed(window), GroupKey::Label(label)).sum("tons", TONS);

    Ok(store
        .aggregate(&query)
        .await?
        .into_iter()
        .filter_map(|g| {
            let tons = g.number_or_zero("tons");
            match g.key {
                GroupValue::Label(label) => Some((label, tons)),
                _ => None,
            }
        })
        .collect())
}

fn largest_first(mut totals: Vec<(String, f64)>) -> Vec<(String, f64)> {
    totals.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    totals
}

/// Tonnage per cargo type, in label order.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn cargo_mix(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
) -> Result<Vec<CargoVolume>, AnalyticsError> {
    Ok(tons_by_label(store, window, LabelField::CargoType)
        .await?
        .into_iter()
        .map(|(cargo_type, total_volume)| CargoVolume {
            cargo_type,
            total_volume,
        })
        .collect())
}

/// Tonnage per commodity, largest first. Calls without a commodity are
/// left out.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn commodity_volumes(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
) -> Result<Vec<CommodityVolume>, AnalyticsError> {
    let totals = tons_by_label(store, window, LabelField::Commodity).await?;
    Ok(largest_first(totals)
        .into_iter()
        .map(|(commodity, total_volume)| CommodityVolume {
            commodity,
            total_volume,
        })
        .collect())
}

/// The `limit` largest commodities by tonnage; every commodity when
/// `limit` is `None`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn top_commodities(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
    limit: Option<usize>,
) -> Result<Vec<TopCommodity>, AnalyticsError> {
    let totals = tons_by_label(store, window, LabelField::Commodity).await?;
    Ok(largest_first(totals)
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(commodity, volume)| TopCommodity { commodity, volume })
        .collect())
}

/// Share of tonnage per cargo type, largest first.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn cargo_share(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
) -> Result<Vec<CargoShare>, AnalyticsError> {
    let totals = tons_by_label(store, window, LabelField::CargoType).await?;
    Ok(largest_first(totals)
        .into_iter()
        .map(|(name, value)| CargoShare { name, value })
        .collect())
}

/// Tonnage per (month, cargo label) over a window.
struct MonthlyCargo {
    range: Vec<BucketKey>,
    labels: BTreeSet<String>,
    tons: BTreeMap<BucketKey, BTreeMap<String, f64>>,
}

impl MonthlyCargo {
    async fn load(store: &dyn VesselStore, window: DateWindow) -> Result<Self, AnalyticsError> {
        let query = AggregationQuery::new(
            CallFilter::within(TimeField::BerthingTime, window),
            GroupKey::YearMonthLabel(TimeField::BerthingTime, LabelField::CargoType),
        )
        .sum("tons", TONS);

        let mut labels = BTreeSet::new();
        let mut tons: BTreeMap<BucketKey, BTreeMap<String, f64>> = BTreeMap::new();
        for group in store.aggregate(&query).await? {
            let total = group.number_or_zero("tons");
            if let GroupValue::YearMonthLabel { year, month, label } = group.key {
                labels.insert(label.clone());
                tons.entry(BucketKey::month(year, month))
                    .or_default()
                    .insert(label, total);
            }
        }

        Ok(Self {
            range: month_range(window.start.date(), window.last_date()),
            labels,
            tons,
        })
    }

    fn rows(&self) -> Vec<CargoMonthRow> {
        self.range
            .iter()
            .map(|key| {
                let month = self.tons.get(key);
                CargoMonthRow {
                    month: key.to_string(),
                    volumes: self
                        .labels
                        .iter()
                        .map(|label| {
                            let tons = month.and_then(|m| m.get(label)).copied();
                            (label.clone(), tons.unwrap_or(0.0))
                        })
                        .collect(),
                }
            })
            .collect()
    }
}

/// Monthly tonnage per cargo type with a status message.
///
/// Every month of the window is present and carries every cargo label
/// seen in it. When no call matches, the message is `"No data"` and the
/// series is empty.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn throughput_trend_by_cargo(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<CargoThroughputTrend, AnalyticsError> {
    let monthly = MonthlyCargo::load(store, window).await?;
    if monthly.labels.is_empty() {
        return Ok(CargoThroughputTrend {
            message: "No data".to_string(),
            data: Vec::new(),
        });
    }
    Ok(CargoThroughputTrend {
        message: "Success".to_string(),
        data: monthly.rows(),
    })
}

/// Monthly tonnage per cargo type with the labels seen and an all-zero
/// flag.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn cargo_trend(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<CargoTrend, AnalyticsError> {
    let monthly = MonthlyCargo::load(store, window).await?;
    let data = monthly.rows();
    let all_zero = data
        .iter()
        .all(|row| row.volumes.values().all(|v| *v == 0.0));

    Ok(CargoTrend {
        cargo_types: monthly.labels.into_iter().collect(),
        data,
        all_zero,
    })
}

/// Monthly container TEUs over the whole months touched by `window`.
///
/// Only calls with a positive TEU count take part. Months without calls
/// are zero; when every month is zero the result is flagged `no_data`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn container_traffic_trend(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<ContainerTraffic, AnalyticsError> {
    let range = month_range(window.start.date(), window.last_date());
    let months = span(&range).unwrap_or(window);

    let query = AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, months)
            .require_positive(NumericField::ContainerCount),
        GroupKey::YearMonth(TimeField::BerthingTime),
    )
    .sum("teus", Measure::Field(NumericField::ContainerCount));

    let groups = store.aggregate(&query).await?;
    let raw = groups
        .iter()
        .filter_map(|g| bucket_of(&g.key).map(|key| (key, g.number_or_zero("teus"))));

    let data: Vec<ContainerTrafficRow> = gap_fill(&range, raw)
        .into_iter()
        .map(|(key, teus)| ContainerTrafficRow {
            month: key.to_string(),
            teus,
        })
        .collect();

    let no_data = data.iter().all(|row| row.teus == 0.0);
    Ok(ContainerTraffic {
        no_data,
        message: no_data.then(|| NO_CONTAINER_TRAFFIC.to_string()),
        data,
    })
}
