//! Per-vessel figures: berth stay trend, idle against turnaround and the
//! flag state ranking.

use std::collections::BTreeMap;

use port_ops_analytics_models::{BucketKey, IdleVsTrt, NationalityRow, VesselTurnaroundRow};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, GroupValue, LabelField, Measure, RawGroup,
};
use port_ops_vessel_models::{CargoType, CoastalOrForeign, TimeField};

use crate::buckets::{bucket_of, month_range};
use crate::derive::{self, hours, round_to};
use crate::params::DEFAULT_FLAG_LIMIT;
use crate::AnalyticsError;

const BERTH_STAY: Measure = Measure::Elapsed {
    from: TimeField::BerthingTime,
    to: TimeField::UnberthingTime,
};

/// Cargo types every turnaround row reports, zero when absent.
const REPORTED_CARGO: [CargoType; 4] = [
    CargoType::BreakBulk,
    CargoType::LiquidBulk,
    CargoType::DryBulkMechanical,
    CargoType::Containerised,
];

/// Column key for a cargo label: lower case, words joined by `_`.
#[must_use]
pub fn cargo_key(label: &str) -> String {
    label
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

fn for_vessel(filter: CallFilter, vessel: Option<&str>) -> CallFilter {
    match vessel {
        Some(vessel) => filter.vessel(vessel),
        None => filter,
    }
}

fn whole_hours(group: &RawGroup) -> f64 {
    round_to(hours(group.number_or_zero("stay")), 0)
}

/// Mean berth stay per berthing month, per cargo type and overall, in
/// whole hours.
///
/// Only calls that have unberthed take part, optionally for one vessel.
/// Every month of the window is present; the four standard cargo columns
/// are always reported and other cargo labels appear in the months they
/// occur.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if either aggregation fails.
pub async fn vessel_turnaround_trend(
    store: &dyn VesselStore,
    window: DateWindow,
    vessel: Option<&str>,
) -> Result<Vec<VesselTurnaroundRow>, AnalyticsError> {
    let filter = for_vessel(
        CallFilter::within(TimeField::BerthingTime, window).require(TimeField::UnberthingTime),
        vessel,
    );
    let by_cargo = AggregationQuery::new(
        filter.clone(),
        GroupKey::YearMonthLabel(TimeField::BerthingTime, LabelField::CargoType),
    )
    .avg("stay", BERTH_STAY);
    let overall =
        AggregationQuery::new(filter, GroupKey::YearMonth(TimeField::BerthingTime))
            .avg("stay", BERTH_STAY);

    let (by_cargo, overall) =
        futures::try_join!(store.aggregate(&by_cargo), store.aggregate(&overall))?;

    let mut cargo_hours: BTreeMap<BucketKey, BTreeMap<String, f64>> = BTreeMap::new();
    for group in &by_cargo {
        if let GroupValue::YearMonthLabel { year, month, label } = &group.key {
            cargo_hours
                .entry(BucketKey::month(*year, *month))
                .or_default()
                .insert(cargo_key(label), whole_hours(group));
        }
    }
    let overall: BTreeMap<BucketKey, f64> = overall
        .iter()
        .filter_map(|g| bucket_of(&g.key).map(|key| (key, whole_hours(g))))
        .collect();

    Ok(month_range(window.start.date(), window.last_date())
        .into_iter()
        .map(|key| {
            let mut columns: BTreeMap<String, f64> = REPORTED_CARGO
                .iter()
                .map(|cargo| (cargo_key(&cargo.to_string()), 0.0))
                .collect();
            if let Some(found) = cargo_hours.remove(&key) {
                columns.extend(found);
            }
            VesselTurnaroundRow {
                month: key.to_string(),
                by_cargo: columns,
                overall: overall.get(&key).copied().unwrap_or(0.0),
            }
        })
        .collect())
}

/// Idle hours against turnaround hours for every call arriving in the
/// window, optionally for one vessel, in insertion order.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the calls cannot be read.
pub async fn idle_vs_trt(
    store: &dyn VesselStore,
    window: DateWindow,
    vessel: Option<&str>,
) -> Result<Vec<IdleVsTrt>, AnalyticsError> {
    let filter = for_vessel(CallFilter::within(TimeField::ArrivalOuterRoads, window), vessel);
    let calls = store.calls(&filter).await?;
    log::debug!("idle vs turnaround over {} calls", calls.len());

    Ok(calls
        .into_iter()
        .map(|call| IdleVsTrt {
            idle: call.idle_hours(),
            trt: call.turnaround_hours(),
            vessel: call.vessel_id,
        })
        .collect())
}

async fn calls_per_flag(
    store: &dyn VesselStore,
    filter: CallFilter,
) -> Result<BTreeMap<String, u64>, AnalyticsError> {
    let query = AggregationQuery::new(filter, GroupKey::Label(LabelField::FlagCountry))
        .count("calls");

    Ok(store
        .aggregate(&query)
        .await?
        .into_iter()
        .filter_map(|g| {
            let calls = derive::count(g.number_or_zero("calls"));
            match g.key {
                GroupValue::Label(flag) => Some((flag, calls)),
                _ => None,
            }
        })
        .collect())
}

/// Calls per flag state arriving in the window, split into coastal and
/// foreign voyages.
///
/// Flags are ranked by their total calls, including calls with no voyage
/// type, and the top `limit` (default [`DEFAULT_FLAG_LIMIT`]) are
/// returned. Calls without a flag are counted under `"Unknown"`.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if any aggregation fails.
pub async fn nationality_stats(
    store: &dyn VesselStore,
    window: DateWindow,
    limit: Option<usize>,
) -> Result<Vec<NationalityRow>, AnalyticsError> {
    let filter = CallFilter::within(TimeField::ArrivalOuterRoads, window);

    let (total, coastal, foreign) = futures::try_join!(
        calls_per_flag(store, filter.clone()),
        calls_per_flag(store, filter.clone().voyage(CoastalOrForeign::Coastal)),
        calls_per_flag(store, filter.voyage(CoastalOrForeign::Foreign)),
    )?;

    let mut ranked: Vec<(String, u64)> = total.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    Ok(ranked
        .into_iter()
        .take(limit.unwrap_or(DEFAULT_FLAG_LIMIT))
        .map(|(flag, _)| NationalityRow {
            coastal: coastal.get(&flag).copied().unwrap_or(0),
            foreign: foreign.get(&flag).copied().unwrap_or(0),
            flag,
        })
        .collect())
}
