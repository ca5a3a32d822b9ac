//! Year-over-year trend series.
//!
//! Most series aggregate one query grouped by the plan's buckets. Berth
//! occupancy instead runs one clipped query per bucket. Either way the
//! metric set is derived per bucket, the range is gap-filled and the
//! change from the previous bucket is attached.

use port_ops_analytics_models::{
    BucketKey, DetentionMetrics, DetentionVariance, IdleMetrics, IdleVariance, OccupancyMetrics,
    OccupancyVariance, OutputMetrics, OutputVariance, TrendRow, TurnaroundMetrics,
    TurnaroundVariance,
};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, Measure, NumericField, RawGroup,
};
use port_ops_vessel_models::{CargoType, TimeField};

use crate::buckets::{SeriesPlan, bucket_of, bucket_window};
use crate::derive::{self, hours};
use crate::fill::gap_fill;
use crate::shape::trend_rows;
use crate::variance::{Compare, with_variance};
use crate::AnalyticsError;

const TURNAROUND: Measure = Measure::Elapsed {
    from: TimeField::ArrivalOuterRoads,
    to: TimeField::DepartureOuterRoads,
};

const AT_BERTH: Measure = Measure::Elapsed {
    from: TimeField::BerthingTime,
    to: TimeField::UnberthingTime,
};

/// Runs `query` and turns its groups into a complete trend series.
pub(crate) async fn run_series<M, F>(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
    query: &AggregationQuery,
    to_metrics: F,
) -> Result<Vec<TrendRow<M, M::Variance>>, AnalyticsError>
where
    M: Compare + Default + Clone,
    F: Fn(BucketKey, &RawGroup) -> M,
{
    let groups = store.aggregate(query).await?;
    log::debug!(
        "{} raw groups for {} buckets",
        groups.len(),
        plan.buckets.len()
    );

    let raw = groups
        .iter()
        .filter_map(|g| bucket_of(&g.key).map(|key| (key, to_metrics(key, g))));

    Ok(trend_rows(with_variance(gap_fill(&plan.buckets, raw))))
}

/// Mean, median and container-only turnaround by arrival bucket.
///
/// Only calls with both an arrival and a departure take part.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn turnaround_trend(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
) -> Result<Vec<TrendRow<TurnaroundMetrics, TurnaroundVariance>>, AnalyticsError> {
    let query = AggregationQuery::new(
        CallFilter::within(TimeField::ArrivalOuterRoads, plan.window)
            .require(TimeField::DepartureOuterRoads),
        plan.group_key(TimeField::ArrivalOuterRoads),
    )
    .avg("mean", TURNAROUND)
    .avg_of_cargo("container", TURNAROUND, CargoType::Containerised)
    .push("all", TURNAROUND);

    run_series(store, plan, &query, |_, g| TurnaroundMetrics {
        mean_overall: hours(g.number_or_zero("mean")),
        median_overall: hours(derive::median(g.list("all"))),
        container_avg: hours(g.number_or_zero("container")),
    })
    .await
}

/// Idle share of elapsed arrival-to-departure time, by arrival bucket.
///
/// Only calls with a departure and logged idling take part.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn idle_trend(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
) -> Result<Vec<TrendRow<IdleMetrics, IdleVariance>>, AnalyticsError> {
    let query = AggregationQuery::new(
        CallFilter::within(TimeField::ArrivalOuterRoads, plan.window)
            .require(TimeField::DepartureOuterRoads)
            .require_logged(NumericField::IdlingTotal),
        plan.group_key(TimeField::ArrivalOuterRoads),
    )
    .sum("idle", Measure::Field(NumericField::IdlingTotal))
    .sum("elapsed", TURNAROUND);

    run_series(store, plan, &query, |_, g| {
        let idle = hours(g.number_or_zero("idle"));
        IdleMetrics {
            idle_percent: derive::percent(idle, hours(g.number_or_zero("elapsed"))),
            total_idle: idle,
        }
    })
    .await
}

/// Tons handled per berth-day, by berthing bucket.
///
/// Only calls that have unberthed take part.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn avg_output_trend(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
) -> Result<Vec<TrendRow<OutputMetrics, OutputVariance>>, AnalyticsError> {
    let query = AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, plan.window)
            .require(TimeField::UnberthingTime),
        plan.group_key(TimeField::BerthingTime),
    )
    .sum("cargo", Measure::Field(NumericField::CargoTonnage))
    .sum("at_berth", AT_BERTH)
    .count("calls");

    run_series(store, plan, &query, |_, g| OutputMetrics {
        avg_output: derive::ratio(
            g.number_or_zero("cargo"),
            g.number_or_zero("at_berth") / derive::SECONDS_PER_DAY,
        ),
        vessel_count: derive::count(g.number_or_zero("calls")),
    })
    .await
}

/// Mean pre-berthing detention, by berthing bucket.
///
/// Only calls with a logged detention take part.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn pbd_trend(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
) -> Result<Vec<TrendRow<DetentionMetrics, DetentionVariance>>, AnalyticsError> {
    let query = AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, plan.window)
            .require_logged(NumericField::PbdTotal),
        plan.group_key(TimeField::BerthingTime),
    )
    .avg("pbd", Measure::Field(NumericField::PbdTotal))
    .count("calls");

    run_series(store, plan, &query, |_, g| DetentionMetrics {
        avg_pbd: hours(g.number_or_zero("pbd")),
        vessels_count: derive::count(g.number_or_zero("calls")),
    })
    .await
}

fn occupancy_query(window: DateWindow) -> AggregationQuery {
    AggregationQuery::new(
        CallFilter::overlapping(TimeField::BerthingTime, TimeField::UnberthingTime, window),
        GroupKey::All,
    )
    .sum(
        "occupied",
        Measure::Clipped {
            from: TimeField::BerthingTime,
            to: TimeField::UnberthingTime,
            window,
        },
    )
    .count("calls")
}

/// Berth occupancy per calendar bucket against `total_berths` berths.
///
/// Each bucket counts the part of every berth stay that falls inside it,
/// so a stay spanning two months is split between them and a call still
/// at berth counts up to the bucket end. `vessels_count` is the number of
/// calls at berth at some point in the bucket. Occupied hours are capped
/// at the berth-hours available in the bucket. The per-bucket queries run
/// concurrently; if any fails the whole series fails.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if any aggregation fails.
pub async fn berth_occupancy_trend(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
    total_berths: u32,
) -> Result<Vec<TrendRow<OccupancyMetrics, OccupancyVariance>>, AnalyticsError> {
    let per_bucket = plan
        .buckets
        .iter()
        .filter_map(|&key| bucket_window(key).map(|window| (key, occupancy_query(window))))
        .map(|(key, query)| async move {
            store
                .aggregate(&query)
                .await
                .map(|groups| (key, groups.into_iter().next()))
        });

    let groups = futures::future::try_join_all(per_bucket).await?;
    log::debug!("{} occupancy buckets", groups.len());

    let raw = groups.into_iter().filter_map(|(key, group)| {
        let group = group?;
        let available = derive::available_berth_hours(total_berths, key.days());
        let occupied = derive::cap_occupied(hours(group.number_or_zero("occupied")), available);
        Some((
            key,
            OccupancyMetrics {
                occupancy_hours: occupied,
                occupancy_percent: derive::percent(occupied, available),
                vessels_count: derive::count(group.number_or_zero("calls")),
            },
        ))
    });

    Ok(trend_rows(with_variance(gap_fill(&plan.buckets, raw))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, call, date};
    use port_ops_analytics_models::{Granularity, SeriesPolicy};
    use port_ops_database::memory::MemoryVesselStore;
    use port_ops_database_models::DateWindow;
    use port_ops_vessel_models::{DurationComponents, VesselCall};

    fn yearly_plan() -> SeriesPlan {
        SeriesPlan::new(
            Granularity::Year,
            DateWindow::whole_days(date(2021, 1, 1), date(2025, 12, 31)).unwrap(),
            &SeriesPolicy::default(),
            date(2025, 10, 17),
        )
    }

    fn monthly_plan(start: (i32, u32), end: (i32, u32, u32)) -> SeriesPlan {
        SeriesPlan::new(
            Granularity::Month,
            DateWindow::whole_days(date(start.0, start.1, 1), date(end.0, end.1, end.2)).unwrap(),
            &SeriesPolicy::default(),
            date(2025, 10, 17),
        )
    }

    fn idle(mut c: VesselCall, seconds: u64) -> VesselCall {
        c.durations = DurationComponents {
            idling_port: Some(seconds),
            ..DurationComponents::default()
        };
        c
    }

    #[tokio::test]
    async fn idle_trend_fills_five_years_around_sparse_data() {
        // 2023: 12h wait + 24h berth + 6h = 42h elapsed, 4.2h idle.
        // 2024: 6h + 18h + 6h = 30h elapsed, 6h idle.
        let store = MemoryVesselStore::new(vec![
            idle(call("A", CargoType::BreakBulk, at(2023, 5, 1, 0), 12, 24), 15_120),
            idle(call("B", CargoType::BreakBulk, at(2024, 7, 1, 0), 6, 18), 21_600),
        ]);

        let rows = idle_trend(&store, &yearly_plan()).await.unwrap();

        let years: Vec<i32> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2021, 2022, 2023, 2024, 2025]);
        for zero in [0, 1, 4] {
            assert_eq!(rows[zero].metrics, IdleMetrics::default());
        }
        assert!((rows[2].metrics.total_idle - 4.2).abs() < 1e-9);
        assert!((rows[2].metrics.idle_percent - 10.0).abs() < 1e-9);
        assert!((rows[3].metrics.idle_percent - 20.0).abs() < 1e-9);

        assert_eq!(rows[0].variance, IdleVariance::default());
        assert_eq!(rows[2].variance.idle_percent, None);
        assert!((rows[3].variance.idle_percent.unwrap() - 100.0).abs() < 1e-9);
        assert!((rows[4].variance.idle_percent.unwrap() + 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn idle_trend_skips_calls_without_logged_idling() {
        let store = MemoryVesselStore::new(vec![call(
            "A",
            CargoType::BreakBulk,
            at(2024, 7, 1, 0),
            6,
            18,
        )]);
        let rows = idle_trend(&store, &yearly_plan()).await.unwrap();
        assert!(rows.iter().all(|r| r.metrics == IdleMetrics::default()));
    }

    #[tokio::test]
    async fn turnaround_trend_reports_mean_median_and_container_average() {
        let store = MemoryVesselStore::new(vec![
            // 10h, 20h, 30h, 40h turnarounds in March 2024.
            call("A", CargoType::Containerised, at(2024, 3, 1, 0), 2, 2),
            call("B", CargoType::Containerised, at(2024, 3, 2, 0), 4, 10),
            call("C", CargoType::LiquidBulk, at(2024, 3, 3, 0), 4, 20),
            call("D", CargoType::LiquidBulk, at(2024, 3, 4, 0), 4, 30),
        ]);

        let rows = turnaround_trend(&store, &monthly_plan((2024, 2), (2024, 3, 31)))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].month.as_deref(), Some("Feb-2024"));
        assert_eq!(rows[0].metrics, TurnaroundMetrics::default());

        let march = &rows[1].metrics;
        assert!((march.mean_overall - 25.0).abs() < 1e-9);
        assert!((march.median_overall - 25.0).abs() < 1e-9);
        assert!((march.container_avg - 15.0).abs() < 1e-9);
        assert_eq!(rows[1].variance.mean_overall, None);
    }

    #[tokio::test]
    async fn avg_output_trend_divides_cargo_by_berth_days() {
        let mut c = call("A", CargoType::DryBulkMechanical, at(2024, 1, 10, 0), 0, 48);
        c.cargo_tonnage = 10_000.0;
        let mut open = call("B", CargoType::DryBulkMechanical, at(2024, 1, 12, 0), 0, 1);
        open.unberthing_time = None;
        open.departure_outer_roads = None;
        open.cargo_tonnage = 99_999.0;

        let store = MemoryVesselStore::new(vec![c, open]);
        let rows = avg_output_trend(&store, &monthly_plan((2024, 1), (2024, 1, 31)))
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert!((rows[0].metrics.avg_output - 5_000.0).abs() < 1e-9);
        assert_eq!(rows[0].metrics.vessel_count, 1);
    }

    #[tokio::test]
    async fn pbd_trend_averages_logged_detention_in_hours() {
        let mut a = call("A", CargoType::BreakBulk, at(2024, 1, 10, 0), 0, 4);
        a.durations.pbd_total = Some(7_200);
        let mut b = call("B", CargoType::BreakBulk, at(2024, 1, 11, 0), 0, 4);
        b.durations.pbd_total = Some(14_400);
        let c = call("C", CargoType::BreakBulk, at(2024, 1, 12, 0), 0, 4);

        let store = MemoryVesselStore::new(vec![a, b, c]);
        let rows = pbd_trend(&store, &monthly_plan((2024, 1), (2024, 1, 31)))
            .await
            .unwrap();

        assert!((rows[0].metrics.avg_pbd - 3.0).abs() < 1e-9);
        assert_eq!(rows[0].metrics.vessels_count, 2);
    }

    #[tokio::test]
    async fn occupancy_trend_caps_at_available_hours() {
        // One berth in February 2024 offers 29 * 24 = 696 hours. Two
        // overlapping 500-hour stays would exceed it.
        let store = MemoryVesselStore::new(vec![
            call("A", CargoType::BreakBulk, at(2024, 2, 1, 0), 0, 500),
            call("B", CargoType::BreakBulk, at(2024, 2, 2, 0), 0, 500),
        ]);

        let rows = berth_occupancy_trend(&store, &monthly_plan((2024, 2), (2024, 2, 29)), 1)
            .await
            .unwrap();

        let feb = rows[0].metrics;
        assert!((feb.occupancy_hours - 696.0).abs() < 1e-9);
        assert!((feb.occupancy_percent - 100.0).abs() < 1e-9);
        assert_eq!(feb.vessels_count, 2);
    }

    #[tokio::test]
    async fn occupancy_trend_splits_stays_across_months() {
        // 384h at berth: 168h in January, 216h in February.
        let spanning = call("A", CargoType::BreakBulk, at(2024, 1, 25, 0), 0, 384);
        // Berthed late February and never unberthed: 48h up to the bucket end.
        let mut open = call("B", CargoType::BreakBulk, at(2024, 2, 28, 0), 0, 1);
        open.unberthing_time = None;
        open.departure_outer_roads = None;
        // Berthed before the plan and gone before it starts.
        let earlier = call("C", CargoType::BreakBulk, at(2023, 12, 1, 0), 0, 24);

        let store = MemoryVesselStore::new(vec![spanning, open, earlier]);
        let rows = berth_occupancy_trend(&store, &monthly_plan((2024, 1), (2024, 2, 29)), 1)
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        let (jan, feb) = (rows[0].metrics, rows[1].metrics);
        assert!((jan.occupancy_hours - 168.0).abs() < 1e-9);
        assert!((jan.occupancy_percent - 168.0 / 744.0 * 100.0).abs() < 1e-9);
        assert_eq!(jan.vessels_count, 1);

        assert!((feb.occupancy_hours - 264.0).abs() < 1e-9);
        assert!((feb.occupancy_percent - 264.0 / 696.0 * 100.0).abs() < 1e-9);
        assert_eq!(feb.vessels_count, 2);
        assert!(rows[1].variance.occupancy_hours.is_some());
    }

    #[tokio::test]
    async fn occupancy_trend_caps_spanning_stays_per_bucket() {
        // Two berths busy from mid-January to mid-March on a one-berth port.
        let store = MemoryVesselStore::new(vec![
            call("A", CargoType::BreakBulk, at(2024, 1, 15, 0), 0, 24 * 60),
            call("B", CargoType::BreakBulk, at(2024, 1, 15, 0), 0, 24 * 60),
        ]);

        let rows = berth_occupancy_trend(&store, &monthly_plan((2024, 1), (2024, 3, 31)), 1)
            .await
            .unwrap();

        // January: 17 days each, 816h of 744h available.
        assert!((rows[0].metrics.occupancy_hours - 744.0).abs() < 1e-9);
        assert!((rows[0].metrics.occupancy_percent - 100.0).abs() < 1e-9);
        assert!((rows[1].metrics.occupancy_hours - 696.0).abs() < 1e-9);
        // March: 14 days each, 672h of 744h.
        assert!((rows[2].metrics.occupancy_hours - 672.0).abs() < 1e-9);
        assert!(rows.iter().all(|r| r.metrics.occupancy_percent <= 100.0));
    }

    #[tokio::test]
    async fn identical_requests_give_identical_output() {
        let store = MemoryVesselStore::new(vec![
            call("A", CargoType::Containerised, at(2024, 3, 1, 0), 2, 7),
            call("B", CargoType::LiquidBulk, at(2024, 3, 9, 0), 3, 11),
            call("C", CargoType::LiquidBulk, at(2024, 3, 20, 0), 5, 13),
        ]);
        let plan = monthly_plan((2024, 1), (2024, 6, 30));

        let first = turnaround_trend(&store, &plan).await.unwrap();
        let second = turnaround_trend(&store, &plan).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
