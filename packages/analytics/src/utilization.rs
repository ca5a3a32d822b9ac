//! Monthly time-utilization breakdown and waiting trend.

use port_ops_analytics_models::{BucketKey, TimeUtilizationRow, WaitingTrendRow};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, Measure, NumericField,
};
use port_ops_vessel_models::TimeField;

use crate::buckets::{bucket_of, month_range};
use crate::derive::{hours, round_to};
use crate::fill::gap_fill;
use crate::AnalyticsError;

const COMPONENTS: [(&str, NumericField); 7] = [
    ("pbd", NumericField::PbdTotal),
    ("snwb", NumericField::SnwbTotal),
    ("swb", NumericField::SwbTotal),
    ("shifting", NumericField::ShiftingTotal),
    ("idling", NumericField::IdlingTotal),
    ("om", NumericField::OmTime),
    ("im", NumericField::ImTime),
];

fn whole_hours(seconds: f64) -> f64 {
    round_to(hours(seconds), 0)
}

fn label(key: BucketKey) -> String {
    key.month_label().unwrap_or_else(|| key.to_string())
}

/// Average of each time component per berthing month, in whole hours.
///
/// Only calls with a positive logged turnaround take part. Months with no
/// calls are reported as zeros.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn time_utilization_breakdown(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<Vec<TimeUtilizationRow>, AnalyticsError> {
    let range = month_range(window.start.date(), window.last_date());

    let query = COMPONENTS.iter().fold(
        AggregationQuery::new(
            CallFilter::within(TimeField::BerthingTime, window)
                .require_positive(NumericField::TrtTotal),
            GroupKey::YearMonth(TimeField::BerthingTime),
        ),
        |query, &(name, field)| query.avg(name, Measure::Field(field)),
    );

    let groups = store.aggregate(&query).await?;
    let raw = groups.iter().filter_map(|g| {
        bucket_of(&g.key).map(|key| {
            let averages = COMPONENTS.map(|(name, _)| whole_hours(g.number_or_zero(name)));
            (key, averages)
        })
    });

    Ok(gap_fill(&range, raw)
        .into_iter()
        .map(|(key, [pbd, snwb, swb, shifting, idling, om, im])| TimeUtilizationRow {
            month: label(key),
            pbd,
            snwb,
            swb,
            shifting,
            idling,
            om,
            im,
        })
        .collect())
}

/// Average waiting before berth (PBD + SNWB) per berthing month, in whole
/// hours.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn waiting_trend(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<Vec<WaitingTrendRow>, AnalyticsError> {
    let range = month_range(window.start.date(), window.last_date());

    let query = AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, window),
        GroupKey::YearMonth(TimeField::BerthingTime),
    )
    .avg("waiting", Measure::Field(NumericField::WaitingBeforeBerth));

    let groups = store.aggregate(&query).await?;
    let raw = groups.iter().filter_map(|g| {
        bucket_of(&g.key).map(|key| (key, whole_hours(g.number_or_zero("waiting"))))
    });

    Ok(gap_fill(&range, raw)
        .into_iter()
        .map(|(key, avg_waiting_hours)| WaitingTrendRow {
            month: label(key),
            avg_waiting_hours,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, call};
    use port_ops_database::memory::MemoryVesselStore;
    use port_ops_vessel_models::{CargoType, DurationComponents};

    const HOUR: u64 = 3_600;

    fn store() -> MemoryVesselStore {
        let mut a = call("A", CargoType::LiquidBulk, at(2024, 1, 5, 0), 0, 10);
        a.durations = DurationComponents {
            pbd_total: Some(4 * HOUR),
            snwb_total: Some(2 * HOUR),
            idling_port: Some(HOUR),
            idling_non_port: Some(HOUR),
            trt_total: Some(40 * HOUR),
            ..DurationComponents::default()
        };
        let mut b = call("B", CargoType::LiquidBulk, at(2024, 1, 20, 0), 0, 10);
        b.durations = DurationComponents {
            pbd_total: Some(8 * HOUR),
            om_time: Some(3 * HOUR),
            trt_total: Some(30 * HOUR),
            ..DurationComponents::default()
        };
        // No logged turnaround: left out of the breakdown only.
        let mut c = call("C", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 10);
        c.durations = DurationComponents {
            pbd_total: Some(10 * HOUR),
            ..DurationComponents::default()
        };
        MemoryVesselStore::new(vec![a, b, c])
    }

    fn window() -> DateWindow {
        DateWindow::new(at(2024, 1, 1, 0), at(2024, 3, 31, 23))
    }

    #[tokio::test]
    async fn breakdown_averages_components_per_month() {
        let rows = time_utilization_breakdown(&store(), window()).await.unwrap();

        let months: Vec<&str> = rows.iter().map(|r| r.month.as_str()).collect();
        assert_eq!(months, vec!["Jan-2024", "Feb-2024", "Mar-2024"]);

        let jan = &rows[0];
        assert!((jan.pbd - 6.0).abs() < f64::EPSILON);
        assert!((jan.snwb - 2.0).abs() < f64::EPSILON);
        assert!((jan.idling - 2.0).abs() < f64::EPSILON);
        assert!((jan.om - 3.0).abs() < f64::EPSILON);
        assert!(jan.swb.abs() < f64::EPSILON);
        assert!(jan.im.abs() < f64::EPSILON);

        assert!(rows[1].pbd.abs() < f64::EPSILON);
        assert!(rows[2].pbd.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn breakdown_serializes_component_names() {
        let rows = time_utilization_breakdown(&store(), window()).await.unwrap();
        let json = serde_json::to_value(&rows[0]).unwrap();

        assert_eq!(json["month"], "Jan-2024");
        assert_eq!(json["PBD"], 6.0);
        assert_eq!(json["Shifting"], 0.0);
        assert_eq!(json["OM"], 3.0);
    }

    #[tokio::test]
    async fn waiting_trend_is_gap_filled() {
        let rows = waiting_trend(&store(), window()).await.unwrap();

        assert_eq!(rows.len(), 3);
        // (6h + 8h) / 2
        assert!((rows[0].avg_waiting_hours - 7.0).abs() < f64::EPSILON);
        assert!(rows[1].avg_waiting_hours.abs() < f64::EPSILON);
        assert!((rows[2].avg_waiting_hours - 10.0).abs() < f64::EPSILON);

        let json = serde_json::to_value(&rows[2]).unwrap();
        assert_eq!(json["month"], "Mar-2024");
        assert_eq!(json["avgWaitingHours"], 10.0);
    }
}
