//! Headline KPI comparison: a window against the same window one year
//! earlier.

use chrono::{Months, NaiveDateTime};
use port_ops_analytics_models::{KpiComparison, KpiSnapshot};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, Measure, NumericField, RawGroup, Reducer,
};
use port_ops_vessel_models::{CargoType, TimeField};

use crate::derive::{self, hours, million_tons};
use crate::variance::Compare as _;
use crate::AnalyticsError;

const TURNAROUND: Measure = Measure::Elapsed {
    from: TimeField::ArrivalOuterRoads,
    to: TimeField::DepartureOuterRoads,
};

/// Shifts a window back one calendar year. February 29th maps to the
/// 28th.
#[must_use]
pub fn previous_year(window: &DateWindow) -> DateWindow {
    let back = |at: NaiveDateTime| at.checked_sub_months(Months::new(12)).unwrap_or(at);
    DateWindow::new(back(window.start), back(window.end))
}

fn snapshot_query(window: DateWindow) -> AggregationQuery {
    AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, window),
        GroupKey::All,
    )
    .sum("tons", Measure::Field(NumericField::CargoTonnage))
    .reduce(
        "dry_tons",
        Reducer::Sum(Measure::Field(NumericField::CargoTonnage)),
        Some(CargoType::DryBulkMechanical),
    )
    .reduce(
        "liquid_tons",
        Reducer::Sum(Measure::Field(NumericField::CargoTonnage)),
        Some(CargoType::LiquidBulk),
    )
    .sum("teus", Measure::Field(NumericField::ContainerCount))
    .push("turnaround", TURNAROUND)
    .reduce(
        "container_turnaround",
        Reducer::Push(TURNAROUND),
        Some(CargoType::Containerised),
    )
    .sum(
        "at_berth",
        Measure::Elapsed {
            from: TimeField::BerthingTime,
            to: TimeField::UnberthingTime,
        },
    )
    .sum("idle", Measure::Field(NumericField::IdlingTotal))
    .avg("pbd", Measure::Field(NumericField::PbdTotal))
}

fn positive_hours(seconds: &[f64]) -> Vec<f64> {
    seconds
        .iter()
        .map(|s| hours(*s))
        .filter(|h| *h > 0.0)
        .collect()
}

/// Derives the KPI snapshot of one window's group. An empty window is all
/// zeros.
#[must_use]
pub fn snapshot(group: Option<&RawGroup>) -> KpiSnapshot {
    let Some(g) = group else {
        return KpiSnapshot::default();
    };

    let tons = g.number_or_zero("tons");
    let turnaround = positive_hours(g.list("turnaround"));
    let container = positive_hours(g.list("container_turnaround"));
    let at_berth = hours(g.number_or_zero("at_berth"));
    let idle = hours(g.number_or_zero("idle"));

    KpiSnapshot {
        total_throughput_mmt: million_tons(tons),
        dry_cargo_mmt: million_tons(g.number_or_zero("dry_tons")),
        liquid_cargo_mmt: million_tons(g.number_or_zero("liquid_tons")),
        container_teus: g.number_or_zero("teus"),
        mean_trt: derive::mean(&turnaround),
        median_trt: derive::median(&turnaround),
        avg_container_trt: derive::mean(&container),
        output_per_berth_day: derive::ratio(tons, at_berth) * 24.0,
        avg_pbd: hours(g.number_or_zero("pbd")),
        idle_percent: derive::percent(idle, at_berth),
    }
}

/// Compares `window` (year 1) with the same window a year earlier
/// (year 2), by berthing time.
///
/// Idle percentage here is idle hours over berth-occupied hours.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if either aggregation fails.
pub async fn kpi_comparison(
    store: &dyn VesselStore,
    window: DateWindow,
) -> Result<KpiComparison, AnalyticsError> {
    let current = snapshot_query(window);
    let previous = snapshot_query(previous_year(&window));

    let (current, previous) =
        futures::try_join!(store.aggregate(&current), store.aggregate(&previous))?;

    let year1 = snapshot(current.first());
    let year2 = snapshot(previous.first());

    Ok(KpiComparison {
        year1,
        year2,
        variation: year1.compare(&year2),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, call};
    use port_ops_database::memory::MemoryVesselStore;

    #[test]
    fn shifts_window_back_one_year() {
        let w = previous_year(&DateWindow::new(at(2024, 2, 29, 0), at(2025, 4, 30, 23)));
        assert_eq!(w.start, at(2023, 2, 28, 0));
        assert_eq!(w.end, at(2024, 4, 30, 23));
    }

    #[test]
    fn empty_window_snapshot_is_zero() {
        assert_eq!(snapshot(None), KpiSnapshot::default());
    }

    #[tokio::test]
    async fn compares_with_prior_year() {
        let mut liquid = call("L", CargoType::LiquidBulk, at(2025, 4, 2, 0), 6, 24);
        liquid.cargo_tonnage = 2_000_000.0;
        liquid.durations.pbd_total = Some(7_200);
        liquid.durations.idling_port = Some(3_600 * 6);

        let mut boxes = call("C", CargoType::Containerised, at(2025, 4, 10, 0), 2, 24);
        boxes.cargo_tonnage = 1_000_000.0;
        boxes.container_count = 500;

        let mut last_year = call("P", CargoType::LiquidBulk, at(2024, 4, 5, 0), 6, 24);
        last_year.cargo_tonnage = 1_500_000.0;

        let store = MemoryVesselStore::new(vec![liquid, boxes, last_year]);
        let window = DateWindow::new(at(2025, 4, 1, 0), at(2025, 4, 30, 23));

        let kpi = kpi_comparison(&store, window).await.unwrap();

        assert!((kpi.year1.total_throughput_mmt - 3.0).abs() < 1e-9);
        assert!((kpi.year1.liquid_cargo_mmt - 2.0).abs() < 1e-9);
        assert!(kpi.year1.dry_cargo_mmt.abs() < 1e-9);
        assert!((kpi.year1.container_teus - 500.0).abs() < 1e-9);
        // Turnarounds of 36h and 32h.
        assert!((kpi.year1.mean_trt - 34.0).abs() < 1e-9);
        assert!((kpi.year1.median_trt - 34.0).abs() < 1e-9);
        assert!((kpi.year1.avg_container_trt - 32.0).abs() < 1e-9);
        // 3,000,000 t over 48 berth hours.
        assert!((kpi.year1.output_per_berth_day - 1_500_000.0).abs() < 1e-6);
        assert!((kpi.year1.avg_pbd - 2.0).abs() < 1e-9);
        assert!((kpi.year1.idle_percent - 12.5).abs() < 1e-9);

        assert!((kpi.year2.total_throughput_mmt - 1.5).abs() < 1e-9);
        assert!((kpi.variation.total_throughput_mmt.unwrap() - 100.0).abs() < 1e-9);
        assert_eq!(kpi.variation.container_teus, None);
        assert_eq!(kpi.variation.dry_cargo_mmt, None);
    }
}
