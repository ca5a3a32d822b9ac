//! Berth-level figures: commodity drill-down, point occupancy and the
//! berth list.

use port_ops_analytics_models::{BerthOccupancy, CommodityTotal};
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, GroupValue, LabelField, Measure,
    NumericField,
};
use port_ops_vessel_models::{CargoType, TimeField};

use crate::derive::{self, hours, round_to};
use crate::params::CommodityKpi;
use crate::AnalyticsError;

/// Label reported when no single berth is selected.
pub const ALL_BERTHS: &str = "All Berths";

impl CommodityKpi {
    const fn cargo_type(self) -> CargoType {
        match self {
            Self::LiquidCargo => CargoType::LiquidBulk,
            Self::Containers => CargoType::Containerised,
        }
    }

    const fn field(self) -> NumericField {
        match self {
            Self::LiquidCargo => NumericField::CargoTonnage,
            Self::Containers => NumericField::ContainerCount,
        }
    }
}

/// Per-commodity totals behind a KPI card, largest first.
///
/// Liquid cargo reports tonnage of liquid bulk calls; containers report
/// TEUs of containerised calls. Calls are selected by berthing time and
/// calls without a commodity are left out.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn commodity_codes(
    store: &dyn VesselStore,
    kpi: CommodityKpi,
    window: DateWindow,
) -> Result<Vec<CommodityTotal>, AnalyticsError> {
    let query = AggregationQuery::new(
        CallFilter::within(TimeField::BerthingTime, window).cargo(kpi.cargo_type()),
        GroupKey::Label(LabelField::Commodity),
    )
    .sum("total", Measure::Field(kpi.field()));

    let mut totals: Vec<CommodityTotal> = store
        .aggregate(&query)
        .await?
        .into_iter()
        .filter_map(|g| {
            let value = g.number_or_zero("total");
            match g.key {
                GroupValue::Label(code) => Some(CommodityTotal { code, value }),
                _ => None,
            }
        })
        .collect();

    totals.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.code.cmp(&b.code)));

    log::debug!("{} commodities for {kpi}", totals.len());

    Ok(totals)
}

/// Berth occupancy over a window.
///
/// Each berthed call contributes the part of its berth stay that falls
/// inside the window; a call still at berth counts up to the window end.
/// Available time is the window length times the berths considered: one
/// when `berth` is selected, `total_berths` otherwise. Occupied hours
/// are capped at the available hours. Figures are rounded to two
/// decimals.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn berth_occupancy(
    store: &dyn VesselStore,
    window: DateWindow,
    total_berths: u32,
    berth: Option<&str>,
) -> Result<BerthOccupancy, AnalyticsError> {
    let mut filter = CallFilter::default().require(TimeField::BerthingTime);
    if let Some(berth) = berth {
        filter = filter.berth(berth);
    }

    let query = AggregationQuery::new(filter, GroupKey::All).sum(
        "occupied",
        Measure::Clipped {
            from: TimeField::BerthingTime,
            to: TimeField::UnberthingTime,
            window,
        },
    );

    let occupied = store
        .aggregate(&query)
        .await?
        .first()
        .map_or(0.0, |g| hours(g.number_or_zero("occupied")));

    let berths = if berth.is_some() { 1 } else { total_berths };
    let available = window.hours() * f64::from(berths);
    let occupied = derive::cap_occupied(occupied, available);

    Ok(BerthOccupancy {
        berth: berth.unwrap_or(ALL_BERTHS).to_string(),
        total_occupied_hours: round_to(occupied, 2),
        total_available_hours: round_to(available, 2),
        occupancy: round_to(derive::percent(occupied, available), 2),
    })
}

/// Distinct berth names, sorted.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the store cannot be read.
pub async fn berths(store: &dyn VesselStore) -> Result<Vec<String>, AnalyticsError> {
    Ok(store.distinct_berths().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, call};
    use port_ops_database::memory::MemoryVesselStore;

    fn window() -> DateWindow {
        DateWindow::new(at(2024, 3, 1, 0), at(2024, 3, 11, 0))
    }

    #[tokio::test]
    async fn commodity_totals_are_sorted_descending() {
        let mut crude = call("A", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 10);
        crude.commodity = Some("CRUDE".to_string());
        crude.cargo_tonnage = 1_000.0;
        let mut lpg = call("B", CargoType::LiquidBulk, at(2024, 3, 3, 0), 0, 10);
        lpg.commodity = Some("LPG".to_string());
        lpg.cargo_tonnage = 4_000.0;
        let mut crude_again = call("C", CargoType::LiquidBulk, at(2024, 3, 4, 0), 0, 10);
        crude_again.commodity = Some("CRUDE".to_string());
        crude_again.cargo_tonnage = 2_000.0;
        let mut coal = call("D", CargoType::DryBulkMechanical, at(2024, 3, 4, 0), 0, 10);
        coal.commodity = Some("COAL".to_string());
        coal.cargo_tonnage = 9_000.0;
        let mut late = call("E", CargoType::LiquidBulk, at(2024, 4, 4, 0), 0, 10);
        late.commodity = Some("NAPHTHA".to_string());
        late.cargo_tonnage = 9_000.0;

        let store = MemoryVesselStore::new(vec![crude, lpg, crude_again, coal, late]);
        let totals = commodity_codes(&store, CommodityKpi::LiquidCargo, window())
            .await
            .unwrap();

        assert_eq!(
            totals,
            vec![
                CommodityTotal {
                    code: "LPG".to_string(),
                    value: 4_000.0,
                },
                CommodityTotal {
                    code: "CRUDE".to_string(),
                    value: 3_000.0,
                },
            ]
        );
    }

    #[tokio::test]
    async fn container_commodities_sum_teus() {
        let mut boxes = call("A", CargoType::Containerised, at(2024, 3, 2, 0), 0, 10);
        boxes.container_count = 750;
        let store = MemoryVesselStore::new(vec![boxes]);

        let totals = commodity_codes(&store, CommodityKpi::Containers, window())
            .await
            .unwrap();

        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].code, "GENERAL");
        assert!((totals[0].value - 750.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn occupancy_clips_stays_to_the_window() {
        // 24h before the window, 24h inside it.
        let straddling = call("A", CargoType::LiquidBulk, at(2024, 2, 29, 0), 0, 48);
        // Entirely inside: 12h.
        let inside = call("B", CargoType::LiquidBulk, at(2024, 3, 5, 0), 0, 12);
        // Still at berth: counts from the 10th to the window end, 24h.
        let mut open = call("C", CargoType::LiquidBulk, at(2024, 3, 10, 0), 0, 1);
        open.unberthing_time = None;
        open.departure_outer_roads = None;
        // After the window.
        let after = call("D", CargoType::LiquidBulk, at(2024, 3, 20, 0), 0, 12);

        let store = MemoryVesselStore::new(vec![straddling, inside, open, after]);
        let occupancy = berth_occupancy(&store, window(), 2, None).await.unwrap();

        assert_eq!(occupancy.berth, ALL_BERTHS);
        assert!((occupancy.total_occupied_hours - 60.0).abs() < 1e-9);
        assert!((occupancy.total_available_hours - 480.0).abs() < 1e-9);
        assert!((occupancy.occupancy - 12.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn single_berth_counts_as_one_berth_and_caps() {
        let mut long = call("A", CargoType::LiquidBulk, at(2024, 2, 1, 0), 0, 24 * 60);
        long.berth = Some("Q7".to_string());
        let mut overlap = call("B", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 24);
        overlap.berth = Some("Q7".to_string());
        let elsewhere = call("C", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 24);

        let store = MemoryVesselStore::new(vec![long, overlap, elsewhere]);
        let occupancy = berth_occupancy(&store, window(), 21, Some("Q7"))
            .await
            .unwrap();

        assert_eq!(occupancy.berth, "Q7");
        assert!((occupancy.total_available_hours - 240.0).abs() < 1e-9);
        assert!((occupancy.total_occupied_hours - 240.0).abs() < 1e-9);
        assert!((occupancy.occupancy - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_store_has_zero_occupancy() {
        let store = MemoryVesselStore::new(Vec::new());
        let occupancy = berth_occupancy(&store, window(), 21, None).await.unwrap();

        assert!(occupancy.total_occupied_hours.abs() < f64::EPSILON);
        assert!((occupancy.total_available_hours - 5_040.0).abs() < 1e-9);
        assert!(occupancy.occupancy.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn whole_month_uses_every_hour_of_the_last_day() {
        let march = DateWindow::whole_days(
            crate::test_support::date(2024, 3, 1),
            crate::test_support::date(2024, 3, 31),
        )
        .unwrap();
        // Berthed on the last evening, still at berth: 4h up to midnight.
        let mut open = call("A", CargoType::LiquidBulk, at(2024, 3, 31, 20), 0, 1);
        open.unberthing_time = None;
        open.departure_outer_roads = None;

        let store = MemoryVesselStore::new(vec![open]);
        let occupancy = berth_occupancy(&store, march, 21, None).await.unwrap();

        assert!((occupancy.total_available_hours - 15_624.0).abs() < 1e-9);
        assert!((occupancy.total_occupied_hours - 4.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn lists_distinct_berths() {
        let mut a = call("A", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 1);
        a.berth = Some("Q2".to_string());
        let b = call("B", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 1);
        let c = call("C", CargoType::LiquidBulk, at(2024, 3, 2, 0), 0, 1);

        let store = MemoryVesselStore::new(vec![a, b, c]);
        assert_eq!(berths(&store).await.unwrap(), vec!["Q1", "Q2"]);
    }
}
