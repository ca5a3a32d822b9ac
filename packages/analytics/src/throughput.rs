//! Cargo throughput series by berthing bucket.

use std::collections::BTreeMap;

use port_ops_analytics_models::{BucketKey, ThroughputMetrics, ThroughputRow};
use port_ops_database::VesselStore;
use port_ops_database_models::{AggregationQuery, CallFilter, Measure, NumericField, RawGroup};
use port_ops_vessel_models::{CargoType, TimeField};

use crate::buckets::{SeriesPlan, bucket_of};
use crate::derive::million_tons;
use crate::fill::gap_fill;
use crate::shape::throughput_rows;
use crate::variance::with_variance;
use crate::AnalyticsError;

fn sum_query(plan: &SeriesPlan, field: NumericField, cargo: Option<CargoType>) -> AggregationQuery {
    let mut filter = CallFilter::within(TimeField::BerthingTime, plan.window);
    if let Some(cargo) = cargo {
        filter = filter.cargo(cargo);
    }
    AggregationQuery::new(filter, plan.group_key(TimeField::BerthingTime))
        .sum("total", Measure::Field(field))
}

fn by_bucket(groups: &[RawGroup]) -> BTreeMap<BucketKey, f64> {
    groups
        .iter()
        .filter_map(|g| bucket_of(&g.key).map(|key| (key, g.number_or_zero("total"))))
        .collect()
}

/// Total, dry bulk and liquid bulk tonnage plus container TEUs per bucket.
///
/// The four sums are independent queries run concurrently; if any fails
/// the whole series fails.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if any aggregation fails.
pub async fn throughput_variance(
    store: &dyn VesselStore,
    plan: &SeriesPlan,
) -> Result<Vec<ThroughputRow>, AnalyticsError> {
    let total = sum_query(plan, NumericField::CargoTonnage, None);
    let dry = sum_query(
        plan,
        NumericField::CargoTonnage,
        Some(CargoType::DryBulkMechanical),
    );
    let liquid = sum_query(plan, NumericField::CargoTonnage, Some(CargoType::LiquidBulk));
    let containers = sum_query(
        plan,
        NumericField::ContainerCount,
        Some(CargoType::Containerised),
    );

    let (total, dry, liquid, containers) = futures::try_join!(
        store.aggregate(&total),
        store.aggregate(&dry),
        store.aggregate(&liquid),
        store.aggregate(&containers),
    )?;

    let total = by_bucket(&total);
    let dry = by_bucket(&dry);
    let liquid = by_bucket(&liquid);
    let containers = by_bucket(&containers);

    let value = |map: &BTreeMap<BucketKey, f64>, key: &BucketKey| map.get(key).copied();

    let raw = plan.buckets.iter().filter_map(|key| {
        let sums = [
            value(&total, key),
            value(&dry, key),
            value(&liquid, key),
            value(&containers, key),
        ];
        if sums.iter().all(Option::is_none) {
            return None;
        }
        Some((
            *key,
            ThroughputMetrics {
                total_throughput: million_tons(sums[0].unwrap_or(0.0)),
                dry_cargo: million_tons(sums[1].unwrap_or(0.0)),
                liquid_cargo: million_tons(sums[2].unwrap_or(0.0)),
                container_teus: sums[3].unwrap_or(0.0),
            },
        ))
    });

    let filled = gap_fill(&plan.buckets, raw);
    Ok(throughput_rows(plan.granularity, with_variance(filled)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{at, call, date};
    use port_ops_analytics_models::{Granularity, SeriesPolicy};
    use port_ops_database::memory::MemoryVesselStore;
    use port_ops_database_models::DateWindow;

    fn store() -> MemoryVesselStore {
        let mut dry = call("D", CargoType::DryBulkMechanical, at(2024, 1, 3, 0), 0, 10);
        dry.cargo_tonnage = 500_000.0;
        let mut liquid = call("L", CargoType::LiquidBulk, at(2024, 1, 9, 0), 0, 10);
        liquid.cargo_tonnage = 1_500_000.0;
        let mut boxes = call("C", CargoType::Containerised, at(2024, 3, 9, 0), 0, 10);
        boxes.cargo_tonnage = 250_000.0;
        boxes.container_count = 1_200;
        MemoryVesselStore::new(vec![dry, liquid, boxes])
    }

    #[tokio::test]
    async fn monthly_throughput_is_nested_and_gap_filled() {
        let plan = SeriesPlan::new(
            Granularity::Month,
            DateWindow::new(at(2024, 1, 1, 0), at(2024, 3, 31, 23)),
            &SeriesPolicy::default(),
            date(2025, 1, 1),
        );

        let rows = throughput_variance(&store(), &plan).await.unwrap();
        let json = serde_json::to_value(&rows).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["month"], "Jan-2024");
        assert_eq!(json[0]["current"]["totalThroughput"], 2.0);
        assert_eq!(json[0]["current"]["dryCargo"], 0.5);
        assert_eq!(json[0]["current"]["liquidCargo"], 1.5);
        assert!(json[0]["variance"]["totalThroughput"].is_null());

        assert_eq!(json[1]["current"]["totalThroughput"], 0.0);
        assert_eq!(json[1]["variance"]["totalThroughput"], -100.0);

        assert_eq!(json[2]["current"]["containerTEUs"], 1200.0);
        assert!(json[2]["variance"]["containerTEUs"].is_null());
    }

    #[tokio::test]
    async fn yearly_throughput_is_flat_over_five_years() {
        let plan = SeriesPlan::new(
            Granularity::Year,
            DateWindow::new(at(2024, 1, 1, 0), at(2024, 12, 31, 23)),
            &SeriesPolicy::default(),
            date(2024, 6, 1),
        );

        let rows = throughput_variance(&store(), &plan).await.unwrap();
        let json = serde_json::to_value(&rows).unwrap();

        let years: Vec<i64> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["year"].as_i64().unwrap())
            .collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
        assert_eq!(json[4]["totalThroughput"], 2.25);
        assert_eq!(json[3]["totalThroughput"], 0.0);
        assert!(json[4]["variance"]["totalThroughput"].is_null());
    }
}
