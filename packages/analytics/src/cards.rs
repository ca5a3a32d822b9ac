//! Summary KPI cards over an arrival window.

use port_ops_analytics_models::KpiCards;
use port_ops_database::VesselStore;
use port_ops_database_models::{
    AggregationQuery, CallFilter, DateWindow, GroupKey, Measure, NumericField, Reducer,
};
use port_ops_vessel_models::{CargoType, TimeField};

use crate::derive::{self, hours};
use crate::AnalyticsError;

const TONS: Measure = Measure::Field(NumericField::CargoTonnage);
const IDLE: Measure = Measure::Field(NumericField::IdlingTotal);

fn cards_query(window: Option<DateWindow>) -> AggregationQuery {
    let filter = window.map_or_else(CallFilter::default, |w| {
        CallFilter::within(TimeField::ArrivalOuterRoads, w)
    });

    AggregationQuery::new(filter, GroupKey::All)
        .sum("tons", TONS)
        .reduce("dry", Reducer::Sum(TONS), Some(CargoType::DryBulkMechanical))
        .reduce("liquid", Reducer::Sum(TONS), Some(CargoType::LiquidBulk))
        .reduce(
            "teus",
            Reducer::Sum(Measure::Field(NumericField::ContainerCount)),
            Some(CargoType::Containerised),
        )
        .avg(
            "turnaround",
            Measure::Elapsed {
                from: TimeField::ArrivalOuterRoads,
                to: TimeField::DepartureOuterRoads,
            },
        )
        .avg("avg_idle", IDLE)
        .sum(
            "at_berth",
            Measure::Elapsed {
                from: TimeField::BerthingTime,
                to: TimeField::UnberthingTime,
            },
        )
        .sum("idle", IDLE)
}

/// Totals and averages behind the dashboard cards.
///
/// Calls are selected by arrival; `None` takes every call. Tonnage is in
/// metric tons and containers in TEUs. Averages skip calls missing the
/// value: turnaround needs a departure, idle time needs logged idling.
/// The occupancy rate is berth hours over berth plus idle hours.
///
/// # Errors
///
/// Returns [`AnalyticsError::Store`] if the aggregation fails.
pub async fn kpi_cards(
    store: &dyn VesselStore,
    window: Option<DateWindow>,
) -> Result<KpiCards, AnalyticsError> {
    let groups = store.aggregate(&cards_query(window)).await?;
    let Some(g) = groups.first() else {
        return Ok(KpiCards::default());
    };

    let at_berth = hours(g.number_or_zero("at_berth"));
    let idle = hours(g.number_or_zero("idle"));

    Ok(KpiCards {
        total_throughput: g.number_or_zero("tons"),
        dry_cargo: g.number_or_zero("dry"),
        liquid_cargo: g.number_or_zero("liquid"),
        containers: g.number_or_zero("teus"),
        avg_turnaround: hours(g.number_or_zero("turnaround")),
        idle_time: hours(g.number_or_zero("avg_idle")),
        berth_occupancy_rate: derive::percent(at_berth, at_berth + idle),
    })
}
