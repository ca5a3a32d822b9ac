//! HTTP handler functions for the port operations API.
//!
//! Request errors (missing or unparsable parameters) answer 400 with the
//! reason. Store failures are logged and answer 500.

use actix_web::{HttpResponse, web};
use chrono::{NaiveDate, Utc};
use port_ops_analytics::buckets::SeriesPlan;
use port_ops_analytics::params::{self, berth_selector, vessel_selector};
use port_ops_analytics::{
    AnalyticsError, berths, cards, cargo, kpi, throughput, trends, utilization, vessels,
};
use port_ops_analytics_models::SeriesPolicy;
use port_ops_database_models::DateWindow;
use port_ops_server_models::{
    ApiError, ApiHealth, BerthOccupancyParams, CargoParams, CommodityParams, DateRangeParams,
    TrendParams, VesselParams,
};
use serde::Serialize;

use crate::AppState;

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Whether an endpoint insists on both dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dates {
    Required,
    Defaulted,
}

fn window(
    policy: &SeriesPolicy,
    start: Option<&str>,
    end: Option<&str>,
    dates: Dates,
) -> Result<DateWindow, AnalyticsError> {
    match dates {
        Dates::Required => params::required_window(start, end),
        Dates::Defaulted => params::window_or_default(start, end, policy, today()),
    }
}

fn optional_window(
    policy: &SeriesPolicy,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<Option<DateWindow>, AnalyticsError> {
    params::optional_window(start, end, policy, today())
}

fn series_plan(
    policy: &SeriesPolicy,
    query: &TrendParams,
    dates: Dates,
) -> Result<SeriesPlan, AnalyticsError> {
    let granularity = params::parse_granularity(query.mode.as_deref())?;
    let window = window(
        policy,
        query.start_date.as_deref(),
        query.end_date.as_deref(),
        dates,
    )?;
    Ok(SeriesPlan::new(granularity, window, policy, today()))
}

fn respond<T: Serialize>(action: &str, result: Result<T, AnalyticsError>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) if e.is_client_error() => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
        Err(e) => {
            log::error!("Failed to {action}: {e}");
            HttpResponse::InternalServerError()
                .json(ApiError::new(format!("Failed to {action}")))
        }
    }
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/y-o-y/kpi`
///
/// Compares the requested window with the same window a year earlier.
pub async fn kpi(state: web::Data<AppState>, query: web::Query<DateRangeParams>) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window =
            params::required_window(query.start_date.as_deref(), query.end_date.as_deref())?;
        kpi::kpi_comparison(state.store.as_ref(), window).await
    }
    .await;
    respond("compute KPI comparison", result)
}

/// `GET /api/y-o-y/throughput-variance`
pub async fn throughput_variance(
    state: web::Data<AppState>,
    query: web::Query<TrendParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Defaulted)?;
        throughput::throughput_variance(state.store.as_ref(), &plan).await
    }
    .await;
    respond("compute throughput variance", result)
}

/// `GET /api/y-o-y/turnaround-trend-yoy`
pub async fn turnaround_trend(
    state: web::Data<AppState>,
    query: web::Query<TrendParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Defaulted)?;
        trends::turnaround_trend(state.store.as_ref(), &plan).await
    }
    .await;
    respond("compute turnaround trend", result)
}

/// `GET /api/y-o-y/idle-time-yoy`
pub async fn idle_time(
    state: web::Data<AppState>,
    query: web::Query<TrendParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Defaulted)?;
        trends::idle_trend(state.store.as_ref(), &plan).await
    }
    .await;
    respond("compute idle time trend", result)
}

/// `GET /api/y-o-y/avg-output-yoy`
pub async fn avg_output(
    state: web::Data<AppState>,
    query: web::Query<TrendParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Defaulted)?;
        trends::avg_output_trend(state.store.as_ref(), &plan).await
    }
    .await;
    respond("compute output trend", result)
}

/// `GET /api/y-o-y/pbd-data-yoy`
pub async fn pbd_data(state: web::Data<AppState>, query: web::Query<TrendParams>) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Required)?;
        trends::pbd_trend(state.store.as_ref(), &plan).await
    }
    .await;
    respond("compute PBD trend", result)
}

/// `GET /api/y-o-y/berth-occupancy-yoy`
///
/// `totalBerths` is optional here and falls back to the policy.
pub async fn berth_occupancy_trend(
    state: web::Data<AppState>,
    query: web::Query<TrendParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let plan = series_plan(&state.policy, &query, Dates::Required)?;
        let total_berths = match query.total_berths.as_deref() {
            Some(value) => params::parse_total_berths(Some(value))?,
            None => state.policy.total_berths,
        };
        trends::berth_occupancy_trend(state.store.as_ref(), &plan, total_berths).await
    }
    .await;
    respond("compute berth occupancy trend", result)
}

/// `GET /api/y-o-y/commodity-codes`
pub async fn commodity_codes(
    state: web::Data<AppState>,
    query: web::Query<CommodityParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let kpi = params::parse_commodity_kpi(query.kpi.as_deref())?;
        let window =
            params::required_window(query.start_date.as_deref(), query.end_date.as_deref())?;
        berths::commodity_codes(state.store.as_ref(), kpi, window).await
    }
    .await;
    respond("query commodity totals", result)
}

/// `GET /api/berth-data/berth-occupancy`
pub async fn berth_occupancy(
    state: web::Data<AppState>,
    query: web::Query<BerthOccupancyParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window =
            params::required_window(query.start_date.as_deref(), query.end_date.as_deref())?;
        let total_berths = params::parse_total_berths(query.total_berths.as_deref())?;
        let berth = berth_selector(query.berth.as_deref());
        berths::berth_occupancy(state.store.as_ref(), window, total_berths, berth).await
    }
    .await;
    respond("compute berth occupancy", result)
}

/// `GET /api/berth-data/berths`
pub async fn berths(state: web::Data<AppState>) -> HttpResponse {
    respond("list berths", berths::berths(state.store.as_ref()).await)
}

/// `GET /api/vessels/time-utilization/breakdown`
pub async fn time_utilization(
    state: web::Data<AppState>,
    query: web::Query<DateRangeParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        utilization::time_utilization_breakdown(state.store.as_ref(), window).await
    }
    .await;
    respond("compute time utilization", result)
}

/// `GET /api/vessels/time-utilization/waiting-trend`
pub async fn waiting_trend(
    state: web::Data<AppState>,
    query: web::Query<DateRangeParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        utilization::waiting_trend(state.store.as_ref(), window).await
    }
    .await;
    respond("compute waiting trend", result)
}

/// `GET /api/cargo/cargo-mix`
pub async fn cargo_mix(state: web::Data<AppState>, query: web::Query<CargoParams>) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = optional_window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;
        cargo::cargo_mix(state.store.as_ref(), window).await
    }
    .await;
    respond("compute cargo mix", result)
}

/// `GET /api/cargo/commodity-volumes`
pub async fn commodity_volumes(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = optional_window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;
        cargo::commodity_volumes(state.store.as_ref(), window).await
    }
    .await;
    respond("compute commodity volumes", result)
}

/// `GET /api/cargo/throughput-trend-cargo`
pub async fn throughput_trend_by_cargo(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window =
            params::required_window(query.start_date.as_deref(), query.end_date.as_deref())?;
        cargo::throughput_trend_by_cargo(state.store.as_ref(), window).await
    }
    .await;
    respond("compute throughput trend by cargo", result)
}

/// `GET /api/cargo/cargo-trend`
pub async fn cargo_trend(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window =
            params::required_window(query.start_date.as_deref(), query.end_date.as_deref())?;
        cargo::cargo_trend(state.store.as_ref(), window).await
    }
    .await;
    respond("compute cargo trend", result)
}

/// `GET /api/cargo/get-top-commodities`
pub async fn top_commodities(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = optional_window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;
        let limit = params::parse_limit(query.limit.as_deref())?;
        cargo::top_commodities(state.store.as_ref(), window, limit).await
    }
    .await;
    respond("rank commodities", result)
}

/// `GET /api/cargo/container-traffic-trend`
pub async fn container_traffic_trend(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        cargo::container_traffic_trend(state.store.as_ref(), window).await
    }
    .await;
    respond("compute container traffic trend", result)
}

/// `GET /api/cargo/cargo-share`
pub async fn cargo_share(
    state: web::Data<AppState>,
    query: web::Query<CargoParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = optional_window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;
        cargo::cargo_share(state.store.as_ref(), window).await
    }
    .await;
    respond("compute cargo share", result)
}

/// `GET /api/statistics/kpis`
pub async fn kpi_cards(
    state: web::Data<AppState>,
    query: web::Query<DateRangeParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = optional_window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
        )?;
        cards::kpi_cards(state.store.as_ref(), window).await
    }
    .await;
    respond("compute KPI cards", result)
}

/// `GET /api/vessel/vessel-turnaround-time`
pub async fn vessel_turnaround(
    state: web::Data<AppState>,
    query: web::Query<VesselParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        let vessel = vessel_selector(query.vessel_id.as_deref());
        vessels::vessel_turnaround_trend(state.store.as_ref(), window, vessel).await
    }
    .await;
    respond("compute vessel turnaround trend", result)
}

/// `GET /api/vessel/idle-vs-trt`
pub async fn idle_vs_trt(
    state: web::Data<AppState>,
    query: web::Query<VesselParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        let vessel = vessel_selector(query.vessel_id.as_deref());
        vessels::idle_vs_trt(state.store.as_ref(), window, vessel).await
    }
    .await;
    respond("list idle against turnaround", result)
}

/// `GET /api/vessel/nationality-stats`
pub async fn nationality_stats(
    state: web::Data<AppState>,
    query: web::Query<VesselParams>,
) -> HttpResponse {
    let result: Result<_, AnalyticsError> = async {
        let window = window(
            &state.policy,
            query.start_date.as_deref(),
            query.end_date.as_deref(),
            Dates::Defaulted,
        )?;
        let limit = params::parse_limit(query.limit.as_deref())?;
        vessels::nationality_stats(state.store.as_ref(), window, limit).await
    }
    .await;
    respond("compute nationality stats", result)
}
