#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for port operations year-over-year analytics.
//!
//! Serves the dashboard's REST API under `/api`. Every endpoint is a
//! read-only aggregation over the vessel call store; requests share no
//! mutable state.

pub mod config;
mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use port_ops_analytics_models::SeriesPolicy;
use port_ops_database::{VesselStore, db};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    /// Vessel call store.
    pub store: Arc<dyn VesselStore>,
    /// Shape of the generated series.
    pub policy: SeriesPolicy,
}

/// Registers every `/api` route.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/y-o-y")
                    .route("/kpi", web::get().to(handlers::kpi))
                    .route(
                        "/throughput-variance",
                        web::get().to(handlers::throughput_variance),
                    )
                    .route(
                        "/turnaround-trend-yoy",
                        web::get().to(handlers::turnaround_trend),
                    )
                    .route("/idle-time-yoy", web::get().to(handlers::idle_time))
                    .route("/avg-output-yoy", web::get().to(handlers::avg_output))
                    .route("/pbd-data-yoy", web::get().to(handlers::pbd_data))
                    .route(
                        "/berth-occupancy-yoy",
                        web::get().to(handlers::berth_occupancy_trend),
                    )
                    .route("/commodity-codes", web::get().to(handlers::commodity_codes)),
            )
            .service(
                web::scope("/berth-data")
                    .route("/berth-occupancy", web::get().to(handlers::berth_occupancy))
                    .route("/berths", web::get().to(handlers::berths)),
            )
            .service(
                web::scope("/cargo")
                    .route("/cargo-mix", web::get().to(handlers::cargo_mix))
                    .route(
                        "/commodity-volumes",
                        web::get().to(handlers::commodity_volumes),
                    )
                    .route(
                        "/throughput-trend-cargo",
                        web::get().to(handlers::throughput_trend_by_cargo),
                    )
                    .route("/cargo-trend", web::get().to(handlers::cargo_trend))
                    .route(
                        "/get-top-commodities",
                        web::get().to(handlers::top_commodities),
                    )
                    .route(
                        "/container-traffic-trend",
                        web::get().to(handlers::container_traffic_trend),
                    )
                    .route("/cargo-share", web::get().to(handlers::cargo_share)),
            )
            .route("/statistics/kpis", web::get().to(handlers::kpi_cards))
            .service(
                web::scope("/vessel")
                    .route(
                        "/vessel-turnaround-time",
                        web::get().to(handlers::vessel_turnaround),
                    )
                    .route("/idle-vs-trt", web::get().to(handlers::idle_vs_trt))
                    .route(
                        "/nationality-stats",
                        web::get().to(handlers::nationality_stats),
                    ),
            )
            .service(
                web::scope("/vessels/time-utilization")
                    .route("/breakdown", web::get().to(handlers::time_utilization))
                    .route("/waiting-trend", web::get().to(handlers::waiting_trend)),
            ),
    );
}

/// Starts the port operations API server.
///
/// Loads the series policy, opens the vessel store configured by the
/// environment and starts the Actix-Web HTTP server. The caller provides
/// the async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
///
/// # Panics
///
/// Panics if the series policy is invalid or the store cannot be opened.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let policy = config::policy_from_env().expect("Failed to load series policy");
    log::info!(
        "Series policy: {} years anchored to {}, {} berths",
        policy.year_series_width,
        policy.year_anchor,
        policy.total_berths
    );

    log::info!("Opening vessel store...");
    let store = db::open_store_from_env()
        .await
        .expect("Failed to open vessel store");

    let state = web::Data::new(AppState { store, policy });

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
