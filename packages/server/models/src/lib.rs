#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! HTTP query parameter and response types for the port operations
//! server.
//!
//! Query parameters are kept as raw strings so that interpretation
//! (defaults, date formats, validation messages) happens in one place in
//! the analytics layer.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Always `true` while the server is answering.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// Error body of every non-200 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Human-readable message.
    pub error: String,
}

impl ApiError {
    /// Creates an error body.
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// `startDate` / `endDate` pair.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeParams {
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
}

/// Parameters of the year-over-year trend endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendParams {
    /// `month` (default) or `year`.
    pub mode: Option<String>,
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
    /// Berths available to the port; occupancy trend only.
    pub total_berths: Option<String>,
}

/// Parameters of the commodity drill-down.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommodityParams {
    /// KPI card name, e.g. `Liquid Cargo (MMT)`.
    pub kpi: Option<String>,
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
}

/// Parameters of the point berth occupancy endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BerthOccupancyParams {
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
    /// Berths available to the port.
    pub total_berths: Option<String>,
    /// A single berth, or `All`.
    pub berth: Option<String>,
}

/// Parameters of the cargo endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CargoParams {
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
    /// Maximum number of rows; top commodities only.
    pub limit: Option<String>,
}

/// Parameters of the per-vessel endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselParams {
    /// Inclusive range start.
    pub start_date: Option<String>,
    /// Inclusive range end.
    pub end_date: Option<String>,
    /// A single vessel.
    pub vessel_id: Option<String>,
    /// Maximum number of rows; nationality stats only.
    pub limit: Option<String>,
}
