#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Vessel call store backends.
//!
//! The analytics layer talks to the store through [`VesselStore`], handing
//! it an [`AggregationQuery`] and getting back one [`RawGroup`] per bucket.
//! Per-call listings go through [`VesselStore::calls`].
//! Two backends are provided:
//!
//! - [`memory::MemoryVesselStore`] evaluates queries over an in-memory
//!   `Vec` of calls (development and tests).
//! - [`sqlite::SqliteVesselStore`] translates queries into `SQLite`
//!   `GROUP BY` statements run through `switchy_database`.

pub mod db;
pub mod fixtures;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use port_ops_database_models::{AggregationQuery, CallFilter, RawGroup};
use port_ops_vessel_models::VesselCall;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// The database could not be opened.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read access to vessel calls, expressed as aggregation requests.
#[async_trait]
pub trait VesselStore: Send + Sync {
    /// Executes an aggregation and returns its groups ordered by key.
    ///
    /// Groups with no matching calls are not returned.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails to run the query.
    async fn aggregate(&self, query: &AggregationQuery) -> Result<Vec<RawGroup>, DbError>;

    /// Returns the calls matching `filter` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails to run the query or a row
    /// cannot be decoded.
    async fn calls(&self, filter: &CallFilter) -> Result<Vec<VesselCall>, DbError>;

    /// Lists the distinct berth names, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the backend fails to run the query.
    async fn distinct_berths(&self) -> Result<Vec<String>, DbError>;
}
