#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Year-over-year and time-utilization analytics over vessel calls.
//!
//! Each dashboard endpoint is one public async function. They all follow
//! the same pipeline:
//!
//! 1. [`buckets`] plans a contiguous bucket range for the request.
//! 2. The store executes an aggregation grouped by bucket.
//! 3. [`derive`] converts raw sums and averages into hours and percents.
//! 4. [`fill`] merges the sparse result into the full range with zeros.
//! 5. [`variance`] attaches the change from the previous bucket.
//! 6. [`shape`] produces the wire rows.
//!
//! The cargo, card and vessel breakdowns in [`cargo`], [`cards`] and
//! [`vessels`] group by labels instead of buckets and skip the variance
//! step.

pub mod berths;
pub mod buckets;
pub mod cards;
pub mod cargo;
pub mod derive;
pub mod fill;
pub mod kpi;
pub mod params;
pub mod shape;
pub mod throughput;
pub mod trends;
pub mod utilization;
pub mod variance;
pub mod vessels;

use port_ops_database::DbError;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The store failed to answer an aggregation.
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    /// A request parameter could not be interpreted.
    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name as sent by the caller.
        name: &'static str,
        /// What was wrong with it.
        message: String,
    },

    /// A required request parameter was absent.
    #[error("{0} is required")]
    MissingParameter(&'static str),
}

impl AnalyticsError {
    /// Returns `true` for errors caused by the request rather than the
    /// backend.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. } | Self::MissingParameter(_)
        )
    }
}
