#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Vessel call record types, cargo taxonomy and timeline invariants.
//!
//! A [`VesselCall`] is one port call of one vessel: when it reached the
//! outer roads, when it berthed and unberthed, when it left, what it
//! carried, and the duration components the port logs for it. Records are
//! read-only once imported; everything the analytics layer needs from a
//! single record is derived here.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Number of seconds in one hour.
pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Cargo classification of a vessel call.
///
/// The four named variants are the ones the dashboards split on. Any other
/// value found in the source data is kept verbatim in [`CargoType::Other`].
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(from = "String", into = "String")]
pub enum CargoType {
    /// Container traffic, measured in TEUs.
    Containerised,
    /// Liquid bulk (crude, products, chemicals).
    #[strum(serialize = "Liquid Bulk")]
    LiquidBulk,
    /// Dry bulk handled by mechanical equipment.
    #[strum(serialize = "Dry Bulk Mechanical")]
    DryBulkMechanical,
    /// Break bulk / general cargo.
    #[strum(serialize = "Break Bulk")]
    BreakBulk,
    /// Any classification not covered above.
    #[strum(default, transparent)]
    Other(String),
}

impl From<&str> for CargoType {
    fn from(value: &str) -> Self {
        value
            .trim()
            .parse()
            .unwrap_or_else(|_| Self::Other(value.to_string()))
    }
}

impl From<String> for CargoType {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<CargoType> for String {
    fn from(value: CargoType) -> Self {
        match value {
            CargoType::Other(label) => label,
            other => other.to_string(),
        }
    }
}

/// Whether the call was a coastal or a foreign voyage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum CoastalOrForeign {
    /// Domestic coastal voyage.
    Coastal,
    /// International voyage.
    Foreign,
}

/// Named timestamps on a vessel call.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "snake_case")]
pub enum TimeField {
    /// Arrival at the outer roads (ATA).
    ArrivalOuterRoads,
    /// Berthing (ATA berth).
    BerthingTime,
    /// Unberthing (ATD unberth).
    UnberthingTime,
    /// Departure from the outer roads (ATD).
    DepartureOuterRoads,
    /// Notice of readiness.
    NorTime,
    /// Pilot boarding.
    PilotBoarding,
    /// Pilot unboarding.
    PilotUnboarding,
}

/// Logged duration components of a call, in seconds.
///
/// Every component is optional; missing values are absent from the source
/// sheet rather than zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DurationComponents {
    /// Pre-berthing detention attributable to the port.
    pub pbd_port: Option<u64>,
    /// Pre-berthing detention not attributable to the port.
    pub pbd_non_port: Option<u64>,
    /// Total pre-berthing detention.
    pub pbd_total: Option<u64>,
    /// Ship not working before berthing, total.
    pub snwb_total: Option<u64>,
    /// Ship waiting at berth before work, total.
    pub swb_total: Option<u64>,
    /// Time spent shifting between berths.
    pub shifting_total: Option<u64>,
    /// Idling at berth attributable to the port.
    pub idling_port: Option<u64>,
    /// Idling at berth not attributable to the port.
    pub idling_non_port: Option<u64>,
    /// Inter-movement (operational) time.
    pub im_time: Option<u64>,
    /// Other-movement (non-operational) time.
    pub om_time: Option<u64>,
    /// Total turnaround time as logged.
    pub trt_total: Option<u64>,
}

impl DurationComponents {
    /// Total idling (port + non-port), or `None` when neither is logged.
    #[must_use]
    pub fn idling_total(&self) -> Option<u64> {
        match (self.idling_port, self.idling_non_port) {
            (None, None) => None,
            (port, non_port) => Some(port.unwrap_or(0) + non_port.unwrap_or(0)),
        }
    }

    /// Waiting before berth (PBD + SNWB), or `None` when neither is logged.
    #[must_use]
    pub fn waiting_before_berth(&self) -> Option<u64> {
        match (self.pbd_total, self.snwb_total) {
            (None, None) => None,
            (pbd, snwb) => Some(pbd.unwrap_or(0) + snwb.unwrap_or(0)),
        }
    }
}

/// One port call of one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselCall {
    /// Vessel identifier.
    pub vessel_id: String,
    /// Berth the vessel was assigned to.
    #[serde(default)]
    pub berth: Option<String>,
    /// Cargo classification.
    pub cargo_type: CargoType,
    /// Commodity code or name.
    #[serde(default)]
    pub commodity: Option<String>,
    /// Flag state.
    #[serde(default)]
    pub flag_country: Option<String>,
    /// Coastal or foreign voyage.
    #[serde(default)]
    pub coastal_or_foreign: Option<CoastalOrForeign>,
    /// Cargo handled, metric tons.
    #[serde(default)]
    pub cargo_tonnage: f64,
    /// Containers handled, TEUs.
    #[serde(default)]
    pub container_count: u32,
    /// Gross tonnage of the vessel.
    #[serde(default)]
    pub gross_tonnage: Option<f64>,
    /// Arrival at the outer roads.
    #[serde(default)]
    pub arrival_outer_roads: Option<NaiveDateTime>,
    /// Berthing time.
    #[serde(default)]
    pub berthing_time: Option<NaiveDateTime>,
    /// Unberthing time. `None` while the vessel still occupies the berth.
    #[serde(default)]
    pub unberthing_time: Option<NaiveDateTime>,
    /// Departure from the outer roads.
    #[serde(default)]
    pub departure_outer_roads: Option<NaiveDateTime>,
    /// Notice of readiness.
    #[serde(default)]
    pub nor_time: Option<NaiveDateTime>,
    /// Pilot boarding.
    #[serde(default)]
    pub pilot_boarding: Option<NaiveDateTime>,
    /// Pilot unboarding.
    #[serde(default)]
    pub pilot_unboarding: Option<NaiveDateTime>,
    /// Logged duration components.
    #[serde(default)]
    pub durations: DurationComponents,
}

/// Error returned when a call's timestamps are out of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{earlier} is after {later}")]
pub struct TimelineError {
    /// The timestamp that should come first.
    pub earlier: TimeField,
    /// The timestamp found before it.
    pub later: TimeField,
}

impl VesselCall {
    /// Returns the value of the named timestamp.
    #[must_use]
    pub const fn time(&self, field: TimeField) -> Option<NaiveDateTime> {
        match field {
            TimeField::ArrivalOuterRoads => self.arrival_outer_roads,
            TimeField::BerthingTime => self.berthing_time,
            TimeField::UnberthingTime => self.unberthing_time,
            TimeField::DepartureOuterRoads => self.departure_outer_roads,
            TimeField::NorTime => self.nor_time,
            TimeField::PilotBoarding => self.pilot_boarding,
            TimeField::PilotUnboarding => self.pilot_unboarding,
        }
    }

    /// Checks that the present timestamps satisfy
    /// arrival ≤ berthing ≤ unberthing ≤ departure.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-order pair found.
    pub fn validate_timeline(&self) -> Result<(), TimelineError> {
        const ORDER: [TimeField; 4] = [
            TimeField::ArrivalOuterRoads,
            TimeField::BerthingTime,
            TimeField::UnberthingTime,
            TimeField::DepartureOuterRoads,
        ];

        let mut previous: Option<(TimeField, NaiveDateTime)> = None;
        for field in ORDER {
            let Some(at) = self.time(field) else {
                continue;
            };
            if let Some((earlier, earlier_at)) = previous
                && earlier_at > at
            {
                return Err(TimelineError {
                    earlier,
                    later: field,
                });
            }
            previous = Some((field, at));
        }

        Ok(())
    }

    /// Seconds between two timestamps, when both are present.
    #[must_use]
    pub fn elapsed_seconds(&self, from: TimeField, to: TimeField) -> Option<f64> {
        let start = self.time(from)?;
        let end = self.time(to)?;
        Some(seconds(end - start))
    }

    /// Turnaround time in hours (departure − arrival at the outer roads).
    #[must_use]
    pub fn turnaround_hours(&self) -> Option<f64> {
        self.elapsed_seconds(TimeField::ArrivalOuterRoads, TimeField::DepartureOuterRoads)
            .map(|s| s / SECONDS_PER_HOUR)
    }

    /// Logged idling (port + non-port) in hours.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn idle_hours(&self) -> Option<f64> {
        self.durations
            .idling_total()
            .map(|s| s as f64 / SECONDS_PER_HOUR)
    }

    /// Seconds of the `[from, to]` interval that fall inside
    /// `[window_start, window_end]`.
    ///
    /// A missing `to` is treated as still running and is clipped at
    /// `window_end`. Returns `None` when `from` is missing and never
    /// returns a negative value.
    #[must_use]
    pub fn clipped_seconds(
        &self,
        from: TimeField,
        to: TimeField,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Option<f64> {
        let start = self.time(from)?.max(window_start);
        let end = self.time(to).map_or(window_end, |t| t.min(window_end));
        Some(seconds(end - start).max(0.0))
    }
}

#[allow(clippy::cast_precision_loss)]
fn seconds(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}
