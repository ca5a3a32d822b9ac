#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Aggregation request vocabulary and raw grouped results.
//!
//! The analytics layer never runs a query itself. It describes *what* it
//! needs as an [`AggregationQuery`]: a [`CallFilter`] selecting vessel
//! calls, a [`GroupKey`] bucketing them, and a list of named reducers
//! (`count`, `sum`, `avg`, `push`) over a [`Measure`]. A store backend
//! executes the description and answers with one [`RawGroup`] per key.
//!
//! All durations produced by measures are in seconds.

use chrono::{Datelike as _, NaiveDate, NaiveDateTime, NaiveTime};
use port_ops_vessel_models::{CargoType, CoastalOrForeign, TimeField, VesselCall};
use serde::{Deserialize, Serialize};

/// Label reported for calls with no flag state.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// A half-open date-time window, `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    /// First instant included.
    pub start: NaiveDateTime,
    /// First instant excluded.
    pub end: NaiveDateTime,
}

impl DateWindow {
    /// Creates a window from its bounds.
    #[must_use]
    pub const fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// The window covering the calendar days `first` through `last`.
    /// `None` when `last` is the last representable date.
    #[must_use]
    pub fn whole_days(first: NaiveDate, last: NaiveDate) -> Option<Self> {
        Some(Self::new(
            first.and_time(NaiveTime::MIN),
            last.succ_opt()?.and_time(NaiveTime::MIN),
        ))
    }

    /// Returns `true` if `at` falls inside the window.
    #[must_use]
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end
    }

    /// The last calendar day the window touches.
    #[must_use]
    pub fn last_date(&self) -> NaiveDate {
        let end = self.end.date();
        if self.end.time() == NaiveTime::MIN && self.end > self.start {
            end.pred_opt().unwrap_or(end)
        } else {
            end
        }
    }

    /// Length of the window in hours (never negative).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours(&self) -> f64 {
        ((self.end - self.start).num_seconds().max(0) as f64) / 3600.0
    }
}

/// Numeric fields of a vessel call that reducers can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericField {
    /// Cargo handled, metric tons.
    CargoTonnage,
    /// Containers handled, TEUs.
    ContainerCount,
    /// Total pre-berthing detention, seconds.
    PbdTotal,
    /// Ship not working before berthing, seconds.
    SnwbTotal,
    /// Ship waiting at berth, seconds.
    SwbTotal,
    /// Shifting time, seconds.
    ShiftingTotal,
    /// Idling at berth (port + non-port), seconds.
    IdlingTotal,
    /// Inter-movement time, seconds.
    ImTime,
    /// Other-movement time, seconds.
    OmTime,
    /// Logged total turnaround, seconds.
    TrtTotal,
    /// Waiting before berth (PBD + SNWB), seconds.
    WaitingBeforeBerth,
}

impl NumericField {
    /// Reads the field from a call. `None` when the value is not logged.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, call: &VesselCall) -> Option<f64> {
        let d = &call.durations;
        let seconds = match self {
            Self::CargoTonnage => return Some(call.cargo_tonnage),
            Self::ContainerCount => return Some(f64::from(call.container_count)),
            Self::PbdTotal => d.pbd_total,
            Self::SnwbTotal => d.snwb_total,
            Self::SwbTotal => d.swb_total,
            Self::ShiftingTotal => d.shifting_total,
            Self::IdlingTotal => d.idling_total(),
            Self::ImTime => d.im_time,
            Self::OmTime => d.om_time,
            Self::TrtTotal => d.trt_total,
            Self::WaitingBeforeBerth => d.waiting_before_berth(),
        };
        seconds.map(|s| s as f64)
    }
}

/// A per-call quantity fed into a reducer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Measure {
    /// A stored numeric field.
    Field(NumericField),
    /// Seconds between two timestamps; absent unless both are present.
    Elapsed {
        /// Interval start.
        from: TimeField,
        /// Interval end.
        to: TimeField,
    },
    /// Seconds of `[from, to]` inside `window`, never negative. A missing
    /// `to` counts as still running and is clipped at the window end.
    Clipped {
        /// Interval start.
        from: TimeField,
        /// Interval end.
        to: TimeField,
        /// Clipping window.
        window: DateWindow,
    },
}

impl Measure {
    /// Evaluates the measure for one call.
    #[must_use]
    pub fn evaluate(&self, call: &VesselCall) -> Option<f64> {
        match *self {
            Self::Field(field) => field.value(call),
            Self::Elapsed { from, to } => call.elapsed_seconds(from, to),
            Self::Clipped { from, to, window } => {
                call.clipped_seconds(from, to, window.start, window.end)
            }
        }
    }
}

/// How the values of a group are folded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Reducer {
    /// Number of calls in the group.
    Count,
    /// Sum of the measure; `0` for a group with no values.
    Sum(Measure),
    /// Mean of the present values; absent for a group with no values.
    Avg(Measure),
    /// Every present value, unordered.
    Push(Measure),
}

/// A named reducer, optionally restricted to one cargo type.
#[derive(Debug, Clone, PartialEq)]
pub struct ReducerSpec {
    /// Name the result is reported under.
    pub name: &'static str,
    /// The fold to apply.
    pub reducer: Reducer,
    /// When set, only calls of this cargo type contribute.
    pub only_cargo: Option<CargoType>,
}

/// Text attributes of a call that can key a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelField {
    /// Commodity name. Calls without one are left out.
    Commodity,
    /// Cargo classification label.
    CargoType,
    /// Flag state; calls without one fall under [`UNKNOWN_LABEL`].
    FlagCountry,
}

impl LabelField {
    /// Reads the label from a call.
    #[must_use]
    pub fn value(self, call: &VesselCall) -> Option<String> {
        match self {
            Self::Commodity => call.commodity.clone().filter(|c| !c.is_empty()),
            Self::CargoType => Some(call.cargo_type.to_string()),
            Self::FlagCountry => Some(
                call.flag_country
                    .clone()
                    .filter(|f| !f.is_empty())
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
            ),
        }
    }
}

/// Grouping key for an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKey {
    /// A single group over every matching call.
    All,
    /// Calendar year of the timestamp.
    Year(TimeField),
    /// Calendar year and month of the timestamp.
    YearMonth(TimeField),
    /// A text attribute.
    Label(LabelField),
    /// Calendar year and month of the timestamp, then a text attribute.
    YearMonthLabel(TimeField, LabelField),
}

impl GroupKey {
    /// Computes the group a call falls into. `None` when the keyed value is
    /// missing from the call.
    #[must_use]
    pub fn group_of(&self, call: &VesselCall) -> Option<GroupValue> {
        match *self {
            Self::All => Some(GroupValue::All),
            Self::Year(field) => call.time(field).map(|t| GroupValue::Year(t.year())),
            Self::YearMonth(field) => call.time(field).map(|t| GroupValue::YearMonth {
                year: t.year(),
                month: t.month(),
            }),
            Self::Label(label) => label.value(call).map(GroupValue::Label),
            Self::YearMonthLabel(field, label) => {
                let t = call.time(field)?;
                Some(GroupValue::YearMonthLabel {
                    year: t.year(),
                    month: t.month(),
                    label: label.value(call)?,
                })
            }
        }
    }
}

/// Selection of vessel calls for an aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallFilter {
    /// The timestamp must be present and inside the window.
    pub window: Option<(TimeField, DateWindow)>,
    /// The `[from, to)` interval must overlap the window for a positive
    /// length; a missing `to` counts as still running.
    pub overlapping: Option<(TimeField, TimeField, DateWindow)>,
    /// Timestamps that must be present.
    pub present: Vec<TimeField>,
    /// Numeric fields that must be logged.
    pub logged: Vec<NumericField>,
    /// Numeric fields that must be strictly positive.
    pub positive: Vec<NumericField>,
    /// Restrict to one cargo type.
    pub cargo_type: Option<CargoType>,
    /// Restrict to one berth.
    pub berth: Option<String>,
    /// Restrict to one vessel.
    pub vessel_id: Option<String>,
    /// Restrict to coastal or foreign voyages.
    pub voyage: Option<CoastalOrForeign>,
}

impl CallFilter {
    /// Filter on `field` lying inside `window`.
    #[must_use]
    pub fn within(field: TimeField, window: DateWindow) -> Self {
        Self {
            window: Some((field, window)),
            ..Self::default()
        }
    }

    /// Filter on the `[from, to)` interval overlapping `window`.
    #[must_use]
    pub fn overlapping(from: TimeField, to: TimeField, window: DateWindow) -> Self {
        Self {
            overlapping: Some((from, to, window)),
            ..Self::default()
        }
    }

    /// Requires `field` to be present.
    #[must_use]
    pub fn require(mut self, field: TimeField) -> Self {
        self.present.push(field);
        self
    }

    /// Requires the numeric field to be logged.
    #[must_use]
    pub fn require_logged(mut self, field: NumericField) -> Self {
        self.logged.push(field);
        self
    }

    /// Requires the numeric field to be strictly positive.
    #[must_use]
    pub fn require_positive(mut self, field: NumericField) -> Self {
        self.positive.push(field);
        self
    }

    /// Restricts to one cargo type.
    #[must_use]
    pub fn cargo(mut self, cargo_type: CargoType) -> Self {
        self.cargo_type = Some(cargo_type);
        self
    }

    /// Restricts to one berth.
    #[must_use]
    pub fn berth(mut self, berth: impl Into<String>) -> Self {
        self.berth = Some(berth.into());
        self
    }

    /// Restricts to one vessel.
    #[must_use]
    pub fn vessel(mut self, vessel_id: impl Into<String>) -> Self {
        self.vessel_id = Some(vessel_id.into());
        self
    }

    /// Restricts to coastal or foreign voyages.
    #[must_use]
    pub const fn voyage(mut self, voyage: CoastalOrForeign) -> Self {
        self.voyage = Some(voyage);
        self
    }

    /// Returns `true` if the call satisfies every condition.
    #[must_use]
    pub fn matches(&self, call: &VesselCall) -> bool {
        if let Some((field, window)) = &self.window
            && !call.time(*field).is_some_and(|t| window.contains(t))
        {
            return false;
        }
        if let Some((from, to, window)) = &self.overlapping
            && !(call.time(*from).is_some_and(|t| t < window.end)
                && call.time(*to).is_none_or(|t| t > window.start))
        {
            return false;
        }
        if self.present.iter().any(|f| call.time(*f).is_none()) {
            return false;
        }
        if self.logged.iter().any(|f| f.value(call).is_none()) {
            return false;
        }
        if self
            .positive
            .iter()
            .any(|f| !f.value(call).is_some_and(|v| v > 0.0))
        {
            return false;
        }
        if let Some(cargo_type) = &self.cargo_type
            && &call.cargo_type != cargo_type
        {
            return false;
        }
        if let Some(berth) = &self.berth
            && call.berth.as_deref() != Some(berth.as_str())
        {
            return false;
        }
        if let Some(vessel_id) = &self.vessel_id
            && &call.vessel_id != vessel_id
        {
            return false;
        }
        if let Some(voyage) = self.voyage
            && call.coastal_or_foreign != Some(voyage)
        {
            return false;
        }
        true
    }
}

/// A complete aggregation request.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationQuery {
    /// Which calls take part.
    pub filter: CallFilter,
    /// How they are bucketed.
    pub group_by: GroupKey,
    /// What is computed per bucket.
    pub reducers: Vec<ReducerSpec>,
}

impl AggregationQuery {
    /// Starts a query with no reducers.
    #[must_use]
    pub const fn new(filter: CallFilter, group_by: GroupKey) -> Self {
        Self {
            filter,
            group_by,
            reducers: Vec::new(),
        }
    }

    /// Adds a call count.
    #[must_use]
    pub fn count(self, name: &'static str) -> Self {
        self.reduce(name, Reducer::Count, None)
    }

    /// Adds a sum.
    #[must_use]
    pub fn sum(self, name: &'static str, measure: Measure) -> Self {
        self.reduce(name, Reducer::Sum(measure), None)
    }

    /// Adds a mean.
    #[must_use]
    pub fn avg(self, name: &'static str, measure: Measure) -> Self {
        self.reduce(name, Reducer::Avg(measure), None)
    }

    /// Adds a mean over calls of one cargo type only.
    #[must_use]
    pub fn avg_of_cargo(self, name: &'static str, measure: Measure, cargo: CargoType) -> Self {
        self.reduce(name, Reducer::Avg(measure), Some(cargo))
    }

    /// Adds a raw value list.
    #[must_use]
    pub fn push(self, name: &'static str, measure: Measure) -> Self {
        self.reduce(name, Reducer::Push(measure), None)
    }

    /// Adds an arbitrary reducer.
    #[must_use]
    pub fn reduce(
        mut self,
        name: &'static str,
        reducer: Reducer,
        only_cargo: Option<CargoType>,
    ) -> Self {
        self.reducers.push(ReducerSpec {
            name,
            reducer,
            only_cargo,
        });
        self
    }
}

/// The key of one raw group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupValue {
    /// The single group of [`GroupKey::All`].
    All,
    /// A calendar year.
    Year(i32),
    /// A calendar month.
    YearMonth {
        /// Year.
        year: i32,
        /// Month, 1-12.
        month: u32,
    },
    /// A label such as a commodity name.
    Label(String),
    /// A calendar month and a label.
    YearMonthLabel {
        /// Year.
        year: i32,
        /// Month, 1-12.
        month: u32,
        /// Label.
        label: String,
    },
}

/// One reduced value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reduced {
    /// Result of `count`, `sum` or `avg`.
    Number(Option<f64>),
    /// Result of `push`.
    List(Vec<f64>),
}

/// One group returned by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    /// Group key.
    pub key: GroupValue,
    /// Reduced values in the order of the query's reducers.
    pub values: Vec<(&'static str, Reduced)>,
}

impl RawGroup {
    /// The numeric value reported under `name`, if present and not null.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.values.iter().find_map(|(n, v)| match v {
            Reduced::Number(value) if *n == name => *value,
            _ => None,
        })
    }

    /// The numeric value under `name`, `0` when absent or null.
    #[must_use]
    pub fn number_or_zero(&self, name: &str) -> f64 {
        self.number(name).unwrap_or(0.0)
    }

    /// The value list reported under `name`; empty when absent.
    #[must_use]
    pub fn list(&self, name: &str) -> &[f64] {
        self.values
            .iter()
            .find_map(|(n, v)| match v {
                Reduced::List(values) if *n == name => Some(values.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use port_ops_vessel_models::DurationComponents;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn call(berthing: NaiveDateTime) -> VesselCall {
        VesselCall {
            vessel_id: "V1".to_string(),
            berth: Some("Q1".to_string()),
            cargo_type: CargoType::LiquidBulk,
            commodity: Some("CRUDE".to_string()),
            flag_country: None,
            coastal_or_foreign: None,
            cargo_tonnage: 500.0,
            container_count: 0,
            gross_tonnage: None,
            arrival_outer_roads: None,
            berthing_time: Some(berthing),
            unberthing_time: None,
            departure_outer_roads: None,
            nor_time: None,
            pilot_boarding: None,
            pilot_unboarding: None,
            durations: DurationComponents {
                pbd_total: Some(7200),
                ..DurationComponents::default()
            },
        }
    }

    #[test]
    fn filter_matches_window_and_cargo() {
        let window = DateWindow::new(at(2024, 1, 1), at(2024, 12, 31));
        let filter =
            CallFilter::within(TimeField::BerthingTime, window).cargo(CargoType::LiquidBulk);

        assert!(filter.matches(&call(at(2024, 6, 1))));
        assert!(!filter.matches(&call(at(2025, 6, 1))));
        assert!(!filter.clone().berth("Q2").matches(&call(at(2024, 6, 1))));
    }

    #[test]
    fn filter_requires_present_and_logged_values() {
        let c = call(at(2024, 6, 1));
        assert!(!CallFilter::default()
            .require(TimeField::UnberthingTime)
            .matches(&c));
        assert!(CallFilter::default()
            .require_logged(NumericField::PbdTotal)
            .matches(&c));
        assert!(!CallFilter::default()
            .require_positive(NumericField::TrtTotal)
            .matches(&c));
    }

    #[test]
    fn window_is_half_open() {
        let window = DateWindow::whole_days(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
        )
        .unwrap();
        assert!(window.contains(at(2024, 3, 1)));
        assert!(!window.contains(at(2024, 4, 1)));
        assert!((window.hours() - 744.0).abs() < f64::EPSILON);
        assert_eq!(window.last_date(), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn overlap_requires_positive_length_inside_window() {
        let window = DateWindow::new(at(2024, 2, 1), at(2024, 3, 1));
        let filter = CallFilter::overlapping(
            TimeField::BerthingTime,
            TimeField::UnberthingTime,
            window,
        );

        let mut spanning = call(at(2024, 1, 25));
        spanning.unberthing_time = Some(at(2024, 2, 10));
        assert!(filter.matches(&spanning));

        let mut ended_at_start = call(at(2024, 1, 25));
        ended_at_start.unberthing_time = Some(at(2024, 2, 1));
        assert!(!filter.matches(&ended_at_start));

        // Still at berth since before the window.
        assert!(filter.matches(&call(at(2023, 12, 1))));
        assert!(!filter.matches(&call(at(2024, 3, 1))));
    }

    #[test]
    fn filters_by_vessel_and_voyage() {
        let mut c = call(at(2024, 6, 1));
        c.coastal_or_foreign = Some(CoastalOrForeign::Coastal);

        assert!(CallFilter::default().vessel("V1").matches(&c));
        assert!(!CallFilter::default().vessel("V2").matches(&c));
        assert!(CallFilter::default()
            .voyage(CoastalOrForeign::Coastal)
            .matches(&c));
        assert!(!CallFilter::default()
            .voyage(CoastalOrForeign::Foreign)
            .matches(&c));
    }

    #[test]
    fn groups_by_labels() {
        let mut c = call(at(2024, 6, 15));
        assert_eq!(
            GroupKey::Label(LabelField::CargoType).group_of(&c),
            Some(GroupValue::Label("Liquid Bulk".to_string()))
        );
        assert_eq!(
            GroupKey::Label(LabelField::FlagCountry).group_of(&c),
            Some(GroupValue::Label(UNKNOWN_LABEL.to_string()))
        );
        assert_eq!(
            GroupKey::YearMonthLabel(TimeField::BerthingTime, LabelField::Commodity).group_of(&c),
            Some(GroupValue::YearMonthLabel {
                year: 2024,
                month: 6,
                label: "CRUDE".to_string(),
            })
        );

        c.commodity = Some(String::new());
        assert_eq!(GroupKey::Label(LabelField::Commodity).group_of(&c), None);
    }

    #[test]
    fn groups_by_year_and_month() {
        let c = call(at(2024, 6, 15));
        assert_eq!(
            GroupKey::YearMonth(TimeField::BerthingTime).group_of(&c),
            Some(GroupValue::YearMonth {
                year: 2024,
                month: 6
            })
        );
        assert_eq!(
            GroupKey::Year(TimeField::ArrivalOuterRoads).group_of(&c),
            None
        );
    }

    #[test]
    fn raw_group_accessors_default_to_zero_and_empty() {
        let group = RawGroup {
            key: GroupValue::All,
            values: vec![
                ("total", Reduced::Number(Some(4.0))),
                ("mean", Reduced::Number(None)),
                ("all", Reduced::List(vec![1.0, 2.0])),
            ],
        };
        assert_eq!(group.number("total"), Some(4.0));
        assert!(group.number_or_zero("mean").abs() < f64::EPSILON);
        assert_eq!(group.list("all"), &[1.0, 2.0]);
        assert!(group.list("missing").is_empty());
    }
}
