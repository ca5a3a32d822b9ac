//! In-memory vessel store.
//!
//! Evaluates [`AggregationQuery`] descriptions directly over a `Vec` of
//! calls. Used for development fixtures and tests; it is also the
//! reference behaviour the `SQLite` backend is checked against.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use port_ops_database_models::{
    AggregationQuery, CallFilter, GroupValue, RawGroup, Reduced, Reducer, ReducerSpec,
};
use port_ops_vessel_models::VesselCall;

use crate::{DbError, VesselStore};

/// A store holding every call in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryVesselStore {
    calls: Vec<VesselCall>,
}

impl MemoryVesselStore {
    /// Creates a store over the given calls.
    #[must_use]
    pub const fn new(calls: Vec<VesselCall>) -> Self {
        Self { calls }
    }

    /// Number of calls held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if the store holds no calls.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Runs an aggregation synchronously.
    #[must_use]
    pub fn run(&self, query: &AggregationQuery) -> Vec<RawGroup> {
        let mut groups: BTreeMap<GroupValue, Vec<&VesselCall>> = BTreeMap::new();

        for call in self.calls.iter().filter(|c| query.filter.matches(c)) {
            if let Some(key) = query.group_by.group_of(call) {
                groups.entry(key).or_default().push(call);
            }
        }

        groups
            .into_iter()
            .map(|(key, calls)| RawGroup {
                key,
                values: query
                    .reducers
                    .iter()
                    .map(|spec| (spec.name, reduce(spec, &calls)))
                    .collect(),
            })
            .collect()
    }
}

fn reduce(spec: &ReducerSpec, calls: &[&VesselCall]) -> Reduced {
    let members = calls
        .iter()
        .filter(|c| spec.only_cargo.as_ref().is_none_or(|t| &c.cargo_type == t));

    match spec.reducer {
        #[allow(clippy::cast_precision_loss)]
        Reducer::Count => Reduced::Number(Some(members.count() as f64)),
        Reducer::Sum(measure) => Reduced::Number(Some(
            members.filter_map(|c| measure.evaluate(c)).sum::<f64>(),
        )),
        Reducer::Avg(measure) => {
            let values: Vec<f64> = members.filter_map(|c| measure.evaluate(c)).collect();
            if values.is_empty() {
                Reduced::Number(None)
            } else {
                #[allow(clippy::cast_precision_loss)]
                let mean = values.iter().sum::<f64>() / values.len() as f64;
                Reduced::Number(Some(mean))
            }
        }
        Reducer::Push(measure) => {
            Reduced::List(members.filter_map(|c| measure.evaluate(c)).collect())
        }
    }
}

#[async_trait]
impl VesselStore for MemoryVesselStore {
    async fn aggregate(&self, query: &AggregationQuery) -> Result<Vec<RawGroup>, DbError> {
        log::debug!(
            "memory store: aggregating {} calls by {:?}",
            self.calls.len(),
            query.group_by
        );
        Ok(self.run(query))
    }

    async fn calls(&self, filter: &CallFilter) -> Result<Vec<VesselCall>, DbError> {
        Ok(self
            .calls
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect())
    }

    async fn distinct_berths(&self) -> Result<Vec<String>, DbError> {
        let berths: BTreeSet<&str> = self
            .calls
            .iter()
            .filter_map(|c| c.berth.as_deref())
            .collect();
        Ok(berths.into_iter().map(str::to_string).collect())
    }
}
