//! Percent change between consecutive buckets.
//!
//! A change is only defined against a strictly positive previous value.
//! The first bucket of a series has no predecessor, so every field of its
//! variance is `None`.

use port_ops_analytics_models::{
    BucketKey, DetentionMetrics, DetentionVariance, IdleMetrics, IdleVariance, KpiSnapshot,
    KpiVariation, OccupancyMetrics, OccupancyVariance, OutputMetrics, OutputVariance,
    ThroughputMetrics, ThroughputVariance, TurnaroundMetrics, TurnaroundVariance,
};

/// `(current - previous) / previous * 100`, or `None` unless `previous`
/// is positive.
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if previous > 0.0 {
        Some((current - previous) / previous * 100.0)
    } else {
        None
    }
}

#[allow(clippy::cast_precision_loss)]
fn count_change(current: u64, previous: u64) -> Option<f64> {
    percent_change(current as f64, previous as f64)
}

/// A metric set that can be compared with an earlier one.
pub trait Compare {
    /// Per-field percent changes. `Default` is "no comparison".
    type Variance: Default;

    /// Change from `previous` to `self`.
    fn compare(&self, previous: &Self) -> Self::Variance;
}

/// Pairs each bucket with its change from the bucket before it.
pub fn with_variance<M: Compare>(series: Vec<(BucketKey, M)>) -> Vec<(BucketKey, M, M::Variance)> {
    let mut out: Vec<(BucketKey, M, M::Variance)> = Vec::with_capacity(series.len());
    for (key, metrics) in series {
        let variance = out
            .last()
            .map_or_else(M::Variance::default, |(_, previous, _)| {
                metrics.compare(previous)
            });
        out.push((key, metrics, variance));
    }
    out
}

impl Compare for TurnaroundMetrics {
    type Variance = TurnaroundVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        TurnaroundVariance {
            mean_overall: percent_change(self.mean_overall, previous.mean_overall),
            median_overall: percent_change(self.median_overall, previous.median_overall),
            container_avg: percent_change(self.container_avg, previous.container_avg),
        }
    }
}

impl Compare for IdleMetrics {
    type Variance = IdleVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        IdleVariance {
            idle_percent: percent_change(self.idle_percent, previous.idle_percent),
            total_idle: percent_change(self.total_idle, previous.total_idle),
        }
    }
}

impl Compare for OutputMetrics {
    type Variance = OutputVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        OutputVariance {
            avg_output: percent_change(self.avg_output, previous.avg_output),
            vessel_count: count_change(self.vessel_count, previous.vessel_count),
        }
    }
}

impl Compare for DetentionMetrics {
    type Variance = DetentionVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        DetentionVariance {
            avg_pbd: percent_change(self.avg_pbd, previous.avg_pbd),
            vessels_count: count_change(self.vessels_count, previous.vessels_count),
        }
    }
}

impl Compare for OccupancyMetrics {
    type Variance = OccupancyVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        OccupancyVariance {
            occupancy_hours: percent_change(self.occupancy_hours, previous.occupancy_hours),
            occupancy_percent: percent_change(self.occupancy_percent, previous.occupancy_percent),
            vessels_count: count_change(self.vessels_count, previous.vessels_count),
        }
    }
}

impl Compare for ThroughputMetrics {
    type Variance = ThroughputVariance;

    fn compare(&self, previous: &Self) -> Self::Variance {
        ThroughputVariance {
            total_throughput: percent_change(self.total_throughput, previous.total_throughput),
            dry_cargo: percent_change(self.dry_cargo, previous.dry_cargo),
            liquid_cargo: percent_change(self.liquid_cargo, previous.liquid_cargo),
            container_teus: percent_change(self.container_teus, previous.container_teus),
        }
    }
}

impl Compare for KpiSnapshot {
    type Variance = KpiVariation;

    fn compare(&self, previous: &Self) -> Self::Variance {
        KpiVariation {
            total_throughput_mmt: percent_change(
                self.total_throughput_mmt,
                previous.total_throughput_mmt,
            ),
            dry_cargo_mmt: percent_change(self.dry_cargo_mmt, previous.dry_cargo_mmt),
            liquid_cargo_mmt: percent_change(self.liquid_cargo_mmt, previous.liquid_cargo_mmt),
            container_teus: percent_change(self.container_teus, previous.container_teus),
            mean_trt: percent_change(self.mean_trt, previous.mean_trt),
            median_trt: percent_change(self.median_trt, previous.median_trt),
            avg_container_trt: percent_change(self.avg_container_trt, previous.avg_container_trt),
            output_per_berth_day: percent_change(
                self.output_per_berth_day,
                previous.output_per_berth_day,
            ),
            avg_pbd: percent_change(self.avg_pbd, previous.avg_pbd),
            idle_percent: percent_change(self.idle_percent, previous.idle_percent),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_change_is_null_guarded() {
        assert_eq!(percent_change(50.0, 0.0), None);
        assert_eq!(percent_change(0.0, 0.0), None);
        assert_eq!(percent_change(10.0, -5.0), None);
        assert_eq!(percent_change(75.0, 50.0), Some(50.0));
        assert_eq!(percent_change(0.0, 50.0), Some(-100.0));
    }

    #[test]
    fn first_bucket_has_no_variance() {
        let series = vec![
            (
                BucketKey::year(2024),
                DetentionMetrics {
                    avg_pbd: 4.0,
                    vessels_count: 2,
                },
            ),
            (
                BucketKey::year(2025),
                DetentionMetrics {
                    avg_pbd: 6.0,
                    vessels_count: 2,
                },
            ),
        ];

        let out = with_variance(series);
        assert_eq!(out[0].2, DetentionVariance::default());
        assert_eq!(out[1].2.avg_pbd, Some(50.0));
        assert_eq!(out[1].2.vessels_count, Some(0.0));
    }

    #[test]
    fn compares_against_previous_position_not_previous_year() {
        let series = vec![
            (BucketKey::month(2024, 12), IdleMetrics {
                idle_percent: 20.0,
                total_idle: 10.0,
            }),
            (BucketKey::month(2025, 1), IdleMetrics {
                idle_percent: 10.0,
                total_idle: 0.0,
            }),
            (BucketKey::month(2025, 2), IdleMetrics {
                idle_percent: 10.0,
                total_idle: 5.0,
            }),
        ];

        let out = with_variance(series);
        assert_eq!(out[1].2.idle_percent, Some(-50.0));
        assert_eq!(out[2].2.idle_percent, Some(0.0));
        assert_eq!(out[2].2.total_idle, None);
    }
}
