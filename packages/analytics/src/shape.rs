//! Wire shapes for series rows.
//!
//! Trend rows are flat in both granularities. Throughput keeps its two
//! historical shapes: monthly rows nest values under `current`, yearly
//! rows are flat.

use port_ops_analytics_models::{
    BucketKey, Granularity, MonthlyThroughputRow, ThroughputMetrics, ThroughputRow,
    ThroughputVariance, TrendRow,
};

/// Builds flat `{ year, month?, ...metrics, variance }` rows.
pub fn trend_rows<M, V>(series: Vec<(BucketKey, M, V)>) -> Vec<TrendRow<M, V>> {
    series
        .into_iter()
        .map(|(key, metrics, variance)| TrendRow {
            year: key.year,
            month: key.month_label(),
            metrics,
            variance,
        })
        .collect()
}

/// Builds throughput rows in the shape required by `granularity`.
#[must_use]
pub fn throughput_rows(
    granularity: Granularity,
    series: Vec<(BucketKey, ThroughputMetrics, ThroughputVariance)>,
) -> Vec<ThroughputRow> {
    series
        .into_iter()
        .map(|(key, current, variance)| match granularity {
            Granularity::Month => ThroughputRow::Month(MonthlyThroughputRow {
                month: key.to_string(),
                current,
                variance,
            }),
            Granularity::Year => ThroughputRow::Year(TrendRow {
                year: key.year,
                month: None,
                metrics: current,
                variance,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use port_ops_analytics_models::{OutputMetrics, OutputVariance};

    #[test]
    fn trend_rows_label_months_only_in_monthly_series() {
        let rows = trend_rows(vec![
            (
                BucketKey::month(2025, 8),
                OutputMetrics::default(),
                OutputVariance::default(),
            ),
            (
                BucketKey::year(2025),
                OutputMetrics::default(),
                OutputVariance::default(),
            ),
        ]);
        assert_eq!(rows[0].month.as_deref(), Some("Aug-2025"));
        assert_eq!(rows[1].month, None);
        assert_eq!(rows[1].year, 2025);
    }

    #[test]
    fn throughput_month_rows_are_nested() {
        let rows = throughput_rows(
            Granularity::Month,
            vec![(
                BucketKey::month(2024, 3),
                ThroughputMetrics {
                    total_throughput: 1.5,
                    ..ThroughputMetrics::default()
                },
                ThroughputVariance::default(),
            )],
        );
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["month"], "Mar-2024");
        assert_eq!(json[0]["current"]["totalThroughput"], 1.5);
        assert!(json[0]["variance"]["totalThroughput"].is_null());
    }

    #[test]
    fn throughput_year_rows_are_flat() {
        let rows = throughput_rows(
            Granularity::Year,
            vec![(
                BucketKey::year(2024),
                ThroughputMetrics {
                    container_teus: 900.0,
                    ..ThroughputMetrics::default()
                },
                ThroughputVariance::default(),
            )],
        );
        let json = serde_json::to_value(&rows).unwrap();
        assert_eq!(json[0]["year"], 2024);
        assert_eq!(json[0]["containerTEUs"], 900.0);
        assert!(json[0].get("current").is_none());
    }
}
