//! Merging sparse store results into a complete bucket range.

use std::collections::BTreeMap;

use port_ops_analytics_models::BucketKey;

/// Emits one entry per bucket of `range`, in range order, taking the
/// value from `raw` when present and `M::default()` otherwise.
///
/// Raw entries outside the range are dropped. The output length always
/// equals the range length.
pub fn gap_fill<M, I>(range: &[BucketKey], raw: I) -> Vec<(BucketKey, M)>
where
    M: Default + Clone,
    I: IntoIterator<Item = (BucketKey, M)>,
{
    let lookup: BTreeMap<BucketKey, M> = raw.into_iter().collect();

    range
        .iter()
        .map(|key| (*key, lookup.get(key).cloned().unwrap_or_default()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use port_ops_analytics_models::IdleMetrics;

    #[test]
    fn fills_missing_buckets_with_zero() {
        let range: Vec<BucketKey> = (2021..=2025).map(BucketKey::year).collect();
        let raw = vec![
            (
                BucketKey::year(2024),
                IdleMetrics {
                    idle_percent: 10.0,
                    total_idle: 4.0,
                },
            ),
            (
                BucketKey::year(2023),
                IdleMetrics {
                    idle_percent: 5.0,
                    total_idle: 2.0,
                },
            ),
            (
                BucketKey::year(2019),
                IdleMetrics {
                    idle_percent: 1.0,
                    total_idle: 1.0,
                },
            ),
        ];

        let filled = gap_fill(&range, raw);

        assert_eq!(filled.len(), range.len());
        let keys: Vec<BucketKey> = filled.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, range);
        assert_eq!(filled[0].1, IdleMetrics::default());
        assert!((filled[2].1.total_idle - 2.0).abs() < f64::EPSILON);
        assert!((filled[3].1.idle_percent - 10.0).abs() < f64::EPSILON);
        assert_eq!(filled[4].1, IdleMetrics::default());
    }

    #[test]
    fn empty_raw_gives_all_defaults() {
        let range = vec![BucketKey::month(2024, 1), BucketKey::month(2024, 2)];
        let filled = gap_fill::<IdleMetrics, _>(&range, Vec::new());
        assert!(filled.iter().all(|(_, m)| *m == IdleMetrics::default()));
    }
}
