use super::types::{QuantizedSample, ReconciledRecord};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};

/// Value filled in for a series that has no reading in a bucket.
pub const MISSING_VALUE: f64 = 0.0;

fn bucket_lookup(series: &[QuantizedSample]) -> BTreeMap<DateTime<Utc>, f64> {
    let mut lookup = BTreeMap::new();
    for sample in series {
        // Arrival order decides collisions: the last sample in a bucket wins.
        lookup.insert(sample.bucket, sample.value);
    }
    lookup
}

/// Join both quantized series on their buckets.
///
/// The output holds exactly one record per bucket present in either series,
/// in strictly ascending bucket order.
pub fn reconcile(
    fill_level: &[QuantizedSample],
    battery_level: &[QuantizedSample],
) -> Vec<ReconciledRecord> {
    let fill_by_bucket = bucket_lookup(fill_level);
    let battery_by_bucket = bucket_lookup(battery_level);

    let buckets: BTreeSet<DateTime<Utc>> = fill_by_bucket
        .keys()
        .chain(battery_by_bucket.keys())
        .copied()
        .collect();

    buckets
        .into_iter()
        .map(|bucket| ReconciledRecord {
            bucket,
            fill_level: fill_by_bucket
                .get(&bucket)
                .copied()
                .unwrap_or(MISSING_VALUE),
            battery_level: battery_by_bucket
                .get(&bucket)
                .copied()
                .unwrap_or(MISSING_VALUE),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn series(points: &[(i64, f64)]) -> Vec<QuantizedSample> {
        points
            .iter()
            .map(|(secs, value)| QuantizedSample {
                bucket: at(*secs),
                value: *value,
            })
            .collect()
    }

    #[test]
    fn joins_shared_buckets_and_defaults_missing_side() {
        let fill = series(&[(10, 40.0), (12, 55.0)]);
        let battery = series(&[(12, 90.0), (14, 89.0)]);
        let records = reconcile(&fill, &battery);

        assert_eq!(
            records,
            vec![
                ReconciledRecord {
                    bucket: at(10),
                    fill_level: 40.0,
                    battery_level: 0.0,
                },
                ReconciledRecord {
                    bucket: at(12),
                    fill_level: 55.0,
                    battery_level: 90.0,
                },
                ReconciledRecord {
                    bucket: at(14),
                    fill_level: 0.0,
                    battery_level: 89.0,
                },
            ]
        );
    }

    #[test]
    fn last_sample_in_a_bucket_wins() {
        let fill = series(&[(12, 40.0), (12, 55.0), (12, 61.0)]);
        let records = reconcile(&fill, &[]);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fill_level, 61.0);
        assert_eq!(records[0].battery_level, MISSING_VALUE);
    }

    #[test]
    fn output_is_strictly_ascending_and_covers_union() {
        let fill = series(&[(20, 1.0), (4, 2.0), (8, 3.0), (4, 4.0)]);
        let battery = series(&[(6, 5.0), (20, 6.0), (2, 7.0)]);
        let records = reconcile(&fill, &battery);

        for pair in records.windows(2) {
            assert!(pair[0].bucket < pair[1].bucket);
        }
        let buckets: Vec<DateTime<Utc>> = records.iter().map(|record| record.bucket).collect();
        assert_eq!(buckets, vec![at(2), at(4), at(6), at(8), at(20)]);
        // Out-of-order input still resolves collisions by arrival.
        assert_eq!(records[1].fill_level, 4.0);
    }

    #[test]
    fn empty_inputs_produce_no_records() {
        assert!(reconcile(&[], &[]).is_empty());
    }
}
