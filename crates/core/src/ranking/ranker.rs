use std::cmp::Ordering;

use crate::ranking::ranking_policy::{RankingPolicy, SortKey};
use crate::shared::frame_record::FrameRecord;

/// A record that survived ranking, with the score it was ordered by.
///
/// Lexicographic ranking reports sharpness (its primary key) as the score;
/// threshold-composite ranking reports `sharpness + brightness`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RankedRecord {
    pub record: FrameRecord,
    pub score: f64,
}

/// Orders a batch of records and keeps at most `policy.top_n` of them.
///
/// Sorting is stable, so exact ties keep decode order. An empty batch, or
/// one where nothing clears the thresholds, yields an empty result.
pub fn rank(records: &[FrameRecord], policy: &RankingPolicy) -> Vec<RankedRecord> {
    let mut ranked: Vec<RankedRecord> = match policy.sort_key {
        SortKey::Lexicographic => {
            let mut sorted = records.to_vec();
            sorted.sort_by(compare_lexicographic);
            sorted
                .into_iter()
                .map(|record| RankedRecord {
                    record,
                    score: record.sharpness,
                })
                .collect()
        }
        SortKey::ThresholdComposite => {
            let mut survivors: Vec<RankedRecord> = records
                .iter()
                .filter(|r| {
                    r.sharpness > policy.sharpness_threshold
                        && r.brightness > policy.brightness_threshold
                })
                .map(|&record| RankedRecord {
                    record,
                    score: record.composite_score(),
                })
                .collect();
            survivors.sort_by(|a, b| b.score.total_cmp(&a.score));
            survivors
        }
    };
    ranked.truncate(policy.top_n);
    ranked
}

fn compare_lexicographic(a: &FrameRecord, b: &FrameRecord) -> Ordering {
    b.sharpness
        .total_cmp(&a.sharpness)
        .then_with(|| b.brightness.total_cmp(&a.brightness))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(index: usize, sharpness: f64, brightness: f64) -> FrameRecord {
        FrameRecord {
            index,
            sharpness,
            brightness,
        }
    }

    fn indices(ranked: &[RankedRecord]) -> Vec<usize> {
        ranked.iter().map(|r| r.record.index).collect()
    }

    fn composite(top_n: usize, sharpness_threshold: f64, brightness_threshold: f64) -> RankingPolicy {
        RankingPolicy {
            top_n,
            sharpness_threshold,
            brightness_threshold,
            ..RankingPolicy::threshold_composite()
        }
    }

    #[test]
    fn test_empty_batch_yields_empty_result() {
        assert!(rank(&[], &RankingPolicy::lexicographic(10)).is_empty());
        assert!(rank(&[], &RankingPolicy::threshold_composite()).is_empty());
    }

    #[test]
    fn test_lexicographic_orders_by_sharpness_then_brightness() {
        let records = vec![
            rec(0, 5.0, 100.0),
            rec(1, 9.0, 10.0),
            rec(2, 5.0, 200.0),
            rec(3, 1.0, 255.0),
        ];
        let ranked = rank(&records, &RankingPolicy::lexicographic(10));
        assert_eq!(indices(&ranked), vec![1, 2, 0, 3]);
        assert_eq!(ranked[0].score, 9.0);
    }

    #[test]
    fn test_lexicographic_truncates_to_top_n() {
        let records: Vec<_> = (0..20).map(|i| rec(i, i as f64, 0.0)).collect();
        let ranked = rank(&records, &RankingPolicy::lexicographic(5));
        assert_eq!(indices(&ranked), vec![19, 18, 17, 16, 15]);
    }

    #[test]
    fn test_lexicographic_does_not_filter() {
        let records = vec![rec(0, 0.0, 0.0), rec(1, 0.0, 0.0)];
        assert_eq!(rank(&records, &RankingPolicy::lexicographic(5)).len(), 2);
    }

    #[test]
    fn test_exact_ties_keep_decode_order() {
        let records = vec![rec(0, 3.0, 3.0), rec(1, 3.0, 3.0), rec(2, 3.0, 3.0)];
        let lex = rank(&records, &RankingPolicy::lexicographic(3));
        assert_eq!(indices(&lex), vec![0, 1, 2]);

        let comp = rank(&records, &composite(3, 0.0, 0.0));
        assert_eq!(indices(&comp), vec![0, 1, 2]);
    }

    #[test]
    fn test_composite_ties_on_score_keep_decode_order() {
        // Same sum, different split: composite mode must not tie-break on sharpness.
        let records = vec![rec(0, 20.0, 80.0), rec(1, 40.0, 60.0)];
        let ranked = rank(&records, &composite(2, 0.0, 0.0));
        assert_eq!(indices(&ranked), vec![0, 1]);
    }

    #[test]
    fn test_composite_filters_with_strict_inequality() {
        let records = vec![
            rec(0, 10.0, 100.0), // sharpness == threshold -> dropped
            rec(1, 50.0, 50.0),  // brightness == threshold -> dropped
            rec(2, 11.0, 51.0),
            rec(3, 500.0, 20.0), // too dark
        ];
        let ranked = rank(&records, &composite(10, 10.0, 50.0));
        assert_eq!(indices(&ranked), vec![2]);
    }

    #[test]
    fn test_composite_scores_are_exact_sums_sorted_descending() {
        let records = vec![
            rec(0, 15.5, 60.25),
            rec(1, 100.0, 70.0),
            rec(2, 30.0, 90.0),
        ];
        let ranked = rank(&records, &composite(10, 10.0, 50.0));
        assert_eq!(indices(&ranked), vec![1, 2, 0]);
        for r in &ranked {
            assert_eq!(r.score, r.record.sharpness + r.record.brightness);
            assert!(r.record.sharpness > 10.0 && r.record.brightness > 50.0);
        }
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_composite_returns_all_survivors_when_fewer_than_top_n() {
        let records = vec![rec(0, 20.0, 60.0), rec(1, 1.0, 1.0)];
        let ranked = rank(&records, &composite(10, 10.0, 50.0));
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_output_never_exceeds_top_n_or_input() {
        let records: Vec<_> = (0..7)
            .map(|i| rec(i, (i * 37 % 11) as f64, (i * 53 % 17) as f64 + 60.0))
            .collect();
        for top_n in 1..10 {
            let lex = rank(&records, &RankingPolicy::lexicographic(top_n));
            assert!(lex.len() <= top_n && lex.len() <= records.len());
            let comp = rank(&records, &composite(top_n, 2.0, 50.0));
            assert!(comp.len() <= top_n);
        }
    }

    #[test]
    fn test_lexicographic_adjacent_pairs_are_ordered() {
        let records: Vec<_> = (0..12)
            .map(|i| rec(i, (i % 4) as f64, (i * 7 % 5) as f64))
            .collect();
        let ranked = rank(&records, &RankingPolicy::lexicographic(12));
        for pair in ranked.windows(2) {
            let (a, b) = (pair[0].record, pair[1].record);
            assert!(a.sharpness >= b.sharpness);
            if a.sharpness == b.sharpness {
                assert!(a.brightness >= b.brightness);
            }
        }
    }
}
