use std::collections::HashSet;

use cohesion_core::counter::{CounterMode, Tally, reduce};
use cohesion_core::distribution::{Distribution, size_means};
use proptest::prelude::*;

fn arb_blob() -> impl Strategy<Value = (Vec<(i64, i32)>, String)> {
    prop::collection::vec((-20_i64..60, -1000_i32..1000), 0..80).prop_map(|lines| {
        let blob = lines
            .iter()
            .map(|(k, v)| format!("{k},{v}"))
            .collect::<Vec<_>>()
            .join("\n");
        (lines, blob)
    })
}

proptest! {
    #[test]
    fn distributions_have_equal_lengths_and_unique_keys((_, blob) in arb_blob()) {
        for mode in [CounterMode::Frequency, CounterMode::Sum] {
            let d = reduce(&blob, mode).unwrap();
            prop_assert_eq!(d.x().len(), d.y().len());
            let unique: HashSet<i64> = d.x().iter().copied().collect();
            prop_assert_eq!(unique.len(), d.len());
        }
    }

    #[test]
    fn frequencies_sum_to_line_count((lines, blob) in arb_blob()) {
        let d = reduce(&blob, CounterMode::Frequency).unwrap();
        let total: f64 = d.y().iter().sum();
        #[allow(clippy::cast_precision_loss)]
        let expected = lines.len() as f64;
        prop_assert!((total - expected).abs() < 1e-9);
    }

    #[test]
    fn frequency_and_sum_scans_agree_on_keys((_, blob) in arb_blob()) {
        let freq = reduce(&blob, CounterMode::Frequency).unwrap();
        let sums = reduce(&blob, CounterMode::Sum).unwrap();
        prop_assert_eq!(freq.x(), sums.x());
    }

    #[test]
    fn size_means_times_count_restores_sums((_, blob) in arb_blob()) {
        let tally = Tally::scan(&blob, CounterMode::Sum).unwrap();
        let freq = tally.frequency();
        let sums = tally.sums();
        let means = size_means(&freq, &sums).unwrap();
        for ((mean, count), sum) in means.y().iter().zip(freq.y()).zip(sums.y()) {
            prop_assert!((mean * count - sum).abs() < 1e-6);
        }
    }
}

#[test]
fn two_subgraphs_of_total_size_ten_have_mean_five() {
    let freq = Distribution::try_from_pairs([(4, 2.0)]).unwrap();
    let sums = Distribution::try_from_pairs([(4, 10.0)]).unwrap();
    let means = size_means(&freq, &sums).unwrap();
    assert!((means.y()[0] - 5.0).abs() < f64::EPSILON);
}
