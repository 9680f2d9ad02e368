//! Hand-computed grids and run-wide invariants of the binning reducer.

use std::io::Cursor;

use cohesion_stream::grid::{DIST_BUCKETS, TIME_BUCKETS};
use cohesion_stream::{BinningReducer, GroupReport, Row, reduce_stream};
use proptest::prelude::*;

fn run(lines: &[&str]) -> Vec<GroupReport> {
    let mut reducer = BinningReducer::new();
    let mut reports: Vec<GroupReport> = lines
        .iter()
        .filter_map(|l| reducer.push_line(l).unwrap())
        .collect();
    reports.extend(reducer.finish());
    reports
}

fn nonzero(report: &GroupReport) -> Vec<(usize, usize, u64)> {
    report.grid.cells().filter(|&(_, _, c)| c > 0).collect()
}

#[test]
fn two_element_group() {
    let reports = run(&["id\ttime,x,y", "7\t0,0,0", "7\t5,90,120"]);
    assert_eq!(reports.len(), 1);
    // self-pairs at distance 0, cross pairs at distance 150
    assert_eq!(nonzero(&reports[0]), [(0, 0, 2), (0, 1, 2)]);
    assert!((reports[0].maxima.max_dist - 150.0).abs() < 1e-9);
    assert_eq!(reports[0].maxima.max_time, 5);
}

#[test]
fn three_element_group() {
    let reports = run(&["1\t0,0,0", "1\t14,0,250", "1\t70,0,0"]);
    let r = &reports[0];
    assert_eq!(r.size, 3);
    assert_eq!(nonzero(r), [(0, 0, 3), (1, 2, 2), (4, 0, 2), (4, 2, 2)]);
    assert!((r.maxima.max_dist - 250.0).abs() < 1e-9);
    assert_eq!(r.maxima.max_time, 70);
}

#[test]
fn far_pairs_clamp_to_last_buckets() {
    let reports = run(&["1\t0,0,0", "1\t1000,5000,0"]);
    assert_eq!(
        reports[0].grid.get(TIME_BUCKETS - 1, DIST_BUCKETS - 1),
        2
    );
}

#[test]
fn maxima_carry_across_groups() {
    let reports = run(&["1\t0,0,0", "1\t30,0,400", "2\t0,0,0", "2\t1,0,10"]);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[1].maxima, reports[0].maxima);
    assert_eq!(reports[1].maxima.max_time, 30);
    assert_eq!(reports[1].grid.total(), 4);
}

#[test]
fn reduce_stream_writes_one_dump_per_group() {
    let input = "id\ttime,x,y\n1\t0,0,0\n\n2\t0,0,0\n2\t3,0,0\n";
    let mut out = Vec::new();
    let stats = reduce_stream(Cursor::new(input), &mut out).unwrap();
    assert_eq!(stats.rows, 3);
    assert_eq!(stats.groups, 2);

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 2 * 57);
    assert_eq!(text.lines().filter(|l| l.starts_with("max_time")).count(), 2);
}

#[test]
fn reduce_stream_stops_at_malformed_row() {
    let input = "1\t0,0,0\n1\t0,0\n";
    let err = reduce_stream(Cursor::new(input), Vec::new()).unwrap_err();
    assert!(err.to_string().starts_with("line 2:"));
}

fn arb_groups() -> impl Strategy<Value = Vec<Vec<(i64, i64, i64)>>> {
    prop::collection::vec(
        prop::collection::vec((0_i64..200, -2000_i64..2000, -2000_i64..2000), 1..12),
        1..6,
    )
}

proptest! {
    #[test]
    fn each_group_counts_n_squared_pairs(groups in arb_groups()) {
        let mut reducer = BinningReducer::new();
        let mut reports = Vec::new();
        for (id, events) in (0_i64..).zip(&groups) {
            for &(t, x, y) in events {
                reports.extend(reducer.push_row(Row { group: id, t, x, y }));
            }
        }
        reports.extend(reducer.finish());

        prop_assert_eq!(reports.len(), groups.len());
        for (report, events) in reports.iter().zip(&groups) {
            let n = events.len() as u64;
            prop_assert_eq!(report.grid.total(), n * n);
        }
    }

    #[test]
    fn maxima_are_monotone_and_match_true_maximum(groups in arb_groups()) {
        let mut reducer = BinningReducer::new();
        let mut reports = Vec::new();
        for (id, events) in (0_i64..).zip(&groups) {
            for &(t, x, y) in events {
                reports.extend(reducer.push_row(Row { group: id, t, x, y }));
            }
        }
        reports.extend(reducer.finish());

        for pair in reports.windows(2) {
            prop_assert!(pair[1].maxima.max_dist >= pair[0].maxima.max_dist);
            prop_assert!(pair[1].maxima.max_time >= pair[0].maxima.max_time);
        }

        let mut max_time = 0_u64;
        let mut max_dist = 0.0_f64;
        for events in &groups {
            for a in events {
                for b in events {
                    max_time = max_time.max(a.0.abs_diff(b.0));
                    #[allow(clippy::cast_precision_loss)]
                    let d = ((a.1 - b.1) as f64).hypot((a.2 - b.2) as f64);
                    max_dist = max_dist.max(d);
                }
            }
        }
        let last = reducer.maxima();
        prop_assert_eq!(last.max_time, max_time);
        prop_assert!((last.max_dist - max_dist).abs() < 1e-9);
    }
}
