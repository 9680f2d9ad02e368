//! Fixed time × distance histogram and run-wide maxima.
//!
//! Time deltas are bucketed in steps of [`TIME_BUCKET_WIDTH`] and distances
//! in steps of [`DIST_BUCKET_WIDTH`]; the last bucket on each axis absorbs
//! everything beyond it.

use std::fmt;

use serde::Serialize;

/// Number of time buckets (`0..=4`).
pub const TIME_BUCKETS: usize = 5;
/// Number of distance buckets (`0..=10`).
pub const DIST_BUCKETS: usize = 11;
/// Width of one time bucket, in input time units.
pub const TIME_BUCKET_WIDTH: u64 = 14;
/// Width of one distance bucket, in input coordinate units.
pub const DIST_BUCKET_WIDTH: f64 = 100.0;

/// Time bucket for an absolute time delta.
#[must_use]
pub fn time_bucket(delta: u64) -> usize {
    usize::try_from(delta / TIME_BUCKET_WIDTH)
        .unwrap_or(usize::MAX)
        .min(TIME_BUCKETS - 1)
}

/// Distance bucket for a Euclidean distance.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dist_bucket(distance: f64) -> usize {
    // Float-to-int casts saturate, so huge distances land in the last bucket.
    ((distance / DIST_BUCKET_WIDTH).floor() as usize).min(DIST_BUCKETS - 1)
}

/// Pair counts per `(time bucket, distance bucket)` cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistogramGrid {
    cells: [[u64; DIST_BUCKETS]; TIME_BUCKETS],
}

impl HistogramGrid {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [[0; DIST_BUCKETS]; TIME_BUCKETS],
        }
    }

    /// Count one pair with the given time delta and distance.
    pub fn record(&mut self, delta: u64, distance: f64) {
        self.cells[time_bucket(delta)][dist_bucket(distance)] += 1;
    }

    /// Count in one cell; out-of-range buckets read as zero.
    #[must_use]
    pub fn get(&self, time_bucket: usize, dist_bucket: usize) -> u64 {
        self.cells
            .get(time_bucket)
            .and_then(|row| row.get(dist_bucket))
            .copied()
            .unwrap_or(0)
    }

    /// Sum over all cells.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().flatten().sum()
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.cells = [[0; DIST_BUCKETS]; TIME_BUCKETS];
    }

    /// All cells as `(time bucket, distance bucket, count)`, time-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        self.cells.iter().enumerate().flat_map(|(t, row)| {
            row.iter()
                .enumerate()
                .map(move |(d, &count)| (t, d, count))
        })
    }
}

impl fmt::Display for HistogramGrid {
    /// One `t,d\tcount` line per cell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (t, d, count) in self.cells() {
            writeln!(f, "{t},{d}\t{count}")?;
        }
        Ok(())
    }
}

/// Largest distance and time delta seen over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningMaxima {
    pub max_dist: f64,
    pub max_time: u64,
}

impl RunningMaxima {
    pub fn observe(&mut self, delta: u64, distance: f64) {
        if distance > self.max_dist {
            self.max_dist = distance;
        }
        if delta > self.max_time {
            self.max_time = delta;
        }
    }
}

impl fmt::Display for RunningMaxima {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "max_dist\t{}", self.max_dist)?;
        writeln!(f, "max_time\t{}", self.max_time)
    }
}
