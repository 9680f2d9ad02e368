//! Group-at-a-time pairwise binning.
//!
//! Rows arrive sorted by group id. The reducer buffers the active group and,
//! when the id changes or the stream ends, counts every ordered pair of its
//! events (self-pairs included) into the [`HistogramGrid`]. The grid is
//! emitted as a [`GroupReport`] and zeroed; [`RunningMaxima`] carry over for
//! the whole run.
//!
//! Sortedness is not checked: an id that reappears after another group
//! starts a fresh group.

use std::fmt;
use std::io::{self, BufRead, Write};

use cohesion_core::error::ErrorCode;
use serde::Serialize;
use tracing::{debug, info};

use crate::grid::{HistogramGrid, RunningMaxima};
use crate::row::{ParsedLine, Row, RowError, parse_line};

/// Errors that can occur while reducing a stream.
#[derive(Debug, thiserror::Error)]
pub enum BinningError {
    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: RowError,
    },

    #[error("stream i/o failed: {0}")]
    Io(#[from] io::Error),
}

impl BinningError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Row { .. } => ErrorCode::MalformedStreamRow,
            Self::Io(_) => ErrorCode::InternalUnexpected,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Event {
    t: i64,
    x: i64,
    y: i64,
}

impl Event {
    const fn from_row(row: Row) -> Self {
        Self {
            t: row.t,
            x: row.x,
            y: row.y,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn distance(&self, other: &Self) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        dx.hypot(dy)
    }
}

#[derive(Debug)]
struct ActiveGroup {
    id: i64,
    events: Vec<Event>,
}

/// Histogram of one closed group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub group: i64,
    pub size: usize,
    pub grid: HistogramGrid,
    /// Run-wide maxima as of this flush.
    pub maxima: RunningMaxima,
}

impl fmt::Display for GroupReport {
    /// 55 `t,d\tcount` lines followed by `max_dist` and `max_time`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.grid, self.maxima)
    }
}

/// Streaming state machine over grouped rows.
#[derive(Debug, Default)]
pub struct BinningReducer {
    grid: HistogramGrid,
    maxima: RunningMaxima,
    active: Option<ActiveGroup>,
    line: usize,
    rows: usize,
    groups: usize,
}

impl BinningReducer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw input line.
    ///
    /// Header and blank lines are skipped. Returns the report of the group
    /// closed by this row, if any.
    ///
    /// # Errors
    ///
    /// Returns [`BinningError::Row`] with the 1-based line number if the
    /// line is not a valid row.
    pub fn push_line(&mut self, line: &str) -> Result<Option<GroupReport>, BinningError> {
        self.line += 1;
        let parsed = parse_line(line).map_err(|source| BinningError::Row {
            line: self.line,
            source,
        })?;
        match parsed {
            ParsedLine::Header | ParsedLine::Blank => Ok(None),
            ParsedLine::Row(row) => Ok(self.push_row(row)),
        }
    }

    /// Feed one parsed row.
    pub fn push_row(&mut self, row: Row) -> Option<GroupReport> {
        self.rows += 1;
        let event = Event::from_row(row);

        match self.active.as_mut() {
            Some(active) if active.id == row.group => {
                active.events.push(event);
                return None;
            }
            _ => {}
        }

        let closed = self.active.replace(ActiveGroup {
            id: row.group,
            events: vec![event],
        });
        closed.map(|group| self.flush(group))
    }

    /// Close the active group at end of stream.
    pub fn finish(&mut self) -> Option<GroupReport> {
        self.active.take().map(|group| self.flush(group))
    }

    #[must_use]
    pub const fn maxima(&self) -> RunningMaxima {
        self.maxima
    }

    /// Data rows consumed so far.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Groups flushed so far.
    #[must_use]
    pub const fn groups(&self) -> usize {
        self.groups
    }

    fn flush(&mut self, group: ActiveGroup) -> GroupReport {
        for a in &group.events {
            for b in &group.events {
                let delta = a.t.abs_diff(b.t);
                let distance = a.distance(b);
                self.grid.record(delta, distance);
                self.maxima.observe(delta, distance);
            }
        }

        self.groups += 1;
        debug!(
            group = group.id,
            size = group.events.len(),
            pairs = self.grid.total(),
            "group flushed"
        );

        let report = GroupReport {
            group: group.id,
            size: group.events.len(),
            grid: self.grid.clone(),
            maxima: self.maxima,
        };
        self.grid.reset();
        report
    }
}

/// Totals for one [`reduce_stream`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub rows: usize,
    pub groups: usize,
}

/// Reduce a whole stream, writing each group's dump to `writer`.
///
/// # Errors
///
/// Returns [`BinningError`] on the first malformed row or on I/O failure.
pub fn reduce_stream<R: BufRead, W: Write>(
    reader: R,
    mut writer: W,
) -> Result<StreamStats, BinningError> {
    let mut reducer = BinningReducer::new();
    for line in reader.lines() {
        if let Some(report) = reducer.push_line(&line?)? {
            write!(writer, "{report}")?;
        }
    }
    if let Some(report) = reducer.finish() {
        write!(writer, "{report}")?;
    }
    writer.flush()?;

    let stats = StreamStats {
        rows: reducer.rows(),
        groups: reducer.groups(),
    };
    info!(rows = stats.rows, groups = stats.groups, "stream reduced");
    Ok(stats)
}
