#![forbid(unsafe_code)]
//! cohesion-stream library.
//!
//! Reads `id\tt,x,y` rows sorted by group id and, per group, counts every
//! ordered pair of events into a 5×11 time × distance histogram. See
//! [`reducer`] for the state machine.

pub mod grid;
pub mod reducer;
pub mod row;

pub use grid::{HistogramGrid, RunningMaxima};
pub use reducer::{BinningError, BinningReducer, GroupReport, StreamStats, reduce_stream};
pub use row::{ParsedLine, Row, RowError, parse_line};
