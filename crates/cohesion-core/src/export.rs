//! Long-format export tables.
//!
//! Every distribution of the requested [`SeriesKind`] is flattened into
//! `(series, x, y)` rows, the shape an external chart renderer expects. The
//! CSV header is `data,x,y`.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::mapping::Structure;
use crate::record::{RecordDistributions, SeriesKind};

/// One point of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(rename = "data")]
    pub series: String,
    pub x: i64,
    pub y: f64,
}

/// Writing an export table failed.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write export table: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush export table: {0}")]
    Io(#[from] io::Error),
}

impl ExportError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::ExportWriteFailed
    }
}

/// Series label for `structure` under `kind` in the record called `name`.
///
/// `core` / `core_coe` for an unnamed record, `run1_core` / `run1_core_coe`
/// otherwise.
#[must_use]
pub fn series_label(name: &str, structure: Structure, kind: SeriesKind) -> String {
    let base = match kind {
        SeriesKind::Coefficient => format!("{structure}_coe"),
        SeriesKind::Occurrence | SeriesKind::Size => structure.to_string(),
    };
    if name.is_empty() {
        base
    } else {
        format!("{name}_{base}")
    }
}

/// Append the rows of one record's distributions of `kind` to `out`.
pub fn flatten_into(
    out: &mut Vec<ExportRow>,
    name: &str,
    distributions: &RecordDistributions,
    kind: SeriesKind,
) {
    for &structure in kind.structures() {
        let Some(dist) = distributions.get(kind, structure) else {
            continue;
        };
        let series = series_label(name, structure, kind);
        out.extend(dist.iter().map(|(x, y)| ExportRow {
            series: series.clone(),
            x,
            y,
        }));
    }
}

/// Rows of one record's distributions of `kind`.
#[must_use]
pub fn flatten(name: &str, distributions: &RecordDistributions, kind: SeriesKind) -> Vec<ExportRow> {
    let mut rows = Vec::with_capacity(distributions.point_count(kind));
    flatten_into(&mut rows, name, distributions, kind);
    rows
}

/// Serialize `rows` as CSV with a `data,x,y` header.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization or the underlying writer fails.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(writer);
    if rows.is_empty() {
        csv.write_record(["data", "x", "y"])?;
    }
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Write `rows` to a CSV file at `path`, replacing any existing file.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_csv_file(rows: &[ExportRow], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(rows, BufWriter::new(file))
}
