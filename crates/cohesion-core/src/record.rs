//! Record aggregator: one analysis record in, one summary and its
//! distributions out.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::counter::{self, CounterError, CounterMode, Tally};
use crate::distribution::{self, Distribution, DivisionError};
use crate::error::ErrorCode;
use crate::export::{self, ExportRow};
use crate::mapping::{FieldMapping, Structure};
use crate::moments::{Moments, NumericListError, Spread, parse_numeric_list};
use crate::schema::{GraphProperty, SchemaError};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to turn one record into statistics.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("field `{path}`: {source}")]
    Counter {
        path: String,
        #[source]
        source: CounterError,
    },

    #[error("field `{path}`: {source}")]
    NumericList {
        path: String,
        #[source]
        source: NumericListError,
    },

    #[error("{structure} {kind} distribution: {source}")]
    Division {
        structure: Structure,
        kind: SeriesKind,
        #[source]
        source: DivisionError,
    },
}

impl RecordError {
    /// Stable error code for this failure class.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io { .. } => ErrorCode::RecordUnreadable,
            Self::Json(_) => ErrorCode::MalformedJson,
            Self::Schema(_) => ErrorCode::SchemaMismatch,
            Self::Counter { .. } => ErrorCode::MalformedCounter,
            Self::NumericList { .. } => ErrorCode::MalformedNumericList,
            Self::Division { .. } => ErrorCode::ZeroFrequency,
        }
    }

    /// `true` for malformed JSON or malformed nested text.
    #[must_use]
    pub const fn is_parse_error(&self) -> bool {
        matches!(
            self,
            Self::Json(_) | Self::Counter { .. } | Self::NumericList { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Scalar summary of one dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordSummary {
    pub name: String,
    pub num_v: u64,
    pub num_e: u64,
    pub num_cc: u64,
    pub diameter: Spread,
    pub cluster_coeff: Spread,
}

impl RecordSummary {
    /// Column names of [`RecordSummary::summary_line`].
    pub const COLUMNS: [&'static str; 8] = [
        "name",
        "numV",
        "numE",
        "numCC",
        "avgDiam",
        "varDiam",
        "avgCluCoeff",
        "varCluCoeff",
    ];

    /// `name,numV,numE,numCC,avgDiam,varDiam,avgCluCoeff,varCluCoeff`, with
    /// the four float columns at two decimal places.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{},{},{},{},{:.2},{:.2},{:.2},{:.2}",
            self.name,
            self.num_v,
            self.num_e,
            self.num_cc,
            self.diameter.mean,
            self.diameter.variance,
            self.cluster_coeff.mean,
            self.cluster_coeff.variance,
        )
    }
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Which family of distributions to read or export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Number of subgraphs found at each K.
    Occurrence,
    /// Mean subgraph size at each K.
    Size,
    /// Mean coefficient at each K.
    Coefficient,
}

impl SeriesKind {
    pub const ALL: [Self; 3] = [Self::Occurrence, Self::Size, Self::Coefficient];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Occurrence => "occurrence",
            Self::Size => "size",
            Self::Coefficient => "coefficient",
        }
    }

    /// Structures exported for this kind, in export order.
    #[must_use]
    pub const fn structures(self) -> &'static [Structure] {
        match self {
            Self::Occurrence | Self::Size => &Structure::EXPORT_ORDER,
            Self::Coefficient => &Structure::COEFFICIENT_ORDER,
        }
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All distributions derived for one structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructureSeries {
    pub occurrence: Distribution,
    pub size: Distribution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<Distribution>,
}

/// Occurrence, size-mean and coefficient distributions of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordDistributions {
    pub clique: StructureSeries,
    pub truss: StructureSeries,
    pub core: StructureSeries,
    pub dbscan: StructureSeries,
}

impl RecordDistributions {
    #[must_use]
    pub const fn series(&self, structure: Structure) -> &StructureSeries {
        match structure {
            Structure::Clique => &self.clique,
            Structure::Truss => &self.truss,
            Structure::Core => &self.core,
            Structure::Dbscan => &self.dbscan,
        }
    }

    fn series_mut(&mut self, structure: Structure) -> &mut StructureSeries {
        match structure {
            Structure::Clique => &mut self.clique,
            Structure::Truss => &mut self.truss,
            Structure::Core => &mut self.core,
            Structure::Dbscan => &mut self.dbscan,
        }
    }

    /// The distribution of `kind` for `structure`; `None` for the clique
    /// coefficient, which records do not carry.
    #[must_use]
    pub fn get(&self, kind: SeriesKind, structure: Structure) -> Option<&Distribution> {
        let series = self.series(structure);
        match kind {
            SeriesKind::Occurrence => Some(&series.occurrence),
            SeriesKind::Size => Some(&series.size),
            SeriesKind::Coefficient => series.coefficient.as_ref(),
        }
    }

    /// Total number of points across the exported distributions of `kind`.
    #[must_use]
    pub fn point_count(&self, kind: SeriesKind) -> usize {
        kind.structures()
            .iter()
            .filter_map(|&s| self.get(kind, s))
            .map(Distribution::len)
            .sum()
    }

    /// Long-format rows of `kind`, labelled with the record `name`.
    #[must_use]
    pub fn export_rows(&self, name: &str, kind: SeriesKind) -> Vec<ExportRow> {
        export::flatten(name, self, kind)
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// A fully reduced analysis record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub summary: RecordSummary,
    pub distributions: RecordDistributions,
}

impl Record {
    /// Read and reduce the record at `path`. The summary is named after the
    /// file stem.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if the file cannot be read or reduced.
    pub fn load(path: &Path, mapping: &FieldMapping) -> Result<Self, RecordError> {
        let text = fs::read_to_string(path).map_err(|source| RecordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&record_name(path), &text, mapping)
    }

    /// Reduce a record held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] for malformed JSON, schema mismatches,
    /// malformed nested text, or zero occurrence counts.
    pub fn from_json_str(
        name: &str,
        text: &str,
        mapping: &FieldMapping,
    ) -> Result<Self, RecordError> {
        let doc: Value = serde_json::from_str(text)?;
        Self::from_document(name, &doc, mapping)
    }

    /// Reduce an already-parsed record document.
    ///
    /// # Errors
    ///
    /// See [`Record::from_json_str`].
    pub fn from_document(
        name: &str,
        doc: &Value,
        mapping: &FieldMapping,
    ) -> Result<Self, RecordError> {
        let props = GraphProperty::from_document(doc)?;

        let summary = RecordSummary {
            name: name.to_string(),
            num_v: props.num_v,
            num_e: props.num_e,
            num_cc: props.num_cc,
            diameter: spread_of(name, "diameter", &props.diameter)?,
            cluster_coeff: spread_of(name, "clusterCoeff", &props.cluster_coeff)?,
        };

        let mut distributions = RecordDistributions::default();
        for binding in mapping.bindings() {
            let key = binding.occurrence.json_key();
            let tally = Tally::scan(props.blob(binding.occurrence), CounterMode::Sum)
                .map_err(|source| counter_error(key, source))?;

            let occurrence = tally.frequency();
            let size = distribution::size_means(&occurrence, &tally.sums()).map_err(|source| {
                RecordError::Division {
                    structure: binding.structure,
                    kind: SeriesKind::Size,
                    source,
                }
            })?;

            let coefficient = match binding.coefficient {
                Some(field) => {
                    let coe_key = field.json_key();
                    let sums = counter::reduce(props.blob(field), CounterMode::Sum)
                        .map_err(|source| counter_error(coe_key, source))?;
                    let means = distribution::size_means(&occurrence, &sums).map_err(
                        |source| RecordError::Division {
                            structure: binding.structure,
                            kind: SeriesKind::Coefficient,
                            source,
                        },
                    )?;
                    Some(means)
                }
                None => None,
            };

            debug!(
                record = name,
                structure = %binding.structure,
                field = key,
                keys = occurrence.len(),
                "reduced structure"
            );

            *distributions.series_mut(binding.structure) = StructureSeries {
                occurrence,
                size,
                coefficient,
            };
        }

        Ok(Self {
            summary,
            distributions,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.summary.name
    }
}

/// Summary name for a record file: its stem (`runs/a_200.json` → `a_200`).
#[must_use]
pub fn record_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn counter_error(key: &str, source: CounterError) -> RecordError {
    RecordError::Counter {
        path: GraphProperty::field_path(key),
        source,
    }
}

fn spread_of(name: &str, key: &str, raw: &str) -> Result<Spread, RecordError> {
    let values = parse_numeric_list(raw).map_err(|source| RecordError::NumericList {
        path: GraphProperty::field_path(key),
        source,
    })?;
    if values.is_empty() {
        warn!(record = name, field = key, "numeric list is empty; mean and variance are NaN");
    }
    Ok(values.into_iter().collect::<Moments>().spread())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
