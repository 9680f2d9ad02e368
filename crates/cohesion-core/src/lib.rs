#![forbid(unsafe_code)]
//! cohesion-core library.
//!
//! Reduces per-graph analysis records (vertex/edge counts, diameters,
//! clustering coefficients and `"K,value"` blobs for cliques, k-trusses,
//! k-cores and dbscan clusters) into K-keyed distributions, summary scalars
//! and long-format export tables.
//!
//! # Conventions
//!
//! - **Errors**: Typed `thiserror` enums per module; each maps to an
//!   [`error::ErrorCode`].
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`).

pub mod collection;
pub mod config;
pub mod counter;
pub mod distribution;
pub mod error;
pub mod export;
pub mod mapping;
pub mod moments;
pub mod record;
pub mod render;
pub mod schema;

pub use collection::Collection;
pub use distribution::Distribution;
pub use export::ExportRow;
pub use mapping::{FieldMapping, MappingPreset, Structure};
pub use record::{Record, RecordDistributions, RecordError, RecordSummary, SeriesKind};
