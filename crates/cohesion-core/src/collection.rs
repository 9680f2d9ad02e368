//! Collection aggregator: every matching record of a directory.
//!
//! Loading is tolerant of partial failure. A record that cannot be read,
//! parsed or reduced is logged and skipped, and the rest of the directory is
//! still loaded. Members are kept sorted by file name so exports come out in
//! the same order on every run.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ErrorCode;
use crate::export::{self, ExportRow};
use crate::mapping::FieldMapping;
use crate::record::{Record, RecordError, SeriesKind};

/// Extension of analysis record files.
pub const RECORD_EXTENSION: &str = "json";

/// The directory itself could not be listed.
#[derive(Debug, thiserror::Error)]
#[error("failed to list {}: {source}", path.display())]
pub struct ListError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl ListError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::RecordUnreadable
    }
}

/// A record file that was skipped during a batch load.
#[derive(Debug)]
pub struct SkippedRecord {
    pub file: String,
    pub error: RecordError,
}

/// List record files in `dir` whose file name contains `filter`, sorted by
/// name.
///
/// # Errors
///
/// Returns [`ListError`] if `dir` cannot be read.
pub fn list_records(dir: &Path, filter: &str) -> Result<Vec<PathBuf>, ListError> {
    let entries = fs::read_dir(dir).map_err(|source| ListError {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry_path(dir, entry))
        .filter(|path| path.is_file())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(RECORD_EXTENSION))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(filter))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Reduced records keyed by source file name.
#[derive(Debug, Default)]
pub struct Collection {
    members: BTreeMap<String, Record>,
    skipped: Vec<SkippedRecord>,
}

impl Collection {
    /// Load every record in `dir` whose file name contains `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError`] only if the directory itself cannot be listed;
    /// per-file failures are recorded in [`Collection::skipped`].
    pub fn load(dir: &Path, filter: &str, mapping: &FieldMapping) -> Result<Self, ListError> {
        let mut collection = Self::default();
        for path in list_records(dir, filter)? {
            let file = file_key(&path);
            match Record::load(&path, mapping) {
                Ok(record) => {
                    debug!(file = %file, "loaded record");
                    collection.members.insert(file, record);
                }
                Err(error) => {
                    warn!(
                        file = %file,
                        code = %error.code(),
                        error = %error,
                        "data corruption; skipping record"
                    );
                    collection.skipped.push(SkippedRecord { file, error });
                }
            }
        }

        info!(
            dir = %dir.display(),
            filter,
            loaded = collection.members.len(),
            skipped = collection.skipped.len(),
            "collection loaded"
        );
        Ok(collection)
    }

    /// Build a collection from already-reduced records.
    pub fn from_records(records: impl IntoIterator<Item = (String, Record)>) -> Self {
        Self {
            members: records.into_iter().collect(),
            skipped: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn get(&self, file: &str) -> Option<&Record> {
        self.members.get(file)
    }

    /// Members in file-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.members.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Files that failed to load.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// Number of files that failed to load.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.skipped.len()
    }

    /// Flatten the distributions of `kind` across all members.
    ///
    /// Rows are grouped by member (file-name order), then by structure in
    /// export order, then by distribution order.
    #[must_use]
    pub fn export_rows(&self, kind: SeriesKind) -> Vec<ExportRow> {
        let total = self
            .members
            .values()
            .map(|r| r.distributions.point_count(kind))
            .sum();
        let mut rows = Vec::with_capacity(total);
        for record in self.members.values() {
            export::flatten_into(&mut rows, record.name(), &record.distributions, kind);
        }
        rows
    }
}

/// Path of a listed entry; entries that cannot be read are logged and
/// dropped.
fn entry_path(dir: &Path, entry: io::Result<fs::DirEntry>) -> Option<PathBuf> {
    match entry {
        Ok(entry) => Some(entry.path()),
        Err(error) => {
            warn!(
                dir = %dir.display(),
                code = %ErrorCode::RecordUnreadable,
                error = %error,
                "unreadable directory entry; skipping"
            );
            None
        }
    }
}

fn file_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const VALID: &str = r#"{"content": {"graph property": {
        "numV": 3, "numE": 3, "numCC": 1,
        "diameter": "1", "clusterCoeff": "1",
        "clique": "3,3\n", "truss": "3,3\n", "core": "2,3\n", "dbscan": "1,3\n",
        "truss_coe": "3,1\n", "core_coe": "2,1\n", "dbscan_coe": "1,1\n"
    }}}"#;

    #[test]
    fn list_filters_by_extension_and_substring() {
        let dir = TempDir::new().unwrap();
        for name in ["b_long.json", "a_long.json", "a_short.json", "long.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("dir_long.json")).unwrap();

        let listed: Vec<String> = list_records(dir.path(), "long")
            .unwrap()
            .iter()
            .map(|p| file_key(p))
            .collect();
        assert_eq!(listed, ["a_long.json", "b_long.json"]);
    }

    #[test]
    fn unreadable_entry_is_dropped() {
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(entry_path(Path::new("runs"), Err(denied)), None);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = list_records(&dir.path().join("nope"), "").unwrap_err();
        assert!(err.to_string().contains("nope"));
    }

    #[test]
    fn skipped_records_are_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("good.json"), VALID).unwrap();
        fs::write(dir.path().join("bad.json"), "{").unwrap();

        let coll = Collection::load(dir.path(), "", &FieldMapping::default()).unwrap();
        assert_eq!(coll.len(), 1);
        assert!(coll.get("good.json").is_some());
        assert_eq!(coll.failures(), 1);
        assert_eq!(coll.skipped()[0].file, "bad.json");
    }

    #[test]
    fn export_rows_cover_all_members() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), VALID).unwrap();
        fs::write(dir.path().join("b.json"), VALID).unwrap();
        let coll = Collection::load(dir.path(), "", &FieldMapping::default()).unwrap();

        let rows = coll.export_rows(SeriesKind::Occurrence);
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].series, "a_truss");
        assert_eq!(rows[4].series, "b_truss");
    }
}
