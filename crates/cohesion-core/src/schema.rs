//! Strict view of an analysis record.
//!
//! ```text
//! { "content": { "graph property": {
//!     "numV": 10, "numE": 20, "numCC": 1,
//!     "diameter": "3,4", "clusterCoeff": "0.5,0.25",
//!     "clique": "3,3\n4,4", "truss": "...", "core": "...", "dbscan": "...",
//!     "truss_coe": "...", "core_coe": "...", "dbscan_coe": "..."
//! } } }
//! ```
//!
//! Numeric lists and blobs are JSON strings that need a second parse; that
//! format is what upstream producers write and is kept as is. Every path is
//! required. Missing or mistyped fields fail with a [`SchemaError`] naming
//! the dotted path.

use serde_json::{Map, Value};

use crate::mapping::BlobField;

/// Path segments leading to the property object.
pub const PROPERTY_PATH: [&str; 2] = ["content", "graph property"];

/// A required field is absent or has the wrong JSON type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("missing field `{path}`")]
    Missing { path: String },

    #[error("field `{path}` must be {expected}")]
    Mistyped {
        path: String,
        expected: &'static str,
    },
}

impl SchemaError {
    /// Dotted path of the offending field.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Missing { path } | Self::Mistyped { path, .. } => path,
        }
    }
}

/// The `content."graph property"` object of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphProperty {
    pub num_v: u64,
    pub num_e: u64,
    pub num_cc: u64,
    /// Comma-separated per-component diameters.
    pub diameter: String,
    /// Comma-separated clustering coefficients.
    pub cluster_coeff: String,
    clique: String,
    truss: String,
    core: String,
    dbscan: String,
    truss_coe: String,
    core_coe: String,
    dbscan_coe: String,
}

impl GraphProperty {
    /// Extract the property object from a parsed record document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] for the first missing or mistyped field.
    pub fn from_document(doc: &Value) -> Result<Self, SchemaError> {
        let mut current = doc;
        let mut path = String::new();
        for segment in PROPERTY_PATH {
            push_segment(&mut path, segment);
            let object = current.as_object().ok_or_else(|| SchemaError::Mistyped {
                path: parent_path(&path),
                expected: "an object",
            })?;
            current = object
                .get(segment)
                .ok_or_else(|| SchemaError::Missing { path: path.clone() })?;
        }
        let props = current.as_object().ok_or_else(|| SchemaError::Mistyped {
            path: path.clone(),
            expected: "an object",
        })?;

        let fields = Fields { props, base: &path };
        Ok(Self {
            num_v: fields.count("numV")?,
            num_e: fields.count("numE")?,
            num_cc: fields.count("numCC")?,
            diameter: fields.string("diameter")?,
            cluster_coeff: fields.string("clusterCoeff")?,
            clique: fields.string(BlobField::Clique.json_key())?,
            truss: fields.string(BlobField::Truss.json_key())?,
            core: fields.string(BlobField::Core.json_key())?,
            dbscan: fields.string(BlobField::Dbscan.json_key())?,
            truss_coe: fields.string(BlobField::TrussCoe.json_key())?,
            core_coe: fields.string(BlobField::CoreCoe.json_key())?,
            dbscan_coe: fields.string(BlobField::DbscanCoe.json_key())?,
        })
    }

    /// Raw text of a counter blob.
    #[must_use]
    pub fn blob(&self, field: BlobField) -> &str {
        match field {
            BlobField::Clique => &self.clique,
            BlobField::Truss => &self.truss,
            BlobField::Core => &self.core,
            BlobField::Dbscan => &self.dbscan,
            BlobField::TrussCoe => &self.truss_coe,
            BlobField::CoreCoe => &self.core_coe,
            BlobField::DbscanCoe => &self.dbscan_coe,
        }
    }

    /// Dotted path of a property field, for error messages.
    #[must_use]
    pub fn field_path(key: &str) -> String {
        let mut path = PROPERTY_PATH.join(".");
        push_segment(&mut path, key);
        path
    }
}

struct Fields<'a> {
    props: &'a Map<String, Value>,
    base: &'a str,
}

impl Fields<'_> {
    fn path(&self, key: &str) -> String {
        let mut path = self.base.to_string();
        push_segment(&mut path, key);
        path
    }

    fn get(&self, key: &str) -> Result<&Value, SchemaError> {
        self.props
            .get(key)
            .ok_or_else(|| SchemaError::Missing { path: self.path(key) })
    }

    fn string(&self, key: &str) -> Result<String, SchemaError> {
        self.get(key)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SchemaError::Mistyped {
                path: self.path(key),
                expected: "a string",
            })
    }

    /// Counts are written as JSON integers by most producers and as numeric
    /// strings by a few.
    fn count(&self, key: &str) -> Result<u64, SchemaError> {
        let value = self.get(key)?;
        value
            .as_u64()
            .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
            .ok_or_else(|| SchemaError::Mistyped {
                path: self.path(key),
                expected: "a non-negative integer",
            })
    }
}

fn push_segment(path: &mut String, segment: &str) {
    if !path.is_empty() {
        path.push('.');
    }
    path.push_str(segment);
}

fn parent_path(path: &str) -> String {
    path.rsplit_once('.')
        .map_or_else(|| "$".to_string(), |(parent, _)| parent.to_string())
}
