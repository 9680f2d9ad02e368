//! Binding of cohesive-subgraph structures to record fields.
//!
//! Historical records were consumed with the `core` and `dbscan` fields
//! crossed: the k-core series was read from the `dbscan` blobs and the
//! dbscan series from the `core` blobs. Whether that reflects the producer's
//! real layout or a consumer bug has not been confirmed against upstream
//! data, so both bindings are available as named presets and the choice is
//! always explicit.
//!
//! | structure | `crossed` occurrence / coefficient | `direct` occurrence / coefficient |
//! |-----------|------------------------------------|-----------------------------------|
//! | clique    | `clique` / none                    | `clique` / none                   |
//! | truss     | `truss` / `truss_coe`              | `truss` / `truss_coe`             |
//! | core      | `dbscan` / `dbscan_coe`            | `core` / `core_coe`               |
//! | dbscan    | `core` / `core_coe`                | `dbscan` / `dbscan_coe`           |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A family of cohesive subgraphs tracked per K.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Structure {
    Clique,
    Truss,
    Core,
    Dbscan,
}

impl Structure {
    /// Export order for occurrence and size tables.
    pub const EXPORT_ORDER: [Self; 4] = [Self::Truss, Self::Clique, Self::Core, Self::Dbscan];

    /// Export order for coefficient tables (no clique coefficient exists).
    pub const COEFFICIENT_ORDER: [Self; 3] = [Self::Truss, Self::Core, Self::Dbscan];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clique => "clique",
            Self::Truss => "truss",
            Self::Core => "core",
            Self::Dbscan => "dbscan",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Clique => 0,
            Self::Truss => 1,
            Self::Core => 2,
            Self::Dbscan => 3,
        }
    }
}

impl fmt::Display for Structure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `"key,value"` blob field under `content."graph property"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlobField {
    Clique,
    Truss,
    Core,
    Dbscan,
    TrussCoe,
    CoreCoe,
    DbscanCoe,
}

impl BlobField {
    pub const ALL: [Self; 7] = [
        Self::Clique,
        Self::Truss,
        Self::Core,
        Self::Dbscan,
        Self::TrussCoe,
        Self::CoreCoe,
        Self::DbscanCoe,
    ];

    /// JSON key of the field.
    #[must_use]
    pub const fn json_key(self) -> &'static str {
        match self {
            Self::Clique => "clique",
            Self::Truss => "truss",
            Self::Core => "core",
            Self::Dbscan => "dbscan",
            Self::TrussCoe => "truss_coe",
            Self::CoreCoe => "core_coe",
            Self::DbscanCoe => "dbscan_coe",
        }
    }
}

/// Named field-binding presets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingPreset {
    /// `core` and `dbscan` read each other's fields, as historical reports did.
    #[default]
    Crossed,
    /// Every structure reads the field of the same name.
    Direct,
}

impl MappingPreset {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crossed => "crossed",
            Self::Direct => "direct",
        }
    }
}

impl fmt::Display for MappingPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The preset name is not one of `crossed`, `direct`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown field mapping '{0}' (expected `crossed` or `direct`)")]
pub struct UnknownPreset(pub String);

impl FromStr for MappingPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crossed" => Ok(Self::Crossed),
            "direct" => Ok(Self::Direct),
            other => Err(UnknownPreset(other.to_string())),
        }
    }
}

/// One row of a [`FieldMapping`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub structure: Structure,
    /// Blob reduced into the occurrence and size distributions.
    pub occurrence: BlobField,
    /// Blob reduced into the coefficient distribution, if the structure has one.
    pub coefficient: Option<BlobField>,
}

/// Table binding each [`Structure`] to the blobs it is reduced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    preset: MappingPreset,
    rows: [Binding; 4],
}

const CROSSED: FieldMapping = FieldMapping {
    preset: MappingPreset::Crossed,
    rows: [
        Binding {
            structure: Structure::Clique,
            occurrence: BlobField::Clique,
            coefficient: None,
        },
        Binding {
            structure: Structure::Truss,
            occurrence: BlobField::Truss,
            coefficient: Some(BlobField::TrussCoe),
        },
        Binding {
            structure: Structure::Core,
            occurrence: BlobField::Dbscan,
            coefficient: Some(BlobField::DbscanCoe),
        },
        Binding {
            structure: Structure::Dbscan,
            occurrence: BlobField::Core,
            coefficient: Some(BlobField::CoreCoe),
        },
    ],
};

const DIRECT: FieldMapping = FieldMapping {
    preset: MappingPreset::Direct,
    rows: [
        Binding {
            structure: Structure::Clique,
            occurrence: BlobField::Clique,
            coefficient: None,
        },
        Binding {
            structure: Structure::Truss,
            occurrence: BlobField::Truss,
            coefficient: Some(BlobField::TrussCoe),
        },
        Binding {
            structure: Structure::Core,
            occurrence: BlobField::Core,
            coefficient: Some(BlobField::CoreCoe),
        },
        Binding {
            structure: Structure::Dbscan,
            occurrence: BlobField::Dbscan,
            coefficient: Some(BlobField::DbscanCoe),
        },
    ],
};

impl FieldMapping {
    #[must_use]
    pub const fn from_preset(preset: MappingPreset) -> Self {
        match preset {
            MappingPreset::Crossed => CROSSED,
            MappingPreset::Direct => DIRECT,
        }
    }

    #[must_use]
    pub const fn preset(&self) -> MappingPreset {
        self.preset
    }

    /// Every binding, in `clique, truss, core, dbscan` order.
    #[must_use]
    pub const fn bindings(&self) -> &[Binding; 4] {
        &self.rows
    }

    #[must_use]
    pub const fn binding(&self, structure: Structure) -> Binding {
        self.rows[structure.index()]
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::from_preset(MappingPreset::default())
    }
}
