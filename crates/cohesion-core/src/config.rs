use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::mapping::{FieldMapping, MappingPreset};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cohesion.toml";

/// Default interpreter for chart scripts.
pub const DEFAULT_RENDER_PROGRAM: &str = "Rscript";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("prefix config {} has no `{missing}` line", path.display())]
    PrefixIncomplete {
        path: PathBuf,
        missing: &'static str,
    },
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::PrefixIncomplete { .. } => ErrorCode::PrefixConfigInvalid,
        }
    }
}

// ---------------------------------------------------------------------------
// cohesion.toml
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub record: RecordConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    #[serde(default)]
    pub field_mapping: MappingPreset,
}

impl RecordConfig {
    #[must_use]
    pub const fn mapping(&self) -> FieldMapping {
        FieldMapping::from_preset(self.field_mapping)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_render_program")]
    pub program: String,
    /// Chart script; charts are only rendered when this is set.
    #[serde(default)]
    pub script: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: default_render_program(),
            script: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_render_program() -> String {
    DEFAULT_RENDER_PROGRAM.to_string()
}

/// Load the config at `path`.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<Config>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load `cohesion.toml` from `dir`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but is unreadable or invalid.
pub fn load_default_config(dir: &Path) -> Result<Config, ConfigError> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(&path)
}

// ---------------------------------------------------------------------------
// Prefix config
// ---------------------------------------------------------------------------

/// Directory and filename filter for a collection run.
///
/// The file is line based:
///
/// ```text
/// directory /data/runs/
/// prefix    long_
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixConfig {
    pub directory: PathBuf,
    pub prefix: String,
}

impl PrefixConfig {
    /// Parse prefix-config text. Lines whose first word is `directory` or
    /// `prefix` set the matching field (the last one wins); anything else is
    /// ignored. Returns the first missing key on failure.
    ///
    /// # Errors
    ///
    /// Returns the name of a required key that never appeared.
    pub fn parse(text: &str) -> Result<Self, &'static str> {
        let mut directory = None;
        let mut prefix = None;

        for line in text.lines() {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("directory"), Some(value)) => directory = Some(PathBuf::from(value)),
                (Some("prefix"), Some(value)) => prefix = Some(value.to_string()),
                _ => {}
            }
        }

        Ok(Self {
            directory: directory.ok_or("directory")?,
            prefix: prefix.ok_or("prefix")?,
        })
    }

    /// Read and parse a prefix-config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file is unreadable or incomplete.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|missing| ConfigError::PrefixIncomplete {
            path: path.to_path_buf(),
            missing,
        })
    }

    /// Output path `<directory>/<prefix><suffix>.<extension>`.
    #[must_use]
    pub fn output_path(&self, suffix: &str, extension: &str) -> PathBuf {
        self.directory
            .join(format!("{}{suffix}.{extension}", self.prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.record.field_mapping, MappingPreset::Crossed);
        assert_eq!(config.render.program, "Rscript");
        assert!(config.render.script.is_none());
        assert!(config.export.enabled);
    }

    #[test]
    fn config_sections_parse() {
        let config: Config = toml::from_str(
            "[record]\nfield_mapping = \"direct\"\n\n[render]\nscript = \"plot.R\"\n\n[export]\nenabled = false\n",
        )
        .unwrap();
        assert_eq!(config.record.field_mapping, MappingPreset::Direct);
        assert_eq!(config.render.script, Some(PathBuf::from("plot.R")));
        assert_eq!(config.render.program, "Rscript");
        assert!(!config.export.enabled);
    }

    #[test]
    fn unknown_mapping_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "[record]\nfield_mapping = \"sideways\"\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
    }

    #[test]
    fn absent_default_config_is_default() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_default_config(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn prefix_config_parses_both_keys() {
        let cfg = PrefixConfig::parse("directory /data/runs\nprefix long_\n").unwrap();
        assert_eq!(cfg.directory, PathBuf::from("/data/runs"));
        assert_eq!(cfg.prefix, "long_");
    }

    #[test]
    fn prefix_config_last_line_wins_and_ignores_noise() {
        let cfg = PrefixConfig::parse("# runs\ndirectory a\nprefix x\ndirectory b\n").unwrap();
        assert_eq!(cfg.directory, PathBuf::from("b"));
    }

    #[test]
    fn prefix_config_requires_both_keys() {
        assert_eq!(PrefixConfig::parse("directory a\n"), Err("prefix"));
        assert_eq!(PrefixConfig::parse("prefix a\n"), Err("directory"));
    }

    #[test]
    fn incomplete_prefix_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runs.cfg");
        fs::write(&path, "prefix a\n").unwrap();
        let err = PrefixConfig::load(&path).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PrefixConfigInvalid);
        assert!(err.to_string().contains("`directory`"));
    }

    #[test]
    fn output_path_joins_prefix_and_suffix() {
        let cfg = PrefixConfig {
            directory: PathBuf::from("out"),
            prefix: "long_".to_string(),
        };
        assert_eq!(
            cfg.output_path("_size", "csv"),
            PathBuf::from("out").join("long__size.csv")
        );
    }
}
