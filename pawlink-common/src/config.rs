//! Configuration loading for the pawlink pipeline
//!
//! Per-source column layouts are modeled as data (the field map), not as
//! per-source branching code: adding a new source dataset is a configuration
//! addition, not new logic.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Character encoding of a source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    Latin1,
}

/// Which source columns feed each match key.
///
/// Column names are given in their post-ingest normalized form (lowercase,
/// whitespace and periods replaced with underscores).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMap {
    /// One column, or an ordered pair (e.g. last + first) joined with a space
    pub name_columns: Vec<String>,
    pub email_column: Option<String>,
    pub cell_column: Option<String>,
    pub phone_column: Option<String>,
    /// Ordered address components; varies per source (petpoint has eight,
    /// the CRM four, the volunteer system six)
    #[serde(default)]
    pub address_columns: Vec<String>,
}

/// One source dataset to ingest and link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source name, used in links and as the normalized-table name prefix
    pub name: String,
    /// Path to the delimited source file
    pub path: PathBuf,
    #[serde(default)]
    pub encoding: Encoding,
    /// Some exports prepend an unnamed index column
    #[serde(default)]
    pub drop_first_column: bool,
    pub field_map: FieldMap,
}

/// Top-level pipeline configuration
///
/// Sources are processed strictly in the order listed (e.g. CRM first to seed
/// the master table, then the shelter system, then the volunteer system).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// SQLite database file receiving normalized tables and the master table
    pub database_path: PathBuf,
    pub sources: Vec<SourceConfig>,
}

impl PipelineConfig {
    /// Parse and validate a TOML configuration string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(Error::Config("No sources configured".to_string()));
        }
        for source in &self.sources {
            if source.name.is_empty()
                || !source
                    .name
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                // Source names become table-name prefixes
                return Err(Error::Config(format!(
                    "Source name '{}' must be non-empty lowercase [a-z0-9_]",
                    source.name
                )));
            }
            let n = source.field_map.name_columns.len();
            if n == 0 || n > 2 {
                return Err(Error::Config(format!(
                    "Source '{}': name_columns must list one column or an ordered pair, got {}",
                    source.name, n
                )));
            }
        }
        Ok(())
    }
}

/// Configuration file resolution following priority order:
/// 1. Command-line argument (highest priority)
/// 2. `PAWLINK_CONFIG` environment variable
/// 3. `pawlink.toml` in the working directory (fallback)
pub fn resolve_config_path(cli_arg: Option<&str>) -> PathBuf {
    if let Some(path) = cli_arg {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("PAWLINK_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("pawlink.toml")
}
