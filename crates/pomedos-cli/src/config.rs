//! Configuration file handling and data directory resolution.
//!
//! ```toml
//! [data]
//! deaths = "Todesursachen.csv"
//! population = "Bevoelkerung.csv"
//! standard = "European Standard Population.csv"
//! all_cause_label = "Insgesamt"
//!
//! [ingest]
//! delimiter = ";"
//! group_column = "Geschlecht"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use pomedos_ingest::{DEATHS_FILE, IngestOptions, POPULATION_FILE, SourcePaths};
use pomedos_store::DEFAULT_ALL_CAUSE_LABEL;

/// Environment variable for overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "POMEDOS_DATA_DIR";

/// Data directory used when neither the flag nor the variable is set.
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Configuration file looked up inside the data directory.
pub const CONFIG_FILE: &str = "pomedos.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub ingest: IngestOptions,
}

/// Source table locations, relative to the data directory unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_deaths")]
    pub deaths: PathBuf,

    #[serde(default = "default_population")]
    pub population: PathBuf,

    /// Standard population table; the embedded ESP 2013 weights when unset.
    #[serde(default)]
    pub standard: Option<PathBuf>,

    /// Cause label of the all-cause rows.
    #[serde(default = "default_all_cause_label")]
    pub all_cause_label: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            deaths: default_deaths(),
            population: default_population(),
            standard: None,
            all_cause_label: default_all_cause_label(),
        }
    }
}

fn default_deaths() -> PathBuf {
    PathBuf::from(DEATHS_FILE)
}

fn default_population() -> PathBuf {
    PathBuf::from(POPULATION_FILE)
}

fn default_all_cause_label() -> String {
    DEFAULT_ALL_CAUSE_LABEL.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads `explicit` if given, else `pomedos.toml` in `data_dir` if it
    /// exists, else the defaults.
    pub fn discover(data_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidate = data_dir.join(CONFIG_FILE);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "using config file from data directory");
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolves the table locations against `data_dir`.
    pub fn source_paths(&self, data_dir: &Path) -> SourcePaths {
        SourcePaths {
            deaths: data_dir.join(&self.data.deaths),
            population: data_dir.join(&self.data.population),
            standard: self.data.standard.as_ref().map(|path| data_dir.join(path)),
        }
    }
}

/// Get the data directory.
///
/// Resolution order:
/// 1. `--data-dir`
/// 2. `POMEDOS_DATA_DIR` environment variable
/// 3. `./Data`
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    resolve_data_dir_from(flag, std::env::var(DATA_DIR_ENV_VAR).ok())
}

fn resolve_data_dir_from(flag: Option<&Path>, env: Option<String>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    match env {
        Some(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_DATA_DIR),
    }
}
