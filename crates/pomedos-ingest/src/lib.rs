//! Mortality table ingestion.
//!
//! Loads the three source tables of the pipeline from CSV exports:
//!
//! - **Deaths**: two header rows (sex, age bracket), one row per year and
//!   cause, read with the `csv` crate into [`DeathRecord`]s
//! - **Population**: one row per year with one column per age band, read
//!   with Polars and folded into the seven standard brackets
//! - **Standard population**: bracket label and weight, folded the same way;
//!   the embedded ESP 2013 table is used when no file is given
//!
//! Placeholder cells (`-`, `.`, empty) load as zero. This is the only place
//! in the pipeline where a value is replaced.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use pomedos_ingest::{IngestOptions, SourcePaths, load_sources};
//!
//! let paths = SourcePaths::in_directory(Path::new("Data"));
//! let sources = load_sources(&paths, &IngestOptions::default())?;
//! ```

use std::path::{Path, PathBuf};

use pomedos_model::{DeathRecord, PopulationTable, StandardPopulation};

mod csv;
mod deaths;
mod error;
mod options;
mod population;
mod standard;

// === Error Types ===
pub use error::{IngestError, Result};

// === Options ===
pub use options::IngestOptions;

// === CSV Reading ===
pub use crate::csv::{DeathHeaders, read_csv_table};

// === Table Loaders ===
pub use deaths::{load_deaths, read_deaths};
pub use population::{load_population, population_from_frame};
pub use standard::{load_standard_population, read_standard_population};

/// File name of the cause-of-death table inside a data directory.
pub const DEATHS_FILE: &str = "Todesursachen.csv";
/// File name of the population table inside a data directory.
pub const POPULATION_FILE: &str = "Bevoelkerung.csv";

/// Locations of the source tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub deaths: PathBuf,
    pub population: PathBuf,
    /// `None` selects the embedded ESP 2013 weights.
    pub standard: Option<PathBuf>,
}

impl SourcePaths {
    /// Default file names inside `dir`.
    pub fn in_directory(dir: &Path) -> Self {
        Self {
            deaths: dir.join(DEATHS_FILE),
            population: dir.join(POPULATION_FILE),
            standard: None,
        }
    }
}

/// All three tables, loaded.
#[derive(Debug, Clone)]
pub struct SourceTables {
    pub deaths: Vec<DeathRecord>,
    pub population: PopulationTable,
    pub standard: StandardPopulation,
}

/// Loads the three tables named by `paths`.
pub fn load_sources(paths: &SourcePaths, options: &IngestOptions) -> Result<SourceTables> {
    let _span = tracing::info_span!("load_sources").entered();
    Ok(SourceTables {
        deaths: load_deaths(&paths.deaths, options)?,
        population: load_population(&paths.population, options)?,
        standard: load_standard_population(paths.standard.as_deref(), options)?,
    })
}
