//! Error types for table ingestion.

use std::path::{Path, PathBuf};
use thiserror::Error;

use pomedos_model::ModelError;

/// Errors that can occur while loading source tables.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// CSV file not found.
    #[error("CSV file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File starts with a byte-order mark we cannot decode.
    #[error("unsupported encoding {encoding} in {path} (expected UTF-8)")]
    UnsupportedEncoding {
        path: PathBuf,
        encoding: &'static str,
    },

    // === CSV Parsing Errors ===
    /// Failed to parse CSV.
    #[error("failed to parse CSV {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// CSV file is empty or has no valid rows.
    #[error("CSV file is empty: {path}")]
    EmptyCsv { path: PathBuf },

    /// Header rows do not have the expected layout.
    #[error("unexpected header layout in {path}: {reason}")]
    HeaderFormat { path: PathBuf, reason: String },

    /// Required column not found.
    #[error("required column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// A cell or header could not be interpreted.
    #[error("invalid {field} value '{value}' in {path} (row {row})")]
    InvalidValue {
        field: String,
        value: String,
        path: PathBuf,
        row: usize,
    },

    /// The same key appears twice.
    #[error("duplicate {key} in {path}")]
    DuplicateKey { key: String, path: PathBuf },

    /// Fine brackets could not be folded into the standard brackets.
    #[error("cannot fold age brackets of {context} in {path}: {source}")]
    BracketFold {
        path: PathBuf,
        context: String,
        #[source]
        source: ModelError,
    },

    /// Loader options are unusable.
    #[error("invalid ingest option: {message}")]
    InvalidOption { message: String },

    // === DataFrame Errors ===
    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl IngestError {
    /// Maps an I/O failure on `path`, distinguishing a missing file.
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub(crate) fn csv(path: &Path, source: &csv::Error) -> Self {
        Self::CsvParse {
            path: path.to_path_buf(),
            message: source.to_string(),
        }
    }

    pub(crate) fn invalid(
        field: impl Into<String>,
        value: impl Into<String>,
        path: &Path,
        row: usize,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            path: path.to_path_buf(),
            row,
        }
    }
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::FileNotFound {
            path: PathBuf::from("/data/deaths.csv"),
        };
        assert_eq!(err.to_string(), "CSV file not found: /data/deaths.csv");
    }

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let source = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = IngestError::io(Path::new("missing.csv"), source);
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("Jahr".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }
}
