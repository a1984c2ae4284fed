//! Error types for the standardization engine.

use thiserror::Error;

use pomedos_model::{AgeBracket, ModelError, Year};
use pomedos_store::StoreError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Folded deaths, population and weights do not cover the same seven
    /// brackets. Never skipped: a misalignment corrupts every rate.
    #[error("bracket alignment failed for {year}: {reason}")]
    BracketAlignment { year: Year, reason: String },

    #[error("zero population in bracket {bracket} for {year}")]
    DivisionByZero { year: Year, bracket: String },

    #[error("invalid year range {start}..={end}")]
    InvalidYearRange { start: Year, end: Year },

    #[error("bracket {bracket} not found in the {year} breakdown")]
    MissingBracket { year: Year, bracket: AgeBracket },

    #[error("no years selected")]
    EmptyYearSelection,

    #[error("year {year} is not in the share table")]
    MissingShareYear { year: Year },

    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },
}

impl EngineError {
    pub(crate) fn alignment(year: Year, source: &ModelError) -> Self {
        let reason = match source {
            ModelError::BracketAlignment { reason } => reason.clone(),
            other => other.to_string(),
        };
        Self::BracketAlignment { year, reason }
    }

    /// Whether the error concerns the data of a single year, so that the
    /// year can be skipped without affecting the others.
    pub fn is_per_year(&self) -> bool {
        matches!(
            self,
            EngineError::Store(StoreError::MissingYear { .. } | StoreError::MissingCause { .. })
                | EngineError::DivisionByZero { .. }
                | EngineError::MissingBracket { .. }
        )
    }
}

impl From<polars::prelude::PolarsError> for EngineError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
