//! Error types for store queries.

use std::fmt;

use thiserror::Error;

use pomedos_model::{AgeBracket, CauseId, Sex, Year};

/// The table a lookup went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Deaths,
    Population,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Table::Deaths => "cause-of-death",
            Table::Population => "population",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("unknown cause '{cause}'")]
    UnknownCause { cause: String },

    #[error("no causes selected")]
    EmptyCauseSet,

    #[error("year {year} is missing from the {table} table")]
    MissingYear { year: Year, table: Table },

    #[error("cause '{cause}' has no rows for {year}")]
    MissingCause { cause: CauseId, year: Year },

    #[error("duplicate death record for '{cause}' in {year} ({bracket}, {sex})")]
    DuplicateRecord {
        year: Year,
        cause: CauseId,
        bracket: AgeBracket,
        sex: Sex,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
