//! Tabular mortality store.
//!
//! Holds the cause-of-death records and the population table after loading
//! and answers the queries of the standardization engine: death counts by
//! age bracket and sex for a set of causes and years, the all-cause slice of
//! a year, and the population of a year by standard bracket.

mod error;
mod selection;
mod store;

pub use error::{Result, StoreError, Table};
pub use selection::YearSelection;
pub use store::{DEFAULT_ALL_CAUSE_LABEL, MortalityStore};
