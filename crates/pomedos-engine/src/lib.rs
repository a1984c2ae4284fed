//! Age-standardized mortality.
//!
//! [`StandardizationEngine`] turns the death counts and population held by a
//! [`MortalityStore`](pomedos_store::MortalityStore) into one value per year:
//! either the raw number of deaths of known age, or the directly
//! standardized rate against a [`StandardPopulation`](pomedos_model::StandardPopulation)
//! (ESP 2013 by default).
//!
//! The [`shares`] module holds the age-share analysis used to split a total
//! without bracket detail across age brackets.

pub mod engine;
pub mod error;
pub mod request;
pub mod series;
pub mod shares;

pub use engine::{BracketContribution, StandardizationEngine, YearStandardization};
pub use error::{EngineError, Result};
pub use request::{MissingYearPolicy, SeriesRequest};
pub use series::{DeathSeries, DeathValue, SeriesPoint, SkippedYear};
pub use shares::{BracketShares, SexSelection, ShareTable, bracket_shares, project_counts};
