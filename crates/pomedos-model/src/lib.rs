//! Shared data model for the mortality pipeline.
//!
//! Every crate in the workspace speaks in these types: [`Year`] and
//! [`CauseId`] identify rows, [`Sex`] and [`AgeBracket`] identify columns,
//! and [`StandardBracket`] is the seven-bracket scheme shared by the
//! population table and the standard population weights.

#![deny(unsafe_code)]

pub mod bracket;
pub mod error;
pub mod ids;
pub mod sex;
pub mod standard;
pub mod table;

pub use bracket::{AgeBracket, AgeRange, BracketValues, StandardBracket, fold_into_standard};
pub use error::{ModelError, Result};
pub use ids::{CauseId, Year};
pub use sex::Sex;
pub use standard::{ESP_2013_BANDS, StandardPopulation};
pub use table::{DeathBreakdown, DeathRecord, PopulationTable, SexCounts};
