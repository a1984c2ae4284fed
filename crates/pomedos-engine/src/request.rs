use serde::{Deserialize, Serialize};

use pomedos_model::Year;

/// What to do when one year of a range cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingYearPolicy {
    /// Fail the whole range on the first failing year.
    #[default]
    Abort,
    /// Record the year in [`DeathSeries::skipped`](crate::DeathSeries) and
    /// continue with the next one.
    Skip,
}

/// A yearly death series query over the inclusive range `start..=end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRequest {
    pub start: Year,
    pub end: Year,
    /// Cause names; deaths are summed across all of them.
    pub causes: Vec<String>,
    pub standardize: bool,
    pub missing_years: MissingYearPolicy,
}

impl SeriesRequest {
    /// A raw (non-standardized) request that aborts on missing years.
    pub fn new<S: Into<String>>(
        start: Year,
        end: Year,
        causes: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            start,
            end,
            causes: causes.into_iter().map(Into::into).collect(),
            standardize: false,
            missing_years: MissingYearPolicy::Abort,
        }
    }

    pub fn standardized(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn with_missing_years(mut self, policy: MissingYearPolicy) -> Self {
        self.missing_years = policy;
        self
    }
}
