//! Direct age standardization.
//!
//! For one year the standardized value is
//!
//! ```text
//! Σ_b deaths[b] / population[b] × weight[b]
//! ```
//!
//! over the seven standard brackets `b`: the number of deaths the standard
//! population would see at that year's bracket-specific mortality.
//! Unknown-age deaths are excluded from every term.

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use pomedos_model::{CauseId, StandardBracket, StandardPopulation, Year};
use pomedos_store::{MortalityStore, YearSelection};

use crate::error::{EngineError, Result};
use crate::request::{MissingYearPolicy, SeriesRequest};
use crate::series::{DeathSeries, DeathValue, SeriesPoint, SkippedYear};

/// One standard bracket's share of a standardized rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BracketContribution {
    pub bracket: StandardBracket,
    pub deaths: u64,
    pub population: u64,
    /// Deaths per capita.
    pub crude_rate: f64,
    pub weight: f64,
    /// `crude_rate × weight`.
    pub contribution: f64,
}

/// Per-bracket detail behind one year's standardized rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearStandardization {
    pub year: Year,
    /// Deaths of unknown age, left out of every bracket.
    pub unknown_age: u64,
    pub brackets: Vec<BracketContribution>,
}

impl YearStandardization {
    pub fn rate(&self) -> f64 {
        self.brackets.iter().map(|b| b.contribution).sum()
    }

    /// Deaths of known age.
    pub fn deaths(&self) -> u64 {
        self.brackets.iter().map(|b| b.deaths).sum()
    }
}

/// Computes yearly death series from a store and a standard population.
#[derive(Debug, Clone, Copy)]
pub struct StandardizationEngine<'a> {
    store: &'a MortalityStore,
    standard: &'a StandardPopulation,
}

impl<'a> StandardizationEngine<'a> {
    pub fn new(store: &'a MortalityStore, standard: &'a StandardPopulation) -> Self {
        Self { store, standard }
    }

    pub fn store(&self) -> &'a MortalityStore {
        self.store
    }

    pub fn standard(&self) -> &'a StandardPopulation {
        self.standard
    }

    /// One point per year of `request.start..=request.end`.
    ///
    /// The cause set and the range are validated before any year is
    /// computed. Per-year failures abort or are skipped according to
    /// `request.missing_years`.
    pub fn total_deaths(&self, request: &SeriesRequest) -> Result<DeathSeries> {
        let span = info_span!(
            "total_deaths",
            start = %request.start,
            end = %request.end,
            standardize = request.standardize
        );
        let _guard = span.enter();

        if request.end < request.start {
            return Err(EngineError::InvalidYearRange {
                start: request.start,
                end: request.end,
            });
        }
        let causes = self.store.resolve_causes(&request.causes)?;
        self.warn_on_overlapping_causes(&causes);

        let mut points = Vec::new();
        let mut skipped = Vec::new();
        for year in request.start.through(request.end) {
            let value = if request.standardize {
                self.standardized_rate(year, &causes).map(DeathValue::Rate)
            } else {
                self.raw_total(year, &causes).map(DeathValue::Count)
            };
            match value {
                Ok(deaths) => {
                    debug!(%year, %deaths, "computed year");
                    points.push(SeriesPoint { year, deaths });
                }
                Err(err)
                    if request.missing_years == MissingYearPolicy::Skip && err.is_per_year() =>
                {
                    warn!(%year, error = %err, "skipping year");
                    skipped.push(SkippedYear {
                        year,
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        let label = match causes.as_slice() {
            [single] => Some(single.to_string()),
            _ => None,
        };
        info!(
            points = points.len(),
            skipped = skipped.len(),
            "computed death series"
        );
        Ok(DeathSeries {
            label,
            standardized: request.standardize,
            points,
            skipped,
        })
    }

    /// Deaths of known age in `year`, summed over `causes` and both sexes.
    pub fn raw_total(&self, year: Year, causes: &[CauseId]) -> Result<u64> {
        let deaths = self
            .store
            .deaths_by_cause(causes, &YearSelection::single(year))?;
        Ok(deaths.known_totals().total())
    }

    /// The standardized rate of `year` for the combined cause group.
    pub fn standardized_rate(&self, year: Year, causes: &[CauseId]) -> Result<f64> {
        Ok(self.standardize_year(year, causes)?.rate())
    }

    /// Per-bracket detail of the standardized rate of `year`.
    pub fn standardize_year(&self, year: Year, causes: &[CauseId]) -> Result<YearStandardization> {
        let deaths = self
            .store
            .deaths_by_cause(causes, &YearSelection::single(year))?;
        // Sex collapsed, unknown age dropped, fine brackets folded by range.
        let folded = deaths
            .fold_totals()
            .map_err(|err| EngineError::alignment(year, &err))?;
        let population = self.store.population_by_bracket(year)?;

        let mut brackets = Vec::with_capacity(StandardBracket::ALL.len());
        for bracket in StandardBracket::ALL {
            let missing = |table: &str| EngineError::BracketAlignment {
                year,
                reason: format!("{table} has no {bracket} bracket"),
            };
            let deaths = *folded.get(bracket).ok_or_else(|| missing("deaths"))?;
            let population = *population.get(bracket).ok_or_else(|| missing("population"))?;
            let weight = self
                .standard
                .weight(bracket)
                .ok_or_else(|| missing("standard population"))?;
            if population == 0 {
                return Err(EngineError::DivisionByZero {
                    year,
                    bracket: bracket.label().to_string(),
                });
            }
            let crude_rate = deaths as f64 / population as f64;
            brackets.push(BracketContribution {
                bracket,
                deaths,
                population,
                crude_rate,
                weight,
                contribution: crude_rate * weight,
            });
        }

        Ok(YearStandardization {
            year,
            unknown_age: deaths.unknown().total(),
            brackets,
        })
    }

    fn warn_on_overlapping_causes(&self, causes: &[CauseId]) {
        let all_cause = self.store.all_cause_label();
        if causes.len() > 1 && causes.iter().any(|cause| cause.as_str() == all_cause) {
            warn!(
                all_cause,
                causes = causes.len(),
                "all-cause rows combined with other causes; deaths are counted twice"
            );
        }
    }
}
