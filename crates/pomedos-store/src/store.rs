//! The tabular mortality store.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use pomedos_model::{
    BracketValues, CauseId, DeathBreakdown, DeathRecord, PopulationTable, SexCounts, Year,
};

use crate::error::{Result, StoreError, Table};
use crate::selection::YearSelection;

/// Label of the all-cause rows in the German cause-of-death export.
pub const DEFAULT_ALL_CAUSE_LABEL: &str = "Insgesamt";

/// Death counts and population, loaded once and only read afterwards.
///
/// Every query materializes a new [`DeathBreakdown`]; nothing is cached.
#[derive(Debug, Clone)]
pub struct MortalityStore {
    causes: Vec<CauseId>,
    deaths: BTreeMap<Year, BTreeMap<CauseId, DeathBreakdown>>,
    population: PopulationTable,
    all_cause: String,
}

impl MortalityStore {
    /// Builds the store. Causes keep the order of their first appearance.
    pub fn new(
        records: impl IntoIterator<Item = DeathRecord>,
        population: PopulationTable,
    ) -> Result<Self> {
        let mut causes = Vec::new();
        let mut known = HashSet::new();
        let mut seen = HashSet::new();
        let mut deaths: BTreeMap<Year, BTreeMap<CauseId, DeathBreakdown>> = BTreeMap::new();
        let mut record_count = 0usize;

        for record in records {
            if !seen.insert((record.year, record.cause.clone(), record.bracket, record.sex)) {
                return Err(StoreError::DuplicateRecord {
                    year: record.year,
                    cause: record.cause,
                    bracket: record.bracket,
                    sex: record.sex,
                });
            }
            if known.insert(record.cause.clone()) {
                causes.push(record.cause.clone());
            }
            deaths
                .entry(record.year)
                .or_default()
                .entry(record.cause)
                .or_default()
                .add(record.bracket, record.sex, record.count);
            record_count += 1;
        }

        info!(
            records = record_count,
            causes = causes.len(),
            death_years = deaths.len(),
            population_years = population.len(),
            "built mortality store"
        );
        Ok(Self {
            causes,
            deaths,
            population,
            all_cause: DEFAULT_ALL_CAUSE_LABEL.to_string(),
        })
    }

    /// Overrides the label of the all-cause rows.
    pub fn with_all_cause_label(mut self, label: impl Into<String>) -> Self {
        self.all_cause = label.into().trim().to_string();
        self
    }

    pub fn all_cause_label(&self) -> &str {
        &self.all_cause
    }

    /// The cause vocabulary in source order.
    pub fn causes(&self) -> &[CauseId] {
        &self.causes
    }

    pub fn contains_cause(&self, cause: &str) -> bool {
        self.causes.iter().any(|known| known.as_str() == cause)
    }

    /// Years present in the cause-of-death table, ascending.
    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.deaths.keys().copied()
    }

    /// Years present in the population table, ascending.
    pub fn population_years(&self) -> impl Iterator<Item = Year> + '_ {
        self.population.years()
    }

    /// First and last year of the cause-of-death table.
    pub fn year_range(&self) -> Option<(Year, Year)> {
        let first = self.deaths.keys().next()?;
        let last = self.deaths.keys().next_back()?;
        Some((*first, *last))
    }

    /// Validates `names` against the vocabulary.
    ///
    /// Duplicates are dropped, first occurrence wins. Fails on an empty list
    /// or the first unknown name.
    pub fn resolve_causes<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<CauseId>> {
        if names.is_empty() {
            return Err(StoreError::EmptyCauseSet);
        }
        let mut resolved: Vec<CauseId> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref().trim();
            let cause = self
                .causes
                .iter()
                .find(|known| known.as_str() == name)
                .ok_or_else(|| StoreError::UnknownCause {
                    cause: name.to_string(),
                })?;
            if !resolved.contains(cause) {
                resolved.push(cause.clone());
            }
        }
        Ok(resolved)
    }

    /// Death counts by native bracket and sex, summed over `causes` and
    /// `years`.
    pub fn deaths_by_cause(
        &self,
        causes: &[CauseId],
        years: &YearSelection,
    ) -> Result<DeathBreakdown> {
        let causes = self.resolve_causes(causes)?;
        let years = self.selected_years(years);

        let mut breakdown = DeathBreakdown::new();
        for year in years {
            let by_cause = self.deaths.get(&year).ok_or(StoreError::MissingYear {
                year,
                table: Table::Deaths,
            })?;
            for cause in &causes {
                let rows = by_cause
                    .get(cause.as_str())
                    .ok_or_else(|| StoreError::MissingCause {
                        cause: cause.clone(),
                        year,
                    })?;
                breakdown.merge(rows);
            }
        }
        debug!(causes = causes.len(), brackets = breakdown.len(), "queried deaths");
        Ok(breakdown)
    }

    /// Male and female totals per year for `causes`, unknown age included.
    pub fn deaths_per_year(
        &self,
        causes: &[CauseId],
        years: &YearSelection,
    ) -> Result<BTreeMap<Year, SexCounts>> {
        let causes = self.resolve_causes(causes)?;
        self.selected_years(years)
            .into_iter()
            .map(|year| {
                let breakdown = self.deaths_by_cause(&causes, &YearSelection::single(year))?;
                Ok((year, breakdown.totals()))
            })
            .collect()
    }

    /// The all-cause rows for one year.
    pub fn all_cause_deaths(&self, year: Year) -> Result<DeathBreakdown> {
        let causes = self.resolve_causes(&[self.all_cause.as_str()])?;
        self.deaths_by_cause(&causes, &YearSelection::single(year))
    }

    fn selected_years(&self, years: &YearSelection) -> Vec<Year> {
        match years {
            YearSelection::All => self.years().collect(),
            YearSelection::Years(years) => years.clone(),
        }
    }

    /// Population per standard bracket for one year.
    pub fn population_by_bracket(&self, year: Year) -> Result<&BracketValues<u64>> {
        self.population.get(year).ok_or(StoreError::MissingYear {
            year,
            table: Table::Population,
        })
    }
}
