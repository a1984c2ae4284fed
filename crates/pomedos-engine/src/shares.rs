//! Age shares within a bracket group.
//!
//! Answers questions like "what fraction of male deaths under 15 were
//! infants?" per year, averages the fractions over recent years, and
//! projects them onto a known total for a year without bracket detail.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use pomedos_model::{AgeBracket, Sex, SexCounts, Year};
use pomedos_store::{MortalityStore, YearSelection};

use crate::error::{EngineError, Result};

/// Which deaths a share is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SexSelection {
    Male,
    Female,
    #[default]
    Total,
}

impl SexSelection {
    fn pick(self, counts: SexCounts) -> u64 {
        match self {
            SexSelection::Male => counts.get(Sex::Male),
            SexSelection::Female => counts.get(Sex::Female),
            SexSelection::Total => counts.total(),
        }
    }
}

/// Shares of each group bracket per year. Every row sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareTable {
    brackets: Vec<AgeBracket>,
    rows: BTreeMap<Year, Vec<f64>>,
}

/// Mean share per bracket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BracketShares {
    pub years: Vec<Year>,
    pub shares: Vec<(AgeBracket, f64)>,
}

/// Per year, each bracket's share of the deaths in `group` for one cause.
pub fn bracket_shares(
    store: &MortalityStore,
    cause: &str,
    years: &[Year],
    group: &[AgeBracket],
    sex: SexSelection,
) -> Result<ShareTable> {
    if years.is_empty() {
        return Err(EngineError::EmptyYearSelection);
    }
    let causes = store.resolve_causes(&[cause])?;

    let mut rows = BTreeMap::new();
    for &year in years {
        let breakdown = store.deaths_by_cause(&causes, &YearSelection::single(year))?;
        let counts = group
            .iter()
            .map(|&bracket| {
                breakdown
                    .get(bracket)
                    .map(|counts| sex.pick(counts))
                    .ok_or(EngineError::MissingBracket { year, bracket })
            })
            .collect::<Result<Vec<u64>>>()?;
        let sum: u64 = counts.iter().sum();
        if sum == 0 {
            return Err(EngineError::DivisionByZero {
                year,
                bracket: group_label(group),
            });
        }
        let shares = counts
            .iter()
            .map(|&count| count as f64 / sum as f64)
            .collect();
        debug!(%year, group_deaths = sum, "computed bracket shares");
        rows.insert(year, shares);
    }

    Ok(ShareTable {
        brackets: group.to_vec(),
        rows,
    })
}

impl ShareTable {
    pub fn brackets(&self) -> &[AgeBracket] {
        &self.brackets
    }

    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.rows.keys().copied()
    }

    pub fn get(&self, year: Year) -> Option<&[f64]> {
        self.rows.get(&year).map(Vec::as_slice)
    }

    pub fn rows(&self) -> impl Iterator<Item = (Year, &[f64])> {
        self.rows.iter().map(|(year, shares)| (*year, shares.as_slice()))
    }

    /// The last `n` years of the table, ascending.
    pub fn last_years(&self, n: usize) -> Vec<Year> {
        let skip = self.rows.len().saturating_sub(n);
        self.rows.keys().skip(skip).copied().collect()
    }

    /// Mean share per bracket over `years`.
    pub fn mean_over(&self, years: &[Year]) -> Result<BracketShares> {
        if years.is_empty() {
            return Err(EngineError::EmptyYearSelection);
        }
        let mut sums = vec![0.0; self.brackets.len()];
        for &year in years {
            let shares = self.get(year).ok_or(EngineError::MissingShareYear { year })?;
            for (sum, share) in sums.iter_mut().zip(shares) {
                *sum += share;
            }
        }
        let n = years.len() as f64;
        Ok(BracketShares {
            years: years.to_vec(),
            shares: self
                .brackets
                .iter()
                .zip(sums)
                .map(|(bracket, sum)| (*bracket, sum / n))
                .collect(),
        })
    }
}

/// Splits `total` deaths across brackets by `shares`.
pub fn project_counts(shares: &BracketShares, total: f64) -> Vec<(AgeBracket, f64)> {
    shares
        .shares
        .iter()
        .map(|(bracket, share)| (*bracket, share * total))
        .collect()
}

fn group_label(group: &[AgeBracket]) -> String {
    group
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" + ")
}
