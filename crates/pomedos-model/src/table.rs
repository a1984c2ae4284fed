#![deny(unsafe_code)]

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use crate::{AgeBracket, AgeRange, BracketValues, CauseId, ModelError, Sex, Year, fold_into_standard};

/// One cell of the cause-of-death table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeathRecord {
    pub year: Year,
    pub cause: CauseId,
    pub bracket: AgeBracket,
    pub sex: Sex,
    pub count: u64,
}

/// Population per standard bracket, one row set per year.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationTable {
    rows: BTreeMap<Year, BracketValues<u64>>,
}

impl PopulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the row set for `year`, returning the one it replaced.
    pub fn insert(&mut self, year: Year, counts: BracketValues<u64>) -> Option<BracketValues<u64>> {
        self.rows.insert(year, counts)
    }

    pub fn get(&self, year: Year) -> Option<&BracketValues<u64>> {
        self.rows.get(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.rows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(Year, BracketValues<u64>)> for PopulationTable {
    fn from_iter<I: IntoIterator<Item = (Year, BracketValues<u64>)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Male and female counts for one cell; the total is derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SexCounts {
    pub male: u64,
    pub female: u64,
}

impl SexCounts {
    pub const fn new(male: u64, female: u64) -> Self {
        Self { male, female }
    }

    pub const fn total(&self) -> u64 {
        self.male + self.female
    }

    pub fn get(&self, sex: Sex) -> u64 {
        match sex {
            Sex::Male => self.male,
            Sex::Female => self.female,
        }
    }

    pub fn add(&mut self, sex: Sex, count: u64) {
        match sex {
            Sex::Male => self.male += count,
            Sex::Female => self.female += count,
        }
    }
}

impl Add for SexCounts {
    type Output = SexCounts;

    fn add(self, rhs: Self) -> Self::Output {
        SexCounts::new(self.male + rhs.male, self.female + rhs.female)
    }
}

impl AddAssign for SexCounts {
    fn add_assign(&mut self, rhs: Self) {
        self.male += rhs.male;
        self.female += rhs.female;
    }
}

/// Death counts by native age bracket and sex.
///
/// Rows iterate in ascending age order with the unknown-age bucket last,
/// regardless of the order they were inserted in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeathBreakdown {
    rows: BTreeMap<AgeBracket, SexCounts>,
}

impl DeathBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, bracket: AgeBracket, sex: Sex, count: u64) {
        self.rows.entry(bracket).or_default().add(sex, count);
    }

    /// Adds every row of `other` into `self`.
    pub fn merge(&mut self, other: &DeathBreakdown) {
        for (bracket, counts) in &other.rows {
            *self.rows.entry(*bracket).or_default() += *counts;
        }
    }

    pub fn get(&self, bracket: AgeBracket) -> Option<SexCounts> {
        self.rows.get(&bracket).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (AgeBracket, SexCounts)> + '_ {
        self.rows.iter().map(|(bracket, counts)| (*bracket, *counts))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn unknown(&self) -> SexCounts {
        self.get(AgeBracket::Unknown).unwrap_or_default()
    }

    /// Sum over every bracket, unknown age included.
    pub fn totals(&self) -> SexCounts {
        self.rows.values().fold(SexCounts::default(), |acc, c| acc + *c)
    }

    /// Sum over every bracket except unknown age.
    pub fn known_totals(&self) -> SexCounts {
        self.rows
            .iter()
            .filter(|(bracket, _)| !bracket.is_unknown())
            .fold(SexCounts::default(), |acc, (_, c)| acc + *c)
    }

    /// Male + female per known bracket, ascending by age.
    pub fn known_by_range(&self) -> impl Iterator<Item = (AgeRange, u64)> + '_ {
        self.rows
            .iter()
            .filter_map(|(bracket, counts)| bracket.range().map(|range| (range, counts.total())))
    }

    /// Folds the known brackets into the seven standard brackets.
    pub fn fold_totals(&self) -> Result<BracketValues<u64>, ModelError> {
        fold_into_standard(self.known_by_range())
    }
}

impl FromIterator<(AgeBracket, SexCounts)> for DeathBreakdown {
    fn from_iter<I: IntoIterator<Item = (AgeBracket, SexCounts)>>(iter: I) -> Self {
        let mut breakdown = DeathBreakdown::new();
        for (bracket, counts) in iter {
            *breakdown.rows.entry(bracket).or_default() += counts;
        }
        breakdown
    }
}
