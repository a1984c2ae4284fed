//! Result rows of a series query.

use std::fmt;

use polars::prelude::*;
use serde::Serialize;

use pomedos_model::Year;

use crate::error::Result;

/// Deaths in one year: a raw count or a standardized rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DeathValue {
    Count(u64),
    /// Expected deaths in the standard population.
    Rate(f64),
}

impl DeathValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            DeathValue::Count(count) => *count as f64,
            DeathValue::Rate(rate) => *rate,
        }
    }

    pub fn count(&self) -> Option<u64> {
        match self {
            DeathValue::Count(count) => Some(*count),
            DeathValue::Rate(_) => None,
        }
    }
}

impl fmt::Display for DeathValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeathValue::Count(count) => write!(f, "{count}"),
            DeathValue::Rate(rate) => write!(f, "{rate:.2}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub year: Year,
    pub deaths: DeathValue,
}

/// A year left out under [`MissingYearPolicy::Skip`](crate::MissingYearPolicy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedYear {
    pub year: Year,
    pub reason: String,
}

/// One `(year, deaths)` point per computed year, ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeathSeries {
    /// The cause name when a single cause was requested.
    pub label: Option<String>,
    pub standardized: bool,
    pub points: Vec<SeriesPoint>,
    pub skipped: Vec<SkippedYear>,
}

impl DeathSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        self.points.iter().map(|point| point.year)
    }

    pub fn get(&self, year: Year) -> Option<DeathValue> {
        self.points
            .iter()
            .find(|point| point.year == year)
            .map(|point| point.deaths)
    }

    /// Columns `year` (Int32) and `deaths` (UInt64 for raw counts, Float64
    /// for rates).
    pub fn to_frame(&self) -> Result<DataFrame> {
        let years: Vec<i32> = self.points.iter().map(|point| point.year.get()).collect();
        let counts: Option<Vec<u64>> = self.points.iter().map(|point| point.deaths.count()).collect();
        let deaths = match counts {
            Some(counts) if !self.standardized => Series::new("deaths".into(), counts),
            _ => Series::new(
                "deaths".into(),
                self.points
                    .iter()
                    .map(|point| point.deaths.as_f64())
                    .collect::<Vec<f64>>(),
            ),
        };
        let df = DataFrame::new(vec![
            Series::new("year".into(), years).into_column(),
            deaths.into_column(),
        ])?;
        Ok(df)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(standardized: bool, deaths: Vec<DeathValue>) -> DeathSeries {
        DeathSeries {
            label: None,
            standardized,
            points: deaths
                .into_iter()
                .enumerate()
                .map(|(idx, deaths)| SeriesPoint {
                    year: Year::new(1998 + idx as i32),
                    deaths,
                })
                .collect(),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn raw_series_frame_has_integer_deaths() {
        let df = series(false, vec![DeathValue::Count(5), DeathValue::Count(7)])
            .to_frame()
            .unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("deaths").unwrap().dtype(), &DataType::UInt64);
        assert_eq!(df.column("year").unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn standardized_series_frame_has_float_deaths() {
        let df = series(true, vec![DeathValue::Rate(1.5)]).to_frame().unwrap();
        assert_eq!(df.column("deaths").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn death_values_serialize_untagged() {
        let json = serde_json::to_string(&[DeathValue::Count(3), DeathValue::Rate(0.5)]).unwrap();
        assert_eq!(json, "[3,0.5]");
    }
}
