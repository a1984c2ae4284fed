use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A calendar year.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Year(i32);

impl Year {
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Every year from `self` up to and including `end`, ascending.
    ///
    /// Empty when `end` precedes `self`.
    pub fn through(self, end: Year) -> impl Iterator<Item = Year> {
        (self.0..=end.0).map(Year)
    }
}

impl From<i32> for Year {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl FromStr for Year {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Spreadsheet exports sometimes render integer years as floats.
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        digits
            .parse::<i32>()
            .map(Year)
            .map_err(|_| ModelError::InvalidYear(s.to_string()))
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cause-of-death label from the loaded vocabulary, e.g. `Grippe`.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct CauseId(String);

impl CauseId {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidCause(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CauseId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CauseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CauseId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_parses_integer_and_float_renderings() {
        assert_eq!("1998".parse::<Year>().unwrap(), Year::new(1998));
        assert_eq!(" 2020.0 ".parse::<Year>().unwrap(), Year::new(2020));
        assert!("19x8".parse::<Year>().is_err());
    }

    #[test]
    fn year_through_is_inclusive() {
        let years: Vec<i32> = Year::new(1998).through(Year::new(2000)).map(Year::get).collect();
        assert_eq!(years, vec![1998, 1999, 2000]);
        assert_eq!(Year::new(2001).through(Year::new(2000)).count(), 0);
    }

    #[test]
    fn cause_id_trims_and_rejects_blank() {
        assert_eq!(CauseId::new("  Grippe ").unwrap().as_str(), "Grippe");
        assert!(matches!(
            CauseId::new("   "),
            Err(ModelError::InvalidCause(_))
        ));
    }
}
