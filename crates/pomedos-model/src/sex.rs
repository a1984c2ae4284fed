use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// Sex as recorded in the cause-of-death tables.
///
/// The combined total is always derived as male + female and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    /// Label used by the source tables.
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "männlich",
            Sex::Female => "weiblich",
        }
    }
}

impl FromStr for Sex {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "männlich" | "maennlich" | "male" | "m" => Ok(Sex::Male),
            "weiblich" | "female" | "w" | "f" => Ok(Sex::Female),
            _ => Err(ModelError::InvalidSex(s.to_string())),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
