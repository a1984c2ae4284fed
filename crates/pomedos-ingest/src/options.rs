//! Loader options shared by all three tables.

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// How the source CSV exports are laid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field delimiter (must be ASCII).
    pub delimiter: char,
    /// Cell values that stand for "no deaths recorded" and load as zero.
    pub placeholders: Vec<String>,
    /// Name of the year column in the population table.
    pub year_column: String,
    /// Optional grouping column of the population table (e.g. sex). When
    /// set, only rows whose group equals `group_value` are loaded.
    pub group_column: Option<String>,
    pub group_value: String,
    /// Population columns that are not age brackets (e.g. a stored total).
    pub ignored_columns: Vec<String>,
    /// Name of the weight column in the standard population table.
    pub weight_column: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            placeholders: vec!["-".to_string(), ".".to_string()],
            year_column: "Jahr".to_string(),
            group_column: None,
            group_value: "Insgesamt".to_string(),
            ignored_columns: vec!["Insgesamt".to_string()],
            weight_column: "ESP 2013".to_string(),
        }
    }
}

impl IngestOptions {
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| IngestError::InvalidOption {
                message: format!("delimiter {:?} is not an ASCII character", self.delimiter),
            })
    }

    pub(crate) fn is_placeholder(&self, value: &str) -> bool {
        value.is_empty() || self.placeholders.iter().any(|p| p == value)
    }

    pub(crate) fn is_ignored_column(&self, name: &str) -> bool {
        self.ignored_columns
            .iter()
            .any(|ignored| ignored.eq_ignore_ascii_case(name.trim()))
    }
}
