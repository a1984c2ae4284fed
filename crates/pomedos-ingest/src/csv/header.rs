//! Two-row header of the cause-of-death export.

use std::collections::BTreeSet;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use pomedos_model::{AgeBracket, Sex};

use crate::error::{IngestError, Result};

/// Number of leading index columns (year, cause).
pub const INDEX_COLUMNS: usize = 2;

/// Column layout decoded from the two header rows.
///
/// Row one holds the sex of every data column, written once per merged
/// spreadsheet cell and left blank for the columns it spans. Row two holds
/// the age bracket label.
#[derive(Debug, Clone)]
pub struct DeathHeaders {
    /// One entry per data column; `None` for columns that are not loaded.
    pub columns: Vec<Option<(Sex, AgeBracket)>>,
}

impl DeathHeaders {
    pub fn parse(sex_row: &StringRecord, bracket_row: &StringRecord, path: &Path) -> Result<Self> {
        if sex_row.len() <= INDEX_COLUMNS {
            return Err(IngestError::HeaderFormat {
                path: path.to_path_buf(),
                reason: "no data columns after the year and cause columns".to_string(),
            });
        }

        let mut columns = Vec::with_capacity(sex_row.len() - INDEX_COLUMNS);
        let mut seen = BTreeSet::new();
        let mut current_sex: Option<String> = None;
        for idx in INDEX_COLUMNS..sex_row.len() {
            let sex_cell = normalize_header(sex_row.get(idx).unwrap_or(""));
            if !sex_cell.is_empty() {
                current_sex = Some(sex_cell);
            }
            let Some(sex_label) = current_sex.as_deref() else {
                return Err(IngestError::HeaderFormat {
                    path: path.to_path_buf(),
                    reason: format!("column {} has no sex header", idx + 1),
                });
            };
            let Ok(sex) = sex_label.parse::<Sex>() else {
                debug!(path = %path.display(), column = idx + 1, sex_label, "skipping non-sex column");
                columns.push(None);
                continue;
            };
            let bracket_label = normalize_header(bracket_row.get(idx).unwrap_or(""));
            let bracket = bracket_label
                .parse::<AgeBracket>()
                .map_err(|_| IngestError::invalid("age bracket header", &bracket_label, path, 2))?;
            if !seen.insert((sex, bracket)) {
                return Err(IngestError::DuplicateKey {
                    key: format!("column {sex} / {bracket}"),
                    path: path.to_path_buf(),
                });
            }
            columns.push(Some((sex, bracket)));
        }

        if seen.is_empty() {
            return Err(IngestError::HeaderFormat {
                path: path.to_path_buf(),
                reason: "no male or female columns".to_string(),
            });
        }
        Ok(Self { columns })
    }

    /// Number of columns that are loaded.
    pub fn loaded_columns(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}

/// Normalizes a header value by trimming whitespace and a leading BOM.
pub fn normalize_header(value: &str) -> String {
    value.trim_start_matches('\u{feff}').trim().to_string()
}
