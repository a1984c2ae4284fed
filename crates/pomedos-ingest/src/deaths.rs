//! Cause-of-death table loader.
//!
//! The export has two header rows (sex, then age bracket) followed by one
//! row per (year, cause). The year is written once per block and left blank
//! on the rows below it.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use pomedos_model::{CauseId, DeathRecord, Year};

use crate::csv::cell::{CountCell, parse_count};
use crate::csv::{DeathHeaders, INDEX_COLUMNS, normalize_header, validate_encoding};
use crate::error::{IngestError, Result};
use crate::options::IngestOptions;

/// Loads the cause-of-death table at `path`.
pub fn load_deaths(path: &Path, options: &IngestOptions) -> Result<Vec<DeathRecord>> {
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    read_deaths(file, path, options)
}

/// Parses a cause-of-death table from any reader; `path` is used in errors.
pub fn read_deaths<R: Read>(
    source: R,
    path: &Path,
    options: &IngestOptions,
) -> Result<Vec<DeathRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(options.delimiter_byte()?)
        .from_reader(source);
    let mut rows = reader.records();

    let sex_row = rows
        .next()
        .ok_or_else(|| IngestError::EmptyCsv {
            path: path.to_path_buf(),
        })?
        .map_err(|e| IngestError::csv(path, &e))?;
    let bracket_row = rows
        .next()
        .ok_or_else(|| IngestError::HeaderFormat {
            path: path.to_path_buf(),
            reason: "missing age bracket header row".to_string(),
        })?
        .map_err(|e| IngestError::csv(path, &e))?;
    let headers = DeathHeaders::parse(&sex_row, &bracket_row, path)?;
    debug!(
        path = %path.display(),
        columns = headers.columns.len(),
        loaded = headers.loaded_columns(),
        "parsed cause-of-death headers"
    );

    let mut records = Vec::new();
    let mut seen: BTreeSet<(Year, CauseId)> = BTreeSet::new();
    let mut current_year: Option<Year> = None;
    let mut placeholder_cells = 0usize;

    for (offset, row) in rows.enumerate() {
        // 1-based line number, counting the two header rows
        let line = offset + 3;
        let row = row.map_err(|e| IngestError::csv(path, &e))?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let year_cell = normalize_header(row.get(0).unwrap_or(""));
        if !year_cell.is_empty() {
            let year = year_cell
                .parse::<Year>()
                .map_err(|_| IngestError::invalid("year", &year_cell, path, line))?;
            current_year = Some(year);
        }
        let year = current_year.ok_or_else(|| IngestError::invalid("year", "", path, line))?;

        let cause_cell = row.get(1).unwrap_or("");
        let cause =
            CauseId::new(cause_cell).map_err(|_| IngestError::invalid("cause", cause_cell, path, line))?;
        if !seen.insert((year, cause.clone())) {
            return Err(IngestError::DuplicateKey {
                key: format!("row for {cause} in {year}"),
                path: path.to_path_buf(),
            });
        }

        for (idx, column) in headers.columns.iter().enumerate() {
            let Some((sex, bracket)) = column else {
                continue;
            };
            let raw = row.get(idx + INDEX_COLUMNS).unwrap_or("");
            let count = match parse_count(raw, options) {
                Some(CountCell::Value(count)) => count,
                Some(CountCell::Placeholder) => {
                    placeholder_cells += 1;
                    0
                }
                None => {
                    return Err(IngestError::invalid(
                        format!("{sex} / {bracket} count"),
                        raw,
                        path,
                        line,
                    ));
                }
            };
            records.push(DeathRecord {
                year,
                cause: cause.clone(),
                bracket: *bracket,
                sex: *sex,
                count,
            });
        }
    }

    if records.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    info!(
        path = %path.display(),
        records = records.len(),
        rows = seen.len(),
        placeholder_cells,
        "loaded cause-of-death table"
    );
    Ok(records)
}
