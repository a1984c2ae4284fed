//! Population-by-age table loader.

use std::path::Path;

use polars::prelude::{Column, DataFrame};
use tracing::{debug, info};

use pomedos_model::{AgeBracket, AgeRange, PopulationTable, Year, fold_into_standard};

use crate::csv::cell::{CountCell, cell_text, parse_count};
use crate::csv::{normalize_header, read_csv_table};
use crate::error::{IngestError, Result};
use crate::options::IngestOptions;

/// Loads the population table at `path`, folding its bands into the
/// standard brackets.
pub fn load_population(path: &Path, options: &IngestOptions) -> Result<PopulationTable> {
    let df = read_csv_table(path, options)?;
    population_from_frame(&df, path, options)
}

/// Builds a [`PopulationTable`] from an already loaded frame.
pub fn population_from_frame(
    df: &DataFrame,
    path: &Path,
    options: &IngestOptions,
) -> Result<PopulationTable> {
    let is_year = |column: &Column| {
        normalize_header(column.name().as_str()).eq_ignore_ascii_case(&options.year_column)
    };
    let year_column = df
        .get_columns()
        .iter()
        .find(|column| is_year(column))
        .ok_or_else(|| IngestError::MissingColumn {
            column: options.year_column.clone(),
            path: path.to_path_buf(),
        })?;

    let is_group = |column: &Column| {
        options.group_column.as_deref().is_some_and(|group| {
            normalize_header(column.name().as_str()).eq_ignore_ascii_case(group)
        })
    };
    let group_column = match options.group_column.as_deref() {
        Some(group) => Some(
            df.get_columns()
                .iter()
                .find(|column| is_group(column))
                .ok_or_else(|| IngestError::MissingColumn {
                    column: group.to_string(),
                    path: path.to_path_buf(),
                })?,
        ),
        None => None,
    };

    let mut bracket_columns: Vec<(AgeRange, &Column)> = Vec::new();
    for column in df
        .get_columns()
        .iter()
        .filter(|column| !is_year(column) && !is_group(column))
    {
        let name = normalize_header(column.name().as_str());
        if options.is_ignored_column(&name) {
            debug!(path = %path.display(), column = %name, "ignoring population column");
            continue;
        }
        let range = name
            .parse::<AgeBracket>()
            .ok()
            .and_then(|bracket| bracket.range())
            .ok_or_else(|| IngestError::invalid("age bracket column", &name, path, 1))?;
        bracket_columns.push((range, column));
    }

    let mut table = PopulationTable::new();
    let mut skipped_rows = 0usize;
    for row in 0..df.height() {
        let line = row + 2;
        if let Some(group_column) = group_column {
            let group = cell_text(group_column.get(row)?);
            if group.trim() != options.group_value {
                skipped_rows += 1;
                continue;
            }
        }
        let year_text = cell_text(year_column.get(row)?);
        let year = year_text
            .parse::<Year>()
            .map_err(|_| IngestError::invalid("year", &year_text, path, line))?;

        let mut entries = Vec::with_capacity(bracket_columns.len());
        for (range, column) in &bracket_columns {
            let text = cell_text(column.get(row)?);
            let count = match parse_count(&text, options) {
                Some(CountCell::Value(count)) => count,
                Some(CountCell::Placeholder) => 0,
                None => {
                    return Err(IngestError::invalid(
                        format!("population {range}"),
                        text,
                        path,
                        line,
                    ));
                }
            };
            entries.push((*range, count));
        }

        let counts =
            fold_into_standard(entries).map_err(|source| IngestError::BracketFold {
                path: path.to_path_buf(),
                context: format!("year {year}"),
                source,
            })?;
        if table.insert(year, counts).is_some() {
            return Err(IngestError::DuplicateKey {
                key: format!("year {year}"),
                path: path.to_path_buf(),
            });
        }
    }

    info!(
        path = %path.display(),
        years = table.len(),
        bands = bracket_columns.len(),
        skipped_rows,
        "loaded population table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomedos_model::StandardBracket;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const HEADER: &str = "Jahr,unter 1 Jahr,1 bis unter 15 Jahre,15 bis unter 20 Jahre,20 bis unter 25 Jahre,25 bis unter 30 Jahre,30 bis unter 50 Jahre,50 bis unter 65 Jahre,65 Jahre und mehr,Insgesamt";

    #[test]
    fn folds_fine_bands_and_ignores_total() {
        let file = create_temp_csv(&format!("{HEADER}\n1998,10,20,30,40,50,60,70,80,360\n"));
        let table = load_population(file.path(), &IngestOptions::default()).unwrap();

        let counts = table.get(Year::new(1998)).unwrap();
        assert_eq!(counts.len(), 7);
        assert_eq!(counts.get(StandardBracket::ThirtyToSixtyFive), Some(&130));
        assert_eq!(counts.total(), 360);
    }

    #[test]
    fn rejects_duplicate_year() {
        let file = create_temp_csv(&format!(
            "{HEADER}\n1998,1,1,1,1,1,1,1,1,8\n1998,1,1,1,1,1,1,1,1,8\n"
        ));
        let result = load_population(file.path(), &IngestOptions::default());
        assert!(matches!(result, Err(IngestError::DuplicateKey { .. })));
    }

    #[test]
    fn rejects_gap_in_bands() {
        let file = create_temp_csv(
            "Jahr,unter 1 Jahr,15 bis unter 30 Jahre,30 Jahre und mehr\n1998,1,1,1\n",
        );
        let result = load_population(file.path(), &IngestOptions::default());
        assert!(matches!(result, Err(IngestError::BracketFold { .. })));
    }

    #[test]
    fn keeps_only_the_configured_group() {
        let file = create_temp_csv(
            "Geschlecht,Jahr,0 - 1,1 - 30,30 - 65,65 und älter\n\
             Insgesamt,1998,10,20,30,40\n\
             männlich,1998,5,10,15,20\n",
        );
        let options = IngestOptions {
            group_column: Some("Geschlecht".to_string()),
            ..IngestOptions::default()
        };
        let result = load_population(file.path(), &options);
        // 1 - 30 straddles three standard brackets
        assert!(matches!(result, Err(IngestError::BracketFold { .. })));

        let file = create_temp_csv(
            "Geschlecht,Jahr,0 - 1,1 - 15,15 - 20,20 - 25,25 - 30,30 - 65,65 und älter\n\
             Insgesamt,1998,10,20,30,40,50,60,70\n\
             männlich,1998,5,10,15,20,25,30,35\n",
        );
        let table = load_population(file.path(), &options).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(Year::new(1998)).unwrap().total(), 280);
    }

    #[test]
    fn requires_year_column() {
        let file = create_temp_csv("Zeit,unter 1 Jahr\n1998,1\n");
        let result = load_population(file.path(), &IngestOptions::default());
        assert!(matches!(result, Err(IngestError::MissingColumn { .. })));
    }
}
