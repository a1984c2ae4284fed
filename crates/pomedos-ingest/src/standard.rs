//! Standard population weights loader.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use pomedos_model::{AgeBracket, StandardPopulation, fold_into_standard};

use crate::csv::cell::parse_weight;
use crate::csv::{normalize_header, validate_encoding};
use crate::error::{IngestError, Result};
use crate::options::IngestOptions;

/// Loads a standard population from `path`, or the embedded ESP 2013 table
/// when no path is given.
pub fn load_standard_population(
    path: Option<&Path>,
    options: &IngestOptions,
) -> Result<StandardPopulation> {
    let Some(path) = path else {
        return Ok(StandardPopulation::esp2013());
    };
    validate_encoding(path)?;
    let file = File::open(path).map_err(|e| IngestError::io(path, e))?;
    read_standard_population(file, path, options)
}

/// Parses a bracket label / weight table. The weight column is located by
/// name; the first other column holds the labels.
pub fn read_standard_population<R: Read>(
    source: R,
    path: &Path,
    options: &IngestOptions,
) -> Result<StandardPopulation> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(options.delimiter_byte()?)
        .from_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| IngestError::csv(path, &e))?
        .clone();
    let weight_idx = headers
        .iter()
        .position(|h| normalize_header(h).eq_ignore_ascii_case(&options.weight_column))
        .ok_or_else(|| IngestError::MissingColumn {
            column: options.weight_column.clone(),
            path: path.to_path_buf(),
        })?;
    let label_idx = usize::from(weight_idx == 0);

    let mut entries = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let line = offset + 2;
        let record = record.map_err(|e| IngestError::csv(path, &e))?;
        let label = record.get(label_idx).unwrap_or("").trim();
        let range = label
            .parse::<AgeBracket>()
            .ok()
            .and_then(|bracket| bracket.range())
            .ok_or_else(|| IngestError::invalid("age bracket", label, path, line))?;
        let raw = record.get(weight_idx).unwrap_or("");
        let weight =
            parse_weight(raw).ok_or_else(|| IngestError::invalid("weight", raw, path, line))?;
        entries.push((range, weight));
    }
    if entries.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let bands = entries.len();
    let weights = fold_into_standard(entries).map_err(|source| IngestError::BracketFold {
        path: path.to_path_buf(),
        context: "standard population".to_string(),
        source,
    })?;
    let standard = StandardPopulation::new(options.weight_column.clone(), weights);
    info!(
        path = %path.display(),
        bands,
        total = standard.total(),
        "loaded standard population"
    );
    Ok(standard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pomedos_model::ESP_2013_BANDS;

    fn parse(content: &str) -> Result<StandardPopulation> {
        read_standard_population(
            content.as_bytes(),
            Path::new("esp.csv"),
            &IngestOptions::default(),
        )
    }

    #[test]
    fn published_bands_match_embedded_table() {
        let mut content = String::from("Altersgruppe,ESP 2013\n");
        for (low, high, weight) in ESP_2013_BANDS {
            match high {
                Some(high) => content.push_str(&format!("{low} bis unter {high} Jahre,{weight}\n")),
                None => content.push_str(&format!("{low} Jahre und mehr,{weight}\n")),
            }
        }
        let loaded = parse(&content).unwrap();
        assert_eq!(loaded.weights(), StandardPopulation::esp2013().weights());
        assert_eq!(loaded.total(), 100_000.0);
    }

    #[test]
    fn weight_column_may_come_first() {
        let loaded = parse(
            "ESP 2013,Alter\n\
             1000,unter 1 Jahr\n\
             15000,1 bis unter 15 Jahre\n\
             5500,15 bis unter 20 Jahre\n\
             6000,20 bis unter 25 Jahre\n\
             6000,25 bis unter 30 Jahre\n\
             47000,30 bis unter 65 Jahre\n\
             19500,65 Jahre und mehr\n",
        )
        .unwrap();
        assert_eq!(loaded.weights(), StandardPopulation::esp2013().weights());
    }

    #[test]
    fn straddling_band_is_rejected() {
        let loaded = parse("Alter,ESP 2013\nunter 1 Jahr,1000\n1 Jahre und mehr,99000\n");
        assert!(matches!(loaded, Err(IngestError::BracketFold { .. })));
    }

    #[test]
    fn missing_weight_column() {
        let result = parse("Alter,Gewicht\nunter 1 Jahr,1\n");
        assert!(matches!(result, Err(IngestError::MissingColumn { .. })));
    }

    #[test]
    fn no_path_uses_embedded_table() {
        let standard = load_standard_population(None, &IngestOptions::default()).unwrap();
        assert_eq!(standard.name(), "ESP 2013");
    }
}
