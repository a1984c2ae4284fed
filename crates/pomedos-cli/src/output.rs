//! Machine-readable series output for plotting tools.

use std::io::Write;

use anyhow::{Context, Result};
use polars::prelude::*;

use pomedos_engine::DeathSeries;

/// How a series is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Terminal table.
    #[default]
    Table,
    /// `year,deaths` CSV.
    Csv,
    /// The serialized [`DeathSeries`].
    Json,
}

/// Writes `series` as CSV with a `year,deaths` header.
pub fn write_series_csv<W: Write>(series: &DeathSeries, writer: &mut W) -> Result<()> {
    let mut df = series.to_frame().context("build series frame")?;
    CsvWriter::new(writer)
        .include_header(true)
        .finish(&mut df)
        .context("write series CSV")?;
    Ok(())
}

/// Writes `series` as pretty-printed JSON.
pub fn write_series_json<W: Write>(series: &DeathSeries, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, series).context("write series JSON")?;
    writeln!(writer)?;
    Ok(())
}
