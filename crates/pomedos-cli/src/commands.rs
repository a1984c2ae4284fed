use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use pomedos_cli::config::{Config, resolve_data_dir};
use pomedos_cli::output::{OutputFormat, write_series_csv, write_series_json};
use pomedos_engine::{
    DeathSeries, MissingYearPolicy, SeriesRequest, StandardizationEngine, bracket_shares,
    project_counts,
};
use pomedos_ingest::load_sources;
use pomedos_model::{AgeBracket, StandardPopulation, Year};
use pomedos_store::{MortalityStore, YearSelection};

use crate::cli::{BreakdownArgs, ExplainArgs, SeriesArgs, SharesArgs};
use crate::summary::{
    print_breakdown, print_causes, print_explain, print_per_year, print_series, print_shares,
};

/// The loaded tables every command works on.
pub struct Session {
    pub store: MortalityStore,
    pub standard: StandardPopulation,
}

pub fn load_session(data_dir: Option<&Path>, config: Option<&Path>) -> Result<Session> {
    let data_dir = resolve_data_dir(data_dir);
    let span = info_span!("load", data_dir = %data_dir.display());
    let _guard = span.enter();

    let config = Config::discover(&data_dir, config)?;
    let paths = config.source_paths(&data_dir);
    let sources = load_sources(&paths, &config.ingest)
        .with_context(|| format!("load tables from {}", data_dir.display()))?;
    let store = MortalityStore::new(sources.deaths, sources.population)
        .context("build mortality store")?
        .with_all_cause_label(config.data.all_cause_label.as_str());
    Ok(Session {
        store,
        standard: sources.standard,
    })
}

pub fn run_causes(session: &Session) -> Result<()> {
    print_causes(session.store.causes(), session.store.all_cause_label());
    Ok(())
}

pub fn run_breakdown(session: &Session, args: &BreakdownArgs) -> Result<()> {
    let causes = session.store.resolve_causes(&args.causes)?;
    let years = if args.all_years || args.years.is_empty() {
        YearSelection::All
    } else {
        YearSelection::Years(args.years.iter().copied().map(Year::new).collect())
    };
    if args.per_year {
        let rows: Vec<_> = session
            .store
            .deaths_per_year(&causes, &years)?
            .into_iter()
            .collect();
        print_per_year(&rows);
    } else {
        print_breakdown(&session.store.deaths_by_cause(&causes, &years)?);
    }
    Ok(())
}

pub fn run_series(session: &Session, args: &SeriesArgs) -> Result<()> {
    let (start, end) = year_bounds(&session.store, args.start, args.end)?;
    let policy = if args.skip_missing {
        MissingYearPolicy::Skip
    } else {
        MissingYearPolicy::Abort
    };
    let request = SeriesRequest::new(start, end, causes_or_all(&session.store, &args.causes)?)
        .standardized(args.standardize)
        .with_missing_years(policy);
    let engine = StandardizationEngine::new(&session.store, &session.standard);
    let series = engine.total_deaths(&request)?;

    let format = OutputFormat::from(args.format);
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_series(&series, format, &mut writer)?;
            writer.flush()?;
            info!(path = %path.display(), points = series.len(), "wrote series");
        }
        None if format == OutputFormat::Table => print_series(&series),
        None => {
            let mut stdout = io::stdout().lock();
            write_series(&series, format, &mut stdout)?;
        }
    }
    Ok(())
}

pub fn run_explain(session: &Session, args: &ExplainArgs) -> Result<()> {
    let causes = session
        .store
        .resolve_causes(&causes_or_all(&session.store, &args.causes)?)?;
    let engine = StandardizationEngine::new(&session.store, &session.standard);
    let detail = engine.standardize_year(Year::new(args.year), &causes)?;
    print_explain(&detail, session.standard.name());
    Ok(())
}

pub fn run_shares(session: &Session, args: &SharesArgs) -> Result<()> {
    if args.mean_last == 0 {
        bail!("--mean-last must be at least 1");
    }
    let (start, end) = year_bounds(&session.store, args.start, args.end)?;
    let group = args
        .brackets
        .iter()
        .map(|label| {
            label
                .parse::<AgeBracket>()
                .with_context(|| format!("invalid bracket label '{label}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    let cause = args
        .cause
        .as_deref()
        .unwrap_or(session.store.all_cause_label());
    let years: Vec<Year> = start.through(end).collect();

    let table = bracket_shares(&session.store, cause, &years, &group, args.sex.into())?;
    let mean = table.mean_over(&table.last_years(args.mean_last))?;
    let projection = args.project.map(|total| project_counts(&mean, total));
    print_shares(&table, &mean, projection.as_deref());
    Ok(())
}

/// Writes a series to a file or pipe; a terminal table has no file form,
/// so it is written as CSV.
fn write_series<W: Write>(series: &DeathSeries, format: OutputFormat, writer: &mut W) -> Result<()> {
    match format {
        OutputFormat::Json => write_series_json(series, writer),
        OutputFormat::Csv | OutputFormat::Table => write_series_csv(series, writer),
    }
}

fn year_bounds(store: &MortalityStore, start: Option<i32>, end: Option<i32>) -> Result<(Year, Year)> {
    let loaded = store.year_range();
    let start = start.map(Year::new).or(loaded.map(|(first, _)| first));
    let end = end.map(Year::new).or(loaded.map(|(_, last)| last));
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => bail!("no years loaded; pass --start and --end"),
    }
}

fn causes_or_all(store: &MortalityStore, causes: &[String]) -> Result<Vec<String>> {
    if !causes.is_empty() {
        return Ok(causes.to_vec());
    }
    let all_cause = store.all_cause_label();
    if !store.contains_cause(all_cause) {
        bail!("the table has no '{all_cause}' rows; pass --cause or set data.all_cause_label");
    }
    Ok(vec![all_cause.to_string()])
}
