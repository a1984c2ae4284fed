use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use pomedos_engine::{BracketShares, DeathSeries, ShareTable, YearStandardization};
use pomedos_model::{AgeBracket, CauseId, DeathBreakdown, SexCounts, Year};

pub fn print_causes(causes: &[CauseId], all_cause: &str) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Cause of death")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (idx, cause) in causes.iter().enumerate() {
        let name = if cause.as_str() == all_cause {
            Cell::new(cause).add_attribute(Attribute::Bold)
        } else {
            Cell::new(cause)
        };
        table.add_row(vec![Cell::new(idx + 1), name]);
    }
    println!("{table}");
}

pub fn print_breakdown(breakdown: &DeathBreakdown) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Age bracket"),
        header_cell("Male"),
        header_cell("Female"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    align_numeric_columns(&mut table, 1..=3);
    for (bracket, counts) in breakdown.rows() {
        let label = match bracket {
            AgeBracket::Unknown => dim_cell(bracket),
            AgeBracket::Known(_) => Cell::new(bracket),
        };
        add_counts_row(&mut table, label, counts);
    }
    add_counts_row(&mut table, header_cell("TOTAL"), breakdown.totals());
    println!("{table}");
}

pub fn print_per_year(rows: &[(Year, SexCounts)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Year"),
        header_cell("Male"),
        header_cell("Female"),
        header_cell("Total"),
    ]);
    apply_table_style(&mut table);
    align_numeric_columns(&mut table, 1..=3);
    for (year, counts) in rows {
        add_counts_row(&mut table, Cell::new(year), *counts);
    }
    println!("{table}");
}

pub fn print_series(series: &DeathSeries) {
    if let Some(label) = &series.label {
        println!("Cause: {label}");
    }
    let value_header = if series.standardized {
        "Standardized deaths"
    } else {
        "Deaths"
    };
    let mut table = Table::new();
    table.set_header(vec![header_cell("Year"), header_cell(value_header)]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for point in &series.points {
        table.add_row(vec![Cell::new(point.year), Cell::new(point.deaths)]);
    }
    for skipped in &series.skipped {
        table.add_row(vec![
            dim_cell(skipped.year),
            Cell::new(format!("skipped: {}", skipped.reason)).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn print_explain(detail: &YearStandardization, standard_name: &str) {
    println!("Year: {}", detail.year);
    println!("Standard population: {standard_name}");
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Bracket"),
        header_cell("Deaths"),
        header_cell("Population"),
        header_cell("Crude rate"),
        header_cell("Weight"),
        header_cell("Contribution"),
    ]);
    apply_table_style(&mut table);
    align_numeric_columns(&mut table, 1..=5);
    for row in &detail.brackets {
        table.add_row(vec![
            Cell::new(row.bracket),
            Cell::new(row.deaths),
            Cell::new(row.population),
            Cell::new(format!("{:.6}", row.crude_rate)),
            Cell::new(row.weight),
            Cell::new(format!("{:.2}", row.contribution)),
        ]);
    }
    table.add_row(vec![
        header_cell("TOTAL"),
        Cell::new(detail.deaths()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        Cell::new(format!("{:.2}", detail.rate())).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    if detail.unknown_age > 0 {
        println!("Deaths of unknown age (excluded): {}", detail.unknown_age);
    }
}

pub fn print_shares(shares: &ShareTable, mean: &BracketShares, projection: Option<&[(AgeBracket, f64)]>) {
    let mut table = Table::new();
    let mut header = vec![header_cell("Year")];
    header.extend(shares.brackets().iter().map(|b| header_cell(&b.to_string())));
    table.set_header(header);
    apply_table_style(&mut table);
    align_numeric_columns(&mut table, 1..=shares.brackets().len());
    for (year, row) in shares.rows() {
        let mut cells = vec![Cell::new(year)];
        cells.extend(row.iter().map(|share| Cell::new(format!("{share:.4}"))));
        table.add_row(cells);
    }
    let years: Vec<String> = mean.years.iter().map(ToString::to_string).collect();
    let mut mean_row = vec![header_cell(&format!("Mean {}", years.join(", ")))];
    mean_row.extend(
        mean.shares
            .iter()
            .map(|(_, share)| Cell::new(format!("{share:.4}")).add_attribute(Attribute::Bold)),
    );
    table.add_row(mean_row);
    if let Some(projection) = projection {
        let mut row = vec![header_cell("Projected")];
        row.extend(
            projection
                .iter()
                .map(|(_, count)| Cell::new(format!("{count:.1}")).fg(Color::Green)),
        );
        table.add_row(row);
    }
    println!("{table}");
}

fn add_counts_row(table: &mut Table, label: Cell, counts: SexCounts) {
    table.add_row(vec![
        label,
        Cell::new(counts.male),
        Cell::new(counts.female),
        Cell::new(counts.total()).add_attribute(Attribute::Bold),
    ]);
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn align_numeric_columns(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for index in columns {
        align_column(table, index, CellAlignment::Right);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
