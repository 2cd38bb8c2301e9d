use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use waitlist_cli::logging::redact_value;
use waitlist_cli::types::RunResult;
use waitlist_ingest::Exclusion;
use waitlist_model::{ListType, Outcome};

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.input.display());
    if let Some(path) = &result.config_path {
        println!("Config: {}", path.display());
    }
    match &result.outputs {
        Some(files) => {
            println!("Records: {}", files.records.display());
            println!("Report: {}", files.report.display());
        }
        None => println!("Dry run: no files written"),
    }
    println!(
        "Rows read: {}  excluded by population filter: {}",
        result.rows_read,
        result.excluded_count()
    );
    if result.excluded_count() > 0 {
        print_exclusion_table(result);
    }
    print_list_type_table(result);
    print_outcome_table(result);
    print_failure_table(result);
}

fn print_exclusion_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Excluded"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for exclusion in Exclusion::ALL {
        let count = result.excluded.get(&exclusion).copied().unwrap_or(0);
        table.add_row(vec![Cell::new(exclusion), count_cell(count, Color::Yellow)]);
    }
    println!("{table}");
}

fn print_list_type_table(result: &RunResult) {
    let report = &result.report;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("List type"),
        header_cell("Patients"),
        header_cell("Registrations"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for list_type in ListType::ALL {
        table.add_row(vec![
            Cell::new(list_type.as_str()),
            Cell::new(report.patients.get(list_type)),
            Cell::new(report.registrations.get(list_type)),
        ]);
    }
    table.add_row(vec![
        header_cell("TOTAL"),
        Cell::new(report.input_patients).add_attribute(Attribute::Bold),
        Cell::new(report.input_registrations).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

fn print_outcome_table(result: &RunResult) {
    let report = &result.report;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Outcome"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for outcome in Outcome::ALL {
        table.add_row(vec![
            Cell::new(outcome),
            count_cell(report.outcome_count(outcome), Color::Green),
        ]);
    }
    table.add_row(vec![
        header_cell("TOTAL"),
        Cell::new(report.output_records).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
    println!(
        "Concurrent episodes collapsed: {}  warnings: {}",
        report.episodes_collapsed,
        report.warning_count()
    );
}

fn print_failure_table(result: &RunResult) {
    let report = &result.report;
    if report.failures.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Patient"),
        header_cell("Failure"),
        header_cell("Registrations"),
        header_cell("Message"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for failure in &report.failures {
        table.add_row(vec![
            Cell::new(redact_value(failure.patient_id.as_str())),
            Cell::new(failure.kind).fg(Color::Red),
            Cell::new(failure.registration_ids.len()),
            Cell::new(&failure.message),
        ]);
    }
    println!();
    println!("Excluded patients:");
    println!("{table}");
    for (kind, count) in report.failures_by_kind() {
        println!("- {kind}: {count} patient(s)");
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
