use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use balloon_cli::commands::{CheckReport, TypeRow};
use balloon_model::SchemaDifference;

pub fn print_check(report: &CheckReport) {
    println!("Schema: {}", report.path.display());
    let mut table = Table::new();
    table.set_header(vec![header_cell("Section"), header_cell("Entries")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (section, count) in [
        ("Units", report.units),
        ("Constants", report.constants),
        ("Types", report.types),
        ("Configurations", report.configurations),
        ("Telecommands", report.telecommands),
        ("Telemetry types", report.telemetry_types),
    ] {
        table.add_row(vec![Cell::new(section), count_cell(count)]);
    }
    println!("{table}");

    let mut derived = Table::new();
    derived.set_header(vec![header_cell("Derived constant"), header_cell("Value")]);
    apply_table_style(&mut derived);
    for (name, value) in &report.derived_constants {
        derived.add_row(vec![Cell::new(name), Cell::new(value.to_string())]);
    }
    println!("{derived}");
}

pub fn print_types(rows: &[TypeRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Kind"),
        header_cell("Base"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        let name = if row.derived {
            dim_cell(&row.name)
        } else {
            Cell::new(&row.name)
        };
        table.add_row(vec![
            name,
            Cell::new(row.kind),
            Cell::new(&row.base_type),
            Cell::new(&row.description),
        ]);
    }
    println!("{table}");
}

pub fn print_differences(differences: &[SchemaDifference]) {
    if differences.is_empty() {
        println!("Schemas are equal");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Section"),
        header_cell("Entry"),
        header_cell("Difference"),
    ]);
    apply_table_style(&mut table);
    for difference in differences {
        table.add_row(vec![
            Cell::new(difference.section.to_string()),
            Cell::new(&difference.entry),
            Cell::new(&difference.detail).fg(Color::Yellow),
        ]);
    }
    println!("{table}");
    println!("{} difference(s)", differences.len());
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

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
