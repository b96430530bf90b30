use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use crossterm::style::Stylize;

use crate::data::column_stats::ColumnStatistics;
use crate::data::data_view::{HeaderCell, RenderDescriptor};
use crate::data::datavalue_compare::SortDirection;
use crate::data::range_filter::FilterPanel;
use crate::data::value_formatter::{CellTone, FormattedCell};

/// Header text with the sort arrow of the active sort column
pub fn header_label(header: &HeaderCell) -> String {
    match header.sort {
        Some(SortDirection::Ascending) => format!("{} ↑", header.name),
        Some(SortDirection::Descending) => format!("{} ↓", header.name),
        None => header.name.clone(),
    }
}

fn body_cell(cell: &FormattedCell) -> Cell {
    let mut out = Cell::new(&cell.text);
    if cell.numeric {
        out = out.set_alignment(CellAlignment::Right);
    }
    match cell.tone {
        CellTone::Positive => out.fg(Color::Green),
        CellTone::Negative => out.fg(Color::Red),
        CellTone::Neutral => out,
    }
}

/// Build the table for the current page
pub fn build_page_table(descriptor: &RenderDescriptor) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let headers: Vec<Cell> = descriptor
        .headers
        .iter()
        .map(|h| {
            let cell = Cell::new(header_label(h)).add_attribute(Attribute::Bold);
            if h.sort.is_some() {
                cell.fg(Color::Cyan)
            } else {
                cell
            }
        })
        .collect();
    table.set_header(headers);

    for row in &descriptor.rows {
        table.add_row(row.iter().map(body_cell).collect::<Vec<_>>());
    }

    table
}

/// Full page text: table, page info and filter status
pub fn render_page(descriptor: &RenderDescriptor) -> String {
    let mut out = String::new();

    if descriptor.rows.is_empty() {
        out.push_str(&format!("{}\n", "No matching rows.".yellow()));
    } else {
        out.push_str(&format!("{}\n", build_page_table(descriptor)));
    }

    let mut nav = descriptor.page_info.clone();
    if descriptor.has_previous {
        nav.push_str("  [prev]");
    }
    if descriptor.has_next {
        nav.push_str("  [next]");
    }
    out.push_str(&format!("{}\n", nav.green()));
    out.push_str(&format!("{}", descriptor.filter_status.clone().dark_grey()));

    if !descriptor.search_term.is_empty() {
        out.push_str(&format!(
            "\n{}",
            format!("Search: \"{}\"", descriptor.search_term).cyan()
        ));
    }

    out
}

/// Show the untruncated text of one cell on the current page
pub fn render_cell_detail(descriptor: &RenderDescriptor, row: usize, column: &str) -> Option<String> {
    let col = descriptor.headers.iter().position(|h| h.name == column)?;
    let cell = descriptor.rows.get(row)?.get(col)?;
    Some(format!("{}: {}", column.bold(), cell.full()))
}

/// Min, max and average of every numeric column
pub fn build_statistics_table(stats: &ColumnStatistics) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Column", "Min", "Max", "Average", "Values", "Empty"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for stat in stats.iter() {
        table.add_row(vec![
            Cell::new(&stat.column_name),
            Cell::new(format!("{:.2}", stat.min)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stat.max)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", stat.average)).set_alignment(CellAlignment::Right),
            Cell::new(stat.numeric_count).set_alignment(CellAlignment::Right),
            Cell::new(stat.empty_count).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}

/// One line per numeric column: enabled flag, chosen bounds and data range
pub fn build_filter_panel_table(panel: &FilterPanel) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        ["Column", "On", "Min", "Max", "Data range", "Avg"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for control in panel.controls() {
        let enabled = if control.enabled {
            Cell::new("x").fg(Color::Green)
        } else {
            Cell::new("")
        };
        table.add_row(vec![
            Cell::new(&control.column),
            enabled,
            Cell::new(format!("{:.2}", control.min)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2}", control.max)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.2} .. {:.2}", control.data_min, control.data_max)),
            Cell::new(format!("{:.2}", control.average)).set_alignment(CellAlignment::Right),
        ]);
    }

    table
}
