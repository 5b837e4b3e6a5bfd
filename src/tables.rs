use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::core::{
    metrics::{Split, daily_mix_ratio, sum_column},
    reading::{Column, DailySeries, InstantReading},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

pub fn build_current_table(reading: &InstantReading, split: &Split) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Power", "Active", "Share"]);
    table.add_row(vec![
        Cell::new("Import"),
        Cell::new(format!("{:.0} W", reading.consumption)).set_alignment(CellAlignment::Right),
        active_cell(split.import_active, Color::Red),
        Cell::new(format!("{:.0}%", split.import_pct)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Export"),
        Cell::new(format!("{:.0} W", reading.production)).set_alignment(CellAlignment::Right),
        active_cell(split.export_active, Color::Green),
        Cell::new(format!("{:.0}%", split.export_pct)).set_alignment(CellAlignment::Right),
    ]);
    table
}

pub fn build_daily_series_table(series: &DailySeries) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Timestamp", "Production", "Consumption"]);
    for sample in series {
        table.add_row(vec![
            Cell::new(&sample.timestamp).add_attribute(Attribute::Dim),
            Cell::new(sample.production).set_alignment(CellAlignment::Right),
            Cell::new(sample.consumption).set_alignment(CellAlignment::Right),
        ]);
    }
    let production = sum_column(series, Column::Production);
    let consumption = sum_column(series, Column::Consumption);
    table.add_row(vec![
        Cell::new(format!("Total (mix {:.0}%)", daily_mix_ratio(production, consumption) * 100.0))
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{production:.3}")).set_alignment(CellAlignment::Right),
        Cell::new(format!("{consumption:.3}")).set_alignment(CellAlignment::Right),
    ]);
    table
}

fn active_cell(is_active: bool, color: Color) -> Cell {
    if is_active { Cell::new("on").fg(color) } else { Cell::new("off").add_attribute(Attribute::Dim) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::derive_current_split;

    #[test]
    fn daily_series_table_has_total_row() {
        let series = DailySeries::from_records(["10:00,1.5,2.0", "10:05,bad,3.0"]);
        let table = build_daily_series_table(&series);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn current_table_ok() {
        let reading = InstantReading { production: 200.0, consumption: 800.0 };
        let table = build_current_table(&reading, &derive_current_split(800.0, 200.0));
        assert_eq!(table.row_count(), 2);
    }
}
