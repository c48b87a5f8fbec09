use super::ui;
use crate::core::{Aggregator, ProviderSpec};
use anyhow::Result;
use comfy_table::Cell;

pub fn display_as_table(specs: &[&ProviderSpec]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Provider"),
        ui::header_cell("Source"),
        ui::header_cell("Base URL"),
        ui::header_cell("TTL"),
        ui::header_cell("Timeout"),
        ui::header_cell("Min interval"),
    ]);

    for spec in specs {
        table.add_row(vec![
            Cell::new(spec.id),
            Cell::new(spec.id.source()),
            Cell::new(&spec.base_url),
            ui::number_cell(ui::format_duration(spec.ttl)),
            ui::number_cell(ui::format_duration(spec.timeout)),
            ui::format_optional_cell(spec.min_interval, ui::format_duration),
        ]);
    }
    table.to_string()
}

pub fn run(aggregator: &Aggregator) -> Result<()> {
    println!("{}", display_as_table(&aggregator.specs()));
    Ok(())
}
