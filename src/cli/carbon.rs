use super::ui;
use crate::core::carbon::{self, CarbonFootprint, CarbonInput};
use anyhow::{Context, Result};
use comfy_table::Cell;

impl CarbonFootprint {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Category"),
            ui::header_cell("kg CO2e"),
        ]);

        let rows = [
            ("Electricity", self.breakdown.electricity_kg_co2e),
            ("Natural gas", self.breakdown.natural_gas_kg_co2e),
            ("Fuel", self.breakdown.fuel_kg_co2e),
            ("Flights", self.breakdown.flights_kg_co2e),
        ];
        for (category, value) in rows {
            table.add_row(vec![Cell::new(category), ui::number_cell(format!("{value:.2}"))]);
        }

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Carbon Footprint", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n\n{}: {} ({:.3} t)",
            ui::style_text("Total kg CO2e", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", self.total_kg_co2e), ui::StyleType::TotalValue),
            self.total_tons_co2e
        ));
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Equivalent to {:.1} trees for a year, or {:.1} car-days off the road",
                    self.equivalents.trees_needed_to_offset, self.equivalents.cars_off_road_days
                ),
                ui::StyleType::Subtle
            )
        ));
        output
    }
}

pub fn run(input: &CarbonInput, json: bool) -> Result<()> {
    input.validate().context("Invalid carbon input")?;
    let footprint = carbon::compute(input);

    if json {
        println!("{}", serde_json::to_string_pretty(&footprint)?);
    } else {
        println!("{}", footprint.display_as_table());
    }
    Ok(())
}
