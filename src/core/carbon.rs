//! Carbon footprint estimate from fixed EPA/DEFRA emission factors.

use super::error::InputError;
use serde::{Deserialize, Serialize};

/// kg CO2e per kWh, global grid average.
pub const ELECTRICITY_FACTOR: f64 = 0.475;
/// kg CO2e per therm of natural gas.
pub const GAS_FACTOR: f64 = 5.3;
/// kg CO2e per liter of petrol or diesel.
pub const FUEL_FACTOR: f64 = 2.31;
/// kg CO2e per economy passenger-km.
pub const FLIGHT_FACTOR: f64 = 0.255;
/// kg CO2 an average tree absorbs per year.
pub const TREE_KG_PER_YEAR: f64 = 21.77;
/// kg CO2 an average car emits per day.
pub const CAR_KG_PER_DAY: f64 = 11.2;

pub const SOURCE: &str = "local_calculation";

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CarbonInput {
    pub electricity_kwh: f64,
    pub natural_gas_therms: f64,
    pub fuel_liters: f64,
    pub flights_km: f64,
}

impl CarbonInput {
    /// Rejects negative (and non-numeric) quantities.
    pub fn validate(&self) -> Result<(), InputError> {
        let fields = [
            ("electricity_kwh", self.electricity_kwh),
            ("natural_gas_therms", self.natural_gas_therms),
            ("fuel_liters", self.fuel_liters),
            ("flights_km", self.flights_km),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(InputError::invalid(field, format!("{value} is not a number")));
            }
            if value < 0.0 {
                return Err(InputError::Negative(field));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakdown {
    pub electricity_kg_co2e: f64,
    pub natural_gas_kg_co2e: f64,
    pub fuel_kg_co2e: f64,
    pub flights_kg_co2e: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Equivalents {
    pub trees_needed_to_offset: f64,
    pub cars_off_road_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarbonFootprint {
    pub total_kg_co2e: f64,
    pub total_tons_co2e: f64,
    pub breakdown: Breakdown,
    pub equivalents: Equivalents,
    pub source: &'static str,
}

fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Pure arithmetic; callers validate the input first.
pub fn compute(input: &CarbonInput) -> CarbonFootprint {
    let electricity = input.electricity_kwh * ELECTRICITY_FACTOR;
    let gas = input.natural_gas_therms * GAS_FACTOR;
    let fuel = input.fuel_liters * FUEL_FACTOR;
    let flights = input.flights_km * FLIGHT_FACTOR;
    let total = electricity + gas + fuel + flights;

    CarbonFootprint {
        total_kg_co2e: round_to(total, 2),
        total_tons_co2e: round_to(total / 1000.0, 3),
        breakdown: Breakdown {
            electricity_kg_co2e: round_to(electricity, 2),
            natural_gas_kg_co2e: round_to(gas, 2),
            fuel_kg_co2e: round_to(fuel, 2),
            flights_kg_co2e: round_to(flights, 2),
        },
        equivalents: Equivalents {
            trees_needed_to_offset: round_to(total / TREE_KG_PER_YEAR, 1),
            cars_off_road_days: round_to(total / CAR_KG_PER_DAY, 1),
        },
        source: SOURCE,
    }
}
