//! Fixtures for tests

use crate::parameter::{ParameterRow, ParameterTable};
use crate::region::{Link, RegionID};
use indexmap::IndexSet;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a single row of a parameter table
pub fn parameter_row(scenario: &str, region: &str, parameter: &str, value: f64) -> ParameterRow {
    ParameterRow {
        scenario: scenario.to_string(),
        region: region.to_string(),
        parameter: parameter.to_string(),
        value,
        unit: String::new(),
    }
}

#[fixture]
pub fn region_ids() -> IndexSet<RegionID> {
    IndexSet::from(["AT".into(), "DE".into()])
}

#[fixture]
pub fn links(region_ids: IndexSet<RegionID>) -> Vec<Link> {
    vec![Link::parse("AT-DE", &region_ids).unwrap()]
}

/// A parameter table with the inputs for gas turbines, gas supply and transmission
#[fixture]
pub fn parameter_table() -> ParameterTable {
    let rows = [
        ("AT", "EnergyConversion_Capacity_Electricity_CH4_GT", 1000.0),
        ("DE", "EnergyConversion_Capacity_Electricity_CH4_GT", 2000.0),
        ("ALL", "EnergyConversion_Eta_Electricity_CH4_GT", 40.0),
        ("ALL", "EnergyConversion_VarOM_Electricity_CH4_GT", 3000.0),
        ("ALL", "EnergyConversion_Capex_Electricity_CH4_GT", 400_000.0),
        ("ALL", "EnergyConversion_LifeTime_Electricity_CH4_GT", 20.0),
        ("ALL", "EnergyConversion_FixOM_Electricity_CH4_GT", 3.0),
        ("ALL", "EnergyConversion_InterestRate_ALL", 5.0),
        ("ALL", "Energy_Price_CH4", 20_000.0),
        ("ALL", "Energy_Price_CO2", 100.0),
        ("ALL", "SpecificEmission_CO2_CH4", 200.0),
        ("AT-DE", "Transmission_Capacity_Electricity_Grid", 500.0),
        ("ALL", "Transmission_Losses_Electricity_Grid", 5.0),
        ("ALL", "Transmission_VarOM_Electricity_Grid", 0.0),
    ];

    ParameterTable::from_rows(
        "base",
        rows.into_iter()
            .map(|(region, parameter, value)| parameter_row("base", region, parameter, value)),
    )
    .unwrap()
}
