//! Unit conversions applied when copying values from the parameter table into components.
//!
//! Parameters are given in the units of the FlexMex templates (GWh, Eur/GWh, %), whereas
//! oemof.tabular components are expressed in MW/MWh.

/// Number of MWh in a GWh
const MWH_PER_GWH: f64 = 1000.0;

/// A unit conversion applied to a single value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// Use the value unchanged
    None,
    /// Convert a percentage to a fraction (e.g. 40 -> 0.4)
    PercentToFraction,
    /// Convert an energy from GWh to MWh
    GWhToMWh,
    /// Convert a specific cost or intensity from per-GWh to per-MWh
    PerGWhToPerMWh,
}

impl Conversion {
    /// Apply the conversion to `value`
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::None => value,
            Self::PercentToFraction => value / 100.0,
            Self::GWhToMWh => value * MWH_PER_GWH,
            Self::PerGWhToPerMWh => value / MWH_PER_GWH,
        }
    }
}
