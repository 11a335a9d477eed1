//! The catalogue of technologies which can be included in a scenario.
//!
//! Each technology is described declaratively: which buses it connects to, which profile it
//! uses and how each of its attributes is derived from the parameter table. All technologies are
//! then built by the same generic updater ([`super::update_component`]).
use super::ComponentKind;
use crate::units::Conversion;
use indexmap::IndexMap;
use std::sync::LazyLock;

/// All technologies known to the program, keyed by name
static CATALOGUE: LazyLock<IndexMap<&'static str, Technology>> = LazyLock::new(build_catalogue);

/// Get the technology with the given name, if there is one
pub fn get_technology(name: &str) -> Option<&'static Technology> {
    CATALOGUE.get(name)
}

/// Iterate over all technologies in the catalogue
pub fn iter_technologies() -> impl Iterator<Item = &'static Technology> {
    CATALOGUE.values()
}

/// The end of a link a bus belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BusEnd {
    /// The bus in the component's own region
    Region,
    /// The bus in the region at the start of a link
    From,
    /// The bus in the region at the end of a link
    To,
}

/// A connection between a component and a bus
#[derive(Debug, Clone, PartialEq)]
pub struct BusConnection {
    /// The column holding the bus name (e.g. `bus`, `from_bus`)
    pub column: &'static str,
    /// The carrier of the bus
    pub carrier: &'static str,
    /// Which region the bus belongs to
    pub end: BusEnd,
}

/// Where the value of a numeric attribute comes from
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    /// A parameter from the parameter table with a unit conversion
    Parameter(String, Conversion),
    /// A fixed value
    Constant(f64),
    /// The sum of several values
    Sum(Vec<ValueSource>),
    /// The product of several values
    Product(Vec<ValueSource>),
    /// The annualised investment cost
    Annuity(Box<AnnuitySource>),
}

/// The inputs for an annualised investment cost.
///
/// The resulting value is `annuity(capex, lifetime, interest) + capex * fix_om`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnuitySource {
    /// Capital expenditure per unit of capacity
    pub capex: ValueSource,
    /// Lifetime in years
    pub lifetime: ValueSource,
    /// Interest rate as a fraction
    pub interest: ValueSource,
    /// Fixed operation and maintenance costs as a fraction of capex per year
    pub fix_om: Option<ValueSource>,
}

/// How a single attribute of a component is derived
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSpec {
    /// The name of the output column
    pub column: &'static str,
    /// How to compute the value
    pub source: ValueSource,
    /// Whether the attribute only applies to expandable components
    pub expansion_only: bool,
}

/// A technology which can be included in a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct Technology {
    /// Unique name of the technology (e.g. "wind-onshore")
    pub name: &'static str,
    /// The oemof.tabular component type
    pub kind: ComponentKind,
    /// The main carrier of the technology
    pub carrier: &'static str,
    /// The technology label used in results
    pub tech: &'static str,
    /// The buses the component is connected to
    pub buses: Vec<BusConnection>,
    /// The suffix of the profile column used by the component, if any
    pub profile: Option<String>,
    /// The numeric attributes of the component
    pub attributes: Vec<AttributeSpec>,
}

impl Technology {
    /// Whether components of this technology are defined per link rather than per region
    pub fn is_link(&self) -> bool {
        self.kind == ComponentKind::Link
    }

    /// Whether this technology supports capacity expansion
    pub fn can_expand(&self) -> bool {
        self.attributes.iter().any(|attr| attr.expansion_only)
    }

    /// Iterate over the attributes which apply to a component
    pub fn active_attributes(&self, expandable: bool) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes
            .iter()
            .filter(move |attr| expandable || !attr.expansion_only)
    }
}

impl ValueSource {
    /// Append the names of all parameters this value depends on to `names`
    pub fn collect_parameters<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Parameter(name, _) => names.push(name),
            Self::Constant(_) => {}
            Self::Sum(sources) | Self::Product(sources) => {
                for source in sources {
                    source.collect_parameters(names);
                }
            }
            Self::Annuity(annuity) => {
                annuity.capex.collect_parameters(names);
                annuity.lifetime.collect_parameters(names);
                annuity.interest.collect_parameters(names);
                if let Some(fix_om) = &annuity.fix_om {
                    fix_om.collect_parameters(names);
                }
            }
        }
    }
}

fn param(name: &str, conversion: Conversion) -> ValueSource {
    ValueSource::Parameter(name.to_string(), conversion)
}

fn attr(column: &'static str, source: ValueSource) -> AttributeSpec {
    AttributeSpec {
        column,
        source,
        expansion_only: false,
    }
}

fn expansion_attr(column: &'static str, source: ValueSource) -> AttributeSpec {
    AttributeSpec {
        column,
        source,
        expansion_only: true,
    }
}

fn annuity(capex: ValueSource, lifetime: &str, interest: &str, fix_om: &str) -> ValueSource {
    ValueSource::Annuity(Box::new(AnnuitySource {
        capex,
        lifetime: param(lifetime, Conversion::None),
        interest: param(interest, Conversion::PercentToFraction),
        fix_om: Some(param(fix_om, Conversion::PercentToFraction)),
    }))
}

fn bus(carrier: &'static str) -> Vec<BusConnection> {
    vec![BusConnection {
        column: "bus",
        carrier,
        end: BusEnd::Region,
    }]
}

fn demand(name: &'static str, carrier: &'static str, energy_key: &str) -> Technology {
    Technology {
        name,
        kind: ComponentKind::Load,
        carrier,
        tech: "demand",
        buses: bus(carrier),
        profile: Some(format!("{name}-profile")),
        attributes: vec![attr(
            "amount",
            param(
                &format!("Energy_FinalEnergy_{energy_key}"),
                Conversion::GWhToMWh,
            ),
        )],
    }
}

fn shortage(name: &'static str, carrier: &'static str, energy_key: &str) -> Technology {
    Technology {
        name,
        kind: ComponentKind::Dispatchable,
        carrier,
        tech: "shortage",
        buses: bus(carrier),
        profile: None,
        attributes: vec![attr(
            "marginal_cost",
            param(
                &format!("Energy_SlackCost_{energy_key}"),
                Conversion::PerGWhToPerMWh,
            ),
        )],
    }
}

fn volatile(name: &'static str, tech: &'static str, key: &str) -> Technology {
    let param_name = |quantity: &str| format!("EnergyConversion_{quantity}_Electricity_{key}");
    Technology {
        name,
        kind: ComponentKind::Volatile,
        carrier: "electricity",
        tech,
        buses: bus("electricity"),
        profile: Some(format!("{name}-profile")),
        attributes: vec![
            attr("capacity", param(&param_name("Capacity"), Conversion::None)),
            attr(
                "marginal_cost",
                param(&param_name("VarOM"), Conversion::PerGWhToPerMWh),
            ),
            expansion_attr(
                "capacity_cost",
                annuity(
                    param(&param_name("Capex"), Conversion::None),
                    &param_name("LifeTime"),
                    "EnergyConversion_InterestRate_ALL",
                    &param_name("FixOM"),
                ),
            ),
        ],
    }
}

fn conversion(
    name: &'static str,
    from: &'static str,
    to: &'static str,
    tech: &'static str,
    key: &str,
) -> Technology {
    let param_name = |quantity: &str| format!("EnergyConversion_{quantity}_{key}");
    Technology {
        name,
        kind: ComponentKind::Conversion,
        carrier: from,
        tech,
        buses: vec![
            BusConnection {
                column: "from_bus",
                carrier: from,
                end: BusEnd::Region,
            },
            BusConnection {
                column: "to_bus",
                carrier: to,
                end: BusEnd::Region,
            },
        ],
        profile: None,
        attributes: vec![
            attr("capacity", param(&param_name("Capacity"), Conversion::None)),
            attr(
                "efficiency",
                param(&param_name("Eta"), Conversion::PercentToFraction),
            ),
            attr(
                "marginal_cost",
                param(&param_name("VarOM"), Conversion::PerGWhToPerMWh),
            ),
            expansion_attr(
                "capacity_cost",
                annuity(
                    param(&param_name("Capex"), Conversion::None),
                    &param_name("LifeTime"),
                    "EnergyConversion_InterestRate_ALL",
                    &param_name("FixOM"),
                ),
            ),
        ],
    }
}

fn storage(name: &'static str, carrier: &'static str, tech: &'static str, key: &str) -> Technology {
    let param_name = |quantity: &str| format!("Storage_{quantity}_{key}");
    Technology {
        name,
        kind: ComponentKind::Storage,
        carrier,
        tech,
        buses: bus(carrier),
        profile: None,
        attributes: vec![
            attr(
                "capacity",
                param(&param_name("Capacity_Charge"), Conversion::None),
            ),
            attr(
                "storage_capacity",
                param(&param_name("Capacity_Store"), Conversion::GWhToMWh),
            ),
            attr(
                "efficiency",
                param(&param_name("Eta_Charge"), Conversion::PercentToFraction),
            ),
            attr(
                "loss_rate",
                param(&param_name("SelfDischarge"), Conversion::PercentToFraction),
            ),
            attr(
                "marginal_cost",
                param(&param_name("VarOM"), Conversion::PerGWhToPerMWh),
            ),
            expansion_attr(
                "capacity_cost",
                annuity(
                    param(&param_name("Capex_Charge"), Conversion::None),
                    &param_name("LifeTime"),
                    "Storage_InterestRate_ALL",
                    &param_name("FixOM_Charge"),
                ),
            ),
            expansion_attr(
                "storage_capacity_cost",
                annuity(
                    param(&param_name("Capex_Store"), Conversion::PerGWhToPerMWh),
                    &param_name("LifeTime"),
                    "Storage_InterestRate_ALL",
                    &param_name("FixOM_Store"),
                ),
            ),
        ],
    }
}

fn build_catalogue() -> IndexMap<&'static str, Technology> {
    let technologies = [
        demand("electricity-demand", "electricity", "Electricity"),
        shortage("electricity-shortage", "electricity", "Electricity"),
        Technology {
            name: "electricity-curtailment",
            kind: ComponentKind::Excess,
            carrier: "electricity",
            tech: "curtailment",
            buses: bus("electricity"),
            profile: None,
            attributes: vec![attr(
                "marginal_cost",
                param(
                    "Energy_CurtailmentCost_Electricity",
                    Conversion::PerGWhToPerMWh,
                ),
            )],
        },
        volatile("wind-onshore", "onshore", "Wind_Onshore"),
        volatile("wind-offshore", "offshore", "Wind_Offshore"),
        volatile("solar-pv", "pv", "Solar_PV"),
        volatile("hydro-ror", "ror", "Hydro_ROR"),
        conversion("electricity-gt", "ch4", "electricity", "gt", "Electricity_CH4_GT"),
        storage(
            "electricity-liion-battery",
            "electricity",
            "liion-battery",
            "Electricity_LiIonBattery",
        ),
        Technology {
            name: "electricity-transmission",
            kind: ComponentKind::Link,
            carrier: "electricity",
            tech: "transmission",
            buses: vec![
                BusConnection {
                    column: "from_bus",
                    carrier: "electricity",
                    end: BusEnd::From,
                },
                BusConnection {
                    column: "to_bus",
                    carrier: "electricity",
                    end: BusEnd::To,
                },
            ],
            profile: None,
            attributes: vec![
                attr(
                    "capacity",
                    param("Transmission_Capacity_Electricity_Grid", Conversion::None),
                ),
                attr(
                    "loss",
                    param(
                        "Transmission_Losses_Electricity_Grid",
                        Conversion::PercentToFraction,
                    ),
                ),
                attr(
                    "marginal_cost",
                    param(
                        "Transmission_VarOM_Electricity_Grid",
                        Conversion::PerGWhToPerMWh,
                    ),
                ),
                expansion_attr(
                    "capacity_cost",
                    annuity(
                        param("Transmission_Capex_Electricity_Grid", Conversion::None),
                        "Transmission_LifeTime_Electricity_Grid",
                        "Transmission_InterestRate_Electricity_Grid",
                        "Transmission_FixOM_Electricity_Grid",
                    ),
                ),
            ],
        },
        demand("heat-demand", "heat", "Heat"),
        shortage("heat-shortage", "heat", "Heat"),
        conversion("heat-boiler", "ch4", "heat", "boiler", "Heat_CH4_Boiler"),
        conversion("heat-pth", "electricity", "heat", "pth", "Heat_Electricity_PtH"),
        storage("heat-storage", "heat", "storage", "Heat_Sensible"),
        Technology {
            name: "ch4-supply",
            kind: ComponentKind::Dispatchable,
            carrier: "ch4",
            tech: "supply",
            buses: bus("ch4"),
            profile: None,
            attributes: vec![attr(
                "marginal_cost",
                ValueSource::Sum(vec![
                    param("Energy_Price_CH4", Conversion::PerGWhToPerMWh),
                    ValueSource::Product(vec![
                        param("Energy_Price_CO2", Conversion::None),
                        param("SpecificEmission_CO2_CH4", Conversion::PerGWhToPerMWh),
                    ]),
                ]),
            )],
        },
    ];

    technologies
        .into_iter()
        .map(|technology| (technology.name, technology))
        .collect()
}
