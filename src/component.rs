//! Components are the rows of the oemof.tabular element tables.
//!
//! A [`ComponentTable`] is first created from a template (one row per region or link, holding the
//! component's name, type and bus connections) and then filled in from the parameter table by
//! [`update_component`].
use crate::finance::annuity;
use crate::parameter::{ParameterError, ParameterTable};
use crate::region::{Link, RegionID};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use std::fmt;

pub mod catalogue;
pub use catalogue::{BusEnd, Technology, ValueSource, get_technology, iter_technologies};

/// The name of the bus element table
pub const BUS_TABLE_NAME: &str = "bus";

/// The oemof.tabular type of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A bus connecting components of one carrier in one region
    Bus,
    /// A fixed demand
    Load,
    /// A source with a fixed, weather-dependent output profile
    Volatile,
    /// A source which can be dispatched freely up to its capacity
    Dispatchable,
    /// A sink for surplus energy
    Excess,
    /// A component converting one carrier into another
    Conversion,
    /// A storage unit
    Storage,
    /// A transmission line between two regions
    Link,
}

impl ComponentKind {
    /// The name of the type as used by oemof.tabular
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bus => "bus",
            Self::Load => "load",
            Self::Volatile => "volatile",
            Self::Dispatchable => "dispatchable",
            Self::Excess => "excess",
            Self::Conversion => "conversion",
            Self::Storage => "storage",
            Self::Link => "link",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value of a single component attribute
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// A numeric value
    Number(f64),
    /// A text value (e.g. a bus name)
    Text(String),
    /// A flag
    Bool(bool),
}

impl AttributeValue {
    /// The field type used to describe this value in a datapackage schema
    pub fn field_type(&self) -> &'static str {
        match self {
            Self::Number(_) => "number",
            Self::Text(_) => "string",
            Self::Bool(_) => "boolean",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Bool(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A single component, e.g. the onshore wind park of one region
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentRow {
    /// The region (or link) the component belongs to
    pub index: RegionID,
    /// The component's attributes, in output column order
    pub attributes: IndexMap<String, AttributeValue>,
}

impl ComponentRow {
    /// The unique name of the component
    pub fn name(&self) -> &str {
        match self.attributes.get("name") {
            Some(AttributeValue::Text(name)) => name,
            _ => "",
        }
    }

    /// Get the value of an attribute
    pub fn get(&self, column: &str) -> Option<&AttributeValue> {
        self.attributes.get(column)
    }

    /// Get the value of a numeric attribute
    pub fn get_number(&self, column: &str) -> Option<f64> {
        match self.attributes.get(column) {
            Some(AttributeValue::Number(value)) => Some(*value),
            _ => None,
        }
    }

    /// Set the value of an attribute, replacing any previous value
    pub fn set(&mut self, column: &str, value: AttributeValue) {
        self.attributes.insert(column.to_string(), value);
    }
}

/// The components of one element table (e.g. all onshore wind parks)
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentTable {
    /// The name of the table, which is also its file stem
    pub name: String,
    /// The components, one per region or link
    pub rows: Vec<ComponentRow>,
}

impl ComponentTable {
    /// Create the template rows for a technology.
    ///
    /// Region-based technologies get one row per region; link-based technologies get one row per
    /// link. Only the identifying attributes and bus/profile references are set.
    ///
    /// # Arguments
    ///
    /// * `technology` - The technology to create components for
    /// * `region_ids` - The scenario's regions
    /// * `links` - The scenario's links
    pub fn from_template(
        technology: &Technology,
        region_ids: &IndexSet<RegionID>,
        links: &[Link],
    ) -> Result<Self> {
        let rows = if technology.is_link() {
            ensure!(
                !links.is_empty(),
                "Component {} requires links between regions, but none are defined",
                technology.name
            );
            links
                .iter()
                .map(|link| template_row(technology, &link.id, Some(link)))
                .collect()
        } else {
            region_ids
                .iter()
                .map(|region_id| template_row(technology, region_id, None))
                .collect()
        };

        Ok(Self {
            name: technology.name.to_string(),
            rows,
        })
    }

    /// All columns used by any row, in order of first appearance
    pub fn columns(&self) -> IndexSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| row.attributes.keys().map(String::as_str))
            .collect()
    }
}

/// Build the template row for one region or link
fn template_row(technology: &Technology, index: &RegionID, link: Option<&Link>) -> ComponentRow {
    let mut row = ComponentRow {
        index: index.clone(),
        attributes: IndexMap::new(),
    };
    row.set("name", format!("{index}-{}", technology.name).as_str().into());
    row.set("type", technology.kind.as_str().into());
    row.set("carrier", technology.carrier.into());
    row.set("tech", technology.tech.into());
    for connection in &technology.buses {
        let region = match (connection.end, link) {
            (BusEnd::From, Some(link)) => &link.from,
            (BusEnd::To, Some(link)) => &link.to,
            _ => index,
        };
        row.set(
            connection.column,
            bus_name(region, connection.carrier).as_str().into(),
        );
    }
    if let Some(suffix) = &technology.profile {
        row.set("profile", format!("{index}-{suffix}").as_str().into());
    }

    row
}

/// The name of the bus for a carrier in a region
pub fn bus_name(region_id: &RegionID, carrier: &str) -> String {
    format!("{region_id}-{carrier}")
}

/// Fill in a component table's numeric attributes from the parameter table.
///
/// All parameters required by the technology are checked for every row before anything is
/// modified. If any cannot be resolved, a [`ParameterError::MissingParameter`] listing all of
/// them is returned.
///
/// # Arguments
///
/// * `table` - The component table, created with [`ComponentTable::from_template`]
/// * `technology` - The technology the table was created for
/// * `expandable` - Whether the components may have their capacity expanded
/// * `parameters` - The scenario's parameter table
pub fn update_component(
    table: &mut ComponentTable,
    technology: &Technology,
    expandable: bool,
    parameters: &ParameterTable,
) -> Result<()> {
    ensure!(
        !expandable || technology.can_expand(),
        "Component {} cannot be expandable",
        technology.name
    );

    let attributes: Vec<_> = technology.active_attributes(expandable).collect();

    let mut required = Vec::new();
    for attribute in &attributes {
        attribute.source.collect_parameters(&mut required);
    }
    let missing: IndexSet<&str> = required
        .into_iter()
        .filter(|name| {
            table
                .rows
                .iter()
                .any(|row| parameters.value_for(name, &row.index).is_err())
        })
        .collect();
    if !missing.is_empty() {
        return Err(ParameterError::MissingParameter {
            component: technology.name.to_string(),
            parameters: missing.into_iter().map(String::from).collect(),
        }
        .into());
    }

    for row in &mut table.rows {
        for attribute in &attributes {
            let value = evaluate(&attribute.source, parameters, &row.index).with_context(|| {
                format!("Could not calculate {} for {}", attribute.column, row.name())
            })?;
            row.set(attribute.column, AttributeValue::Number(value));
        }
        if technology.can_expand() {
            row.set("expandable", AttributeValue::Bool(expandable));
        }
    }

    debug!(
        "Updated {} {} component(s) from {} attribute(s)",
        table.rows.len(),
        technology.name,
        attributes.len()
    );

    Ok(())
}

/// Compute the value of a [`ValueSource`] for a region
fn evaluate(source: &ValueSource, parameters: &ParameterTable, region: &RegionID) -> Result<f64> {
    let value = match source {
        ValueSource::Parameter(name, conversion) => {
            conversion.apply(parameters.value_for(name, region)?)
        }
        ValueSource::Constant(value) => *value,
        ValueSource::Sum(sources) => sources
            .iter()
            .map(|source| evaluate(source, parameters, region))
            .sum::<Result<f64>>()?,
        ValueSource::Product(sources) => sources
            .iter()
            .map(|source| evaluate(source, parameters, region))
            .product::<Result<f64>>()?,
        ValueSource::Annuity(inputs) => {
            let capex = evaluate(&inputs.capex, parameters, region)?;
            let lifetime = evaluate(&inputs.lifetime, parameters, region)?;
            let interest = evaluate(&inputs.interest, parameters, region)?;
            let fix_om = match &inputs.fix_om {
                Some(fix_om) => evaluate(fix_om, parameters, region)?,
                None => 0.0,
            };
            annuity(capex, lifetime, interest)? + capex * fix_om
        }
    };

    Ok(value)
}

/// Build the bus table for a set of component tables.
///
/// Every bus referenced by any component is included exactly once.
pub fn build_bus_table(tables: &[ComponentTable]) -> ComponentTable {
    let mut buses: IndexMap<String, ComponentRow> = IndexMap::new();
    for table in tables {
        let Some(technology) = get_technology(&table.name) else {
            continue;
        };
        for row in &table.rows {
            for connection in &technology.buses {
                let Some(AttributeValue::Text(name)) = row.get(connection.column) else {
                    continue;
                };
                if buses.contains_key(name) {
                    continue;
                }

                // Bus names are of the form "{region}-{carrier}"
                let region = name
                    .strip_suffix(connection.carrier)
                    .and_then(|s| s.strip_suffix('-'))
                    .unwrap_or(name.as_str());
                let mut bus = ComponentRow {
                    index: region.into(),
                    attributes: IndexMap::new(),
                };
                bus.set("name", name.as_str().into());
                bus.set("type", ComponentKind::Bus.as_str().into());
                bus.set("carrier", connection.carrier.into());
                bus.set("balanced", AttributeValue::Bool(true));
                buses.insert(name.clone(), bus);
            }
        }
    }

    ComponentTable {
        name: BUS_TABLE_NAME.to_string(),
        rows: buses.into_values().collect(),
    }
}
