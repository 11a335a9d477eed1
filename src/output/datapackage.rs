//! Write the `datapackage.json` descriptor for an oemof.tabular datapackage.
//!
//! Every element and sequence table is described as a tabular data resource. Element tables use
//! `name` as their primary key and declare foreign keys for their bus and profile references, so
//! that oemof.tabular can resolve them when the package is loaded.
use super::{TIMEINDEX_COLUMN, element_path, sequence_path};
use crate::component::{BUS_TABLE_NAME, ComponentTable};
use crate::profile::SequenceTable;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The file name of the datapackage descriptor
const DATAPACKAGE_FILE_NAME: &str = "datapackage.json";

/// Columns which refer to a row of the bus table
const BUS_COLUMNS: [&str; 3] = ["bus", "from_bus", "to_bus"];

/// The column which refers to a column of a sequence table
const PROFILE_COLUMN: &str = "profile";

#[derive(Debug, Serialize)]
struct DataPackage<'a> {
    name: &'a str,
    resources: Vec<Resource>,
}

#[derive(Debug, Serialize)]
struct Resource {
    path: String,
    profile: &'static str,
    name: String,
    format: &'static str,
    mediatype: &'static str,
    encoding: &'static str,
    schema: Schema,
}

#[derive(Debug, Serialize)]
struct Schema {
    fields: Vec<Field>,
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    primary_key: Option<&'static str>,
    #[serde(rename = "foreignKeys", skip_serializing_if = "Vec::is_empty")]
    foreign_keys: Vec<ForeignKey>,
}

#[derive(Debug, Serialize)]
struct Field {
    name: String,
    #[serde(rename = "type")]
    field_type: &'static str,
}

#[derive(Debug, Serialize)]
struct ForeignKey {
    fields: String,
    reference: Reference,
}

#[derive(Debug, Serialize)]
struct Reference {
    resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'static str>,
}

impl Resource {
    fn new(path: &Path, name: String, schema: Schema) -> Self {
        Self {
            // Resource paths always use forward slashes
            path: path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            profile: "tabular-data-resource",
            name,
            format: "csv",
            mediatype: "text/csv",
            encoding: "utf-8",
            schema,
        }
    }
}

/// Describe an element table
fn element_resource(table: &ComponentTable, sequences: &[SequenceTable]) -> Resource {
    let fields = table
        .columns()
        .into_iter()
        .map(|column| Field {
            name: column.to_string(),
            field_type: table
                .rows
                .iter()
                .find_map(|row| row.get(column))
                .map_or("string", |value| value.field_type()),
        })
        .collect::<Vec<_>>();

    let mut foreign_keys = Vec::new();
    if table.name != BUS_TABLE_NAME {
        for column in BUS_COLUMNS {
            if fields.iter().any(|field| field.name == column) {
                foreign_keys.push(ForeignKey {
                    fields: column.to_string(),
                    reference: Reference {
                        resource: BUS_TABLE_NAME.to_string(),
                        fields: Some("name"),
                    },
                });
            }
        }
    }

    // Profiles refer to a column of the sequence table which provides them
    let profile = table
        .rows
        .first()
        .and_then(|row| row.get(PROFILE_COLUMN))
        .map(|value| value.to_string());
    if let Some(sequence) = profile.and_then(|profile| {
        sequences
            .iter()
            .find(|sequence| sequence.columns.contains_key(&profile))
    }) {
        foreign_keys.push(ForeignKey {
            fields: PROFILE_COLUMN.to_string(),
            reference: Reference {
                resource: sequence.resource_name(),
                fields: None,
            },
        });
    }

    Resource::new(
        &element_path(&table.name),
        table.name.clone(),
        Schema {
            fields,
            primary_key: Some("name"),
            foreign_keys,
        },
    )
}

/// Describe a sequence table
fn sequence_resource(table: &SequenceTable) -> Resource {
    let fields = std::iter::once(Field {
        name: TIMEINDEX_COLUMN.to_string(),
        field_type: "datetime",
    })
    .chain(table.columns.keys().map(|column| Field {
        name: column.clone(),
        field_type: "number",
    }))
    .collect();

    let name = table.resource_name();
    Resource::new(
        &sequence_path(&name),
        name,
        Schema {
            fields,
            primary_key: None,
            foreign_keys: Vec::new(),
        },
    )
}

/// Write `datapackage.json` to the datapackage root.
///
/// # Arguments
///
/// * `datapackage_dir` - The root of the datapackage
/// * `name` - The name of the datapackage
/// * `components` - All element tables, including the bus table
/// * `sequences` - All sequence tables
pub fn write_datapackage(
    datapackage_dir: &Path,
    name: &str,
    components: &[ComponentTable],
    sequences: &[SequenceTable],
) -> Result<()> {
    let resources = components
        .iter()
        .map(|table| element_resource(table, sequences))
        .chain(sequences.iter().map(sequence_resource))
        .collect();
    let package = DataPackage { name, resources };

    let file_path = datapackage_dir.join(DATAPACKAGE_FILE_NAME);
    let json = serde_json::to_string_pretty(&package)?;
    fs::write(&file_path, json)
        .with_context(|| format!("Could not write {}", file_path.display()))?;

    Ok(())
}
