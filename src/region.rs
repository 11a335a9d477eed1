//! Regions and the transmission links between them.
use crate::id::{IDCollection, define_id_type};
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;

define_id_type! {RegionID}

/// The region name used in input tables for values which apply to every region
pub const ALL_REGIONS: &str = "ALL";

/// Separator between the two regions in a link ID (e.g. "AT-DE")
const LINK_SEPARATOR: char = '-';

/// A connection between two regions.
///
/// Links are identified by a pseudo-region ID of the form `{from}-{to}`, which is also the key
/// used for link parameters in the parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// The ID of the link (e.g. "AT-DE")
    pub id: RegionID,
    /// The region at the start of the link
    pub from: RegionID,
    /// The region at the end of the link
    pub to: RegionID,
}

impl Link {
    /// Parse a link ID, checking that both ends are known regions.
    ///
    /// # Arguments
    ///
    /// * `id` - A link ID of the form `{from}-{to}`
    /// * `region_ids` - All valid region IDs
    pub fn parse(id: &str, region_ids: &IndexSet<RegionID>) -> Result<Self> {
        let (from, to) = id.split_once(LINK_SEPARATOR).with_context(|| {
            format!("Invalid link '{id}': links must be of the form 'FROM{LINK_SEPARATOR}TO'")
        })?;
        let from = region_ids
            .get_id(from.trim())
            .with_context(|| format!("Invalid start region for link '{id}'"))?;
        let to = region_ids
            .get_id(to.trim())
            .with_context(|| format!("Invalid end region for link '{id}'"))?;
        ensure!(from != to, "Link '{id}' connects region {from} to itself");

        Ok(Self {
            id: format!("{from}{LINK_SEPARATOR}{to}").into(),
            from: from.clone(),
            to: to.clone(),
        })
    }
}
