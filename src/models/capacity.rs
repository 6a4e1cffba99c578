//! Capacity configuration.
//!
//! Maps each resource type to its number of units. This is the value the
//! dimensioning loop mutates; it is cheap to clone, and every iteration works
//! on its own copy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ResourceType;

/// Units used for a resource type absent from the configuration.
pub const DEFAULT_UNITS: u32 = 1;

/// Unit count per resource type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapacityConfig {
    units: BTreeMap<ResourceType, u32>,
}

impl CapacityConfig {
    /// Creates an empty configuration (every type reads as one unit).
    pub fn new() -> Self {
        Self::default()
    }

    /// The laboratory's current equipment.
    pub fn baseline() -> Self {
        Self::new()
            .with_units(ResourceType::PrepBench, 1)
            .with_units(ResourceType::SpecimenBench, 3)
            .with_units(ResourceType::AssemblyBench, 3)
            .with_units(ResourceType::Co2Line, 1)
            .with_units(ResourceType::WaterSaturationPanel, 60)
            .with_units(ResourceType::BackPressurePanel, 12)
            .with_units(ResourceType::ConsolidationBench, 6)
            .with_units(ResourceType::IsoPress, 8)
            .with_units(ResourceType::AnisoCyclicPress, 1)
            .with_units(ResourceType::DisassemblyBench, 1)
            .with_units(ResourceType::ConventionalCell, 55)
            .with_units(ResourceType::CyclicCell, 2)
            .with_units(ResourceType::BenderCell, 2)
    }

    /// Sets the unit count of a type.
    pub fn with_units(mut self, resource: ResourceType, units: u32) -> Self {
        self.set_units(resource, units);
        self
    }

    /// Sets the unit count of a type.
    pub fn set_units(&mut self, resource: ResourceType, units: u32) {
        self.units.insert(resource, units);
    }

    /// Unit count of a type; [`DEFAULT_UNITS`] when absent.
    pub fn units(&self, resource: ResourceType) -> u32 {
        self.units.get(&resource).copied().unwrap_or(DEFAULT_UNITS)
    }

    /// Adds one unit to a type and returns the new count.
    pub fn increment(&mut self, resource: ResourceType) -> u32 {
        let units = self.units(resource).saturating_add(1);
        self.units.insert(resource, units);
        units
    }

    /// Explicitly configured types with their counts, in type order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceType, u32)> + '_ {
        self.units.iter().map(|(&r, &u)| (r, u))
    }

    /// Explicitly configured types.
    pub fn resources(&self) -> impl Iterator<Item = ResourceType> + '_ {
        self.units.keys().copied()
    }

    /// Whether the type is explicitly configured.
    pub fn contains(&self, resource: ResourceType) -> bool {
        self.units.contains_key(&resource)
    }

    /// Sum of units over the dimensioned types (cells and panels excluded).
    pub fn dimensioned_units(&self) -> u32 {
        self.iter()
            .filter(|(r, _)| r.is_dimensioned())
            .map(|(_, u)| u)
            .sum()
    }

    /// Number of explicitly configured types.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether no type is explicitly configured.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<(ResourceType, u32)> for CapacityConfig {
    fn from_iter<I: IntoIterator<Item = (ResourceType, u32)>>(iter: I) -> Self {
        Self {
            units: iter.into_iter().collect(),
        }
    }
}
