//! Resource model.
//!
//! Resources are pools of interchangeable units: benches, presses, saturation
//! panels and test cells. The set of resource types is closed; each stage of a
//! job requires a fixed subset of them, looked up through
//! [`StageRequirements`].
//!
//! # Cell Types
//!
//! A cell unit holds a specimen from assembly through disassembly. Each job
//! category claims exactly one cell pool (see [`JobCategory::cell`]).
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1.2

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{JobCategory, Stage};

/// A pool of interchangeable resource units.
///
/// Declaration order doubles as attribution order: when two required pools
/// become free at the same instant, the earlier one is blamed for the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    /// Active preparation bench.
    PrepBench,
    /// Specimen forming bench.
    SpecimenBench,
    /// Cell assembly bench.
    AssemblyBench,
    /// CO2 saturation line.
    Co2Line,
    /// Water saturation panel.
    WaterSaturationPanel,
    /// Back-pressure saturation panel.
    BackPressurePanel,
    /// Conventional consolidation bench.
    ConsolidationBench,
    /// Isotropic loading press.
    IsoPress,
    /// Special press for anisotropic and cyclic trials.
    AnisoCyclicPress,
    /// Disassembly bench.
    DisassemblyBench,
    /// Conventional triaxial cell.
    ConventionalCell,
    /// Cyclic triaxial cell.
    CyclicCell,
    /// Bender-element cell.
    BenderCell,
}

impl ResourceType {
    /// Number of resource types.
    pub const COUNT: usize = 13;

    /// All resource types in attribution order.
    pub const ALL: [ResourceType; ResourceType::COUNT] = [
        ResourceType::PrepBench,
        ResourceType::SpecimenBench,
        ResourceType::AssemblyBench,
        ResourceType::Co2Line,
        ResourceType::WaterSaturationPanel,
        ResourceType::BackPressurePanel,
        ResourceType::ConsolidationBench,
        ResourceType::IsoPress,
        ResourceType::AnisoCyclicPress,
        ResourceType::DisassemblyBench,
        ResourceType::ConventionalCell,
        ResourceType::CyclicCell,
        ResourceType::BenderCell,
    ];

    /// Whether units of this type are test cells.
    pub fn is_cell(self) -> bool {
        matches!(
            self,
            ResourceType::ConventionalCell | ResourceType::CyclicCell | ResourceType::BenderCell
        )
    }

    /// Whether units of this type are saturation panels.
    pub fn is_panel(self) -> bool {
        matches!(
            self,
            ResourceType::WaterSaturationPanel | ResourceType::BackPressurePanel
        )
    }

    /// Whether the type counts toward the dimensioned-unit total.
    ///
    /// Cells and panels are sized separately and are not part of the cost
    /// being minimized.
    pub fn is_dimensioned(self) -> bool {
        !self.is_cell() && !self.is_panel()
    }

    /// Identifier used in serialized configurations.
    pub fn code(self) -> &'static str {
        match self {
            ResourceType::PrepBench => "PREP_BENCH",
            ResourceType::SpecimenBench => "SPECIMEN_BENCH",
            ResourceType::AssemblyBench => "ASSEMBLY_BENCH",
            ResourceType::Co2Line => "CO2_LINE",
            ResourceType::WaterSaturationPanel => "WATER_SATURATION_PANEL",
            ResourceType::BackPressurePanel => "BACK_PRESSURE_PANEL",
            ResourceType::ConsolidationBench => "CONSOLIDATION_BENCH",
            ResourceType::IsoPress => "ISO_PRESS",
            ResourceType::AnisoCyclicPress => "ANISO_CYCLIC_PRESS",
            ResourceType::DisassemblyBench => "DISASSEMBLY_BENCH",
            ResourceType::ConventionalCell => "CONVENTIONAL_CELL",
            ResourceType::CyclicCell => "CYCLIC_CELL",
            ResourceType::BenderCell => "BENDER_CELL",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Relation (job category, stage) → resource types held simultaneously.
///
/// Built once from static rules; the per-job part is only the cell pool,
/// which follows from the job category. Requirement lists are kept in
/// [`ResourceType`] order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageRequirements {
    table: BTreeMap<JobCategory, BTreeMap<Stage, Vec<ResourceType>>>,
}

impl StageRequirements {
    /// Creates an empty relation (every stage requires nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// The laboratory rules for every job category.
    pub fn standard() -> Self {
        Self::for_categories(JobCategory::ALL)
    }

    /// The laboratory rules for the given categories only.
    pub fn for_categories(categories: impl IntoIterator<Item = JobCategory>) -> Self {
        let mut requirements = Self::new();
        for category in categories {
            let cell = category.cell();
            for stage in Stage::ALL {
                let process = match stage {
                    Stage::ActivePrep => Some(ResourceType::PrepBench),
                    Stage::PrepRest => None,
                    Stage::SpecimenForming => Some(ResourceType::SpecimenBench),
                    Stage::CellAssembly => Some(ResourceType::AssemblyBench),
                    Stage::Co2Saturation => Some(ResourceType::Co2Line),
                    Stage::WaterSaturation => Some(ResourceType::WaterSaturationPanel),
                    Stage::BackPressure => Some(ResourceType::BackPressurePanel),
                    Stage::Consolidation => Some(ResourceType::ConsolidationBench),
                    Stage::Break => Some(ResourceType::IsoPress),
                    Stage::BreakAndConsolidate => Some(ResourceType::AnisoCyclicPress),
                    Stage::Disassembly => Some(ResourceType::DisassemblyBench),
                };
                let Some(process) = process else {
                    continue;
                };
                let mut resources = vec![process];
                if stage >= Stage::CellAssembly {
                    resources.push(cell);
                }
                requirements = requirements.with_requirement(category, stage, resources);
            }
        }
        requirements
    }

    /// Sets the resources required by a (category, stage) pair.
    pub fn with_requirement(
        mut self,
        category: JobCategory,
        stage: Stage,
        resources: impl IntoIterator<Item = ResourceType>,
    ) -> Self {
        let mut resources: Vec<ResourceType> = resources.into_iter().collect();
        resources.sort();
        resources.dedup();
        self.table.entry(category).or_default().insert(stage, resources);
        self
    }

    /// Resources required by a (category, stage) pair.
    ///
    /// Returns an empty slice when nothing is registered.
    pub fn required(&self, category: JobCategory, stage: Stage) -> &[ResourceType] {
        self.table
            .get(&category)
            .and_then(|stages| stages.get(&stage))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether a (category, stage) pair holds the given resource type.
    pub fn requires(&self, category: JobCategory, stage: Stage, resource: ResourceType) -> bool {
        self.required(category, stage).contains(&resource)
    }

    /// Categories with at least one registered stage.
    pub fn categories(&self) -> impl Iterator<Item = JobCategory> + '_ {
        self.table.keys().copied()
    }
}
