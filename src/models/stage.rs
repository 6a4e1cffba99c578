//! Stage model.
//!
//! A stage is one processing step of a laboratory trial. The set of stages is
//! closed and ordered: declaration order is execution order, and a job walks
//! through the stages with a positive duration, skipping the rest.
//!
//! # Mutually Exclusive Stages
//!
//! Consolidation and break are either tracked as two separate stages
//! (`Consolidation`, `Break`) or merged into one (`BreakAndConsolidate`),
//! depending on the job category. [`StageDurations::has_exclusive_conflict`]
//! checks that a job never carries both representations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// A processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Hands-on sample preparation at the preparation bench.
    ActivePrep,
    /// Holding time after preparation (no resource held).
    PrepRest,
    /// Specimen forming at the forming bench.
    SpecimenForming,
    /// Mounting the specimen into its cell.
    CellAssembly,
    /// CO2 flushing through the saturation line.
    Co2Saturation,
    /// Water percolation on a saturation panel.
    WaterSaturation,
    /// Back-pressure saturation on a back-pressure panel.
    BackPressure,
    /// Consolidation on a conventional consolidation bench.
    Consolidation,
    /// Shearing to failure on an isotropic press.
    Break,
    /// Consolidation and shearing on the anisotropic/cyclic press.
    BreakAndConsolidate,
    /// Dismounting the cell.
    Disassembly,
}

impl Stage {
    /// Number of stages.
    pub const COUNT: usize = 11;

    /// All stages in execution order.
    pub const ALL: [Stage; Stage::COUNT] = [
        Stage::ActivePrep,
        Stage::PrepRest,
        Stage::SpecimenForming,
        Stage::CellAssembly,
        Stage::Co2Saturation,
        Stage::WaterSaturation,
        Stage::BackPressure,
        Stage::Consolidation,
        Stage::Break,
        Stage::BreakAndConsolidate,
        Stage::Disassembly,
    ];

    /// Position in execution order.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Whether the stage counts toward a job's active work.
    ///
    /// Holding time occupies the calendar but no bench or operator.
    pub fn is_active_work(self) -> bool {
        self != Stage::PrepRest
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::ActivePrep => "active_prep",
            Stage::PrepRest => "prep_rest",
            Stage::SpecimenForming => "specimen_forming",
            Stage::CellAssembly => "cell_assembly",
            Stage::Co2Saturation => "co2_saturation",
            Stage::WaterSaturation => "water_saturation",
            Stage::BackPressure => "back_pressure",
            Stage::Consolidation => "consolidation",
            Stage::Break => "break",
            Stage::BreakAndConsolidate => "break_and_consolidate",
            Stage::Disassembly => "disassembly",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-stage durations of one job, in hours.
///
/// Fixed shape: one slot per [`Stage`]. A stage is applicable iff its
/// duration is strictly positive. Every write goes through [`coerce_hours`],
/// so slots are never negative or non-finite.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StageDurations([f64; Stage::COUNT]);

impl StageDurations {
    /// All stages inapplicable.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one stage's duration (hours), builder style.
    pub fn with(mut self, stage: Stage, hours: f64) -> Self {
        self.set(stage, hours);
        self
    }

    /// Sets one stage's duration (hours).
    pub fn set(&mut self, stage: Stage, hours: f64) {
        self.0[stage.index()] = coerce_hours(hours);
    }

    /// Duration of a stage (hours).
    #[inline]
    pub fn get(&self, stage: Stage) -> f64 {
        self.0[stage.index()]
    }

    /// Whether the stage is applicable (positive duration).
    #[inline]
    pub fn is_applicable(&self, stage: Stage) -> bool {
        self.get(stage) > 0.0
    }

    /// Applicable stages in execution order.
    pub fn applicable(&self) -> impl Iterator<Item = Stage> + '_ {
        Stage::ALL.into_iter().filter(|&s| self.is_applicable(s))
    }

    /// Sum over every stage except holding time.
    pub fn active_work(&self) -> f64 {
        Stage::ALL
            .iter()
            .filter(|s| s.is_active_work())
            .map(|&s| self.get(s))
            .sum()
    }

    /// Sum over every stage.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Whether both the split and the merged consolidation/break
    /// representations are present.
    pub fn has_exclusive_conflict(&self) -> bool {
        let split = self.is_applicable(Stage::Consolidation) || self.is_applicable(Stage::Break);
        split && self.is_applicable(Stage::BreakAndConsolidate)
    }
}

impl Index<Stage> for StageDurations {
    type Output = f64;

    fn index(&self, stage: Stage) -> &f64 {
        &self.0[stage.index()]
    }
}

/// Clamps a raw numeric value to a usable duration: negative and
/// non-finite values become 0.0.
pub fn coerce_hours(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
