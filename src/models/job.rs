//! Job model.
//!
//! A job is one laboratory trial instance: a specimen that walks through its
//! applicable stages in fixed order, starting no earlier than its release
//! instant.
//!
//! # Time Representation
//! All times are in hours relative to a global origin (t=0). The caller
//! defines what t=0 means (typically "today" at midnight).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{ResourceType, Stage, StageDurations};

/// Category of a trial, derived once from its trial code.
///
/// Drives the cell pool a job claims and whether consolidation and break are
/// tracked separately or merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    /// Cyclic loading trial.
    Cyclic,
    /// Isotropically consolidated trial.
    Isotropic,
    /// Bender-element trial.
    Bender,
    /// Anisotropically consolidated trial (default).
    Anisotropic,
}

impl JobCategory {
    /// All categories.
    pub const ALL: [JobCategory; 4] = [
        JobCategory::Cyclic,
        JobCategory::Isotropic,
        JobCategory::Bender,
        JobCategory::Anisotropic,
    ];

    /// Cell pool claimed by jobs of this category.
    pub fn cell(self) -> ResourceType {
        match self {
            JobCategory::Bender => ResourceType::BenderCell,
            JobCategory::Cyclic => ResourceType::CyclicCell,
            JobCategory::Isotropic | JobCategory::Anisotropic => ResourceType::ConventionalCell,
        }
    }

    /// Whether consolidation and break run as one merged stage.
    pub fn merges_break(self) -> bool {
        matches!(self, JobCategory::Anisotropic | JobCategory::Cyclic)
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobCategory::Cyclic => "cyclic",
            JobCategory::Isotropic => "isotropic",
            JobCategory::Bender => "bender",
            JobCategory::Anisotropic => "anisotropic",
        };
        f.write_str(name)
    }
}

/// Condition of the soil sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleCategory {
    /// Remolded sample: longer preparation plus a rest period.
    Remolded,
    /// Intact sample.
    #[default]
    Intact,
}

/// Trial parameters derived alongside the stage durations.
///
/// Kept for inspection; the scheduler only reads the durations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialParameters {
    /// Axial deformation at which the trial stops (%).
    pub deformation_pct: f64,
    /// Specimen height (mm).
    pub specimen_height_mm: f64,
    /// Press loading velocity (mm/min); 0 when the trial is not press-broken.
    pub loading_velocity_mm_min: f64,
    /// Whether the trial goes through saturation.
    pub saturated: bool,
}

impl Default for TrialParameters {
    fn default() -> Self {
        Self {
            deformation_pct: 20.0,
            specimen_height_mm: 102.0,
            loading_velocity_mm_min: 0.0,
            saturated: false,
        }
    }
}

/// A job to be scheduled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier.
    pub id: String,
    /// Raw trial code (kept for re-joining results).
    pub trial_code: String,
    /// Campaign or proposal label.
    pub campaign: Option<String>,
    /// Sample condition.
    pub sample: SampleCategory,
    /// Trial category.
    pub category: JobCategory,
    /// Earliest start (hours).
    pub release_hours: f64,
    /// Per-stage durations (hours).
    pub durations: StageDurations,
    /// Derived trial parameters.
    pub parameters: TrialParameters,
}

impl Job {
    /// Creates a job with no applicable stage, released at t=0.
    pub fn new(id: impl Into<String>, category: JobCategory) -> Self {
        Self {
            id: id.into(),
            trial_code: String::new(),
            campaign: None,
            sample: SampleCategory::default(),
            category,
            release_hours: 0.0,
            durations: StageDurations::new(),
            parameters: TrialParameters::default(),
        }
    }

    /// Sets the trial code.
    pub fn with_trial_code(mut self, code: impl Into<String>) -> Self {
        self.trial_code = code.into();
        self
    }

    /// Sets the campaign label.
    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }

    /// Sets the sample category.
    pub fn with_sample(mut self, sample: SampleCategory) -> Self {
        self.sample = sample;
        self
    }

    /// Sets the release instant (hours); negative values clamp to 0.
    pub fn with_release(mut self, hours: f64) -> Self {
        self.release_hours = super::coerce_hours(hours);
        self
    }

    /// Sets one stage's duration (hours).
    pub fn with_stage(mut self, stage: Stage, hours: f64) -> Self {
        self.durations.set(stage, hours);
        self
    }

    /// Applicable stages in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.durations.applicable().collect()
    }

    /// Whether the job has at least one applicable stage.
    pub fn has_stages(&self) -> bool {
        self.durations.applicable().next().is_some()
    }

    /// Total active work (hours), holding time excluded.
    pub fn total_work(&self) -> f64 {
        self.durations.active_work()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_builder() {
        let job = Job::new("J1", JobCategory::Isotropic)
            .with_trial_code("CIUsat")
            .with_campaign("North Dam")
            .with_sample(SampleCategory::Remolded)
            .with_release(31.0)
            .with_stage(Stage::ActivePrep, 1.0)
            .with_stage(Stage::PrepRest, 24.0)
            .with_stage(Stage::Disassembly, 0.5);

        assert_eq!(job.id, "J1");
        assert_eq!(job.trial_code, "CIUsat");
        assert_eq!(job.campaign.as_deref(), Some("North Dam"));
        assert_eq!(job.sample, SampleCategory::Remolded);
        assert!((job.release_hours - 31.0).abs() < 1e-12);
        assert_eq!(
            job.stages(),
            vec![Stage::ActivePrep, Stage::PrepRest, Stage::Disassembly]
        );
        assert!((job.total_work() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_job_empty() {
        let job = Job::new("empty", JobCategory::Anisotropic).with_release(-5.0);
        assert!(!job.has_stages());
        assert!(job.stages().is_empty());
        assert!((job.release_hours - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_category_cells() {
        assert_eq!(JobCategory::Bender.cell(), ResourceType::BenderCell);
        assert_eq!(JobCategory::Cyclic.cell(), ResourceType::CyclicCell);
        assert_eq!(JobCategory::Isotropic.cell(), ResourceType::ConventionalCell);
        assert_eq!(JobCategory::Anisotropic.cell(), ResourceType::ConventionalCell);
    }

    #[test]
    fn test_category_merge() {
        assert!(JobCategory::Anisotropic.merges_break());
        assert!(JobCategory::Cyclic.merges_break());
        assert!(!JobCategory::Isotropic.merges_break());
        assert!(!JobCategory::Bender.merges_break());
    }

    #[test]
    fn test_sample_default() {
        assert_eq!(SampleCategory::default(), SampleCategory::Intact);
    }
}
