//! Parameter derivation.
//!
//! Turns raw demand records into the normalized job model: one [`Job`] per
//! record with its stage durations, plus the [`StageRequirements`] relation
//! for the categories present.
//!
//! # Degradation
//!
//! Derivation never fails. Missing or malformed fields fall back to defaults
//! (deformation 20 %, release at t=0, intact sample) and negative or
//! non-finite numbers coerce to 0, which turns the affected stage off.
//!
//! # Example
//!
//! ```
//! use u_dimension::derivation::ParameterDeriver;
//! use u_dimension::models::{DemandRecord, Stage};
//!
//! let records = vec![DemandRecord::new("CIUsat").with_release_day(2.0)];
//! let derivation = ParameterDeriver::new().derive(&records);
//!
//! let job = &derivation.jobs[0];
//! assert_eq!(job.id, "J0");
//! assert!((job.release_hours - 55.0).abs() < 1e-9);
//! assert!(job.durations.is_applicable(Stage::WaterSaturation));
//! ```

pub mod trial;

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::models::{
    coerce_hours, DemandRecord, Job, JobCategory, ReleaseSource, Stage, StageDurations,
    StageRequirements, TrialParameters,
};

/// Hours per calendar day.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Offset added to day-based releases (work starts at 07:00).
pub const RELEASE_OFFSET_HOURS: f64 = 7.0;

/// Cell assembly time, every job (hours).
pub const CELL_ASSEMBLY_HOURS: f64 = 10.0 / 60.0;

/// CO2 saturation time for saturated trials (hours).
pub const CO2_SATURATION_HOURS: f64 = 20.0 / 60.0;

/// Back-pressure saturation time for saturated trials (hours).
pub const BACK_PRESSURE_HOURS: f64 = 4.5;

/// Disassembly time, every job (hours).
pub const DISASSEMBLY_HOURS: f64 = 20.0 / 60.0;

/// Normalized jobs plus the requirement relation for their categories.
#[derive(Debug, Clone, Default)]
pub struct Derivation {
    /// One job per input record, in input order.
    pub jobs: Vec<Job>,
    /// Stage requirements for the categories present in `jobs`.
    pub requirements: StageRequirements,
}

/// Derives jobs from demand records.
#[derive(Debug, Clone, Default)]
pub struct ParameterDeriver {
    reference_date: Option<NaiveDate>,
}

impl ParameterDeriver {
    /// Creates a deriver whose date-based releases count from today.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts date-based releases from a fixed date instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    /// Reference date for date-based releases.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Derives every record. Job ids are `J0`, `J1`, ... in input order.
    pub fn derive(&self, records: &[DemandRecord]) -> Derivation {
        let today = self.reference_date();
        let jobs: Vec<Job> = records
            .iter()
            .enumerate()
            .map(|(i, record)| derive_job(format!("J{i}"), record, today))
            .collect();

        let mut categories: Vec<JobCategory> = jobs.iter().map(|j| j.category).collect();
        categories.sort();
        categories.dedup();
        debug!(
            n_jobs = jobs.len(),
            n_categories = categories.len(),
            "Derived job parameters"
        );

        Derivation {
            requirements: StageRequirements::for_categories(categories),
            jobs,
        }
    }

    /// Derives a single record.
    pub fn derive_one(&self, id: impl Into<String>, record: &DemandRecord) -> Job {
        derive_job(id.into(), record, self.reference_date())
    }
}

/// Release instant (hours) of a record.
pub fn release_hours(release: Option<&ReleaseSource>, today: NaiveDate) -> f64 {
    match release {
        None => 0.0,
        Some(ReleaseSource::Day(day)) => coerce_hours(day * HOURS_PER_DAY + RELEASE_OFFSET_HOURS),
        Some(ReleaseSource::Date(date)) => {
            let days = (*date - today).num_days().max(0);
            days as f64 * HOURS_PER_DAY
        }
    }
}

fn derive_job(id: String, record: &DemandRecord, today: NaiveDate) -> Job {
    let code = record.trial_code.as_str();
    let category = trial::classify(code);
    let sandy = trial::is_sandy(record.sample_name.as_deref());
    let saturated = trial::is_saturated(code);

    let deformation_pct = trial::deformation_pct(record.specification.as_deref());
    let specimen_height_mm = trial::specimen_height_mm(code);
    let loading_velocity_mm_min = trial::loading_velocity(code);
    let break_hours =
        trial::break_hours(specimen_height_mm, deformation_pct, loading_velocity_mm_min);
    let consolidation_hours = if trial::skips_consolidation(code) {
        0.0
    } else {
        trial::consolidation_hours(sandy)
    };

    let mut durations = StageDurations::new()
        .with(Stage::ActivePrep, trial::active_prep_hours(record.sample))
        .with(Stage::PrepRest, trial::prep_rest_hours(record.sample))
        .with(Stage::SpecimenForming, trial::forming_hours(record.sample))
        .with(Stage::CellAssembly, CELL_ASSEMBLY_HOURS)
        .with(Stage::Disassembly, DISASSEMBLY_HOURS);

    if saturated {
        durations.set(Stage::Co2Saturation, CO2_SATURATION_HOURS);
        durations.set(Stage::WaterSaturation, trial::water_saturation_hours(sandy));
        durations.set(Stage::BackPressure, BACK_PRESSURE_HOURS);
    }

    if category.merges_break() {
        durations.set(
            Stage::BreakAndConsolidate,
            coerce_hours(consolidation_hours) + coerce_hours(break_hours),
        );
    } else {
        durations.set(Stage::Consolidation, consolidation_hours);
        durations.set(Stage::Break, break_hours);
    }

    Job {
        id,
        trial_code: record.trial_code.clone(),
        campaign: record.campaign.clone(),
        sample: record.sample,
        category,
        release_hours: release_hours(record.release.as_ref(), today),
        durations,
        parameters: TrialParameters {
            deformation_pct,
            specimen_height_mm,
            loading_velocity_mm_min,
            saturated,
        },
    }
}
