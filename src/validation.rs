//! Input validation for dimensioning problems.
//!
//! Checks structural integrity of jobs, capacity configurations and search
//! settings before scheduling. Detects:
//! - Duplicate job IDs
//! - Jobs with no applicable stage
//! - Jobs carrying both the split and the merged consolidation/break stages
//! - Required resource types configured with zero units
//! - Out-of-range dimensioning settings
//!
//! None of these stop the scheduler; they exist so callers can reject bad
//! input up front instead of reading it back from
//! [`Schedule::incomplete_jobs`](crate::models::Schedule::incomplete_jobs).

use std::collections::HashSet;
use std::fmt;

use thiserror::Error;

use crate::dimensioning::DimensionSettings;
use crate::models::{CapacityConfig, Job, StageRequirements};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}: {message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two jobs share the same ID.
    DuplicateId,
    /// A job has no applicable stage.
    EmptyJob,
    /// A job has both representations of consolidation/break.
    ExclusiveStages,
    /// A resource type some job needs has zero units.
    ZeroCapacity,
    /// Dimensioning settings are out of range.
    InvalidSettings,
    /// A demand mix has no usable weight.
    InvalidMix,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DuplicateId => "duplicate id",
            Self::EmptyJob => "empty job",
            Self::ExclusiveStages => "exclusive stages",
            Self::ZeroCapacity => "zero capacity",
            Self::InvalidSettings => "invalid settings",
            Self::InvalidMix => "invalid mix",
        };
        f.write_str(name)
    }
}

impl ValidationError {
    /// Creates an error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a job list.
///
/// Checks:
/// 1. No duplicate job IDs
/// 2. Every job has at least one applicable stage
/// 3. No job mixes the split and merged consolidation/break stages
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_jobs(jobs: &[Job]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for job in jobs {
        if !ids.insert(job.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.id),
            ));
        }

        if !job.has_stages() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job '{}' has no applicable stage", job.id),
            ));
        }

        if job.durations.has_exclusive_conflict() {
            errors.push(ValidationError::new(
                ValidationErrorKind::ExclusiveStages,
                format!(
                    "Job '{}' has both split and merged consolidation/break stages",
                    job.id
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates that every resource type a job needs has at least one unit.
///
/// Each offending type is reported once, naming the first job that needs it.
pub fn validate_capacity(
    jobs: &[Job],
    requirements: &StageRequirements,
    capacity: &CapacityConfig,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut reported = HashSet::new();

    for job in jobs {
        for stage in job.durations.applicable() {
            for &rt in requirements.required(job.category, stage) {
                if capacity.units(rt) == 0 && reported.insert(rt) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::ZeroCapacity,
                        format!("{rt} has zero units but job '{}' needs it for {stage}", job.id),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates dimensioning settings.
///
/// Checks:
/// 1. Deadline is finite and positive
/// 2. Tolerance is finite and non-negative
/// 3. Iteration budget is at least one
/// 4. No type of the initial configuration has zero units
pub fn validate_settings(settings: &DimensionSettings) -> ValidationResult {
    let mut errors = Vec::new();

    if !(settings.deadline_hours.is_finite() && settings.deadline_hours > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSettings,
            format!("Deadline must be positive, got {}", settings.deadline_hours),
        ));
    }

    if !(settings.tolerance.is_finite() && settings.tolerance >= 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSettings,
            format!("Tolerance must be non-negative, got {}", settings.tolerance),
        ));
    }

    if settings.max_iterations == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidSettings,
            "Iteration budget must be at least 1",
        ));
    }

    for (rt, units) in settings.initial.iter() {
        if units == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSettings,
                format!("Initial configuration has zero units of {rt}"),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
