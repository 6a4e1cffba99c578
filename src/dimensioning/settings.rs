//! Dimensioning settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::models::{CapacityConfig, ResourceType};

/// Hours per calendar day used to convert day deadlines.
pub const HOURS_PER_DAY: f64 = 24.0;

/// Deadline used when none is configured (days).
pub const DEFAULT_DEADLINE_DAYS: f64 = 22.0;

/// Accepted relative overshoot of the deadline.
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Iteration budget.
pub const DEFAULT_MAX_ITERATIONS: usize = 6;

/// Search configuration.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// # Example
/// ```
/// use u_dimension::dimensioning::DimensionSettings;
/// use u_dimension::models::ResourceType;
///
/// let settings = DimensionSettings::from_days(10.0)
///     .with_tolerance(0.1)
///     .with_max_iterations(12)
///     .with_fixed(ResourceType::Co2Line);
/// assert!((settings.acceptable_makespan() - 264.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionSettings {
    /// Target makespan (hours).
    pub deadline_hours: f64,
    /// Accepted relative overshoot (0.05 = 5 %).
    pub tolerance: f64,
    /// Maximum number of schedule runs.
    pub max_iterations: usize,
    /// Types the search must never grow.
    pub fixed: BTreeSet<ResourceType>,
    /// Starting configuration.
    pub initial: CapacityConfig,
}

impl Default for DimensionSettings {
    fn default() -> Self {
        Self {
            deadline_hours: DEFAULT_DEADLINE_DAYS * HOURS_PER_DAY,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            fixed: BTreeSet::new(),
            initial: CapacityConfig::baseline(),
        }
    }
}

impl DimensionSettings {
    /// Settings with a deadline in hours.
    pub fn new(deadline_hours: f64) -> Self {
        Self {
            deadline_hours,
            ..Default::default()
        }
    }

    /// Settings with a deadline in calendar days.
    pub fn from_days(days: f64) -> Self {
        Self::new(days * HOURS_PER_DAY)
    }

    /// Sets the tolerance fraction.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Excludes a type from growth.
    pub fn with_fixed(mut self, resource: ResourceType) -> Self {
        self.fixed.insert(resource);
        self
    }

    /// Excludes several types from growth.
    pub fn with_fixed_resources(
        mut self,
        resources: impl IntoIterator<Item = ResourceType>,
    ) -> Self {
        self.fixed.extend(resources);
        self
    }

    /// Sets the starting configuration.
    pub fn with_initial(mut self, initial: CapacityConfig) -> Self {
        self.initial = initial;
        self
    }

    /// Largest makespan that counts as meeting the deadline.
    pub fn acceptable_makespan(&self) -> f64 {
        self.deadline_hours * (1.0 + self.tolerance)
    }

    /// Whether a type may be grown.
    pub fn is_fixed(&self, resource: ResourceType) -> bool {
        self.fixed.contains(&resource)
    }
}
