//! Bottleneck-driven capacity search.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

use super::DimensionSettings;
use crate::models::{CapacityConfig, Job, ResourceType, StageRequirements};
use crate::scheduler::{BottleneckReport, DispatchScheduler, ResourceMetrics};
use crate::validation::{validate_settings, ValidationError, ValidationErrorKind};

/// Makespan difference (hours) above which two outcomes count as
/// materially different.
pub const ACCEPTANCE_THRESHOLD_HOURS: f64 = 1.5;

/// Utilization (%) above which a cell pool is a bottleneck.
pub const CELL_UTILIZATION_THRESHOLD_PCT: f64 = 80.0;

/// Search state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionState {
    /// Still searching.
    Iterating,
    /// The makespan fits the deadline.
    Converged,
    /// Budget spent without meeting the deadline.
    Exhausted,
    /// No eligible bottleneck left to grow.
    Stalled,
}

/// What happened in one iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    /// Zero-based iteration number.
    pub iteration: usize,
    /// Configuration that was scheduled.
    pub config: CapacityConfig,
    /// Resulting makespan (hours).
    pub makespan: f64,
    /// Dimensioned units of `config`.
    pub dimensioned_units: u32,
    /// Whether `config` became the best so far.
    pub accepted: bool,
    /// Type grown after this iteration, if any.
    pub selected: Option<ResourceType>,
}

/// Search outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimensioning {
    /// Terminal state.
    pub state: DimensionState,
    /// Best configuration seen.
    pub best_config: CapacityConfig,
    /// Makespan of `best_config` (hours).
    pub best_makespan: f64,
    /// Metrics of `best_config`.
    pub best_report: BottleneckReport,
    /// Makespan of the initial configuration (hours).
    pub baseline_makespan: f64,
    /// Metrics of the initial configuration.
    pub baseline_report: BottleneckReport,
    /// One record per schedule run.
    pub iterations: Vec<IterationRecord>,
}

impl Dimensioning {
    /// Whether the search ended by meeting the deadline.
    pub fn converged(&self) -> bool {
        self.state == DimensionState::Converged
    }

    /// Units added per type, best configuration against the initial one.
    pub fn added_units(&self) -> BTreeMap<ResourceType, u32> {
        let Some(initial) = self.iterations.first().map(|r| &r.config) else {
            return BTreeMap::new();
        };
        self.best_config
            .iter()
            .filter_map(|(rt, units)| {
                let added = units.saturating_sub(initial.units(rt));
                (added > 0).then_some((rt, added))
            })
            .collect()
    }

    /// Hours gained on the initial configuration.
    pub fn makespan_reduction(&self) -> f64 {
        self.baseline_makespan - self.best_makespan
    }
}

/// Best-so-far acceptance rule.
///
/// A candidate replaces the best when its makespan differs by at least
/// [`ACCEPTANCE_THRESHOLD_HOURS`], or when it is within the threshold and
/// uses strictly fewer dimensioned units.
pub fn is_improvement(makespan: f64, units: u32, best_makespan: f64, best_units: u32) -> bool {
    (makespan - best_makespan).abs() >= ACCEPTANCE_THRESHOLD_HOURS || units < best_units
}

/// Picks the type to grow, never a fixed one.
///
/// Tier 1: the cell pool with the highest utilization above
/// [`CELL_UTILIZATION_THRESHOLD_PCT`]. Tier 2: the non-cell type with the
/// highest positive score. Ties go to the first type in resource order.
pub fn select_bottleneck(
    report: &BottleneckReport,
    fixed: &BTreeSet<ResourceType>,
) -> Option<ResourceType> {
    let eligible = move || {
        report
            .metrics
            .values()
            .filter(move |m| !fixed.contains(&m.resource))
    };

    let cell = eligible()
        .filter(|m| m.resource.is_cell() && m.utilization_pct > CELL_UTILIZATION_THRESHOLD_PCT)
        .fold(None, |best: Option<&ResourceMetrics>, m| match best {
            Some(b) if b.utilization_pct >= m.utilization_pct => Some(b),
            _ => Some(m),
        });
    if let Some(m) = cell {
        return Some(m.resource);
    }

    eligible()
        .filter(|m| !m.resource.is_cell() && m.score > 0.0)
        .fold(None, |best: Option<&ResourceMetrics>, m| match best {
            Some(b) if b.score >= m.score => Some(b),
            _ => Some(m),
        })
        .map(|m| m.resource)
}

/// Capacity search driver.
#[derive(Debug, Clone)]
pub struct Dimensioner {
    settings: DimensionSettings,
    scheduler: DispatchScheduler,
}

impl Dimensioner {
    /// Creates a dimensioner; rejects out-of-range settings.
    ///
    /// Every problem found is reported in one error, messages joined by `"; "`.
    pub fn new(settings: DimensionSettings) -> Result<Self, ValidationError> {
        if let Err(errors) = validate_settings(&settings) {
            let message = errors.iter().map(|e| e.message.as_str()).join("; ");
            return Err(ValidationError::new(ValidationErrorKind::InvalidSettings, message));
        }
        Ok(Self {
            settings,
            scheduler: DispatchScheduler::new(),
        })
    }

    /// Replaces the scheduler.
    pub fn with_scheduler(mut self, scheduler: DispatchScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Current settings.
    pub fn settings(&self) -> &DimensionSettings {
        &self.settings
    }

    /// Runs the search.
    pub fn dimension(&self, jobs: &[Job], requirements: &StageRequirements) -> Dimensioning {
        let settings = &self.settings;
        let target = settings.acceptable_makespan();

        let mut config = settings.initial.clone();
        let mut state = DimensionState::Iterating;
        let mut iterations = Vec::new();

        let mut best_config = config.clone();
        let mut best_makespan = f64::INFINITY;
        let mut best_units = u32::MAX;
        let mut best_report = BottleneckReport::default();
        let mut baseline_makespan = 0.0;
        let mut baseline_report = BottleneckReport::default();

        for iteration in 0..settings.max_iterations {
            let snapshot = config.clone();
            let schedule = self.scheduler.schedule(jobs, requirements, &snapshot);
            let report = BottleneckReport::analyze(&schedule, requirements, &snapshot);
            let makespan = schedule.makespan();
            let units = snapshot.dimensioned_units();

            if iteration == 0 {
                baseline_makespan = makespan;
                baseline_report = report.clone();
            }

            let accepted = is_improvement(makespan, units, best_makespan, best_units);
            if accepted {
                best_config = snapshot.clone();
                best_makespan = makespan;
                best_units = units;
                best_report = report.clone();
            }

            info!(
                iteration,
                makespan,
                target,
                dimensioned_units = units,
                accepted,
                "Dimensioning iteration"
            );

            let mut record = IterationRecord {
                iteration,
                config: snapshot,
                makespan,
                dimensioned_units: units,
                accepted,
                selected: None,
            };

            if makespan <= target {
                iterations.push(record);
                state = DimensionState::Converged;
                break;
            }

            let Some(resource) = select_bottleneck(&report, &settings.fixed) else {
                warn!(iteration, makespan, "No eligible bottleneck; stopping");
                iterations.push(record);
                state = DimensionState::Stalled;
                break;
            };

            let new_units = config.increment(resource);
            info!(%resource, units = new_units, "Growing bottleneck");
            record.selected = Some(resource);
            iterations.push(record);
        }

        if state == DimensionState::Iterating {
            state = DimensionState::Exhausted;
        }

        Dimensioning {
            state,
            best_config,
            best_makespan,
            best_report,
            baseline_makespan,
            baseline_report,
            iterations,
        }
    }
}
