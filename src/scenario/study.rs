//! Multi-realization capacity study.
//!
//! Each realization draws a fresh demand from the mix and dimensions it.
//! Realizations that beat the tracked best feed the recommendation, which
//! averages their configurations (rounded up) and metrics.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::DemandMix;
use crate::derivation::ParameterDeriver;
use crate::dimensioning::{
    DimensionSettings, Dimensioner, Dimensioning, ACCEPTANCE_THRESHOLD_HOURS, HOURS_PER_DAY,
};
use crate::models::{CapacityConfig, ResourceType};
use crate::scheduler::{BottleneckReport, ResourceMetrics};
use crate::validation::ValidationError;

/// Trials drawn per realization unless configured.
pub const DEFAULT_STUDY_JOBS: usize = 576;

/// Realizations unless configured.
pub const DEFAULT_REALIZATIONS: usize = 1;

/// Study outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    /// Realizations run.
    pub realizations: usize,
    /// Realizations that updated the tracked best and were averaged.
    pub accumulated: usize,
    /// Mean best makespan over accumulated realizations (hours).
    pub mean_makespan: f64,
    /// Mean configuration over accumulated realizations, rounded up.
    pub recommended: CapacityConfig,
    /// Mean metrics over accumulated realizations.
    pub mean_report: BottleneckReport,
    /// Mean initial-configuration makespan over all realizations (hours).
    pub baseline_mean_makespan: f64,
    /// Mean initial-configuration metrics over all realizations.
    pub baseline_mean_report: BottleneckReport,
}

/// Running sums of bottleneck reports.
#[derive(Debug, Default)]
struct ReportAccumulator {
    count: usize,
    makespan: f64,
    units: BTreeMap<ResourceType, u64>,
    busy: BTreeMap<ResourceType, f64>,
    utilization: BTreeMap<ResourceType, f64>,
    wait: BTreeMap<ResourceType, f64>,
}

impl ReportAccumulator {
    fn add(&mut self, report: &BottleneckReport, makespan: f64) {
        self.count += 1;
        self.makespan += makespan;
        for (&rt, m) in &report.metrics {
            *self.units.entry(rt).or_default() += u64::from(m.units);
            *self.busy.entry(rt).or_default() += m.busy_hours;
            *self.utilization.entry(rt).or_default() += m.utilization_pct;
            *self.wait.entry(rt).or_default() += m.wait_hours;
        }
    }

    fn mean_makespan(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.makespan / self.count as f64
    }

    /// Units per type, mean rounded up.
    fn mean_units(&self) -> CapacityConfig {
        let n = self.count.max(1) as f64;
        self.units
            .iter()
            .map(|(&rt, &sum)| (rt, (sum as f64 / n).ceil() as u32))
            .collect()
    }

    /// Mean metrics; score recomputed from the mean wait and utilization.
    fn mean_report(&self) -> BottleneckReport {
        if self.count == 0 {
            return BottleneckReport::default();
        }
        let n = self.count as f64;
        let units = self.mean_units();
        let metrics = self
            .utilization
            .iter()
            .map(|(&rt, &util)| {
                let wait = self.wait.get(&rt).copied().unwrap_or(0.0) / n;
                let mut m = ResourceMetrics::new(rt, units.units(rt), util / n, wait);
                m.busy_hours = self.busy.get(&rt).copied().unwrap_or(0.0) / n;
                (rt, m)
            })
            .collect();
        BottleneckReport {
            makespan: self.mean_makespan(),
            metrics,
        }
    }
}

/// Tracked best across realizations.
#[derive(Debug, Clone, Copy)]
struct Tracked {
    makespan: f64,
    units: u32,
}

impl Tracked {
    fn is_beaten_by(tracked: Option<Self>, makespan: f64, units: u32) -> bool {
        match tracked {
            None => true,
            Some(t) => {
                makespan < t.makespan - ACCEPTANCE_THRESHOLD_HOURS
                    || ((makespan - t.makespan).abs() < ACCEPTANCE_THRESHOLD_HOURS
                        && units < t.units)
            }
        }
    }
}

/// Repeated dimensioning over random demand.
///
/// # Example
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_dimension::dimensioning::DimensionSettings;
/// use u_dimension::scenario::CapacityStudy;
///
/// let study = CapacityStudy::new(DimensionSettings::from_days(10.0).with_max_iterations(2))?
///     .with_jobs(20)
///     .with_realizations(2);
/// let summary = study.run(&mut SmallRng::seed_from_u64(42));
/// assert_eq!(summary.realizations, 2);
/// assert!(summary.accumulated >= 1);
/// # Ok::<(), u_dimension::validation::ValidationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CapacityStudy {
    dimensioner: Dimensioner,
    mix: DemandMix,
    jobs: usize,
    horizon_days: u32,
    realizations: usize,
    deriver: ParameterDeriver,
}

impl CapacityStudy {
    /// Creates a study; the demand horizon defaults to the deadline in days.
    pub fn new(settings: DimensionSettings) -> Result<Self, ValidationError> {
        let horizon_days = (settings.deadline_hours / HOURS_PER_DAY).ceil().max(1.0) as u32;
        Ok(Self {
            dimensioner: Dimensioner::new(settings)?,
            mix: DemandMix::historical(),
            jobs: DEFAULT_STUDY_JOBS,
            horizon_days,
            realizations: DEFAULT_REALIZATIONS,
            deriver: ParameterDeriver::new(),
        })
    }

    /// Replaces the demand mix.
    pub fn with_mix(mut self, mix: DemandMix) -> Self {
        self.mix = mix;
        self
    }

    /// Sets the trials drawn per realization.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    /// Sets the release horizon (days).
    pub fn with_horizon_days(mut self, days: u32) -> Self {
        self.horizon_days = days;
        self
    }

    /// Sets the number of realizations.
    pub fn with_realizations(mut self, realizations: usize) -> Self {
        self.realizations = realizations;
        self
    }

    /// Replaces the parameter deriver.
    pub fn with_deriver(mut self, deriver: ParameterDeriver) -> Self {
        self.deriver = deriver;
        self
    }

    /// Dimensions one freshly drawn demand.
    pub fn realize<R: Rng + ?Sized>(&self, rng: &mut R) -> Dimensioning {
        let records = self.mix.generate(self.jobs, self.horizon_days, rng);
        let derivation = self.deriver.derive(&records);
        self.dimensioner.dimension(&derivation.jobs, &derivation.requirements)
    }

    /// Runs every realization.
    pub fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> StudySummary {
        let mut tracked: Option<Tracked> = None;
        let mut best = ReportAccumulator::default();
        let mut baseline = ReportAccumulator::default();

        for realization in 0..self.realizations {
            let result = self.realize(rng);
            baseline.add(&result.baseline_report, result.baseline_makespan);

            let units = result.best_config.dimensioned_units();
            let improved = Tracked::is_beaten_by(tracked, result.best_makespan, units);
            if improved {
                tracked = Some(Tracked {
                    makespan: result.best_makespan,
                    units,
                });
                best.add(&result.best_report, result.best_makespan);
            }

            info!(
                realization,
                state = ?result.state,
                makespan = result.best_makespan,
                dimensioned_units = units,
                improved,
                "Study realization"
            );
        }

        StudySummary {
            realizations: self.realizations,
            accumulated: best.count,
            mean_makespan: best.mean_makespan(),
            recommended: best.mean_units(),
            mean_report: best.mean_report(),
            baseline_mean_makespan: baseline.mean_makespan(),
            baseline_mean_report: baseline.mean_report(),
        }
    }
}
