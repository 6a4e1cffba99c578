//! Iterative capacity dimensioning.
//!
//! Hill climbing over capacity configurations: schedule, analyze, grow the
//! worst bottleneck by one unit, repeat until the makespan fits the deadline
//! or the budget runs out.
//!
//! # Algorithm
//!
//! ```text
//! config ← initial
//! repeat up to max_iterations:
//!     schedule + analyze(config)
//!     accept config as best if materially different or cheaper
//!     if makespan ≤ deadline × (1 + tolerance): Converged
//!     pick bottleneck (tier 1 cells > 80 % util, tier 2 best score)
//!     none → Stalled
//!     config[bottleneck] += 1
//! Exhausted
//! ```
//!
//! Fixed types are never grown. The best configuration seen is always
//! returned, whatever the terminal state.
//!
//! # Usage
//!
//! ```
//! use u_dimension::dimensioning::{DimensionSettings, DimensionState, Dimensioner};
//! use u_dimension::models::{
//!     CapacityConfig, Job, JobCategory, ResourceType, Stage, StageRequirements,
//! };
//!
//! let jobs: Vec<Job> = (0..4)
//!     .map(|i| {
//!         Job::new(format!("J{i}"), JobCategory::Isotropic).with_stage(Stage::ActivePrep, 5.0)
//!     })
//!     .collect();
//! let settings = DimensionSettings::new(10.0)
//!     .with_tolerance(0.0)
//!     .with_initial(CapacityConfig::new().with_units(ResourceType::PrepBench, 1));
//!
//! let result = Dimensioner::new(settings)?.dimension(&jobs, &StageRequirements::standard());
//! assert_eq!(result.state, DimensionState::Converged);
//! assert_eq!(result.best_config.units(ResourceType::PrepBench), 2);
//! # Ok::<(), u_dimension::validation::ValidationError>(())
//! ```
//!
//! # Reference
//! Goldratt (1984), "The Goal" (drum-buffer-rope: elevate the constraint)

mod search;
mod settings;

pub use search::{
    is_improvement, select_bottleneck, DimensionState, Dimensioner, Dimensioning,
    IterationRecord, ACCEPTANCE_THRESHOLD_HOURS, CELL_UTILIZATION_THRESHOLD_PCT,
};
pub use settings::{
    DimensionSettings, DEFAULT_DEADLINE_DAYS, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
    HOURS_PER_DAY,
};
