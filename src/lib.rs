//! Capacity dimensioning for multi-stage laboratory test campaigns.
//!
//! Turns a demand of soil-mechanics trials into jobs, schedules them on a
//! pooled multi-resource shop with a deterministic greedy dispatcher, scores
//! each resource type as a bottleneck and grows the worst one until the
//! campaign fits its deadline.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Job`, `Stage`, `ResourceType`,
//!   `StageRequirements`, `CapacityConfig`, `Schedule`, `DemandRecord`
//! - **`derivation`**: Demand records to jobs (trial classification, stage
//!   durations, release instants)
//! - **`dispatching`**: Candidate ranking rules and the rule engine
//! - **`scheduler`**: Resource pools, the dispatch loop, bottleneck metrics
//! - **`dimensioning`**: Iterative bottleneck-driven capacity search
//! - **`scenario`**: Deadline estimation for proposals and multi-realization
//!   capacity studies
//! - **`validation`**: Input integrity checks (duplicate IDs, empty jobs,
//!   zero capacity, settings ranges)
//!
//! # Example
//!
//! ```
//! use u_dimension::derivation::ParameterDeriver;
//! use u_dimension::models::{CapacityConfig, DemandRecord, SampleCategory};
//! use u_dimension::scheduler::{BottleneckReport, DispatchScheduler};
//!
//! let records = vec![
//!     DemandRecord::new("CIUsat").with_sample(SampleCategory::Remolded),
//!     DemandRecord::new("CIDsat"),
//!     DemandRecord::new("BE").with_release_day(2.0),
//! ];
//! let derivation = ParameterDeriver::new().derive(&records);
//! let capacity = CapacityConfig::baseline();
//!
//! let schedule =
//!     DispatchScheduler::new().schedule(&derivation.jobs, &derivation.requirements, &capacity);
//! assert!(schedule.is_complete());
//!
//! let report = BottleneckReport::analyze(&schedule, &derivation.requirements, &capacity);
//! assert_eq!(report.makespan, schedule.makespan());
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Goldratt (1984), "The Goal"
//! - Head (1986), "Manual of Soil Laboratory Testing", Vol. 3

pub mod derivation;
pub mod dimensioning;
pub mod dispatching;
pub mod models;
pub mod scenario;
pub mod scheduler;
pub mod validation;
