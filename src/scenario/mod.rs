//! What-if orchestration over the scheduling engine.
//!
//! Everything here consumes the single-run contract (derive, schedule,
//! analyze, dimension) and repeats it over varying demand:
//!
//! - [`DeadlineEstimator`]: completion of proposals on top of a standing queue,
//!   averaged over every combination of proposals
//! - [`DemandMix`]: weighted synthetic demand, historical mix built in
//! - [`CapacityStudy`]: dimensioning repeated over random demand realizations
//!
//! Realizations and scenarios share no mutable state; randomness comes only
//! from the caller's RNG.

mod mix;
mod proposal;
mod study;

pub use mix::{DemandMix, MixEntry, GENERATED_CAMPAIGN, GENERATED_SPECIFICATION, SAMPLE_NAMES};
pub use proposal::{
    DeadlineEstimate, DeadlineEstimator, Proposal, ProposalTrial, TrialEstimate,
    BUSINESS_HOURS_PER_DAY,
};
pub use study::{CapacityStudy, StudySummary, DEFAULT_REALIZATIONS, DEFAULT_STUDY_JOBS};
