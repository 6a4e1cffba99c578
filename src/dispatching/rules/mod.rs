//! Built-in dispatching rules.
//!
//! # Categories
//!
//! - **Availability**: READY
//! - **Arrival**: RELEASE
//! - **Work content**: LWKR
//!
//! # Score Convention
//! All rules return lower scores for higher priority candidates.
//!
//! # References
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use super::{Candidate, DispatchingRule, RuleScore};

// ======================== Availability rules ========================

/// Earliest Ready Time.
///
/// Prioritizes the candidate that can start first given both precedence and
/// resource availability. This is the event-driven core of the dispatcher:
/// the clock only advances to the next startable stage.
#[derive(Debug, Clone, Copy)]
pub struct EarliestReady;

impl DispatchingRule for EarliestReady {
    fn name(&self) -> &'static str {
        "READY"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        candidate.ready
    }

    fn description(&self) -> &'static str {
        "Earliest Ready Time"
    }
}

// ======================== Arrival rules ========================

/// Earliest Release.
///
/// First-come first-served on job release instants.
#[derive(Debug, Clone, Copy)]
pub struct EarliestRelease;

impl DispatchingRule for EarliestRelease {
    fn name(&self) -> &'static str {
        "RELEASE"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        candidate.release
    }

    fn description(&self) -> &'static str {
        "Earliest Release"
    }
}

// ======================== Work-content rules ========================

/// Least Total Work.
///
/// Prioritizes jobs with less total active work (holding stages excluded).
#[derive(Debug, Clone, Copy)]
pub struct LeastTotalWork;

impl DispatchingRule for LeastTotalWork {
    fn name(&self) -> &'static str {
        "LWKR"
    }

    fn evaluate(&self, candidate: &Candidate) -> RuleScore {
        candidate.total_work
    }

    fn description(&self) -> &'static str {
        "Least Total Work"
    }
}
