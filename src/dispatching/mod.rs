//! Dispatching rules and rule engine for candidate selection.
//!
//! At every round of the dispatch loop each job with a pending stage becomes
//! a [`Candidate`]. A composable [`RuleEngine`] ranks the candidates and the
//! scheduler commits the best one.
//!
//! # Usage
//!
//! ```
//! use u_dimension::dispatching::{Candidate, RuleEngine, TieBreaker};
//! use u_dimension::dispatching::rules;
//! use u_dimension::models::Stage;
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::EarliestReady)
//!     .with_tie_breaker(rules::EarliestRelease)
//!     .with_final_tie_breaker(TieBreaker::ByInputOrder);
//!
//! let candidates = vec![
//!     Candidate::new(0, Stage::ActivePrep, 5.0),
//!     Candidate::new(1, Stage::ActivePrep, 2.0),
//! ];
//! assert_eq!(engine.select_best(&candidates), Some(1));
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 4
//! - Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

mod engine;
pub mod rules;

pub use engine::{RuleEngine, TieBreaker};

use crate::models::Stage;
use std::fmt::Debug;

/// Score returned by a dispatching rule.
///
/// Lower scores = higher priority (dispatched first).
pub type RuleScore = f64;

/// A (job, pending stage) pair competing for dispatch in one round.
///
/// All times are in hours from the global time origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Index of the job in the scheduler input.
    pub job_index: usize,
    /// The job's pending stage.
    pub stage: Stage,
    /// Earliest start honoring both precedence and resource availability.
    pub ready: f64,
    /// Earliest start honoring precedence only.
    pub natural_ready: f64,
    /// Job release instant.
    pub release: f64,
    /// Job total active work.
    pub total_work: f64,
    /// Duration of the pending stage.
    pub duration: f64,
}

impl Candidate {
    /// Creates a candidate ready at `ready` with no waiting, release 0 and
    /// no work.
    pub fn new(job_index: usize, stage: Stage, ready: f64) -> Self {
        Self {
            job_index,
            stage,
            ready,
            natural_ready: ready,
            release: 0.0,
            total_work: 0.0,
            duration: 0.0,
        }
    }

    /// Sets the precedence-only ready time.
    pub fn with_natural_ready(mut self, natural_ready: f64) -> Self {
        self.natural_ready = natural_ready;
        self
    }

    /// Sets the job release.
    pub fn with_release(mut self, release: f64) -> Self {
        self.release = release;
        self
    }

    /// Sets the job total active work.
    pub fn with_total_work(mut self, total_work: f64) -> Self {
        self.total_work = total_work;
        self
    }

    /// Sets the stage duration.
    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    /// Hours the candidate waits for resources beyond its natural ready time.
    #[inline]
    pub fn resource_delay(&self) -> f64 {
        self.ready - self.natural_ready
    }
}

/// A dispatching rule that evaluates candidate priority.
///
/// # Score Convention
/// **Lower score = higher priority.** Rules should return smaller values
/// for candidates that should be dispatched first.
///
/// # Reference
/// Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching
pub trait DispatchingRule: Send + Sync + Debug {
    /// Rule name (e.g., "READY", "RELEASE").
    fn name(&self) -> &'static str;

    /// Evaluates the priority of a candidate.
    ///
    /// Returns a score where lower = higher priority.
    fn evaluate(&self, candidate: &Candidate) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}
