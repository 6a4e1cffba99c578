//! Rule engine for multi-criteria dispatching.
//!
//! Composes dispatching rules into a sequential cascade with a final
//! tie-breaking strategy.
//!
//! # Reference
//! Haupt (1989), "A Survey of Priority Rule-Based Scheduling"

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, Candidate, DispatchingRule};

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Leave the tie (the earlier candidate in the slice wins).
    #[default]
    NextRule,
    /// Lower job index first.
    ByInputOrder,
}

/// A sequential rule cascade for candidate prioritization.
///
/// The first rule decides; each following rule is consulted only when all
/// previous ones tie within a small epsilon.
///
/// # Example
/// ```
/// use u_dimension::dispatching::RuleEngine;
/// use u_dimension::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::EarliestReady)
///     .with_tie_breaker(rules::LeastTotalWork);
/// assert_eq!(engine.rule_count(), 2);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<Arc<dyn DispatchingRule>>,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            tie_breaker: TieBreaker::NextRule,
            epsilon: 1e-9,
        }
    }

    /// The laboratory dispatch order: earliest ready time, then earliest
    /// release, then least total active work, then input order.
    pub fn standard() -> Self {
        Self::new()
            .with_rule(rules::EarliestReady)
            .with_tie_breaker(rules::EarliestRelease)
            .with_tie_breaker(rules::LeastTotalWork)
            .with_final_tie_breaker(TieBreaker::ByInputOrder)
    }

    /// Adds a primary rule.
    pub fn with_rule<R: DispatchingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    /// Adds a tie-breaking rule, consulted after every rule added before it.
    pub fn with_tie_breaker<R: DispatchingRule + 'static>(self, rule: R) -> Self {
        self.with_rule(rule)
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Number of rules, tie-breakers included.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the index of the highest-priority candidate.
    pub fn select_best(&self, candidates: &[Candidate]) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, candidate) in candidates.iter().enumerate() {
            best = match best {
                Some(b) if self.compare(candidate, &candidates[b]) != Ordering::Less => Some(b),
                _ => Some(i),
            };
        }
        best
    }

    fn compare(&self, a: &Candidate, b: &Candidate) -> Ordering {
        for rule in &self.rules {
            let score_a = rule.evaluate(a);
            let score_b = rule.evaluate(b);

            if (score_a - score_b).abs() > self.epsilon {
                return score_a.partial_cmp(&score_b).unwrap_or(Ordering::Equal);
            }
        }

        // All rules tied → use final tie-breaker
        match &self.tie_breaker {
            TieBreaker::NextRule => Ordering::Equal,
            TieBreaker::ByInputOrder => a.job_index.cmp(&b.job_index),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self.rules.iter().map(|r| r.name()).collect::<Vec<_>>(),
            )
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::Stage;

    fn cand(job: usize, ready: f64, release: f64, work: f64) -> Candidate {
        Candidate::new(job, Stage::ActivePrep, ready)
            .with_release(release)
            .with_total_work(work)
    }

    #[test]
    fn test_ready_ordering() {
        let candidates = vec![
            cand(0, 5.0, 0.0, 1.0),
            cand(1, 1.0, 0.0, 1.0),
            cand(2, 3.0, 0.0, 1.0),
        ];
        let engine = RuleEngine::new().with_rule(rules::EarliestReady);
        assert_eq!(engine.select_best(&candidates), Some(1));
    }

    #[test]
    fn test_standard_cascade() {
        // Same ready; job 2 has the earliest release
        let candidates = vec![
            cand(0, 2.0, 1.0, 5.0),
            cand(1, 2.0, 1.0, 3.0),
            cand(2, 2.0, 0.0, 9.0),
        ];
        let engine = RuleEngine::standard();
        assert_eq!(engine.select_best(&candidates), Some(2));
        // without job 2, least work decides
        assert_eq!(engine.select_best(&candidates[..2]), Some(1));
    }

    #[test]
    fn test_input_order_tie_breaker() {
        let candidates = vec![cand(4, 1.0, 0.0, 2.0), cand(3, 1.0, 0.0, 2.0)];
        let engine = RuleEngine::standard();
        assert_eq!(engine.select_best(&candidates), Some(1));
    }

    #[test]
    fn test_unbroken_tie_keeps_first() {
        let candidates = vec![cand(4, 1.0, 0.0, 2.0), cand(3, 1.0, 0.0, 2.0)];
        let engine = RuleEngine::new().with_rule(rules::EarliestReady);
        assert_eq!(engine.select_best(&candidates), Some(0));
    }

    #[test]
    fn test_epsilon_tie() {
        // Ready times within 1e-9 count as equal; release decides
        let candidates = vec![cand(0, 1.0 + 1e-12, 3.0, 1.0), cand(1, 1.0, 5.0, 1.0)];
        let engine = RuleEngine::standard();
        assert_eq!(engine.select_best(&candidates), Some(0));
    }

    #[test]
    fn test_empty_candidates() {
        assert!(RuleEngine::standard().select_best(&[]).is_none());
    }

    #[test]
    fn test_select_best_cascade() {
        let candidates = vec![
            cand(0, 3.0, 2.0, 4.0),
            cand(1, 3.0, 2.0, 1.0),
            cand(2, 0.5, 9.0, 9.0),
            cand(3, 0.5, 9.0, 9.0),
        ];
        let engine = RuleEngine::standard();
        assert_eq!(engine.select_best(&candidates), Some(2));
        assert_eq!(engine.select_best(&candidates[..2]), Some(1));
        assert_eq!(engine.rule_count(), 3);
    }
}
