//! Demand proposals and deadline estimation.
//!
//! A proposal is a named batch of trials arriving on a given date. The
//! estimator schedules the standing queue together with every non-empty
//! combination of proposals at fixed capacity and averages each proposal's
//! completion across the scenarios it appears in.

use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::derivation::ParameterDeriver;
use crate::models::{CapacityConfig, DemandRecord, SampleCategory};
use crate::scheduler::DispatchScheduler;

/// Working hours per business day.
pub const BUSINESS_HOURS_PER_DAY: f64 = 17.0;

/// One line of a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposalTrial {
    /// Trial code.
    pub trial_code: String,
    /// Sample condition.
    #[serde(default)]
    pub sample: SampleCategory,
    /// Number of specimens.
    pub quantity: u32,
}

/// A named batch of prospective trials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    /// Proposal name; becomes the campaign label of its jobs.
    pub name: String,
    /// Expected sample arrival.
    pub arrival: NaiveDate,
    /// Requested trials.
    #[serde(default)]
    pub trials: Vec<ProposalTrial>,
}

impl Proposal {
    /// Creates an empty proposal.
    pub fn new(name: impl Into<String>, arrival: NaiveDate) -> Self {
        Self {
            name: name.into(),
            arrival,
            trials: Vec::new(),
        }
    }

    /// Adds a trial line.
    pub fn with_trial(
        mut self,
        trial_code: impl Into<String>,
        sample: SampleCategory,
        quantity: u32,
    ) -> Self {
        self.trials.push(ProposalTrial {
            trial_code: trial_code.into(),
            sample,
            quantity,
        });
        self
    }

    /// Number of specimens requested.
    pub fn specimen_count(&self) -> u32 {
        self.trials.iter().map(|t| t.quantity).sum()
    }

    /// Expands into one demand record per specimen.
    pub fn records(&self) -> Vec<DemandRecord> {
        self.trials
            .iter()
            .flat_map(|t| {
                let record = DemandRecord::new(&t.trial_code)
                    .with_sample(t.sample)
                    .with_arrival(self.arrival)
                    .with_campaign(&self.name);
                std::iter::repeat_n(record, t.quantity as usize)
            })
            .collect()
    }
}

/// Average completion of one trial code within one proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialEstimate {
    /// Proposal name.
    pub proposal: String,
    /// Trial code.
    pub trial_code: String,
    /// Mean completion (business days).
    pub business_days: f64,
}

/// Averaged completions across scenarios.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeadlineEstimate {
    /// Number of scenarios scheduled.
    pub scenarios: usize,
    /// Mean completion per proposal (business days).
    pub per_proposal: BTreeMap<String, f64>,
    /// Mean completion per (proposal, trial code), sorted by both.
    pub per_trial: Vec<TrialEstimate>,
}

#[derive(Debug, Default)]
struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Estimates proposal completion dates at fixed capacity.
#[derive(Debug, Clone)]
pub struct DeadlineEstimator {
    capacity: CapacityConfig,
    deriver: ParameterDeriver,
    scheduler: DispatchScheduler,
}

impl Default for DeadlineEstimator {
    fn default() -> Self {
        Self::new(CapacityConfig::baseline())
    }
}

impl DeadlineEstimator {
    /// Creates an estimator for a capacity configuration.
    pub fn new(capacity: CapacityConfig) -> Self {
        Self {
            capacity,
            deriver: ParameterDeriver::new(),
            scheduler: DispatchScheduler::new(),
        }
    }

    /// Counts arrivals from a fixed date instead of today.
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.deriver = self.deriver.with_reference_date(date);
        self
    }

    /// Replaces the scheduler.
    pub fn with_scheduler(mut self, scheduler: DispatchScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    /// Schedules `queue` plus each non-empty combination of proposals.
    ///
    /// The number of scenarios is 2^n − 1 for n proposals. A proposal none
    /// of whose jobs completed in a scenario contributes nothing for it.
    pub fn estimate(&self, queue: &[DemandRecord], proposals: &[Proposal]) -> DeadlineEstimate {
        let mut per_proposal: BTreeMap<String, Mean> = BTreeMap::new();
        let mut per_trial: BTreeMap<(String, String), Mean> = BTreeMap::new();
        let mut scenarios = 0;

        for size in 1..=proposals.len() {
            for selected in proposals.iter().combinations(size) {
                scenarios += 1;

                let mut records = queue.to_vec();
                let mut owner: Vec<Option<&str>> = vec![None; queue.len()];
                for proposal in &selected {
                    let expanded = proposal.records();
                    let name = Some(proposal.name.as_str());
                    owner.extend(std::iter::repeat_n(name, expanded.len()));
                    records.extend(expanded);
                }

                let derivation = self.deriver.derive(&records);
                let schedule = self.scheduler.schedule(
                    &derivation.jobs,
                    &derivation.requirements,
                    &self.capacity,
                );

                for proposal in &selected {
                    let mut latest: Option<f64> = None;
                    let mut latest_by_code: BTreeMap<&str, f64> = BTreeMap::new();
                    for (job, _) in derivation
                        .jobs
                        .iter()
                        .zip(&owner)
                        .filter(|(_, o)| **o == Some(proposal.name.as_str()))
                    {
                        let Some(end) = schedule.job_completion(&job.id) else {
                            continue;
                        };
                        latest = Some(latest.map_or(end, |l| l.max(end)));
                        let code = latest_by_code.entry(job.trial_code.as_str()).or_insert(end);
                        *code = code.max(end);
                    }

                    if let Some(end) = latest {
                        per_proposal
                            .entry(proposal.name.clone())
                            .or_default()
                            .push(end / BUSINESS_HOURS_PER_DAY);
                    }
                    for (code, end) in latest_by_code {
                        per_trial
                            .entry((proposal.name.clone(), code.to_string()))
                            .or_default()
                            .push(end / BUSINESS_HOURS_PER_DAY);
                    }
                }
            }
        }

        debug!(scenarios, n_proposals = proposals.len(), "Deadline scenarios scheduled");

        DeadlineEstimate {
            scenarios,
            per_proposal: per_proposal
                .into_iter()
                .map(|(name, mean)| (name, mean.value()))
                .collect(),
            per_trial: per_trial
                .into_iter()
                .map(|((proposal, trial_code), mean)| TrialEstimate {
                    proposal,
                    trial_code,
                    business_days: mean.value(),
                })
                .collect(),
        }
    }
}
