//! Greedy discrete-event dispatch scheduler.
//!
//! # Algorithm
//!
//! Repeated rounds until no job has a pending stage:
//!
//! 1. Each job's pending stage is its first applicable stage not yet done.
//! 2. For each pending stage, compute the natural ready time (end of the
//!    previous stage, or the release) and the resource ready time (latest
//!    earliest-free instant over the required pools). Excess waiting is
//!    charged to the local bottleneck.
//! 3. The rule engine selects one candidate; it starts at its ready time
//!    and claims one unit of every required pool.
//!
//! If no candidate exists, pools are fast-forwarded once; if there is still
//! none, the remaining jobs are reported as incomplete.
//!
//! # Complexity
//! O(s * n * r) where s=total stages, n=jobs, r=required types per stage.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 4: Priority Dispatching

use tracing::{debug, warn};

use super::pool::{ResourcePools, TIME_EPSILON_HOURS};
use crate::dispatching::{Candidate, RuleEngine};
use crate::models::{CapacityConfig, Job, Schedule, ScheduleEntry, Stage, StageRequirements};

/// Dispatch progress of one job.
#[derive(Debug, Clone)]
struct JobProgress {
    stages: Vec<Stage>,
    next: usize,
    last_end: f64,
}

impl JobProgress {
    fn new(job: &Job) -> Self {
        Self {
            stages: job.stages(),
            next: 0,
            last_end: job.release_hours,
        }
    }

    fn pending(&self) -> Option<Stage> {
        self.stages.get(self.next).copied()
    }
}

/// Greedy discrete-event scheduler over finite resource pools.
///
/// Deterministic: the same jobs, requirements and capacity always produce
/// the same schedule.
///
/// # Example
///
/// ```
/// use u_dimension::scheduler::DispatchScheduler;
/// use u_dimension::models::{
///     CapacityConfig, Job, JobCategory, ResourceType, Stage, StageRequirements,
/// };
///
/// let jobs = vec![
///     Job::new("A", JobCategory::Isotropic).with_stage(Stage::ActivePrep, 2.0),
///     Job::new("B", JobCategory::Isotropic).with_stage(Stage::ActivePrep, 2.0),
/// ];
/// let requirements = StageRequirements::standard();
/// let capacity = CapacityConfig::new().with_units(ResourceType::PrepBench, 1);
///
/// let schedule = DispatchScheduler::new().schedule(&jobs, &requirements, &capacity);
/// assert!((schedule.makespan() - 4.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DispatchScheduler {
    rule_engine: RuleEngine,
}

impl DispatchScheduler {
    /// Creates a scheduler with the standard laboratory dispatch order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the candidate ranking.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Schedules every job.
    ///
    /// Never fails: jobs without applicable stages, or whose pending stage
    /// needs a pool with zero units, end up in
    /// [`Schedule::incomplete_jobs`].
    pub fn schedule(
        &self,
        jobs: &[Job],
        requirements: &StageRequirements,
        capacity: &CapacityConfig,
    ) -> Schedule {
        let mut schedule = Schedule::new();
        let mut pools = ResourcePools::from_capacity(capacity);
        let mut progress: Vec<JobProgress> = jobs.iter().map(JobProgress::new).collect();

        for (job, p) in jobs.iter().zip(&progress) {
            if p.stages.is_empty() {
                schedule.incomplete_jobs.push(job.id.clone());
            }
        }

        let mut fast_forwarded = false;
        loop {
            let mut any_pending = false;
            let mut candidates = Vec::new();

            for (i, job) in jobs.iter().enumerate() {
                let Some(stage) = progress[i].pending() else {
                    continue;
                };
                any_pending = true;

                let required = requirements.required(job.category, stage);
                let Some((resource_ready, bottleneck)) = pools.ready_time(required) else {
                    continue;
                };

                let natural = progress[i].last_end;
                let ready = natural.max(resource_ready);
                if let Some(rt) = bottleneck {
                    let excess = ready - natural;
                    if excess > TIME_EPSILON_HOURS {
                        schedule.add_wait(rt, excess);
                    }
                }

                candidates.push(
                    Candidate::new(i, stage, ready)
                        .with_natural_ready(natural)
                        .with_release(job.release_hours)
                        .with_total_work(job.total_work())
                        .with_duration(job.durations[stage]),
                );
            }

            if !any_pending {
                break;
            }

            let Some(best) = self.rule_engine.select_best(&candidates) else {
                if !fast_forwarded {
                    fast_forwarded = true;
                    pools.fast_forward();
                    continue;
                }
                let stalled: Vec<String> = jobs
                    .iter()
                    .zip(&progress)
                    .filter(|(_, p)| p.pending().is_some())
                    .map(|(job, _)| job.id.clone())
                    .collect();
                warn!(
                    n_stalled = stalled.len(),
                    "No dispatchable stage left; reporting stalled jobs as incomplete"
                );
                schedule.incomplete_jobs.extend(stalled);
                break;
            };
            fast_forwarded = false;

            let candidate = candidates[best];
            let job = &jobs[candidate.job_index];
            let start = candidate.ready;
            let end = start + candidate.duration;

            let mut entry = ScheduleEntry::new(&job.id, job.category, candidate.stage, start, end);
            for &rt in requirements.required(job.category, candidate.stage) {
                if let Some(unit) = pools.commit(rt, start, end) {
                    entry = entry.with_unit(rt, unit);
                }
            }
            schedule.add_entry(entry);

            let p = &mut progress[candidate.job_index];
            p.next += 1;
            p.last_end = end;
        }

        debug!(
            n_jobs = jobs.len(),
            n_entries = schedule.entry_count(),
            n_incomplete = schedule.incomplete_jobs.len(),
            makespan = schedule.makespan(),
            "Schedule built"
        );
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatching::rules;
    use crate::models::{JobCategory, ResourceType};

    fn prep_job(id: &str, hours: f64, release: f64) -> Job {
        Job::new(id, JobCategory::Isotropic)
            .with_stage(Stage::ActivePrep, hours)
            .with_release(release)
    }

    fn prep_capacity(units: u32) -> CapacityConfig {
        CapacityConfig::new().with_units(ResourceType::PrepBench, units)
    }

    fn schedule(jobs: &[Job], capacity: &CapacityConfig) -> Schedule {
        DispatchScheduler::new().schedule(jobs, &StageRequirements::standard(), capacity)
    }

    #[test]
    fn test_single_job() {
        let s = schedule(&[prep_job("A", 2.0, 0.0)], &prep_capacity(1));
        assert_eq!(s.entry_count(), 1);
        let e = s.entry("A", Stage::ActivePrep).unwrap();
        assert!((e.start - 0.0).abs() < 1e-9);
        assert!((e.end - 2.0).abs() < 1e-9);
        assert_eq!(e.units.len(), 1);
        assert!(e.holds(ResourceType::PrepBench));
    }

    #[test]
    fn test_release_and_queue() {
        let jobs = vec![
            prep_job("A", 5.0, 0.0),
            prep_job("B", 5.0, 0.0),
            prep_job("C", 5.0, 10.0),
        ];
        let s = schedule(&jobs, &prep_capacity(1));

        let spans: Vec<(f64, f64)> = ["A", "B", "C"]
            .iter()
            .map(|id| {
                let e = s.entry(id, Stage::ActivePrep).unwrap();
                (e.start, e.end)
            })
            .collect();
        assert_eq!(spans, vec![(0.0, 5.0), (5.0, 10.0), (10.0, 15.0)]);
        assert!((s.makespan() - 15.0).abs() < 1e-9);
        // B waited 5h on the bench; C never waited beyond its release
        assert!((s.wait(ResourceType::PrepBench) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_wait_charged_every_round() {
        let jobs: Vec<Job> = (0..4).map(|i| prep_job(&format!("J{i}"), 5.0, 0.0)).collect();
        let s = schedule(&jobs, &prep_capacity(1));
        assert!((s.makespan() - 20.0).abs() < 1e-9);
        // round 2: 3 × 5h, round 3: 2 × 10h, round 4: 1 × 15h
        assert!((s.wait(ResourceType::PrepBench) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_parallel_units() {
        let jobs: Vec<Job> = (0..4).map(|i| prep_job(&format!("J{i}"), 5.0, 0.0)).collect();
        let s = schedule(&jobs, &prep_capacity(2));
        assert!((s.makespan() - 10.0).abs() < 1e-9);
        assert_eq!(s.entries_for_unit(ResourceType::PrepBench, 0).len(), 2);
        assert_eq!(s.entries_for_unit(ResourceType::PrepBench, 1).len(), 2);
    }

    #[test]
    fn test_stage_precedence() {
        let job = Job::new("A", JobCategory::Isotropic)
            .with_stage(Stage::ActivePrep, 1.0)
            .with_stage(Stage::PrepRest, 24.0)
            .with_stage(Stage::CellAssembly, 0.5)
            .with_stage(Stage::Disassembly, 0.25);
        let s = schedule(&[job], &CapacityConfig::baseline());

        let entries = s.entries_for_job("A");
        let stages: Vec<Stage> = entries.iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::ActivePrep, Stage::PrepRest, Stage::CellAssembly, Stage::Disassembly]
        );
        for pair in entries.windows(2) {
            assert!(pair[1].start >= pair[0].end - 1e-9);
        }
        // holding stage claims nothing
        assert!(s.entry("A", Stage::PrepRest).unwrap().units.is_empty());
        assert!((s.makespan() - 25.75).abs() < 1e-9);
    }

    #[test]
    fn test_multi_resource_claim() {
        let job = Job::new("A", JobCategory::Bender).with_stage(Stage::Consolidation, 2.0);
        let s = schedule(&[job], &CapacityConfig::baseline());
        let e = s.entry("A", Stage::Consolidation).unwrap();
        assert!(e.holds(ResourceType::ConsolidationBench));
        assert!(e.holds(ResourceType::BenderCell));
        assert_eq!(e.units.len(), 2);
    }

    #[test]
    fn test_cell_blocks_second_job() {
        let jobs = vec![
            Job::new("A", JobCategory::Cyclic).with_stage(Stage::CellAssembly, 3.0),
            Job::new("B", JobCategory::Cyclic).with_stage(Stage::CellAssembly, 3.0),
        ];
        let cap = CapacityConfig::new()
            .with_units(ResourceType::AssemblyBench, 2)
            .with_units(ResourceType::CyclicCell, 1);
        let s = schedule(&jobs, &cap);
        let b = s.entry("B", Stage::CellAssembly).unwrap();
        assert!((b.start - 3.0).abs() < 1e-9);
        assert!((s.wait(ResourceType::CyclicCell) - 3.0).abs() < 1e-9);
        assert!((s.wait(ResourceType::AssemblyBench) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_job_without_stages_is_incomplete() {
        let jobs = vec![Job::new("empty", JobCategory::Isotropic), prep_job("A", 1.0, 0.0)];
        let s = schedule(&jobs, &prep_capacity(1));
        assert_eq!(s.incomplete_jobs, vec!["empty".to_string()]);
        assert_eq!(s.entry_count(), 1);
        assert!(!s.is_complete());
    }

    #[test]
    fn test_zero_capacity_stalls() {
        let jobs = vec![prep_job("A", 1.0, 0.0)];
        let s = schedule(&jobs, &prep_capacity(0));
        assert_eq!(s.incomplete_jobs, vec!["A".to_string()]);
        assert_eq!(s.entry_count(), 0);
        assert!((s.makespan() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_capacity_partial() {
        // A finishes its prep, then stalls on an empty press pool
        let jobs = vec![
            Job::new("A", JobCategory::Isotropic)
                .with_stage(Stage::ActivePrep, 1.0)
                .with_stage(Stage::Break, 2.0),
            prep_job("B", 1.0, 0.0),
        ];
        let cap = CapacityConfig::new().with_units(ResourceType::IsoPress, 0);
        let s = schedule(&jobs, &cap);
        assert_eq!(s.incomplete_jobs, vec!["A".to_string()]);
        assert!(s.entry("B", Stage::ActivePrep).is_some());
        assert!(s.entry("A", Stage::ActivePrep).is_some());
        assert!(s.entry("A", Stage::Break).is_none());
    }

    #[test]
    fn test_empty_input() {
        let s = schedule(&[], &CapacityConfig::baseline());
        assert_eq!(s.entry_count(), 0);
        assert!((s.makespan() - 0.0).abs() < 1e-9);
        assert!(s.is_complete());
    }

    #[test]
    fn test_tie_breaking_by_work_then_input() {
        let jobs = vec![
            prep_job("long", 1.0, 0.0).with_stage(Stage::SpecimenForming, 5.0),
            prep_job("short", 1.0, 0.0),
            prep_job("short2", 1.0, 0.0),
        ];
        let s = schedule(&jobs, &prep_capacity(1));
        let start = |id: &str| s.entry(id, Stage::ActivePrep).unwrap().start;
        assert!((start("short") - 0.0).abs() < 1e-9);
        assert!((start("short2") - 1.0).abs() < 1e-9);
        assert!((start("long") - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_custom_rule_engine() {
        let jobs = vec![prep_job("late", 1.0, 3.0), prep_job("early", 1.0, 0.0)];
        let engine = RuleEngine::new()
            .with_rule(rules::EarliestRelease)
            .with_final_tie_breaker(crate::dispatching::TieBreaker::ByInputOrder);
        let s = DispatchScheduler::new().with_rule_engine(engine).schedule(
            &jobs,
            &StageRequirements::standard(),
            &prep_capacity(1),
        );
        assert!((s.entry("early", Stage::ActivePrep).unwrap().start - 0.0).abs() < 1e-9);
        assert!((s.entry("late", Stage::ActivePrep).unwrap().start - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_deterministic() {
        let jobs: Vec<Job> = (0..6)
            .map(|i| {
                Job::new(format!("J{i}"), JobCategory::ALL[i % 4])
                    .with_stage(Stage::ActivePrep, 0.5 + i as f64 * 0.1)
                    .with_stage(Stage::CellAssembly, 0.2)
                    .with_stage(Stage::Disassembly, 0.3)
                    .with_release(i as f64)
            })
            .collect();
        let a = schedule(&jobs, &CapacityConfig::baseline());
        let b = schedule(&jobs, &CapacityConfig::baseline());
        assert_eq!(a, b);
    }
}
