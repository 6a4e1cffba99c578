//! Schedule (solution) model.
//!
//! A schedule is the ordered list of committed (job, stage) intervals, plus
//! the wait the dispatcher attributed to each resource type while building it
//! and the jobs it could not complete.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{JobCategory, ResourceType, Stage};

/// One unit of a resource pool held by an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitClaim {
    /// Pool the unit belongs to.
    pub resource: ResourceType,
    /// Unit index within the pool.
    pub unit: usize,
}

/// A committed (job, stage) interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Job identifier.
    pub job_id: String,
    /// Job category (denormalized for requirement lookups).
    pub category: JobCategory,
    /// Executed stage.
    pub stage: Stage,
    /// Start (hours).
    pub start: f64,
    /// End (hours).
    pub end: f64,
    /// Units held during [start, end).
    pub units: Vec<UnitClaim>,
}

impl ScheduleEntry {
    /// Creates an entry holding no units.
    pub fn new(
        job_id: impl Into<String>,
        category: JobCategory,
        stage: Stage,
        start: f64,
        end: f64,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            category,
            stage,
            start,
            end,
            units: Vec::new(),
        }
    }

    /// Adds a held unit.
    pub fn with_unit(mut self, resource: ResourceType, unit: usize) -> Self {
        self.units.push(UnitClaim { resource, unit });
        self
    }

    /// Duration (hours).
    #[inline]
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the entry holds a unit of the given pool.
    pub fn holds(&self, resource: ResourceType) -> bool {
        self.units.iter().any(|c| c.resource == resource)
    }
}

/// A complete schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Entries in commit order.
    pub entries: Vec<ScheduleEntry>,
    /// Wait (hours) attributed to each resource type during dispatch.
    pub attributed_wait: BTreeMap<ResourceType, f64>,
    /// Jobs that never completed all their stages.
    pub incomplete_jobs: Vec<String>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn add_entry(&mut self, entry: ScheduleEntry) {
        self.entries.push(entry);
    }

    /// Charges wait to a resource type.
    pub fn add_wait(&mut self, resource: ResourceType, hours: f64) {
        *self.attributed_wait.entry(resource).or_insert(0.0) += hours;
    }

    /// Wait attributed to a resource type (0 if none).
    pub fn wait(&self, resource: ResourceType) -> f64 {
        self.attributed_wait.get(&resource).copied().unwrap_or(0.0)
    }

    /// Latest end across all entries (hours); 0 when empty.
    pub fn makespan(&self) -> f64 {
        self.entries.iter().map(|e| e.end).fold(0.0, f64::max)
    }

    /// Whether every job completed.
    pub fn is_complete(&self) -> bool {
        self.incomplete_jobs.is_empty()
    }

    /// Entries of one job, in commit order.
    pub fn entries_for_job(&self, job_id: &str) -> Vec<&ScheduleEntry> {
        self.entries.iter().filter(|e| e.job_id == job_id).collect()
    }

    /// Entries that held a given unit, in commit order.
    pub fn entries_for_unit(&self, resource: ResourceType, unit: usize) -> Vec<&ScheduleEntry> {
        self.entries
            .iter()
            .filter(|e| e.units.contains(&UnitClaim { resource, unit }))
            .collect()
    }

    /// Completion time of a job (latest end of its entries).
    pub fn job_completion(&self, job_id: &str) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.job_id == job_id)
            .map(|e| e.end)
            .reduce(f64::max)
    }

    /// Entry for a (job, stage) pair.
    pub fn entry(&self, job_id: &str, stage: Stage) -> Option<&ScheduleEntry> {
        self.entries
            .iter()
            .find(|e| e.job_id == job_id && e.stage == stage)
    }

    /// Number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_schedule() -> Schedule {
        let mut s = Schedule::new();
        s.add_entry(
            ScheduleEntry::new("J0", JobCategory::Isotropic, Stage::ActivePrep, 0.0, 1.0)
                .with_unit(ResourceType::PrepBench, 0),
        );
        s.add_entry(
            ScheduleEntry::new("J0", JobCategory::Isotropic, Stage::PrepRest, 1.0, 25.0),
        );
        s.add_entry(
            ScheduleEntry::new("J1", JobCategory::Bender, Stage::ActivePrep, 1.0, 1.5)
                .with_unit(ResourceType::PrepBench, 0),
        );
        s
    }

    #[test]
    fn test_makespan() {
        assert!((sample_schedule().makespan() - 25.0).abs() < 1e-12);
        assert!((Schedule::new().makespan() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_entries_for_job() {
        let s = sample_schedule();
        assert_eq!(s.entries_for_job("J0").len(), 2);
        assert_eq!(s.entries_for_job("J1").len(), 1);
        assert!(s.entries_for_job("J9").is_empty());
    }

    #[test]
    fn test_entries_for_unit() {
        let s = sample_schedule();
        let held = s.entries_for_unit(ResourceType::PrepBench, 0);
        assert_eq!(held.len(), 2);
        assert!(held.iter().all(|e| e.holds(ResourceType::PrepBench)));
        assert!(s.entries_for_unit(ResourceType::PrepBench, 1).is_empty());
    }

    #[test]
    fn test_job_completion() {
        let s = sample_schedule();
        assert_eq!(s.job_completion("J0"), Some(25.0));
        assert_eq!(s.job_completion("J1"), Some(1.5));
        assert_eq!(s.job_completion("J9"), None);
    }

    #[test]
    fn test_wait_accumulates() {
        let mut s = Schedule::new();
        s.add_wait(ResourceType::IsoPress, 2.0);
        s.add_wait(ResourceType::IsoPress, 0.5);
        assert!((s.wait(ResourceType::IsoPress) - 2.5).abs() < 1e-12);
        assert!((s.wait(ResourceType::Co2Line) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_entry_lookup() {
        let s = sample_schedule();
        let e = s.entry("J0", Stage::PrepRest).unwrap();
        assert!((e.duration() - 24.0).abs() < 1e-12);
        assert!(e.units.is_empty());
        assert!(s.entry("J1", Stage::PrepRest).is_none());
        assert!(s.is_complete());
    }
}
