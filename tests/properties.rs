//! End-to-end properties of derivation, scheduling, analysis and search.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use u_dimension::derivation::{Derivation, ParameterDeriver};
use u_dimension::dimensioning::{DimensionSettings, DimensionState, Dimensioner};
use u_dimension::models::{
    CapacityConfig, DemandRecord, Job, JobCategory, ResourceType, Schedule, Stage,
    StageRequirements,
};
use u_dimension::scenario::DemandMix;
use u_dimension::scheduler::{BottleneckReport, DispatchScheduler, TIME_EPSILON_HOURS};

fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 4).unwrap()
}

fn random_demand(n: usize, seed: u64) -> Derivation {
    let mut rng = SmallRng::seed_from_u64(seed);
    let records = DemandMix::historical().generate(n, 10, &mut rng);
    ParameterDeriver::new()
        .with_reference_date(reference_date())
        .derive(&records)
}

fn prep_jobs(releases: &[f64], hours: f64) -> Vec<Job> {
    releases
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            Job::new(format!("J{i}"), JobCategory::Isotropic)
                .with_stage(Stage::ActivePrep, hours)
                .with_release(r)
        })
        .collect()
}

fn prep_capacity(units: u32) -> CapacityConfig {
    CapacityConfig::new().with_units(ResourceType::PrepBench, units)
}

fn schedule(jobs: &[Job], capacity: &CapacityConfig) -> Schedule {
    DispatchScheduler::new().schedule(jobs, &StageRequirements::standard(), capacity)
}

#[test]
fn test_schedule_is_deterministic() {
    let d = random_demand(60, 42);
    let capacity = CapacityConfig::baseline();
    let a = DispatchScheduler::new().schedule(&d.jobs, &d.requirements, &capacity);
    let b = DispatchScheduler::new().schedule(&d.jobs, &d.requirements, &capacity);
    assert_eq!(a, b);
}

#[test]
fn test_no_unit_double_booked() {
    let d = random_demand(80, 1);
    let capacity = CapacityConfig::baseline();
    let s = DispatchScheduler::new().schedule(&d.jobs, &d.requirements, &capacity);
    assert!(s.is_complete());

    let mut by_unit: BTreeMap<(ResourceType, usize), Vec<(f64, f64)>> = BTreeMap::new();
    for e in &s.entries {
        for claim in &e.units {
            assert!(claim.unit < capacity.units(claim.resource) as usize);
            by_unit
                .entry((claim.resource, claim.unit))
                .or_default()
                .push((e.start, e.end));
        }
    }
    for ((rt, unit), mut intervals) in by_unit {
        intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
        for pair in intervals.windows(2) {
            assert!(
                pair[1].0 >= pair[0].1 - TIME_EPSILON_HOURS,
                "{rt} unit {unit} overlaps: {:?} then {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[test]
fn test_stage_order_and_release_respected() {
    let d = random_demand(80, 2);
    let capacity = CapacityConfig::baseline();
    let s = DispatchScheduler::new().schedule(&d.jobs, &d.requirements, &capacity);

    for job in &d.jobs {
        let mut entries = s.entries_for_job(&job.id);
        assert_eq!(entries.len(), job.stages().len(), "job {}", job.id);
        entries.sort_by_key(|e| e.stage);

        assert!(entries[0].start >= job.release_hours - TIME_EPSILON_HOURS);
        for pair in entries.windows(2) {
            assert!(pair[1].start >= pair[0].end - TIME_EPSILON_HOURS);
        }
        for e in &entries {
            assert!((e.duration() - job.durations[e.stage]).abs() < 1e-9);
        }
    }
}

#[test]
fn test_more_capacity_never_slower() {
    let jobs = prep_jobs(&[0.0; 4], 5.0);
    let makespans: Vec<f64> = [1, 2, 4]
        .iter()
        .map(|&u| schedule(&jobs, &prep_capacity(u)).makespan())
        .collect();
    assert!((makespans[0] - 20.0).abs() < 1e-9);
    assert!((makespans[1] - 10.0).abs() < 1e-9);
    assert!((makespans[2] - 5.0).abs() < 1e-9);
}

#[test]
fn test_utilization_bounded() {
    let d = random_demand(100, 3);
    let capacity = CapacityConfig::baseline();
    let s = DispatchScheduler::new().schedule(&d.jobs, &d.requirements, &capacity);
    let report = BottleneckReport::analyze(&s, &d.requirements, &capacity);

    assert_eq!(report.metrics.len(), ResourceType::COUNT);
    for m in report.metrics.values() {
        assert!(
            (0.0..=100.0 + 1e-9).contains(&m.utilization_pct),
            "{}: {}",
            m.resource,
            m.utilization_pct
        );
        assert!(m.wait_hours >= 0.0);
        assert!(m.score >= 0.0);
    }
}

#[test]
fn test_dimensioner_respects_budget() {
    let d = random_demand(120, 4);
    let settings = DimensionSettings::new(24.0).with_max_iterations(4);
    let result = Dimensioner::new(settings)
        .unwrap()
        .dimension(&d.jobs, &d.requirements);

    assert!(result.iterations.len() <= 4);
    assert!(!result.iterations.is_empty());
    assert_ne!(result.state, DimensionState::Iterating);
    assert!(result.best_makespan.is_finite());
    assert!(result.iterations.iter().any(|r| r.accepted));
    assert!(result
        .iterations
        .iter()
        .any(|r| r.config == result.best_config));
}

#[test]
fn test_three_job_queue() {
    let jobs = prep_jobs(&[0.0, 0.0, 10.0], 5.0);
    let s = schedule(&jobs, &prep_capacity(1));

    let spans: Vec<(f64, f64)> = ["J0", "J1", "J2"]
        .iter()
        .map(|id| {
            let e = s.entry(id, Stage::ActivePrep).unwrap();
            (e.start, e.end)
        })
        .collect();
    assert_eq!(spans, vec![(0.0, 5.0), (5.0, 10.0), (10.0, 15.0)]);
    assert!((s.makespan() - 15.0).abs() < 1e-9);
}

#[test]
fn test_sandy_saturated_trial() {
    let deriver = ParameterDeriver::new().with_reference_date(reference_date());
    let sandy = deriver.derive_one(
        "S",
        &DemandRecord::new("CIDsat").with_sample_name("Areia siltosa arenosa"),
    );
    let plain = deriver.derive_one("P", &DemandRecord::new("CIDsat"));

    assert!((sandy.durations[Stage::WaterSaturation] - 12.0).abs() < 1e-9);
    assert!((plain.durations[Stage::WaterSaturation] - 24.0).abs() < 1e-9);
}

#[test]
fn test_deformation_from_specification() {
    let deriver = ParameterDeriver::new().with_reference_date(reference_date());
    let parsed = deriver.derive_one(
        "A",
        &DemandRecord::new("CIU").with_specification("Deformação: 15%"),
    );
    let default = deriver.derive_one("B", &DemandRecord::new("CIU"));

    assert!((parsed.parameters.deformation_pct - 15.0).abs() < 1e-9);
    assert!((default.parameters.deformation_pct - 20.0).abs() < 1e-9);
    assert!(parsed.durations[Stage::Break] < default.durations[Stage::Break]);
}

#[test]
fn test_unused_type_scores_zero() {
    let jobs = prep_jobs(&[0.0, 0.0], 3.0);
    let requirements = StageRequirements::standard();
    let capacity = prep_capacity(1).with_units(ResourceType::BenderCell, 2);
    let s = DispatchScheduler::new().schedule(&jobs, &requirements, &capacity);
    let report = BottleneckReport::analyze(&s, &requirements, &capacity);

    let bender = report.get(ResourceType::BenderCell).unwrap();
    assert_eq!(bender.utilization_pct, 0.0);
    assert_eq!(bender.score, 0.0);
    assert!(report.score(ResourceType::PrepBench) > 0.0);
}
