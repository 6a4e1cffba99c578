//! Bottleneck metrics.
//!
//! Computes per-resource indicators from a completed schedule.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Busy hours | Σ duration of entries whose stage requires the type |
//! | Utilization % | busy / (units × makespan) × 100 |
//! | Wait hours | Delay the dispatcher attributed to the type |
//! | Score | wait × utilization / 100 |
//!
//! Utilization is 0 when the makespan or the unit count is 0.
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{CapacityConfig, ResourceType, Schedule, StageRequirements};

/// Indicators of one resource type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetrics {
    /// Resource type.
    pub resource: ResourceType,
    /// Units available in the analyzed configuration.
    pub units: u32,
    /// Total occupied hours across units.
    pub busy_hours: f64,
    /// Utilization (0..=100).
    pub utilization_pct: f64,
    /// Attributed wait (hours).
    pub wait_hours: f64,
    /// Composite bottleneck score (hours).
    pub score: f64,
}

impl ResourceMetrics {
    /// Builds metrics from utilization and wait, deriving the score.
    pub fn new(resource: ResourceType, units: u32, utilization_pct: f64, wait_hours: f64) -> Self {
        Self {
            resource,
            units,
            busy_hours: 0.0,
            utilization_pct,
            wait_hours,
            score: bottleneck_score(wait_hours, utilization_pct),
        }
    }
}

/// Composite score: wait weighted by utilization.
#[inline]
pub fn bottleneck_score(wait_hours: f64, utilization_pct: f64) -> f64 {
    wait_hours * utilization_pct / 100.0
}

/// Per-resource metrics of one schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BottleneckReport {
    /// Schedule makespan (hours).
    pub makespan: f64,
    /// Metrics keyed by resource type.
    pub metrics: BTreeMap<ResourceType, ResourceMetrics>,
}

impl BottleneckReport {
    /// Analyzes a schedule for every resource type of the configuration.
    pub fn analyze(
        schedule: &Schedule,
        requirements: &StageRequirements,
        capacity: &CapacityConfig,
    ) -> Self {
        let makespan = schedule.makespan();
        let metrics = capacity
            .iter()
            .map(|(rt, units)| {
                let busy: f64 = schedule
                    .entries
                    .iter()
                    .filter(|e| requirements.requires(e.category, e.stage, rt))
                    .map(|e| e.duration())
                    .sum();
                let available = f64::from(units) * makespan;
                let utilization = if available > 0.0 {
                    busy / available * 100.0
                } else {
                    0.0
                };
                let mut m = ResourceMetrics::new(rt, units, utilization, schedule.wait(rt));
                m.busy_hours = busy;
                (rt, m)
            })
            .collect();

        Self { makespan, metrics }
    }

    /// Metrics of one type.
    pub fn get(&self, resource: ResourceType) -> Option<&ResourceMetrics> {
        self.metrics.get(&resource)
    }

    /// Utilization of one type (0 if not analyzed).
    pub fn utilization(&self, resource: ResourceType) -> f64 {
        self.get(resource).map_or(0.0, |m| m.utilization_pct)
    }

    /// Score of one type (0 if not analyzed).
    pub fn score(&self, resource: ResourceType) -> f64 {
        self.get(resource).map_or(0.0, |m| m.score)
    }

    /// Metrics sorted by descending score; ties keep resource order.
    pub fn ranked_by_score(&self) -> Vec<&ResourceMetrics> {
        let mut ranked: Vec<&ResourceMetrics> = self.metrics.values().collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Highest-scoring type with a positive score.
    pub fn top_bottleneck(&self) -> Option<&ResourceMetrics> {
        self.ranked_by_score().into_iter().find(|m| m.score > 0.0)
    }

    /// Sum of attributed wait over analyzed types.
    pub fn total_wait(&self) -> f64 {
        self.metrics.values().map(|m| m.wait_hours).sum()
    }
}
