//! Dispatch scheduling and bottleneck analysis.
//!
//! # Algorithm
//!
//! `DispatchScheduler` is a greedy, event-driven, earliest-ready heuristic
//! over pools of interchangeable units. It is not optimal, but it is
//! deterministic and fast enough to run inside a search loop.
//!
//! # Analysis
//!
//! `BottleneckReport` computes per-resource utilization, attributed wait and
//! a composite bottleneck score.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Baker & Trietsch (2019), "Principles of Sequencing and Scheduling"

mod bottleneck;
mod dispatch;
mod pool;

pub use bottleneck::{bottleneck_score, BottleneckReport, ResourceMetrics};
pub use dispatch::DispatchScheduler;
pub use pool::{ResourcePool, ResourcePools, TIME_EPSILON_HOURS};
