//! Laboratory scheduling domain models.
//!
//! Provides the core data types for representing a laboratory test campaign
//! and its schedule. Stages, resource types and job categories are closed
//! enumerations; downstream code switches on them and never re-parses trial
//! codes.
//!
//! # Domain Mappings
//!
//! | u-dimension | Job-shop term | Laboratory |
//! |-------------|---------------|------------|
//! | Job | Job | Triaxial trial on one specimen |
//! | Stage | Operation | Preparation, saturation, break, ... |
//! | ResourceType | Machine group | Bench, press, panel, cell |
//! | CapacityConfig | Shop layout | Units of equipment owned |
//! | Schedule | Production plan | Trial timetable |

mod capacity;
mod job;
mod record;
mod resource;
mod schedule;
mod stage;

pub use capacity::{CapacityConfig, DEFAULT_UNITS};
pub use job::{Job, JobCategory, SampleCategory, TrialParameters};
pub use record::{DemandRecord, ReleaseSource};
pub use resource::{ResourceType, StageRequirements};
pub use schedule::{Schedule, ScheduleEntry, UnitClaim};
pub use stage::{coerce_hours, Stage, StageDurations};
