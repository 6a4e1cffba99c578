//! Raw demand records.
//!
//! One record per prospective trial, as delivered by a tabular demand source.
//! Every field except the trial code is optional; derivation degrades missing
//! or malformed values to defaults instead of failing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SampleCategory;

/// Where a record's release instant comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseSource {
    /// Planned start, in days from the time origin.
    Day(f64),
    /// Expected arrival date.
    Date(NaiveDate),
}

/// One demanded trial.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// Sample condition.
    #[serde(default)]
    pub sample: SampleCategory,
    /// Trial code (e.g. "CIUsat", "CIDsat/GD", "BE").
    pub trial_code: String,
    /// Free-text technical specification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specification: Option<String>,
    /// Release source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseSource>,
    /// Sample description, scanned for soil-type keywords.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_name: Option<String>,
    /// Campaign or proposal label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign: Option<String>,
}

impl DemandRecord {
    /// Creates a record for a trial code, intact sample, released at t=0.
    pub fn new(trial_code: impl Into<String>) -> Self {
        Self {
            trial_code: trial_code.into(),
            ..Default::default()
        }
    }

    /// Sets the sample category.
    pub fn with_sample(mut self, sample: SampleCategory) -> Self {
        self.sample = sample;
        self
    }

    /// Sets the technical specification.
    pub fn with_specification(mut self, text: impl Into<String>) -> Self {
        self.specification = Some(text.into());
        self
    }

    /// Sets a release day offset.
    pub fn with_release_day(mut self, day: f64) -> Self {
        self.release = Some(ReleaseSource::Day(day));
        self
    }

    /// Sets an arrival date.
    pub fn with_arrival(mut self, date: NaiveDate) -> Self {
        self.release = Some(ReleaseSource::Date(date));
        self
    }

    /// Sets the sample description.
    pub fn with_sample_name(mut self, name: impl Into<String>) -> Self {
        self.sample_name = Some(name.into());
        self
    }

    /// Sets the campaign label.
    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = Some(campaign.into());
        self
    }
}
