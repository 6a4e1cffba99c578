//! Weighted demand mix and synthetic demand generation.

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::models::{DemandRecord, SampleCategory};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Sample descriptions drawn for generated records.
pub const SAMPLE_NAMES: [&str; 3] = ["Argila arenosa", "Silte argiloso", "Areia siltosa"];

/// Specification text of generated records.
pub const GENERATED_SPECIFICATION: &str = "Deformação: 20%";

/// Campaign label of generated records.
pub const GENERATED_CAMPAIGN: &str = "Simulated";

/// Historical share of each (trial code, sample) pair, in percent.
const HISTORICAL_MIX: [(&str, SampleCategory, f64); 18] = [
    ("CIUsat", SampleCategory::Intact, 34.8),
    ("CIUsat", SampleCategory::Remolded, 22.7),
    ("CIDsat", SampleCategory::Intact, 22.5),
    ("CIDsat", SampleCategory::Remolded, 9.2),
    ("CADsat", SampleCategory::Remolded, 1.5),
    ("CAUsat", SampleCategory::Remolded, 1.4),
    ("CAUsat", SampleCategory::Intact, 1.4),
    ("CADsat", SampleCategory::Intact, 1.1),
    ("CIU", SampleCategory::Intact, 1.0),
    ("BE", SampleCategory::Intact, 0.8),
    ("CID", SampleCategory::Intact, 0.6),
    ("CIDsat/GD", SampleCategory::Remolded, 0.4),
    ("CIUsat/GD", SampleCategory::Remolded, 0.4),
    ("BEP", SampleCategory::Remolded, 0.3),
    ("UUsat", SampleCategory::Remolded, 0.3),
    ("BE", SampleCategory::Remolded, 0.2),
    ("PN", SampleCategory::Intact, 0.2),
    ("UUsat", SampleCategory::Intact, 0.2),
];

/// One weighted mix line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    /// Trial code.
    pub trial_code: String,
    /// Sample condition.
    #[serde(default)]
    pub sample: SampleCategory,
    /// Relative weight; need not sum to anything in particular.
    pub weight: f64,
}

impl MixEntry {
    /// Creates a mix line.
    pub fn new(trial_code: impl Into<String>, sample: SampleCategory, weight: f64) -> Self {
        Self {
            trial_code: trial_code.into(),
            sample,
            weight,
        }
    }
}

/// A weighted distribution over trial kinds.
///
/// # Example
/// ```
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use u_dimension::scenario::DemandMix;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let records = DemandMix::historical().generate(50, 22, &mut rng);
/// assert_eq!(records.len(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct DemandMix {
    entries: Vec<MixEntry>,
    index: WeightedIndex<f64>,
}

impl Default for DemandMix {
    fn default() -> Self {
        Self::historical()
    }
}

impl DemandMix {
    /// Builds a mix; rejects empty, negative, non-finite or all-zero weights.
    pub fn new(entries: Vec<MixEntry>) -> Result<Self, ValidationError> {
        let index = WeightedIndex::new(entries.iter().map(|e| e.weight)).map_err(|err| {
            ValidationError::new(ValidationErrorKind::InvalidMix, err.to_string())
        })?;
        Ok(Self { entries, index })
    }

    /// The historical laboratory mix.
    pub fn historical() -> Self {
        let entries = HISTORICAL_MIX
            .iter()
            .map(|&(code, sample, weight)| MixEntry::new(code, sample, weight))
            .collect();
        Self::new(entries).expect("historical weights are positive")
    }

    /// Mix lines.
    pub fn entries(&self) -> &[MixEntry] {
        &self.entries
    }

    /// Draws `n` records released uniformly over `[0, horizon_days)` whole days.
    ///
    /// A zero horizon releases everything on day 0.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        n: usize,
        horizon_days: u32,
        rng: &mut R,
    ) -> Vec<DemandRecord> {
        (0..n)
            .map(|_| {
                let entry = &self.entries[self.index.sample(rng)];
                let day = rng.random_range(0..horizon_days.max(1));
                let name = SAMPLE_NAMES.choose(rng).copied().unwrap_or(SAMPLE_NAMES[0]);
                DemandRecord::new(&entry.trial_code)
                    .with_sample(entry.sample)
                    .with_specification(GENERATED_SPECIFICATION)
                    .with_release_day(f64::from(day))
                    .with_sample_name(name)
                    .with_campaign(GENERATED_CAMPAIGN)
            })
            .collect()
    }
}
