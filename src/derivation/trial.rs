//! Trial-code rules.
//!
//! Everything here reads a trial code or a free-text field once and returns a
//! number or a tag. Durations are in hours, lengths in millimetres and
//! velocities in millimetres per minute.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{JobCategory, SampleCategory};

/// Soil-type keyword (sandy samples) searched in sample names.
pub const SAND_KEYWORD: &str = "aren";

/// Deformation used when the specification does not state one (%).
pub const DEFAULT_DEFORMATION_PCT: f64 = 20.0;

/// Specimen height of large-format trials (mm).
pub const LARGE_SPECIMEN_HEIGHT_MM: f64 = 202.0;

/// Specimen height of standard trials (mm).
pub const STANDARD_SPECIMEN_HEIGHT_MM: f64 = 102.0;

/// Press velocity for drained trials (mm/min).
pub const DRAINED_VELOCITY_MM_MIN: f64 = 0.045;

/// Press velocity for undrained trials (mm/min).
pub const UNDRAINED_VELOCITY_MM_MIN: f64 = 0.09;

const LARGE_FORMAT_MARKER: &str = "GD";
const SATURATION_MARKER: &str = "sat";
const SATURATED_CODES: [&str; 3] = ["QCSD", "BE", "BEP"];
const UNCONSOLIDATED_CODES: [&str; 2] = ["UU", "UUsat"];

const DRAINED_CODES: [&str; 7] = [
    "CID", "CIDsat", "CADsat", "CCIDsat", "QCSD", "CIDsat/GD", "CCADsat",
];

const UNDRAINED_CODES: [&str; 11] = [
    "CIUsat", "CIU", "UU", "UUsat", "CAU", "CAUsat", "EIUsat", "CIUsat/GD", "PN", "CK0",
    "CCAUsat",
];

static DEFORMATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Deformação[:\s]*([0-9]+)%").expect("valid deformation regex")
});

/// Classifies a trial code. First match wins: cyclic prefix, isotropic
/// marker in second position, bender prefix, anisotropic otherwise.
pub fn classify(code: &str) -> JobCategory {
    if code.starts_with("CC") {
        JobCategory::Cyclic
    } else if code.chars().nth(1) == Some('I') {
        JobCategory::Isotropic
    } else if code.starts_with("BE") {
        JobCategory::Bender
    } else {
        JobCategory::Anisotropic
    }
}

/// Whether the sample name mentions sandy soil.
pub fn is_sandy(sample_name: Option<&str>) -> bool {
    sample_name.is_some_and(|name| name.to_lowercase().contains(SAND_KEYWORD))
}

/// Whether the trial goes through the saturation stages.
pub fn is_saturated(code: &str) -> bool {
    code.to_lowercase().contains(SATURATION_MARKER) || SATURATED_CODES.contains(&code)
}

/// Whether the trial skips consolidation.
pub fn skips_consolidation(code: &str) -> bool {
    UNCONSOLIDATED_CODES.contains(&code)
}

/// Deformation percentage stated in the specification, or the default.
pub fn deformation_pct(specification: Option<&str>) -> f64 {
    specification
        .and_then(|text| DEFORMATION_PATTERN.captures(text))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(DEFAULT_DEFORMATION_PCT)
}

/// Specimen height for a trial code (mm).
pub fn specimen_height_mm(code: &str) -> f64 {
    if code.contains(LARGE_FORMAT_MARKER) {
        LARGE_SPECIMEN_HEIGHT_MM
    } else {
        STANDARD_SPECIMEN_HEIGHT_MM
    }
}

/// Press loading velocity (mm/min); 0 when the trial is not press-broken.
///
/// Codes are matched by substring, drained list first.
pub fn loading_velocity(code: &str) -> f64 {
    if DRAINED_CODES.iter().any(|c| code.contains(c)) {
        DRAINED_VELOCITY_MM_MIN
    } else if UNDRAINED_CODES.iter().any(|c| code.contains(c)) {
        UNDRAINED_VELOCITY_MM_MIN
    } else {
        0.0
    }
}

/// Time to shear the specimen to the target deformation (hours).
///
/// Zero whenever the velocity is not positive or any input is not finite.
pub fn break_hours(height_mm: f64, deformation_pct: f64, velocity_mm_min: f64) -> f64 {
    if velocity_mm_min.is_nan()
        || velocity_mm_min <= 0.0
        || !height_mm.is_finite()
        || !deformation_pct.is_finite()
    {
        return 0.0;
    }
    let minutes = height_mm * (deformation_pct / 100.0) / velocity_mm_min;
    minutes / 60.0
}

/// Hands-on preparation time (hours).
pub fn active_prep_hours(sample: SampleCategory) -> f64 {
    match sample {
        SampleCategory::Remolded => 1.0,
        SampleCategory::Intact => 0.5,
    }
}

/// Rest time after preparation (hours).
pub fn prep_rest_hours(sample: SampleCategory) -> f64 {
    match sample {
        SampleCategory::Remolded => 24.0,
        SampleCategory::Intact => 0.0,
    }
}

/// Specimen forming time (hours).
pub fn forming_hours(sample: SampleCategory) -> f64 {
    match sample {
        SampleCategory::Remolded => 30.0 / 60.0,
        SampleCategory::Intact => 10.0 / 60.0,
    }
}

/// Water saturation time (hours): shorter for sandy samples.
pub fn water_saturation_hours(sandy: bool) -> f64 {
    if sandy {
        12.0
    } else {
        24.0
    }
}

/// Consolidation time (hours): shorter for sandy samples.
pub fn consolidation_hours(sandy: bool) -> f64 {
    if sandy {
        40.0 / 60.0
    } else {
        2.0
    }
}
