//! Severity binning of heat island intensity.

use heat_common::Severity;

/// Lower bound (inclusive) of the medium tier, °C above the scene mean.
pub const MEDIUM_MIN: f64 = 2.0;
/// Lower bound (inclusive) of the high tier.
pub const HIGH_MIN: f64 = 4.0;
/// Lower bound (inclusive) of the extreme tier.
pub const EXTREME_MIN: f64 = 6.0;

/// Map an unrounded intensity to its tier.
pub fn classify_severity(intensity: f64) -> Severity {
    if intensity >= EXTREME_MIN {
        Severity::Extreme
    } else if intensity >= HIGH_MIN {
        Severity::High
    } else if intensity >= MEDIUM_MIN {
        Severity::Medium
    } else {
        Severity::Low
    }
}
