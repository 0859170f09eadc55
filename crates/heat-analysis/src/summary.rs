//! Read-side projections of a persisted [`DetectionResult`].

use heat_common::{
    round_to, DetectionResult, HeatIsland, HeatIslandSummary, Severity, SeverityDistribution,
};

/// Count islands per tier; every tier is present, zero-filled.
pub fn tally_severity(islands: &[HeatIsland]) -> SeverityDistribution {
    SeverityDistribution::from_islands(islands)
}

/// Mean intensity of `islands` to 2 decimals, `0.0` when empty.
pub fn average_intensity(islands: &[HeatIsland]) -> f64 {
    if islands.is_empty() {
        return 0.0;
    }
    let sum: f64 = islands.iter().map(|i| i.intensity).sum();
    round_to(sum / islands.len() as f64, 2)
}

/// Summary view of a result.
///
/// Counts come from the persisted (pre-truncation) fields; the average
/// intensity covers the returned islands only.
pub fn summarize(result: &DetectionResult) -> HeatIslandSummary {
    HeatIslandSummary {
        total_islands: result.total_count,
        severity_distribution: result.severity_distribution,
        average_intensity: average_intensity(&result.heat_islands),
        mean_temperature: result.mean_temperature,
    }
}

/// Islands of one tier, in stored (intensity) order.
pub fn filter_by_severity(result: &DetectionResult, severity: Severity) -> Vec<HeatIsland> {
    result.islands_with_severity(severity)
}
