//! Band statistics written next to each derived raster.

use serde::{Deserialize, Serialize};

/// Summary of a continuous band (`*_stats.json` for temperature).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    pub median: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl BandStatistics {
    /// Statistics over `values`; `None` when empty.
    pub fn compute(values: impl IntoIterator<Item = f32>) -> Option<Self> {
        let mut sorted: Vec<f64> = values.into_iter().map(f64::from).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.total_cmp(b));

        let n = sorted.len() as f64;
        let mean = sorted.iter().sum::<f64>() / n;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(Self {
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean,
            std: variance.sqrt(),
            median,
            note: None,
        })
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Summary of an NDVI band (`ndvi_stats.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NdviStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Percentage of pixels with NDVI above 0.3.
    pub vegetation_coverage: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_empty_is_none() {
        assert!(BandStatistics::compute(Vec::new()).is_none());
    }

    #[test]
    fn test_odd_count() {
        let stats = BandStatistics::compute(vec![30.0, 20.0, 25.0]).unwrap();
        assert_eq!(stats.min, 20.0);
        assert_eq!(stats.max, 30.0);
        assert_eq!(stats.mean, 25.0);
        assert_eq!(stats.median, 25.0);
        assert_relative_eq!(stats.std, (50.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_even_count_median() {
        let stats = BandStatistics::compute(vec![1.0, 4.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn test_note_serialization() {
        let stats = BandStatistics::compute(vec![1.0]).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("note").is_none());

        let json = serde_json::to_value(stats.with_note("Estimated")).unwrap();
        assert_eq!(json["note"], "Estimated");
    }
}
