//! Heat island records and the detection result persisted per pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::round_to;

/// Severity tier of a heat island, ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Extreme,
}

impl Severity {
    /// All tiers, mildest first.
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Extreme,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Extreme => "extreme",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "extreme" => Ok(Severity::Extreme),
            other => Err(format!(
                "unknown severity '{}', expected one of extreme/high/medium/low",
                other
            )),
        }
    }
}

/// A geocoded position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// One qualifying connected hotspot region.
///
/// `lat`/`lon` are `None` when the centroid could not be geocoded; they are
/// serialized as `null` rather than a sentinel coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIsland {
    pub id: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub avg_temp: f64,
    pub max_temp: f64,
    pub intensity: f64,
    pub severity: Severity,
    pub size_pixels: usize,
}

impl HeatIsland {
    /// Build an island record, applying the persisted rounding.
    pub fn new(
        label: u32,
        avg_temp: f64,
        max_temp: f64,
        intensity: f64,
        severity: Severity,
        size_pixels: usize,
        location: Option<GeoPoint>,
    ) -> Self {
        Self {
            id: format!("hi_{}", label),
            lat: location.map(|p| round_to(p.lat, 6)),
            lon: location.map(|p| round_to(p.lon, 6)),
            avg_temp: round_to(avg_temp, 1),
            max_temp: round_to(max_temp, 1),
            intensity: round_to(intensity, 1),
            severity,
            size_pixels,
        }
    }

    /// Geocoded centroid, if one is known.
    pub fn location(&self) -> Option<GeoPoint> {
        match (self.lon, self.lat) {
            (Some(lon), Some(lat)) => Some(GeoPoint { lon, lat }),
            _ => None,
        }
    }
}

/// Count of islands per severity tier. All four tiers are always serialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityDistribution {
    #[serde(default)]
    pub extreme: usize,
    #[serde(default)]
    pub high: usize,
    #[serde(default)]
    pub medium: usize,
    #[serde(default)]
    pub low: usize,
}

impl SeverityDistribution {
    /// Tally the severity of every island.
    pub fn from_islands(islands: &[HeatIsland]) -> Self {
        let mut dist = Self::default();
        for island in islands {
            dist.record(island.severity);
        }
        dist
    }

    pub fn record(&mut self, severity: Severity) {
        *self.slot_mut(severity) += 1;
    }

    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Extreme => self.extreme,
        }
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high + self.extreme
    }

    fn slot_mut(&mut self, severity: Severity) -> &mut usize {
        match severity {
            Severity::Low => &mut self.low,
            Severity::Medium => &mut self.medium,
            Severity::High => &mut self.high,
            Severity::Extreme => &mut self.extreme,
        }
    }
}

/// Output of one detection run; the unit persisted to `heat_islands.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Qualifying islands before truncation.
    pub total_count: usize,
    pub mean_temperature: f64,
    pub threshold_used: f64,
    pub severity_distribution: SeverityDistribution,
    /// Islands ordered by descending intensity, truncated.
    pub heat_islands: Vec<HeatIsland>,
}

impl DetectionResult {
    /// The result of a run with no valid pixels.
    pub fn empty(threshold: f64) -> Self {
        Self {
            total_count: 0,
            mean_temperature: 0.0,
            threshold_used: threshold,
            severity_distribution: SeverityDistribution::default(),
            heat_islands: Vec::new(),
        }
    }

    /// Islands of a single severity tier, in stored order.
    pub fn islands_with_severity(&self, severity: Severity) -> Vec<HeatIsland> {
        self.heat_islands
            .iter()
            .filter(|island| island.severity == severity)
            .cloned()
            .collect()
    }
}

/// Summary view served by `/api/heat-islands/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIslandSummary {
    pub total_islands: usize,
    pub severity_distribution: SeverityDistribution,
    pub average_intensity: f64,
    pub mean_temperature: f64,
}

/// On-disk shape of a heat island artifact.
///
/// Older pipeline versions wrote a bare list of islands; the current one
/// writes the full [`DetectionResult`]. Both normalize to a `DetectionResult`
/// right after load.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredDetection {
    Current(DetectionResult),
    Legacy(Vec<HeatIsland>),
}

impl StoredDetection {
    pub fn into_result(self) -> DetectionResult {
        match self {
            StoredDetection::Current(result) => result,
            StoredDetection::Legacy(mut islands) => {
                islands.sort_by(|a, b| {
                    b.intensity
                        .partial_cmp(&a.intensity)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                DetectionResult {
                    total_count: islands.len(),
                    mean_temperature: 0.0,
                    threshold_used: 0.0,
                    severity_distribution: SeverityDistribution::from_islands(&islands),
                    heat_islands: islands,
                }
            }
        }
    }
}

impl From<DetectionResult> for StoredDetection {
    fn from(result: DetectionResult) -> Self {
        StoredDetection::Current(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island(label: u32, intensity: f64, severity: Severity) -> HeatIsland {
        HeatIsland::new(
            label,
            30.0,
            32.0,
            intensity,
            severity,
            12,
            Some(GeoPoint::new(-118.25, 34.05)),
        )
    }

    #[test]
    fn test_severity_parse_and_display() {
        assert_eq!("Extreme".parse::<Severity>().unwrap(), Severity::Extreme);
        assert_eq!(Severity::Medium.to_string(), "medium");
        assert!("scorching".parse::<Severity>().is_err());
        assert!(Severity::Low < Severity::Extreme);
    }

    #[test]
    fn test_island_rounding_and_id() {
        let hi = HeatIsland::new(
            7,
            30.04,
            31.96,
            9.149,
            Severity::Extreme,
            9,
            Some(GeoPoint::new(-118.123456789, 34.987654321)),
        );
        assert_eq!(hi.id, "hi_7");
        assert_eq!(hi.avg_temp, 30.0);
        assert_eq!(hi.max_temp, 32.0);
        assert_eq!(hi.intensity, 9.1);
        assert_eq!(hi.lon, Some(-118.123457));
        assert_eq!(hi.lat, Some(34.987654));
    }

    #[test]
    fn test_missing_location_serializes_as_null() {
        let hi = HeatIsland::new(1, 25.0, 26.0, 3.0, Severity::Medium, 10, None);
        let json = serde_json::to_value(&hi).unwrap();
        assert!(json["lat"].is_null());
        assert!(json["lon"].is_null());
        assert!(hi.location().is_none());
    }

    #[test]
    fn test_distribution_always_has_all_tiers() {
        let json = serde_json::to_value(SeverityDistribution::default()).unwrap();
        for tier in ["low", "medium", "high", "extreme"] {
            assert_eq!(json[tier], 0);
        }
    }

    #[test]
    fn test_distribution_tally() {
        let islands = vec![
            island(1, 7.0, Severity::Extreme),
            island(2, 5.0, Severity::High),
            island(3, 6.5, Severity::Extreme),
        ];
        let dist = SeverityDistribution::from_islands(&islands);
        assert_eq!(dist.get(Severity::Extreme), 2);
        assert_eq!(dist.get(Severity::High), 1);
        assert_eq!(dist.get(Severity::Low), 0);
        assert_eq!(dist.total(), 3);
    }

    #[test]
    fn test_stored_detection_current_format() {
        let json = r#"{
            "total_count": 1,
            "mean_temperature": 26.8,
            "threshold_used": 3.0,
            "severity_distribution": {"extreme": 1, "high": 0, "medium": 0, "low": 0},
            "heat_islands": [{
                "id": "hi_4", "lat": 34.05, "lon": -118.25, "avg_temp": 33.1,
                "max_temp": 35.0, "intensity": 6.3, "severity": "extreme", "size_pixels": 40
            }]
        }"#;
        let stored: StoredDetection = serde_json::from_str(json).unwrap();
        let result = stored.into_result();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.mean_temperature, 26.8);
        assert_eq!(result.heat_islands[0].id, "hi_4");
    }

    #[test]
    fn test_stored_detection_legacy_list_normalizes() {
        let json = r#"[
            {"id": "hi_1", "lat": 0.5, "lon": 0.5, "avg_temp": 28.0, "max_temp": 29.0,
             "intensity": 2.5, "severity": "medium", "size_pixels": 11},
            {"id": "hi_2", "lat": null, "lon": null, "avg_temp": 31.0, "max_temp": 33.0,
             "intensity": 5.5, "severity": "high", "size_pixels": 20}
        ]"#;
        let stored: StoredDetection = serde_json::from_str(json).unwrap();
        let result = stored.into_result();
        assert_eq!(result.total_count, 2);
        assert_eq!(result.severity_distribution.medium, 1);
        assert_eq!(result.severity_distribution.high, 1);
        assert_eq!(result.heat_islands[0].id, "hi_2");
        assert!(result.heat_islands[0].location().is_none());
    }

    #[test]
    fn test_filter_by_severity() {
        let result = DetectionResult {
            total_count: 3,
            mean_temperature: 25.0,
            threshold_used: 3.0,
            severity_distribution: SeverityDistribution::default(),
            heat_islands: vec![
                island(1, 7.0, Severity::Extreme),
                island(2, 5.0, Severity::High),
                island(3, 6.5, Severity::Extreme),
            ],
        };
        let extreme = result.islands_with_severity(Severity::Extreme);
        assert_eq!(extreme.len(), 2);
        assert!(result.islands_with_severity(Severity::Low).is_empty());
    }
}
