//! Configuration for the heat island detector.

use serde::{Deserialize, Serialize};

/// Detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Degrees °C above the scene mean a pixel must exceed to be a hotspot.
    pub threshold: f64,

    /// Smallest region, in pixels, that is reported.
    pub min_size: usize,

    /// Upper bound on islands returned; `total_count` is not truncated.
    pub max_results: usize,

    /// NoData sentinel of the temperature grid.
    pub nodata: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            threshold: 3.0,
            min_size: 10,
            max_results: 50,
            nodata: -9999.0,
        }
    }
}

impl DetectionConfig {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("HEAT_THRESHOLD") {
            if let Ok(threshold) = val.parse() {
                config.threshold = threshold;
            }
        }

        if let Ok(val) = std::env::var("HEAT_MIN_SIZE") {
            if let Ok(size) = val.parse() {
                config.min_size = size;
            }
        }

        if let Ok(val) = std::env::var("HEAT_MAX_RESULTS") {
            if let Ok(max) = val.parse() {
                config.max_results = max;
            }
        }

        if let Ok(val) = std::env::var("HEAT_NODATA") {
            if let Ok(nodata) = val.parse() {
                config.nodata = nodata;
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.threshold.is_finite() {
            return Err("threshold must be a finite number".to_string());
        }

        if self.min_size == 0 {
            return Err("min_size must be > 0".to_string());
        }

        if self.max_results == 0 {
            return Err("max_results must be > 0".to_string());
        }

        if self.nodata.is_nan() {
            return Err("nodata must not be NaN".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.threshold, 3.0);
        assert_eq!(config.min_size, 10);
        assert_eq!(config.max_results, 50);
        assert_eq!(config.nodata, -9999.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = DetectionConfig {
            min_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetectionConfig {
            max_results: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_document_keeps_defaults() {
        let config: DetectionConfig = serde_json::from_str(r#"{"threshold": 2.5}"#).unwrap();
        assert_eq!(config.threshold, 2.5);
        assert_eq!(config.min_size, 10);
    }
}
