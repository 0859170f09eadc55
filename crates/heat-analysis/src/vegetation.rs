//! Vegetation class breakdown of an NDVI raster.

use heat_common::round_to;
use raster_io::Raster;
use serde::{Deserialize, Serialize};
use tracing::info;

const SPARSE_MIN: f64 = 0.2;
const MODERATE_MIN: f64 = 0.5;
const DENSE_MIN: f64 = 0.7;

const HEALTH_GOOD_MIN: f64 = 0.4;
const HEALTH_MODERATE_MIN: f64 = 0.25;

/// NDVI vegetation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VegetationLevel {
    BareSoilUrban,
    SparseVegetation,
    ModerateVegetation,
    DenseVegetation,
}

impl VegetationLevel {
    pub fn from_ndvi(ndvi: f64) -> Self {
        if ndvi < SPARSE_MIN {
            VegetationLevel::BareSoilUrban
        } else if ndvi < MODERATE_MIN {
            VegetationLevel::SparseVegetation
        } else if ndvi < DENSE_MIN {
            VegetationLevel::ModerateVegetation
        } else {
            VegetationLevel::DenseVegetation
        }
    }

    /// Health label reported for a single point in this class.
    pub fn point_health(&self) -> PointHealth {
        match self {
            VegetationLevel::BareSoilUrban => PointHealth::None,
            VegetationLevel::SparseVegetation => PointHealth::Fair,
            VegetationLevel::ModerateVegetation => PointHealth::Good,
            VegetationLevel::DenseVegetation => PointHealth::Excellent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointHealth {
    None,
    Fair,
    Good,
    Excellent,
}

/// Scene-wide health label derived from the mean NDVI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VegetationHealth {
    Good,
    Moderate,
    Poor,
    Unknown,
}

impl VegetationHealth {
    pub fn from_mean(mean_ndvi: f64) -> Self {
        if mean_ndvi > HEALTH_GOOD_MIN {
            VegetationHealth::Good
        } else if mean_ndvi > HEALTH_MODERATE_MIN {
            VegetationHealth::Moderate
        } else {
            VegetationHealth::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassShare {
    pub count: usize,
    /// Percentage of valid pixels, 2 decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VegetationClasses {
    pub bare_soil_urban: ClassShare,
    pub sparse_vegetation: ClassShare,
    pub moderate_vegetation: ClassShare,
    pub dense_vegetation: ClassShare,
}

impl VegetationClasses {
    pub fn get(&self, level: VegetationLevel) -> ClassShare {
        match level {
            VegetationLevel::BareSoilUrban => self.bare_soil_urban,
            VegetationLevel::SparseVegetation => self.sparse_vegetation,
            VegetationLevel::ModerateVegetation => self.moderate_vegetation,
            VegetationLevel::DenseVegetation => self.dense_vegetation,
        }
    }

    fn get_mut(&mut self, level: VegetationLevel) -> &mut ClassShare {
        match level {
            VegetationLevel::BareSoilUrban => &mut self.bare_soil_urban,
            VegetationLevel::SparseVegetation => &mut self.sparse_vegetation,
            VegetationLevel::ModerateVegetation => &mut self.moderate_vegetation,
            VegetationLevel::DenseVegetation => &mut self.dense_vegetation,
        }
    }
}

/// Contents of `vegetation_analysis.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationAnalysis {
    pub total_pixels: usize,
    pub vegetation_classes: VegetationClasses,
    pub mean_ndvi: f64,
    pub vegetation_health: VegetationHealth,
}

impl VegetationAnalysis {
    /// Result for a raster with no valid NDVI.
    pub fn unknown() -> Self {
        Self {
            total_pixels: 0,
            vegetation_classes: VegetationClasses::default(),
            mean_ndvi: 0.0,
            vegetation_health: VegetationHealth::Unknown,
        }
    }
}

/// Bin every valid NDVI sample within [-1, 1] into the four classes.
pub fn analyze_vegetation(ndvi: &Raster) -> VegetationAnalysis {
    let mut classes = VegetationClasses::default();
    let mut total = 0usize;
    let mut sum = 0.0f64;

    for v in ndvi.valid_values().map(f64::from) {
        if !(-1.0..=1.0).contains(&v) {
            continue;
        }
        total += 1;
        sum += v;
        classes.get_mut(VegetationLevel::from_ndvi(v)).count += 1;
    }

    if total == 0 {
        info!("No valid NDVI pixels, vegetation health unknown");
        return VegetationAnalysis::unknown();
    }

    for share in [
        &mut classes.bare_soil_urban,
        &mut classes.sparse_vegetation,
        &mut classes.moderate_vegetation,
        &mut classes.dense_vegetation,
    ] {
        share.percentage = round_to(share.count as f64 / total as f64 * 100.0, 2);
    }

    let mean = sum / total as f64;
    let analysis = VegetationAnalysis {
        total_pixels: total,
        vegetation_classes: classes,
        mean_ndvi: round_to(mean, 3),
        vegetation_health: VegetationHealth::from_mean(mean),
    };
    info!(
        total_pixels = total,
        mean_ndvi = analysis.mean_ndvi,
        health = ?analysis.vegetation_health,
        "Vegetation analysis complete"
    );
    analysis
}

#[cfg(test)]
mod tests {
    use super::*;
    use projection::AffineTransform;

    #[test]
    fn test_level_cut_points() {
        assert_eq!(VegetationLevel::from_ndvi(-0.5), VegetationLevel::BareSoilUrban);
        assert_eq!(VegetationLevel::from_ndvi(0.2), VegetationLevel::SparseVegetation);
        assert_eq!(VegetationLevel::from_ndvi(0.5), VegetationLevel::ModerateVegetation);
        assert_eq!(VegetationLevel::from_ndvi(0.7), VegetationLevel::DenseVegetation);
        assert_eq!(VegetationLevel::DenseVegetation.point_health(), PointHealth::Excellent);
        assert_eq!(VegetationLevel::BareSoilUrban.point_health(), PointHealth::None);
    }

    #[test]
    fn test_health_from_mean() {
        assert_eq!(VegetationHealth::from_mean(0.41), VegetationHealth::Good);
        assert_eq!(VegetationHealth::from_mean(0.4), VegetationHealth::Moderate);
        assert_eq!(VegetationHealth::from_mean(0.25), VegetationHealth::Poor);
    }

    #[test]
    fn test_analysis_counts_and_percentages() {
        let data = vec![0.1, 0.3, 0.6, 0.8, -9999.0, 1.5];
        let raster = Raster::new(6, 1, data, AffineTransform::identity())
            .unwrap()
            .with_nodata(-9999.0);
        let analysis = analyze_vegetation(&raster);
        assert_eq!(analysis.total_pixels, 4);
        for level in [
            VegetationLevel::BareSoilUrban,
            VegetationLevel::SparseVegetation,
            VegetationLevel::ModerateVegetation,
            VegetationLevel::DenseVegetation,
        ] {
            let share = analysis.vegetation_classes.get(level);
            assert_eq!(share.count, 1);
            assert_eq!(share.percentage, 25.0);
        }
        assert_eq!(analysis.mean_ndvi, 0.45);
        assert_eq!(analysis.vegetation_health, VegetationHealth::Good);
    }

    #[test]
    fn test_empty_is_unknown() {
        let raster = Raster::filled(3, 3, f32::NAN, AffineTransform::identity());
        assert_eq!(analyze_vegetation(&raster), VegetationAnalysis::unknown());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(VegetationAnalysis::unknown()).unwrap();
        assert_eq!(json["vegetation_health"], "Unknown");
        assert_eq!(json["vegetation_classes"]["dense_vegetation"]["count"], 0);
        assert_eq!(
            serde_json::to_value(VegetationLevel::BareSoilUrban).unwrap(),
            "bare_soil_urban"
        );
    }
}
