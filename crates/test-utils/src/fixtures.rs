//! Common test fixtures: scene georeferences, rasters and processed-data
//! directories.

use heat_common::{
    ArtifactLayout, CrsCode, DetectionResult, GeoPoint, HeatIsland, Severity,
    SeverityDistribution,
};
use projection::AffineTransform;
use raster_io::{write_geotiff_atomic, write_json_atomic, Raster};
use tempfile::TempDir;

use crate::generators::{grid_with_blocks, Block, NODATA};

/// Georeference constants for a small downtown Los Angeles scene.
pub mod scene {
    /// Upper-left corner of the geographic test scene.
    pub const WEST: f64 = -118.5;
    pub const NORTH: f64 = 34.2;
    /// Pixel size of the geographic test scene in degrees.
    pub const PIXEL_DEG: f64 = 0.01;

    /// Upper-left corner of the UTM 11N test scene (20 m Sentinel-2 grid).
    pub const UTM_WEST: f64 = 384600.0;
    pub const UTM_NORTH: f64 = 3768420.0;
    pub const PIXEL_M: f64 = 20.0;
    pub const UTM_EPSG: u32 = 32611;

    /// Side of the square fixture rasters.
    pub const SIZE: usize = 20;
}

/// North-up WGS84 transform of the geographic test scene.
pub fn geographic_transform() -> AffineTransform {
    AffineTransform::from_origin(scene::WEST, scene::NORTH, scene::PIXEL_DEG, scene::PIXEL_DEG)
}

/// North-up UTM 11N transform of the projected test scene.
pub fn utm_transform() -> AffineTransform {
    AffineTransform::from_origin(scene::UTM_WEST, scene::UTM_NORTH, scene::PIXEL_M, scene::PIXEL_M)
}

/// Geographic-center coordinate of pixel `(col, row)` in the geographic scene.
pub fn pixel_center_lon_lat(col: usize, row: usize) -> (f64, f64) {
    (
        scene::WEST + (col as f64 + 0.5) * scene::PIXEL_DEG,
        scene::NORTH - (row as f64 + 0.5) * scene::PIXEL_DEG,
    )
}

/// Georeferenced WGS84 raster with the -9999 NoData sentinel.
pub fn geographic_raster(width: usize, height: usize, data: Vec<f32>) -> Raster {
    Raster::new(width, height, data, geographic_transform())
        .expect("fixture data must match its shape")
        .with_crs(CrsCode::wgs84())
        .with_nodata(NODATA as f64)
}

/// Georeferenced UTM 11N raster with the -9999 NoData sentinel.
pub fn utm_raster(width: usize, height: usize, data: Vec<f32>) -> Raster {
    Raster::new(width, height, data, utm_transform())
        .expect("fixture data must match its shape")
        .with_crs(CrsCode::Epsg(scene::UTM_EPSG))
        .with_nodata(NODATA as f64)
}

/// 20×20 temperature scene: 25 °C background, a 4×4 block at 38 °C, a 3×4
/// block at 31 °C and a NoData corner pixel.
pub fn temperature_scene() -> Raster {
    let mut data = grid_with_blocks(
        scene::SIZE,
        scene::SIZE,
        25.0,
        &[Block::square(2, 2, 4, 38.0), Block::new(12, 10, 3, 4, 31.0)],
    );
    data[scene::SIZE * scene::SIZE - 1] = NODATA;
    geographic_raster(scene::SIZE, scene::SIZE, data)
}

/// 20×20 NDVI scene: 0.6 background with a bare 6×6 patch at 0.1 covering the
/// hot block of [`temperature_scene`], and one NoData pixel.
pub fn ndvi_scene() -> Raster {
    let mut data = grid_with_blocks(
        scene::SIZE,
        scene::SIZE,
        0.6,
        &[Block::square(1, 1, 6, 0.1)],
    );
    data[scene::SIZE * scene::SIZE - 1] = NODATA;
    geographic_raster(scene::SIZE, scene::SIZE, data)
}

/// A persisted detection result with two islands, one of them ungeocoded.
pub fn sample_detection() -> DetectionResult {
    let islands = vec![
        HeatIsland::new(1, 38.0, 38.0, 12.5, Severity::Extreme, 16, Some(GeoPoint::new(-118.46, 34.16))),
        HeatIsland::new(2, 31.0, 31.0, 5.5, Severity::High, 12, None),
    ];
    DetectionResult {
        total_count: islands.len(),
        mean_temperature: 25.5,
        threshold_used: 3.0,
        severity_distribution: SeverityDistribution::from_islands(&islands),
        heat_islands: islands,
    }
}

/// A temporary processed-data directory.
pub struct ProcessedDir {
    dir: TempDir,
    layout: ArtifactLayout,
}

impl ProcessedDir {
    /// An empty directory: every artifact is missing.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temporary test directory");
        let layout = ArtifactLayout::new(dir.path());
        Self { dir, layout }
    }

    /// A directory holding every artifact the query layer reads.
    pub fn complete() -> Self {
        Self::empty()
            .with_temperature(&temperature_scene())
            .with_ndvi(&ndvi_scene())
            .with_detection(&sample_detection())
            .with_json(
                ArtifactLayout::temperature_stats,
                &serde_json::json!({
                    "min": 25.0, "max": 38.0, "mean": 26.9, "std": 3.8, "median": 25.0,
                    "note": "Estimated from SWIR Band 11 (Sentinel-2)"
                }),
            )
            .with_json(
                ArtifactLayout::ndvi_stats,
                &serde_json::json!({
                    "min": 0.1, "max": 0.6, "mean": 0.55, "vegetation_coverage": 90.98
                }),
            )
            .with_json(
                ArtifactLayout::vegetation_analysis,
                &serde_json::json!({
                    "total_pixels": 399,
                    "vegetation_classes": {
                        "bare_soil_urban": {"count": 36, "percentage": 9.02},
                        "sparse_vegetation": {"count": 0, "percentage": 0.0},
                        "moderate_vegetation": {"count": 363, "percentage": 90.98},
                        "dense_vegetation": {"count": 0, "percentage": 0.0}
                    },
                    "mean_ndvi": 0.555,
                    "vegetation_health": "Good"
                }),
            )
    }

    pub fn with_temperature(self, raster: &Raster) -> Self {
        write_geotiff_atomic(self.layout.temperature_raster(), raster)
            .expect("Failed to write temperature fixture");
        self
    }

    pub fn with_ndvi(self, raster: &Raster) -> Self {
        write_geotiff_atomic(self.layout.ndvi_raster(), raster).expect("Failed to write NDVI fixture");
        self
    }

    pub fn with_detection(self, result: &DetectionResult) -> Self {
        write_json_atomic(self.layout.heat_islands(), result)
            .expect("Failed to write heat island fixture");
        self
    }

    /// Write any JSON value to the artifact path chosen by `path`.
    pub fn with_json(
        self,
        path: fn(&ArtifactLayout) -> std::path::PathBuf,
        value: &serde_json::Value,
    ) -> Self {
        write_json_atomic(path(&self.layout), value).expect("Failed to write JSON fixture");
        self
    }

    /// Write raw bytes to a file name inside the directory.
    pub fn with_raw(self, name: &str, contents: &[u8]) -> Self {
        std::fs::write(self.dir.path().join(name), contents).expect("Failed to write raw fixture");
        self
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_dir_has_every_artifact() {
        let dir = ProcessedDir::complete();
        assert!(dir.layout().status().iter().all(|(_, exists)| *exists));
        assert!(dir.layout().temperature_stats().exists());
        assert!(dir.layout().ndvi_stats().exists());
    }

    #[test]
    fn test_empty_dir_has_nothing() {
        let dir = ProcessedDir::empty();
        assert!(dir.layout().status().iter().all(|(_, exists)| !exists));
    }

    #[test]
    fn test_pixel_center() {
        let (lon, lat) = pixel_center_lon_lat(0, 0);
        assert!((lon - (-118.495)).abs() < 1e-9);
        assert!((lat - 34.195).abs() < 1e-9);
    }

    #[test]
    fn test_scene_shapes() {
        assert_eq!(temperature_scene().shape(), (20, 20));
        assert_eq!(ndvi_scene().valid_count(), 399);
    }
}
