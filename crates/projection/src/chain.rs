//! Pixel → native → geographic transform chain for one raster.

use heat_common::{CrsCode, GeoPoint};

use crate::affine::AffineTransform;
use crate::error::Result;
use crate::reproject::Reprojector;

/// Composes a raster's affine transform with a reprojection to WGS84.
///
/// Pixel coordinates are continuous: a centroid at `(col=1.5, row=1.5)` is
/// transformed as-is and never snapped to a pixel index first.
#[derive(Debug)]
pub struct TransformChain {
    affine: AffineTransform,
    reprojector: Reprojector,
}

impl TransformChain {
    /// Build the chain; fails when the CRS cannot be reprojected.
    pub fn new(affine: AffineTransform, crs: &CrsCode) -> Result<Self> {
        Ok(Self {
            affine,
            reprojector: Reprojector::new(crs)?,
        })
    }

    pub fn affine(&self) -> &AffineTransform {
        &self.affine
    }

    pub fn crs(&self) -> &CrsCode {
        self.reprojector.source()
    }

    pub fn pixel_to_native(&self, col: f64, row: f64) -> (f64, f64) {
        self.affine.apply(col, row)
    }

    pub fn native_to_pixel(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        Ok(self.affine.inverse()?.apply(x, y))
    }

    pub fn native_to_geographic(&self, x: f64, y: f64) -> Result<GeoPoint> {
        let (lon, lat) = self.reprojector.to_geographic(x, y)?;
        Ok(GeoPoint::new(lon, lat))
    }

    /// Full chain: continuous pixel position to lon/lat degrees.
    pub fn pixel_to_geographic(&self, col: f64, row: f64) -> Result<GeoPoint> {
        let (x, y) = self.pixel_to_native(col, row);
        self.native_to_geographic(x, y)
    }

    /// Inverse chain: lon/lat degrees to continuous pixel position `(col, row)`.
    pub fn geographic_to_pixel(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let (x, y) = self.reprojector.from_geographic(lon, lat)?;
        self.native_to_pixel(x, y)
    }
}
