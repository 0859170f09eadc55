//! Native-frame to geographic reprojection.
//!
//! Geographic sources pass through unchanged. Everything else goes through
//! proj4rs, which works in radians for angular coordinates.

use heat_common::CrsCode;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use tracing::debug;

use crate::error::{ProjectionError, Result};

const WGS84_LONLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

/// PROJ definition for a CRS identifier.
///
/// Covers the frames satellite scenes are delivered in: WGS84/NAD83
/// geographic, Web Mercator, and UTM zones on WGS84 or NAD83.
pub fn proj_definition(crs: &CrsCode) -> Result<String> {
    if let CrsCode::Proj(def) = crs {
        return Ok(def.clone());
    }

    let code = crs
        .epsg()
        .ok_or_else(|| ProjectionError::UnsupportedCrs(crs.to_string()))?;

    let def = match code {
        4326 => WGS84_LONLAT.to_string(),
        4269 => "+proj=longlat +ellps=GRS80 +towgs84=0,0,0 +no_defs".to_string(),
        3857 => "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +no_defs"
            .to_string(),
        32601..=32660 => format!(
            "+proj=utm +zone={} +datum=WGS84 +units=m +no_defs",
            code - 32600
        ),
        32701..=32760 => format!(
            "+proj=utm +zone={} +south +datum=WGS84 +units=m +no_defs",
            code - 32700
        ),
        26901..=26923 => format!(
            "+proj=utm +zone={} +ellps=GRS80 +towgs84=0,0,0 +units=m +no_defs",
            code - 26900
        ),
        _ => return Err(ProjectionError::UnsupportedCrs(crs.to_string())),
    };

    Ok(def)
}

fn parse_proj(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition).map_err(|e| ProjectionError::InvalidDefinition {
        definition: definition.to_string(),
        message: format!("{:?}", e),
    })
}

enum Strategy {
    /// Source is already lon/lat degrees.
    Identity,
    /// Generic proj4rs transform.
    Proj4 { native: Proj, geographic: Proj },
}

/// Reprojects between one raster's native CRS and WGS84 lon/lat.
pub struct Reprojector {
    source: CrsCode,
    strategy: Strategy,
}

impl std::fmt::Debug for Reprojector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reprojector")
            .field("source", &self.source)
            .field("identity", &matches!(self.strategy, Strategy::Identity))
            .finish_non_exhaustive()
    }
}

impl Reprojector {
    /// Build a reprojector for a source CRS.
    ///
    /// Fails for unknown or malformed CRS identifiers.
    pub fn new(source: &CrsCode) -> Result<Self> {
        let strategy = if source.is_geographic() {
            Strategy::Identity
        } else {
            let native = parse_proj(&proj_definition(source)?)?;
            let geographic = parse_proj(WGS84_LONLAT)?;
            debug!(crs = %source, "Built proj4rs reprojector");
            Strategy::Proj4 { native, geographic }
        };

        Ok(Self {
            source: source.clone(),
            strategy,
        })
    }

    pub fn source(&self) -> &CrsCode {
        &self.source
    }

    /// Native `(x, y)` to geographic `(lon, lat)` in degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match &self.strategy {
            Strategy::Identity => Ok((x, y)),
            Strategy::Proj4 { native, geographic } => {
                let mut point = (x, y, 0.0);
                transform(native, geographic, &mut point)
                    .map_err(|e| ProjectionError::transform_failed(x, y, format!("{:?}", e)))?;
                finite_or_fail(x, y, point.0.to_degrees(), point.1.to_degrees())
            }
        }
    }

    /// Geographic `(lon, lat)` in degrees to native `(x, y)`.
    pub fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match &self.strategy {
            Strategy::Identity => Ok((lon, lat)),
            Strategy::Proj4 { native, geographic } => {
                let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
                transform(geographic, native, &mut point)
                    .map_err(|e| ProjectionError::transform_failed(lon, lat, format!("{:?}", e)))?;
                finite_or_fail(lon, lat, point.0, point.1)
            }
        }
    }
}

fn finite_or_fail(x: f64, y: f64, out_x: f64, out_y: f64) -> Result<(f64, f64)> {
    if out_x.is_finite() && out_y.is_finite() {
        Ok((out_x, out_y))
    } else {
        Err(ProjectionError::transform_failed(
            x,
            y,
            "result is not finite",
        ))
    }
}
