//! Single-band georeferenced raster held fully in memory.

use heat_common::{BoundingBox, CrsCode};
use projection::{AffineTransform, TransformChain};

use crate::error::{RasterError, Result};
use crate::resample::{resample_grid, Interpolation};

/// Outcome of sampling a raster at a geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointSample {
    /// The coordinate falls outside the raster footprint.
    OutOfBounds,
    /// The pixel exists but holds NoData or NaN.
    NoData,
    Value(f32),
}

/// A row-major `f32` grid with its affine transform, CRS and NoData sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    data: Vec<f32>,
    transform: AffineTransform,
    crs: Option<CrsCode>,
    nodata: Option<f64>,
}

impl Raster {
    /// Create a raster, rejecting data whose length is not `width * height`.
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f32>,
        transform: AffineTransform,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(RasterError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            transform,
            crs: None,
            nodata: None,
        })
    }

    /// A raster where every pixel holds `value`.
    pub fn filled(width: usize, height: usize, value: f32, transform: AffineTransform) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
            transform,
            crs: None,
            nodata: None,
        }
    }

    pub fn with_crs(mut self, crs: CrsCode) -> Self {
        self.crs = Some(crs);
        self
    }

    pub fn with_nodata(mut self, nodata: f64) -> Self {
        self.nodata = Some(nodata);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&CrsCode> {
        self.crs.as_ref()
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    /// True when `value` is neither NaN nor the NoData sentinel.
    pub fn is_valid_value(&self, value: f32) -> bool {
        !value.is_nan() && self.nodata.map_or(true, |nd| value != nd as f32)
    }

    /// Raw sample at `(col, row)`, `None` outside the grid.
    pub fn get(&self, col: usize, row: usize) -> Option<f32> {
        if col >= self.width || row >= self.height {
            return None;
        }
        self.data.get(row * self.width + col).copied()
    }

    /// Sample at `(col, row)` if it is valid data.
    pub fn valid_value(&self, col: usize, row: usize) -> Option<f32> {
        self.get(col, row).filter(|&v| self.is_valid_value(v))
    }

    /// Iterator over every valid sample.
    pub fn valid_values(&self) -> impl Iterator<Item = f32> + '_ {
        self.data.iter().copied().filter(|&v| self.is_valid_value(v))
    }

    pub fn valid_count(&self) -> usize {
        self.valid_values().count()
    }

    /// Native-frame footprint.
    pub fn bounds(&self) -> BoundingBox {
        self.transform.bounds(self.width, self.height)
    }

    /// Transform chain for this raster's georeference.
    pub fn transform_chain(&self) -> Result<TransformChain> {
        let crs = self
            .crs
            .as_ref()
            .ok_or_else(|| RasterError::invalid_georeference("raster has no CRS"))?;
        Ok(TransformChain::new(self.transform, crs)?)
    }

    /// Geographic footprint, reprojecting the four corners.
    pub fn geographic_bounds(&self) -> Result<BoundingBox> {
        let chain = self.transform_chain()?;
        let (w, h) = (self.width as f64, self.height as f64);
        let mut corners = Vec::with_capacity(4);
        for (col, row) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
            let p = chain.pixel_to_geographic(col, row)?;
            corners.push((p.lon, p.lat));
        }
        BoundingBox::from_points(&corners)
            .ok_or_else(|| RasterError::invalid_georeference("empty footprint"))
    }

    /// Pixel containing a geographic coordinate, `None` outside the grid.
    pub fn pixel_at_geographic(&self, lon: f64, lat: f64) -> Result<Option<(usize, usize)>> {
        let chain = self.transform_chain()?;
        let (col, row) = chain.geographic_to_pixel(lon, lat)?;
        if !(col.is_finite() && row.is_finite()) || col < 0.0 || row < 0.0 {
            return Ok(None);
        }
        let (col, row) = (col.floor() as usize, row.floor() as usize);
        if col >= self.width || row >= self.height {
            return Ok(None);
        }
        Ok(Some((col, row)))
    }

    /// Sample the pixel containing a geographic coordinate.
    pub fn sample_geographic(&self, lon: f64, lat: f64) -> Result<PointSample> {
        let sample = match self.pixel_at_geographic(lon, lat)? {
            None => PointSample::OutOfBounds,
            Some((col, row)) => match self.valid_value(col, row) {
                Some(v) => PointSample::Value(v),
                None => PointSample::NoData,
            },
        };
        Ok(sample)
    }

    /// Copy with NoData samples replaced by NaN and the sentinel cleared.
    pub fn nodata_as_nan(&self) -> Raster {
        let data = self
            .data
            .iter()
            .map(|&v| if self.is_valid_value(v) { v } else { f32::NAN })
            .collect();
        Raster {
            width: self.width,
            height: self.height,
            data,
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    /// Resample the same footprint onto a `dst_width × dst_height` grid.
    ///
    /// NoData becomes NaN in the output, which carries no sentinel.
    pub fn resampled(&self, dst_width: usize, dst_height: usize, method: Interpolation) -> Raster {
        let source = self.nodata_as_nan();
        let data = resample_grid(
            &source.data,
            self.width,
            self.height,
            dst_width,
            dst_height,
            method,
        );
        let transform = self.transform.scaled(
            self.width as f64 / dst_width.max(1) as f64,
            self.height as f64 / dst_height.max(1) as f64,
        );
        Raster {
            width: dst_width,
            height: dst_height,
            data,
            transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    /// Nearest-neighbour reduction to half width and height (rounded down).
    pub fn downsample_half(&self) -> Raster {
        self.resampled(
            (self.width / 2).max(1),
            (self.height / 2).max(1),
            Interpolation::Nearest,
        )
    }

    /// Rows as nested vectors with invalid samples as `None`.
    pub fn to_rows(&self) -> Vec<Vec<Option<f32>>> {
        if self.width == 0 {
            return Vec::new();
        }
        self.data
            .chunks(self.width)
            .map(|row| {
                row.iter()
                    .map(|&v| self.is_valid_value(v).then_some(v))
                    .collect()
            })
            .collect()
    }
}
