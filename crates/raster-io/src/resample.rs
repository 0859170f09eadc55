//! Interpolation methods for grid resampling.
//!
//! Source and destination grids cover the same footprint and are aligned on
//! pixel centers, so destination pixel `d` samples source position
//! `(d + 0.5) * scale - 0.5`.

use serde::{Deserialize, Serialize};

/// Interpolation method used when resampling a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Value of the source pixel containing the destination center.
    Nearest,
    /// Weighted mean of the four surrounding source pixel centers.
    #[default]
    Bilinear,
}

/// Nearest neighbor lookup at continuous pixel-center coordinates.
pub fn nearest_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if x < -0.5 || y < -0.5 {
        return f32::NAN;
    }
    let col = (x + 0.5).floor() as usize;
    let row = (y + 0.5).floor() as usize;

    if col >= width || row >= height {
        return f32::NAN;
    }

    data[row * width + col]
}

/// Bilinear interpolation at continuous pixel-center coordinates.
///
/// Coordinates are clamped to the outermost pixel centers. Any NaN corner
/// makes the result NaN, so NoData never bleeds into valid cells.
pub fn bilinear_interpolate(data: &[f32], width: usize, height: usize, x: f64, y: f64) -> f32 {
    if width == 0 || height == 0 {
        return f32::NAN;
    }
    let (col, fx) = split_axis(x, width);
    let (row, fy) = split_axis(y, height);
    let next_col = (col + 1).min(width - 1);
    let next_row = (row + 1).min(height - 1);

    let at = |c: usize, r: usize| data[r * width + c] as f64;
    let corners = [
        at(col, row),
        at(next_col, row),
        at(col, next_row),
        at(next_col, next_row),
    ];
    if corners.iter().any(|v| v.is_nan()) {
        return f32::NAN;
    }

    let upper = corners[0] + (corners[1] - corners[0]) * fx;
    let lower = corners[2] + (corners[3] - corners[2]) * fx;
    (upper + (lower - upper) * fy) as f32
}

/// Clamp a coordinate to `[0, len - 1]` and split it into cell index and
/// fractional offset.
fn split_axis(v: f64, len: usize) -> (usize, f64) {
    let v = v.clamp(0.0, (len - 1) as f64);
    let index = v.floor();
    (index as usize, v - index)
}

/// Resample a grid to a new size over the same footprint.
///
/// # Arguments
/// * `data` - Source grid data, row-major
/// * `src_width` / `src_height` - Source shape
/// * `dst_width` / `dst_height` - Destination shape
/// * `method` - Interpolation method
pub fn resample_grid(
    data: &[f32],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
    method: Interpolation,
) -> Vec<f32> {
    let mut output = vec![f32::NAN; dst_width * dst_height];
    if src_width == 0 || src_height == 0 || data.len() != src_width * src_height {
        return output;
    }

    let scale_x = src_width as f64 / dst_width.max(1) as f64;
    let scale_y = src_height as f64 / dst_height.max(1) as f64;

    for dy in 0..dst_height {
        let sy = (dy as f64 + 0.5) * scale_y - 0.5;
        for dx in 0..dst_width {
            let sx = (dx as f64 + 0.5) * scale_x - 0.5;

            output[dy * dst_width + dx] = match method {
                Interpolation::Nearest => nearest_interpolate(data, src_width, src_height, sx, sy),
                Interpolation::Bilinear => {
                    bilinear_interpolate(data, src_width, src_height, sx, sy)
                }
            };
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3×3 temperature tile, row-major, north row first
    const TILE: [f32; 9] = [
        24.0, 26.0, 28.0,
        30.0, 32.0, 34.0,
        36.0, 38.0, 40.0,
    ];

    #[test]
    fn test_nearest_picks_containing_pixel() {
        assert_eq!(nearest_interpolate(&TILE, 3, 3, 0.0, 0.0), 24.0);
        assert_eq!(nearest_interpolate(&TILE, 3, 3, 0.49, 1.2), 30.0);
        assert_eq!(nearest_interpolate(&TILE, 3, 3, 1.51, 1.51), 40.0);
        assert!(nearest_interpolate(&TILE, 3, 3, 2.6, 0.0).is_nan());
        assert!(nearest_interpolate(&TILE, 3, 3, 0.0, -0.6).is_nan());
    }

    #[test]
    fn test_bilinear_blends_neighbours() {
        // On a pixel center the value is exact
        assert_eq!(bilinear_interpolate(&TILE, 3, 3, 2.0, 1.0), 34.0);
        // Halfway between columns 0 and 1 of the top row
        assert!((bilinear_interpolate(&TILE, 3, 3, 0.5, 0.0) - 25.0).abs() < 1e-5);
        // Middle of the lower-right quad
        assert!((bilinear_interpolate(&TILE, 3, 3, 1.5, 1.5) - 36.0).abs() < 1e-5);
        // Outside the outer centers the edge value holds
        assert_eq!(bilinear_interpolate(&TILE, 3, 3, 2.4, -0.3), 28.0);
    }

    #[test]
    fn test_bilinear_nodata_corner_propagates() {
        let mut tile = TILE;
        tile[4] = f32::NAN;
        assert!(bilinear_interpolate(&tile, 3, 3, 0.5, 0.5).is_nan());
        // The east column never touches the hole
        assert_eq!(bilinear_interpolate(&tile, 3, 3, 2.0, 0.0), 28.0);
    }

    #[test]
    fn test_resample_same_size_is_identity() {
        let out = resample_grid(&TILE, 3, 3, 3, 3, Interpolation::Bilinear);
        assert_eq!(out, TILE.to_vec());
    }

    #[test]
    fn test_downsample_nearest_keeps_block_values() {
        // 4×2 with two 2×2 blocks → 2×1
        let data = [30.0, 30.0, 38.0, 38.0, 30.0, 30.0, 38.0, 38.0];
        let out = resample_grid(&data, 4, 2, 2, 1, Interpolation::Nearest);
        assert_eq!(out, vec![30.0, 38.0]);
    }

    #[test]
    fn test_upsample_heatmap_grid() {
        let out = resample_grid(&TILE, 3, 3, 6, 6, Interpolation::Bilinear);
        assert_eq!(out.len(), 36);
        assert_eq!(out[0], 24.0);
        assert_eq!(out[35], 40.0);
        assert!(out.iter().all(|v| (24.0..=40.0).contains(v)));
    }

    #[test]
    fn test_mismatched_input_is_all_nan() {
        let out = resample_grid(&[1.0, 2.0], 3, 3, 2, 2, Interpolation::Nearest);
        assert!(out.iter().all(|v| v.is_nan()));
    }
}
