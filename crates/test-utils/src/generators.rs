//! Synthetic raster generators.
//!
//! Every generator is deterministic so tests can assert exact region sizes,
//! means and centroids.

/// Default NoData sentinel used by the generators.
pub const NODATA: f32 = -9999.0;

/// A rectangular block of pixels set to one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block {
    pub col: usize,
    pub row: usize,
    pub width: usize,
    pub height: usize,
    pub value: f32,
}

impl Block {
    pub fn new(col: usize, row: usize, width: usize, height: usize, value: f32) -> Self {
        Self {
            col,
            row,
            width,
            height,
            value,
        }
    }

    /// Square block of side `size`.
    pub fn square(col: usize, row: usize, size: usize, value: f32) -> Self {
        Self::new(col, row, size, size, value)
    }
}

/// A `width × height` grid with every cell set to `value`.
pub fn uniform_grid(width: usize, height: usize, value: f32) -> Vec<f32> {
    vec![value; width * height]
}

/// A uniform background with rectangular blocks painted over it, in order.
///
/// Blocks are clipped to the grid.
///
/// # Example
///
/// ```
/// use test_utils::{grid_with_blocks, Block};
///
/// let grid = grid_with_blocks(10, 10, 20.0, &[Block::square(1, 1, 3, 30.0)]);
/// assert_eq!(grid.iter().filter(|&&v| v == 30.0).count(), 9);
/// assert_eq!(grid[11], 30.0);
/// ```
pub fn grid_with_blocks(width: usize, height: usize, background: f32, blocks: &[Block]) -> Vec<f32> {
    let mut data = uniform_grid(width, height, background);
    for block in blocks {
        paint_block(&mut data, width, height, block);
    }
    data
}

/// Paint one block into an existing row-major grid.
pub fn paint_block(data: &mut [f32], width: usize, height: usize, block: &Block) {
    let row_end = (block.row + block.height).min(height);
    let col_end = (block.col + block.width).min(width);
    for row in block.row..row_end {
        for col in block.col..col_end {
            data[row * width + col] = block.value;
        }
    }
}

/// Isolated square hot spots on a regular lattice.
///
/// Spots of side `size` sit every `size + gap` pixels in both directions, so
/// with `gap >= 1` no two spots touch under 4- or 8-connectivity.
/// Returns the grid and the number of spots placed.
pub fn hot_spot_lattice(
    width: usize,
    height: usize,
    background: f32,
    hot: f32,
    size: usize,
    gap: usize,
) -> (Vec<f32>, usize) {
    let step = size + gap;
    let mut data = uniform_grid(width, height, background);
    let mut count = 0;
    let mut row = gap;
    while row + size <= height {
        let mut col = gap;
        while col + size <= width {
            paint_block(&mut data, width, height, &Block::square(col, row, size, hot));
            count += 1;
            col += step;
        }
        row += step;
    }
    (data, count)
}

/// Linear west-to-east temperature gradient from `min` to `max`.
pub fn gradient_grid(width: usize, height: usize, min: f32, max: f32) -> Vec<f32> {
    let span = max - min;
    let denom = width.saturating_sub(1).max(1) as f32;
    let mut data = Vec::with_capacity(width * height);
    for _row in 0..height {
        for col in 0..width {
            data.push(min + span * col as f32 / denom);
        }
    }
    data
}

/// A grid where every pixel is the NoData sentinel.
pub fn nodata_grid(width: usize, height: usize) -> Vec<f32> {
    uniform_grid(width, height, NODATA)
}

/// Red and NIR digital numbers (reflectance × 10000) producing a target NDVI.
///
/// Uses `red + nir = 5000`, so `ndvi = (nir - red) / 5000`.
pub fn band_dn_for_ndvi(ndvi: f32) -> (f32, f32) {
    let nir = 2500.0 * (1.0 + ndvi);
    let red = 5000.0 - nir;
    (red, nir)
}
