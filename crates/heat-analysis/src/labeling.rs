//! Connected-component labeling of binary masks.
//!
//! Two-pass union-find over a row-major mask with 4-connectivity: a pixel
//! joins its left and upper neighbours only, never diagonals. Final labels are
//! dense `1..=count`, numbered in raster-scan order of each component's first
//! pixel; `0` is background.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelingError {
    #[error("mask length {len} does not match {width}x{height}")]
    ShapeMismatch {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Label grid produced by [`label_components`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledGrid {
    pub labels: Vec<u32>,
    pub width: usize,
    pub height: usize,
    /// Number of components; labels run `1..=count`.
    pub count: usize,
}

impl LabeledGrid {
    pub fn label_at(&self, col: usize, row: usize) -> u32 {
        self.labels[row * self.width + col]
    }

    /// Pixel count of every component, indexed by `label - 1`.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.count];
        for &label in &self.labels {
            if label > 0 {
                sizes[(label - 1) as usize] += 1;
            }
        }
        sizes
    }
}

/// Label the 4-connected components of `mask`.
pub fn label_components(
    mask: &[bool],
    width: usize,
    height: usize,
) -> Result<LabeledGrid, LabelingError> {
    if mask.len() != width * height {
        return Err(LabelingError::ShapeMismatch {
            width,
            height,
            len: mask.len(),
        });
    }

    let mut labels = vec![0u32; mask.len()];
    // parent[label - 1] is the parent of provisional `label`
    let mut parent: Vec<u32> = Vec::new();

    for row in 0..height {
        for col in 0..width {
            let idx = row * width + col;
            if !mask[idx] {
                continue;
            }

            let left = if col > 0 { labels[idx - 1] } else { 0 };
            let up = if row > 0 { labels[idx - width] } else { 0 };

            labels[idx] = match (left, up) {
                (0, 0) => {
                    parent.push(parent.len() as u32 + 1);
                    parent.len() as u32
                }
                (l, 0) => l,
                (0, u) => u,
                (l, u) => {
                    union(&mut parent, l, u);
                    l.min(u)
                }
            };
        }
    }

    // Second pass: resolve roots and renumber in scan order.
    let mut label_map = vec![0u32; parent.len() + 1];
    let mut count = 0u32;
    for label in labels.iter_mut() {
        if *label == 0 {
            continue;
        }
        let root = find(&mut parent, *label);
        if label_map[root as usize] == 0 {
            count += 1;
            label_map[root as usize] = count;
        }
        *label = label_map[root as usize];
    }

    Ok(LabeledGrid {
        labels,
        width,
        height,
        count: count as usize,
    })
}

fn find(parent: &mut [u32], label: u32) -> u32 {
    let mut root = label;
    while parent[(root - 1) as usize] != root {
        root = parent[(root - 1) as usize];
    }
    // Path compression
    let mut current = label;
    while parent[(current - 1) as usize] != root {
        let next = parent[(current - 1) as usize];
        parent[(current - 1) as usize] = root;
        current = next;
    }
    root
}

fn union(parent: &mut [u32], a: u32, b: u32) {
    let root_a = find(parent, a);
    let root_b = find(parent, b);
    if root_a != root_b {
        let (low, high) = if root_a < root_b {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        parent[(high - 1) as usize] = low;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(rows: &[&str]) -> (Vec<bool>, usize, usize) {
        let height = rows.len();
        let width = rows[0].len();
        let data = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        (data, width, height)
    }

    #[test]
    fn test_empty_mask() {
        let (m, w, h) = mask(&["....", "...."]);
        let grid = label_components(&m, w, h).unwrap();
        assert_eq!(grid.count, 0);
        assert!(grid.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn test_diagonal_pixels_are_separate() {
        let (m, w, h) = mask(&["#.", ".#"]);
        let grid = label_components(&m, w, h).unwrap();
        assert_eq!(grid.count, 2);
        assert_eq!(grid.label_at(0, 0), 1);
        assert_eq!(grid.label_at(1, 1), 2);
    }

    #[test]
    fn test_u_shape_merges() {
        // Two arms first seen as separate labels, joined by the bottom row
        let (m, w, h) = mask(&["#..#", "#..#", "####"]);
        let grid = label_components(&m, w, h).unwrap();
        assert_eq!(grid.count, 1);
        assert_eq!(grid.component_sizes(), vec![8]);
    }

    #[test]
    fn test_scan_order_numbering() {
        let (m, w, h) = mask(&[
            "..#...",
            "#.#..#",
            "#....#",
        ]);
        let grid = label_components(&m, w, h).unwrap();
        assert_eq!(grid.count, 3);
        assert_eq!(grid.label_at(2, 0), 1);
        assert_eq!(grid.label_at(0, 1), 2);
        assert_eq!(grid.label_at(5, 1), 3);
        assert_eq!(grid.component_sizes(), vec![2, 2, 2]);
    }

    #[test]
    fn test_staircase_chain_of_unions() {
        let (m, w, h) = mask(&[
            "#.#.#",
            "#####",
        ]);
        let grid = label_components(&m, w, h).unwrap();
        assert_eq!(grid.count, 1);
        assert!(grid.labels.iter().filter(|&&l| l > 0).all(|&l| l == 1));
    }

    #[test]
    fn test_shape_mismatch() {
        assert_eq!(
            label_components(&[true; 5], 2, 3),
            Err(LabelingError::ShapeMismatch {
                width: 2,
                height: 3,
                len: 5
            })
        );
    }
}
