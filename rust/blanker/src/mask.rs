// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image occupancy oracle
//!
//! The mask image is read with one column per longitudinal sample and one
//! row per angular sample. A cell is raised when its pixel is fully opaque
//! black. Rows wrap around the circumference; columns outside the image are
//! never raised.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageReader};
use std::f64::consts::PI;
use std::path::Path;

/// Predicate deciding whether a (column, row) cell is raised
pub trait Occupancy {
    fn is_raised(&self, column: isize, row: isize) -> bool;
}

/// Oracle with no raised cells
#[derive(Debug, Clone, Copy, Default)]
pub struct Unoccupied;

impl Occupancy for Unoccupied {
    #[inline]
    fn is_raised(&self, _column: isize, _row: isize) -> bool {
        false
    }
}

#[inline]
fn wrap_row(row: isize, height: usize) -> usize {
    row.rem_euclid(height as isize) as usize
}

/// Boolean field decoded from the mask image, stored column-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyMask {
    /// Build a mask from a predicate over (column, row)
    pub fn from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> bool) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for column in 0..width {
            for row in 0..height {
                cells.push(f(column, row));
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Mark every fully opaque black pixel
    pub fn from_image(image: &DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        Self::from_fn(rgba.width() as usize, rgba.height() as usize, |column, row| {
            rgba.get_pixel(column as u32, row as u32).0 == [0, 0, 0, 255]
        })
    }

    /// Longitudinal sample count
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Angular sample count
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether cell (column, row) is raised.
    ///
    /// Rows wrap modulo the height; columns outside `[0, width)` are `false`.
    #[inline]
    pub fn is_image(&self, column: isize, row: isize) -> bool {
        if column < 0 || column as usize >= self.width || self.height == 0 {
            return false;
        }
        self.cells[column as usize * self.height + wrap_row(row, self.height)]
    }

    /// Number of raised cells
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

impl Occupancy for OccupancyMask {
    #[inline]
    fn is_raised(&self, column: isize, row: isize) -> bool {
        self.is_image(column, row)
    }
}

/// Decode the mask image at `path`
pub fn load_mask(path: &Path) -> Result<OccupancyMask> {
    let load_error = |reason: String| Error::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };

    let image = ImageReader::open(path)
        .map_err(|e| load_error(e.to_string()))?
        .decode()
        .map_err(|e| load_error(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(load_error("image has no pixels".into()));
    }

    let mask = OccupancyMask::from_image(&image);
    tracing::debug!(
        path = %path.display(),
        width = mask.width(),
        height = mask.height(),
        occupied = mask.occupied(),
        "decoded mask"
    );
    Ok(mask)
}

/// Half-widths of the wall thickness box window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DilationWindow {
    /// Longitudinal half-width in columns
    pub columns: usize,
    /// Angular half-width in rows
    pub rows: usize,
}

impl DilationWindow {
    /// Window for `wall_thickness`.
    ///
    /// The angular half-width is the smallest step count whose chord on the
    /// outer ring exceeds the wall thickness, capped at half the ring.
    pub fn new(wall_thickness: f32, step_size: f32, outer_radius: f32, steps: usize) -> Self {
        if wall_thickness <= 0.0 || steps == 0 {
            return Self::default();
        }

        let columns = (wall_thickness / step_size).ceil() as usize;
        let cap = (steps / 2).max(1);
        let wall = wall_thickness as f64;
        let diameter = 2.0 * outer_radius as f64;
        let rows = (1..=cap)
            .find(|&k| diameter * (PI * k as f64 / steps as f64).sin() > wall)
            .unwrap_or(cap);

        Self { columns, rows }
    }
}

/// The mask dilated by a [`DilationWindow`].
///
/// Covers the extended column range `[-columns, width + columns)` so the
/// window can reach into the image from outside it.
#[derive(Debug, Clone)]
pub struct DilatedMask {
    window: DilationWindow,
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl DilatedMask {
    /// Dilate with separable prefix-sum box filters
    pub fn new(mask: &OccupancyMask, window: DilationWindow) -> Self {
        let (width, height) = (mask.width(), mask.height());
        let hc = window.columns;
        let extended = width + 2 * hc;

        // Longitudinal pass: per row prefix sums over the source columns
        let mut horizontal = vec![false; extended * height];
        let mut prefix = vec![0usize; width + 1];
        for row in 0..height {
            for column in 0..width {
                prefix[column + 1] = prefix[column] + mask.is_image(column as isize, row as isize) as usize;
            }
            for e in 0..extended {
                let center = e as isize - hc as isize;
                let lo = (center - hc as isize).max(0);
                let hi = (center + hc as isize).min(width as isize - 1);
                if lo <= hi {
                    horizontal[e * height + row] = prefix[hi as usize + 1] > prefix[lo as usize];
                }
            }
        }

        // Angular pass with wraparound
        let hr = window.rows as isize;
        let whole_ring = 2 * window.rows + 1 >= height;
        let mut cells = vec![false; extended * height];
        let mut column_prefix = vec![0usize; height + 1];
        for e in 0..extended {
            let column = &horizontal[e * height..(e + 1) * height];
            for (row, &raised) in column.iter().enumerate() {
                column_prefix[row + 1] = column_prefix[row] + raised as usize;
            }
            let sum = |lo: usize, hi: usize| column_prefix[hi] - column_prefix[lo];

            for row in 0..height {
                let any = if whole_ring {
                    column_prefix[height] > 0
                } else {
                    let (lo, hi) = (row as isize - hr, row as isize + hr);
                    let count = if lo < 0 {
                        sum((lo + height as isize) as usize, height) + sum(0, hi as usize + 1)
                    } else if hi >= height as isize {
                        sum(lo as usize, height) + sum(0, (hi - height as isize) as usize + 1)
                    } else {
                        sum(lo as usize, hi as usize + 1)
                    };
                    count > 0
                };
                cells[e * height + row] = any;
            }
        }

        Self {
            window,
            width,
            height,
            cells,
        }
    }

    #[inline]
    pub fn window(&self) -> DilationWindow {
        self.window
    }

    /// Whether an occupied pixel lies within the wall thickness window
    /// centred on (column, row)
    #[inline]
    pub fn is_within_wall_thickness(&self, column: isize, row: isize) -> bool {
        let e = column + self.window.columns as isize;
        if e < 0 || e as usize >= self.width + 2 * self.window.columns || self.height == 0 {
            return false;
        }
        self.cells[e as usize * self.height + wrap_row(row, self.height)]
    }
}

impl Occupancy for DilatedMask {
    #[inline]
    fn is_raised(&self, column: isize, row: isize) -> bool {
        self.is_within_wall_thickness(column, row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    /// Reference dilation by brute force over the window
    fn brute_force(mask: &OccupancyMask, window: DilationWindow, column: isize, row: isize) -> bool {
        let (hc, hr) = (window.columns as isize, window.rows as isize);
        (column - hc..=column + hc).any(|c| (row - hr..=row + hr).any(|r| mask.is_image(c, r)))
    }

    #[test]
    fn test_opaque_black_only() {
        let mut image = RgbaImage::from_pixel(3, 2, Rgba([255, 255, 255, 255]));
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([0, 0, 0, 128]));
        image.put_pixel(2, 1, Rgba([1, 0, 0, 255]));

        let mask = OccupancyMask::from_image(&DynamicImage::ImageRgba8(image));
        assert_eq!((mask.width(), mask.height()), (3, 2));
        assert!(mask.is_image(0, 0));
        assert!(!mask.is_image(1, 0));
        assert!(!mask.is_image(2, 1));
        assert_eq!(mask.occupied(), 1);
    }

    #[test]
    fn test_rows_wrap_columns_clip() {
        let mask = OccupancyMask::from_fn(4, 5, |c, r| c == 1 && r == 0);
        assert!(mask.is_image(1, 5));
        assert!(mask.is_image(1, -5));
        assert!(!mask.is_image(1, -1));
        assert!(!mask.is_image(-1, 0));
        assert!(!mask.is_image(4, 0));
    }

    #[test]
    fn test_window_half_widths() {
        // 0.5 mm wall over 0.04 mm columns
        let window = DilationWindow::new(0.5, 0.04, 10.0, 64);
        assert_eq!(window.columns, 13);
        // chord(k) = 20 sin(pi k / 64); k = 1 gives ~0.98 > 0.5
        assert_eq!(window.rows, 1);

        let window = DilationWindow::new(3.0, 0.04, 10.0, 64);
        // 20 sin(pi k / 64) > 3 first at k = 4
        assert_eq!(window.rows, 4);

        assert_eq!(DilationWindow::new(0.0, 0.04, 10.0, 64), DilationWindow::default());
        // Capped at half the ring
        assert_eq!(DilationWindow::new(50.0, 0.04, 10.0, 8).rows, 4);
    }

    #[test]
    fn test_zero_wall_is_identity() {
        let mask = OccupancyMask::from_fn(9, 7, |c, r| (c * 3 + r) % 4 == 0);
        let dilated = DilatedMask::new(&mask, DilationWindow::default());
        for c in -2..11 {
            for r in -3..10 {
                assert_eq!(dilated.is_within_wall_thickness(c, r), mask.is_image(c, r));
            }
        }
    }

    #[test]
    fn test_dilation_matches_brute_force() {
        let mask = OccupancyMask::from_fn(12, 10, |c, r| (c == 3 && r == 1) || (c == 10 && r == 8));
        let window = DilationWindow { columns: 2, rows: 2 };
        let dilated = DilatedMask::new(&mask, window);

        for c in -5..17 {
            for r in -3..13 {
                assert_eq!(
                    dilated.is_within_wall_thickness(c, r),
                    brute_force(&mask, window, c, r),
                    "cell ({}, {})",
                    c,
                    r
                );
            }
        }
    }

    #[test]
    fn test_dilation_reaches_outside_image() {
        let mask = OccupancyMask::from_fn(4, 6, |c, _| c == 0);
        let dilated = DilatedMask::new(&mask, DilationWindow { columns: 2, rows: 0 });
        assert!(dilated.is_within_wall_thickness(-2, 3));
        assert!(!dilated.is_within_wall_thickness(-3, 3));
        assert!(dilated.is_within_wall_thickness(2, 3));
        assert!(!dilated.is_within_wall_thickness(3, 3));
    }

    #[test]
    fn test_window_covering_ring() {
        let mask = OccupancyMask::from_fn(3, 4, |c, r| c == 1 && r == 2);
        let dilated = DilatedMask::new(&mask, DilationWindow { columns: 0, rows: 2 });
        for r in 0..4 {
            assert!(dilated.is_within_wall_thickness(1, r));
            assert!(!dilated.is_within_wall_thickness(0, r));
        }
    }

    #[test]
    fn test_missing_file_names_path() {
        let path = Path::new("/nonexistent/blanker/mask.png");
        match load_mask(path) {
            Err(Error::ImageLoad { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected image load error, got {:?}", other),
        }
    }
}
