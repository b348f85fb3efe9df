// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge extraction — Gaussian blur, luminance, Sobel derivatives, L1 gradient
// magnitude, and a threshold at a multiple of the mean positive magnitude.

use image::{GrayImage, Luma, RgbImage};
use imageproc::filter::gaussian_blur_f32;
use sheetcorner_core::error::{Result, SheetError};
use tracing::{debug, info, instrument};

/// Value stored for edge pixels.
pub const EDGE: u8 = 255;

type Kernel3 = [[i32; 3]; 3];

/// Vertical-derivative mask (responds to horizontal edges).
const SOBEL_ROWS: Kernel3 = [[1, 2, 1], [0, 0, 0], [-1, -2, -1]];
/// Horizontal-derivative mask (responds to vertical edges).
const SOBEL_COLS: Kernel3 = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Binary edge map: every value is either 0 or [`EDGE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl EdgeMask {
    /// Build a mask from row-major values; anything non-zero becomes an edge.
    pub fn from_raw(width: u32, height: u32, values: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if values.len() != expected {
            return Err(SheetError::InvalidInput(format!(
                "edge mask needs {} values for {}x{}, got {}",
                expected,
                width,
                height,
                values.len()
            )));
        }
        let data = values
            .into_iter()
            .map(|v| if v > 0 { EDGE } else { 0 })
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a mask by evaluating `is_edge` at every pixel.
    pub fn from_fn(width: u32, height: u32, mut is_edge: impl FnMut(u32, u32) -> bool) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(if is_edge(x, y) { EDGE } else { 0 });
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw value at `(x, y)`, or `None` outside the mask.
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.data[y as usize * self.width as usize + x as usize])
        } else {
            None
        }
    }

    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.get(x, y) == Some(EDGE)
    }

    /// Iterate over the coordinates of all edge pixels in row-major order.
    pub fn edge_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == EDGE)
            .map(move |(idx, _)| ((idx % width) as u32, (idx / width) as u32))
    }

    pub fn edge_count(&self) -> usize {
        self.data.iter().filter(|v| **v == EDGE).count()
    }

    pub fn values(&self) -> &[u8] {
        &self.data
    }

    /// Render the mask as a grayscale image (white edges on black).
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            Luma([self.data[y as usize * self.width as usize + x as usize]])
        })
    }
}

/// Convert `image` into a binary edge mask of the same dimensions.
///
/// ## Pipeline
///
/// 1. Gaussian blur with `blur_sigma`
/// 2. Luminance `0.299 R + 0.587 G + 0.114 B`, truncated
/// 3. Sobel responses at every interior pixel (the 1-pixel border stays 0)
/// 4. Magnitude `|Gx| + |Gy|`
/// 5. Threshold = `multiplier` x mean of the strictly positive magnitudes
///
/// Fails with [`SheetError::DegenerateGradient`] when no pixel has a positive
/// magnitude, since the mean is then undefined.
#[instrument(skip(image), fields(width = image.width(), height = image.height()))]
pub fn extract_edges(image: &RgbImage, blur_sigma: f32, multiplier: f64) -> Result<EdgeMask> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(SheetError::InvalidInput(format!(
            "cannot extract edges from a {}x{} image",
            width, height
        )));
    }

    let blurred = gaussian_blur_f32(image, blur_sigma);
    let luma = luminance(&blurred);
    let magnitude = gradient_magnitude(&luma, width as usize, height as usize);

    let (sum, count) = magnitude
        .iter()
        .filter(|m| **m > 0)
        .fold((0u64, 0u64), |(s, c), m| (s + *m as u64, c + 1));
    if count == 0 {
        return Err(SheetError::DegenerateGradient);
    }

    let mean = sum as f64 / count as f64;
    let threshold = multiplier * mean;
    debug!(mean, threshold, positive = count, "Gradient statistics");

    let data = magnitude
        .iter()
        .map(|m| if *m as f64 >= threshold { EDGE } else { 0 })
        .collect();
    let mask = EdgeMask {
        width,
        height,
        data,
    };

    info!(edges = mask.edge_count(), "Edge mask extracted");
    Ok(mask)
}

/// Weighted-sum luminance, truncated to an integer, row-major.
///
/// Computed in thousandths so grey pixels map exactly to their own value.
fn luminance(image: &RgbImage) -> Vec<i32> {
    image
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            (299 * r as i32 + 587 * g as i32 + 114 * b as i32) / 1000
        })
        .collect()
}

/// L1 Sobel magnitude; border pixels are left at zero.
fn gradient_magnitude(luma: &[i32], width: usize, height: usize) -> Vec<u32> {
    let mut magnitude = vec![0u32; width * height];
    if width < 3 || height < 3 {
        return magnitude;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, row) in (y - 1..=y + 1).enumerate() {
                for (kx, col) in (x - 1..=x + 1).enumerate() {
                    let value = luma[row * width + col];
                    gx += value * SOBEL_COLS[ky][kx];
                    gy += value * SOBEL_ROWS[ky][kx];
                }
            }
            magnitude[y * width + x] = gx.unsigned_abs() + gy.unsigned_abs();
        }
    }

    magnitude
}
