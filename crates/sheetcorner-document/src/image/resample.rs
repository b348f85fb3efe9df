// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bilinear resampling used to shrink photos before edge extraction.

use image::{Rgb, RgbImage};
use tracing::{debug, instrument};

/// Resample `src` by `scale` with bilinear interpolation.
///
/// The output is `floor(w * scale) x floor(h * scale)`. Destination pixel
/// `(i, j)` samples the source at `(i / scale, j / scale)`. When any of the
/// four neighbouring source samples lies outside the source, the pixel is
/// black rather than clamped, which leaves a dark fringe of at most one source
/// pixel along the right and bottom edges.
///
/// A non-positive or non-finite `scale` returns a copy of the input.
#[instrument(skip(src), fields(width = src.width(), height = src.height()))]
pub fn resample_bilinear(src: &RgbImage, scale: f64) -> RgbImage {
    if !(scale.is_finite() && scale > 0.0) {
        debug!(scale, "Non-positive scale; resampling skipped");
        return src.clone();
    }

    let (src_w, src_h) = src.dimensions();
    let dst_w = (src_w as f64 * scale) as u32;
    let dst_h = (src_h as f64 * scale) as u32;

    let dst = RgbImage::from_fn(dst_w, dst_h, |i, j| {
        let fx = i as f64 / scale;
        let fy = j as f64 / scale;
        let x = fx as u32;
        let y = fy as u32;

        if x + 1 >= src_w || y + 1 >= src_h {
            return Rgb([0, 0, 0]);
        }

        let dx = fx - x as f64;
        let dy = fy - y as f64;
        let top_left = src.get_pixel(x, y).0;
        let top_right = src.get_pixel(x + 1, y).0;
        let bottom_left = src.get_pixel(x, y + 1).0;
        let bottom_right = src.get_pixel(x + 1, y + 1).0;

        let blend = |c: usize| -> u8 {
            let value = (1.0 - dx) * (1.0 - dy) * top_left[c] as f64
                + dx * (1.0 - dy) * top_right[c] as f64
                + (1.0 - dx) * dy * bottom_left[c] as f64
                + dx * dy * bottom_right[c] as f64;
            value.round().clamp(0.0, 255.0) as u8
        };
        Rgb([blend(0), blend(1), blend(2)])
    });

    debug!(dst_w, dst_h, "Bilinear resample complete");
    dst
}
