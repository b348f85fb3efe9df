// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic photos shared by the unit tests.

use image::{Rgb, RgbImage};

/// A light rectangle on a dark background, both under a gentle diagonal
/// lighting ramp so the gradient field is never flat away from the sheet.
///
/// The sheet covers `x0..x1` by `y0..y1`.
pub(crate) fn synthetic_sheet(
    width: u32,
    height: u32,
    (x0, y0): (u32, u32),
    (x1, y1): (u32, u32),
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let shade = ((x + y) * 40 / (width + height)) as u8;
        let inside = (x0..x1).contains(&x) && (y0..y1).contains(&y);
        let v = if inside { 200 + shade } else { 30 + shade };
        Rgb([v, v, v])
    })
}
