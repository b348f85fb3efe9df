// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection overlay — corner markers and the sheet outline drawn onto a copy
// of the original photo.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut};
use sheetcorner_core::Detection;
use tracing::{debug, instrument};

pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
pub const MARKER_RADIUS: i32 = 30;
/// Outline stroke width in pixels.
pub const OUTLINE_WIDTH: i32 = 5;

/// Copy `image` and draw `detection` on it.
///
/// Every corner gets a filled circle; every pair of corners that lie on the
/// same detected line is joined by a thick segment, which traces the sheet
/// outline.
pub fn annotate(image: &RgbImage, detection: &Detection) -> RgbImage {
    annotate_with_radius(image, detection, MARKER_RADIUS)
}

/// Like [`annotate`], with corner markers of `radius` pixels.
#[instrument(skip(image, detection), fields(width = image.width(), height = image.height()))]
pub fn annotate_with_radius(image: &RgbImage, detection: &Detection, radius: i32) -> RgbImage {
    let mut canvas = image.clone();
    let reach = drawable_reach(image, radius);

    for line in 0..4 {
        let ends: Vec<(f64, f64)> = detection
            .corners
            .iter()
            .filter(|c| c.lines.0 == line || c.lines.1 == line)
            .map(|c| (c.x, c.y))
            .collect();
        if let [a, b] = ends[..] {
            if within(a, reach) && within(b, reach) {
                draw_thick_segment(&mut canvas, a, b);
            } else {
                debug!(line, "Outline segment too far outside the image, skipped");
            }
        } else {
            debug!(line, corners = ends.len(), "Line without exactly two corners");
        }
    }

    for corner in detection.corners.iter().filter(|c| within((c.x, c.y), reach)) {
        draw_filled_circle_mut(
            &mut canvas,
            (corner.x.round() as i32, corner.y.round() as i32),
            radius.max(0),
            MARKER_COLOR,
        );
    }

    canvas
}

/// Points farther than this from the origin along either axis are not drawn.
fn drawable_reach(image: &RgbImage, radius: i32) -> f64 {
    4.0 * image.width().max(image.height()) as f64 + radius.max(0) as f64
}

fn within((x, y): (f64, f64), reach: f64) -> bool {
    x.is_finite() && y.is_finite() && x.abs() <= reach && y.abs() <= reach
}

/// Draw `OUTLINE_WIDTH` parallel one-pixel segments, offset along the normal.
fn draw_thick_segment(canvas: &mut RgbImage, a: (f64, f64), b: (f64, f64)) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = dx.hypot(dy);
    let (nx, ny) = if len > 0.0 {
        (-dy / len, dx / len)
    } else {
        (0.0, 0.0)
    };

    let half = OUTLINE_WIDTH / 2;
    for step in -half..=half {
        let shift = step as f64;
        let (ox, oy) = (nx * shift, ny * shift);
        draw_line_segment_mut(
            canvas,
            ((a.0 + ox) as f32, (a.1 + oy) as f32),
            ((b.0 + ox) as f32, (b.1 + oy) as f32),
            MARKER_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcorner_core::{Corner, Line, LineEquation, SelectedLines};

    fn square_detection() -> Detection {
        let corner = |x, y, lines| Corner { x, y, lines };
        Detection {
            lines: SelectedLines {
                pairs: [
                    (Line::new(0, 31, 1), Line::new(0, 111, 1)),
                    (Line::new(250, 31, 1), Line::new(250, 111, 1)),
                ],
            },
            equations: [
                LineEquation::Vertical { x: 40.0 },
                LineEquation::Vertical { x: 160.0 },
                LineEquation::Sloped { slope: 0.0, intercept: 40.0 },
                LineEquation::Sloped { slope: 0.0, intercept: 160.0 },
            ],
            corners: [
                corner(40.0, 40.0, (0, 2)),
                corner(40.0, 160.0, (0, 3)),
                corner(160.0, 40.0, (1, 2)),
                corner(160.0, 160.0, (1, 3)),
            ],
            scale: 0.5,
            working_size: (100, 100),
        }
    }

    #[test]
    fn corners_get_markers() {
        let image = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        let out = annotate(&image, &square_detection());
        assert_eq!(out.dimensions(), (200, 200));
        for (x, y) in [(40, 40), (40, 160), (160, 40), (160, 160)] {
            assert_eq!(*out.get_pixel(x, y), MARKER_COLOR);
            // Still inside the marker radius.
            assert_eq!(*out.get_pixel(x + 20, y), MARKER_COLOR);
        }
        // The original is untouched.
        assert_eq!(*image.get_pixel(40, 40), Rgb([0, 0, 0]));
    }

    #[test]
    fn outline_joins_corners_on_a_shared_line() {
        let image = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        let out = annotate(&image, &square_detection());
        // Midpoints of the four sides, with the stroke's thickness.
        for (x, y) in [(100, 40), (100, 160), (40, 100), (160, 100)] {
            assert_eq!(*out.get_pixel(x, y), MARKER_COLOR, "({x}, {y})");
        }
        assert_eq!(*out.get_pixel(100, 42), MARKER_COLOR);
        assert_eq!(*out.get_pixel(100, 38), MARKER_COLOR);
        assert_eq!(*out.get_pixel(100, 45), Rgb([0, 0, 0]));
        // No diagonals: opposite corners share no line.
        assert_eq!(*out.get_pixel(100, 100), Rgb([0, 0, 0]));
    }

    #[test]
    fn marker_radius_is_adjustable() {
        let image = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        let out = annotate_with_radius(&image, &square_detection(), 3);
        assert_eq!(*out.get_pixel(40, 40), MARKER_COLOR);
        // Off the outline and outside the small marker.
        assert_eq!(*out.get_pixel(50, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn corners_off_canvas_are_clipped() {
        let image = RgbImage::from_pixel(50, 50, Rgb([9, 9, 9]));
        let mut detection = square_detection();
        detection.corners[3].x = 1e9;
        detection.corners[2].y = f64::NAN;
        let out = annotate(&image, &detection);
        assert_eq!(out.dimensions(), (50, 50));
        // The corner at (40, 40) is still marked.
        assert_eq!(*out.get_pixel(40, 40), MARKER_COLOR);
    }
}
