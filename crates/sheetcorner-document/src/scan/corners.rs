// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Corner solving — pairwise intersection of the selected lines, and
// conversion of Hough lines to equations in original-image coordinates.
//
// A line with angle bin k and offset bin r is the locus
//   x * cos(theta) + y * sin(theta) = r - half_offset
// in coordinates centred on the working image.

use sheetcorner_core::error::{Result, SheetError};
use sheetcorner_core::{Corner, Line, LineEquation, SelectedLines};
use tracing::{debug, instrument};

use super::hough::ParameterSpace;
use super::select::LineSelector;

/// Maps Hough lines of one working image back to the original image.
#[derive(Debug, Clone, Copy)]
pub struct CornerSolver<'a> {
    /// Accumulator the lines were voted in; supplies angles and the origin.
    space: &'a ParameterSpace,
    /// Resampling factor between the original and the working image.
    scale: f64,
    epsilon: f64,
}

impl<'a> CornerSolver<'a> {
    pub fn new(space: &'a ParameterSpace, scale: f64, epsilon: f64) -> Self {
        Self {
            space,
            scale,
            epsilon,
        }
    }

    fn theta(&self, line: &Line) -> f64 {
        self.space.theta(line.angle)
    }

    /// Signed distance of the line from the working-image centre.
    fn rho(&self, line: &Line) -> f64 {
        line.offset as f64 - self.space.half_offset() as f64
    }

    fn center(&self) -> (f64, f64) {
        let (cx, cy) = self.space.center();
        (cx as f64, cy as f64)
    }

    /// Intersection of two lines in centred working-image coordinates.
    pub fn intersect(&self, a: &Line, b: &Line) -> Option<(f64, f64)> {
        let (theta_a, theta_b) = (self.theta(a), self.theta(b));
        let (rho_a, rho_b) = (self.rho(a), self.rho(b));

        // Angle bin 0 is a vertical line: x is known directly.
        if a.angle == 0 || b.angle == 0 {
            let (vertical_rho, other_theta, other_rho) = if a.angle == 0 {
                (rho_a, theta_b, rho_b)
            } else {
                (rho_b, theta_a, rho_a)
            };
            let sin = other_theta.sin();
            if sin.abs() <= self.epsilon {
                return None;
            }
            let x = vertical_rho;
            let y = (other_rho - x * other_theta.cos()) / sin;
            return Some((x, y));
        }

        let (sin_a, cos_a) = theta_a.sin_cos();
        let (sin_b, cos_b) = theta_b.sin_cos();
        let det = cos_a * sin_b - cos_b * sin_a;
        if det.abs() <= self.epsilon {
            return None;
        }
        let x = (rho_a * sin_b - rho_b * sin_a) / det;
        let y = (cos_a * rho_b - cos_b * rho_a) / det;
        Some((x, y))
    }

    /// Convert centred working-image coordinates to original-image coordinates.
    pub fn to_original(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        ((x + cx) / self.scale, (y + cy) / self.scale)
    }

    /// Intersect every non-parallel pair of the selected lines.
    ///
    /// Opposite sides are skipped by the parallel test, leaving one corner per
    /// pair of adjacent sides. Fails if a pair is too close to parallel to
    /// solve, or if the skip leaves anything other than four corners.
    #[instrument(skip_all)]
    pub fn solve(&self, selected: &SelectedLines, selector: &LineSelector) -> Result<[Corner; 4]> {
        let lines = selected.lines();
        let mut corners = Vec::with_capacity(4);

        for i in 0..lines.len() {
            for j in i + 1..lines.len() {
                if selector.is_parallel(&lines[i], &lines[j]) {
                    continue;
                }
                let (x, y) = self.intersect(&lines[i], &lines[j]).ok_or_else(|| {
                    SheetError::DegenerateIntersection {
                        pair: Some((i, j)),
                        detail: format!(
                            "lines {} and {} have a near-zero determinant",
                            lines[i], lines[j]
                        ),
                    }
                })?;
                let (x, y) = self.to_original(x, y);
                debug!(i, j, x, y, "Corner solved");
                corners.push(Corner { x, y, lines: (i, j) });
            }
        }

        let found = corners.len();
        <[Corner; 4]>::try_from(corners).map_err(|_| SheetError::DegenerateIntersection {
            pair: None,
            detail: format!("expected 4 corners from non-parallel line pairs, got {}", found),
        })
    }

    /// Equation of `line` in original-image coordinates.
    pub fn equation(&self, line: &Line) -> LineEquation {
        let theta = self.theta(line);
        let (sin, cos) = theta.sin_cos();
        // Shift the origin from the centre back to the top-left corner.
        let (cx, cy) = self.center();
        let constant = self.rho(line) + cx * cos + cy * sin;

        if line.angle == 0 {
            LineEquation::Vertical {
                x: constant / self.scale,
            }
        } else {
            LineEquation::Sloped {
                slope: -cos / sin,
                intercept: constant / (self.scale * sin),
            }
        }
    }

    pub fn equations(&self, selected: &SelectedLines) -> [LineEquation; 4] {
        selected.lines().map(|line| self.equation(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetcorner_core::DetectorConfig;

    /// Accumulator geometry of a 100x100 working image.
    fn space() -> ParameterSpace {
        ParameterSpace::new(100, 100, 500)
    }

    /// Solver for that working image at half scale.
    fn solver(space: &ParameterSpace) -> CornerSolver<'_> {
        CornerSolver::new(space, 0.5, 1e-9)
    }

    fn selector() -> LineSelector {
        LineSelector::new(&DetectorConfig::default(), 500, 71)
    }

    fn rectangle() -> SelectedLines {
        // x = -40, x = 40, y = -40, y = 40 in centred coordinates.
        SelectedLines {
            pairs: [
                (Line::new(0, 31, 1), Line::new(0, 111, 1)),
                (Line::new(250, 31, 1), Line::new(250, 111, 1)),
            ],
        }
    }

    #[test]
    fn vertical_and_horizontal_intersect() {
        let space = space();
        let s = solver(&space);
        let (x, y) = s
            .intersect(&Line::new(0, 31, 1), &Line::new(250, 111, 1))
            .expect("intersection");
        assert!((x + 40.0).abs() < 1e-9);
        assert!((y - 40.0).abs() < 1e-9);

        // Argument order does not matter.
        let (x2, y2) = s
            .intersect(&Line::new(250, 111, 1), &Line::new(0, 31, 1))
            .expect("intersection");
        assert!((x - x2).abs() < 1e-9 && (y - y2).abs() < 1e-9);
    }

    #[test]
    fn general_lines_use_cramer() {
        let space = space();
        let s = solver(&space);
        let a = Line::new(125, 81, 1); // theta = pi/4, rho = 10
        let b = Line::new(375, 71, 1); // theta = 3pi/4, rho = 0
        let (x, y) = s.intersect(&a, &b).expect("intersection");
        // x + y = 10 * sqrt(2), -x + y = 0.
        let expected = 10.0 * std::f64::consts::SQRT_2 / 2.0;
        assert!((x - expected).abs() < 1e-9, "x {}", x);
        assert!((y - expected).abs() < 1e-9, "y {}", y);
    }

    #[test]
    fn same_angle_is_degenerate() {
        let space = space();
        let s = solver(&space);
        assert!(s.intersect(&Line::new(40, 10, 1), &Line::new(40, 90, 1)).is_none());
        assert!(s.intersect(&Line::new(0, 10, 1), &Line::new(0, 90, 1)).is_none());
    }

    #[test]
    fn rectangle_corners_in_original_coordinates() {
        let space = space();
        let corners = solver(&space).solve(&rectangle(), &selector()).expect("four corners");
        let mut points: Vec<(i64, i64)> = corners
            .iter()
            .map(|c| (c.x.round() as i64, c.y.round() as i64))
            .collect();
        points.sort();
        assert_eq!(points, vec![(20, 20), (20, 180), (180, 20), (180, 180)]);

        let tags: Vec<(usize, usize)> = corners.iter().map(|c| c.lines).collect();
        assert_eq!(tags, vec![(0, 2), (0, 3), (1, 2), (1, 3)]);
    }

    #[test]
    fn corners_lie_on_their_equations() {
        let space = space();
        let s = solver(&space);
        let selected = SelectedLines {
            pairs: [
                (Line::new(3, 33, 1), Line::new(496, 30, 1)),
                (Line::new(247, 29, 1), Line::new(255, 112, 1)),
            ],
        };
        let corners = s.solve(&selected, &selector()).expect("four corners");
        let equations = s.equations(&selected);
        for corner in &corners {
            let (i, j) = corner.lines;
            assert!(equations[i].distance_to(corner.x, corner.y) < 1e-3);
            assert!(equations[j].distance_to(corner.x, corner.y) < 1e-3);
        }
    }

    #[test]
    fn equations_of_axis_aligned_lines() {
        let space = space();
        let s = solver(&space);
        assert_eq!(s.equation(&Line::new(0, 31, 1)), LineEquation::Vertical { x: 20.0 });
        match s.equation(&Line::new(250, 111, 1)) {
            LineEquation::Sloped { slope, intercept } => {
                assert!(slope.abs() < 1e-12);
                assert!((intercept - 180.0).abs() < 1e-9);
            }
            other => panic!("expected a sloped line, got {other:?}"),
        }
    }

    /// Three lines of one family plus one crossing line give too few corners.
    #[test]
    fn wrong_corner_count_is_reported() {
        let space = space();
        let s = solver(&space);
        let selected = SelectedLines {
            pairs: [
                (Line::new(0, 31, 1), Line::new(10, 111, 1)),
                (Line::new(30, 50, 1), Line::new(250, 111, 1)),
            ],
        };
        match s.solve(&selected, &selector()) {
            Err(SheetError::DegenerateIntersection { pair: None, .. }) => {}
            other => panic!("expected DegenerateIntersection, got {other:?}"),
        }
    }

    #[test]
    fn near_parallel_crossing_pair_is_reported() {
        let space = space();
        let s = CornerSolver::new(&space, 0.5, 0.5);
        // sin(60 bins) ~ 0.37 is below the exaggerated epsilon.
        match s.solve(
            &SelectedLines {
                pairs: [
                    (Line::new(0, 31, 1), Line::new(0, 111, 1)),
                    (Line::new(60, 31, 1), Line::new(60, 111, 1)),
                ],
            },
            &selector(),
        ) {
            Err(SheetError::DegenerateIntersection { pair: Some((0, 2)), .. }) => {}
            other => panic!("expected DegenerateIntersection, got {other:?}"),
        }
    }
}
