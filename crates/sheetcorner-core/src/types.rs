// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Sheetcorner detector.

use serde::{Deserialize, Serialize};

/// A line in Hough parameter space.
///
/// `angle` is the angle bin (0 means a vertical line in image space) and
/// `offset` the offset bin, i.e. the signed distance from the working image
/// centre shifted by half the offset range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Line {
    pub angle: usize,
    pub offset: usize,
    pub votes: u32,
}

impl Line {
    pub fn new(angle: usize, offset: usize, votes: u32) -> Self {
        Self {
            angle,
            offset,
            votes,
        }
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "(angle bin {}, offset bin {}, {} votes)",
            self.angle, self.offset, self.votes
        )
    }
}

/// The four selected boundary lines, grouped as two pairs of parallel lines.
///
/// Lines are indexed 0..4 in the order pair 0 first, pair 1 second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedLines {
    pub pairs: [(Line, Line); 2],
}

impl SelectedLines {
    /// The lines in index order: `[pair0.0, pair0.1, pair1.0, pair1.1]`.
    pub fn lines(&self) -> [Line; 4] {
        [
            self.pairs[0].0,
            self.pairs[0].1,
            self.pairs[1].0,
            self.pairs[1].1,
        ]
    }
}

/// A corner of the detected sheet in original-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Corner {
    pub x: f64,
    pub y: f64,
    /// Indices into [`SelectedLines::lines`] of the two lines meeting here.
    pub lines: (usize, usize),
}

/// A boundary line in original-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineEquation {
    /// `x = x`
    Vertical { x: f64 },
    /// `y = slope * x + intercept`
    Sloped { slope: f64, intercept: f64 },
}

impl LineEquation {
    /// The y coordinate at `x`, or `None` for a vertical line.
    pub fn y_at(&self, x: f64) -> Option<f64> {
        match *self {
            LineEquation::Vertical { .. } => None,
            LineEquation::Sloped { slope, intercept } => Some(slope * x + intercept),
        }
    }

    /// The x coordinate at `y`, or `None` for a horizontal line.
    pub fn x_at(&self, y: f64) -> Option<f64> {
        match *self {
            LineEquation::Vertical { x } => Some(x),
            LineEquation::Sloped { slope, .. } if slope == 0.0 => None,
            LineEquation::Sloped { slope, intercept } => Some((y - intercept) / slope),
        }
    }

    /// Perpendicular distance from `(x, y)` to the line.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        match *self {
            LineEquation::Vertical { x: line_x } => (x - line_x).abs(),
            LineEquation::Sloped { slope, intercept } => {
                (slope * x - y + intercept).abs() / (slope * slope + 1.0).sqrt()
            }
        }
    }
}

impl std::fmt::Display for LineEquation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            LineEquation::Vertical { x } => write!(f, "x = {:.3}", x),
            LineEquation::Sloped { slope, intercept } => {
                write!(f, "y = {:.6} * x + {:.3}", slope, intercept)
            }
        }
    }
}

/// Result of a successful detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// The four boundary lines in parameter space.
    pub lines: SelectedLines,
    /// Boundary line equations, index-aligned with `lines.lines()`.
    pub equations: [LineEquation; 4],
    pub corners: [Corner; 4],
    /// Scale factor that was applied before edge extraction (1.0 if none).
    pub scale: f64,
    /// Dimensions of the image the Hough transform ran on.
    pub working_size: (u32, u32),
}
