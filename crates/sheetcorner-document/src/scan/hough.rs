// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Hough accumulator over a quantized (offset, angle) parameter space.
//
// Angles cover [0, pi): a line and its half-turn are the same line, and the
// sign of the offset already tells the two orientations apart. Offsets are
// measured from the mask centre and shifted by half the offset range so
// that every bin index is non-negative.

use std::f64::consts::PI;

use tracing::{debug, info, instrument};

use super::edges::EdgeMask;

/// Vote grid indexed by `(offset bin, angle bin)`, stored row-major by offset.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    votes: Vec<u32>,
    offset_bins: usize,
    angle_bins: usize,
    /// Mask centre used as the coordinate origin.
    center: (i64, i64),
    cos_table: Vec<f64>,
    sin_table: Vec<f64>,
}

impl ParameterSpace {
    /// Create an empty accumulator for a `width x height` mask.
    ///
    /// The offset range is `ceil(sqrt(width^2 + height^2))`.
    pub fn new(width: u32, height: u32, angle_bins: usize) -> Self {
        let diagonal = ((width as f64).powi(2) + (height as f64).powi(2)).sqrt();
        let offset_bins = diagonal.ceil() as usize;

        let (cos_table, sin_table) = (0..angle_bins)
            .map(|k| {
                let theta = k as f64 / angle_bins as f64 * PI;
                (theta.cos(), theta.sin())
            })
            .unzip();

        Self {
            votes: vec![0; offset_bins * angle_bins],
            offset_bins,
            angle_bins,
            center: ((width / 2) as i64, (height / 2) as i64),
            cos_table,
            sin_table,
        }
    }

    /// Accumulate votes for every edge pixel of `mask`.
    #[instrument(skip(mask), fields(width = mask.width(), height = mask.height()))]
    pub fn from_mask(mask: &EdgeMask, angle_bins: usize) -> Self {
        let mut space = Self::new(mask.width(), mask.height(), angle_bins);
        let mut voters = 0usize;
        for (x, y) in mask.edge_pixels() {
            space.vote(x, y);
            voters += 1;
        }
        info!(
            voters,
            offset_bins = space.offset_bins,
            angle_bins = space.angle_bins,
            "Hough voting complete"
        );
        space
    }

    /// Cast one vote per angle bin for the pixel at image position `(x, y)`.
    ///
    /// Votes whose offset falls outside the grid are dropped.
    pub fn vote(&mut self, x: u32, y: u32) {
        let cx = x as i64 - self.center.0;
        let cy = y as i64 - self.center.1;
        let shift = self.half_offset() as i64;
        let mut dropped = 0usize;

        for k in 0..self.angle_bins {
            let r = (cx as f64 * self.cos_table[k] + cy as f64 * self.sin_table[k]).round() as i64
                + shift;
            if r < 0 || r as usize >= self.offset_bins {
                dropped += 1;
                continue;
            }
            let idx = r as usize * self.angle_bins + k;
            self.votes[idx] = self.votes[idx].saturating_add(1);
        }

        if dropped > 0 {
            debug!(x, y, dropped, "Votes outside the offset range");
        }
    }

    /// Vote count at `(offset, angle)`, or `None` outside the grid.
    pub fn get(&self, offset: usize, angle: usize) -> Option<u32> {
        if offset < self.offset_bins && angle < self.angle_bins {
            Some(self.votes[offset * self.angle_bins + angle])
        } else {
            None
        }
    }

    pub fn offset_bins(&self) -> usize {
        self.offset_bins
    }

    pub fn angle_bins(&self) -> usize {
        self.angle_bins
    }

    /// Shift added to signed offsets: `offset_bins / 2` (integer division).
    pub fn half_offset(&self) -> usize {
        self.offset_bins / 2
    }

    /// Coordinate origin in mask pixels.
    pub fn center(&self) -> (i64, i64) {
        self.center
    }

    /// Angle in radians of angle bin `k`.
    pub fn theta(&self, k: usize) -> f64 {
        k as f64 / self.angle_bins as f64 * PI
    }

    /// The strongest cell as `(offset, angle, votes)`; the first in scan order
    /// wins ties.
    pub fn strongest(&self) -> Option<(usize, usize, u32)> {
        let mut best: Option<(usize, usize, u32)> = None;
        for (idx, &count) in self.votes.iter().enumerate() {
            if count > best.map_or(0, |b| b.2) {
                best = Some((idx / self.angle_bins, idx % self.angle_bins, count));
            }
        }
        best
    }

    pub fn total_votes(&self) -> u64 {
        self.votes.iter().map(|v| *v as u64).sum()
    }
}
