// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Line selection — greedy pick of two parallel pairs from the candidate peaks,
// with near-duplicate suppression.

use sheetcorner_core::error::{Result, SheetError};
use sheetcorner_core::{DetectorConfig, Line, SelectedLines};
use tracing::{debug, info, instrument, warn};

/// Geometry of the parameter space the candidates came from, plus the
/// tolerances derived from the configuration.
#[derive(Debug, Clone, Copy)]
pub struct LineSelector {
    angle_bins: usize,
    /// `offset_bins / 2` of the accumulator.
    half_offset: usize,
    parallel_bound: usize,
    duplicate_angle_bins: f64,
    duplicate_offset: f64,
    max_kept: usize,
}

impl LineSelector {
    pub fn new(config: &DetectorConfig, angle_bins: usize, half_offset: usize) -> Self {
        Self {
            angle_bins,
            half_offset,
            parallel_bound: config.parallel_bound_bins(),
            duplicate_angle_bins: config.duplicate_angle_bins(),
            duplicate_offset: config.duplicate_offset_tolerance,
            max_kept: config.max_kept_lines,
        }
    }

    /// Whether two lines have (nearly) the same orientation.
    ///
    /// Orientation wraps at pi, so bins near 0 and near `angle_bins` count as
    /// parallel too.
    pub fn is_parallel(&self, a: &Line, b: &Line) -> bool {
        let diff = a.angle.abs_diff(b.angle);
        diff < self.parallel_bound || diff > self.angle_bins - self.parallel_bound
    }

    /// Whether `candidate` lies inside the near-duplicate ellipse of `kept`.
    ///
    /// The test is `d_angle^2 + floor(d_offset^2 * a^2 / b^2) <= a^2`, with
    /// `a` the angular radius in bins and `b` the offset radius. With default
    /// tolerances at 500 bins this is exactly the integer test
    /// `d_angle^2 + d_offset^2 / 10 <= 100`. `kept` is also compared in its
    /// mirrored form `(angle - angle_bins, 2 * half_offset - offset)`, which
    /// describes the same line from the other side of the angle seam.
    pub fn is_duplicate(&self, candidate: &Line, kept: &Line) -> bool {
        let d_angle = candidate.angle as i64 - kept.angle as i64;
        let d_offset = candidate.offset as i64 - kept.offset as i64;
        if self.within_ellipse(d_angle, d_offset) {
            return true;
        }

        // Mirror onto the candidate's side of the seam.
        let seam = self.angle_bins as i64;
        let mirrored_d_angle = if d_angle >= 0 { d_angle - seam } else { d_angle + seam };
        let mirrored_offset = 2 * self.half_offset as i64 - kept.offset as i64;
        self.within_ellipse(mirrored_d_angle, candidate.offset as i64 - mirrored_offset)
    }

    fn within_ellipse(&self, d_angle: i64, d_offset: i64) -> bool {
        let radius_sq = self.duplicate_angle_bins.powi(2);
        let ratio = radius_sq / self.duplicate_offset.powi(2);
        // The epsilon absorbs rounding in the ratio before the floor.
        let offset_term = ((d_offset * d_offset) as f64 * ratio + 1e-9).floor();
        (d_angle * d_angle) as f64 + offset_term <= radius_sq + 1e-9
    }

    /// Pick two parallel pairs from `candidates`.
    ///
    /// Candidates are visited strongest first; equal counts keep their input
    /// (scan) order. Near-duplicates of an already kept line are skipped
    /// without using up the budget. Each newly kept line pairs with the
    /// earliest unpaired kept line parallel to it. Selection ends after two
    /// pairs, after `max_kept_lines` kept lines, or when candidates run out.
    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    pub fn select(&self, candidates: &[Line]) -> Result<SelectedLines> {
        let mut ranked = candidates.to_vec();
        ranked.sort_by(|a, b| b.votes.cmp(&a.votes));

        let mut kept: Vec<Line> = Vec::with_capacity(self.max_kept);
        let mut paired: Vec<bool> = Vec::with_capacity(self.max_kept);
        let mut pairs: Vec<(Line, Line)> = Vec::with_capacity(2);

        for line in ranked.into_iter().filter(|l| l.votes > 0) {
            if pairs.len() == 2 || kept.len() == self.max_kept {
                break;
            }
            if let Some(existing) = kept.iter().find(|k| self.is_duplicate(&line, k)) {
                debug!(%line, %existing, "Near-duplicate suppressed");
                continue;
            }

            let partner = (0..kept.len()).find(|&i| !paired[i] && self.is_parallel(&kept[i], &line));
            kept.push(line);
            paired.push(partner.is_some());

            if let Some(i) = partner {
                paired[i] = true;
                debug!(first = %kept[i], second = %line, "Parallel pair found");
                pairs.push((kept[i], line));
            }
        }

        if pairs.len() < 2 {
            warn!(
                kept = kept.len(),
                pairs = pairs.len(),
                "Could not find two parallel line pairs"
            );
            return Err(SheetError::InsufficientLines {
                kept,
                pairs_found: pairs.len(),
            });
        }

        info!(kept = kept.len(), "Selected two parallel line pairs");
        Ok(SelectedLines {
            pairs: [pairs[0], pairs[1]],
        })
    }
}
