// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Local-maximum extraction over the Hough accumulator.

use sheetcorner_core::Line;
use tracing::{debug, instrument};

use super::hough::ParameterSpace;

/// Collect every interior local maximum of `space` as a candidate line.
///
/// The outermost ring of cells is skipped in both dimensions. A cell is a
/// peak when its count is at least that of its angle neighbours and of the
/// next-lower offset cell, and strictly greater than the next-higher offset
/// cell. The one strict comparison keeps a flat ridge along the offset axis
/// from producing a peak on every row. Empty cells are never peaks.
///
/// Candidates are returned in scan order (offset-major, angle-minor).
#[instrument(skip(space), fields(offset_bins = space.offset_bins(), angle_bins = space.angle_bins()))]
pub fn find_peaks(space: &ParameterSpace) -> Vec<Line> {
    let rows = space.offset_bins();
    let cols = space.angle_bins();
    let mut peaks = Vec::new();
    if rows < 3 || cols < 3 {
        return peaks;
    }

    let at = |r: usize, k: usize| space.get(r, k).unwrap_or(0);
    for r in 1..rows - 1 {
        for k in 1..cols - 1 {
            let count = at(r, k);
            if count == 0 {
                continue;
            }
            if count >= at(r, k - 1)
                && count >= at(r, k + 1)
                && count >= at(r - 1, k)
                && count > at(r + 1, k)
            {
                peaks.push(Line::new(k, r, count));
            }
        }
    }

    debug!(candidates = peaks.len(), "Accumulator peaks extracted");
    peaks
}
