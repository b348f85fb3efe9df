// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detector configuration.
//
// Angular tolerances are stored in degrees and offsets in pixels of the
// resampled working image, so they keep their physical meaning when the
// angle-bin count changes. The defaults reproduce the classic tuning at 500
// angle bins: parallel bound 50 bins, near-duplicate test
// `d_angle^2 + d_offset^2 / 10 <= 100`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SheetError};

/// Reference angle-bin count the default tolerances were tuned for.
pub const REFERENCE_ANGLE_BINS: usize = 500;

/// Largest accepted resampling factor; beyond this the working image
/// outgrows any sensible memory budget.
pub const MAX_SCALE: f64 = 8.0;

/// Tunable knobs for the corner detection pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Resampling factor applied before edge extraction (0.5 halves each side).
    /// A non-positive value disables resampling.
    pub scale: f64,
    /// Number of angle bins covering [0, pi).
    pub angle_bins: usize,
    /// Gaussian blur sigma applied before differentiation.
    pub blur_sigma: f32,
    /// Edge threshold as a multiple of the mean positive gradient magnitude.
    pub gradient_multiplier: f64,
    /// Two lines closer than this in orientation count as parallel.
    pub parallel_tolerance_deg: f64,
    /// Angular radius of the near-duplicate ellipse.
    pub duplicate_angle_tolerance_deg: f64,
    /// Offset radius (pixels) of the near-duplicate ellipse.
    pub duplicate_offset_tolerance: f64,
    /// Give up after keeping this many distinct lines without two parallel pairs.
    pub max_kept_lines: usize,
    /// Smallest |determinant| accepted when intersecting two lines.
    pub intersection_epsilon: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            scale: 0.5,
            angle_bins: REFERENCE_ANGLE_BINS,
            blur_sigma: 3.0,
            gradient_multiplier: 2.0,
            parallel_tolerance_deg: 18.0,
            duplicate_angle_tolerance_deg: 3.6,
            // sqrt(1000): an offset gap of ~31.6 px alone is a duplicate boundary.
            duplicate_offset_tolerance: 1000f64.sqrt(),
            max_kept_lines: 10,
            intersection_epsilon: 1e-9,
        }
    }
}

impl DetectorConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), text)?;
        Ok(())
    }

    /// Reject knob values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.scale.is_finite() && self.scale <= MAX_SCALE) {
            return Err(SheetError::InvalidConfig(format!(
                "scale must be finite and at most {}, got {}",
                MAX_SCALE, self.scale
            )));
        }
        if self.angle_bins < 3 {
            return Err(SheetError::InvalidConfig(format!(
                "angle_bins must be at least 3, got {}",
                self.angle_bins
            )));
        }
        if !(self.blur_sigma.is_finite() && self.blur_sigma > 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "blur_sigma must be positive, got {}",
                self.blur_sigma
            )));
        }
        if !(self.gradient_multiplier.is_finite() && self.gradient_multiplier > 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "gradient_multiplier must be positive, got {}",
                self.gradient_multiplier
            )));
        }
        if !(self.parallel_tolerance_deg > 0.0 && self.parallel_tolerance_deg < 90.0) {
            return Err(SheetError::InvalidConfig(format!(
                "parallel_tolerance_deg must lie in (0, 90), got {}",
                self.parallel_tolerance_deg
            )));
        }
        if !(self.duplicate_angle_tolerance_deg > 0.0 && self.duplicate_offset_tolerance > 0.0) {
            return Err(SheetError::InvalidConfig(
                "near-duplicate tolerances must be positive".into(),
            ));
        }
        if self.max_kept_lines < 4 {
            return Err(SheetError::InvalidConfig(format!(
                "max_kept_lines must be at least 4, got {}",
                self.max_kept_lines
            )));
        }
        if !(self.intersection_epsilon.is_finite() && self.intersection_epsilon >= 0.0) {
            return Err(SheetError::InvalidConfig(format!(
                "intersection_epsilon must be non-negative, got {}",
                self.intersection_epsilon
            )));
        }
        Ok(())
    }

    /// Width of one angle bin in degrees.
    pub fn degrees_per_bin(&self) -> f64 {
        180.0 / self.angle_bins as f64
    }

    /// Parallel bound expressed in angle bins (50 at the reference resolution).
    ///
    /// Two lines are parallel when their bin difference is below this bound
    /// or above `angle_bins - bound`.
    pub fn parallel_bound_bins(&self) -> usize {
        let bins = (self.parallel_tolerance_deg / self.degrees_per_bin()).round() as usize;
        bins.clamp(1, self.angle_bins / 2)
    }

    /// Angular near-duplicate radius in bins (10 at the reference resolution).
    pub fn duplicate_angle_bins(&self) -> f64 {
        self.duplicate_angle_tolerance_deg / self.degrees_per_bin()
    }
}
