// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sheet detection pipeline — resample, extract edges, vote, pick two parallel
// line pairs, and intersect them into four corners.

use image::{DynamicImage, RgbImage};
use sheetcorner_core::error::{Result, SheetError};
use sheetcorner_core::{DetectorConfig, Detection};
use tracing::{debug, info, instrument, warn};

use super::corners::CornerSolver;
use super::edges::{EdgeMask, extract_edges};
use super::hough::ParameterSpace;
use super::peaks::find_peaks;
use super::select::LineSelector;
use crate::image::annotate::annotate;
use crate::image::processor::ImageProcessor;
use crate::image::resample::resample_bilinear;

/// Locates a single photographed sheet and recovers its edges and corners.
///
/// The detector owns the decoded photo and the configuration; running it
/// never mutates either, so one detector can be run repeatedly.
pub struct SheetDetector {
    /// The original, full-resolution photo.
    image: RgbImage,
    config: DetectorConfig,
}

impl SheetDetector {
    // -- Construction ---------------------------------------------------------

    /// Create a detector from raw image bytes (JPEG, PNG, BMP, etc.).
    #[instrument(skip(data, config), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8], config: DetectorConfig) -> Result<Self> {
        let image = ImageProcessor::from_bytes(data)?.to_rgb();
        Self::new(image, config)
    }

    /// Create a detector from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>, config: DetectorConfig) -> Result<Self> {
        let image = ImageProcessor::open(path)?.to_rgb();
        Self::new(image, config)
    }

    /// Create a detector wrapping an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage, config: DetectorConfig) -> Result<Self> {
        Self::new(image.to_rgb8(), config)
    }

    /// Create a detector for an RGB buffer.
    ///
    /// Fails on an empty image or an invalid configuration.
    pub fn new(image: RgbImage, config: DetectorConfig) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(SheetError::InvalidInput(format!(
                "image has no pixels ({}x{})",
                image.width(),
                image.height()
            )));
        }
        config.validate()?;
        Ok(Self { image, config })
    }

    // -- Accessors ------------------------------------------------------------

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Scale factor actually applied: the configured one, or 1.0 when
    /// resampling is disabled.
    pub fn effective_scale(&self) -> f64 {
        if self.config.scale.is_finite() && self.config.scale > 0.0 {
            self.config.scale
        } else {
            1.0
        }
    }

    // -- Pipeline -------------------------------------------------------------

    /// The reduced-resolution copy the rest of the pipeline works on.
    pub fn working_image(&self) -> Result<RgbImage> {
        let working = resample_bilinear(&self.image, self.config.scale);
        if working.width() == 0 || working.height() == 0 {
            return Err(SheetError::InvalidInput(format!(
                "{}x{} image shrinks to nothing at scale {}",
                self.image.width(),
                self.image.height(),
                self.config.scale
            )));
        }
        Ok(working)
    }

    /// Binary edge mask of the working image.
    pub fn edge_mask(&self) -> Result<EdgeMask> {
        let working = self.working_image()?;
        extract_edges(&working, self.config.blur_sigma, self.config.gradient_multiplier)
    }

    /// Run the full detection pipeline:
    ///
    /// 1. Bilinear resample by `scale`
    /// 2. Blur, Sobel gradient and mean-based threshold into an edge mask
    /// 3. Hough voting over `angle_bins` angles
    /// 4. Local-maximum extraction
    /// 5. Greedy selection of two parallel line pairs
    /// 6. Intersection of the non-parallel pairs into four corners
    ///
    /// Every failure is returned as a distinct [`SheetError`]; no default
    /// geometry is ever substituted.
    #[instrument(skip(self), fields(width = self.image.width(), height = self.image.height()))]
    pub fn detect(&self) -> Result<Detection> {
        info!("Starting sheet detection pipeline");
        let mask = self.edge_mask()?;
        self.detect_from_mask(&mask)
    }

    /// Run the pipeline from an edge mask already produced by
    /// [`edge_mask`](Self::edge_mask), skipping resampling and edge extraction.
    #[instrument(skip_all, fields(width = mask.width(), height = mask.height()))]
    pub fn detect_from_mask(&self, mask: &EdgeMask) -> Result<Detection> {
        debug!(
            width = mask.width(),
            height = mask.height(),
            edges = mask.edge_count(),
            "Working edge mask ready"
        );

        let space = ParameterSpace::from_mask(mask, self.config.angle_bins);
        let candidates = find_peaks(&space);
        debug!(candidates = candidates.len(), "Candidate lines");

        let selector = LineSelector::new(&self.config, space.angle_bins(), space.half_offset());
        let selected = selector.select(&candidates).inspect_err(|err| {
            warn!(error = %err, "Line selection failed");
        })?;

        let solver = CornerSolver::new(&space, self.effective_scale(), self.config.intersection_epsilon);
        let corners = solver.solve(&selected, &selector).inspect_err(|err| {
            warn!(error = %err, "Corner solving failed");
        })?;
        let equations = solver.equations(&selected);

        for (idx, corner) in corners.iter().enumerate() {
            debug!(idx, x = corner.x, y = corner.y, lines = ?corner.lines, "Corner");
        }
        info!("Sheet detected");

        Ok(Detection {
            lines: selected,
            equations,
            corners,
            scale: self.effective_scale(),
            working_size: (mask.width(), mask.height()),
        })
    }

    /// Draw `detection` onto a copy of the original photo.
    pub fn annotate(&self, detection: &Detection) -> RgbImage {
        annotate(&self.image, detection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::synthetic_sheet;
    use image::Rgb;
    use sheetcorner_core::LineEquation;

    const EXPECTED_CORNERS: [(f64, f64); 4] =
        [(20.0, 20.0), (180.0, 20.0), (180.0, 180.0), (20.0, 180.0)];

    /// The rectangle edge falls between pixel centres and the pipeline
    /// works at half resolution, so allow a few original pixels of slack.
    const TOLERANCE: f64 = 5.0;

    fn detect_reference_sheet() -> Detection {
        let img = synthetic_sheet(200, 200, (20, 20), (180, 180));
        SheetDetector::new(img, DetectorConfig::default())
            .expect("valid input")
            .detect()
            .expect("sheet detected")
    }

    fn assert_corners_near_expected(detection: &Detection) {
        for (ex, ey) in EXPECTED_CORNERS {
            let hit = detection
                .corners
                .iter()
                .any(|c| (c.x - ex).abs() <= TOLERANCE && (c.y - ey).abs() <= TOLERANCE);
            assert!(hit, "no corner near ({ex}, {ey}): {:?}", detection.corners);
        }
    }

    /// Two steep lines near x = 20, 180 and two shallow ones near y = 20, 180.
    fn assert_boundary_lines(detection: &Detection) {
        let mut verticals = Vec::new();
        let mut horizontals = Vec::new();
        for eq in &detection.equations {
            match eq {
                LineEquation::Vertical { x } => verticals.push(*x),
                LineEquation::Sloped { slope, .. } if slope.abs() > 1.0 => {
                    verticals.push(eq.x_at(100.0).expect("steep line has x"))
                }
                LineEquation::Sloped { .. } => {
                    horizontals.push(eq.y_at(100.0).expect("shallow line has y"))
                }
            }
        }
        verticals.sort_by(f64::total_cmp);
        horizontals.sort_by(f64::total_cmp);

        assert_eq!(verticals.len(), 2, "equations {:?}", detection.equations);
        assert_eq!(horizontals.len(), 2, "equations {:?}", detection.equations);
        assert!((verticals[0] - 20.0).abs() <= TOLERANCE, "{:?}", verticals);
        assert!((verticals[1] - 180.0).abs() <= TOLERANCE, "{:?}", verticals);
        assert!((horizontals[0] - 20.0).abs() <= TOLERANCE, "{:?}", horizontals);
        assert!((horizontals[1] - 180.0).abs() <= TOLERANCE, "{:?}", horizontals);
    }

    #[test]
    fn reference_sheet_yields_four_corners() {
        let detection = detect_reference_sheet();
        assert_eq!(detection.working_size, (100, 100));
        assert_eq!(detection.scale, 0.5);
        assert_corners_near_expected(&detection);
    }

    #[test]
    fn reference_sheet_yields_four_boundary_lines() {
        assert_boundary_lines(&detect_reference_sheet());
    }

    /// Pure white on pure black: most of the frame has zero gradient, so
    /// only the pixels around the boundary feed the threshold mean.
    #[test]
    fn white_sheet_on_black_background() {
        let img = RgbImage::from_fn(200, 200, |x, y| {
            if (20..180).contains(&x) && (20..180).contains(&y) {
                Rgb([255; 3])
            } else {
                Rgb([0; 3])
            }
        });
        let detection = SheetDetector::new(img, DetectorConfig::default())
            .expect("valid input")
            .detect()
            .expect("sheet detected");
        assert_corners_near_expected(&detection);
        assert_boundary_lines(&detection);
    }

    #[test]
    fn detect_from_mask_matches_detect() {
        let img = synthetic_sheet(200, 200, (20, 20), (180, 180));
        let detector = SheetDetector::new(img, DetectorConfig::default()).expect("valid input");
        let mask = detector.edge_mask().expect("edges");
        let from_mask = detector.detect_from_mask(&mask).expect("sheet detected");
        assert_eq!(from_mask, detector.detect().expect("sheet detected"));
    }

    #[test]
    fn corners_satisfy_their_line_equations() {
        let detection = detect_reference_sheet();
        for corner in &detection.corners {
            let (i, j) = corner.lines;
            assert_ne!(i, j);
            assert!(detection.equations[i].distance_to(corner.x, corner.y) < 1e-3);
            assert!(detection.equations[j].distance_to(corner.x, corner.y) < 1e-3);
        }
    }

    #[test]
    fn all_black_image_reports_degenerate_gradient() {
        let img = RgbImage::from_pixel(200, 200, Rgb([0, 0, 0]));
        let detector = SheetDetector::new(img, DetectorConfig::default()).expect("valid input");
        assert!(matches!(detector.detect(), Err(SheetError::DegenerateGradient)));
    }

    #[test]
    fn empty_image_is_invalid_input() {
        let err = SheetDetector::new(RgbImage::new(0, 0), DetectorConfig::default())
            .err()
            .expect("empty image rejected");
        assert!(matches!(err, SheetError::InvalidInput(_)));
    }

    #[test]
    fn undecodable_bytes_are_invalid_input() {
        let err = SheetDetector::from_bytes(b"not an image", DetectorConfig::default())
            .err()
            .expect("garbage rejected");
        assert!(matches!(err, SheetError::InvalidInput(_)));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = DetectorConfig {
            angle_bins: 1,
            ..DetectorConfig::default()
        };
        let err = SheetDetector::new(RgbImage::new(10, 10), config)
            .err()
            .expect("bad config rejected");
        assert!(matches!(err, SheetError::InvalidConfig(_)));
    }

    #[test]
    fn tiny_image_shrinks_to_nothing() {
        let detector =
            SheetDetector::new(RgbImage::new(1, 1), DetectorConfig::default()).expect("valid");
        assert!(matches!(detector.detect(), Err(SheetError::InvalidInput(_))));
    }

    #[test]
    fn resampling_can_be_disabled() {
        let img = synthetic_sheet(100, 100, (10, 10), (90, 90));
        let config = DetectorConfig {
            scale: 0.0,
            ..DetectorConfig::default()
        };
        let detector = SheetDetector::new(img, config).expect("valid");
        assert_eq!(detector.effective_scale(), 1.0);
        let detection = detector.detect().expect("sheet detected");
        assert_eq!(detection.working_size, (100, 100));
        assert_eq!(detection.scale, 1.0);
        for (ex, ey) in [(10.0, 10.0), (90.0, 10.0), (90.0, 90.0), (10.0, 90.0)] {
            assert!(
                detection
                    .corners
                    .iter()
                    .any(|c| (c.x - ex).abs() <= 3.0 && (c.y - ey).abs() <= 3.0),
                "no corner near ({ex}, {ey}): {:?}",
                detection.corners
            );
        }
    }

    #[test]
    fn annotated_copy_has_original_size() {
        let img = synthetic_sheet(200, 200, (20, 20), (180, 180));
        let detector = SheetDetector::new(img, DetectorConfig::default()).expect("valid");
        let detection = detector.detect().expect("sheet detected");
        let annotated = detector.annotate(&detection);
        assert_eq!(annotated.dimensions(), (200, 200));
        assert_ne!(&annotated, detector.image());
    }
}
