// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sheetcorner-document — Locates a rectangular sheet in a photo.
//
// Provides image I/O and bilinear resampling, Sobel edge extraction, a Hough
// accumulator with peak extraction, selection of two parallel line pairs, and
// the corner solver that maps their intersections back to the original photo.

pub mod image;
pub mod scan;

#[cfg(test)]
mod test_support;

// Re-export the primary structs so callers can use `sheetcorner_document::SheetDetector` etc.
pub use image::processor::ImageProcessor;
pub use scan::detector::SheetDetector;
pub use scan::edges::EdgeMask;
pub use scan::hough::ParameterSpace;
