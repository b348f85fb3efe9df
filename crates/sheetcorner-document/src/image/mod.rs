// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decoding, bilinear resampling, and detection overlays.

pub mod annotate;
pub mod processor;
pub mod resample;

pub use processor::ImageProcessor;
