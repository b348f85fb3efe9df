// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline — edge extraction, Hough voting, peak extraction, line
// pairing, corner solving, and the detector that chains them.

pub mod corners;
pub mod detector;
pub mod edges;
pub mod hough;
pub mod peaks;
pub mod select;

pub use corners::CornerSolver;
pub use detector::SheetDetector;
pub use edges::{EdgeMask, extract_edges};
pub use hough::ParameterSpace;
pub use peaks::find_peaks;
pub use select::LineSelector;
