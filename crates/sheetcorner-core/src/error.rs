// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Sheetcorner.

use thiserror::Error;

use crate::types::Line;

/// Top-level error type for all Sheetcorner operations.
#[derive(Debug, Error)]
pub enum SheetError {
    // -- Input / configuration --
    #[error("invalid input image: {0}")]
    InvalidInput(String),

    #[error("invalid detector configuration: {0}")]
    InvalidConfig(String),

    // -- Detection failures --
    #[error("no pixel has a positive gradient magnitude; the image has no edges")]
    DegenerateGradient,

    #[error(
        "found {pairs_found} of 2 parallel line pairs after keeping {} lines",
        kept.len()
    )]
    InsufficientLines {
        /// Every line accepted before the search gave up, in keep order.
        kept: Vec<Line>,
        pairs_found: usize,
    },

    #[error("degenerate line intersection: {detail}")]
    DegenerateIntersection {
        /// Indices of the offending selected lines, when a single pair is to blame.
        pair: Option<(usize, usize)>,
        detail: String,
    },

    // -- I/O collaborators --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SheetError>;
