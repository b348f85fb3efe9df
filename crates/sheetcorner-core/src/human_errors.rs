// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for people running the detector on their own
// photos.
//
// Every technical error is mapped to plain English with a suggestion about
// what to change (the photo or the configuration). The pipeline is
// deterministic, so nothing here is ever marked as worth retrying unchanged.

use crate::error::SheetError;

/// Who has to act to get past the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A different photo is needed (no sheet, too much clutter, bad file).
    RetakePhoto,
    /// The configuration needs to change.
    Reconfigure,
    /// Environment problem (disk, permissions, encoder).
    System,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the user should try.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `SheetError` into a `HumanError`.
pub fn humanize_error(err: &SheetError) -> HumanError {
    match err {
        SheetError::InvalidInput(detail) => HumanError {
            message: "This file could not be read as a photo.".into(),
            suggestion: format!("Check that the file is a JPEG, PNG or BMP image ({detail})."),
            severity: Severity::RetakePhoto,
        },

        SheetError::InvalidConfig(detail) => HumanError {
            message: "The detector settings are not valid.".into(),
            suggestion: format!("Fix the configuration file or command-line option: {detail}."),
            severity: Severity::Reconfigure,
        },

        SheetError::DegenerateGradient => HumanError {
            message: "The photo is completely flat; there are no edges to follow.".into(),
            suggestion: "Make sure the sheet is visible and lit, then take the photo again."
                .into(),
            severity: Severity::RetakePhoto,
        },

        SheetError::InsufficientLines { pairs_found, .. } => HumanError {
            message: if *pairs_found == 0 {
                "We could not find the sides of the sheet.".into()
            } else {
                "We found two sides of the sheet but not the other two.".into()
            },
            suggestion: "Photograph the sheet on a plain, contrasting background with all four \
                         edges in view, or raise max_kept_lines."
                .into(),
            severity: Severity::RetakePhoto,
        },

        SheetError::DegenerateIntersection { .. } => HumanError {
            message: "The detected sides do not form a proper four-cornered shape.".into(),
            suggestion: "Take the photo more squarely from above, or lower \
                         parallel_tolerance_deg."
                .into(),
            severity: Severity::RetakePhoto,
        },

        SheetError::ImageError(detail) => HumanError {
            message: "The result image could not be written.".into(),
            suggestion: format!("Check the output file name and format ({detail})."),
            severity: Severity::System,
        },

        SheetError::Io(io) => HumanError {
            message: "A file could not be read or written.".into(),
            suggestion: format!("Check that the path exists and is writable ({io})."),
            severity: Severity::System,
        },

        SheetError::Serialization(json) => HumanError {
            message: "A settings or report file is not valid JSON.".into(),
            suggestion: format!("Fix the JSON syntax ({json})."),
            severity: Severity::Reconfigure,
        },
    }
}
