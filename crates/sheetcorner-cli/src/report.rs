// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-image results — console text, JSON report entries, and output file
// naming.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sheetcorner_core::Detection;
use sheetcorner_core::error::{Result, SheetError};
use sheetcorner_core::human_errors::{HumanError, Severity};

/// Outcome of one input image, as written to the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection: Option<Detection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageReport {
    pub fn from_result(path: &Path, result: &Result<Detection>) -> Self {
        match result {
            Ok(detection) => Self {
                path: path.to_path_buf(),
                detection: Some(detection.clone()),
                error: None,
            },
            Err(err) => Self {
                path: path.to_path_buf(),
                detection: None,
                error: Some(err.to_string()),
            },
        }
    }

    pub fn succeeded(&self) -> bool {
        self.detection.is_some()
    }
}

/// Console text for a successful detection.
pub fn render_detection(path: &Path, detection: &Detection) -> String {
    let mut out = format!("{}\n  Sheet edges:\n", path.display());
    for (idx, equation) in detection.equations.iter().enumerate() {
        out.push_str(&format!("    line {}: {}\n", idx, equation));
    }
    out.push_str("  Sheet corners:\n");
    for corner in &detection.corners {
        out.push_str(&format!(
            "    ({:.1}, {:.1})  where lines {} and {} meet\n",
            corner.x, corner.y, corner.lines.0, corner.lines.1
        ));
    }
    out
}

/// Console text for a failure, labelled by who has to act on it.
pub fn render_failure(path: Option<&Path>, human: &HumanError) -> String {
    let label = match human.severity {
        Severity::RetakePhoto => "photo",
        Severity::Reconfigure => "settings",
        Severity::System => "system",
    };
    let subject = path.map(|p| format!("{}: ", p.display())).unwrap_or_default();
    format!(
        "{}[{}] {}\n  {}\n",
        subject, label, human.message, human.suggestion
    )
}

/// `<out_dir>/<stem><suffix>.png` for the input `image`.
pub fn output_path(out_dir: &Path, image: &Path, suffix: &str) -> PathBuf {
    let stem = image
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".into());
    out_dir.join(format!("{stem}{suffix}.png"))
}

/// Write every report as one pretty-printed JSON array.
pub fn write_json(path: &Path, reports: &[ImageReport]) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json).map_err(SheetError::from)
}
