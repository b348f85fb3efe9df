// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sheetcorner_core::DetectorConfig;
use sheetcorner_core::error::Result;

#[derive(Parser)]
#[command(name = "sheetcorner")]
#[command(about = "Find the four edges and corners of a photographed sheet of paper")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the sheet in one or more photos.
    Detect(DetectArgs),

    /// Print the default detector configuration as JSON.
    Config,
}

#[derive(Debug, Clone, Args)]
pub struct DetectArgs {
    /// Photos to process, in order.
    #[arg(required = true)]
    pub images: Vec<PathBuf>,

    /// Directory for annotated copies (`<stem>_corners.png`).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Detector configuration (JSON). Defaults are used when omitted.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a JSON report of every image to this file.
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Working-resolution scale factor; 0 disables resampling.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Number of Hough angle bins over half a turn.
    #[arg(long)]
    pub angle_bins: Option<usize>,

    /// Also write the edge mask (`<stem>_edges.png`) to the output directory.
    #[arg(long, requires = "out_dir")]
    pub edges: bool,

    /// Corner marker radius in original-image pixels.
    #[arg(long, default_value_t = sheetcorner_document::image::annotate::MARKER_RADIUS)]
    pub marker_radius: i32,
}

impl DetectArgs {
    /// Load the configuration file (if any) and apply command-line overrides.
    pub fn detector_config(&self) -> Result<DetectorConfig> {
        let mut config = match &self.config {
            Some(path) => DetectorConfig::load(path)?,
            None => DetectorConfig::default(),
        };
        if let Some(scale) = self.scale {
            config.scale = scale;
        }
        if let Some(bins) = self.angle_bins {
            config.angle_bins = bins;
        }
        config.validate()?;
        Ok(config)
    }
}
