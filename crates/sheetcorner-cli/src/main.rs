// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// sheetcorner — find the edges and corners of a photographed sheet.
//
// Entry point. Initialises logging, parses the command line, and runs the
// detector over every input photo in turn.

mod cli;
mod report;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use image::DynamicImage;
use sheetcorner_core::error::Result;
use sheetcorner_core::human_errors::humanize_error;
use sheetcorner_core::{DetectorConfig, Detection};
use sheetcorner_document::image::annotate::annotate_with_radius;
use sheetcorner_document::{ImageProcessor, SheetDetector};
use tracing::{error, info, instrument};

use cli::{Cli, Commands, DetectArgs};
use report::{ImageReport, output_path, render_detection, render_failure, write_json};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Config => run_config(),
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            report_failure(None, &err);
            ExitCode::FAILURE
        }
    }
}

// ── config ─────────────────────────────────────────────────────────────

fn run_config() -> Result<ExitCode> {
    println!("{}", serde_json::to_string_pretty(&DetectorConfig::default())?);
    Ok(ExitCode::SUCCESS)
}

// ── detect ─────────────────────────────────────────────────────────────

/// Process every image; one failure does not stop the batch.
fn run_detect(args: &DetectArgs) -> Result<ExitCode> {
    let config = args.detector_config()?;
    if let Some(dir) = &args.out_dir {
        std::fs::create_dir_all(dir)?;
    }
    info!(images = args.images.len(), "sheetcorner starting");

    let mut reports = Vec::with_capacity(args.images.len());
    for path in &args.images {
        let result = process_image(path, &config, args);
        match &result {
            Ok(detection) => print!("{}", render_detection(path, detection)),
            Err(err) => report_failure(Some(path), err),
        }
        reports.push(ImageReport::from_result(path, &result));
    }

    if let Some(json) = &args.json {
        write_json(json, &reports)?;
        info!(path = %json.display(), "JSON report written");
    }

    let failed = reports.iter().filter(|r| !r.succeeded()).count();
    info!(total = reports.len(), failed, "Batch finished");
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[instrument(skip(config, args), fields(path = %path.display()))]
fn process_image(path: &Path, config: &DetectorConfig, args: &DetectArgs) -> Result<Detection> {
    let detector = SheetDetector::open(path, config.clone())?;

    let detection = match (&args.out_dir, args.edges) {
        // The edge mask is useful precisely when detection fails, so write it first.
        (Some(dir), true) => {
            let mask = detector.edge_mask()?;
            ImageProcessor::from_dynamic(DynamicImage::ImageLuma8(mask.to_gray_image()))
                .save(output_path(dir, path, "_edges"))?;
            detector.detect_from_mask(&mask)?
        }
        _ => detector.detect()?,
    };

    if let Some(dir) = &args.out_dir {
        let annotated = annotate_with_radius(detector.image(), &detection, args.marker_radius);
        ImageProcessor::from_rgb(annotated).save(output_path(dir, path, "_corners"))?;
    }
    Ok(detection)
}

fn report_failure(path: Option<&Path>, err: &sheetcorner_core::SheetError) {
    match path {
        Some(path) => error!(path = %path.display(), error = %err, "Detection failed"),
        None => error!(error = %err, "sheetcorner failed"),
    }
    eprint!("{}", render_failure(path, &humanize_error(err)));
}
