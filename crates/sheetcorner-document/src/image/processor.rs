// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image I/O — decode photos from files or memory, resample them, and write
// annotated results back out. Operates on in-memory images using the `image`
// crate.

use image::{DynamicImage, ImageFormat, RgbImage};
use sheetcorner_core::error::{Result, SheetError};
use tracing::{debug, info, instrument};

use super::resample::resample_bilinear;

/// A single decoded photo.
///
/// Transformations consume `self` and return a new `ImageProcessor`, enabling
/// method chaining.
///
/// ```ignore
/// let half = ImageProcessor::open("sheet.jpg")?.resample(0.5).to_png_bytes()?;
/// ```
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// A missing file is an I/O error; a file that exists but does not decode
    /// is invalid input.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let img = image::load_from_memory(&data).map_err(|err| {
            SheetError::InvalidInput(format!("failed to decode {}: {}", path.display(), err))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self { image: img })
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| SheetError::InvalidInput(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Consume the processor and return an 8-bit RGB copy of the image.
    ///
    /// Alpha is dropped and wider channels are narrowed.
    pub fn to_rgb(self) -> RgbImage {
        match self.image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.to_rgb8(),
        }
    }

    // -- Transformations ------------------------------------------------------

    /// Bilinear resample by `scale`; a non-positive scale leaves the image as is.
    #[instrument(skip(self), fields(scale))]
    pub fn resample(self, scale: f64) -> Self {
        let from = (self.width(), self.height());
        let resampled = resample_bilinear(&self.to_rgb(), scale);
        debug!(
            from_w = from.0,
            from_h = from.1,
            new_w = resampled.width(),
            new_h = resampled.height(),
            "Resample complete"
        );
        Self::from_rgb(resampled)
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as PNG bytes.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|err| SheetError::ImageError(format!("PNG encoding failed: {}", err)))?;
        Ok(buffer)
    }

    /// Write the image to a file. The format is inferred from the file extension.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.image.save(path.as_ref()).map_err(|err| {
            SheetError::ImageError(format!(
                "failed to save image to {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(path = %path.as_ref().display(), "Image written");
        Ok(())
    }
}
