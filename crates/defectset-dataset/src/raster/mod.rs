// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — image loading and label mask rasterization.

pub mod mask;

pub use mask::LabelMask;

use std::path::Path;

use defectset_core::error::{DefectsetError, Result};
use image::DynamicImage;
use tracing::{debug, instrument};

/// Decode an image from disk.
///
/// Decode failures surface as `ImageError` carrying the offending path.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_image(path: impl AsRef<Path>) -> Result<DynamicImage> {
    let img = image::open(path.as_ref()).map_err(|err| {
        DefectsetError::ImageError(format!(
            "failed to open {}: {}",
            path.as_ref().display(),
            err
        ))
    })?;
    debug!(width = img.width(), height = img.height(), "Image loaded");
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn open_image_reads_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.png");
        GrayImage::from_pixel(7, 3, Luma([9u8]))
            .save(&path)
            .expect("save");

        let img = open_image(&path).expect("open");
        assert_eq!((img.width(), img.height()), (7, 3));
    }

    #[test]
    fn open_image_rejects_garbage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").expect("write");

        match open_image(&path) {
            Err(DefectsetError::ImageError(msg)) => assert!(msg.contains("broken.png")),
            other => panic!("expected ImageError, got {other:?}"),
        }
    }
}
