// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Defect detection capability.
//
// The dataset pipeline only depends on the `DefectDetector` trait; the
// differencing detector is the default implementation and tests inject fixed
// contours instead.

pub mod diff;

pub use diff::DiffDetector;

use defectset_core::Polygon;
use defectset_core::error::Result;
use image::DynamicImage;

/// Finds regions where a noisy capture differs from its clean reference.
///
/// Implementations receive two images of identical dimensions and return one
/// closed polygon per difference region. An empty result means "no defect"
/// and is not an error.
pub trait DefectDetector: Send + Sync {
    fn detect(&self, clean: &DynamicImage, noisy: &DynamicImage) -> Result<Vec<Polygon>>;
}

/// Detector that ignores its inputs and returns the same polygons every time.
#[derive(Debug, Clone, Default)]
pub struct FixedDetector {
    polygons: Vec<Polygon>,
}

impl FixedDetector {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }
}

impl DefectDetector for FixedDetector {
    fn detect(&self, _clean: &DynamicImage, _noisy: &DynamicImage) -> Result<Vec<Polygon>> {
        Ok(self.polygons.clone())
    }
}
