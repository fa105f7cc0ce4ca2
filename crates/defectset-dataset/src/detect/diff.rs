// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image-differencing defect detector — grayscale, blur, absolute difference,
// binary threshold, and outer-contour extraction.

use defectset_core::error::{DefectsetError, Result};
use defectset_core::{DetectorConfig, Polygon};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::filter::gaussian_blur_f32;
use tracing::{debug, instrument};

use super::DefectDetector;

/// Marks pixels whose grayscale values differ by at least a threshold and
/// traces the outer boundary of each changed region.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffDetector {
    config: DetectorConfig,
}

impl DiffDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Binary change map: 255 where `|clean - noisy| >= diff_threshold`, else 0.
    ///
    /// Both inputs must already have the same dimensions.
    pub fn change_map(&self, clean: &GrayImage, noisy: &GrayImage) -> GrayImage {
        let (clean, noisy) = if self.config.blur_sigma > 0.0 {
            (
                gaussian_blur_f32(clean, self.config.blur_sigma),
                gaussian_blur_f32(noisy, self.config.blur_sigma),
            )
        } else {
            (clean.clone(), noisy.clone())
        };

        // A zero threshold would mark every pixel; treat it as "any change".
        let threshold = self.config.diff_threshold.max(1);
        let (width, height) = clean.dimensions();
        let mut output = GrayImage::new(width, height);
        for ((out, a), b) in output
            .pixels_mut()
            .zip(clean.pixels())
            .zip(noisy.pixels())
        {
            let delta = a.0[0].abs_diff(b.0[0]);
            *out = Luma([if delta >= threshold { 255 } else { 0 }]);
        }
        output
    }
}

impl DefectDetector for DiffDetector {
    #[instrument(skip_all, fields(width = clean.width(), height = clean.height()))]
    fn detect(&self, clean: &DynamicImage, noisy: &DynamicImage) -> Result<Vec<Polygon>> {
        if clean.width() != noisy.width() || clean.height() != noisy.height() {
            return Err(DefectsetError::DimensionMismatch {
                name: "detector input".into(),
                clean: (clean.width(), clean.height()),
                noisy: (noisy.width(), noisy.height()),
            });
        }

        let changes = self.change_map(&clean.to_luma8(), &noisy.to_luma8());
        let contours = find_contours::<i32>(&changes);
        let traced = contours.len();

        let polygons: Vec<Polygon> = contours
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .map(|c| Polygon::new(c.points.iter().map(|p| [p.x, p.y]).collect()))
            .filter(|polygon| polygon.area() >= f64::from(self.config.min_area))
            .collect();

        debug!(traced, kept = polygons.len(), "Difference contours extracted");
        Ok(polygons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn gray(width: u32, height: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([value]))
    }

    fn exact() -> DiffDetector {
        DiffDetector::new(DetectorConfig {
            diff_threshold: 30,
            blur_sigma: 0.0,
            min_area: 0.0,
        })
    }

    #[test]
    fn identical_images_yield_no_contours() {
        let img = DynamicImage::ImageLuma8(gray(32, 24, 120));
        let polygons = DiffDetector::default().detect(&img, &img).expect("detect");
        assert!(polygons.is_empty());
    }

    #[test]
    fn single_blob_yields_one_outer_contour() {
        let clean = gray(40, 40, 100);
        let mut noisy = clean.clone();
        for y in 10..20 {
            for x in 12..25 {
                noisy.put_pixel(x, y, Luma([220]));
            }
        }

        let polygons = exact()
            .detect(
                &DynamicImage::ImageLuma8(clean),
                &DynamicImage::ImageLuma8(noisy),
            )
            .expect("detect");

        assert_eq!(polygons.len(), 1);
        let xs: Vec<i32> = polygons[0].points().iter().map(|p| p[0]).collect();
        let ys: Vec<i32> = polygons[0].points().iter().map(|p| p[1]).collect();
        assert_eq!(xs.iter().min(), Some(&12));
        assert_eq!(xs.iter().max(), Some(&24));
        assert_eq!(ys.iter().min(), Some(&10));
        assert_eq!(ys.iter().max(), Some(&19));
    }

    #[test]
    fn blob_with_hole_reports_only_outer_border() {
        let clean = gray(30, 30, 0);
        let mut noisy = clean.clone();
        for y in 5..25 {
            for x in 5..25 {
                let inner = (10..20).contains(&x) && (10..20).contains(&y);
                if !inner {
                    noisy.put_pixel(x, y, Luma([255]));
                }
            }
        }

        let polygons = exact()
            .detect(
                &DynamicImage::ImageLuma8(clean),
                &DynamicImage::ImageLuma8(noisy),
            )
            .expect("detect");
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn small_differences_below_threshold_are_ignored() {
        let clean = gray(16, 16, 100);
        let mut noisy = clean.clone();
        noisy.put_pixel(4, 4, Luma([110]));

        let polygons = exact()
            .detect(
                &DynamicImage::ImageLuma8(clean),
                &DynamicImage::ImageLuma8(noisy),
            )
            .expect("detect");
        assert!(polygons.is_empty());
    }

    #[test]
    fn min_area_drops_specks() {
        let clean = gray(20, 20, 0);
        let mut noisy = clean.clone();
        noisy.put_pixel(2, 2, Luma([255]));
        for y in 10..16 {
            for x in 10..16 {
                noisy.put_pixel(x, y, Luma([255]));
            }
        }

        let detector = DiffDetector::new(DetectorConfig {
            min_area: 4.0,
            ..exact().config
        });
        let polygons = detector
            .detect(
                &DynamicImage::ImageLuma8(clean),
                &DynamicImage::ImageLuma8(noisy),
            )
            .expect("detect");
        assert_eq!(polygons.len(), 1);
        assert!(polygons[0].area() >= 4.0);
    }

    #[test]
    fn colour_inputs_are_compared_in_grayscale() {
        let clean = RgbImage::from_pixel(12, 12, image::Rgb([50, 50, 50]));
        let mut noisy = clean.clone();
        for y in 3..8 {
            for x in 3..8 {
                noisy.put_pixel(x, y, image::Rgb([250, 250, 250]));
            }
        }
        let polygons = exact()
            .detect(
                &DynamicImage::ImageRgb8(clean),
                &DynamicImage::ImageRgb8(noisy),
            )
            .expect("detect");
        assert_eq!(polygons.len(), 1);
    }

    #[test]
    fn mismatched_sizes_are_rejected() {
        let a = DynamicImage::ImageLuma8(gray(8, 8, 0));
        let b = DynamicImage::ImageLuma8(gray(8, 9, 0));
        match DiffDetector::default().detect(&a, &b) {
            Err(DefectsetError::DimensionMismatch { clean, noisy, .. }) => {
                assert_eq!(clean, (8, 8));
                assert_eq!(noisy, (8, 9));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }
}
