// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label mask rasterization. Polygons are filled (interior and boundary) onto a
// zero-initialised single-channel canvas using `imageproc` drawing routines.

use std::path::Path;

use defectset_core::error::{DefectsetError, Result};
use defectset_core::Polygon;
use image::{GrayImage, ImageFormat, Luma};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point;
use tracing::{debug, instrument};

/// Single-channel label image: 0 is background, any other value is a class id.
#[derive(Debug, Clone)]
pub struct LabelMask {
    canvas: GrayImage,
}

impl LabelMask {
    /// All-background mask of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: GrayImage::new(width, height),
        }
    }

    /// Rasterize every polygon at `value` onto a fresh canvas.
    pub fn from_polygons(width: u32, height: u32, polygons: &[Polygon], value: u8) -> Self {
        let mut mask = Self::new(width, height);
        for polygon in polygons {
            mask.fill_polygon(polygon, value);
        }
        mask
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.canvas
    }

    /// Fill `polygon` with `value`. Points outside the canvas are clipped.
    ///
    /// Degenerate contours still mark their pixels: one point sets a single
    /// pixel and two points draw a segment. Closing points that repeat the
    /// first vertex are ignored.
    pub fn fill_polygon(&mut self, polygon: &Polygon, value: u8) {
        let mut points = polygon.points();
        while points.len() > 1 && points.first() == points.last() {
            points = &points[..points.len() - 1];
        }
        let color = Luma([value]);

        match points {
            [] => {}
            [[x, y]] => match (u32::try_from(*x), u32::try_from(*y)) {
                (Ok(x), Ok(y)) if x < self.width() && y < self.height() => {
                    self.canvas.put_pixel(x, y, color);
                }
                _ => {}
            },
            [[x0, y0], [x1, y1]] => {
                draw_line_segment_mut(
                    &mut self.canvas,
                    (*x0 as f32, *y0 as f32),
                    (*x1 as f32, *y1 as f32),
                    color,
                );
            }
            _ => {
                let poly: Vec<Point<i32>> =
                    points.iter().map(|&[x, y]| Point::new(x, y)).collect();
                draw_polygon_mut(&mut self.canvas, &poly, color);
            }
        }
    }

    /// Number of pixels holding `value`.
    pub fn count(&self, value: u8) -> usize {
        self.canvas.pixels().filter(|p| p.0[0] == value).count()
    }

    /// True when no pixel carries a label.
    pub fn is_background(&self) -> bool {
        self.canvas.pixels().all(|p| p.0[0] == 0)
    }

    /// Write the mask as a PNG file.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn save(&self, path: &Path) -> Result<()> {
        self.canvas
            .save_with_format(path, ImageFormat::Png)
            .map_err(|err| {
                DefectsetError::ImageError(format!(
                    "failed to save label mask to {}: {}",
                    path.display(),
                    err
                ))
            })?;
        debug!(
            width = self.width(),
            height = self.height(),
            "Label mask written"
        );
        Ok(())
    }
}
