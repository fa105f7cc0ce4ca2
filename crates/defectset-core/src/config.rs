// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dataset build configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{DefectsetError, Result};
use crate::types::{DEFAULT_OUTPUT_DIR, DEFAULT_SEED, SplitRatios};

/// Settings for one dataset build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Fraction of pairs assigned to the validation split.
    pub val_ratio: f64,
    /// Fraction of pairs assigned to the test split.
    pub test_ratio: f64,
    /// Keep only the first N pairs after shuffling.
    pub limit: Option<usize>,
    /// Seed for the shuffle that precedes partitioning.
    pub seed: u64,
    /// Root directory receiving images, annotations, and manifests.
    pub output_dir: PathBuf,
    /// Number of worker threads per split (1 processes pairs in order on the
    /// calling thread).
    pub workers: usize,
    /// Draw per-split progress bars while annotating.
    pub progress: bool,
    /// Parameters for the built-in difference detector.
    pub detector: DetectorConfig,
}

impl DatasetConfig {
    /// Train/val/test fractions, with train taking the remainder.
    pub fn split_ratios(&self) -> SplitRatios {
        SplitRatios::from_holdout(self.val_ratio, self.test_ratio)
    }

    /// Check every setting before any filesystem work starts.
    pub fn validate(&self) -> Result<()> {
        self.split_ratios().validate()?;
        if self.workers == 0 {
            return Err(DefectsetError::InvalidConfig(
                "workers must be at least 1".into(),
            ));
        }
        if self.limit == Some(0) {
            return Err(DefectsetError::InvalidConfig(
                "limit must be at least 1 when given".into(),
            ));
        }
        self.detector.validate()
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            val_ratio: 0.1,
            test_ratio: 0.1,
            limit: None,
            seed: DEFAULT_SEED,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: 1,
            progress: true,
            detector: DetectorConfig::default(),
        }
    }
}

/// Tuning for the image-differencing defect detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum absolute grayscale difference (0-255) that marks a pixel as
    /// changed.
    pub diff_threshold: u8,
    /// Gaussian blur sigma applied to both images before differencing
    /// (0 disables blurring).
    pub blur_sigma: f32,
    /// Contours enclosing less than this many square pixels are dropped.
    pub min_area: f32,
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(DefectsetError::InvalidConfig(format!(
                "blur sigma must be a non-negative number, got {}",
                self.blur_sigma
            )));
        }
        if !self.min_area.is_finite() || self.min_area < 0.0 {
            return Err(DefectsetError::InvalidConfig(format!(
                "minimum contour area must be a non-negative number, got {}",
                self.min_area
            )));
        }
        Ok(())
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            diff_threshold: 30,
            blur_sigma: 1.0,
            min_area: 4.0,
        }
    }
}
