// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Annotation generation — per pair, copy the noisy capture as the raw image,
// write the polygon document, and rasterize the label mask, all under the
// Cityscapes-style `leftImg8bit/` and `gtFine/` trees.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use defectset_core::error::{DefectsetError, Result};
use defectset_core::{
    Annotation, IMAGE_EXTENSION, ImagePair, LABEL_ID, LABEL_NAME, PathPair, Split,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPool;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::detect::DefectDetector;
use crate::raster::{LabelMask, open_image};

/// Top-level directory holding raw input images.
pub const IMAGES_ROOT: &str = "leftImg8bit";
/// Top-level directory holding annotations and label masks.
pub const LABELS_ROOT: &str = "gtFine";

const PROGRESS_TEMPLATE: &str = "{prefix:>5} [{elapsed_precise}] [{bar:40}] {pos}/{len} pairs";

/// Output-root-relative directory for raw images of `split`.
pub fn images_dir(split: Split) -> String {
    format!("{IMAGES_ROOT}/{LABEL_NAME}/{split}")
}

/// Output-root-relative directory for annotations of `split`.
pub fn labels_dir(split: Split) -> String {
    format!("{LABELS_ROOT}/{LABEL_NAME}/{split}")
}

/// The three artifacts written for one pair, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// `leftImg8bit/defect/<split>/<id>_leftImg8bit.png`
    pub raw: String,
    /// `gtFine/defect/<split>/<id>_polygons.json`
    pub polygons: String,
    /// `gtFine/defect/<split>/<id>_labelIds.png`
    pub label: String,
}

impl ArtifactPaths {
    pub fn for_pair(pair: &ImagePair, split: Split) -> Self {
        let id = pair.image_id();
        let images = images_dir(split);
        let labels = labels_dir(split);
        Self {
            raw: format!("{images}/{id}_leftImg8bit.{IMAGE_EXTENSION}"),
            polygons: format!("{labels}/{id}_polygons.json"),
            label: format!("{labels}/{id}_labelIds.{IMAGE_EXTENSION}"),
        }
    }

    pub fn path_pair(&self) -> PathPair {
        PathPair {
            raw: self.raw.clone(),
            label: self.label.clone(),
        }
    }
}

/// Result of annotating one pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairOutcome {
    pub paths: PathPair,
    /// Number of defect polygons found.
    pub defects: usize,
}

/// Writes raw images, polygon documents, and label masks under an output root.
pub struct AnnotationGenerator<'a> {
    output_root: PathBuf,
    detector: &'a dyn DefectDetector,
    pool: Option<ThreadPool>,
    show_progress: bool,
}

impl<'a> AnnotationGenerator<'a> {
    pub fn new(output_root: impl Into<PathBuf>, detector: &'a dyn DefectDetector) -> Self {
        Self {
            output_root: output_root.into(),
            detector,
            pool: None,
            show_progress: false,
        }
    }

    /// Process pairs on a dedicated pool of `workers` threads. A single worker
    /// keeps processing on the calling thread.
    pub fn with_workers(mut self, workers: usize) -> Result<Self> {
        self.pool = if workers > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|idx| format!("defectset-worker-{idx}"))
                .build()
                .map_err(|err| DefectsetError::WorkerPool(err.to_string()))?;
            Some(pool)
        } else {
            None
        };
        Ok(self)
    }

    /// Draw a per-split progress bar on stderr while pairs are annotated.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn progress_bar(&self, pairs: usize, split: Split) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(pairs as u64).with_prefix(split.as_str());
        if let Ok(style) = ProgressStyle::with_template(PROGRESS_TEMPLATE) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }

    /// Create the image and label directories for `split`. Safe to call
    /// repeatedly and from several threads.
    pub fn prepare_split(&self, split: Split) -> Result<()> {
        fs::create_dir_all(self.output_root.join(images_dir(split)))?;
        fs::create_dir_all(self.output_root.join(labels_dir(split)))?;
        Ok(())
    }

    /// Annotate every pair of one split.
    ///
    /// Outcomes are returned in input order even when processed in parallel.
    /// The first failing pair aborts the split.
    #[instrument(skip_all, fields(split = %split, pairs = pairs.len()))]
    pub fn generate_split(&self, pairs: &[ImagePair], split: Split) -> Result<Vec<PairOutcome>> {
        info!("Generating for {split} split");
        self.prepare_split(split)?;

        let progress = self.progress_bar(pairs.len(), split);
        let result = match &self.pool {
            Some(pool) => pool.install(|| {
                pairs
                    .par_iter()
                    .map(|pair| self.process_pair(pair, split))
                    .inspect(|_| progress.inc(1))
                    .collect::<Result<Vec<_>>>()
            }),
            None => pairs
                .iter()
                .map(|pair| self.process_pair(pair, split))
                .inspect(|_| progress.inc(1))
                .collect::<Result<Vec<_>>>(),
        };
        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.abandon(),
        }
        let outcomes = result?;

        let defects: usize = outcomes.iter().map(|o| o.defects).sum();
        info!(defects, "Split annotated");
        Ok(outcomes)
    }

    /// Annotate a single pair. The split directories must already exist.
    pub fn process_pair(&self, pair: &ImagePair, split: Split) -> Result<PairOutcome> {
        let paths = ArtifactPaths::for_pair(pair, split);
        let noisy_path = pair.noisy_path();

        let clean = open_image(pair.clean_path())?;
        let noisy = open_image(&noisy_path)?;
        if clean.width() != noisy.width() || clean.height() != noisy.height() {
            return Err(DefectsetError::DimensionMismatch {
                name: format!("{}/{}", pair.collection_id, pair.filename),
                clean: (clean.width(), clean.height()),
                noisy: (noisy.width(), noisy.height()),
            });
        }

        let polygons = self.detector.detect(&clean, &noisy)?;
        let (width, height) = (noisy.width(), noisy.height());

        // The noisy capture is the model input; copy it untouched.
        fs::copy(&noisy_path, self.output_root.join(&paths.raw))?;

        let annotation = Annotation::from_polygons(width, height, &polygons);
        write_json(&self.output_root.join(&paths.polygons), &annotation)?;

        LabelMask::from_polygons(width, height, &polygons, LABEL_ID)
            .save(&self.output_root.join(&paths.label))?;

        debug!(
            id = %pair.image_id(),
            defects = polygons.len(),
            "Pair annotated"
        );
        Ok(PairOutcome {
            paths: paths.path_pair(),
            defects: polygons.len(),
        })
    }
}

fn write_json(path: &Path, annotation: &Annotation) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, annotation)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
