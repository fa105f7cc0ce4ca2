// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dataset build orchestration.
//
// validate config -> open roots -> discover -> seeded shuffle -> cap ->
// partition -> per split: annotate + manifest.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use defectset_core::error::Result;
use defectset_core::{DatasetConfig, PathPair, Split};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::annotate::AnnotationGenerator;
use crate::detect::{DefectDetector, DiffDetector};
use crate::discovery::{SourceRoot, discover_pairs};
use crate::manifest::write_manifest;
use crate::partition::{partition, shuffle_pool, truncate_pool};

/// Per-split totals reported after a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub split: Split,
    /// Pairs assigned to the split.
    pub pairs: usize,
    /// Defect polygons found across those pairs.
    pub defects: usize,
    pub manifest: PathBuf,
}

/// Outcome of a completed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub output_root: PathBuf,
    /// Pairs discovered before the optional cap.
    pub discovered_pairs: usize,
    /// Pairs processed across all splits.
    pub total_pairs: usize,
    pub splits: Vec<SplitSummary>,
}

impl RunSummary {
    pub fn split(&self, split: Split) -> Option<&SplitSummary> {
        self.splits.iter().find(|s| s.split == split)
    }

    /// Write the summary as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

/// Builds a dataset from one or more source roots.
///
/// ```ignore
/// let summary = DatasetBuilder::new(DatasetConfig::default())
///     .run(&["captures/lot1", "captures/lot2"])?;
/// ```
pub struct DatasetBuilder {
    config: DatasetConfig,
    detector: Box<dyn DefectDetector>,
}

impl DatasetBuilder {
    /// Builder using the differencing detector configured by `config.detector`.
    pub fn new(config: DatasetConfig) -> Self {
        let detector = Box::new(DiffDetector::new(config.detector));
        Self { config, detector }
    }

    /// Replace the defect detector.
    pub fn with_detector(mut self, detector: Box<dyn DefectDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Run the whole build. Any failing pair aborts the run; artifacts already
    /// written are left in place.
    #[instrument(skip_all, fields(roots = roots.len(), seed = self.config.seed))]
    pub fn run<P: AsRef<Path>>(&self, roots: &[P]) -> Result<RunSummary> {
        self.config.validate()?;
        let ratios = self.config.split_ratios();

        let sources = roots
            .iter()
            .map(SourceRoot::open)
            .collect::<Result<Vec<_>>>()?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut pool = discover_pairs(&sources)?;
        let discovered_pairs = pool.len();
        shuffle_pool(&mut pool, &mut rng);
        truncate_pool(&mut pool, self.config.limit);
        info!(
            discovered = discovered_pairs,
            selected = pool.len(),
            "Pair pool prepared"
        );

        let dataset = partition(pool, &ratios);
        let output_root = self.config.output_dir.clone();
        let generator = AnnotationGenerator::new(&output_root, self.detector.as_ref())
            .with_progress(self.config.progress)
            .with_workers(self.config.workers)?;

        let mut splits = Vec::with_capacity(Split::ALL.len());
        for (split, pairs) in dataset.iter() {
            let outcomes = generator.generate_split(pairs, split)?;
            let path_pairs: Vec<PathPair> = outcomes.iter().map(|o| o.paths.clone()).collect();
            let manifest = write_manifest(&output_root, split, &path_pairs)?;
            splits.push(SplitSummary {
                split,
                pairs: outcomes.len(),
                defects: outcomes.iter().map(|o| o.defects).sum(),
                manifest,
            });
        }

        let summary = RunSummary {
            output_root,
            discovered_pairs,
            total_pairs: dataset.total(),
            splits,
        };
        info!(
            output = %summary.output_root.display(),
            pairs = summary.total_pairs,
            "Results saved in {}",
            summary.output_root.display()
        );
        Ok(summary)
    }
}
