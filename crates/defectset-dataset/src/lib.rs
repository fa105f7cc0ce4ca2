// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// defectset-dataset — Dataset assembly for the Defectset builder.
//
// Discovers clean/noisy pairs under source roots, shuffles and partitions them
// into train/val/test, annotates each pair through a pluggable defect detector
// (raw image copy, polygon JSON, rasterized label mask), and writes per-split
// manifests in the Cityscapes-style directory layout.

pub mod annotate;
pub mod detect;
pub mod discovery;
pub mod manifest;
pub mod partition;
pub mod pipeline;
pub mod raster;

// Re-export the primary entry points so callers can use
// `defectset_dataset::DatasetBuilder` etc.
pub use annotate::{AnnotationGenerator, ArtifactPaths, PairOutcome};
pub use detect::{DefectDetector, DiffDetector};
pub use discovery::{SourceRoot, discover_pairs};
pub use manifest::{read_manifest, write_manifest};
pub use partition::{Partition, partition, split_sizes};
pub use pipeline::{DatasetBuilder, RunSummary, SplitSummary};
pub use raster::LabelMask;
