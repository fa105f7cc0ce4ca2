// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Defectset.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Defectset operations.
#[derive(Debug, Error)]
pub enum DefectsetError {
    // -- Configuration errors --
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -- Source layout errors --
    #[error("source root {} is missing its `{subdir}` directory", root.display())]
    MissingSourceDir { root: PathBuf, subdir: &'static str },

    #[error("source root {} is not a directory", .0.display())]
    SourceNotDirectory(PathBuf),

    // -- Image errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("image size mismatch for {name}: clean is {clean:?}, noisy is {noisy:?}")]
    DimensionMismatch {
        name: String,
        clean: (u32, u32),
        noisy: (u32, u32),
    },

    /// Raised by `DefectDetector` implementations that cannot process a pair.
    #[error("defect detection failed: {0}")]
    Detection(String),

    // -- Output errors --
    #[error("malformed manifest {}:{line}: {detail}", path.display())]
    ManifestParse {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    #[error("worker pool error: {0}")]
    WorkerPool(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DefectsetError>;
