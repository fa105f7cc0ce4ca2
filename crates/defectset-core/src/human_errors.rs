// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the command line.
//
// Every technical error is mapped to a plain summary with a concrete next step.

use crate::error::DefectsetError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Re-running may succeed once the environment recovers (disk space,
    /// transient I/O).
    Transient,
    /// The operator must change an argument or fix the input tree.
    ActionRequired,
    /// The input data itself is unusable as given.
    Permanent,
}

/// A human-readable error with a plain message and an actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// One-line summary.
    pub message: String,
    /// What the operator should try next.
    pub suggestion: String,
    pub severity: Severity,
}

/// Convert a `DefectsetError` into a `HumanError` for terminal output.
pub fn humanize_error(err: &DefectsetError) -> HumanError {
    match err {
        DefectsetError::InvalidConfig(detail) => HumanError {
            message: "The dataset settings are not valid.".into(),
            suggestion: format!(
                "Adjust the command-line flags and run again. ({detail})"
            ),
            severity: Severity::ActionRequired,
        },

        DefectsetError::MissingSourceDir { root, subdir } => HumanError {
            message: format!("{} is not a valid image root.", root.display()),
            suggestion: format!(
                "Each input root needs both `clean/` and `noisy/` folders; `{subdir}/` was not found."
            ),
            severity: Severity::ActionRequired,
        },

        DefectsetError::SourceNotDirectory(path) => HumanError {
            message: format!("{} is not a directory.", path.display()),
            suggestion: "Pass the folder that contains `clean/` and `noisy/`, not a file inside it."
                .into(),
            severity: Severity::ActionRequired,
        },

        DefectsetError::ImageError(_) => HumanError {
            message: "An image could not be read or written.".into(),
            suggestion: "Check that every file in `clean/` and `noisy/` is a valid PNG, then start again with a fresh output directory.".into(),
            severity: Severity::Permanent,
        },

        DefectsetError::DimensionMismatch { name, .. } => HumanError {
            message: format!("The clean and noisy versions of {name} have different sizes."),
            suggestion: "Clean and noisy captures must have identical dimensions. Re-export or remove this pair.".into(),
            severity: Severity::Permanent,
        },

        DefectsetError::Detection(_) => HumanError {
            message: "Defect detection failed on an image pair.".into(),
            suggestion: "Inspect the pair named in the log output; the images may be corrupt.".into(),
            severity: Severity::Permanent,
        },

        DefectsetError::ManifestParse { path, line, .. } => HumanError {
            message: format!("Manifest {} is malformed at line {line}.", path.display()),
            suggestion: "Each line must be `raw_path<TAB>label_path`. Regenerate the dataset to rebuild it.".into(),
            severity: Severity::Permanent,
        },

        DefectsetError::WorkerPool(_) => HumanError {
            message: "The worker threads could not be started.".into(),
            suggestion: "Try a smaller --workers value, or run with --workers 1.".into(),
            severity: Severity::ActionRequired,
        },

        DefectsetError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "A file or folder could not be found.".into(),
                suggestion: "Check the input paths. The output directory may be incomplete; start again with a fresh one.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission was denied while reading or writing files.".into(),
                suggestion: "Check permissions on the input roots and the output directory.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "The disk may be full. Free some space and run again into a fresh output directory.".into(),
                severity: Severity::Transient,
            },
        },

        DefectsetError::Serialization(_) => HumanError {
            message: "An annotation document could not be encoded.".into(),
            suggestion: "Run again; if this keeps happening, please report it.".into(),
            severity: Severity::Transient,
        },
    }
}
