// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Split manifests — `list/<split>.lst`, one `raw<TAB>label` line per pair.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use defectset_core::error::{DefectsetError, Result};
use defectset_core::{PathPair, Split};
use tracing::{info, instrument};

/// Directory under the output root that holds the manifests.
pub const MANIFEST_DIR: &str = "list";

/// Location of the manifest for `split`.
pub fn manifest_path(output_root: &Path, split: Split) -> PathBuf {
    output_root.join(MANIFEST_DIR).join(format!("{split}.lst"))
}

/// Write the manifest for `split`, preserving the order of `pairs`.
///
/// An empty split still produces an (empty) file.
#[instrument(skip_all, fields(split = %split, pairs = pairs.len()))]
pub fn write_manifest(output_root: &Path, split: Split, pairs: &[PathPair]) -> Result<PathBuf> {
    let path = manifest_path(output_root, split);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    for pair in pairs {
        writeln!(writer, "{}\t{}", pair.raw, pair.label)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "Manifest written");
    Ok(path)
}

/// Parse a manifest back into its path pairs. Blank lines are skipped.
pub fn read_manifest(path: &Path) -> Result<Vec<PathPair>> {
    let reader = BufReader::new(File::open(path)?);
    let mut pairs = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split('\t');
        match (fields.next(), fields.next(), fields.next()) {
            (Some(raw), Some(label), None) if !raw.is_empty() && !label.is_empty() => {
                pairs.push(PathPair {
                    raw: raw.to_owned(),
                    label: label.to_owned(),
                });
            }
            _ => {
                return Err(DefectsetError::ManifestParse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    detail: "expected `raw_path<TAB>label_path`".into(),
                });
            }
        }
    }
    Ok(pairs)
}
