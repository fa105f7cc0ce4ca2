// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pair discovery — validates `<root>/clean` + `<root>/noisy` source layouts and
// joins their image file names.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use defectset_core::error::{DefectsetError, Result};
use defectset_core::{IMAGE_EXTENSION, ImagePair};
use tracing::{debug, info, instrument, warn};

/// Name of the reference-capture subdirectory.
pub const CLEAN_DIR: &str = "clean";
/// Name of the defect-capture subdirectory.
pub const NOISY_DIR: &str = "noisy";

/// A validated input root containing `clean/` and `noisy/` subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRoot {
    root: PathBuf,
    collection_id: String,
}

impl SourceRoot {
    /// Check the directory layout and derive the collection id from the root's
    /// final path component.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(DefectsetError::SourceNotDirectory(root));
        }
        for subdir in [CLEAN_DIR, NOISY_DIR] {
            if !root.join(subdir).is_dir() {
                return Err(DefectsetError::MissingSourceDir { root, subdir });
            }
        }

        // `Path::file_name` already ignores trailing separators; fall back to
        // the canonical path for roots like `.`.
        let collection_id = match root.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => std::fs::canonicalize(&root)?
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        };

        Ok(Self {
            root,
            collection_id,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn clean_dir(&self) -> PathBuf {
        self.root.join(CLEAN_DIR)
    }

    pub fn noisy_dir(&self) -> PathBuf {
        self.root.join(NOISY_DIR)
    }

    /// Every file name present in both `clean/` and `noisy/`, sorted
    /// lexicographically.
    #[instrument(skip(self), fields(root = %self.path().display()))]
    pub fn discover(&self) -> Result<Vec<ImagePair>> {
        let clean_dir = self.clean_dir();
        let noisy_dir = self.noisy_dir();

        let clean = list_images(&clean_dir)?;
        let noisy = list_images(&noisy_dir)?;
        debug!(clean = clean.len(), noisy = noisy.len(), "Images listed");

        let pairs: Vec<ImagePair> = clean
            .intersection(&noisy)
            .map(|filename| ImagePair {
                collection_id: self.collection_id.clone(),
                clean_dir: clean_dir.clone(),
                noisy_dir: noisy_dir.clone(),
                filename: filename.clone(),
            })
            .collect();

        if pairs.is_empty() {
            warn!(
                collection = %self.collection_id,
                root = %self.path().display(),
                "No matching clean/noisy images found"
            );
        } else {
            info!(
                collection = %self.collection_id,
                pairs = pairs.len(),
                "Image pairs discovered"
            );
        }
        Ok(pairs)
    }
}

/// Discover pairs across several roots, concatenated in argument order.
pub fn discover_pairs(roots: &[SourceRoot]) -> Result<Vec<ImagePair>> {
    let mut pairs = Vec::new();
    for root in roots {
        pairs.extend(root.discover()?);
    }
    Ok(pairs)
}

/// File names of regular files in `dir` with the dataset image extension.
///
/// The returned set iterates in lexicographic order.
fn list_images(dir: &Path) -> Result<BTreeSet<String>> {
    let mut names = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(IMAGE_EXTENSION) {
            continue;
        }
        match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => {
                names.insert(name.to_owned());
            }
            None => warn!(
                path = %path.display(),
                "Skipping image whose file name is not valid UTF-8"
            ),
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn make_root(base: &Path, name: &str, clean: &[&str], noisy: &[&str]) -> PathBuf {
        let root = base.join(name);
        fs::create_dir_all(root.join(CLEAN_DIR)).expect("mkdir clean");
        fs::create_dir_all(root.join(NOISY_DIR)).expect("mkdir noisy");
        for file in clean {
            fs::write(root.join(CLEAN_DIR).join(file), b"").expect("write clean");
        }
        for file in noisy {
            fs::write(root.join(NOISY_DIR).join(file), b"").expect("write noisy");
        }
        root
    }

    #[test]
    fn join_keeps_only_shared_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = make_root(dir.path(), "lot1", &["a.png", "b.png"], &["b.png", "c.png"]);

        let pairs = SourceRoot::open(&root).expect("open").discover().expect("discover");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].filename, "b.png");
        assert_eq!(pairs[0].collection_id, "lot1");
        assert_eq!(pairs[0].clean_path(), root.join("clean").join("b.png"));
        assert_eq!(pairs[0].noisy_path(), root.join("noisy").join("b.png"));
    }

    #[test]
    fn other_extensions_and_directories_are_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = make_root(
            dir.path(),
            "lot2",
            &["a.png", "a.jpg", "notes.txt", "b.PNG"],
            &["a.png", "a.jpg", "notes.txt", "b.PNG"],
        );
        fs::create_dir_all(root.join(CLEAN_DIR).join("sub.png")).expect("mkdir");
        fs::create_dir_all(root.join(NOISY_DIR).join("sub.png")).expect("mkdir");

        let pairs = SourceRoot::open(&root).expect("open").discover().expect("discover");
        let names: Vec<_> = pairs.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, ["a.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let root = make_root(dir.path(), "lot5", &["ok.png"], &["ok.png"]);
        let lossy = OsStr::from_bytes(b"bad\xff.png");
        fs::write(root.join(CLEAN_DIR).join(lossy), b"").expect("write clean");
        fs::write(root.join(NOISY_DIR).join(lossy), b"").expect("write noisy");

        let pairs = SourceRoot::open(&root).expect("open").discover().expect("discover");
        let names: Vec<_> = pairs.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(names, ["ok.png"]);
    }

    #[test]
    fn pairs_are_sorted_lexicographically() {
        let dir = tempfile::tempdir().expect("tempdir");
        let names = ["z.png", "a10.png", "a2.png", "m.png"];
        let root = make_root(dir.path(), "lot3", &names, &names);

        let pairs = SourceRoot::open(&root).expect("open").discover().expect("discover");
        let found: Vec<_> = pairs.iter().map(|p| p.filename.as_str()).collect();
        assert_eq!(found, ["a10.png", "a2.png", "m.png", "z.png"]);
    }

    #[test]
    fn missing_noisy_dir_fails_fast() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("broken");
        fs::create_dir_all(root.join(CLEAN_DIR)).expect("mkdir");

        match SourceRoot::open(&root) {
            Err(DefectsetError::MissingSourceDir { subdir, .. }) => assert_eq!(subdir, "noisy"),
            other => panic!("expected MissingSourceDir, got {other:?}"),
        }
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("plain.png");
        fs::write(&file, b"").expect("write");
        assert!(matches!(
            SourceRoot::open(&file),
            Err(DefectsetError::SourceNotDirectory(_))
        ));
    }

    #[test]
    fn trailing_separator_keeps_collection_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = make_root(dir.path(), "lot4", &[], &[]);
        let with_slash = PathBuf::from(format!("{}/", root.display()));

        let source = SourceRoot::open(&with_slash).expect("open");
        assert_eq!(source.collection_id(), "lot4");
        assert_eq!(source.path(), with_slash.as_path());
        assert!(source.discover().expect("discover").is_empty());
    }

    #[test]
    fn roots_are_concatenated_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = make_root(dir.path(), "first", &["b.png"], &["b.png"]);
        let second = make_root(dir.path(), "second", &["a.png"], &["a.png"]);

        let roots = vec![
            SourceRoot::open(&first).expect("open"),
            SourceRoot::open(&second).expect("open"),
        ];
        let pairs = discover_pairs(&roots).expect("discover");
        let ids: Vec<_> = pairs.iter().map(|p| p.image_id()).collect();
        assert_eq!(ids, ["first_b", "second_a"]);
    }
}
