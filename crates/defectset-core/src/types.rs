// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Defectset dataset builder.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DefectsetError, Result};

/// Class name written into every polygon annotation.
pub const LABEL_NAME: &str = "defect";

/// Pixel value used for defect regions in label masks.
pub const LABEL_ID: u8 = 1;

/// The single image format accepted on input and produced on output.
pub const IMAGE_EXTENSION: &str = "png";

/// Default random seed, kept stable so default runs are reproducible.
pub const DEFAULT_SEED: u64 = 9487;

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// A clean/noisy capture pair bound by a shared file name.
///
/// Identity is `(collection_id, filename)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePair {
    /// Base name of the source root the pair was discovered in.
    pub collection_id: String,
    pub clean_dir: PathBuf,
    pub noisy_dir: PathBuf,
    /// File name (not path) present in both `clean_dir` and `noisy_dir`.
    pub filename: String,
}

impl ImagePair {
    pub fn clean_path(&self) -> PathBuf {
        self.clean_dir.join(&self.filename)
    }

    pub fn noisy_path(&self) -> PathBuf {
        self.noisy_dir.join(&self.filename)
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.filename)
    }

    /// Stable identifier `{collection_id}_{stem}` used for output file names.
    pub fn image_id(&self) -> String {
        format!("{}_{}", self.collection_id, self.stem())
    }
}

/// Named dataset partitions, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    Train,
    Val,
    Test,
}

impl Split {
    /// All splits in the order the partitioner fills them.
    pub const ALL: [Split; 3] = [Split::Train, Split::Val, Split::Test];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split fractions, positionally aligned with [`Split::ALL`].
///
/// The partitioner gives the last split whatever remains after flooring the
/// others, so the fractions need not sum to exactly 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitRatios {
    pub train: f64,
    pub val: f64,
    pub test: f64,
}

impl SplitRatios {
    /// Derive ratios from the held-out fractions; train takes `1 - val - test`.
    pub fn from_holdout(val: f64, test: f64) -> Self {
        Self {
            train: 1.0 - val - test,
            val,
            test,
        }
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.train, self.val, self.test]
    }

    pub fn ratio(&self, split: Split) -> f64 {
        match split {
            Split::Train => self.train,
            Split::Val => self.val,
            Split::Test => self.test,
        }
    }

    /// Reject non-finite or out-of-range fractions and held-out fractions
    /// that leave no room for training data.
    pub fn validate(&self) -> Result<()> {
        for split in Split::ALL {
            let ratio = self.ratio(split);
            if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
                return Err(DefectsetError::InvalidConfig(format!(
                    "{split} ratio must be within [0, 1], got {ratio}"
                )));
            }
        }
        if self.val + self.test >= 1.0 {
            return Err(DefectsetError::InvalidConfig(format!(
                "val ({}) + test ({}) must be below 1.0 to leave room for train",
                self.val, self.test
            )));
        }
        Ok(())
    }
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self::from_holdout(0.1, 0.1)
    }
}

/// A 2-D integer point `[x, y]`.
pub type Point = [i32; 2];

/// A closed region boundary as an ordered point sequence.
///
/// Serialised as a bare `[[x, y], ...]` array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Enclosed area via the shoelace formula (always non-negative).
    pub fn area(&self) -> f64 {
        let n = self.0.len();
        if n < 3 {
            return 0.0;
        }
        let mut twice_area = 0i64;
        for i in 0..n {
            let [x0, y0] = self.0[i];
            let [x1, y1] = self.0[(i + 1) % n];
            twice_area += x0 as i64 * y1 as i64 - x1 as i64 * y0 as i64;
        }
        twice_area.abs() as f64 / 2.0
    }
}

/// One labelled region inside an [`Annotation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationObject {
    pub label: String,
    pub polygon: Polygon,
}

/// Polygon document written next to each label mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub img_height: u32,
    pub img_width: u32,
    pub objects: Vec<AnnotationObject>,
}

impl Annotation {
    /// Build an annotation where every polygon carries [`LABEL_NAME`].
    pub fn from_polygons(width: u32, height: u32, polygons: &[Polygon]) -> Self {
        Self {
            img_height: height,
            img_width: width,
            objects: polygons
                .iter()
                .map(|polygon| AnnotationObject {
                    label: LABEL_NAME.to_owned(),
                    polygon: polygon.clone(),
                })
                .collect(),
        }
    }
}

/// Raw image and label mask paths, relative to the output root.
///
/// Paths always use `/` separators so manifests are portable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPair {
    pub raw: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(filename: &str) -> ImagePair {
        ImagePair {
            collection_id: "board7".into(),
            clean_dir: PathBuf::from("/data/board7/clean"),
            noisy_dir: PathBuf::from("/data/board7/noisy"),
            filename: filename.into(),
        }
    }

    #[test]
    fn image_id_strips_extension() {
        assert_eq!(pair("0001.png").image_id(), "board7_0001");
        assert_eq!(pair("a.b.png").image_id(), "board7_a.b");
    }

    #[test]
    fn pair_paths_join_filename() {
        let p = pair("x.png");
        assert_eq!(p.clean_path(), PathBuf::from("/data/board7/clean/x.png"));
        assert_eq!(p.noisy_path(), PathBuf::from("/data/board7/noisy/x.png"));
    }

    #[test]
    fn default_ratios_are_valid() {
        let ratios = SplitRatios::default();
        assert!(ratios.validate().is_ok());
        assert!((ratios.train - 0.8).abs() < 1e-12);
    }

    #[test]
    fn holdout_leaving_no_train_is_rejected() {
        assert!(SplitRatios::from_holdout(0.5, 0.5).validate().is_err());
        assert!(SplitRatios::from_holdout(0.7, 0.4).validate().is_err());
    }

    #[test]
    fn negative_ratio_is_rejected() {
        assert!(SplitRatios::from_holdout(-0.1, 0.1).validate().is_err());
        assert!(SplitRatios::from_holdout(f64::NAN, 0.1).validate().is_err());
    }

    #[test]
    fn split_order_and_names() {
        let names: Vec<_> = Split::ALL.iter().map(|s| s.to_string()).collect();
        assert_eq!(names, ["train", "val", "test"]);
    }

    #[test]
    fn polygon_area_of_square() {
        let square = Polygon::new(vec![[0, 0], [4, 0], [4, 4], [0, 4]]);
        assert_eq!(square.area(), 16.0);
        assert_eq!(Polygon::new(vec![[1, 1], [2, 2]]).area(), 0.0);
    }

    #[test]
    fn annotation_uses_camel_case_field_names() {
        let ann = Annotation::from_polygons(
            640,
            480,
            &[Polygon::new(vec![[1, 2], [3, 4], [5, 6]])],
        );
        let json = serde_json::to_value(&ann).expect("serialize");
        assert_eq!(json["imgHeight"], 480);
        assert_eq!(json["imgWidth"], 640);
        assert_eq!(json["objects"][0]["label"], "defect");
        assert_eq!(
            json["objects"][0]["polygon"],
            serde_json::json!([[1, 2], [3, 4], [5, 6]])
        );
    }

    #[test]
    fn empty_annotation_has_empty_objects() {
        let ann = Annotation::from_polygons(8, 8, &[]);
        let json = serde_json::to_string(&ann).expect("serialize");
        assert_eq!(json, r#"{"imgHeight":8,"imgWidth":8,"objects":[]}"#);
    }
}
