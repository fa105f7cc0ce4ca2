// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Dataset partitioning — seeded shuffle, optional cap, and the floor/remainder
// split rule.

use defectset_core::{Split, SplitRatios};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

/// Shuffle the pool in place with the caller's generator.
pub fn shuffle_pool<T, R: Rng + ?Sized>(pool: &mut [T], rng: &mut R) {
    pool.shuffle(rng);
}

/// Keep only the first `limit` entries, if a limit is given.
pub fn truncate_pool<T>(pool: &mut Vec<T>, limit: Option<usize>) {
    if let Some(limit) = limit {
        pool.truncate(limit);
    }
}

/// Number of entries each split receives from a pool of `total`.
///
/// Every split but the last takes `floor(total * ratio)` entries, clamped to
/// what is left; the last split takes the remainder so nothing is lost to
/// rounding.
pub fn split_sizes(total: usize, ratios: &SplitRatios) -> [usize; 3] {
    let ratios = ratios.as_array();
    let mut sizes = [0usize; 3];
    let mut remaining = total;
    let last = sizes.len() - 1;

    for (idx, ratio) in ratios.iter().enumerate() {
        let size = if idx == last {
            remaining
        } else {
            let floored = (total as f64 * ratio.max(0.0)).floor() as usize;
            floored.min(remaining)
        };
        sizes[idx] = size;
        remaining -= size;
    }
    sizes
}

/// Pool entries grouped by split, in [`Split::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition<T> {
    splits: Vec<(Split, Vec<T>)>,
}

impl<T> Partition<T> {
    /// Entries assigned to `split`.
    pub fn get(&self, split: Split) -> &[T] {
        self.splits
            .iter()
            .find(|(s, _)| *s == split)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    /// Splits and their entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &[T])> {
        self.splits.iter().map(|(s, items)| (*s, items.as_slice()))
    }

    pub fn sizes(&self) -> [usize; 3] {
        Split::ALL.map(|split| self.get(split).len())
    }

    pub fn total(&self) -> usize {
        self.splits.iter().map(|(_, items)| items.len()).sum()
    }
}

/// Slice `pool` into consecutive train/val/test runs by ratio.
///
/// The pool order is preserved inside each split; callers shuffle beforehand.
pub fn partition<T>(pool: Vec<T>, ratios: &SplitRatios) -> Partition<T> {
    let sizes = split_sizes(pool.len(), ratios);
    debug!(
        total = pool.len(),
        train = sizes[0],
        val = sizes[1],
        test = sizes[2],
        "Partitioning pool"
    );

    let mut rest = pool.into_iter();
    let splits = Split::ALL
        .iter()
        .zip(sizes)
        .map(|(split, size)| (*split, rest.by_ref().take(size).collect()))
        .collect();

    Partition { splits }
}
