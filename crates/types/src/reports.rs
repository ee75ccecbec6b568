//! Report type definitions for verification and split comparison

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A file whose content digest no longer matches the index
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    pub path: String,
    /// Digest recorded in the index
    pub expected: String,
    /// Digest computed from the file on disk
    pub computed: String,
}

/// One contiguous byte range `[start, start + len)` of the common overlap
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitWindow {
    pub index: usize,
    pub start: u64,
    pub len: u64,
}

impl SplitWindow {
    /// Exclusive end offset
    #[must_use]
    pub fn end(&self) -> u64 {
        self.start + self.len
    }

    #[must_use]
    pub fn contains(&self, offset: u64) -> bool {
        offset >= self.start && offset < self.end()
    }
}

/// Outcome of comparing two or more files window by window
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitComparisonResult {
    pub algorithm: String,
    pub split_count: usize,
    pub paths: Vec<PathBuf>,
    pub sizes: Vec<u64>,
    pub min_size: u64,
    pub max_size: u64,
    /// Window layout over `[0, min_size)`
    pub windows: Vec<SplitWindow>,
    /// `split_hashes[window][file]`
    pub split_hashes: Vec<Vec<String>>,
    /// Windows where any file disagrees with the first file
    pub differing_splits: Vec<usize>,
    /// Bytes beyond `min_size`, per file
    pub tail_bytes: Vec<u64>,
}

impl SplitComparisonResult {
    /// Same size and every window matches
    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.differing_splits.is_empty() && self.min_size == self.max_size
    }

    /// The overlap matches but at least one file has extra trailing bytes
    #[must_use]
    pub fn tails_only(&self) -> bool {
        self.differing_splits.is_empty() && self.min_size != self.max_size
    }

    /// Window covering `offset`, if the offset lies inside the overlap
    #[must_use]
    pub fn window_for_offset(&self, offset: u64) -> Option<&SplitWindow> {
        self.windows.iter().find(|w| w.contains(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(differing: Vec<usize>, sizes: Vec<u64>) -> SplitComparisonResult {
        let min_size = sizes.iter().copied().min().unwrap_or(0);
        let max_size = sizes.iter().copied().max().unwrap_or(0);
        SplitComparisonResult {
            algorithm: "SHA256".into(),
            split_count: 2,
            paths: vec!["a".into(), "b".into()],
            tail_bytes: sizes.iter().map(|s| s - min_size).collect(),
            sizes,
            min_size,
            max_size,
            windows: vec![
                SplitWindow {
                    index: 0,
                    start: 0,
                    len: 5,
                },
                SplitWindow {
                    index: 1,
                    start: 5,
                    len: 5,
                },
            ],
            split_hashes: vec![vec![], vec![]],
            differing_splits: differing,
        }
    }

    #[test]
    fn test_verdicts() {
        assert!(result(vec![], vec![10, 10]).is_identical());
        assert!(result(vec![], vec![10, 12]).tails_only());
        let r = result(vec![1], vec![10, 10]);
        assert!(!r.is_identical());
        assert!(!r.tails_only());
    }

    #[test]
    fn test_window_for_offset() {
        let r = result(vec![], vec![10, 10]);
        assert_eq!(r.window_for_offset(0).map(|w| w.index), Some(0));
        assert_eq!(r.window_for_offset(5).map(|w| w.index), Some(1));
        assert_eq!(r.window_for_offset(9).map(|w| w.index), Some(1));
        assert!(r.window_for_offset(10).is_none());
    }
}
