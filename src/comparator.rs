//! Result comparison between two inference runs
//!
//! Each result file holds one line per test case. A baseline line of `1`
//! marks a failed case: a difference there is a deterioration, any other
//! difference an improvement.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Baseline marker that turns a differing line into a deterioration
pub const FAILURE_MARKER: &str = "1";

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Line numbers (1-based) where the two runs disagree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Comparison {
    pub deterioration: Vec<usize>,
    pub improvement: Vec<usize>,
}

impl Comparison {
    pub fn is_identical(&self) -> bool {
        self.deterioration.is_empty() && self.improvement.is_empty()
    }
}

/// Classify the differing lines of two parallel result sequences.
///
/// Trailing whitespace is ignored. Only the common prefix is compared when
/// the sequences differ in length.
pub fn compare_results<B, C>(baseline: &[B], compared: &[C]) -> Comparison
where
    B: AsRef<str>,
    C: AsRef<str>,
{
    let mut comparison = Comparison::default();

    for (index, (base, other)) in baseline.iter().zip(compared).enumerate() {
        let base = base.as_ref().trim_end();
        if base == other.as_ref().trim_end() {
            continue;
        }
        if base == FAILURE_MARKER {
            comparison.deterioration.push(index + 1);
        } else {
            comparison.improvement.push(index + 1);
        }
    }

    comparison
}

/// Lines of a result file
pub fn read_results(path: &Path) -> Result<Vec<String>, CompareError> {
    let content = std::fs::read_to_string(path).map_err(|source| CompareError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().map(str::to_string).collect())
}

/// Compare two result files
pub fn compare_files(baseline: &Path, compared: &Path) -> Result<Comparison, CompareError> {
    let baseline = read_results(baseline)?;
    let compared = read_results(compared)?;
    Ok(compare_results(&baseline, &compared))
}
