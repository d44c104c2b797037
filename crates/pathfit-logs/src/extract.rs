//! Report block extraction from log text
//!
//! An optimization run reports each improvement as a block of the form
//!
//! ```text
//! Iteration 3
//! New Shortest Path ABC
//! New Shortest Distance 123.45
//! ```
//!
//! Keywords are matched case-insensitively and any run of ASCII whitespace
//! (including newlines) may separate the fields. The path label consists of
//! ASCII letters only; the distance is an optionally negative decimal number.
//!
//! Text that does not form a complete block is ignored, so log boilerplate
//! between blocks never causes an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern, always compiles
    Regex::new(
        r"(?i-u)iteration\s+([0-9]+)\s+new\s+shortest\s+path\s+([a-z]+)\s+new\s+shortest\s+distance\s+(-?[0-9]+(?:\.[0-9]+)?)",
    )
    .unwrap()
});

/// One report block parsed from a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Iteration step reported by the block
    pub step: u64,
    /// Shortest path label
    pub label: String,
    /// Reported shortest distance
    pub distance: f64,
}

/// Extracts every report block from `text`, in the order the blocks appear.
///
/// Blocks reporting the same step are all kept; choosing between them is left
/// to the caller. A block whose step does not fit in a `u64` is skipped.
///
/// # Examples
///
/// ```
/// use pathfit_logs::extract::{Observation, extract_observations};
///
/// let text = "Iteration 3 New Shortest Path ABC New Shortest Distance 123.45";
/// assert_eq!(
///     extract_observations(text),
///     vec![Observation { step: 3, label: "ABC".to_owned(), distance: 123.45 }]
/// );
/// ```
#[must_use]
pub fn extract_observations(text: &str) -> Vec<Observation> {
    BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            Some(Observation {
                step: caps[1].parse().ok()?,
                label: caps[2].to_owned(),
                distance: caps[3].parse().ok()?,
            })
        })
        .collect()
}
