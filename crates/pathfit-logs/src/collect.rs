//! Grouping of log observations into per-run samples
//!
//! Log files are named `log_<run>_<iteration>.log`. Every matching regular
//! file in a directory is parsed with [`extract_observations`] and its
//! observations are appended to the series of its `(run, iteration)` pair.
//!
//! # Data Structure
//!
//! ```text
//! RunCollection
//! └─ runs: BTreeMap<run, RunSeries>
//!     └─ iterations: BTreeMap<iteration, Vec<Observation>>
//! ```
//!
//! # Terminal Distances
//!
//! Each run is reduced to a sample with one value per iteration: the distance
//! of the last observation recorded for that iteration. Iterations are
//! visited in ascending numeric order. Iterations without observations are
//! omitted, so a run's sample may be shorter than its iteration count; use
//! [`RunSeries::empty_iterations`] to find them.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use regex::Regex;

use crate::extract::{Observation, extract_observations};

// Literal pattern, always compiles
static LOG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^log_([0-9]+)_([0-9]+)\.log$").unwrap());

/// Terminal-distance samples keyed by run identifier.
pub type RunSamples = BTreeMap<u32, Vec<f64>>;

/// Failure to read the log directory or one of its files.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CollectError {
    #[display("failed to read log directory {}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },
    #[display("failed to read an entry of log directory {}", path.display())]
    ReadEntry { path: PathBuf, source: io::Error },
    #[display("failed to read log file {}", path.display())]
    ReadFile { path: PathBuf, source: io::Error },
}

/// Run and iteration identifiers encoded in a log file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LogName {
    pub run: u32,
    pub iteration: u32,
}

impl LogName {
    /// Parses a file name of the form `log_<run>_<iteration>.log`.
    ///
    /// Returns `None` for any other name. Identifiers are limited to `u32`;
    /// a name whose run or iteration exceeds `u32::MAX` is not a log name, so
    /// the file is skipped when collecting.
    ///
    /// # Examples
    ///
    /// ```
    /// use pathfit_logs::collect::LogName;
    ///
    /// assert_eq!(LogName::parse("log_3_12.log"), Some(LogName { run: 3, iteration: 12 }));
    /// assert_eq!(LogName::parse("log_3_12.txt"), None);
    /// ```
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = LOG_NAME_RE.captures(file_name)?;
        Some(Self {
            run: caps[1].parse().ok()?,
            iteration: caps[2].parse().ok()?,
        })
    }
}

/// Observations of one run, grouped by iteration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSeries {
    iterations: BTreeMap<u32, Vec<Observation>>,
}

impl RunSeries {
    /// Appends observations to an iteration, creating it if needed.
    ///
    /// An iteration is recorded even when `observations` is empty.
    pub fn extend<I>(&mut self, iteration: u32, observations: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        self.iterations
            .entry(iteration)
            .or_default()
            .extend(observations);
    }

    #[must_use]
    pub fn iterations(&self) -> &BTreeMap<u32, Vec<Observation>> {
        &self.iterations
    }

    /// Distance of the last observation of every non-empty iteration, in
    /// ascending iteration order.
    #[must_use]
    pub fn terminal_distances(&self) -> Vec<f64> {
        self.iterations
            .values()
            .filter_map(|observations| observations.last())
            .map(|observation| observation.distance)
            .collect()
    }

    /// Iterations whose logs contained no observations.
    #[must_use]
    pub fn empty_iterations(&self) -> Vec<u32> {
        self.iterations
            .iter()
            .filter(|(_, observations)| observations.is_empty())
            .map(|(iteration, _)| *iteration)
            .collect()
    }
}

/// All runs found in a log directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunCollection {
    runs: BTreeMap<u32, RunSeries>,
}

impl RunCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every `log_<run>_<iteration>.log` regular file in `dir`.
    ///
    /// Other entries are ignored. Files are processed in file-name order, so
    /// names that map to the same identifiers (`log_1_01.log` and
    /// `log_1_1.log`) append deterministically. Invalid UTF-8 in a log is
    /// replaced rather than rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CollectError`] if the directory or a matching file cannot be
    /// read. A missing directory is an error, not an empty collection.
    pub fn from_dir<P>(dir: P) -> Result<Self, CollectError>
    where
        P: AsRef<Path>,
    {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|source| CollectError::ReadDir {
            path: dir.to_owned(),
            source,
        })?;

        let mut logs = vec![];
        for entry in entries {
            let entry = entry.map_err(|source| CollectError::ReadEntry {
                path: dir.to_owned(),
                source,
            })?;
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str().and_then(LogName::parse) else {
                continue;
            };
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            logs.push((file_name, name, path));
        }
        logs.sort_by(|a, b| a.0.cmp(&b.0));

        let mut collection = Self::new();
        for (_, name, path) in logs {
            let bytes =
                fs::read(&path).map_err(|source| CollectError::ReadFile { path, source })?;
            collection.add_log(name, &String::from_utf8_lossy(&bytes));
        }
        Ok(collection)
    }

    /// Extracts observations from one log's text and files them under `name`.
    pub fn add_log(&mut self, name: LogName, text: &str) {
        self.runs
            .entry(name.run)
            .or_default()
            .extend(name.iteration, extract_observations(text));
    }

    #[must_use]
    pub fn runs(&self) -> &BTreeMap<u32, RunSeries> {
        &self.runs
    }

    #[must_use]
    pub fn get(&self, run: u32) -> Option<&RunSeries> {
        self.runs.get(&run)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Terminal-distance sample of every run.
    ///
    /// Runs whose iterations all lack observations map to an empty sample.
    #[must_use]
    pub fn samples(&self) -> RunSamples {
        self.runs
            .iter()
            .map(|(run, series)| (*run, series.terminal_distances()))
            .collect()
    }
}

/// Reads `dir` and returns the terminal-distance sample of every run.
///
/// Shorthand for [`RunCollection::from_dir`] followed by
/// [`RunCollection::samples`].
pub fn collect_samples<P>(dir: P) -> Result<RunSamples, CollectError>
where
    P: AsRef<Path>,
{
    Ok(RunCollection::from_dir(dir)?.samples())
}
