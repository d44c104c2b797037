//! Log ingestion for repeated optimization runs
//!
//! This crate turns a directory of run logs into per-run samples of terminal
//! shortest-path distances.
//!
//! # Overview
//!
//! ```text
//! log_<run>_<iteration>.log files
//!     ↓
//! Extract Observations (extract::extract_observations)
//!     ↓
//! Group by Run and Iteration (collect::RunCollection)
//!     ↓
//! Reduce to Terminal Distances (collect::RunCollection::samples)
//! ```
//!
//! - [`extract`]: parses report blocks out of one log's text
//! - [`collect`]: walks a directory, groups observations and builds samples
//!
//! # Examples
//!
//! ```no_run
//! use pathfit_logs::collect::RunCollection;
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//!
//! let collection = RunCollection::from_dir("logs")?;
//! for (run, sample) in collection.samples() {
//!     println!("run {run}: {} terminal distances", sample.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod collect;
pub mod extract;
