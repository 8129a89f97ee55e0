//! Output locations and reporting cadence.
//!
//! Paths are plain values built from the output directory and the
//! `[other] output_prefix`; creating the files is the statistics writer's job.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::ConfigError;
use crate::loader::sections::OTHER;
use crate::loader::{ConfigSource, FieldLoader};

mod defaults {
    pub const EPOCH_PERIOD: i64 = 100_000;
    pub const OUTPUT_LEVEL: i64 = 1;
    pub const OUTPUT_PREFIX: &str = "dramsim_";
}

/// Files the statistics writers produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPaths {
    /// Directory every file lives in.
    pub output_dir: PathBuf,
    /// Prefix prepended to every file name.
    pub output_prefix: String,
    /// End-of-run summary.
    pub stats_file: PathBuf,
    /// Per-epoch summary.
    pub epoch_stats_file: PathBuf,
    /// End-of-run summary, CSV.
    pub stats_file_csv: PathBuf,
    /// Per-epoch summary, CSV.
    pub epoch_stats_file_csv: PathBuf,
    /// Latency and interval histograms, CSV.
    pub histo_stats_file_csv: PathBuf,
}

impl OutputPaths {
    /// Joins `output_dir` with `prefix` plus each fixed suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use dramcfg_core::output::OutputPaths;
    ///
    /// let paths = OutputPaths::new(Path::new("out"), "ddr4_");
    /// assert_eq!(paths.stats_file, Path::new("out/ddr4_stats.txt"));
    /// assert_eq!(paths.histo_stats_file_csv, Path::new("out/ddr4_histo.csv"));
    /// ```
    pub fn new(output_dir: &Path, prefix: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            output_prefix: prefix.to_owned(),
            stats_file: prefixed(output_dir, prefix, "stats.txt"),
            epoch_stats_file: prefixed(output_dir, prefix, "epoch.txt"),
            stats_file_csv: prefixed(output_dir, prefix, "stats.csv"),
            epoch_stats_file_csv: prefixed(output_dir, prefix, "epoch.csv"),
            histo_stats_file_csv: prefixed(output_dir, prefix, "histo.csv"),
        }
    }
}

/// `dir/<prefix><suffix>`.
pub(crate) fn prefixed(dir: &Path, prefix: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{prefix}{suffix}"))
}

/// Reporting cadence and verbosity from `[other]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputParams {
    /// Cycles per statistics epoch.
    pub epoch_period: i64,
    /// -1: no files; 0: final summary only; 1: adds epoch CSV; 2: adds histograms.
    pub output_level: i64,
    /// Derived file locations.
    pub paths: OutputPaths,
}

impl OutputParams {
    /// Reads `[other]` and builds the paths under `output_dir`.
    pub fn load<S: ConfigSource>(loader: &FieldLoader<S>, output_dir: &Path) -> Result<Self, ConfigError> {
        let prefix = loader.string(OTHER, "output_prefix", defaults::OUTPUT_PREFIX)?;
        Ok(Self {
            epoch_period: loader.integer(OTHER, "epoch_period", defaults::EPOCH_PERIOD)?,
            output_level: loader.integer(OTHER, "output_level", defaults::OUTPUT_LEVEL)?,
            paths: OutputPaths::new(output_dir, &prefix),
        })
    }
}
