//! # Output Path Tests
//!
//! Verifies that file locations combine the output directory and prefix.

use std::path::Path;

use dramcfg_core::output::OutputPaths;
use pretty_assertions::assert_eq;

use crate::common;

#[test]
fn default_prefix() {
    let config = common::build(&common::ddr4_small()).unwrap();
    let paths = &config.output().paths;
    assert_eq!(paths.output_prefix, "dramsim_");
    assert_eq!(paths.stats_file, Path::new("out/dramsim_stats.txt"));
    assert_eq!(paths.epoch_stats_file, Path::new("out/dramsim_epoch.txt"));
    assert_eq!(paths.stats_file_csv, Path::new("out/dramsim_stats.csv"));
    assert_eq!(paths.epoch_stats_file_csv, Path::new("out/dramsim_epoch.csv"));
    assert_eq!(paths.histo_stats_file_csv, Path::new("out/dramsim_histo.csv"));
    assert_eq!(config.output().output_level, 1);
    assert_eq!(config.output().epoch_period, 100_000);
}

#[test]
fn configured_prefix_and_directory() {
    let source = common::ddr4_small().with("other", "output_prefix", "\"hbm_run1_\"");
    let config = dramcfg_core::Config::from_source(&source, "/tmp/results").unwrap();
    assert_eq!(
        config.output().paths,
        OutputPaths::new(Path::new("/tmp/results"), "hbm_run1_")
    );
}

#[test]
fn empty_prefix_is_allowed() {
    let paths = OutputPaths::new(Path::new("."), "");
    assert_eq!(paths.stats_file, Path::new("./stats.txt"));
}
