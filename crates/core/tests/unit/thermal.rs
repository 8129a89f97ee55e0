//! # Thermal Settings Tests
//!
//! Verifies the derived grid, tiling and refresh figures and the thermal
//! output locations.

use std::path::Path;

use dramcfg_core::ValidationError;
use pretty_assertions::assert_eq;

use crate::common::{self, rejection};

#[test]
fn derived_floorplan() {
    let config = common::build(&common::ddr4_small()).unwrap();
    let t = config.thermal();
    // 1024 columns of x8 cells across, 16384 rows along, 512-cell mats.
    assert_eq!((t.num_x_grids, t.num_y_grids), (16, 32));
    assert_eq!(t.tile_row_num, 16384);
    assert_eq!(t.bank_asr, 2.0);
    // 64 ms / (9363 * 0.833 ns) refreshes per window.
    let expected = (16384.0 / (64.0e6 / (9363.0 * 0.833))).ceil() as i64;
    assert_eq!(t.num_row_refresh, expected);
    assert_eq!(t.amb_temp, 40.0);
}

#[test]
fn thermal_outputs_share_the_prefix() {
    let config = common::build(&common::ddr4_small().with("other", "output_prefix", "t_")).unwrap();
    let t = config.thermal();
    assert_eq!(t.epoch_max_temp_file_csv, Path::new("out/t_epoch_max_temp.csv"));
    assert_eq!(t.final_temperature_file_csv, Path::new("out/t_final_temperature.csv"));
    assert_eq!(t.bank_position_csv, Path::new("out/t_bank_position.csv"));
}

#[test]
fn oversized_mats_leave_no_grid() {
    let source = common::ddr4_small().with("thermal", "mat_dim_x", 16384);
    assert_eq!(
        rejection(&source),
        ValidationError::NonPositive {
            field: "num_x_grids",
            value: 0,
        }
    );
}

#[test]
fn bank_order_is_binary() {
    let source = common::ddr4_small().with("thermal", "bank_order", 2);
    assert!(matches!(
        rejection(&source),
        ValidationError::OutOfRange { field: "bank_order", .. }
    ));
}
