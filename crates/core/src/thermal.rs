//! Thermal model parameters (feature `thermal`).
//!
//! The thermal simulator consumes the power increments and the geometry; this
//! module only carries its floorplan settings and output locations.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::{ConfigError, div_or_zero};
use crate::geometry::Geometry;
use crate::loader::sections::THERMAL;
use crate::loader::{ConfigSource, FieldLoader};
use crate::output::prefixed;
use crate::timing::Timing;

mod defaults {
    pub const POWER_EPOCH_PERIOD: i64 = 100_000;
    pub const AMB_TEMP: f64 = 40.0;
    pub const LOGIC_BG_POWER: f64 = 1.0;
    pub const LOGIC_MAX_POWER: f64 = 10.0;
    pub const CHIP_DIM_X: f64 = 0.01;
    pub const CHIP_DIM_Y: f64 = 0.01;
    pub const MAT_DIM_X: i64 = 512;
    pub const MAT_DIM_Y: i64 = 512;
    pub const BANK_ORDER: i64 = 1;
    pub const BANK_LAYER_ORDER: i64 = 0;
    pub const ROW_TILE: i64 = 1;
    /// Retention window every row must be refreshed within, in ns.
    pub const RETENTION_NS: f64 = 64.0e6;
}

/// Floorplan and thermal-output settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermalParams {
    /// Path of an explicit bank location mapping; empty for the built-in floorplan.
    pub loc_mapping: String,
    /// Cycles per power sample.
    pub power_epoch_period: i64,
    /// Rows refreshed by one refresh command.
    pub num_row_refresh: i64,
    /// Ambient temperature in degrees Celsius.
    pub amb_temp: f64,
    /// Background power of the logic layer (W).
    pub logic_bg_power: f64,
    /// Maximum power of the logic layer (W).
    pub logic_max_power: f64,
    /// Die width (m).
    pub chip_dim_x: f64,
    /// Die height (m).
    pub chip_dim_y: f64,
    /// Thermal grid cells across a bank.
    pub num_x_grids: i64,
    /// Thermal grid cells along a bank.
    pub num_y_grids: i64,
    /// Mat width in bit cells.
    pub mat_dim_x: i64,
    /// Mat height in bit cells.
    pub mat_dim_y: i64,
    /// 0: x-direction priority, 1: y-direction priority.
    pub bank_order: i64,
    /// 0: low-layer priority, 1: high-layer priority.
    pub bank_layer_order: i64,
    /// Row tiles per bank.
    pub row_tile: i64,
    /// Rows in each tile.
    pub tile_row_num: i64,
    /// Bank aspect ratio: row bits over column bits.
    pub bank_asr: f64,
    /// Per-epoch maximum temperature, CSV.
    pub epoch_max_temp_file_csv: PathBuf,
    /// Per-epoch temperature map, CSV.
    pub epoch_temperature_file_csv: PathBuf,
    /// Final temperature map, CSV.
    pub final_temperature_file_csv: PathBuf,
    /// Bank placement, CSV.
    pub bank_position_csv: PathBuf,
}

impl ThermalParams {
    /// Reads `[thermal]` and derives the grid and refresh figures.
    pub fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        geometry: &Geometry,
        timing: &Timing,
        output_dir: &Path,
        prefix: &str,
    ) -> Result<Self, ConfigError> {
        let mat_dim_x = loader.integer(THERMAL, "mat_dim_x", defaults::MAT_DIM_X)?;
        let mat_dim_y = loader.integer(THERMAL, "mat_dim_y", defaults::MAT_DIM_Y)?;
        let row_tile = loader.integer(THERMAL, "RowTile", defaults::ROW_TILE)?;
        let col_bits = geometry.columns.saturating_mul(geometry.device_width);

        let refresh_period_ns = timing.primitive.t_refi as f64 * timing.primitive.t_ck;
        let refreshes_per_window = defaults::RETENTION_NS / refresh_period_ns;
        let num_row_refresh = if refreshes_per_window.is_finite() && refreshes_per_window > 0.0 {
            (geometry.rows as f64 / refreshes_per_window).ceil() as i64
        } else {
            0
        };

        Ok(Self {
            loc_mapping: loader.string(THERMAL, "loc_mapping", "")?,
            power_epoch_period: loader.integer(THERMAL, "power_epoch_period", defaults::POWER_EPOCH_PERIOD)?,
            num_row_refresh,
            amb_temp: loader.float(THERMAL, "amb_temp", defaults::AMB_TEMP)?,
            logic_bg_power: loader.float(THERMAL, "logic_bg_power", defaults::LOGIC_BG_POWER)?,
            logic_max_power: loader.float(THERMAL, "logic_max_power", defaults::LOGIC_MAX_POWER)?,
            chip_dim_x: loader.float(THERMAL, "chip_dim_x", defaults::CHIP_DIM_X)?,
            chip_dim_y: loader.float(THERMAL, "chip_dim_y", defaults::CHIP_DIM_Y)?,
            num_x_grids: div_or_zero(col_bits, mat_dim_x),
            num_y_grids: div_or_zero(geometry.rows, mat_dim_y),
            mat_dim_x,
            mat_dim_y,
            bank_order: loader.integer(THERMAL, "bank_order", defaults::BANK_ORDER)?,
            bank_layer_order: loader.integer(THERMAL, "bank_layer_order", defaults::BANK_LAYER_ORDER)?,
            row_tile,
            tile_row_num: div_or_zero(geometry.rows, row_tile),
            bank_asr: if col_bits > 0 {
                geometry.rows as f64 / col_bits as f64
            } else {
                0.0
            },
            epoch_max_temp_file_csv: prefixed(output_dir, prefix, "epoch_max_temp.csv"),
            epoch_temperature_file_csv: prefixed(output_dir, prefix, "epoch_temperature.csv"),
            final_temperature_file_csv: prefixed(output_dir, prefix, "final_temperature.csv"),
            bank_position_csv: prefixed(output_dir, prefix, "bank_position.csv"),
        })
    }
}
