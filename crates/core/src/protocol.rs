//! DRAM protocol resolution.
//!
//! Maps the `dram_structure.protocol` string onto a closed enumeration and
//! answers the capability questions every later stage branches on.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::common::ConfigError;

/// Supported DRAM standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DramProtocol {
    /// DDR3 SDRAM.
    #[default]
    Ddr3,
    /// DDR4 SDRAM.
    Ddr4,
    /// GDDR5 graphics DRAM.
    Gddr5,
    /// GDDR5X graphics DRAM (quad data rate).
    Gddr5x,
    /// Low-power DDR.
    Lpddr,
    /// Low-power DDR3.
    Lpddr3,
    /// Low-power DDR4.
    Lpddr4,
    /// High Bandwidth Memory.
    Hbm,
    /// High Bandwidth Memory, second generation.
    Hbm2,
    /// Hybrid Memory Cube.
    Hmc,
}

impl DramProtocol {
    /// Every protocol, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Ddr3,
        Self::Ddr4,
        Self::Gddr5,
        Self::Gddr5x,
        Self::Lpddr,
        Self::Lpddr3,
        Self::Lpddr4,
        Self::Hbm,
        Self::Hbm2,
        Self::Hmc,
    ];

    /// Name as written in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ddr3 => "DDR3",
            Self::Ddr4 => "DDR4",
            Self::Gddr5 => "GDDR5",
            Self::Gddr5x => "GDDR5X",
            Self::Lpddr => "LPDDR",
            Self::Lpddr3 => "LPDDR3",
            Self::Lpddr4 => "LPDDR4",
            Self::Hbm => "HBM",
            Self::Hbm2 => "HBM2",
            Self::Hmc => "HMC",
        }
    }

    /// GDDR5 or GDDR5X.
    pub const fn is_gddr(self) -> bool {
        matches!(self, Self::Gddr5 | Self::Gddr5x)
    }

    /// HBM or HBM2.
    pub const fn is_hbm(self) -> bool {
        matches!(self, Self::Hbm | Self::Hbm2)
    }

    /// Hybrid Memory Cube.
    pub const fn is_hmc(self) -> bool {
        matches!(self, Self::Hmc)
    }

    /// DDR4.
    pub const fn is_ddr4(self) -> bool {
        matches!(self, Self::Ddr4)
    }

    /// LPDDR4.
    pub const fn is_lpddr4(self) -> bool {
        matches!(self, Self::Lpddr4)
    }

    /// Whether the built-in supply-current defaults describe this standard.
    ///
    /// Only the commodity DDR parts have them; every other protocol must
    /// configure its currents explicitly.
    pub const fn has_default_currents(self) -> bool {
        matches!(self, Self::Ddr3 | Self::Ddr4)
    }
}

impl fmt::Display for DramProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DramProtocol {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve(s)
    }
}

/// Resolves a protocol name, matching case-sensitively.
///
/// # Examples
///
/// ```
/// use dramcfg_core::protocol::{resolve, DramProtocol};
///
/// assert_eq!(resolve("HBM2").unwrap(), DramProtocol::Hbm2);
/// assert!(resolve("ddr4").is_err());
/// ```
pub fn resolve(name: &str) -> Result<DramProtocol, ConfigError> {
    DramProtocol::ALL
        .into_iter()
        .find(|p| p.name() == name)
        .ok_or_else(|| ConfigError::InvalidProtocol(name.to_owned()))
}
