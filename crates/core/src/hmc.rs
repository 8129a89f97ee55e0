//! Hybrid Memory Cube link and vault parameters.
//!
//! Only loaded when the protocol is HMC; every other protocol has no `[hmc]`
//! section and carries `None` in the snapshot.

use serde::Serialize;

use crate::common::ConfigError;
use crate::loader::sections::HMC;
use crate::loader::{ConfigSource, FieldLoader};

mod defaults {
    pub const NUM_LINKS: i64 = 4;
    pub const NUM_DIES: i64 = 8;
    pub const LINK_WIDTH: i64 = 16;
    pub const LINK_SPEED: i64 = 30;
    pub const NUM_VAULTS: i64 = 32;
    pub const BLOCK_SIZE: i64 = 32;
    pub const XBAR_QUEUE_DEPTH: i64 = 16;
}

/// Legal SerDes lane counts per link.
pub const LINK_WIDTHS: [i64; 3] = [4, 8, 16];
/// Legal link speeds in Gbps.
pub const LINK_SPEEDS: [i64; 5] = [12, 15, 25, 28, 30];
/// Legal maximum block sizes in bytes.
pub const BLOCK_SIZES: [i64; 4] = [32, 64, 128, 256];
/// Legal link counts.
pub const LINK_COUNTS: [i64; 2] = [2, 4];

/// Link, die and vault organisation of an HMC device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HmcParams {
    /// External serial links.
    pub num_links: i64,
    /// Stacked DRAM dies.
    pub num_dies: i64,
    /// Lanes per link.
    pub link_width: i64,
    /// Lane speed in Gbps.
    pub link_speed: i64,
    /// Vaults; each is an independent channel.
    pub num_vaults: i64,
    /// Maximum block size in bytes.
    pub block_size: i64,
    /// Depth of the link-to-vault crossbar queues.
    pub xbar_queue_depth: i64,
}

impl HmcParams {
    /// Reads the `[hmc]` section.
    pub fn load<S: ConfigSource>(loader: &FieldLoader<S>) -> Result<Self, ConfigError> {
        Ok(Self {
            num_links: loader.integer(HMC, "num_links", defaults::NUM_LINKS)?,
            num_dies: loader.integer(HMC, "num_dies", defaults::NUM_DIES)?,
            link_width: loader.integer(HMC, "link_width", defaults::LINK_WIDTH)?,
            link_speed: loader.integer(HMC, "link_speed", defaults::LINK_SPEED)?,
            num_vaults: loader.integer(HMC, "num_vaults", defaults::NUM_VAULTS)?,
            block_size: loader.integer(HMC, "block_size", defaults::BLOCK_SIZE)?,
            xbar_queue_depth: loader.integer(HMC, "xbar_queue_depth", defaults::XBAR_QUEUE_DEPTH)?,
        })
    }

    /// Aggregate external bandwidth over all links in GB/s, one direction.
    pub fn link_bandwidth_gbps(&self) -> f64 {
        self.num_links as f64 * self.link_width as f64 * self.link_speed as f64 / 8.0
    }
}
