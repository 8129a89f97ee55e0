//! Device geometry and address-width calculation.
//!
//! This module turns the structural settings into an address partition. It provides:
//! 1. **Geometry:** Channel/rank/bankgroup/bank/row/column counts, widths and devices per rank.
//! 2. **Address widths:** `ceil(log2(count))` for each of the six address fields.
//! 3. **Capacity:** Bytes reachable through the widths, for cross-checking `channel_size`.
//! 4. **Layout:** The ordered bit partition handed to address translation (see [`layout`]).
//!
//! Rounding policy: widths round up. A non-power-of-two count therefore
//! reserves unreachable addresses, which the capacity cross-check rejects.

pub mod layout;

use serde::Serialize;
use tracing::debug;

use crate::common::{BYTES_PER_MB, ConfigError, ceil_log2, div_or_zero, pow2};
use crate::hmc::HmcParams;
use crate::loader::sections::{DRAM_STRUCTURE, SYSTEM};
use crate::loader::{ConfigSource, FieldLoader};
use crate::protocol::DramProtocol;

pub use layout::{AddressField, AddressLayout, AddressScheme, FieldSlot};

mod defaults {
    pub const BANKGROUPS: i64 = 2;
    pub const BANKS_PER_GROUP: i64 = 2;
    pub const ROWS: i64 = 1 << 16;
    pub const COLUMNS: i64 = 1 << 10;
    pub const DEVICE_WIDTH: i64 = 8;
    pub const BURST_LENGTH: i64 = 8;
    /// Per-channel capacity in MB.
    pub const CHANNEL_SIZE: i64 = 1024;
    pub const CHANNELS: i64 = 1;
    pub const BUS_WIDTH: i64 = 64;
    /// HMC vaults are reached over a 32-bit TSV bus.
    pub const HMC_BUS_WIDTH: i64 = 32;
}

/// Structural settings as read from `[dram_structure]` and `[system]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryInputs {
    /// Declared per-channel capacity in MB.
    pub channel_size_mb: i64,
    /// Channel count (HMC: vault count).
    pub channels: i64,
    /// Explicit rank count; derived from capacity when absent.
    pub ranks: Option<i64>,
    /// Bankgroups per rank after bankgroup folding.
    pub bankgroups: i64,
    /// Banks in each bankgroup after bankgroup folding.
    pub banks_per_group: i64,
    /// Explicit bank count; `bankgroups * banks_per_group` when absent.
    pub banks: Option<i64>,
    /// Whether bankgroups are in use.
    pub bankgroup_enabled: bool,
    /// Rows per bank.
    pub rows: i64,
    /// Columns per row.
    pub columns: i64,
    /// Data pins per device.
    pub device_width: i64,
    /// Data bus width in bits.
    pub bus_width: i64,
    /// Burst length in beats.
    pub burst_length: i64,
}

impl GeometryInputs {
    /// Reads the geometry keys.
    ///
    /// With bankgroups disabled, all banks are folded into a single group. For
    /// HMC the channel count is the vault count.
    pub fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        protocol: DramProtocol,
        hmc: Option<&HmcParams>,
    ) -> Result<Self, ConfigError> {
        let mut bankgroups = loader.integer(DRAM_STRUCTURE, "bankgroups", defaults::BANKGROUPS)?;
        let mut banks_per_group =
            loader.integer(DRAM_STRUCTURE, "banks_per_group", defaults::BANKS_PER_GROUP)?;
        let bankgroup_enabled = loader.boolean(DRAM_STRUCTURE, "bankgroup_enable", true)?;
        if !bankgroup_enabled {
            banks_per_group = banks_per_group.saturating_mul(bankgroups);
            bankgroups = 1;
        }

        let bus_default = if protocol.is_hmc() {
            defaults::HMC_BUS_WIDTH
        } else {
            defaults::BUS_WIDTH
        };
        let channels = match hmc {
            Some(hmc) => hmc.num_vaults,
            None => loader.integer(SYSTEM, "channels", defaults::CHANNELS)?,
        };

        Ok(Self {
            channel_size_mb: loader.integer(SYSTEM, "channel_size", defaults::CHANNEL_SIZE)?,
            channels,
            ranks: loader.load_opt(DRAM_STRUCTURE, "ranks")?,
            bankgroups,
            banks_per_group,
            banks: loader.load_opt(DRAM_STRUCTURE, "banks")?,
            bankgroup_enabled,
            rows: loader.integer(DRAM_STRUCTURE, "rows", defaults::ROWS)?,
            columns: loader.integer(DRAM_STRUCTURE, "columns", defaults::COLUMNS)?,
            device_width: loader.integer(DRAM_STRUCTURE, "device_width", defaults::DEVICE_WIDTH)?,
            bus_width: loader.integer(SYSTEM, "bus_width", bus_default)?,
            burst_length: loader.integer(DRAM_STRUCTURE, "BL", defaults::BURST_LENGTH)?,
        })
    }
}

/// Resolved device organisation of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Geometry {
    /// Declared per-channel capacity in MB.
    pub channel_size_mb: i64,
    /// Independent channels.
    pub channels: i64,
    /// Ranks per channel.
    pub ranks: i64,
    /// Bankgroups per rank.
    pub bankgroups: i64,
    /// Banks in each bankgroup.
    pub banks_per_group: i64,
    /// Banks per rank.
    pub banks: i64,
    /// Whether bankgroups are in use.
    pub bankgroup_enabled: bool,
    /// Rows per bank.
    pub rows: i64,
    /// Columns per row.
    pub columns: i64,
    /// Data pins per device.
    pub device_width: i64,
    /// Data bus width in bits.
    pub bus_width: i64,
    /// Devices ganged on the bus to form a rank.
    pub devices_per_rank: i64,
    /// Burst length in beats.
    pub burst_length: i64,
}

impl Geometry {
    /// Declared per-channel capacity in bytes (0 if negative).
    pub fn channel_size_bytes(&self) -> u128 {
        u128::try_from(self.channel_size_mb).unwrap_or(0) * BYTES_PER_MB
    }

    /// Bytes stored in one rank of this organisation.
    pub fn rank_bytes(&self) -> u128 {
        [self.rows, self.columns, self.banks, self.device_width, self.devices_per_rank]
            .into_iter()
            .map(|v| u128::try_from(v).unwrap_or(0))
            .try_fold(1u128, u128::checked_mul)
            .unwrap_or(u128::MAX)
            / 8
    }

    /// Bytes moved by one burst on the full bus, saturating at `i64::MAX`.
    pub fn request_size_bytes(&self) -> i64 {
        (self.bus_width / 8).saturating_mul(self.burst_length)
    }
}

/// Bit widths of the six address fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AddressWidths {
    /// Channel select bits.
    pub channel: u32,
    /// Rank select bits.
    pub rank: u32,
    /// Bankgroup select bits.
    pub bankgroup: u32,
    /// Bank-within-group select bits.
    pub bank: u32,
    /// Row bits.
    pub row: u32,
    /// Device column bits.
    pub column: u32,
}

impl AddressWidths {
    /// Computes `ceil(log2)` of every count.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramcfg_core::geometry::{AddressWidths, Geometry};
    ///
    /// let g = Geometry {
    ///     channel_size_mb: 1024, channels: 1, ranks: 1, bankgroups: 4,
    ///     banks_per_group: 2, banks: 8, bankgroup_enabled: true, rows: 16384,
    ///     columns: 1024, device_width: 8, bus_width: 64, devices_per_rank: 8,
    ///     burst_length: 8,
    /// };
    /// let w = AddressWidths::of(&g);
    /// assert_eq!((w.bankgroup, w.bank, w.row, w.column), (2, 1, 14, 10));
    /// ```
    pub fn of(geometry: &Geometry) -> Self {
        Self {
            channel: ceil_log2(geometry.channels),
            rank: ceil_log2(geometry.ranks),
            bankgroup: ceil_log2(geometry.bankgroups),
            bank: ceil_log2(geometry.banks_per_group),
            row: ceil_log2(geometry.rows),
            column: ceil_log2(geometry.columns),
        }
    }

    /// Width of one field.
    pub fn get(&self, field: AddressField) -> u32 {
        match field {
            AddressField::Channel => self.channel,
            AddressField::Rank => self.rank,
            AddressField::Bankgroup => self.bankgroup,
            AddressField::Bank => self.bank,
            AddressField::Row => self.row,
            AddressField::Column => self.column,
        }
    }

    /// Sum of all six widths.
    pub fn total(&self) -> u32 {
        AddressField::ALL.iter().map(|&f| self.get(f)).sum()
    }

    /// Bits selecting a device cell within one channel (all fields but channel).
    pub fn channel_local(&self) -> u32 {
        self.total() - self.channel
    }
}

/// Bytes reachable in one channel through `widths`.
///
/// Each rank/bankgroup/bank/row/column cell holds `device_width` bits in each
/// of the rank's devices.
pub fn addressable_channel_bytes(geometry: &Geometry, widths: &AddressWidths) -> u128 {
    let cell_bytes = u128::try_from(geometry.bus_width.max(0)).unwrap_or(0) / 8;
    pow2(widths.channel_local()).saturating_mul(cell_bytes)
}

/// Resolves counts that depend on other counts.
///
/// `devices_per_rank` follows from bus and device width; banks default to the
/// bankgroup product; ranks default to as many as fit in `channel_size`.
pub fn derive(inputs: &GeometryInputs) -> Geometry {
    let devices_per_rank = div_or_zero(inputs.bus_width, inputs.device_width);
    let banks = inputs
        .banks
        .unwrap_or_else(|| inputs.bankgroups.saturating_mul(inputs.banks_per_group));

    let mut geometry = Geometry {
        channel_size_mb: inputs.channel_size_mb,
        channels: inputs.channels,
        ranks: 0,
        bankgroups: inputs.bankgroups,
        banks_per_group: inputs.banks_per_group,
        banks,
        bankgroup_enabled: inputs.bankgroup_enabled,
        rows: inputs.rows,
        columns: inputs.columns,
        device_width: inputs.device_width,
        bus_width: inputs.bus_width,
        devices_per_rank,
        burst_length: inputs.burst_length,
    };

    geometry.ranks = match inputs.ranks {
        Some(ranks) => ranks,
        None => {
            let rank_bytes = geometry.rank_bytes();
            let fit = geometry.channel_size_bytes().checked_div(rank_bytes).unwrap_or(0);
            i64::try_from(fit).unwrap_or(i64::MAX)
        }
    };

    debug!(
        ranks = geometry.ranks,
        devices_per_rank,
        banks,
        "geometry derived"
    );
    geometry
}
