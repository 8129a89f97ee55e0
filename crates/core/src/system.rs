//! Controller, queue and refresh policy.
//!
//! This module covers the policy half of the `[system]` section. It provides:
//! 1. **Enumerations:** Queue structure, row-buffer policy and refresh policy.
//! 2. **SystemParams:** Queue depths, self-refresh control and the address-mapping scheme.

use std::fmt;

use serde::Serialize;

use crate::common::ConfigError;
use crate::geometry::AddressScheme;
use crate::loader::sections::{DRAM_STRUCTURE, SYSTEM};
use crate::loader::{ConfigSource, FieldLoader};
use crate::protocol::DramProtocol;

mod defaults {
    pub const QUEUE_STRUCTURE: &str = "PER_BANK";
    pub const ROW_BUF_POLICY: &str = "OPEN_PAGE";
    pub const REFRESH_POLICY: &str = "RANK_LEVEL_STAGGERED";
    pub const CMD_QUEUE_SIZE: i64 = 16;
    pub const TRANS_QUEUE_SIZE: i64 = 32;
    pub const DELAY_QUEUE_CYCLES: i64 = 0;
    pub const SREF_THRESHOLD: i64 = 1000;
}

/// Enumerations spelled as upper-case identifiers in the config file.
trait Spelled: Sized + Copy + 'static {
    const ALL: &'static [Self];
    const EXPECTED: &'static str;
    fn name(self) -> &'static str;

    fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        key: &str,
        default: &str,
    ) -> Result<Self, ConfigError> {
        let text = loader.string(SYSTEM, key, default)?;
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.name() == text)
            .ok_or_else(|| ConfigError::parse(SYSTEM, key, &text, Self::EXPECTED))
    }
}

/// How the command queue is partitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueueStructure {
    /// One command queue per bank.
    #[default]
    PerBank,
    /// One command queue per rank.
    PerRank,
}

impl Spelled for QueueStructure {
    const ALL: &'static [Self] = &[Self::PerBank, Self::PerRank];
    const EXPECTED: &'static str = "PER_BANK or PER_RANK";

    fn name(self) -> &'static str {
        match self {
            Self::PerBank => "PER_BANK",
            Self::PerRank => "PER_RANK",
        }
    }
}

/// What happens to a row after its last queued access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowBufferPolicy {
    /// Leave the row open.
    #[default]
    OpenPage,
    /// Precharge immediately.
    ClosePage,
}

impl Spelled for RowBufferPolicy {
    const ALL: &'static [Self] = &[Self::OpenPage, Self::ClosePage];
    const EXPECTED: &'static str = "OPEN_PAGE or CLOSE_PAGE";

    fn name(self) -> &'static str {
        match self {
            Self::OpenPage => "OPEN_PAGE",
            Self::ClosePage => "CLOSE_PAGE",
        }
    }
}

/// Granularity at which refresh commands are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshPolicy {
    /// All ranks at once (high peak current).
    RankLevelSimultaneous,
    /// One rank at a time.
    #[default]
    RankLevelStaggered,
    /// One bank at a time.
    BankLevelStaggered,
}

impl Spelled for RefreshPolicy {
    const ALL: &'static [Self] = &[
        Self::RankLevelSimultaneous,
        Self::RankLevelStaggered,
        Self::BankLevelStaggered,
    ];
    const EXPECTED: &'static str =
        "RANK_LEVEL_SIMULTANEOUS, RANK_LEVEL_STAGGERED or BANK_LEVEL_STAGGERED";

    fn name(self) -> &'static str {
        match self {
            Self::RankLevelSimultaneous => "RANK_LEVEL_SIMULTANEOUS",
            Self::RankLevelStaggered => "RANK_LEVEL_STAGGERED",
            Self::BankLevelStaggered => "BANK_LEVEL_STAGGERED",
        }
    }
}

impl RefreshPolicy {
    /// Name as written in configuration files.
    pub fn as_str(self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for RefreshPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Queueing and scheduling policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemParams {
    /// Address-mapping scheme.
    #[serde(serialize_with = "serialize_scheme")]
    pub address_mapping: AddressScheme,
    /// Command queue organisation.
    pub queue_structure: QueueStructure,
    /// Row-buffer policy.
    pub row_buf_policy: RowBufferPolicy,
    /// Refresh scheduling granularity.
    pub refresh_policy: RefreshPolicy,
    /// Depth of each command queue.
    pub cmd_queue_size: i64,
    /// Depth of the transaction queue.
    pub trans_queue_size: i64,
    /// Fixed extra cycles a transaction waits before entering the queues.
    pub delay_queue_cycles: i64,
    /// Whether idle ranks may enter self-refresh.
    pub enable_self_refresh: bool,
    /// Idle cycles before self-refresh entry.
    pub sref_threshold: i64,
    /// Precharge as soon as no queued request targets the open row.
    pub aggressive_precharging_enabled: bool,
    /// HBM row and column commands may issue in the same cycle.
    pub enable_hbm_dual_cmd: bool,
}

fn serialize_scheme<S: serde::Serializer>(scheme: &AddressScheme, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(scheme)
}

impl SystemParams {
    /// Reads the policy keys. Dual command issue is forced off for non-HBM parts.
    pub fn load<S: ConfigSource>(
        loader: &FieldLoader<S>,
        protocol: DramProtocol,
    ) -> Result<Self, ConfigError> {
        let mapping = loader.string(SYSTEM, "address_mapping", AddressScheme::DEFAULT)?;
        let address_mapping = AddressScheme::parse(&mapping).ok_or_else(|| {
            ConfigError::parse(
                SYSTEM,
                "address_mapping",
                &mapping,
                "six distinct tokens from ch/ra/bg/ba/ro/co, open_page or close_page",
            )
        })?;

        Ok(Self {
            address_mapping,
            queue_structure: QueueStructure::load(loader, "queue_structure", defaults::QUEUE_STRUCTURE)?,
            row_buf_policy: RowBufferPolicy::load(loader, "row_buf_policy", defaults::ROW_BUF_POLICY)?,
            refresh_policy: RefreshPolicy::load(loader, "refresh_policy", defaults::REFRESH_POLICY)?,
            cmd_queue_size: loader.integer(SYSTEM, "cmd_queue_size", defaults::CMD_QUEUE_SIZE)?,
            trans_queue_size: loader.integer(SYSTEM, "trans_queue_size", defaults::TRANS_QUEUE_SIZE)?,
            delay_queue_cycles: loader.integer(SYSTEM, "delay_queue_cycles", defaults::DELAY_QUEUE_CYCLES)?,
            enable_self_refresh: loader.boolean(SYSTEM, "enable_self_refresh", false)?,
            sref_threshold: loader.integer(SYSTEM, "sref_threshold", defaults::SREF_THRESHOLD)?,
            aggressive_precharging_enabled: loader.boolean(
                SYSTEM,
                "aggressive_precharging_enabled",
                false,
            )?,
            enable_hbm_dual_cmd: loader.boolean(DRAM_STRUCTURE, "hbm_dual_cmd", true)?
                && protocol.is_hbm(),
        })
    }
}
