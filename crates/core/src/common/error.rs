//! Error definitions for configuration loading and validation.
//!
//! This module defines every way construction of a [`Config`](crate::Config) can fail. It provides:
//! 1. **File errors:** The configuration file is missing, unreadable, or not valid INI.
//! 2. **Parse errors:** A present key holds a value of the wrong type or an unknown spelling.
//! 3. **Protocol errors:** The protocol name does not name a supported DRAM standard.
//! 4. **Validation errors:** A cross-field invariant failed after derivation.
//!
//! All of these are fatal to construction; nothing is retried internally.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while building a configuration snapshot.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read or is not structurally valid INI.
    #[error("cannot load config file '{}': {reason}", path.display())]
    File {
        /// Path that was being loaded.
        path: PathBuf,
        /// Underlying I/O or syntax failure.
        reason: String,
    },

    /// A key is present but its value cannot be interpreted as the expected type.
    #[error("[{section}] {key} = '{value}': expected {expected}")]
    Parse {
        /// INI section holding the key.
        section: String,
        /// Offending key.
        key: String,
        /// Raw value as written in the file.
        value: String,
        /// Human readable description of the accepted form.
        expected: &'static str,
    },

    /// The protocol name is not one of the supported DRAM standards.
    #[error("unknown or unsupported DRAM protocol '{0}'")]
    InvalidProtocol(String),

    /// A derived parameter set violates a cross-field invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ConfigError {
    pub(crate) fn parse(section: &str, key: &str, value: &str, expected: &'static str) -> Self {
        Self::Parse {
            section: section.to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
            expected,
        }
    }
}

/// A violated relation found by the sanity checker.
///
/// Each variant names the offending field(s) so the input file can be corrected
/// directly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A count or size that must be at least one is not.
    #[error("{field} must be >= 1 (got {value})")]
    NonPositive {
        /// Field name.
        field: &'static str,
        /// Observed value.
        value: i64,
    },

    /// `bankgroups * banks_per_group` disagrees with `banks`.
    #[error(
        "banks ({banks}) must equal bankgroups ({bankgroups}) * banks_per_group ({banks_per_group})"
    )]
    BankProduct {
        /// Declared bank count.
        banks: i64,
        /// Declared bankgroup count.
        bankgroups: i64,
        /// Declared banks per group.
        banks_per_group: i64,
    },

    /// Bus width is not a whole number of bytes or of devices.
    #[error("bus_width ({bus_width}) must be a multiple of 8 and of device_width ({device_width})")]
    BusWidth {
        /// Bus width in bits.
        bus_width: i64,
        /// Device width in bits.
        device_width: i64,
    },

    /// A timing count is negative.
    #[error("timing {field} must be non-negative (got {value})")]
    NegativeTiming {
        /// Timing field name.
        field: &'static str,
        /// Observed cycle count.
        value: i64,
    },

    /// The clock period is not a positive finite number.
    #[error("tCK must be a positive number of nanoseconds (got {0})")]
    ClockPeriod(f64),

    /// A derived latency does not match its defining relation.
    #[error("{field} ({actual}) must equal {relation} ({expected})")]
    LatencyRelation {
        /// Derived field name.
        field: &'static str,
        /// Relation in readable form, e.g. `AL + CL`.
        relation: &'static str,
        /// Value stored in the snapshot.
        actual: i64,
        /// Value recomputed from primitives.
        expected: i64,
    },

    /// A derived latency does not fit in a cycle count.
    #[error("{field} = {relation} overflows a 64-bit cycle count")]
    TimingOverflow {
        /// Derived field name.
        field: &'static str,
        /// Relation in readable form, e.g. `AL + CL`.
        relation: &'static str,
    },

    /// A supply current the protocol has no default for was not configured.
    #[error("[power] {key} is required for {protocol}")]
    MissingPowerInput {
        /// Missing key.
        key: &'static str,
        /// Protocol name.
        protocol: &'static str,
    },

    /// An energy increment is negative or not finite.
    #[error("energy increment {field} must be a non-negative finite value (got {value})")]
    Energy {
        /// Energy field name.
        field: &'static str,
        /// Computed value in pJ.
        value: f64,
    },

    /// Declared channel capacity is not a whole number of ranks.
    #[error("channel_size ({declared} bytes) must equal ranks * rank size ({physical} bytes)")]
    ChannelSize {
        /// Capacity from `channel_size`.
        declared: u128,
        /// Bytes held by the configured ranks.
        physical: u128,
    },

    /// Declared channel capacity disagrees with the address widths.
    #[error(
        "channel_size ({declared} bytes) does not match geometry ({addressable} bytes addressable)"
    )]
    Capacity {
        /// Capacity from `channel_size`.
        declared: u128,
        /// Capacity reachable through the address widths.
        addressable: u128,
    },

    /// The address layout does not cover the whole memory system exactly once.
    #[error(
        "address layout covers {layout_bits} bits + {shift_bits} offset bits but {total_bytes} bytes are declared"
    )]
    AddressCoverage {
        /// Sum of the layout field widths.
        layout_bits: u32,
        /// Bits consumed inside one request.
        shift_bits: u32,
        /// Total declared bytes over all channels.
        total_bytes: u128,
    },

    /// Refresh policy cannot be used with this device.
    #[error("refresh policy {policy} is incompatible with {reason}")]
    RefreshPolicy {
        /// Refresh policy name.
        policy: &'static str,
        /// Conflicting property.
        reason: String,
    },

    /// A value falls outside its permitted range or set.
    #[error("{field} = {value} is out of range ({allowed})")]
    OutOfRange {
        /// Field name.
        field: &'static str,
        /// Observed value.
        value: i64,
        /// Allowed values in readable form.
        allowed: &'static str,
    },
}
