//! DRAM configuration derivation and validation library.
//!
//! This crate turns a protocol-level device description into the complete set
//! of constants a cycle-accurate memory simulator runs on. It implements:
//! 1. **Loading:** Typed, defaulted field reads from an INI file or an in-memory source.
//! 2. **Derivation:** Protocol capabilities, timing latencies, geometry, address layout and energy.
//! 3. **Validation:** Cross-field checks run once, before the snapshot is handed out.
//! 4. **Snapshot:** An immutable, shareable [`Config`].

/// Shared helpers (bit arithmetic, error types).
pub mod common;
/// Device geometry, address widths and address layout.
pub mod geometry;
/// HMC link and vault parameters.
pub mod hmc;
/// Configuration sources and the typed field loader.
pub mod loader;
/// Output file locations and reporting cadence.
pub mod output;
/// Supply currents and per-command energy increments.
pub mod power;
/// DRAM protocol enumeration and capability queries.
pub mod protocol;
/// Cross-field validation.
pub mod sanity;
/// The immutable configuration snapshot.
pub mod snapshot;
/// Queueing, row-buffer and refresh policy.
pub mod system;
/// Thermal model settings.
#[cfg(feature = "thermal")]
pub mod thermal;
/// Timing parameters and derived latencies.
pub mod timing;

/// Error returned by configuration construction.
pub use crate::common::{ConfigError, ValidationError};
/// Supported DRAM standards.
pub use crate::protocol::DramProtocol;
/// Validated snapshot; build with `Config::new` or `Config::from_source`.
pub use crate::snapshot::Config;
