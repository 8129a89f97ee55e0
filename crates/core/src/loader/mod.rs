//! Field loading from the configuration file.
//!
//! This module is the only code that touches the raw key/value data. It provides:
//! 1. **Sources:** The [`ConfigSource`] capability with INI-file and in-memory implementations.
//! 2. **Typed access:** [`FieldLoader`] for string, integer, real and boolean fields with defaults.

mod field;
mod source;

pub use field::{FieldLoader, FieldValue};
pub use source::{ConfigSource, IniSource, MapSource};

/// INI section names used across the derivation stages.
pub mod sections {
    /// Device structure and geometry.
    pub const DRAM_STRUCTURE: &str = "dram_structure";
    /// Primitive timing counts.
    pub const TIMING: &str = "timing";
    /// Supply voltage and currents.
    pub const POWER: &str = "power";
    /// Controller and queue policy.
    pub const SYSTEM: &str = "system";
    /// Output and epoch settings.
    pub const OTHER: &str = "other";
    /// Hybrid Memory Cube link and vault parameters.
    pub const HMC: &str = "hmc";
    /// Thermal model parameters.
    pub const THERMAL: &str = "thermal";
}
