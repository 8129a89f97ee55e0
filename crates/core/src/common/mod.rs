//! Common utilities shared by every derivation stage.
//!
//! This module provides:
//! 1. **Error Handling:** [`ConfigError`] and [`ValidationError`] for construction failures.
//! 2. **Bit Arithmetic:** Address-width rounding and overflow-free capacity helpers.

/// Bit-width and capacity arithmetic.
pub mod bits;

/// Error types for loading and validation.
pub mod error;

pub use bits::{ceil_log2, div_or_zero, pow2};
pub use error::{ConfigError, ValidationError};

/// Bytes per megabyte as used by `channel_size`.
pub const BYTES_PER_MB: u128 = 1 << 20;
