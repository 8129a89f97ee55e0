//! Key/value sources backing the field loader.
//!
//! A [`ConfigSource`] is the only thing that ever sees the configuration file.
//! Two implementations are provided:
//! 1. **IniSource:** Parses an INI file (or string) once with `rust-ini`.
//! 2. **MapSource:** An in-memory table for programmatic construction and tests.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use ini::{Ini, ParseOption};

use crate::common::ConfigError;

/// Read-only access to raw `section`/`key` values.
///
/// Implementors return the value exactly as written; typing and defaults are
/// applied by [`FieldLoader`](super::FieldLoader).
pub trait ConfigSource {
    /// Returns the raw value stored under `key` in `section`, if present.
    fn lookup(&self, section: &str, key: &str) -> Option<&str>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for &T {
    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        (**self).lookup(section, key)
    }
}

/// INI-backed source.
///
/// The file is read and parsed once; the handle is closed before construction
/// returns.
#[derive(Debug)]
pub struct IniSource {
    ini: Ini,
}

impl IniSource {
    /// Loads and parses an INI file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file.
    ///
    /// # Returns
    ///
    /// The parsed source, or [`ConfigError::File`] if the file is missing,
    /// unreadable, or not valid INI.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text).map_err(|reason| ConfigError::File {
            path: path.to_path_buf(),
            reason,
        })
    }

    /// Parses INI text held in memory.
    pub fn from_ini_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text).map_err(|reason| ConfigError::File {
            path: "<memory>".into(),
            reason,
        })
    }

    fn parse(text: &str) -> Result<Self, String> {
        // Backslashes show up in Windows output prefixes; keep them literal.
        let opt = ParseOption {
            enabled_escape: false,
            ..ParseOption::default()
        };
        Ini::load_from_str_opt(text, opt)
            .map(|ini| Self { ini })
            .map_err(|e| e.to_string())
    }
}

impl ConfigSource for IniSource {
    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.ini.section(Some(section)).and_then(|props| props.get(key))
    }
}

/// In-memory source keyed by `(section, key)`.
///
/// # Examples
///
/// ```
/// use dramcfg_core::loader::{ConfigSource, MapSource};
///
/// let src = MapSource::new()
///     .with("dram_structure", "protocol", "DDR4")
///     .with("timing", "CL", "16");
/// assert_eq!(src.lookup("timing", "CL"), Some("16"));
/// assert_eq!(src.lookup("timing", "CWL"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    entries: BTreeMap<(String, String), String>,
}

impl MapSource {
    /// Creates an empty source; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the source with `section.key = value` added or replaced.
    pub fn with(mut self, section: &str, key: &str, value: impl ToString) -> Self {
        self.set(section, key, value);
        self
    }

    /// Adds or replaces `section.key = value` in place.
    pub fn set(&mut self, section: &str, key: &str, value: impl ToString) {
        let _ = self
            .entries
            .insert((section.to_owned(), key.to_owned()), value.to_string());
    }

    /// Removes `section.key`, so lookups fall back to the default again.
    pub fn unset(&mut self, section: &str, key: &str) {
        let _ = self.entries.remove(&(section.to_owned(), key.to_owned()));
    }
}

impl ConfigSource for MapSource {
    fn lookup(&self, section: &str, key: &str) -> Option<&str> {
        self.entries
            .get(&(section.to_owned(), key.to_owned()))
            .map(String::as_str)
    }
}
