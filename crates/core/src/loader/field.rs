//! Typed field loading with defaults.

use tracing::trace;

use super::ConfigSource;
use crate::common::ConfigError;

/// A value type the field loader can produce from raw text.
pub trait FieldValue: Sized {
    /// Description of the accepted form, used in parse errors.
    const EXPECTED: &'static str;

    /// Interprets already-trimmed raw text, or `None` if malformed.
    fn parse_field(raw: &str) -> Option<Self>;
}

impl FieldValue for String {
    const EXPECTED: &'static str = "a string";

    fn parse_field(raw: &str) -> Option<Self> {
        Some(raw.trim_matches('"').to_owned())
    }
}

impl FieldValue for i64 {
    const EXPECTED: &'static str = "an integer";

    fn parse_field(raw: &str) -> Option<Self> {
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.starts_with(['+', '-']) {
            return None;
        }
        let magnitude = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) if !hex.starts_with(['+', '-']) => i64::from_str_radix(hex, 16).ok()?,
            Some(_) => return None,
            None => digits.parse::<i64>().ok()?,
        };
        Some(if negative { -magnitude } else { magnitude })
    }
}

impl FieldValue for f64 {
    const EXPECTED: &'static str = "a real number";

    fn parse_field(raw: &str) -> Option<Self> {
        raw.parse::<f64>().ok()
    }
}

impl FieldValue for bool {
    const EXPECTED: &'static str = "a boolean (true/false, yes/no, on/off, 1/0)";

    fn parse_field(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

/// Drops an inline comment (`; ...` or `# ...` preceded by whitespace) and
/// surrounding whitespace.
fn clean(raw: &str) -> &str {
    let mut end = raw.len();
    let bytes = raw.as_bytes();
    for i in 1..bytes.len() {
        if (bytes[i] == b';' || bytes[i] == b'#') && bytes[i - 1].is_ascii_whitespace() {
            end = i;
            break;
        }
    }
    raw[..end].trim()
}

/// Pulls typed values out of a [`ConfigSource`].
///
/// A missing key yields the supplied default and never fails; a present key
/// whose value cannot be interpreted yields [`ConfigError::Parse`].
#[derive(Debug)]
pub struct FieldLoader<S> {
    source: S,
}

impl<S: ConfigSource> FieldLoader<S> {
    /// Wraps a source for the duration of construction.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Loads `section.key`, falling back to `default` when absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use dramcfg_core::loader::{FieldLoader, MapSource};
    ///
    /// let loader = FieldLoader::new(MapSource::new().with("timing", "CL", "0x10"));
    /// assert_eq!(loader.load("timing", "CL", 12_i64).unwrap(), 16);
    /// assert_eq!(loader.load("timing", "CWL", 12_i64).unwrap(), 12);
    /// ```
    pub fn load<T: FieldValue + std::fmt::Debug>(
        &self,
        section: &str,
        key: &str,
        default: T,
    ) -> Result<T, ConfigError> {
        let value = self.load_opt(section, key)?.unwrap_or(default);
        trace!(section, key, value = ?value, "field");
        Ok(value)
    }

    /// Loads `section.key` with no default; `Ok(None)` when absent.
    pub fn load_opt<T: FieldValue>(&self, section: &str, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.source.lookup(section, key) else {
            return Ok(None);
        };
        let text = clean(raw);
        T::parse_field(text)
            .map(Some)
            .ok_or_else(|| ConfigError::parse(section, key, text, T::EXPECTED))
    }

    /// Shorthand for string fields.
    pub fn string(&self, section: &str, key: &str, default: &str) -> Result<String, ConfigError> {
        self.load(section, key, default.to_owned())
    }

    /// Shorthand for integer fields.
    pub fn integer(&self, section: &str, key: &str, default: i64) -> Result<i64, ConfigError> {
        self.load(section, key, default)
    }

    /// Shorthand for real-valued fields.
    pub fn float(&self, section: &str, key: &str, default: f64) -> Result<f64, ConfigError> {
        self.load(section, key, default)
    }

    /// Shorthand for boolean fields.
    pub fn boolean(&self, section: &str, key: &str, default: bool) -> Result<bool, ConfigError> {
        self.load(section, key, default)
    }
}
