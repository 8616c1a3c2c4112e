//! Inspection settings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`InspectConfig::hex_prefix_len`].
pub const ENV_HEX_PREFIX: &str = "ENVELOPE_HEX_PREFIX";
/// Environment variable overriding [`InspectConfig::indent_width`].
pub const ENV_INDENT: &str = "ENVELOPE_INDENT";
/// Environment variable overriding [`InspectConfig::max_embedded_depth`].
pub const ENV_MAX_DEPTH: &str = "ENVELOPE_MAX_DEPTH";
/// Environment variable setting [`InspectConfig::min_age`].
pub const ENV_MIN_AGE: &str = "ENVELOPE_MIN_AGE";

/// Settings for a single inspection run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct InspectConfig {
    /// Number of leading bytes shown in the hex dump.
    pub hex_prefix_len: usize,

    /// Spaces per nesting level in rendered output.
    pub indent_width: u8,

    /// How many levels of embedded CBOR the claim extractor follows.
    pub max_embedded_depth: u8,

    /// Age the holder must have reached; the report gives a verdict when set.
    pub min_age: Option<u32>,
}

impl InspectConfig {
    /// Create a config with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self { hex_prefix_len: 100, indent_width: 2, max_embedded_depth: 4, min_age: None }
    }

    /// Create the default config, then apply any `ENVELOPE_*` overrides
    /// found in the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Values that fail to parse are logged and skipped.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_from(&lookup, ENV_HEX_PREFIX, &mut self.hex_prefix_len);
        override_from(&lookup, ENV_INDENT, &mut self.indent_width);
        override_from(&lookup, ENV_MAX_DEPTH, &mut self.max_embedded_depth);
        let mut min_age = self.min_age.unwrap_or_default();
        if override_from(&lookup, ENV_MIN_AGE, &mut min_age) {
            self.min_age = Some(min_age);
        }
        self
    }
}

impl Default for InspectConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns `true` if `slot` was overwritten.
fn override_from<F, T>(lookup: &F, key: &str, slot: &mut T) -> bool
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return false;
    };
    match raw.trim().parse() {
        Ok(value) => {
            *slot = value;
            true
        }
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparsable config override");
            false
        }
    }
}
