//! Serializer configuration
//!
//! A `SerializerConfig` can be built in code or loaded from TOML:
//!
//! ```toml
//! use_cache = true
//! use_enum_index = false
//! max_depth = 256
//! timezone = { fixed = 3600 }   # or "utc" / "local"
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default nesting limit before a run fails with `RecursionExhausted`
///
/// Only a guard against cycles: the stack grows on demand, so finite graphs
/// nested this deep still serialize.
pub const DEFAULT_MAX_DEPTH: usize = 10_000;

const MAX_OFFSET_SECONDS: i32 = 86_400;

/// Timezone used to render dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateZone {
    /// Coordinated Universal Time (same output on every machine)
    #[default]
    Utc,
    /// The host's local timezone
    Local,
    /// Fixed offset, in seconds east of UTC
    Fixed(i32),
}

/// Configuration for a serialization session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SerializerConfig {
    /// Deduplicate composite values by identity (strings are always deduplicated)
    pub use_cache: bool,
    /// Write enum constructors by index (`j`) instead of by name (`w`)
    pub use_enum_index: bool,
    /// Maximum nesting depth
    pub max_depth: usize,
    /// Timezone for date rendering
    pub timezone: DateZone,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            use_cache: false,
            use_enum_index: false,
            max_depth: DEFAULT_MAX_DEPTH,
            timezone: DateZone::Utc,
        }
    }
}

impl SerializerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_enum_index(mut self, use_enum_index: bool) -> Self {
        self.use_enum_index = use_enum_index;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_timezone(mut self, timezone: DateZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Parse and validate a TOML configuration
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SerializerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_depth must be at least 1".to_string(),
            ));
        }
        if let DateZone::Fixed(offset) = self.timezone
            && offset.abs() >= MAX_OFFSET_SECONDS
        {
            return Err(ConfigError::Invalid(format!(
                "timezone offset {} is outside ±{} seconds",
                offset, MAX_OFFSET_SECONDS
            )));
        }
        Ok(())
    }
}

/// Error loading a configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Cannot read config: {}", e),
            ConfigError::Parse(e) => write!(f, "Cannot parse config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}
