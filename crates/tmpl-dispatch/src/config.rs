//! Dispatcher configuration.
//!
//! Every field has a default matching the conventional layout, so an empty
//! document (or [`DispatchConfig::default`]) is a valid configuration.
//!
//! ```yaml
//! lookup_roots: ["partials/", "theme/partials/"]
//! strip_prefix: "partials/"
//! legacy_suffixes: [".html"]
//! default_engine: escaping
//! max_partial_depth: 32
//! pool:
//!   max_retained: 64
//!   max_buffer_capacity: 65536
//! cache:
//!   enabled: true
//!   max_entries: 4096
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::template::EngineKind;

/// Top-level dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchConfig {
    /// Directories searched for partials, in priority order.
    pub lookup_roots: Vec<String>,
    /// Prefix removed from requested partial names before lookup.
    pub strip_prefix: String,
    /// Suffixes tried after the bare name within each root.
    pub legacy_suffixes: Vec<String>,
    /// Engine for templates added without an explicit engine.
    pub default_engine: EngineKind,
    /// Partials that may be executing at once on one thread, counting nested
    /// calls. Deeper calls fail instead of recursing.
    pub max_partial_depth: usize,
    pub pool: PoolConfig,
    pub cache: CacheConfig,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            lookup_roots: vec!["partials/".to_string(), "theme/partials/".to_string()],
            strip_prefix: "partials/".to_string(),
            legacy_suffixes: vec![".html".to_string()],
            default_engine: EngineKind::Escaping,
            max_partial_depth: 32,
            pool: PoolConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

/// Buffer pool limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Idle buffers kept for reuse; extra buffers are dropped on release.
    pub max_retained: usize,
    /// Buffers that grew beyond this capacity are dropped on release.
    pub max_buffer_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_retained: 64,
            max_buffer_capacity: 64 * 1024,
        }
    }
}

/// Settings for the `partial_cached` memoization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Once reached, new results are returned but not stored.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 4096,
        }
    }
}

impl DispatchConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    /// Checks invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookup_roots.is_empty() {
            return Err(ConfigError::Invalid(
                "lookup_roots must name at least one root".to_string(),
            ));
        }
        if self.lookup_roots.iter().any(|root| root.is_empty()) {
            return Err(ConfigError::Invalid(
                "lookup_roots entries must not be empty".to_string(),
            ));
        }
        if self.max_partial_depth == 0 {
            return Err(ConfigError::Invalid(
                "max_partial_depth must be at least 1".to_string(),
            ));
        }
        if self.legacy_suffixes.iter().any(|suffix| suffix.is_empty()) {
            return Err(ConfigError::Invalid(
                "legacy_suffixes entries must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
