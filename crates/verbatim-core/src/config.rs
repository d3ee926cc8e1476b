//! Configuration types for verbatim.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::marker::DEFAULT_FIELD_NAME;
use crate::Severity;

/// Top-level configuration, usually loaded from `verbatim.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Source discovery and pass settings.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Marker attribute settings.
    #[serde(default)]
    pub marker: MarkerConfig,

    /// Path resolution settings.
    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Severity overrides keyed by diagnostic name (e.g., "duplicate-member").
    #[serde(default)]
    pub diagnostics: HashMap<String, Severity>,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Gets the severity override for a diagnostic.
    #[must_use]
    pub fn diagnostic_severity(&self, name: &str) -> Option<Severity> {
        self.diagnostics.get(name).copied()
    }
}

/// Source discovery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Crate directory to scan (the one containing `src/`).
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Glob patterns to exclude, matched against paths relative to the root.
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,

    /// Whether to respect .gitignore files.
    #[serde(default = "default_true")]
    pub respect_gitignore: bool,

    /// Abort the pass when a source file fails to parse.
    #[serde(default)]
    pub fail_on_parse_error: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            exclude: default_exclude(),
            respect_gitignore: true,
            fail_on_parse_error: false,
        }
    }
}

/// Marker attribute configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Canonical paths of the marker attribute macro.
    #[serde(default = "default_marker_paths")]
    pub paths: Vec<String>,

    /// Constant name used when a marker sets no `field_name`.
    #[serde(default = "default_field_name")]
    pub default_field_name: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            paths: default_marker_paths(),
            default_field_name: default_field_name(),
        }
    }
}

/// Path resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveConfig {
    /// Extra crate names reachable from the extern prelude.
    #[serde(default)]
    pub extern_crates: Vec<String>,

    /// Read `[dependencies]` from the crate's `Cargo.toml`.
    #[serde(default = "default_true")]
    pub read_manifest: bool,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            extern_crates: Vec::new(),
            read_manifest: true,
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_exclude() -> Vec<String> {
    vec!["**/target/**".to_string(), "src/bin/**".to_string()]
}

fn default_marker_paths() -> Vec<String> {
    vec![
        "verbatim::literal".to_string(),
        "verbatim_macros::literal".to_string(),
    ]
}

fn default_field_name() -> String {
    DEFAULT_FIELD_NAME.to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },
}
