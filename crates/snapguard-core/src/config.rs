//! Configuration module for Snapguard.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Snapguard.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub monitor: MonitorConfig,
    pub debounce: DebounceConfig,
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

/// Monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Directories to watch recursively.
    pub roots: Vec<PathBuf>,
    /// Directory that receives snapshots and markers.
    pub backup_dir: PathBuf,
    /// Whether monitoring starts when the daemon launches.
    pub enabled: bool,
}

/// Debounce windows for the event classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Milliseconds a created file gets to settle before its snapshot.
    pub create_settle_ms: u64,
    /// Milliseconds before a delete is checked for reappearance.
    pub delete_confirm_ms: u64,
    /// Milliseconds of the longer save-as-replace detection window.
    pub save_detect_ms: u64,
}

impl DebounceConfig {
    /// Settle window for created files.
    pub fn create_settle(&self) -> Duration {
        Duration::from_millis(self.create_settle_ms)
    }

    /// First reappearance check after a delete.
    pub fn delete_confirm(&self) -> Duration {
        Duration::from_millis(self.delete_confirm_ms)
    }

    /// Second, longer reappearance check (save detection).
    pub fn save_detect(&self) -> Duration {
        Duration::from_millis(self.save_detect_ms)
    }
}

/// Upload scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Seconds between upload passes.
    pub interval_secs: u64,
    /// Address the connectivity probe connects to, e.g. `8.8.8.8:53`.
    pub probe_addr: String,
    /// Seconds before a probe attempt is considered unreachable.
    pub probe_timeout_secs: u64,
}

impl SyncConfig {
    /// Interval between upload passes.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Bound on a single probe attempt.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Remote blob store settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the blob store API. `None` disables uploading.
    pub endpoint: Option<String>,
}

/// Logging / journal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
    /// Number of entries the in-memory event journal retains.
    pub journal_capacity: usize,
}

// ---------------------------------------------------------------------------
// Config::load()
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/snapguard/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("snapguard")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.
// (clippy::derivable_impls)

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            backup_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("snapguard")
                .join("backups"),
            enabled: false,
        }
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            create_settle_ms: 200,
            delete_confirm_ms: 100,
            save_detect_ms: 300,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1800,
            probe_addr: "8.8.8.8:53".to_string(),
            probe_timeout_secs: 3,
        }
    }
}

// RemoteConfig derives Default (Option<String> defaults to None).
// (clippy::derivable_impls)

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            journal_capacity: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Config::validate()
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"debounce.save_detect_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Missing watched
    /// roots are not validation errors; they are skipped with a warning at
    /// start time so one bad root never blocks the others.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- monitor ---
        if self.monitor.enabled && self.monitor.roots.is_empty() {
            errors.push(ValidationError {
                field: "monitor.roots".into(),
                message: "must not be empty when monitoring is enabled".into(),
            });
        }
        if self.monitor.backup_dir.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "monitor.backup_dir".into(),
                message: "must not be empty".into(),
            });
        }

        // --- debounce ---
        if self.debounce.create_settle_ms == 0 {
            errors.push(ValidationError {
                field: "debounce.create_settle_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.debounce.delete_confirm_ms == 0 {
            errors.push(ValidationError {
                field: "debounce.delete_confirm_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.debounce.save_detect_ms == 0 {
            errors.push(ValidationError {
                field: "debounce.save_detect_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        // The save-detection recheck must strictly extend the first
        // confirmation, or a reappearing file could pass both checks at once.
        if self.debounce.delete_confirm_ms >= self.debounce.save_detect_ms {
            errors.push(ValidationError {
                field: "debounce.delete_confirm_ms".into(),
                message: format!(
                    "delete_confirm_ms ({}) must be less than save_detect_ms ({})",
                    self.debounce.delete_confirm_ms, self.debounce.save_detect_ms
                ),
            });
        }

        // --- sync ---
        if self.sync.interval_secs == 0 {
            errors.push(ValidationError {
                field: "sync.interval_secs".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.probe_addr.is_empty() {
            errors.push(ValidationError {
                field: "sync.probe_addr".into(),
                message: "must not be empty".into(),
            });
        }
        if self.sync.probe_timeout_secs == 0 {
            errors.push(ValidationError {
                field: "sync.probe_timeout_secs".into(),
                message: "must be greater than 0".into(),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }
        if self.logging.journal_capacity == 0 {
            errors.push(ValidationError {
                field: "logging.journal_capacity".into(),
                message: "must be greater than 0".into(),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use snapguard_core::config::ConfigBuilder;
/// use std::path::PathBuf;
///
/// let config = ConfigBuilder::new()
///     .monitor_root(PathBuf::from("/home/user/documents"))
///     .backup_dir(PathBuf::from("/home/user/backups"))
///     .enabled(true)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- monitor ---

    /// Adds one watched root.
    pub fn monitor_root(mut self, root: PathBuf) -> Self {
        self.config.monitor.roots.push(root);
        self
    }

    /// Replaces the watched root set.
    pub fn monitor_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.config.monitor.roots = roots;
        self
    }

    pub fn backup_dir(mut self, dir: PathBuf) -> Self {
        self.config.monitor.backup_dir = dir;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.monitor.enabled = enabled;
        self
    }

    // --- debounce ---

    pub fn create_settle_ms(mut self, ms: u64) -> Self {
        self.config.debounce.create_settle_ms = ms;
        self
    }

    pub fn delete_confirm_ms(mut self, ms: u64) -> Self {
        self.config.debounce.delete_confirm_ms = ms;
        self
    }

    pub fn save_detect_ms(mut self, ms: u64) -> Self {
        self.config.debounce.save_detect_ms = ms;
        self
    }

    // --- sync ---

    pub fn sync_interval_secs(mut self, seconds: u64) -> Self {
        self.config.sync.interval_secs = seconds;
        self
    }

    pub fn probe_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.sync.probe_addr = addr.into();
        self
    }

    pub fn probe_timeout_secs(mut self, seconds: u64) -> Self {
        self.config.sync.probe_timeout_secs = seconds;
        self
    }

    // --- remote ---

    pub fn remote_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.remote.endpoint = Some(endpoint.into());
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn journal_capacity(mut self, capacity: usize) -> Self {
        self.config.logging.journal_capacity = capacity;
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
