//! Configuration management.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::channel::DEFAULT_CHANNEL_CAPACITY;
use crate::ledger::DEFAULT_COOLDOWN_SECS;

/// Main configuration for scanledger.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Path to the reference dataset (CSV). `None` starts without a set.
    pub reference_path: Option<PathBuf>,
    /// 0-based key column index in the reference dataset.
    pub key_column: usize,
    /// Cooldown window in seconds for duplicate suppression.
    pub cooldown_secs: u64,
    /// Bounded capacity of the result channel.
    pub channel_capacity: usize,
    /// Interval between ledger sweeps.
    pub sweep_interval: Duration,
    /// Whether notification cues are enabled.
    pub cues_enabled: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        #[allow(clippy::cast_sign_loss)] // constant is positive
        let cooldown_secs = DEFAULT_COOLDOWN_SECS as u64;
        Self {
            reference_path: None,
            key_column: crate::reference::DEFAULT_KEY_COLUMN,
            cooldown_secs,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            // Half the cooldown: expired entries linger at most half a
            // window beyond eligibility.
            sweep_interval: Duration::from_secs(cooldown_secs / 2),
            cues_enabled: true,
        }
    }
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Reference dataset path.
    pub reference_path: Option<String>,
    /// Key column index.
    pub key_column: Option<usize>,
    /// Cooldown window in seconds.
    pub cooldown_secs: Option<u64>,
    /// Result channel capacity.
    pub channel_capacity: Option<usize>,
    /// Ledger sweep interval in seconds.
    pub sweep_interval_secs: Option<u64>,
    /// Notification cues enabled.
    pub cues_enabled: Option<bool>,
}

impl ScanConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cooldown window as a `chrono::Duration`.
    #[must_use]
    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.cooldown_secs).unwrap_or(i64::MAX))
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &std::path::Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: e.to_string(),
            })?;

        let file: ConfigFile =
            toml::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/scanledger/` on macOS)
    /// 2. XDG config dir (`~/.config/scanledger/` for Unix compatibility)
    ///
    /// Returns default configuration if no config file is found. Env
    /// overrides (`SCANLEDGER_*`) are applied last either way.
    #[must_use]
    pub fn load_default() -> Self {
        let mut config = Self::load_default_file();
        config.apply_env_overrides();
        config
    }

    fn load_default_file() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let platform_config = base_dirs.config_dir().join("scanledger").join("config.toml");
        if platform_config.exists() {
            if let Ok(config) = Self::load_from_file(&platform_config) {
                return config;
            }
        }

        let xdg_config = base_dirs
            .home_dir()
            .join(".config")
            .join("scanledger")
            .join("config.toml");
        if xdg_config.exists() {
            if let Ok(config) = Self::load_from_file(&xdg_config) {
                return config;
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `ScanConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(reference_path) = file.reference_path {
            config.reference_path = Some(PathBuf::from(reference_path));
        }
        if let Some(key_column) = file.key_column {
            config.key_column = key_column;
        }
        if let Some(cooldown_secs) = file.cooldown_secs {
            config.cooldown_secs = cooldown_secs;
        }
        if let Some(channel_capacity) = file.channel_capacity {
            config.channel_capacity = channel_capacity.max(1);
        }
        if let Some(sweep_interval_secs) = file.sweep_interval_secs {
            config.sweep_interval = Duration::from_secs(sweep_interval_secs.max(1));
        }
        if let Some(cues_enabled) = file.cues_enabled {
            config.cues_enabled = cues_enabled;
        }

        config
    }

    /// Applies `SCANLEDGER_*` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = std::env::var_os("SCANLEDGER_REFERENCE") {
            self.reference_path = Some(PathBuf::from(path));
        }
        if let Some(column) = parse_env("SCANLEDGER_KEY_COLUMN") {
            self.key_column = column;
        }
        if let Some(secs) = parse_env("SCANLEDGER_COOLDOWN_SECS") {
            self.cooldown_secs = secs;
        }
        if let Some(capacity) = parse_env::<usize>("SCANLEDGER_CHANNEL_CAPACITY") {
            self.channel_capacity = capacity.max(1);
        }
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
