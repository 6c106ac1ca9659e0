//! # Ledger Configuration
//!
//! Thresholds and logging settings for the service layer.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     TRIPLEDGER_EPSILON=0.005                                           │
//! │     TRIPLEDGER_LOG=debug                                               │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/tripledger/tripledger.toml (Linux)                       │
//! │     ~/Library/Application Support/app.tripledger.tripledger/... (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     half-cent settlement epsilon, one-cent display epsilon             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # tripledger.toml
//! [settlement]
//! epsilon = "0.005"
//!
//! [display]
//! hide_settled_below = "0.01"
//!
//! [logging]
//! filter = "info,tripledger_core=debug,tripledger_service=debug"
//! json = false
//! ```
//!
//! Amounts are decimal strings so they never pass through a float.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tripledger_core::{Money, SettlementOptions, DEFAULT_DISPLAY_EPSILON, DEFAULT_SETTLEMENT_EPSILON};

use crate::error::{ServiceError, ServiceResult};

/// Settlement participation threshold.
pub const ENV_EPSILON: &str = "TRIPLEDGER_EPSILON";
/// Display threshold for pairwise debts.
pub const ENV_DISPLAY_EPSILON: &str = "TRIPLEDGER_DISPLAY_EPSILON";
/// Log filter directives.
pub const ENV_LOG: &str = "TRIPLEDGER_LOG";
/// `true`/`1` switches logs to JSON lines.
pub const ENV_LOG_JSON: &str = "TRIPLEDGER_LOG_JSON";

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "tripledger.toml";

// =============================================================================
// Settlement Settings
// =============================================================================

/// Settings for the Smart Route optimizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSettings {
    /// Balances within this distance of zero take no part in the plan.
    #[serde(default = "default_settlement_epsilon", with = "decimal")]
    pub epsilon: Money,
}

fn default_settlement_epsilon() -> Money {
    DEFAULT_SETTLEMENT_EPSILON
}

impl Default for SettlementSettings {
    fn default() -> Self {
        SettlementSettings {
            epsilon: default_settlement_epsilon(),
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// Settings for what reports show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySettings {
    /// Pairwise debts at or below this magnitude are shown as settled.
    #[serde(default = "default_display_epsilon", with = "decimal")]
    pub hide_settled_below: Money,
}

fn default_display_epsilon() -> Money {
    DEFAULT_DISPLAY_EPSILON
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            hide_settled_below: default_display_epsilon(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

/// Subscriber settings. `RUST_LOG` still wins over `filter` at init time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "info,tripledger_core=debug,tripledger_service=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_log_filter(),
            json: false,
        }
    }
}

// =============================================================================
// Main Ledger Configuration
// =============================================================================

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub settlement: SettlementSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LedgerConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`tripledger.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ServiceResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading ledger config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load ledger config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses one TOML file with no environment overrides.
    pub fn from_file(path: &Path) -> ServiceResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::ConfigLoadFailed(format!("{}: {}", path.display(), e)))?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ServiceResult<()> {
        if !self.settlement.epsilon.is_positive() {
            return Err(ServiceError::InvalidConfig(format!(
                "settlement.epsilon must be positive, got {:.4}",
                self.settlement.epsilon
            )));
        }

        if self.display.hide_settled_below.is_negative() {
            return Err(ServiceError::InvalidConfig(format!(
                "display.hide_settled_below must not be negative, got {:.4}",
                self.display.hide_settled_below
            )));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ServiceError::InvalidConfig(
                "logging.filter must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from `lookup`, keyed by the `TRIPLEDGER_*` names.
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_EPSILON) {
            match Money::parse(&raw) {
                Ok(epsilon) => {
                    debug!(epsilon = %raw, "Overriding settlement epsilon from environment");
                    self.settlement.epsilon = epsilon;
                }
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_EPSILON),
            }
        }

        if let Some(raw) = lookup(ENV_DISPLAY_EPSILON) {
            match Money::parse(&raw) {
                Ok(epsilon) => self.display.hide_settled_below = epsilon,
                Err(e) => warn!(value = %raw, error = %e, "Ignoring {}", ENV_DISPLAY_EPSILON),
            }
        }

        if let Some(filter) = lookup(ENV_LOG) {
            self.logging.filter = filter;
        }

        if let Some(raw) = lookup(ENV_LOG_JSON) {
            match raw.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.logging.json = true,
                "0" | "false" | "no" => self.logging.json = false,
                _ => warn!(value = %raw, "Unknown value for {}", ENV_LOG_JSON),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "tripledger", "tripledger")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Options to hand to the settlement optimizer.
    pub fn settlement_options(&self) -> SettlementOptions {
        SettlementOptions {
            epsilon: self.settlement.epsilon,
        }
    }

    /// Threshold below which pairwise debts are hidden.
    pub fn display_epsilon(&self) -> Money {
        self.display.hide_settled_below
    }
}

// =============================================================================
// Decimal (de)serialization
// =============================================================================

/// `Money` as a four-place decimal string in config files.
mod decimal {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use tripledger_core::Money;

    pub fn serialize<S: Serializer>(value: &Money, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:.4}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Money::parse(&raw).map_err(de::Error::custom)
    }
}
