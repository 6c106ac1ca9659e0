//! # Service Error Types
//!
//! Error types for everything outside the pure engine.
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Service Error Categories                           │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Snapshot     │  │        Ledger           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Io             │  │  UnknownViewer          │ │
//! │  │  ConfigLoad     │  │  Json           │  │  Validation (roster)    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tripledger_core::LedgerError;

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors raised while loading configuration, reading snapshots or asking
/// the engine for balances.
#[derive(Debug, Error)]
pub enum ServiceError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A config value is present but unusable.
    #[error("Invalid ledger configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be read or parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    // =========================================================================
    // Snapshot Errors
    // =========================================================================
    /// Reading a snapshot file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot is not valid JSON for the expected shape.
    #[error("Invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),

    // =========================================================================
    // Engine Errors
    // =========================================================================
    /// The engine rejected the request.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl From<toml::de::Error> for ServiceError {
    fn from(err: toml::de::Error) -> Self {
        ServiceError::ConfigLoadFailed(err.to_string())
    }
}

impl ServiceError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ServiceError::InvalidConfig(_) | ServiceError::ConfigLoadFailed(_)
        )
    }
}
