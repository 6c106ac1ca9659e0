//! # tripledger-service: Configuration, Logging & Facade
//!
//! Wraps the pure `tripledger-core` engine with the parts that touch the
//! outside world: a TOML/env configuration layer, the tracing subscriber,
//! and the [`TripLedger`] facade that every screen and tool calls instead
//! of reimplementing balance rules.
//!
//! ## Modules
//!
//! - [`config`] - `LedgerConfig` (thresholds, logging), file + env loading
//! - [`logging`] - Subscriber initialization
//! - [`service`] - `TripSnapshot`, `TripLedger`, `TripReport`
//! - [`error`] - Service error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tripledger_core::{LedgerEntry, Member, MemberId, Money};
//! use tripledger_service::{LedgerConfig, TripLedger, TripSnapshot};
//!
//! let snapshot = TripSnapshot::new(
//!     vec![Member::new("a", "Ana"), Member::new("b", "Ben")],
//!     vec![LedgerEntry::expense("e1", Money::from_minor(4000), "a", ["a", "b"], "a")],
//! );
//!
//! let ledger = TripLedger::new(LedgerConfig::default());
//! let report = ledger.report_for(&snapshot, &MemberId::from("b")).unwrap();
//!
//! assert_eq!(report.transfers[0].amount, Money::from_minor(2000));
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod service;

pub use config::{LedgerConfig, LoggingConfig};
pub use error::{ServiceError, ServiceResult};
pub use service::{TripLedger, TripReport, TripSnapshot};
