//! # tripledger-core: Balance & Settlement Engine for Group Trips
//!
//! This crate answers the two questions every shared trip ends with:
//! *who owes whom?* and *what is the shortest way to square up?* It is a set
//! of pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Trip Ledger Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            Trip store / sync layer (external)                    │   │
//! │  │      members + ledger entries, delivered as snapshots            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │        tripledger-service (config, logging, TripLedger)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tripledger-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │visibility │─►│  balance  │─►│settlement │  │   money   │  │   │
//! │  │   │  filter   │  │calculator │  │Smart Route│  │ fixed-pt  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STATE • NO FLOATS IN ARITHMETIC                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point `Money` (4 decimal places)
//! - [`types`] - Members, ledger entries, transfers, balance results
//! - [`error`] - Domain error types
//! - [`validation`] - Entry and roster rules
//! - [`visibility`] - Private-entry filter
//! - [`balance`] - Net balances, pairwise debts, viewer totals
//! - [`settlement`] - Transfer plan that zeroes all balances
//!
//! ## Design Principles
//!
//! 1. **Recompute, never patch**: every call takes the full entry snapshot;
//!    nothing is cached between calls
//! 2. **Conservation**: shares of an expense sum to exactly its cost, so net
//!    balances always sum to zero
//! 3. **Recover locally**: bad or partial data is skipped per entry and
//!    reported, never fatal
//!
//! ## Example Usage
//!
//! ```rust
//! use tripledger_core::{compute_balances, optimize_transfers, LedgerEntry, Member, MemberId, Money};
//!
//! let members = [Member::new("a", "Ana"), Member::new("b", "Ben"), Member::new("c", "Cy")];
//! let entries = [LedgerEntry::expense("e1", Money::from_minor(9000), "a", ["a", "b", "c"], "a")];
//!
//! let balances = compute_balances(&entries, &members, &MemberId::from("a")).unwrap();
//! let transfers = optimize_transfers(&balances.net_balances);
//!
//! assert_eq!(transfers.len(), 2);
//! assert_eq!(transfers[0].amount, Money::from_minor(3000));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod balance;
pub mod error;
pub mod money;
pub mod settlement;
pub mod types;
pub mod validation;
pub mod visibility;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use balance::{compute_balances, compute_global_balances, split_shares};
pub use error::{LedgerError, LedgerResult, MoneyParseError, ValidationError};
pub use money::Money;
pub use settlement::{optimize_transfers, optimize_transfers_with, SettlementOptions, SettlementPlan};
pub use types::*;
pub use visibility::is_visible;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default participation threshold for the settlement optimizer: half a
/// cent.
///
/// The optimizer rounds balances to whole cents before matching, so with
/// this threshold every balance that rounds to at least one cent is settled
/// and nobody is left holding a stray cent.
pub const DEFAULT_SETTLEMENT_EPSILON: Money = Money::from_units(50);

/// Default threshold below which a balance is shown as settled: one cent.
///
/// Transfers are whole cents while shares can carry sub-cent parts, so a
/// fully settled member may keep a remainder smaller than this.
pub const DEFAULT_DISPLAY_EPSILON: Money = Money::from_minor(1);
