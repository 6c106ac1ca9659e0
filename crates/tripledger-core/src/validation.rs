//! # Validation Module
//!
//! Rule checks for ledger entries and the trip roster.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Trip-edit path (external)                                     │
//! │  └── calls validate_entry / validate_roster before saving               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Balance pass (balance.rs)                                     │
//! │  └── calls validate_entry again on every snapshot entry; a failing      │
//! │      entry is skipped and reported as DataIssue::InvalidEntry           │
//! │                                                                         │
//! │  Snapshots can arrive from older clients, so layer 2 never trusts       │
//! │  layer 1.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tripledger_core::money::Money;
//! use tripledger_core::types::LedgerEntry;
//! use tripledger_core::validation::validate_entry;
//!
//! let taxi = LedgerEntry::expense("e1", Money::from_minor(4000), "a", ["a", "b"], "a");
//! assert!(validate_entry(&taxi).is_ok());
//!
//! let refund = LedgerEntry::expense("e2", Money::from_minor(-100), "a", ["a"], "a");
//! assert!(validate_entry(&refund).is_err());
//! ```

use std::collections::BTreeSet;

use crate::error::{LedgerError, LedgerResult, ValidationError};
use crate::money::Money;
use crate::types::{EntryKind, LedgerEntry, Member, Roster};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Entry Validation
// =============================================================================

/// Validates one ledger entry.
///
/// ## Rules
/// - `id` and `payer_id` must not be empty
/// - `cost` must not be negative
/// - Expense: every split override must be non-negative and together they
///   must not exceed `cost` (the rest of the cost is split among the
///   participants without an override)
/// - Settlement: exactly one receiver
///
/// An empty participant list is NOT rejected here. The balance pass charges
/// the payer and reports it as a data issue instead.
pub fn validate_entry(entry: &LedgerEntry) -> ValidationResult<()> {
    if entry.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    if entry.payer_id.as_str().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "payer_id".to_string(),
        });
    }

    if entry.cost.is_negative() {
        return Err(ValidationError::NegativeCost { cost: entry.cost });
    }

    match entry.kind {
        EntryKind::Expense => validate_overrides(entry),
        EntryKind::Settlement => {
            if entry.participant_ids.len() != 1 {
                return Err(ValidationError::SettlementReceiverCount {
                    count: entry.participant_ids.len(),
                });
            }
            Ok(())
        }
    }
}

fn validate_overrides(entry: &LedgerEntry) -> ValidationResult<()> {
    if let Some((member_id, amount)) = entry
        .split_overrides
        .iter()
        .find(|(_, amount)| amount.is_negative())
    {
        return Err(ValidationError::NegativeOverride {
            member_id: member_id.clone(),
            amount: *amount,
        });
    }

    let overrides = override_total(entry)?;
    if overrides > entry.cost {
        return Err(ValidationError::OverridesExceedCost {
            overrides,
            cost: entry.cost,
        });
    }

    Ok(())
}

/// Sum of an entry's split overrides.
pub(crate) fn override_total(entry: &LedgerEntry) -> ValidationResult<Money> {
    Money::checked_sum(entry.split_overrides.values().copied()).ok_or(ValidationError::AmountOverflow)
}

/// Validates an entry and checks that every member it mentions is on the
/// roster. For the trip-edit path, where an unknown id should be refused
/// rather than skipped.
///
/// ## Errors
/// - [`LedgerError::InvalidEntry`] wrapping the first [`validate_entry`]
///   failure
/// - [`LedgerError::UnknownMemberReference`] for the first id (in id order)
///   missing from `roster`
pub fn validate_entry_against(entry: &LedgerEntry, roster: &Roster) -> LedgerResult<()> {
    validate_entry(entry).map_err(|source| LedgerError::InvalidEntry {
        entry_id: entry.id.clone(),
        source,
    })?;

    if let Some(missing) = entry
        .referenced_members()
        .into_iter()
        .find(|id| !roster.contains(id.as_str()))
    {
        return Err(LedgerError::UnknownMemberReference {
            entry_id: entry.id.clone(),
            member_id: missing.clone(),
        });
    }

    Ok(())
}

// =============================================================================
// Roster Validation
// =============================================================================

/// Validates the member roster.
///
/// ## Rules
/// - Ids must not be empty
/// - Ids must be unique
pub fn validate_roster(members: &[Member]) -> ValidationResult<()> {
    let mut seen = BTreeSet::new();

    for member in members {
        if member.id.as_str().trim().is_empty() {
            return Err(ValidationError::Required {
                field: "member.id".to_string(),
            });
        }
        if !seen.insert(&member.id) {
            return Err(ValidationError::DuplicateMember {
                member_id: member.id.clone(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
