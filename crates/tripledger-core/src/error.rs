//! # Error Types
//!
//! Domain-specific error types for tripledger-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tripledger-core errors (this file)                                     │
//! │  ├── LedgerError      - Engine-level failures                           │
//! │  ├── ValidationError  - A single entry or roster breaks a rule          │
//! │  └── MoneyParseError  - Decimal text that is not an amount              │
//! │                                                                         │
//! │  tripledger-service errors (separate crate)                             │
//! │  └── ServiceError     - Config, snapshot loading, wraps LedgerError     │
//! │                                                                         │
//! │  Flow: ValidationError → LedgerError → ServiceError → caller            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What Is NOT an Error
//! Partial trip data is normal: a member removed after logging expenses, or
//! an expense saved with nobody ticked. Those cases are recovered inside the
//! balance pass and reported as [`crate::types::DataIssue`] values instead of
//! failing the whole computation.

use thiserror::Error;

use crate::money::Money;
use crate::types::MemberId;

// =============================================================================
// Ledger Error
// =============================================================================

/// Engine-level errors.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Money was divided into zero parts.
    ///
    /// ## When This Occurs
    /// Only through direct use of [`Money::divide`] or [`Money::allocate`].
    /// The balance calculator floors every participant count at one.
    #[error("Cannot divide an amount into zero parts")]
    DivisionByZero,

    /// The viewing participant is not on the trip roster.
    #[error("Viewer {0} is not a member of this trip")]
    UnknownViewer(MemberId),

    /// An entry references a member id absent from the roster.
    ///
    /// Raised by [`validate_entry_against`](crate::validation::validate_entry_against)
    /// on the trip-edit path. The balance pass recovers instead, skipping
    /// that member's contribution.
    #[error("Entry {entry_id} references unknown member {member_id}")]
    UnknownMemberReference { entry_id: String, member_id: MemberId },

    /// An entry broke a validation rule.
    #[error("Invalid entry {entry_id}: {source}")]
    InvalidEntry {
        entry_id: String,
        #[source]
        source: ValidationError,
    },

    /// Validation error not tied to a single entry (e.g. roster checks).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Rule violations for a single ledger entry or for the roster.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Entry cost is below zero.
    #[error("cost must not be negative (got {cost})")]
    NegativeCost { cost: Money },

    /// A split override is below zero.
    #[error("split override for {member_id} must not be negative (got {amount})")]
    NegativeOverride { member_id: MemberId, amount: Money },

    /// Split overrides add up to more than the entry cost.
    ///
    /// Accepting this would debit participants for money nobody paid.
    #[error("split overrides total {overrides} but the cost is only {cost}")]
    OverridesExceedCost { overrides: Money, cost: Money },

    /// A settlement must name exactly one receiver.
    #[error("a settlement needs exactly one receiver, got {count}")]
    SettlementReceiverCount { count: usize },

    /// Amounts on the entry add up past the range `Money` can hold.
    #[error("amounts overflow the supported range")]
    AmountOverflow,

    /// The same member id appears twice on the roster.
    #[error("member '{member_id}' appears more than once")]
    DuplicateMember { member_id: MemberId },
}

// =============================================================================
// Money Parse Error
// =============================================================================

/// Failure to read a decimal amount.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyParseError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal amount")]
    InvalidFormat(String),

    #[error("'{value}' has more than {max} fraction digits")]
    TooManyFractionDigits { value: String, max: u32 },

    #[error("'{0}' is too large")]
    Overflow(String),
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with LedgerError.
pub type LedgerResult<T> = Result<T, LedgerError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LedgerError::UnknownViewer(MemberId::from("zoe"));
        assert_eq!(err.to_string(), "Viewer zoe is not a member of this trip");

        let err = LedgerError::InvalidEntry {
            entry_id: "e1".to_string(),
            source: ValidationError::NegativeCost {
                cost: Money::from_minor(-500),
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid entry e1: cost must not be negative (got -5.00)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OverridesExceedCost {
            overrides: Money::from_minor(12000),
            cost: Money::from_minor(10000),
        };
        assert_eq!(
            err.to_string(),
            "split overrides total 120.00 but the cost is only 100.00"
        );

        let err = ValidationError::SettlementReceiverCount { count: 2 };
        assert_eq!(err.to_string(), "a settlement needs exactly one receiver, got 2");
    }

    #[test]
    fn test_validation_converts_to_ledger_error() {
        let err: LedgerError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();
        assert!(matches!(err, LedgerError::Validation(_)));
    }
}
